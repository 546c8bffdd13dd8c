//! Per-actor sandbox: capability checks and the quota'd data store.
//!
//! Robot code runs in-process, so the sandbox is a policy layer, not an
//! isolation layer. It gates every capability-marked operation and confines
//! file access to one directory per actor with a byte quota.

use std::fs;
use std::path::PathBuf;

use ironclash_api::error::{BotError, BotResult};
use ironclash_api::robot::Capabilities;
use tracing::warn;

/// Default data store quota per actor, in bytes.
pub const DEFAULT_DATA_QUOTA: u64 = 200_000;

/// The policy layer wrapped around one actor's privileged operations.
pub struct Sandbox {
    capabilities: Capabilities,
    data_dir: Option<PathBuf>,
    quota: u64,
    used: u64,
}

impl Sandbox {
    /// Creates a sandbox. `data_dir` is the actor's private store root;
    /// `None` disables the store even for actors holding the capability.
    /// Pre-existing files in the directory count against the quota.
    #[must_use]
    pub fn new(capabilities: Capabilities, data_dir: Option<PathBuf>, quota: u64) -> Self {
        let used = data_dir.as_deref().map_or(0, |dir| {
            fs::read_dir(dir).map_or(0, |entries| {
                entries
                    .filter_map(Result::ok)
                    .filter_map(|e| e.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum()
            })
        });
        Self {
            capabilities,
            data_dir,
            quota,
            used,
        }
    }

    /// Fails with [`BotError::Denied`] unless the actor holds `needed`.
    pub fn require(&self, needed: Capabilities) -> BotResult {
        if self.capabilities.contains(needed) {
            Ok(())
        } else {
            Err(BotError::Denied(format!("requires {needed:?}")))
        }
    }

    /// The actor's capability set.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Bytes currently charged against the quota.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Writes a named blob, replacing any previous contents.
    pub fn data_write(&mut self, name: &str, contents: &[u8]) -> BotResult {
        self.require(Capabilities::DATA_STORE)?;
        let path = self.entry_path(name)?;
        let old_len = fs::metadata(&path).map_or(0, |m| m.len());
        let new_len = contents.len() as u64;
        let projected = self.used - old_len + new_len;
        if projected > self.quota {
            return Err(BotError::DataStore(format!(
                "quota exceeded: {projected} > {} bytes",
                self.quota
            )));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| BotError::DataStore(format!("create {}: {e}", dir.display())))?;
        }
        fs::write(&path, contents)
            .map_err(|e| BotError::DataStore(format!("write {name}: {e}")))?;
        self.used = projected;
        Ok(())
    }

    /// Reads a named blob, or `None` if absent.
    pub fn data_read(&mut self, name: &str) -> BotResult<Option<Vec<u8>>> {
        self.require(Capabilities::DATA_STORE)?;
        let path = self.entry_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BotError::DataStore(format!("read {name}: {e}"))),
        }
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, BotError> {
        let Some(dir) = &self.data_dir else {
            return Err(BotError::DataStore("no data directory configured".into()));
        };
        if name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
            || name.contains('\0')
        {
            warn!(name, "rejected data store entry name");
            return Err(BotError::DataStore(format!("illegal entry name {name:?}")));
        }
        Ok(dir.join(name))
    }
}
