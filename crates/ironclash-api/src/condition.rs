//! Custom event conditions.
//!
//! A condition is a named predicate over the actor's own status. The engine
//! side evaluates every registered condition once per commit and queues a
//! [`CustomEvent`](crate::events::CustomEvent) for each one that holds.
//! Conditions are level-triggered: a predicate that stays true fires every
//! tick until it is removed or goes false.

use std::fmt;

use crate::snapshot::StatusSnapshot;

/// A named, prioritized predicate over an actor's status.
pub struct Condition {
    name: String,
    priority: i32,
    test: Box<dyn Fn(&StatusSnapshot) -> bool + Send>,
}

impl Condition {
    /// Creates a condition with the default custom-event priority (80).
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&StatusSnapshot) -> bool + Send + 'static,
    {
        Self::with_priority(name, 80, test)
    }

    /// Creates a condition with an explicit priority in `0..=99`. Values
    /// outside the range are clamped.
    pub fn with_priority<F>(name: impl Into<String>, priority: i32, test: F) -> Self
    where
        F: Fn(&StatusSnapshot) -> bool + Send + 'static,
    {
        Self {
            name: name.into(),
            priority: priority.clamp(0, 99),
            test: Box::new(test),
        }
    }

    /// The condition's name, echoed in the custom events it generates.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivery priority of the custom events this condition generates.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Evaluates the predicate against a status snapshot.
    #[must_use]
    pub fn test(&self, status: &StatusSnapshot) -> bool {
        (self.test)(status)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
