//! Per-actor event queue with priority-ordered delivery.
//!
//! Events carry a monotonically increasing sequence number assigned on
//! insertion. Delivery pops the highest-priority event; within equal
//! priority the newest event wins, so a fresh scan preempts a stale one.
//! Non-reserved events older than two ticks are pruned before dispatch.

use std::collections::HashMap;

use crate::events::{Event, EventKind, MAX_ASSIGNABLE_PRIORITY};
use crate::robot::Capabilities;

/// Maximum number of queued events per actor. Adds beyond the cap are
/// dropped silently; a robot that cannot keep up loses the oldest news.
pub const MAX_QUEUED_EVENTS: usize = 256;

/// How many ticks a non-reserved event stays deliverable.
pub const MAX_EVENT_AGE: u64 = 2;

/// An event annotated with its delivery metadata.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    /// The event itself.
    pub event: Event,
    /// Tick the event was generated at.
    pub tick: u64,
    /// Effective priority at insertion time.
    pub priority: i32,
    /// Insertion order, unique per queue.
    pub seq: u64,
}

/// Per-kind priority overrides for the assignable range.
#[derive(Debug, Clone, Default)]
pub struct PriorityTable {
    overrides: HashMap<EventKind, i32>,
}

impl PriorityTable {
    /// Returns the effective priority for a kind.
    #[must_use]
    pub fn priority(&self, kind: EventKind) -> i32 {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_priority())
    }

    /// Assigns a priority to a non-reserved kind. Returns false and leaves
    /// the table unchanged if the kind is reserved or the priority is
    /// outside `0..=99`.
    pub fn set(&mut self, kind: EventKind, priority: i32) -> bool {
        if kind.is_reserved() || !(0..=MAX_ASSIGNABLE_PRIORITY).contains(&priority) {
            return false;
        }
        self.overrides.insert(kind, priority);
        true
    }
}

/// The event queue one actor drains between commits.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queues an event generated at `tick`, looking up its priority in
    /// `priorities` and filtering by the actor's capabilities. Events the
    /// actor cannot receive, and events beyond the queue cap, are dropped.
    pub fn add(
        &mut self,
        event: Event,
        tick: u64,
        priorities: &PriorityTable,
        capabilities: Capabilities,
    ) {
        let kind = event.kind();
        if !capabilities.contains(kind.required_capability()) {
            return;
        }
        if self.events.len() >= MAX_QUEUED_EVENTS {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(QueuedEvent {
            event,
            tick,
            priority: priorities.priority(kind),
            seq,
        });
    }

    /// Queues an event at an explicit priority, bypassing the table. Used
    /// for condition-generated custom events, which carry the condition's
    /// own priority.
    pub fn add_with_priority(&mut self, event: Event, tick: u64, priority: i32) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(QueuedEvent {
            event,
            tick,
            priority,
            seq,
        });
    }

    /// Pops the next event to dispatch: highest priority first, newest
    /// first within equal priority.
    pub fn pop_top(&mut self) -> Option<QueuedEvent> {
        let idx = self
            .events
            .iter()
            .enumerate()
            .max_by_key(|(_, e)| (e.priority, e.seq))
            .map(|(i, _)| i)?;
        Some(self.events.swap_remove(idx))
    }

    /// Priority of the next event to dispatch, without removing it.
    #[must_use]
    pub fn top_priority(&self) -> Option<i32> {
        self.events.iter().map(|e| e.priority).max()
    }

    /// Drops non-reserved events older than [`MAX_EVENT_AGE`] ticks.
    pub fn prune(&mut self, current_tick: u64) {
        self.events.retain(|e| {
            e.event.kind().is_reserved() || current_tick.saturating_sub(e.tick) <= MAX_EVENT_AGE
        });
    }

    /// Drops every queued event, reserved ones included.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        CustomEvent, HitWallEvent, ScannedActorEvent, StatusEvent, RESERVED_PRIORITY,
    };
    use crate::snapshot::StatusSnapshot;

    fn scan(name: &str) -> Event {
        Event::ScannedActor(ScannedActorEvent {
            name: name.into(),
            bearing: 0.0,
            distance: 100.0,
            energy: 100.0,
            heading: 0.0,
            velocity: 0.0,
        })
    }

    fn status() -> Event {
        Event::Status(StatusEvent {
            status: StatusSnapshot::default(),
        })
    }

    #[test]
    fn dispatch_order_is_priority_then_newest() {
        let table = PriorityTable::default();
        let caps = Capabilities::advanced();
        let mut q = EventQueue::new();
        // priorities 10, 80, 80, 99
        q.add(scan("a"), 0, &table, caps);
        q.add(
            Event::Custom(CustomEvent { name: "old".into() }),
            0,
            &table,
            caps,
        );
        q.add(
            Event::Custom(CustomEvent { name: "new".into() }),
            0,
            &table,
            caps,
        );
        q.add(status(), 0, &table, caps);

        assert_eq!(q.pop_top().unwrap().priority, 99);
        let first_custom = q.pop_top().unwrap();
        match first_custom.event {
            Event::Custom(ref c) => assert_eq!(c.name, "new"),
            other => panic!("unexpected event: {other:?}"),
        }
        let second_custom = q.pop_top().unwrap();
        match second_custom.event {
            Event::Custom(ref c) => assert_eq!(c.name, "old"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(q.pop_top().unwrap().priority, 10);
        assert!(q.pop_top().is_none());
    }

    #[test]
    fn capability_filter_drops_custom_for_basic() {
        let table = PriorityTable::default();
        let mut q = EventQueue::new();
        q.add(
            Event::Custom(CustomEvent { name: "c".into() }),
            0,
            &table,
            Capabilities::basic(),
        );
        assert!(q.is_empty());
    }

    #[test]
    fn cap_drops_overflow() {
        let table = PriorityTable::default();
        let caps = Capabilities::basic();
        let mut q = EventQueue::new();
        for _ in 0..(MAX_QUEUED_EVENTS + 10) {
            q.add(scan("x"), 0, &table, caps);
        }
        assert_eq!(q.len(), MAX_QUEUED_EVENTS);
    }

    #[test]
    fn prune_keeps_reserved() {
        let table = PriorityTable::default();
        let caps = Capabilities::basic();
        let mut q = EventQueue::new();
        q.add(scan("stale"), 0, &table, caps);
        q.add(status(), 0, &table, caps);
        q.prune(5);
        assert_eq!(q.len(), 1);
        assert_eq!(q.top_priority(), Some(RESERVED_PRIORITY - 1));
    }

    #[test]
    fn prune_keeps_recent() {
        let table = PriorityTable::default();
        let caps = Capabilities::basic();
        let mut q = EventQueue::new();
        q.add(scan("recent"), 4, &table, caps);
        q.prune(5);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn priority_table_rejects_reserved_and_out_of_range() {
        let mut table = PriorityTable::default();
        assert!(!table.set(EventKind::SkippedTurn, 50));
        assert!(!table.set(EventKind::ScannedActor, 100));
        assert!(!table.set(EventKind::ScannedActor, -1));
        assert!(table.set(EventKind::ScannedActor, 75));
        assert_eq!(table.priority(EventKind::ScannedActor), 75);
        assert_eq!(
            table.priority(EventKind::HitWall),
            EventKind::HitWall.default_priority()
        );
    }

    #[test]
    fn pop_reflects_priority_override() {
        let mut table = PriorityTable::default();
        assert!(table.set(EventKind::ScannedActor, 90));
        let caps = Capabilities::basic();
        let mut q = EventQueue::new();
        q.add(Event::HitWall(HitWallEvent { bearing: 0.0 }), 0, &table, caps);
        q.add(scan("boosted"), 0, &table, caps);
        assert_eq!(q.pop_top().unwrap().priority, 90);
    }
}
