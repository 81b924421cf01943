use crate::event::{EventKind, OrchestrationEvent};
use std::collections::VecDeque;

/// Default capacity for [`LogBuffer`]. The original dashboard grew its
/// buffer without bound; here the bound is explicit and configurable
/// (`log_capacity` in `.ckrv/dash.yaml`).
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

// ---------------------------------------------------------------------------
// LogBuffer
// ---------------------------------------------------------------------------

/// Ordered, append-only event log with oldest-first eviction.
///
/// Owned exclusively by the consuming view. Cleared wholesale on user
/// request; filtering never mutates it.
#[derive(Debug)]
pub struct LogBuffer {
    events: VecDeque<OrchestrationEvent>,
    capacity: usize,
    dropped: u64,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// `capacity` must be non-zero; zero is clamped to 1 rather than
    /// treated as unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: OrchestrationEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events evicted since the last clear.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrchestrationEvent> {
        self.events.iter()
    }

    /// Empties the entire buffer, not just any filtered view of it.
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Pure derivation: events satisfying `filter`, in arrival order.
    pub fn filtered<'a>(&'a self, filter: &LogFilter) -> Vec<&'a OrchestrationEvent> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// LogFilter
// ---------------------------------------------------------------------------

/// Free-text + kind filter over a [`LogBuffer`].
///
/// The query is a case-insensitive substring matched against the message
/// or the kind name; `kind: None` means all kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub query: String,
    pub kind: Option<EventKind>,
}

impl LogFilter {
    pub fn matches(&self, event: &OrchestrationEvent) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        event.message.to_lowercase().contains(&needle)
            || event.kind.as_str().contains(&needle)
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.kind.is_some()
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Serialize events as newline-delimited export lines, arrival order
/// preserved, trailing newline included.
pub fn export<'a>(events: impl IntoIterator<Item = &'a OrchestrationEvent>) -> String {
    let mut out = String::new();
    for event in events {
        out.push_str(&event.export_line());
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
