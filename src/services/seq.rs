use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic ticket gate for overlapping fetches: a response whose ticket is
/// older than the newest issued request is discarded, so a slow fetch can
/// never overwrite fresher state.
#[derive(Debug, Default)]
pub struct SeqGate {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl SeqGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket before starting a request.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True at most once per ticket, and only while the ticket is still the
    /// newest issued.
    pub fn admit(&self, ticket: u64) -> bool {
        if ticket < self.issued.load(Ordering::SeqCst) {
            return false;
        }
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }
}
