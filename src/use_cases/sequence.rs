use std::sync::atomic::{AtomicU64, Ordering};

/// Per-stream request counter.
///
/// Every fetch takes a ticket from [`SequenceGate::begin`]; only the holder of
/// the most recently issued ticket may write its result. Responses that
/// resolve after a newer request was issued are dropped, whatever order they
/// arrive in.
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: AtomicU64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_newer_ticket_is_issued_then_older_ticket_is_stale() {
        let gate = SequenceGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert_eq!((first, second), (1, 2));
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }
}
