use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Allows one export at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: Arc<AtomicBool>,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claims the gate, or returns `None` while another export holds it.
    pub fn try_begin(&self) -> Option<ExportTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportTicket {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Holds the gate closed until dropped.
#[derive(Debug)]
pub struct ExportTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_export_is_refused_until_first_finishes() {
        let gate = ExportGate::new();

        let ticket = gate.try_begin();
        assert!(ticket.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());

        drop(ticket);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn clones_share_state() {
        let gate = ExportGate::new();
        let other = gate.clone();

        let _ticket = gate.try_begin();

        assert!(other.is_busy());
    }
}
