use std::collections::HashMap;

use tracing::debug;

use crate::assets::{AssetEncoder, AssetError};
use crate::models::{AssetFile, AssetSlot};

/// Identifies one upload attempt for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    slot: AssetSlot,
    sequence: u64,
}

impl UploadTicket {
    pub fn slot(&self) -> AssetSlot {
        self.slot
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    sequence: u64,
    fingerprint: (String, usize),
}

/// Issues upload tickets and decides which encoding result may be applied.
///
/// Only the most recently issued ticket per slot is current. Starting the
/// same file twice while the first attempt is still encoding is refused.
#[derive(Debug, Default)]
pub struct UploadSequencer {
    next: u64,
    in_flight: HashMap<AssetSlot, InFlight>,
    latest: HashMap<AssetSlot, u64>,
}

impl UploadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(
        &mut self,
        slot: AssetSlot,
        fingerprint: (String, usize),
    ) -> Option<UploadTicket> {
        if let Some(current) = self.in_flight.get(&slot) {
            if current.fingerprint == fingerprint {
                debug!(%slot, file = %fingerprint.0, "upload of the same file already in flight");
                return None;
            }
        }

        self.next += 1;
        let sequence = self.next;
        self.in_flight.insert(slot, InFlight { sequence, fingerprint });
        self.latest.insert(slot, sequence);
        Some(UploadTicket { slot, sequence })
    }

    pub fn is_current(
        &self,
        ticket: &UploadTicket,
    ) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.sequence)
    }

    /// Marks a ticket as done. Returns whether it was still current.
    pub fn finish(
        &mut self,
        ticket: &UploadTicket,
    ) -> bool {
        let current = self.is_current(ticket);
        if self
            .in_flight
            .get(&ticket.slot)
            .is_some_and(|flight| flight.sequence == ticket.sequence)
        {
            self.in_flight.remove(&ticket.slot);
        }
        current
    }

    /// Makes every outstanding ticket for `slot` stale.
    pub fn invalidate(
        &mut self,
        slot: AssetSlot,
    ) {
        self.next += 1;
        self.latest.insert(slot, self.next);
        self.in_flight.remove(&slot);
    }
}

/// An upload that has been accepted and is waiting to be encoded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub ticket: UploadTicket,
    pub file: AssetFile,
}

impl PendingUpload {
    pub async fn encode(
        self,
        encoder: &dyn AssetEncoder,
    ) -> EncodedUpload {
        let result = encoder.encode(&self.file).await;
        EncodedUpload {
            ticket: self.ticket,
            file: self.file,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodedUpload {
    pub ticket: UploadTicket,
    pub file: AssetFile,
    pub result: Result<String, AssetError>,
}

#[derive(Debug)]
pub enum UploadStart {
    Started(PendingUpload),
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Applied,
    /// A later upload or a removal superseded this one.
    Stale,
    /// Refused because the same file was already being uploaded.
    Ignored,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn print(name: &str) -> (String, usize) {
        (name.to_string(), 10)
    }

    #[test]
    fn later_ticket_supersedes_earlier() {
        let mut sequencer = UploadSequencer::new();
        let first = sequencer.begin(AssetSlot::Logo, print("a.png")).unwrap();
        let second = sequencer.begin(AssetSlot::Logo, print("b.png")).unwrap();

        assert!(sequencer.finish(&second));
        assert!(!sequencer.finish(&first));
    }

    #[test]
    fn slots_are_independent() {
        let mut sequencer = UploadSequencer::new();
        let logo = sequencer.begin(AssetSlot::Logo, print("a.png")).unwrap();
        let signature = sequencer.begin(AssetSlot::Signature, print("a.png")).unwrap();

        assert!(sequencer.is_current(&logo));
        assert!(sequencer.is_current(&signature));
    }

    #[test]
    fn same_file_in_flight_is_refused() {
        let mut sequencer = UploadSequencer::new();
        let ticket = sequencer.begin(AssetSlot::Logo, print("a.png")).unwrap();

        assert_eq!(sequencer.begin(AssetSlot::Logo, print("a.png")), None);

        sequencer.finish(&ticket);
        assert!(sequencer.begin(AssetSlot::Logo, print("a.png")).is_some());
    }

    #[test]
    fn invalidate_makes_outstanding_ticket_stale() {
        let mut sequencer = UploadSequencer::new();
        let ticket = sequencer.begin(AssetSlot::Signature, print("s.png")).unwrap();

        sequencer.invalidate(AssetSlot::Signature);

        assert!(!sequencer.finish(&ticket));
        assert!(sequencer.begin(AssetSlot::Signature, print("s.png")).is_some());
    }
}
