//! Per-mode request sequencing.
//!
//! Every dispatch takes a ticket carrying a monotonically increasing sequence
//! number. A response is applied only if its ticket is still the newest for
//! its mode and that mode is still active; anything else is stale.

use std::collections::{HashMap, HashSet};

use shared::GenerationMode;

/// Identity of one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub mode: GenerationMode,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_seq: u64,
    latest: HashMap<GenerationMode, u64>,
    in_flight: HashSet<GenerationMode>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `mode`. `None` while one is already outstanding.
    pub fn begin(&mut self, mode: GenerationMode) -> Option<Ticket> {
        if self.in_flight.contains(&mode) {
            return None;
        }
        self.next_seq += 1;
        self.latest.insert(mode, self.next_seq);
        self.in_flight.insert(mode);
        Some(Ticket {
            mode,
            seq: self.next_seq,
        })
    }

    /// Settle `ticket`. Returns whether its result may be applied.
    pub fn complete(&mut self, ticket: Ticket, active_mode: GenerationMode) -> bool {
        let newest = self.latest.get(&ticket.mode) == Some(&ticket.seq);
        if newest {
            self.in_flight.remove(&ticket.mode);
        }
        newest && ticket.mode == active_mode
    }

    /// Forget whatever is outstanding for `mode` (mode switch)
    pub fn invalidate(&mut self, mode: GenerationMode) {
        self.latest.remove(&mode);
        self.in_flight.remove(&mode);
    }

    pub fn is_loading(&self, mode: GenerationMode) -> bool {
        self.in_flight.contains(&mode)
    }
}
