//! Sequence tagging for snapshots
//!
//! Every fetch gets a ticket when it is issued. A fetched snapshot is only
//! applied if nothing newer reached the mirror since the ticket was issued,
//! so a slow response can never overwrite fresher state.

/// Issue order of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Tracks issued tickets and the newest state applied to a mirror
#[derive(Debug, Clone, Default)]
pub struct RevisionClock {
    issued: u64,
    applied: u64,
}

impl RevisionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a fetch that is about to be sent
    pub fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Record state that reached the mirror without a ticket (push messages)
    pub fn bump(&mut self) {
        self.issued += 1;
        self.applied = self.issued;
    }

    /// Decide whether a fetched snapshot may be applied, recording it if so
    pub fn accept(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }
}
