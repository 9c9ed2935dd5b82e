//! Request sequencing for page fetches.
//!
//! Each logical fetch (account list, payout history, ...) owns a
//! [`FetchGuard`]. Every request is issued a [`Ticket`]; a response is
//! applied only if no response to a later-issued request has been applied
//! already, so a slow early reply can never overwrite fresher state.

/// Issue-order sequence number of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct FetchGuard {
    issued: u64,
    applied: u64,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the ticket for a new request.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Returns `true` if the response for `ticket` should be applied, and
    /// records it as the newest applied response.
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    /// Whether `ticket` belongs to the most recently issued request.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Marks every outstanding request as stale.
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
    }
}
