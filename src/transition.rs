//! Ticket status transition guard
//!
//! ```text
//! PENDING ──► IN_PROGRESS ──► COMPLETED
//!    │
//!    └──────► CANCELLED
//! ```
//!
//! Cancellation is only possible before work starts, completion only after it
//! has started. Both end states are absorbing, and a ticket in either of them
//! can no longer be deleted.
use super::ticket::TicketStatus;
use TicketStatus::*;

/// Whether a ticket in `current` may move to `requested`. Total over the
/// enumeration; anything not listed in the graph above is rejected,
/// self-transitions included.
pub fn is_allowed(current: TicketStatus, requested: TicketStatus) -> bool {
    successors(current).contains(&requested)
}

/// Like [`is_allowed`] for a status name that has not been parsed yet.
/// A name outside the enumeration is an ordinary rejection.
pub fn is_allowed_raw(current: TicketStatus, requested: &str) -> bool {
    requested
        .parse::<TicketStatus>()
        .is_ok_and(|requested| is_allowed(current, requested))
}

pub fn successors(current: TicketStatus) -> &'static [TicketStatus] {
    match current {
        Pending => &[InProgress, Cancelled],
        InProgress => &[Completed],
        Completed | Cancelled => &[],
    }
}

pub fn is_terminal(status: TicketStatus) -> bool {
    successors(status).is_empty()
}

pub fn is_deletable(status: TicketStatus) -> bool {
    !is_terminal(status)
}
