use crate::ticket::TicketStatus;

#[derive(thiserror::Error, Debug)]
pub enum TicketError {
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("No {0} provided for update")]
    MissingInput(&'static str),
    #[error("Invalid status transition from {from} to {requested}")]
    InvalidTransition {
        from: TicketStatus,
        requested: String,
    },
    #[error("Cannot delete a {0} ticket")]
    TerminalStateViolation(TicketStatus),
    #[error("Unexpected ticket store failure: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl TicketError {
    pub fn ticket_not_found(id: &str) -> Self {
        Self::NotFound {
            what: format!("Ticket {id}"),
        }
    }

    pub fn no_tickets() -> Self {
        Self::NotFound {
            what: "Tickets".into(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown ticket status {0:?}")]
pub struct ParseStatusError(pub String);
