//! Service layer API for ticket lifecycle operations
use super::error::TicketError;
use super::patch::TicketPatch;
use super::store::TicketStore;
use super::ticket::{NewTicket, Ticket, TicketStatus};
use super::transition;
use super::utils;
use anyhow::anyhow;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub struct TicketService {
    store: Arc<dyn TicketStore>,
    // serializes read-check-write sequences so no check runs against a stale ticket
    write_gate: Mutex<()>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, TicketError> {
        self.write_gate
            .lock()
            .map_err(|_| anyhow!("ticket write gate poisoned").into())
    }

    /// Load a ticket from the store
    fn load_ticket(&self, id: &str) -> Result<Ticket, TicketError> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| TicketError::ticket_not_found(id))
    }

    /// Every stored ticket. An empty store is reported as `NotFound`, not as
    /// an empty list.
    pub fn list_all(&self) -> Result<Vec<Ticket>, TicketError> {
        let tickets = self.store.list_all()?;
        if tickets.is_empty() {
            return Err(TicketError::no_tickets());
        }
        Ok(tickets)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Ticket, TicketError> {
        self.load_ticket(id)
    }

    /// Open a new ticket. It always starts out `PENDING`.
    pub fn create(&self, fields: NewTicket) -> Result<Ticket, TicketError> {
        let ticket = Ticket::new(utils::new_ticket_id()?, fields);
        self.store.insert(&ticket)?;

        debug!(id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Apply the non-empty fields of `patch`. Falsy values never reach the
    /// store, so a field cannot be cleared through this path.
    pub fn update_fields(&self, id: &str, patch: TicketPatch) -> Result<(), TicketError> {
        let _gate = self.lock_writes()?;
        self.load_ticket(id)?;

        let patch = patch.without_falsy();
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update_fields(id, &patch)?;

        debug!(%id, ?patch, "ticket fields updated");
        Ok(())
    }

    /// Move a ticket along the status graph.
    ///
    /// Checks run in order: the ticket must exist, a status must be given,
    /// and the guard must accept the move. An unknown status name is
    /// rejected as an invalid transition.
    pub fn transition_status(
        &self,
        id: &str,
        requested: Option<&str>,
    ) -> Result<TicketStatus, TicketError> {
        let _gate = self.lock_writes()?;
        let ticket = self.load_ticket(id)?;

        let requested = requested
            .filter(|s| !s.is_empty())
            .ok_or(TicketError::MissingInput("status"))?;

        let next = requested
            .parse::<TicketStatus>()
            .ok()
            .filter(|next| transition::is_allowed(ticket.status, *next))
            .ok_or_else(|| TicketError::InvalidTransition {
                from: ticket.status,
                requested: requested.to_string(),
            })?;

        self.store.update_status(id, next)?;

        debug!(%id, from = %ticket.status, to = %next, "ticket status changed");
        Ok(next)
    }

    /// Remove a ticket that has not reached an end state.
    pub fn delete(&self, id: &str) -> Result<(), TicketError> {
        let _gate = self.lock_writes()?;
        let ticket = self.load_ticket(id)?;

        if !transition::is_deletable(ticket.status) {
            return Err(TicketError::TerminalStateViolation(ticket.status));
        }
        self.store.delete(id)?;

        debug!(%id, "ticket deleted");
        Ok(())
    }
}
