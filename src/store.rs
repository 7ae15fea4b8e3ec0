//! Persistence seam for tickets.
//!
//! The service only ever talks to a [`TicketStore`]. [`MemoryStore`] keeps
//! everything in a map and is what the tests run against;
//! [`SledStore`](crate::sled_store::SledStore) is the on-disk implementation.
use super::patch::TicketPatch;
use super::ticket::{Ticket, TicketStatus};
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait TicketStore: Send + Sync {
    /// All tickets, oldest first.
    fn list_all(&self) -> anyhow::Result<Vec<Ticket>>;

    fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Ticket>>;

    fn insert(&self, ticket: &Ticket) -> anyhow::Result<()>;

    fn update_fields(&self, id: &str, patch: &TicketPatch) -> anyhow::Result<()>;

    fn update_status(&self, id: &str, status: TicketStatus) -> anyhow::Result<()>;

    fn delete(&self, id: &str) -> anyhow::Result<()>;
}

pub(crate) fn sort_by_creation(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| {
        a.created_at
            .to_datetime_utc()
            .cmp(&b.created_at.to_datetime_utc())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tickets: RwLock<BTreeMap<String, Ticket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, BTreeMap<String, Ticket>>> {
        self.tickets
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, BTreeMap<String, Ticket>>> {
        self.tickets
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Ticket)) -> anyhow::Result<()> {
        let mut tickets = self.write()?;
        let ticket = tickets
            .get_mut(id)
            .ok_or_else(|| anyhow!("no ticket stored under {id}"))?;
        f(ticket);
        Ok(())
    }
}

impl TicketStore for MemoryStore {
    fn list_all(&self) -> anyhow::Result<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = self.read()?.values().cloned().collect();
        sort_by_creation(&mut tickets);
        Ok(tickets)
    }

    fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn insert(&self, ticket: &Ticket) -> anyhow::Result<()> {
        let mut tickets = self.write()?;
        if tickets.contains_key(&ticket.id) {
            return Err(anyhow!("ticket {} already exists", ticket.id));
        }
        tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    fn update_fields(&self, id: &str, patch: &TicketPatch) -> anyhow::Result<()> {
        self.modify(id, |ticket| ticket.apply_patch(patch))
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> anyhow::Result<()> {
        self.modify(id, |ticket| ticket.set_status(status))
    }

    fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.write()?.remove(id);
        Ok(())
    }
}
