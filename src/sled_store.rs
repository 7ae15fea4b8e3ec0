//! sled-backed ticket store
use super::patch::TicketPatch;
use super::store::{TicketStore, sort_by_creation};
use super::ticket::{Ticket, TicketStatus};
use anyhow::{Context, anyhow};
use std::path::Path;
use std::sync::Arc;

pub const TICKETS_TREE: &str = "tickets";

pub struct SledStore {
    instance: Arc<sled::Db>,
    tickets: sled::Tree,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        let tickets = instance.open_tree(TICKETS_TREE)?;
        Ok(Self { instance, tickets })
    }

    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path)
            .with_context(|| format!("failed to open ticket database at {}", path.display()))?;
        Self::new(Arc::new(db))
    }

    /// Block until every pending write has reached disk.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.instance.flush()?;
        Ok(())
    }

    fn save(&self, ticket: &Ticket) -> anyhow::Result<()> {
        self.tickets
            .insert(ticket.id.as_bytes(), minicbor::to_vec(ticket)?)?;
        Ok(())
    }

    fn load(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        self.tickets
            .get(id.as_bytes())?
            .map(|bytes| decode_ticket(&bytes))
            .transpose()
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Ticket)) -> anyhow::Result<()> {
        let mut ticket = self
            .load(id)?
            .ok_or_else(|| anyhow!("no ticket stored under {id}"))?;
        f(&mut ticket);
        self.save(&ticket)
    }
}

fn decode_ticket(bytes: &[u8]) -> anyhow::Result<Ticket> {
    minicbor::decode(bytes).context("failed to decode stored ticket")
}

impl TicketStore for SledStore {
    fn list_all(&self) -> anyhow::Result<Vec<Ticket>> {
        let mut tickets = self
            .tickets
            .iter()
            .values()
            .map(|bytes| decode_ticket(&bytes?))
            .collect::<anyhow::Result<Vec<_>>>()?;
        sort_by_creation(&mut tickets);
        Ok(tickets)
    }

    fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        self.load(id)
    }

    fn insert(&self, ticket: &Ticket) -> anyhow::Result<()> {
        let encoded = minicbor::to_vec(ticket)?;
        // only succeeds when nothing is stored under the id yet
        self.tickets
            .compare_and_swap(ticket.id.as_bytes(), None as Option<&[u8]>, Some(encoded))?
            .map_err(|_| anyhow!("ticket {} already exists", ticket.id))
    }

    fn update_fields(&self, id: &str, patch: &TicketPatch) -> anyhow::Result<()> {
        self.modify(id, |ticket| ticket.apply_patch(patch))
    }

    fn update_status(&self, id: &str, status: TicketStatus) -> anyhow::Result<()> {
        self.modify(id, |ticket| ticket.set_status(status))
    }

    fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.tickets.remove(id.as_bytes())?;
        Ok(())
    }
}
