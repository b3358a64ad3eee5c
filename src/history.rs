//! Append-only archive of item-list snapshots.
//!
//! Entries are only ever added at the end; the single exceptions are an
//! explicit delete by id and clearing everything. Every change is written
//! through the [`PersistenceGateway`]. A failed write is logged and leaves the
//! archive usable in memory, with [`HistoryArchive::is_durable`] reporting
//! `false` until a later write succeeds.
//!
//! Stored history that could not be read and could not be copied aside is
//! never overwritten implicitly: writes are held until [`HistoryArchive::clear_all`]
//! or [`HistoryArchive::flush`].

use chrono::Utc;
use uuid::Uuid;

use crate::error::{BudgetError, Result, StorageError};
use crate::models::{Item, Snapshot, SnapshotSummary};
use crate::persistence::PersistenceGateway;

#[derive(Debug)]
pub struct HistoryArchive {
    snapshots: Vec<Snapshot>,
    gateway: PersistenceGateway,
    durable: bool,
    /// Stored history is unreadable and has no backup; skip writes.
    held: bool,
}

impl HistoryArchive {
    /// Load the archive from the gateway. Unreadable history starts empty.
    pub fn open(gateway: PersistenceGateway) -> Self {
        let (snapshots, held) = match gateway.load_history() {
            Ok(snapshots) => (snapshots, false),
            Err(e) => {
                tracing::warn!("Could not load history, starting empty: {}", e);
                (Vec::new(), !e.is_backed_up())
            }
        };
        Self {
            snapshots,
            gateway,
            durable: !held,
            held,
        }
    }

    /// Archive a copy of `items`. Fails when there is nothing to archive.
    pub fn snapshot(&mut self, items: &[Item]) -> Result<Snapshot> {
        if items.is_empty() {
            return Err(BudgetError::Validation(
                "Add items before saving a snapshot".to_string(),
            ));
        }

        let snapshot = Snapshot::new(Uuid::new_v4(), Utc::now(), items.to_vec());
        self.snapshots.push(snapshot.clone());
        self.persist();

        tracing::info!(
            "Saved snapshot {} with {} items",
            snapshot.id(),
            items.len()
        );
        Ok(snapshot)
    }

    /// A fresh copy of the snapshot's items. Replacing the live list is up to the caller.
    pub fn restore(&self, id: Uuid) -> Result<Vec<Item>> {
        self.get(id)
            .map(|s| s.items().to_vec())
            .ok_or_else(|| BudgetError::NotFound(format!("snapshot {}", id)))
    }

    /// Remove one entry. Returns whether anything was removed; an absent id is not an error.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.snapshots.len();
        self.snapshots.retain(|s| s.id() != id);
        let removed = self.snapshots.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Drop every entry and the stored history with them.
    pub fn clear_all(&mut self) {
        self.snapshots.clear();
        self.held = false;
        match self.gateway.clear_history() {
            Ok(()) => self.durable = true,
            Err(e) => {
                tracing::warn!("Stored history not cleared: {}", e);
                self.durable = false;
            }
        }
        tracing::info!("Cleared history");
    }

    /// All snapshots, oldest first.
    pub fn list(&self) -> Vec<Snapshot> {
        self.snapshots.clone()
    }

    pub fn summaries(&self) -> Vec<SnapshotSummary> {
        self.snapshots.iter().map(Snapshot::summary).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Whether the last write reached the durable store.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Write the archive again, e.g. after a storage failure has cleared.
    /// Also overwrites stored history that could not be read.
    pub fn flush(&mut self) -> std::result::Result<(), StorageError> {
        self.gateway.save_history(&self.snapshots)?;
        self.held = false;
        self.durable = true;
        Ok(())
    }

    fn persist(&mut self) {
        if self.held {
            tracing::warn!("History kept in memory only: stored history is unreadable");
            self.durable = false;
            return;
        }
        match self.gateway.save_history(&self.snapshots) {
            Ok(()) => self.durable = true,
            Err(e) => {
                tracing::warn!("History kept in memory only: {}", e);
                self.durable = false;
            }
        }
    }
}
