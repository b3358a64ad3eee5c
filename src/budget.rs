//! The operations the presentation layer calls.
//!
//! [`Budget`] composes the item store, edit session and history archive, and
//! writes the item list through the gateway after every change. Destructive
//! operations take a decision callback instead of prompting; it is consulted
//! only when the action would actually change something.

use uuid::Uuid;

use crate::calc::{self, Totals};
use crate::error::{BudgetError, Result, StorageError};
use crate::history::HistoryArchive;
use crate::items::ItemStore;
use crate::models::{Item, ItemInput, Snapshot, SnapshotSummary, UpdateItemInput};
use crate::persistence::PersistenceGateway;
use crate::session::{EditSession, EditState};

/// Actions that need a yes/no decision before they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    RemoveItem,
    NewBudget,
    RestoreSnapshot,
    DeleteSnapshot,
    ClearHistory,
}

impl DestructiveAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::RemoveItem => "Remove this item?",
            Self::NewBudget => "Start a new budget? This clears the current items.",
            Self::RestoreSnapshot => "Restore this budget? This replaces the current items.",
            Self::DeleteSnapshot => "Delete this history entry?",
            Self::ClearHistory => "Clear the whole history?",
        }
    }
}

/// What a destructive operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// The decision callback said no; nothing changed.
    Declined,
    /// There was nothing to act on; the callback was not consulted.
    NothingToDo,
}

#[derive(Debug)]
pub struct Budget {
    items: ItemStore,
    session: EditSession,
    history: HistoryArchive,
    gateway: PersistenceGateway,
    items_durable: bool,
    /// Stored items are unreadable and have no backup; skip writes.
    items_held: bool,
}

impl Budget {
    /// Load items and history. Unreadable stored state starts empty.
    ///
    /// An unreadable value is copied aside before anything can replace it.
    /// When that copy fails, writes to it are held until the user starts a
    /// new budget or calls [`Budget::flush`].
    pub fn open(gateway: PersistenceGateway) -> Self {
        let (items, items_held) = match gateway.load_items() {
            Ok(items) => (items, false),
            Err(e) => {
                tracing::warn!("Could not load items, starting empty: {}", e);
                (Vec::new(), !e.is_backed_up())
            }
        };
        Self {
            items: ItemStore::from_items(items),
            session: EditSession::new(),
            history: HistoryArchive::open(gateway.clone()),
            gateway,
            items_durable: !items_held,
            items_held,
        }
    }

    // ============================================================
    // Items
    // ============================================================

    pub fn add_item(&mut self, input: ItemInput) -> Result<Item> {
        let item = self.items.add(input)?;
        self.persist_items();
        Ok(item)
    }

    pub fn update_item(&mut self, id: Uuid, input: UpdateItemInput) -> Result<Item> {
        let item = self.items.update(id, input)?;
        self.persist_items();
        Ok(item)
    }

    pub fn remove_item(
        &mut self,
        id: Uuid,
        confirm: impl FnOnce(DestructiveAction) -> bool,
    ) -> ActionOutcome {
        if !self.items.contains(id) {
            return ActionOutcome::NothingToDo;
        }
        if !confirm(DestructiveAction::RemoveItem) {
            return ActionOutcome::Declined;
        }

        self.items.remove(id);
        if self.session.editing() == Some(id) {
            self.session.cancel();
        }
        self.persist_items();
        ActionOutcome::Applied
    }

    pub fn item(&self, id: Uuid) -> Option<Item> {
        self.items.get(id)
    }

    pub fn items(&self) -> Vec<Item> {
        self.items.list()
    }

    pub fn compute_totals(&self) -> Totals {
        calc::aggregate(self.items.as_slice())
    }

    /// Clear the live item list.
    pub fn new_budget(&mut self, confirm: impl FnOnce(DestructiveAction) -> bool) -> ActionOutcome {
        if self.items.is_empty() {
            return ActionOutcome::NothingToDo;
        }
        if !confirm(DestructiveAction::NewBudget) {
            return ActionOutcome::Declined;
        }

        self.items.clear();
        self.session.cancel();
        self.items_held = false;
        self.persist_items();
        ActionOutcome::Applied
    }

    // ============================================================
    // Edit session
    // ============================================================

    pub fn begin_edit(&mut self, id: Uuid) -> Result<ItemInput> {
        self.session.begin(&self.items, id)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    pub fn edit_state(&self) -> EditState {
        self.session.state()
    }

    /// Add a new item, or update the one being edited.
    pub fn submit(&mut self, input: ItemInput) -> Result<Item> {
        let item = self.session.submit(&mut self.items, input)?;
        self.persist_items();
        Ok(item)
    }

    // ============================================================
    // History
    // ============================================================

    pub fn save_snapshot(&mut self) -> Result<Snapshot> {
        self.history.snapshot(self.items.as_slice())
    }

    pub fn list_history(&self) -> Vec<Snapshot> {
        self.history.list()
    }

    pub fn history_summaries(&self) -> Vec<SnapshotSummary> {
        self.history.summaries()
    }

    /// Replace the live items with a snapshot's items.
    pub fn restore_snapshot(
        &mut self,
        id: Uuid,
        confirm: impl FnOnce(DestructiveAction) -> bool,
    ) -> Result<ActionOutcome> {
        let items = self.history.restore(id)?;
        if !confirm(DestructiveAction::RestoreSnapshot) {
            return Ok(ActionOutcome::Declined);
        }

        self.items.replace(items);
        self.session.cancel();
        self.persist_items();
        tracing::info!("Restored snapshot {}", id);
        Ok(ActionOutcome::Applied)
    }

    pub fn delete_snapshot_entry(
        &mut self,
        id: Uuid,
        confirm: impl FnOnce(DestructiveAction) -> bool,
    ) -> ActionOutcome {
        if self.history.get(id).is_none() {
            return ActionOutcome::NothingToDo;
        }
        if !confirm(DestructiveAction::DeleteSnapshot) {
            return ActionOutcome::Declined;
        }

        self.history.delete(id);
        ActionOutcome::Applied
    }

    pub fn clear_history(&mut self, confirm: impl FnOnce(DestructiveAction) -> bool) -> ActionOutcome {
        if self.history.is_empty() {
            return ActionOutcome::NothingToDo;
        }
        if !confirm(DestructiveAction::ClearHistory) {
            return ActionOutcome::Declined;
        }

        self.history.clear_all();
        ActionOutcome::Applied
    }

    // ============================================================
    // Durability
    // ============================================================

    /// Whether both the item list and the history reached the durable store
    /// on their last write.
    pub fn is_durable(&self) -> bool {
        self.items_durable && self.history.is_durable()
    }

    /// Retry writing everything, e.g. after a storage failure has cleared.
    pub fn flush(&mut self) -> std::result::Result<(), StorageError> {
        self.gateway.save_items(self.items.as_slice())?;
        self.items_held = false;
        self.items_durable = true;
        self.history.flush()
    }

    fn persist_items(&mut self) {
        if self.items_held {
            tracing::warn!("Items kept in memory only: stored items are unreadable");
            self.items_durable = false;
            return;
        }
        match self.gateway.save_items(self.items.as_slice()) {
            Ok(()) => self.items_durable = true,
            Err(e) => {
                tracing::warn!("Items kept in memory only: {}", e);
                self.items_durable = false;
            }
        }
    }
}

/// Look up an id by a unique prefix of its string form.
pub fn resolve_prefix(prefix: &str, ids: impl IntoIterator<Item = Uuid>) -> Result<Uuid> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(BudgetError::Validation("Id must not be empty".to_string()));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(BudgetError::NotFound(prefix)),
        _ => Err(BudgetError::Validation(format!(
            "Id prefix '{}' is ambiguous",
            prefix
        ))),
    }
}
