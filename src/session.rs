//! Tracks whether the item form creates a new item or edits an existing one.

use uuid::Uuid;

use crate::error::{BudgetError, Result};
use crate::items::ItemStore;
use crate::models::{Item, ItemInput};

/// The form's current mode.
///
/// - `Idle`: the next submit adds a new item
/// - `Editing`: the next submit replaces the item with that id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(Uuid),
}

#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn editing(&self) -> Option<Uuid> {
        match self.state {
            EditState::Idle => None,
            EditState::Editing(id) => Some(id),
        }
    }

    /// Start editing `id` and return its current values for the form.
    ///
    /// Calling this while already editing re-targets the session.
    pub fn begin(&mut self, store: &ItemStore, id: Uuid) -> Result<ItemInput> {
        let item = store
            .get(id)
            .ok_or_else(|| BudgetError::NotFound(format!("item {}", id)))?;
        self.state = EditState::Editing(id);
        Ok(item.to_input())
    }

    /// Add or update depending on the mode. The session returns to `Idle`
    /// only when the store accepted the submit.
    pub fn submit(&mut self, store: &mut ItemStore, input: ItemInput) -> Result<Item> {
        let item = match self.state {
            EditState::Idle => store.add(input)?,
            EditState::Editing(id) => store.update(id, input.into())?,
        };
        self.state = EditState::Idle;
        Ok(item)
    }

    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
    }
}
