//! The live, ordered item collection.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{BudgetError, Result};
use crate::models::{Item, ItemInput, UpdateItemInput};

/// Owns the in-memory item list. Order is insertion order.
///
/// Every accessor hands out copies, so callers can never mutate an item
/// behind the store's back.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted items.
    ///
    /// Subtotals are recomputed and later duplicates of an id are dropped.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        store.replace(items);
        store
    }

    pub fn add(&mut self, input: ItemInput) -> Result<Item> {
        validate_description(&input.description)?;

        let item = Item::new(Uuid::new_v4(), input);
        self.items.push(item.clone());
        Ok(item)
    }

    pub fn update(&mut self, id: Uuid, input: UpdateItemInput) -> Result<Item> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or_else(|| BudgetError::NotFound(format!("item {}", id)))?;

        if let Some(description) = &input.description {
            validate_description(description)?;
        }

        item.merge(input);
        Ok(item.clone())
    }

    /// Remove by id. Returns whether anything was removed; an absent id is not an error.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Swap the whole collection, e.g. when restoring a snapshot.
    pub fn replace(&mut self, items: Vec<Item>) {
        let mut seen = HashSet::new();
        self.items = items
            .into_iter()
            .filter_map(|mut item| {
                if !seen.insert(item.id()) {
                    tracing::warn!("Dropping duplicate item id {}", item.id());
                    return None;
                }
                item.recompute();
                Some(item)
            })
            .collect();
    }

    pub fn get(&self, id: Uuid) -> Option<Item> {
        self.items.iter().find(|i| i.id() == id).cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|i| i.id() == id)
    }

    pub fn list(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Borrowed view for computations that don't need ownership.
    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(BudgetError::Validation(
            "Description must not be empty".to_string(),
        ));
    }
    Ok(())
}
