use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::Item;
use crate::calc;

/// An archived copy of the item list at the moment it was saved.
///
/// Snapshots own their items outright; nothing outside the archive holds a
/// reference into them, so later edits to the live budget never reach a
/// stored snapshot and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "super::legacy_id::deserialize")]
    id: Uuid,
    #[serde(rename = "date")]
    timestamp: DateTime<Utc>,
    items: Vec<Item>,
}

impl Snapshot {
    pub(crate) fn new(id: Uuid, timestamp: DateTime<Utc>, items: Vec<Item>) -> Self {
        Self {
            id,
            timestamp,
            items,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.id,
            date: self.timestamp,
            item_count: self.items.len(),
            total: calc::aggregate(&self.items).total,
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }
}

/// Compact listing entry for the history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub item_count: usize,
    pub total: f64,
}
