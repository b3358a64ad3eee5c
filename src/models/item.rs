use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calc;

/// A single quoted line.
///
/// Fields are read-only outside the crate so the cached `subtotal` can never
/// drift from its inputs. The discount is stored exactly as entered (it may
/// exceed 100) and is clamped only when amounts are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(deserialize_with = "super::legacy_id::deserialize")]
    id: Uuid,
    description: String,
    quantity: f64,
    unit_price: f64,
    #[serde(rename = "discount")]
    discount_percent: f64,
    /// Cached for display; recomputed on every change and on load.
    #[serde(default)]
    subtotal: f64,
}

impl Item {
    pub(crate) fn new(id: Uuid, input: ItemInput) -> Self {
        let mut item = Self {
            id,
            description: input.description.trim().to_string(),
            quantity: coerce(input.quantity),
            unit_price: coerce(input.unit_price),
            discount_percent: coerce(input.discount_percent),
            subtotal: 0.0,
        };
        item.recompute();
        item
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn discount_percent(&self) -> f64 {
        self.discount_percent
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    /// Pre-discount amount (`quantity * unit_price`).
    pub fn gross(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Current field values, e.g. for pre-filling an edit form.
    pub fn to_input(&self) -> ItemInput {
        ItemInput {
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
        }
    }

    /// Apply a partial update. The caller validates the description first.
    pub(crate) fn merge(&mut self, update: UpdateItemInput) {
        if let Some(description) = update.description {
            self.description = description.trim().to_string();
        }
        if let Some(quantity) = update.quantity {
            self.quantity = coerce(quantity);
        }
        if let Some(unit_price) = update.unit_price {
            self.unit_price = coerce(unit_price);
        }
        if let Some(discount) = update.discount_percent {
            self.discount_percent = coerce(discount);
        }
        self.recompute();
    }

    pub(crate) fn recompute(&mut self) {
        self.subtotal = calc::item_subtotal(self.quantity, self.unit_price, self.discount_percent);
    }
}

/// Field values for a new item, as submitted by a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(rename = "discount")]
    pub discount_percent: f64,
}

impl ItemInput {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64, discount_percent: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            discount_percent,
        }
    }
}

/// Input for updating an existing item. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    #[serde(rename = "discount")]
    pub discount_percent: Option<f64>,
}

impl From<ItemInput> for UpdateItemInput {
    fn from(input: ItemInput) -> Self {
        Self {
            description: Some(input.description),
            quantity: Some(input.quantity),
            unit_price: Some(input.unit_price),
            discount_percent: Some(input.discount_percent),
        }
    }
}

/// A blank or unparseable numeric field counts as zero.
fn coerce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
