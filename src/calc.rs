//! Subtotal and aggregate computations.
//!
//! Everything here is pure. Inputs are not validated: negative quantities or
//! prices flow straight through the formulas. Discounts are always clamped to
//! `[0, 100]` before use, whatever value is stored.

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Aggregate amounts across a set of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of pre-discount amounts.
    pub subtotal: f64,
    /// Sum of discount amounts.
    pub discount_total: f64,
    /// `subtotal - discount_total`.
    pub total: f64,
}

/// Amounts shown while an item is still being typed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPreview {
    pub gross: f64,
    pub net: f64,
}

pub fn clamp_discount(discount_percent: f64) -> f64 {
    if discount_percent.is_nan() {
        return 0.0;
    }
    discount_percent.clamp(0.0, 100.0)
}

/// `quantity * unit_price * (1 - clamp(discount, 0, 100) / 100)`
pub fn item_subtotal(quantity: f64, unit_price: f64, discount_percent: f64) -> f64 {
    quantity * unit_price * (1.0 - clamp_discount(discount_percent) / 100.0)
}

pub fn aggregate(items: &[Item]) -> Totals {
    let (subtotal, discount_total) = items.iter().fold((0.0, 0.0), |(gross, discount), item| {
        let line = item.quantity() * item.unit_price();
        (
            gross + line,
            discount + line * clamp_discount(item.discount_percent()) / 100.0,
        )
    });

    Totals {
        subtotal,
        discount_total,
        total: subtotal - discount_total,
    }
}

pub fn preview(quantity: f64, unit_price: f64, discount_percent: f64) -> ItemPreview {
    ItemPreview {
        gross: quantity * unit_price,
        net: item_subtotal(quantity, unit_price, discount_percent),
    }
}

/// Round a monetary amount to whole cents (half away from zero).
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
