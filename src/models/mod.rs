//! Domain models for the budget.
//!
//! - [`Item`]: one priced, discountable line. Its `subtotal` is derived and
//!   only ever recomputed from quantity, unit price and discount.
//! - [`Snapshot`]: an immutable, timestamped copy of the whole item list.
//!
//! Wire shapes follow the persisted layout: items serialize as
//! `{id, description, quantity, unitPrice, discount, subtotal}` and snapshots
//! as `{id, date, items}`. Numeric ids from older saves are accepted on load
//! and replaced with fresh ones.

mod item;
mod legacy_id;
mod snapshot;

pub use item::*;
pub use snapshot::*;
