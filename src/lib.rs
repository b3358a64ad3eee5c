//! Quote/budget line-item manager.
//!
//! Users add priced, discountable line items, see live totals, persist the
//! working set and snapshot it into a history that can later be restored or
//! discarded. The [`budget::Budget`] facade composes the independent pieces:
//!
//! - [`calc`]: pure subtotal and aggregate computations.
//! - [`items::ItemStore`]: the live, ordered item collection.
//! - [`session::EditSession`]: whether the next submit adds or updates.
//! - [`persistence::PersistenceGateway`]: load/save to a durable key-value store.
//! - [`history::HistoryArchive`]: timestamped snapshots of the collection.

pub mod budget;
pub mod calc;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod items;
pub mod models;
pub mod persistence;
pub mod render;
pub mod session;
