//! Id deserialization that also accepts the numeric, clock-derived ids older
//! budgets were saved with.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Uuid(Uuid),
    Number(f64),
}

/// Numeric ids get a fresh random id; they may collide with each other, so
/// they are never reused.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    match StoredId::deserialize(deserializer)? {
        StoredId::Uuid(id) => Ok(id),
        StoredId::Number(n) => {
            let id = Uuid::new_v4();
            tracing::debug!("Assigned id {} to legacy id {}", id, n);
            Ok(id)
        }
    }
}
