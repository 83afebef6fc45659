//! Entity Mapper
//!
//! Translates between wire records (flat snake_case JSON objects, ISO date
//! strings, nulls) and domain entities. Pure and side-effect free apart from
//! diagnostics.
//!
//! - `to_domain` tolerates missing optional fields and unknown enum values
//! - `patch_to_wire` emits only the fields present in the patch

mod time;
mod rows;
mod records;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{DomainResult, Patchable};

pub use time::{parse_timestamp, format_timestamp};
pub use rows::{ProjectRow, TaskRow, NoteRow, AssetRow};
pub use records::{StakeholderRow, ResourceRow, AutomationRuleRow, TransactionRow, WhiteboardRow, CodeSnippetRow};

/// A flat wire record as sent to / received from the backend
pub type WireRecord = Map<String, Value>;

/// Entities with a wire representation and a backend table
pub trait Mapped: Patchable {
    /// Backend table name
    const TABLE: &'static str;

    /// Wire shape; every optional field defaults when absent
    type Row: Serialize + DeserializeOwned + Default;

    fn to_domain(row: Self::Row) -> Self;

    fn to_row(&self) -> Self::Row;

    /// Decode a record returned by the backend
    fn from_wire(value: Value) -> DomainResult<Self> {
        let row: Self::Row = serde_json::from_value(value)?;
        Ok(Self::to_domain(row))
    }

    /// Full record, e.g. for export or seeding a backend
    fn to_wire(&self) -> WireRecord {
        to_record(&self.to_row())
    }

    /// Insert payload; never contains id, timestamps or derived fields
    fn draft_to_wire(draft: &Self::Draft) -> WireRecord {
        to_record(draft)
    }

    /// Sparse update payload: absent means "do not change"
    fn patch_to_wire(patch: &Self::Patch) -> WireRecord {
        to_record(patch)
    }
}

/// Serialize a struct into a flat record
pub fn to_record<T: Serialize>(value: &T) -> WireRecord {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!("[MAPPER] Expected an object record, got {}", other);
            WireRecord::new()
        }
        Err(e) => {
            log::warn!("[MAPPER] Failed to serialize record: {}", e);
            WireRecord::new()
        }
    }
}

/// Decode a batch of rows, skipping (and logging) the ones that don't fit
pub fn decode_all<E: Mapped>(values: Vec<Value>) -> Vec<E> {
    values
        .into_iter()
        .filter_map(|value| match E::from_wire(value) {
            Ok(entity) => Some(entity),
            Err(e) => {
                log::warn!("[MAPPER] Skipping malformed {} row: {}", E::TABLE, e);
                None
            }
        })
        .collect()
}
