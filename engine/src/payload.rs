//! Queue payloads and the unit of pending work.
//!
//! Each user-facing save action enqueues exactly one [`QueueItem`]. The
//! payload shape varies by operation kind, so it is a closed tagged variant
//! rather than loose JSON: the sync engine can flatten it exhaustively
//! instead of shape-sniffing at drain time.

use crate::record::{FieldValue, InventoryRecord};
use crate::{Destination, ItemId, Timestamp};
use serde::{Deserialize, Serialize};

/// Default destination sheet for record updates.
pub const DESTINATION_DEFAULT: &str = "KHO";
/// Destination sheet for re-import batches.
pub const DESTINATION_RE_IMPORT: &str = "SKUN";
/// Destination sheet for export batches.
pub const DESTINATION_EXPORT: &str = "SKUX";

/// A draft re-import row as the entry form holds it.
///
/// Carries a row id for list editing in the UI; the id never reaches the
/// queue or the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReImportEntry {
    pub id: String,
    pub sku: String,
    pub weight: FieldValue,
    pub quantity: FieldValue,
}

/// One re-import line as delivered to the server: exactly sku, weight,
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReImportLine {
    pub sku: String,
    pub weight: FieldValue,
    pub quantity: FieldValue,
}

impl From<&ReImportEntry> for ReImportLine {
    fn from(entry: &ReImportEntry) -> Self {
        Self {
            sku: entry.sku.clone(),
            weight: entry.weight.clone(),
            quantity: entry.quantity.clone(),
        }
    }
}

/// One export line as delivered to the server: exactly sku, quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLine {
    pub sku: String,
    pub quantity: FieldValue,
}

impl From<&ReImportEntry> for ExportLine {
    fn from(entry: &ReImportEntry) -> Self {
        Self {
            sku: entry.sku.clone(),
            quantity: entry.quantity.clone(),
        }
    }
}

/// The payload of one queue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Payload {
    /// A full record update (stamped with importer and timestamp by the
    /// caller before enqueueing).
    Update(InventoryRecord),
    /// Minimal re-import lines.
    ReImport(Vec<ReImportLine>),
    /// Minimal export lines.
    Export(Vec<ExportLine>),
}

impl Payload {
    /// Flatten the payload into wire lines for one delivery request.
    ///
    /// A record payload contributes one line; array payloads expand to
    /// their constituent lines.
    pub fn flatten(&self) -> Vec<serde_json::Value> {
        match self {
            Payload::Update(record) => vec![serde_json::to_value(record).unwrap_or_default()],
            Payload::ReImport(lines) => lines
                .iter()
                .map(|l| serde_json::to_value(l).unwrap_or_default())
                .collect(),
            Payload::Export(lines) => lines
                .iter()
                .map(|l| serde_json::to_value(l).unwrap_or_default())
                .collect(),
        }
    }

    /// Number of wire lines this payload contributes.
    pub fn line_count(&self) -> usize {
        match self {
            Payload::Update(_) => 1,
            Payload::ReImport(lines) => lines.len(),
            Payload::Export(lines) => lines.len(),
        }
    }
}

fn default_destination() -> Destination {
    DESTINATION_DEFAULT.to_string()
}

/// The unit of queuing, persistence, and progress reporting.
///
/// Items are append-ordered, never mutated in place, and removed only after
/// the sync engine confirms remote delivery of the batch containing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique identifier, time + randomness derived, never reused
    pub id: ItemId,
    /// The pending mutation
    pub payload: Payload,
    /// When the item was enqueued (milliseconds since epoch)
    pub timestamp: Timestamp,
    /// Failed delivery attempts of batches containing this item
    #[serde(default)]
    pub retry_count: u32,
    /// Target destination sheet
    #[serde(default = "default_destination")]
    pub destination: Destination,
}

impl QueueItem {
    /// Create a queue item. A missing destination falls back to
    /// [`DESTINATION_DEFAULT`].
    pub fn new(
        id: impl Into<ItemId>,
        payload: Payload,
        destination: Option<&str>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            payload,
            timestamp,
            retry_count: 0,
            destination: destination
                .map(str::to_string)
                .unwrap_or_else(default_destination),
        }
    }
}
