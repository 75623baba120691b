//! # Rollstock Engine
//!
//! The offline core of the Rollstock warehouse data-entry client.
//!
//! This crate holds the pure logic for buffering user-generated mutations
//! while the device is offline and converging them to the server later:
//! the write queue, the lookup cache, batch selection, and retry backoff.
//! Everything here is deterministic and IO-free; the companion client crate
//! owns the network, the clock, and durable storage.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Testable**: Pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! The domain entity is an [`InventoryRecord`] — one paper roll in the
//! warehouse. Two independent keys resolve to the same record: the SKU
//! and the package id, both case-insensitively normalized.
//!
//! ### Payloads
//!
//! Pending work is expressed as a tagged [`Payload`]:
//! - [`Payload::Update`] - a full record update
//! - [`Payload::ReImport`] - minimal re-import lines (sku, weight, quantity)
//! - [`Payload::Export`] - minimal export lines (sku, quantity)
//!
//! Each enqueue call wraps one payload in a [`QueueItem`] with a unique id,
//! a timestamp, a retry counter, and a target destination.
//!
//! ### Write Queue
//!
//! The [`WriteQueue`] is an append-ordered list of queue items. Delivery
//! order follows insertion order within a destination group. Batch
//! selection takes a contiguous same-destination prefix from the head of
//! the queue, bounded by [`MAX_BATCH_SIZE`].
//!
//! ### Lookup Cache
//!
//! The [`LookupCache`] maps normalized keys to the last-known record and
//! serves searches without a network round-trip. It gives read-your-writes
//! consistency locally: an edited record is visible to search before it
//! has synced.
//!
//! ### Backoff
//!
//! [`Backoff`] tracks the retry interval: doubled on failure up to a
//! ceiling, reset to a fast interval on success, collapsed to near-zero
//! on a manual sync request or on regained connectivity.

pub mod backoff;
pub mod cache;
pub mod error;
pub mod payload;
pub mod queue;
pub mod record;

// Re-export main types at crate root
pub use backoff::Backoff;
pub use cache::LookupCache;
pub use error::Error;
pub use payload::{
    ExportLine, Payload, QueueItem, ReImportEntry, ReImportLine, DESTINATION_DEFAULT,
    DESTINATION_EXPORT, DESTINATION_RE_IMPORT,
};
pub use queue::{Batch, WriteQueue, MAX_BATCH_SIZE};
pub use record::{normalize_key, FieldValue, InventoryRecord};

/// Type aliases for clarity
pub type ItemId = String;
pub type Destination = String;
pub type Timestamp = u64;
