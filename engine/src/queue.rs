//! The durable write queue and batch selection.
//!
//! The queue is an append-ordered sequence of [`QueueItem`]s. Insertion
//! order defines delivery priority within a destination group; the head of
//! the queue always determines the active destination for the next drain.

use crate::payload::QueueItem;
use crate::{Destination, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of queue items bundled into one delivery attempt.
pub const MAX_BATCH_SIZE: usize = 5;

/// A selected batch: a bounded, same-destination, contiguous prefix of the
/// queue, flattened into wire lines for one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Destination sheet the whole batch targets
    pub destination: Destination,
    /// Identities of the selected queue items, in queue order
    pub item_ids: Vec<ItemId>,
    /// Flattened wire lines, in queue order
    pub lines: Vec<serde_json::Value>,
}

impl Batch {
    /// Number of queue items in the batch.
    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    /// Number of wire lines in the batch.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// An ordered, durable list of pending mutation batches awaiting delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteQueue {
    items: Vec<QueueItem>,
}

impl WriteQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted items, preserving order.
    pub fn from_items(items: Vec<QueueItem>) -> Self {
        Self { items }
    }

    /// Append an item to the end of the queue.
    pub fn push(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the queue has no pending items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All pending items, oldest first.
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Select the next batch to deliver, or `None` if the queue is empty.
    ///
    /// The destination of the head item fixes the batch's target for this
    /// round. Selection walks the queue front in order and stops at the
    /// first mismatched destination or after `max_items`, whichever comes
    /// first. Items behind a destination boundary are never pulled forward;
    /// cross-destination batching is not reordering-safe. A large backlog
    /// for one destination can therefore delay another indefinitely.
    pub fn select_batch(&self, max_items: usize) -> Option<Batch> {
        let head = self.items.first()?;
        let destination = head.destination.clone();

        let mut item_ids = Vec::new();
        let mut lines = Vec::new();
        for item in &self.items {
            if item.destination != destination || item_ids.len() >= max_items {
                break;
            }
            item_ids.push(item.id.clone());
            lines.extend(item.payload.flatten());
        }

        Some(Batch {
            destination,
            item_ids,
            lines,
        })
    }

    /// Remove items by identity after a confirmed delivery.
    ///
    /// Returns the number of items removed.
    pub fn remove_ids(&mut self, ids: &HashSet<ItemId>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    /// Bump the retry counter of the given items after a failed delivery.
    ///
    /// The counter is reported in logs only; no retry ceiling is enforced.
    pub fn mark_failed(&mut self, ids: &HashSet<ItemId>) {
        for item in &mut self.items {
            if ids.contains(&item.id) {
                item.retry_count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ExportLine, Payload, DESTINATION_DEFAULT, DESTINATION_EXPORT};
    use crate::record::FieldValue;

    fn export_item(id: &str, destination: &str) -> QueueItem {
        QueueItem::new(
            id,
            Payload::Export(vec![ExportLine {
                sku: format!("sku-{id}"),
                quantity: FieldValue::Number(1.0),
            }]),
            Some(destination),
            1000,
        )
    }

    #[test]
    fn empty_queue_selects_nothing() {
        let queue = WriteQueue::new();
        assert!(queue.select_batch(MAX_BATCH_SIZE).is_none());
    }

    #[test]
    fn head_destination_fixes_the_batch() {
        let mut queue = WriteQueue::new();
        queue.push(export_item("a", DESTINATION_DEFAULT));
        queue.push(export_item("b", DESTINATION_EXPORT));
        queue.push(export_item("c", DESTINATION_DEFAULT));

        let batch = queue.select_batch(MAX_BATCH_SIZE).unwrap();
        assert_eq!(batch.destination, DESTINATION_DEFAULT);
        // c sits behind the destination boundary at b and is not pulled ahead
        assert_eq!(batch.item_ids, vec!["a"]);
    }

    #[test]
    fn batch_is_bounded() {
        let mut queue = WriteQueue::new();
        for i in 0..8 {
            queue.push(export_item(&format!("i{i}"), DESTINATION_DEFAULT));
        }

        let batch = queue.select_batch(MAX_BATCH_SIZE).unwrap();
        assert_eq!(batch.item_count(), 5);
        assert_eq!(batch.item_ids[0], "i0");
        assert_eq!(batch.item_ids[4], "i4");
    }

    #[test]
    fn batch_flattens_lines_in_queue_order() {
        let mut queue = WriteQueue::new();
        queue.push(QueueItem::new(
            "multi",
            Payload::Export(vec![
                ExportLine {
                    sku: "A1".into(),
                    quantity: FieldValue::Number(1.0),
                },
                ExportLine {
                    sku: "B2".into(),
                    quantity: FieldValue::Number(2.0),
                },
            ]),
            Some(DESTINATION_EXPORT),
            1000,
        ));
        queue.push(export_item("single", DESTINATION_EXPORT));

        let batch = queue.select_batch(MAX_BATCH_SIZE).unwrap();
        assert_eq!(batch.item_count(), 2);
        assert_eq!(batch.line_count(), 3);
        assert_eq!(batch.lines[0]["sku"], "A1");
        assert_eq!(batch.lines[1]["sku"], "B2");
        assert_eq!(batch.lines[2]["sku"], "sku-single");
    }

    #[test]
    fn remove_ids_keeps_order_of_survivors() {
        let mut queue = WriteQueue::new();
        queue.push(export_item("a", DESTINATION_DEFAULT));
        queue.push(export_item("b", DESTINATION_DEFAULT));
        queue.push(export_item("c", DESTINATION_DEFAULT));

        let removed: HashSet<_> = ["a".to_string(), "c".to_string()].into_iter().collect();
        assert_eq!(queue.remove_ids(&removed), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].id, "b");
    }

    #[test]
    fn mark_failed_bumps_only_selected() {
        let mut queue = WriteQueue::new();
        queue.push(export_item("a", DESTINATION_DEFAULT));
        queue.push(export_item("b", DESTINATION_DEFAULT));

        let failed: HashSet<_> = ["a".to_string()].into_iter().collect();
        queue.mark_failed(&failed);
        queue.mark_failed(&failed);

        assert_eq!(queue.items()[0].retry_count, 2);
        assert_eq!(queue.items()[1].retry_count, 0);
    }

    #[test]
    fn serialization_roundtrip_preserves_order() {
        let mut queue = WriteQueue::new();
        queue.push(export_item("a", DESTINATION_DEFAULT));
        queue.push(export_item("b", DESTINATION_EXPORT));

        let json = serde_json::to_string(&queue).unwrap();
        let parsed: WriteQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(queue, parsed);
    }
}
