//! The paper-roll inventory record and its lookup keys.
//!
//! The engine treats the record mostly as an opaque payload it caches and
//! forwards; the only field semantics it knows are the two lookup keys
//! (SKU and package id) and the wire names used for field-level edits.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Normalize a lookup key or scanned code: trim surrounding whitespace and
/// lowercase. Both the cache index and every lookup go through this.
pub fn normalize_key(code: &str) -> String {
    code.trim().to_lowercase()
}

/// A field value that may arrive as either a number or free text.
///
/// The spreadsheet backend does not enforce column types, so dimension and
/// quantity cells come back as whichever the operator typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Interpret the value as a number, parsing text if necessary.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Render the value as text. Whole numbers drop the trailing `.0`.
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                format!("{}", n as i64)
            }
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s,
        }
    }

    /// Check for the empty-cell case.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One paper roll in the warehouse inventory.
///
/// Field names on the wire are camelCase and match the remote sheet columns.
/// Two independent keys may resolve to the same record: `sku` and
/// `package_id`, both case-insensitively normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Stock-keeping-unit code, the primary lookup key
    #[serde(default)]
    pub sku: String,
    /// Intended purpose of the roll
    #[serde(default)]
    pub purpose: String,
    /// Package (bale) identifier, the secondary lookup key
    #[serde(default)]
    pub package_id: String,
    /// Paper type
    #[serde(default, rename = "type")]
    pub paper_type: String,
    /// Grammage (g/m²)
    #[serde(default)]
    pub gsm: FieldValue,
    /// Supplier name
    #[serde(default)]
    pub supplier: String,
    /// Manufacturer name
    #[serde(default)]
    pub manufacturer: String,
    /// Import date as entered
    #[serde(default)]
    pub import_date: String,
    /// Production date as entered
    #[serde(default)]
    pub prod_date: String,
    /// Roll length in centimeters
    #[serde(default)]
    pub length_cm: FieldValue,
    /// Roll width in centimeters
    #[serde(default)]
    pub width_cm: FieldValue,
    /// Weight
    #[serde(default)]
    pub weight: FieldValue,
    /// Quantity on hand
    #[serde(default)]
    pub quantity: FieldValue,
    /// Customer order reference
    #[serde(default)]
    pub customer_order: String,
    /// Internal material code
    #[serde(default)]
    pub material_code: String,
    /// Storage location
    #[serde(default)]
    pub location: String,
    /// Material reserved for outgoing shipment
    #[serde(default)]
    pub pending_out: String,
    /// Display name of the person who last entered data
    #[serde(default)]
    pub importer: String,
    /// Last-update timestamp, formatted `DD/MM/YYYY HH:MM:SS`
    #[serde(default)]
    pub updated_at: String,
}

impl InventoryRecord {
    /// The normalized keys this record should be indexed under.
    ///
    /// Empty keys are skipped; a record may legitimately carry only one of
    /// the two.
    pub fn cache_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(2);
        if !self.sku.trim().is_empty() {
            keys.push(normalize_key(&self.sku));
        }
        if !self.package_id.trim().is_empty() {
            keys.push(normalize_key(&self.package_id));
        }
        keys
    }

    /// Apply a field-level edit, addressed by the wire (camelCase) name.
    ///
    /// Text fields accept numeric values by rendering them; numeric fields
    /// keep whatever shape the caller supplied.
    pub fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "sku" => self.sku = value.into_text(),
            "purpose" => self.purpose = value.into_text(),
            "packageId" => self.package_id = value.into_text(),
            "type" => self.paper_type = value.into_text(),
            "gsm" => self.gsm = value,
            "supplier" => self.supplier = value.into_text(),
            "manufacturer" => self.manufacturer = value.into_text(),
            "importDate" => self.import_date = value.into_text(),
            "prodDate" => self.prod_date = value.into_text(),
            "lengthCm" => self.length_cm = value,
            "widthCm" => self.width_cm = value,
            "weight" => self.weight = value,
            "quantity" => self.quantity = value,
            "customerOrder" => self.customer_order = value.into_text(),
            "materialCode" => self.material_code = value.into_text(),
            "location" => self.location = value.into_text(),
            "pendingOut" => self.pending_out = value.into_text(),
            "importer" => self.importer = value.into_text(),
            "updatedAt" => self.updated_at = value.into_text(),
            other => return Err(Error::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InventoryRecord {
        InventoryRecord {
            sku: "SKU-001".into(),
            package_id: "PK-9".into(),
            paper_type: "kraft".into(),
            quantity: FieldValue::Number(3.0),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_key("  SKU-001 \n"), "sku-001");
        assert_eq!(normalize_key("pk-9"), "pk-9");
    }

    #[test]
    fn cache_keys_cover_both_identifiers() {
        let record = sample();
        assert_eq!(record.cache_keys(), vec!["sku-001", "pk-9"]);
    }

    #[test]
    fn cache_keys_skip_empty() {
        let record = InventoryRecord {
            sku: "A1".into(),
            ..Default::default()
        };
        assert_eq!(record.cache_keys(), vec!["a1"]);

        let record = InventoryRecord::default();
        assert!(record.cache_keys().is_empty());
    }

    #[test]
    fn set_field_by_wire_name() {
        let mut record = sample();
        record.set_field("location", "B-12".into()).unwrap();
        assert_eq!(record.location, "B-12");

        record.set_field("quantity", 7i64.into()).unwrap();
        assert_eq!(record.quantity, FieldValue::Number(7.0));

        record.set_field("type", "coated".into()).unwrap();
        assert_eq!(record.paper_type, "coated");
    }

    #[test]
    fn set_field_rejects_unknown() {
        let mut record = sample();
        let err = record.set_field("color", "red".into()).unwrap_err();
        assert_eq!(err, Error::UnknownField("color".into()));
    }

    #[test]
    fn numeric_field_accepts_text() {
        let mut record = sample();
        record.set_field("weight", "12,5".into()).unwrap();
        assert_eq!(record.weight, FieldValue::Text("12,5".into()));
    }

    #[test]
    fn field_value_as_f64() {
        assert_eq!(FieldValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::Text(" 42 ".into()).as_f64(), Some(42.0));
        assert_eq!(FieldValue::Text("n/a".into()).as_f64(), None);
    }

    #[test]
    fn field_value_into_text_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(7.0).into_text(), "7");
        assert_eq!(FieldValue::Number(7.25).into_text(), "7.25");
    }

    #[test]
    fn serialization_uses_wire_names() {
        let record = sample();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["packageId"], json!("PK-9"));
        assert_eq!(value["type"], json!("kraft"));
        assert_eq!(value["quantity"], json!(3.0));
    }

    #[test]
    fn deserialization_tolerates_missing_fields() {
        let record: InventoryRecord =
            serde_json::from_value(json!({"sku": "A1", "quantity": "5"})).unwrap();
        assert_eq!(record.sku, "A1");
        assert_eq!(record.quantity, FieldValue::Text("5".into()));
        assert!(record.location.is_empty());
    }

    #[test]
    fn serialization_roundtrip() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: InventoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
