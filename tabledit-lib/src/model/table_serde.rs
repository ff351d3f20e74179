//! Wire format for tables.
//!
//! The store speaks in arrays of flat JSON objects, one object per row, keyed
//! by column name:
//!
//! ```json
//! [{"name": "Ada", "age": "36"}, {"name": "Alan", "age": "41"}]
//! ```
//!
//! ## Read
//!
//! - Headers are the keys of the first object, in the order they appear.
//! - Later objects are read by those headers; a missing key reads as `""`
//!   and keys the first object did not have are ignored.
//! - Strings are taken as-is, `null` becomes `""`, anything else becomes its
//!   JSON text (`1`, `true`, `[1,2]`).
//!
//! ## Write
//!
//! Rows serialize back to objects whose keys follow the header order.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde_json::Value;

use super::Row;
use super::Table;

/// A row as it travels over the wire.
pub type RawRow = serde_json::Map<String, Value>;

/// Renders a JSON value as cell text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Table {
    /// Builds a table from rows as returned by the store.
    pub fn from_raw_rows(raw: &[RawRow]) -> Self {
        let headers: Vec<String> = raw
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default();

        let rows = raw
            .iter()
            .map(|obj| Row {
                cells: headers
                    .iter()
                    .map(|h| obj.get(h).map(cell_text).unwrap_or_default())
                    .collect(),
            })
            .collect();

        Self { headers, rows }
    }

    /// Converts the rows back into wire objects.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(&row.cells)
                    .map(|(h, v)| (h.clone(), Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}

/// Serializes one row as a JSON object keyed by the table headers.
struct RowObject<'a> {
    headers: &'a [String],
    row: &'a Row,
}

impl Serialize for RowObject<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(&self.row.cells) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowObject {
                headers: &self.headers,
                row,
            })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<RawRow>::deserialize(deserializer)?;
        Ok(Table::from_raw_rows(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_follow_first_row_key_order() {
        let json = r#"[{"zeta": "1", "alpha": "2", "mid": "3"}]"#;
        let table: Table = serde_json::from_str(json).unwrap();

        assert_eq!(table.headers(), ["zeta", "alpha", "mid"]);
        assert_eq!(table.cell(0, "alpha"), Some("2"));
    }

    #[test]
    fn test_empty_response_has_no_headers() {
        let table: Table = serde_json::from_str("[]").unwrap();

        assert!(table.headers().is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_non_string_values() {
        let json = r#"[{"n": 12, "b": true, "z": null, "s": "x"}]"#;
        let table: Table = serde_json::from_str(json).unwrap();

        assert_eq!(table.rows()[0].cells(), ["12", "true", "", "x"]);
    }

    #[test]
    fn test_ragged_rows_are_normalized() {
        let json = r#"[{"a": "1", "b": "2"}, {"a": "3", "extra": "?"}]"#;
        let table: Table = serde_json::from_str(json).unwrap();

        assert_eq!(table.rows()[1].cells(), ["3", ""]);
        assert!(table.check_widths().is_ok());
    }

    #[test]
    fn test_serialize_in_header_order() {
        let mut table = Table::new(vec!["b".into(), "a".into()]);
        table.push_blank_row();
        table.set_cell(0, 0, "x").unwrap();

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"b":"x","a":""}]"#);
    }

    #[test]
    fn test_to_raw_rows() {
        let json = r#"[{"x": "1"}]"#;
        let table: Table = serde_json::from_str(json).unwrap();
        let raw = table.to_raw_rows();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].get("x"), Some(&Value::String("1".into())));
    }
}
