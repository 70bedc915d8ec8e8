//! Table rows and their cell values.

use std::fmt;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{QrLabelError, RowId};

/// A single cell of a source table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => fmt_float(*v, f),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Self::Null => Ok(()),
        }
    }
}

// Whole numbers keep one decimal so `5.0` stays distinguishable from `5`.
fn fmt_float(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        f.write_str("nan")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "inf" } else { "-inf" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One table row: an ordered mapping from column name to value.
///
/// Serializes as a JSON object of canonical cell texts in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    index: usize,
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new<K, V>(index: usize, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            index,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Zero-based position of the row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field that must be present.
    pub fn require(&self, field: &'static str) -> Result<&CellValue, QrLabelError> {
        self.get(field).ok_or_else(|| QrLabelError::MissingField {
            row: self.row_id(),
            field,
        })
    }

    /// Identity used in error reports.
    pub fn row_id(&self) -> RowId {
        RowId {
            index: self.index,
            tajo: self.get(crate::payload::TAJO).map(ToString::to_string),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, &value.to_string())?;
        }
        map.end()
    }
}

/// An ordered table of records sharing one header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table from a header and row values.
    ///
    /// Short rows are padded with [`CellValue::Null`]; values past the last
    /// column are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, mut row)| {
                row.resize(columns.len(), CellValue::Null);
                Record::new(index, columns.iter().cloned().zip(row))
            })
            .collect();
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn cell_text_renderings() {
        assert_eq!(CellValue::from("Veta Norte").to_string(), "Veta Norte");
        assert_eq!(CellValue::Integer(-7).to_string(), "-7");
        assert_eq!(CellValue::Float(5.0).to_string(), "5.0");
        assert_eq!(CellValue::Float(2.75).to_string(), "2.75");
        assert_eq!(CellValue::Float(0.1).to_string(), "0.1");
        assert_eq!(CellValue::Float(f64::NAN).to_string(), "nan");
        assert_eq!(CellValue::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(CellValue::Date(date(2024, 3, 9)).to_string(), "2024-03-09 00:00:00");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }

    #[test]
    fn record_serializes_in_column_order() {
        let record = Record::new(
            0,
            [
                ("Tajo", CellValue::from("T-07")),
                ("Nivel", CellValue::Integer(1)),
                ("Veta", CellValue::Float(2.0)),
            ],
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Tajo":"T-07","Nivel":"1","Veta":"2.0"}"#);
    }

    #[test]
    fn record_keeps_non_ascii_verbatim() {
        let record = Record::new(0, [("Zona", "Ñuñoa"), ("Nota", "€ ok")]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Zona":"Ñuñoa","Nota":"€ ok"}"#);
    }

    #[test]
    fn require_reports_row_identity() {
        let record = Record::new(4, [("Nivel", "N1"), ("Tajo", "T-9")]);
        let err = record.require("Veta").unwrap_err();
        match err {
            QrLabelError::MissingField { row, field } => {
                assert_eq!(field, "Veta");
                assert_eq!(row.index, 4);
                assert_eq!(row.tajo.as_deref(), Some("T-9"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn table_pads_and_truncates_rows() {
        let table = Table::new(
            vec!["Nivel".into(), "Veta".into(), "Tajo".into()],
            vec![
                vec!["N1".into()],
                vec!["N2".into(), "V2".into(), "T2".into(), "extra".into()],
            ],
        );
        assert_eq!(table.len(), 2);

        let first = table.get(0).unwrap();
        assert_eq!(first.get("Tajo"), Some(&CellValue::Null));
        assert_eq!(first.index(), 0);

        let second = table.get(1).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second.index(), 1);
        assert_eq!(second.get("Tajo"), Some(&CellValue::from("T2")));
    }
}
