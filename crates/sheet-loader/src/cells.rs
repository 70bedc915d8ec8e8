//! Spreadsheet cell and header conversion.

use std::collections::HashMap;

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime};
use qr_labels::CellValue;

// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Convert one spreadsheet cell.
///
/// Whole-number floats become integers, since spreadsheet formats store all
/// numbers as floats.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < MAX_EXACT_INT => {
            CellValue::Integer(*v as i64)
        }
        Data::Float(v) => CellValue::Float(*v),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Column names from a header row.
///
/// Blank headers become `Unnamed: {col}`; repeated names get `.1`, `.2`, ...
pub fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(row.len());

    for (col, cell) in row.iter().enumerate() {
        let base = match cell_value(cell).to_string() {
            s if s.trim().is_empty() => format!("Unnamed: {col}"),
            s => s,
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }

    names
}

pub fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty))
}
