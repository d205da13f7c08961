//! Raw field normalization
//!
//! Turns loosely-typed tabular cells into [`FeatureVector`] slots. Every cell is
//! resolved once into a [`Cell`]; downstream code only ever sees
//! `Option<f32>`. Nothing here fails: unreadable input becomes a missing slot.

use crate::vector::FeatureVector;
use serde_json::{Map, Value};

/// Spreadsheet error tokens treated as blank cells (compared case-insensitively)
pub const MISSING_SENTINELS: &[&str] = &[
    "#VALUE!", "#N/A", "#DIV/0!", "#REF!", "#NAME?", "#NUM!", "#NULL!", "N/A",
];

/// A raw cell resolved into a number or the reason it is missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Number(f32),
    /// Absent key, JSON null or empty string
    Blank,
    /// A recognized spreadsheet error token
    Sentinel,
    /// A finite number outside [0, 1], carrying its clamped value
    Clamped(f32),
    /// Present but not a number
    Malformed,
}

impl Cell {
    #[inline]
    pub fn value(self) -> Option<f32> {
        match self {
            Cell::Number(x) | Cell::Clamped(x) => Some(x),
            _ => None,
        }
    }

    #[inline]
    pub fn is_malformed(self) -> bool {
        matches!(self, Cell::Malformed)
    }

    #[inline]
    pub fn is_clamped(self) -> bool {
        matches!(self, Cell::Clamped(_))
    }
}

/// Cells in one row that did not map cleanly onto a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    /// Became missing
    pub malformed: usize,
    /// Kept, but pulled into [0, 1]
    pub clamped: usize,
}

/// Classify a single raw cell
pub fn classify_cell(raw: Option<&Value>) -> Cell {
    match raw {
        None | Some(Value::Null) => Cell::Blank,
        Some(Value::Number(n)) => n.as_f64().map_or(Cell::Malformed, number_cell),
        Some(Value::String(s)) => classify_text(s),
        Some(_) => Cell::Malformed,
    }
}

fn classify_text(text: &str) -> Cell {
    let text = text.trim();
    if text.is_empty() {
        return Cell::Blank;
    }
    if MISSING_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(text)) {
        return Cell::Sentinel;
    }
    match text.parse::<f64>() {
        Ok(x) => number_cell(x),
        Err(_) => Cell::Malformed,
    }
}

fn number_cell(x: f64) -> Cell {
    if !x.is_finite() {
        Cell::Malformed
    } else if (0.0..=1.0).contains(&x) {
        Cell::Number(x as f32)
    } else {
        Cell::Clamped(x.clamp(0.0, 1.0) as f32)
    }
}

/// Normalize the fields named by `keys`, in order, into a feature vector.
///
/// The result always has `keys.len()` slots.
pub fn normalize(raw: &Map<String, Value>, keys: &[String]) -> FeatureVector {
    normalize_counting(raw, keys).0
}

/// Like [`normalize`], also counting malformed and clamped cells
pub fn normalize_counting(raw: &Map<String, Value>, keys: &[String]) -> (FeatureVector, CellCounts) {
    let mut counts = CellCounts::default();
    let slots = keys
        .iter()
        .map(|key| {
            let cell = classify_cell(raw.get(key));
            if cell.is_malformed() {
                counts.malformed += 1;
            } else if cell.is_clamped() {
                counts.clamped += 1;
            }
            cell.value()
        })
        .collect();
    (FeatureVector::new(slots), counts)
}
