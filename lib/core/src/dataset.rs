use crate::config::DatasetSchema;
use crate::normalize::normalize_counting;
use crate::record::{Record, RecordId};
use crate::vector::Shape;
use crate::{Error, Result};
use ahash::AHashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The immutable set of records the engine ranks against.
///
/// Built once at load time and shared behind an `Arc`; no locking needed.
#[derive(Debug, Clone)]
pub struct Dataset {
    keys: Vec<String>,
    records: Vec<Arc<Record>>,
    index: AHashMap<RecordId, usize>,
}

impl Dataset {
    /// Build a dataset from already-normalized records
    pub fn new(keys: Vec<String>, records: Vec<Record>) -> Result<Self> {
        let mut dataset = Self::empty(keys);
        for record in records {
            if record.vector.dim() != dataset.dim() {
                return Err(Error::InvalidDimension {
                    expected: dataset.dim(),
                    actual: record.vector.dim(),
                });
            }
            if dataset.index.contains_key(&record.id) {
                return Err(Error::DuplicateRecord(record.id.to_string()));
            }
            dataset.push(record);
        }
        Ok(dataset)
    }

    pub fn empty(keys: Vec<String>) -> Self {
        Self {
            keys,
            records: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Normalize raw rows into a dataset.
    ///
    /// Malformed cells become missing slots. Rows whose id repeats an earlier
    /// row are skipped with a warning.
    pub fn from_rows<I>(rows: I, schema: &DatasetSchema) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut builder = DatasetBuilder::new(schema.clone());
        for row in rows {
            builder.push_row(row);
        }
        builder.build()
    }

    fn push(&mut self, record: Record) {
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(Arc::new(record));
    }

    /// Number of shape axes (K)
    #[inline]
    pub fn dim(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order
    #[inline]
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.index.get(id).map(|&i| &self.records[i])
    }
}

/// Incremental row-to-record conversion used by loaders
pub struct DatasetBuilder {
    schema: DatasetSchema,
    dataset: Dataset,
    rows_seen: usize,
    malformed_cells: usize,
    clamped_cells: usize,
    duplicates: usize,
}

impl DatasetBuilder {
    pub fn new(schema: DatasetSchema) -> Self {
        let dataset = Dataset::empty(schema.feature_columns.clone());
        Self {
            schema,
            dataset,
            rows_seen: 0,
            malformed_cells: 0,
            clamped_cells: 0,
            duplicates: 0,
        }
    }

    pub fn push_row(&mut self, mut row: Map<String, Value>) {
        let row_index = self.rows_seen;
        self.rows_seen += 1;

        let (vector, counts) = normalize_counting(&row, &self.schema.feature_columns);
        if counts.malformed > 0 {
            debug!("Row {}: {} malformed cell(s) treated as missing", row_index, counts.malformed);
            self.malformed_cells += counts.malformed;
        }
        if counts.clamped > 0 {
            debug!("Row {}: {} out-of-range cell(s) clamped to [0, 1]", row_index, counts.clamped);
            self.clamped_cells += counts.clamped;
        }

        let id = self
            .schema
            .id_column
            .as_deref()
            .and_then(|column| row.get(column))
            .and_then(record_id_from_cell)
            .unwrap_or(RecordId::Integer(row_index as u64));

        if self.dataset.index.contains_key(&id) {
            warn!("Duplicate record id {} at row {}, keeping the first", id, row_index);
            self.duplicates += 1;
            return;
        }

        let name = self
            .schema
            .name_column
            .as_deref()
            .and_then(|column| row.get(column))
            .and_then(text_from_cell)
            .unwrap_or_else(|| id.to_string());

        row.retain(|column, _| !self.schema.is_known_column(column));
        let mut record = Record::new(id, name, vector);
        if !row.is_empty() {
            record = record.with_attributes(Value::Object(row));
        }
        self.dataset.push(record);
    }

    pub fn malformed_cells(&self) -> usize {
        self.malformed_cells
    }

    pub fn clamped_cells(&self) -> usize {
        self.clamped_cells
    }

    pub fn build(self) -> Dataset {
        if self.dataset.is_empty() {
            warn!("Dataset is empty after reading {} row(s)", self.rows_seen);
        } else {
            info!(
                "Dataset loaded: {} records, {} axes, {} malformed cells, {} clamped cells, {} duplicates skipped",
                self.dataset.len(),
                self.dataset.dim(),
                self.malformed_cells,
                self.clamped_cells,
                self.duplicates
            );
            if self.clamped_cells > 0 {
                warn!(
                    "{} feature value(s) were outside [0, 1] and clamped; similarity uses the clamped values",
                    self.clamped_cells
                );
            }
        }
        self.dataset
    }
}

fn record_id_from_cell(cell: &Value) -> Option<RecordId> {
    match cell {
        Value::Number(n) => n
            .as_u64()
            .map(RecordId::Integer)
            .or_else(|| Some(RecordId::String(n.to_string()))),
        other => text_from_cell(other).map(RecordId::String),
    }
}

fn text_from_cell(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
