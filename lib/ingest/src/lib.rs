//! # shapematch Ingest
//!
//! Reads comma-separated text with a header row into raw rows, then into a
//! [`Dataset`]. Cells are kept as strings; [`shapematch_core::normalize`]
//! decides what is a number and what is missing.
//!
//! A feature column absent from the header is a load failure. Zero data rows
//! is not: the result is an empty dataset and the session reports "no data".
//! Bytes that are not UTF-8 (Shift_JIS exports, stray binary) are decoded
//! lossily, so a bad cell degrades to a malformed slot instead of failing the load.

use csv::{ByteRecord, ReaderBuilder, Trim};
use std::borrow::Cow;
use serde_json::{Map, Value};
use shapematch_core::{Dataset, DatasetBuilder, DatasetSchema, Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Parse CSV text into header-keyed rows.
///
/// Short rows are padded with empty cells; extra cells are dropped.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Map<String, Value>>> {
    let mut csv = csv_reader(reader);
    let headers = read_headers(&mut csv)?;

    let mut rows = Vec::new();
    for (index, record) in csv.byte_records().enumerate() {
        let record = record.map_err(csv_error)?;
        rows.push(row_from_record(&headers, &record, index));
    }
    debug!("Read {} CSV row(s) with {} column(s)", rows.len(), headers.len());
    Ok(rows)
}

/// Stream CSV text into a dataset laid out by `schema`
pub fn load_dataset<R: Read>(reader: R, schema: &DatasetSchema) -> Result<Dataset> {
    schema.validate()?;

    let mut csv = csv_reader(reader);
    let headers = read_headers(&mut csv)?;
    check_columns(&headers, schema)?;

    let mut builder = DatasetBuilder::new(schema.clone());
    for (index, record) in csv.byte_records().enumerate() {
        let record = record.map_err(csv_error)?;
        builder.push_row(row_from_record(&headers, &record, index));
    }
    Ok(builder.build())
}

pub fn load_dataset_from_path<P: AsRef<Path>>(path: P, schema: &DatasetSchema) -> Result<Dataset> {
    let path = path.as_ref();
    info!("Loading dataset from {:?}", path);
    let file = File::open(path)?;
    load_dataset(file, schema)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader)
}

fn read_headers<R: Read>(csv: &mut csv::Reader<R>) -> Result<Vec<String>> {
    let headers = csv.byte_headers().map_err(csv_error)?;
    Ok(headers.iter().map(|h| decode(h).trim().to_string()).collect())
}

fn check_columns(headers: &[String], schema: &DatasetSchema) -> Result<()> {
    for column in &schema.feature_columns {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column.clone()));
        }
    }
    Ok(())
}

fn row_from_record(headers: &[String], record: &ByteRecord, index: usize) -> Map<String, Value> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let cell = decode(record.get(i).unwrap_or(b""));
            if let Cow::Owned(_) = cell {
                debug!("Row {}: column '{}' is not valid UTF-8, decoded lossily", index, header);
            }
            (header.clone(), Value::String(cell.into_owned()))
        })
        .collect()
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn csv_error(e: csv::Error) -> Error {
    if e.is_io_error() {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            other => Error::Csv(format!("{:?}", other)),
        }
    } else {
        Error::Csv(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapematch_core::{RecordId, Shape};
    use std::io::Write;

    const SAMPLE: &str = "\
id,name,shape_1,shape_2,shape_3,shape_4,shape_5,shape_6,lat,lon
matsumoto,Matsumoto,0.1,0.9,0.2,#N/A,0.3,0.5,36.23,137.97
nagano,Nagano,0.8,0.1,,0.2,0.1,0.0,36.65,138.18
ueda,Ueda,#VALUE!,0.4,0.4,0.4,#DIV/0!,0.9,36.40,138.25
";

    #[test]
    fn test_read_rows_keeps_cells_as_text() {
        let rows = read_rows(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["shape_3"], Value::String(String::new()));
        assert_eq!(rows[0]["shape_4"], Value::String("#N/A".to_string()));
    }

    #[test]
    fn test_load_dataset_normalizes_sentinels() {
        let dataset = load_dataset(SAMPLE.as_bytes(), &DatasetSchema::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.dim(), 6);

        let matsumoto = dataset.get(&RecordId::from("matsumoto")).unwrap();
        assert_eq!(matsumoto.name, "Matsumoto");
        assert_eq!(matsumoto.vector.value(3), None);
        assert_eq!(matsumoto.vector.defined_count(), 5);

        let ueda = dataset.get(&RecordId::from("ueda")).unwrap();
        assert_eq!(ueda.vector.value(0), None);
        assert_eq!(ueda.vector.value(4), None);
        assert_eq!(ueda.attributes.as_ref().unwrap()["lon"], "138.25");
    }

    #[test]
    fn test_missing_feature_column_fails() {
        let text = "id,name,shape_1,shape_2\nx,X,0.1,0.2\n";
        let err = load_dataset(text.as_bytes(), &DatasetSchema::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "shape_3"));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let text = "id,name,shape_1,shape_2,shape_3,shape_4,shape_5,shape_6\n";
        let dataset = load_dataset(text.as_bytes(), &DatasetSchema::default()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let schema = DatasetSchema::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let text = "id,a,b,c\nshort,0.5\n";
        let dataset = load_dataset(text.as_bytes(), &schema).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.vector.as_slice(), &[Some(0.5), None, None]);
    }

    #[test]
    fn test_invalid_utf8_cells_do_not_fail_the_load() {
        let mut bytes = b"id,name,shape_1,shape_2,shape_3,shape_4,shape_5,shape_6\n".to_vec();
        bytes.extend_from_slice(b"x,X,0.9,\x82\xa0,0.1,0.1,0.1,0.1\n");
        bytes.extend_from_slice(b"y,\x92\xb7\x96\xec,0.1,0.9,0.1,0.1,0.1,0.1\n");

        let dataset = load_dataset(bytes.as_slice(), &DatasetSchema::default()).unwrap();
        assert_eq!(dataset.len(), 2);

        let x = dataset.get(&RecordId::from("x")).unwrap();
        assert_eq!(x.vector.value(1), None);
        assert_eq!(x.vector.defined_count(), 5);

        let y = dataset.get(&RecordId::from("y")).unwrap();
        assert!(y.name.contains('\u{FFFD}'));
        assert_eq!(y.vector.value(1), Some(0.9));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let dataset = load_dataset_from_path(file.path(), &DatasetSchema::default()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_dataset_from_path("/nonexistent/shapes.csv", &DatasetSchema::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
