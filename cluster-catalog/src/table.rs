//! Columnar table I/O
//!
//! Thin helpers over `arrow`/`parquet` used by every catalog loader. A parquet
//! file is always read into a single [`RecordBatch`] so row indexes stay
//! stable for the lifetime of the catalog.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::{cast, concat_batches, filter_record_batch};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::reader::ChunkReader;

use crate::{CatalogError, Result};

/// Read a whole parquet file into one record batch
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_batches(file)
}

/// Read an in-memory parquet buffer into one record batch
pub fn read_parquet_bytes(data: impl Into<Bytes>) -> Result<RecordBatch> {
    read_batches(data.into())
}

fn read_batches<R: ChunkReader + 'static>(reader: R) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Serialize a record batch to parquet, keeping its schema untouched
pub fn write_parquet(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(buffer)
}

/// Keep only the given rows of a batch, in their original order
pub fn select_rows(batch: &RecordBatch, rows: &[usize]) -> Result<RecordBatch> {
    let mut mask = vec![false; batch.num_rows()];
    for &row in rows {
        if let Some(slot) = mask.get_mut(row) {
            *slot = true;
        }
    }
    Ok(filter_record_batch(batch, &BooleanArray::from(mask))?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))
}

/// Read a string-like column (utf8, large utf8 or dictionary encoded)
pub fn string_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let values = cast(column(batch, name)?, &DataType::Utf8)?;
    let values = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| CatalogError::ColumnType {
            column: name.to_string(),
            expected: "string",
        })?;
    Ok(values.iter().map(|v| v.map(str::to_string)).collect())
}

/// Read a numeric column as `f64`; nulls and NaN both come back as `None`
pub fn f64_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    let values = cast(column(batch, name)?, &DataType::Float64)?;
    let values = values
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| CatalogError::ColumnType {
            column: name.to_string(),
            expected: "float",
        })?;
    Ok(values.iter().map(|v| v.filter(|x| !x.is_nan())).collect())
}

/// Like [`f64_column`], but an absent column reads as all nulls
pub fn optional_f64_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    if batch.column_by_name(name).is_none() {
        return Ok(vec![None; batch.num_rows()]);
    }
    f64_column(batch, name)
}

/// Read an integer count column; negative values are treated as null
pub fn count_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<u64>>> {
    let values = cast(column(batch, name)?, &DataType::Int64)?;
    let values = values
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| CatalogError::ColumnType {
            column: name.to_string(),
            expected: "integer",
        })?;
    Ok(values
        .iter()
        .map(|v| v.and_then(|n| u64::try_from(n).ok()))
        .collect())
}

/// Number of null slots in a column, for load-time diagnostics
pub fn null_count(batch: &RecordBatch, name: &str) -> usize {
    batch
        .column_by_name(name)
        .map(|c| c.null_count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Int32Array, LargeStringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn mixed_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::LargeUtf8, true),
            Field::new("mag", DataType::Float32, true),
            Field::new("count", DataType::Int32, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(LargeStringArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(Float32Array::from(vec![Some(1.5), Some(f32::NAN), None])),
                Arc::new(Int32Array::from(vec![Some(3), Some(-1), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_are_cast_to_common_types() {
        let batch = mixed_batch();

        let names = string_column(&batch, "name").unwrap();
        assert_eq!(names, vec![Some("a".to_string()), None, Some("c".to_string())]);

        let mags = f64_column(&batch, "mag").unwrap();
        assert_eq!(mags, vec![Some(1.5), None, None]);

        let counts = count_column(&batch, "count").unwrap();
        assert_eq!(counts, vec![Some(3), None, None]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let batch = mixed_batch();
        let err = f64_column(&batch, "parallax").unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(c) if c == "parallax"));

        let absent = optional_f64_column(&batch, "parallax").unwrap();
        assert_eq!(absent, vec![None, None, None]);
    }

    #[test]
    fn test_select_rows_keeps_schema_and_order() {
        let batch = mixed_batch();
        let picked = select_rows(&batch, &[2, 0]).unwrap();
        assert_eq!(picked.schema(), batch.schema());
        assert_eq!(picked.num_rows(), 2);
        let names = string_column(&picked, "name").unwrap();
        assert_eq!(names, vec![Some("a".to_string()), Some("c".to_string())]);
    }

    #[test]
    fn test_parquet_buffer_preserves_schema() {
        let batch = mixed_batch();
        let encoded = write_parquet(&batch).unwrap();
        let decoded = read_parquet_bytes(encoded).unwrap();
        assert_eq!(decoded.num_rows(), 3);
        assert_eq!(decoded.schema().fields(), batch.schema().fields());
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let err = read_parquet("/nonexistent/clusters.parquet").unwrap_err();
        assert!(matches!(err, CatalogError::Open { .. }));
    }
}
