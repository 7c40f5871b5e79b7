use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::dictionary::{FieldDictionary, FieldMeta, OrganDictionary};
use super::model::{DataTable, Value};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a flat table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – header row, cells type-guessed per value
/// * `.parquet` / `.pq` – flat columns of int/float/string
pub fn load_table(path: &Path) -> Result<DataTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load the organ dictionary: a CSV with `name` and `id` columns.
pub fn load_organ_dict(path: &Path) -> Result<OrganDictionary> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening organ dictionary {}", path.display()))?;
    let headers = reader.headers().context("reading organ dictionary headers")?;

    let name_idx = headers
        .iter()
        .position(|h| h == "name")
        .context("organ dictionary missing 'name' column")?;
    let id_idx = headers
        .iter()
        .position(|h| h == "id")
        .context("organ dictionary missing 'id' column")?;

    let mut dict = OrganDictionary::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("organ dictionary row {row_no}"))?;
        let name = record.get(name_idx).unwrap_or("").trim();
        let id: u32 = record
            .get(id_idx)
            .unwrap_or("")
            .trim()
            .parse()
            .with_context(|| format!("organ dictionary row {row_no}: invalid id"))?;
        if name.is_empty() {
            bail!("organ dictionary row {row_no}: empty organ name");
        }
        dict.insert(name, id);
    }

    log::info!("Loaded organ dictionary with {} entries", dict.len());
    Ok(dict)
}

/// Load the survey field dictionary: a JSON object keyed by field identifier,
/// each value carrying at least `field_name_eng`.
pub fn load_field_dict(path: &Path) -> Result<FieldDictionary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading field dictionary {}", path.display()))?;
    let fields: BTreeMap<String, FieldMeta> =
        serde_json::from_str(&text).context("parsing field dictionary JSON")?;

    let dict = FieldDictionary::new(fields);
    log::info!("Loaded field dictionary with {} entries", dict.len());
    Ok(dict)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<DataTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != columns.len() {
            bail!(
                "CSV row {row_no}: has {} cells, header has {}",
                record.len(),
                columns.len()
            );
        }
        rows.push(record.iter().map(guess_value).collect());
    }

    Ok(DataTable::new(columns, rows))
}

/// Narrowest-first type guess: int → float → string; empty is missing.
fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file.  Works with files written by both Pandas
/// (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let cells = (0..batch.num_columns())
                .map(|c| extract_value(batch.column(c), row))
                .collect::<Result<Vec<Value>>>()
                .with_context(|| format!("parquet row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(DataTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Missing);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Value::String(arr.value(row).to_string())
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Value::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Value::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Value::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Value::Float(arr.value(row))
        }
        other => bail!("unsupported parquet column type {other:?}"),
    };
    Ok(value)
}
