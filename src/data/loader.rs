use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Transaction, Value};
use super::schema::{Column, ColumnIndex};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transaction dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma separated, header row
/// * `.tsv`     – tab separated, header row
/// * `.json`    – `[{ "size": "M", "gender": "F", ... }, ...]`
/// * `.parquet` – one scalar column per field
///
/// A path that does not exist yields [`DataError::DataUnavailable`].
pub fn load(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(DataError::DataUnavailable {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => read_delimited(path, b',')?,
        "tsv" | "tab" => read_delimited(path, b'\t')?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    let dataset = build_dataset(raw)?;
    log::info!(
        "Loaded {} transactions from {} ({} sizes, {} genders, ages {:?})",
        dataset.len(),
        path.display(),
        dataset.sizes.len(),
        dataset.genders.len(),
        dataset.age_bounds
    );
    Ok(dataset)
}

/// Header row plus cells, as produced by every format reader. Text cells
/// stay `Value::String` verbatim; typing happens per column in
/// [`to_transaction`].
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

fn build_dataset(raw: RawTable) -> Result<Dataset> {
    let index = ColumnIndex::resolve(&raw.headers)?;
    let transactions = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| to_transaction(row_no + 1, row, &index))
        .collect::<Result<Vec<_>>>()?;
    Ok(Dataset::from_transactions(transactions, index.order))
}

// ---------------------------------------------------------------------------
// Typed conversion
// ---------------------------------------------------------------------------

static NULL: Value = Value::Null;

fn cell<'a>(row: &'a [Value], index: &ColumnIndex, column: Column) -> &'a Value {
    index
        .position(column)
        .and_then(|pos| row.get(pos))
        .unwrap_or(&NULL)
}

fn to_transaction(row_no: usize, row: &[Value], index: &ColumnIndex) -> Result<Transaction> {
    let text = |column: Column| categorical(cell(row, index, column));

    let extra: BTreeMap<String, Value> = index
        .extras
        .iter()
        .map(|(pos, name)| (name.clone(), row.get(*pos).map_or(Value::Null, typed_extra)))
        .collect();

    Ok(Transaction {
        size: text(Column::Size),
        gender: text(Column::Gender),
        age: age(row_no, cell(row, index, Column::Age))?,
        product_type: text(Column::ProductType),
        product_name: text(Column::ProductName),
        total_price: numeric(row_no, Column::TotalPrice, cell(row, index, Column::TotalPrice))?,
        quantity: numeric(row_no, Column::Quantity, cell(row, index, Column::Quantity))?,
        payment: text(Column::Payment),
        date: match cell(row, index, Column::Date) {
            Value::Null => None,
            other => Some(other.to_string()),
        },
        extra,
    })
}

/// A text cell, null when empty.
fn text_cell(s: &str) -> Value {
    if s.is_empty() {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

/// Columns outside the schema carry no declared type, so their text is guessed.
fn typed_extra(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::guess(s.trim()),
        other => other.clone(),
    }
}

fn categorical(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) | Value::Date(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn invalid(row: usize, column: Column, value: &Value) -> DataError {
    DataError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

/// Empty cells become NaN and are skipped by every aggregate.
fn numeric(row: usize, column: Column, value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(f64::NAN),
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(row, column, value)),
        _ => Err(invalid(row, column, value)),
    }
}

fn age(row: usize, value: &Value) -> Result<Option<i64>> {
    let whole = |f: f64| -> Result<Option<i64>> {
        if f.is_nan() {
            Ok(None)
        } else if f.is_finite() && f.fract() == 0.0 {
            Ok(Some(f as i64))
        } else {
            Err(invalid(row, Column::Age, value))
        }
    };
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(*i)),
        Value::Float(f) => whole(*f),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => whole(f),
            Err(_) => Err(invalid(row, Column::Age, value)),
        },
        _ => Err(invalid(row, Column::Age, value)),
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one transaction per record.
fn read_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "size": "M", "gender": "F", "age": 25, "total_price": 10.0, ... },
///   ...
/// ]
/// ```
///
/// Keys missing from a record are null.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::Malformed(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|rec| {
            headers
                .iter()
                .map(|h| rec.get(h).map_or(Value::Null, json_to_value))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_value(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => text_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => text_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(Value::Null, |d| Value::Date(d.to_string())),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)
            .map_or(Value::Null, |s| text_cell(&s)),
    }
}
