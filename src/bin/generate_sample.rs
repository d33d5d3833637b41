//! Writes a synthetic `combined_data.csv` (or `.parquet`) of shopping-cart
//! transactions for trying out the dashboard.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const SIZES: [&str; 4] = ["S", "M", "L", "XL"];
const GENDERS: [&str; 2] = ["F", "M"];
const PAYMENTS: [&str; 3] = ["Cash", "Credit Card", "PayPal"];

/// (product_type, [(product_name, unit price)])
const CATALOGUE: [(&str, [(&str, f64); 3]); 4] = [
    ("shirt", [("Oxford shirt", 39.9), ("Linen shirt", 49.5), ("Basic tee", 12.0)]),
    ("trousers", [("Chinos", 59.0), ("Jeans", 79.9), ("Joggers", 35.0)]),
    ("shoes", [("Sneakers", 89.0), ("Loafers", 120.0), ("Sandals", 29.9)]),
    ("jacket", [("Denim jacket", 99.0), ("Parka", 189.0), ("Blazer", 149.0)]),
];

/// Days per month of the generated quarter (2023-01 .. 2023-03).
const MONTH_DAYS: [u32; 3] = [31, 28, 31];

#[derive(Debug, Serialize)]
struct Row {
    customer_id: i64,
    size: &'static str,
    gender: &'static str,
    age: i64,
    product_type: &'static str,
    product_name: &'static str,
    total_price: f64,
    quantity: i64,
    payment: &'static str,
    date: String,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as i64 - 1) as usize]
    }
}

fn date_of(day_of_quarter: u32) -> String {
    let mut day = day_of_quarter;
    for (month, &len) in MONTH_DAYS.iter().enumerate() {
        if day < len {
            return format!("2023-{:02}-{:02}", month + 1, day + 1);
        }
        day -= len;
    }
    "2023-03-31".to_string()
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let days: u32 = MONTH_DAYS.iter().sum();
    (0..rows)
        .map(|_| {
            let (product_type, products) = rng.pick(&CATALOGUE);
            let (product_name, unit_price) = *rng.pick(products);
            let quantity = rng.range(1, 5);
            Row {
                customer_id: rng.range(1000, 9999),
                size: *rng.pick(&SIZES),
                gender: *rng.pick(&GENDERS),
                age: rng.range(18, 65),
                product_type: *product_type,
                product_name,
                total_price: (unit_price * quantity as f64 * 100.0).round() / 100.0,
                quantity,
                payment: *rng.pick(&PAYMENTS),
                date: date_of(rng.range(0, days as i64 - 1) as u32),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let strings = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Row) -> i64| -> ArrayRef { Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>())) };

    let schema = Arc::new(Schema::new(vec![
        Field::new("customer_id", DataType::Int64, false),
        Field::new("size", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
        Field::new("age", DataType::Int64, false),
        Field::new("product_type", DataType::Utf8, false),
        Field::new("product_name", DataType::Utf8, false),
        Field::new("total_price", DataType::Float64, false),
        Field::new("quantity", DataType::Int64, false),
        Field::new("payment", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            ints(|r| r.customer_id),
            strings(|r| r.size),
            strings(|r| r.gender),
            ints(|r| r.age),
            strings(|r| r.product_type),
            strings(|r| r.product_name),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.total_price).collect::<Vec<_>>())),
            ints(|r| r.quantity),
            strings(|r| r.payment),
            strings(|r| r.date.as_str()),
        ],
    )?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("combined_data.csv"));
    let rows: usize = match args.next() {
        Some(n) => n.to_string_lossy().parse().context("ROWS must be a positive integer")?,
        None => 500,
    };

    let mut rng = SimpleRng::new(42);
    let data = generate(rows, &mut rng);

    match output.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(&output, &data)?,
        _ => write_csv(&output, &data)?,
    }

    println!("Wrote {} transactions to {}", data.len(), output.display());
    Ok(())
}
