//! Test fixtures shared by the data layer tests.

use std::collections::BTreeMap;

use super::model::{Dataset, Transaction};
use super::schema::{Column, HeaderSlot};

/// A transaction with quantity 1, cash payment and a product named after its type.
pub fn row(size: &str, gender: &str, age: i64, product_type: &str, total_price: f64) -> Transaction {
    Transaction {
        size: Some(size.to_string()),
        gender: Some(gender.to_string()),
        age: Some(age),
        product_type: Some(product_type.to_string()),
        product_name: Some(format!("{product_type} basic")),
        total_price,
        quantity: 1.0,
        payment: Some("Cash".to_string()),
        date: None,
        extra: BTreeMap::new(),
    }
}

/// Dataset over the eight required columns (no `date`).
pub fn dataset(rows: Vec<Transaction>) -> Dataset {
    let columns = Column::ALL[..8]
        .iter()
        .map(|c| HeaderSlot::Schema(*c))
        .collect();
    Dataset::from_transactions(rows, columns)
}

/// Dataset including the `date` column.
pub fn dated_dataset(rows: Vec<Transaction>) -> Dataset {
    let columns = Column::ALL.iter().map(|c| HeaderSlot::Schema(*c)).collect();
    Dataset::from_transactions(rows, columns)
}

/// The three-row scenario: two medium shirts for women aged 25 and 30, one
/// large shirt.
pub fn three_rows() -> Dataset {
    dataset(vec![
        row("M", "F", 25, "shirt", 10.0),
        row("M", "F", 30, "shirt", 20.0),
        row("L", "F", 25, "shirt", 5.0),
    ])
}
