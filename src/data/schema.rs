use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Column – the fixed transaction schema
// ---------------------------------------------------------------------------

/// How the dashboard interprets a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Categorical,
    Text,
    Integer,
    Numeric,
    Date,
}

/// A column of the shopping cart schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Size,
    Gender,
    Age,
    ProductType,
    ProductName,
    TotalPrice,
    Quantity,
    Payment,
    Date,
}

impl Column {
    /// Every schema column in display order.
    pub const ALL: [Column; 9] = [
        Column::Size,
        Column::Gender,
        Column::Age,
        Column::ProductType,
        Column::ProductName,
        Column::TotalPrice,
        Column::Quantity,
        Column::Payment,
        Column::Date,
    ];

    /// Canonical header name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Size => "size",
            Column::Gender => "gender",
            Column::Age => "age",
            Column::ProductType => "product_type",
            Column::ProductName => "product_name",
            Column::TotalPrice => "total_price",
            Column::Quantity => "quantity",
            Column::Payment => "payment",
            Column::Date => "date",
        }
    }

    /// Header names accepted for this column, in order of preference.
    ///
    /// The merged export names the cart quantity `quantity_x`.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Size => &["size"],
            Column::Gender => &["gender"],
            Column::Age => &["age"],
            Column::ProductType => &["product_type"],
            Column::ProductName => &["product_name"],
            Column::TotalPrice => &["total_price"],
            Column::Quantity => &["quantity", "quantity_x"],
            Column::Payment => &["payment"],
            Column::Date => &["date"],
        }
    }

    pub fn semantic_type(self) -> SemanticType {
        match self {
            Column::Size | Column::Gender | Column::ProductType | Column::Payment => {
                SemanticType::Categorical
            }
            Column::ProductName => SemanticType::Text,
            Column::Age => SemanticType::Integer,
            Column::TotalPrice | Column::Quantity => SemanticType::Numeric,
            Column::Date => SemanticType::Date,
        }
    }

    /// Only `date` may be absent from a dataset.
    pub fn is_required(self) -> bool {
        self != Column::Date
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self.semantic_type(),
            SemanticType::Integer | SemanticType::Numeric
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Positions of schema columns (and leftover columns) within a header row.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: BTreeMap<Column, usize>,
    /// Columns outside the schema: (position, header name), in header order.
    pub extras: Vec<(usize, String)>,
    /// Header order of all kept columns, used for display and `describe`.
    pub order: Vec<HeaderSlot>,
}

/// One header position after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSlot {
    Schema(Column),
    Extra(String),
}

impl HeaderSlot {
    pub fn name(&self) -> &str {
        match self {
            HeaderSlot::Schema(c) => c.name(),
            HeaderSlot::Extra(name) => name,
        }
    }
}

impl ColumnIndex {
    /// Resolve a header row against the schema.
    ///
    /// Fails with [`DataError::MissingColumn`] when a required column has no
    /// matching header. A header that matches a lower-preference alias of a
    /// column already resolved is kept as an extra column.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
        let mut positions = BTreeMap::new();

        for column in Column::ALL {
            let found = column
                .aliases()
                .iter()
                .find_map(|alias| trimmed.iter().position(|h| h == alias));
            match found {
                Some(pos) => {
                    positions.insert(column, pos);
                }
                None if column.is_required() => return Err(DataError::MissingColumn(column)),
                None => {}
            }
        }

        let mut extras = Vec::new();
        let mut order = Vec::with_capacity(trimmed.len());
        for (pos, header) in trimmed.iter().enumerate() {
            match positions.iter().find(|(_, p)| **p == pos) {
                Some((column, _)) => order.push(HeaderSlot::Schema(*column)),
                None => {
                    extras.push((pos, header.to_string()));
                    order.push(HeaderSlot::Extra(header.to_string()));
                }
            }
        }

        Ok(ColumnIndex {
            positions,
            extras,
            order,
        })
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const FULL: &[&str] = &[
        "size",
        "gender",
        "age",
        "product_type",
        "product_name",
        "total_price",
        "quantity",
        "payment",
    ];

    #[test]
    fn resolves_required_columns_and_skips_optional_date() {
        let index = ColumnIndex::resolve(&headers(FULL)).unwrap();
        assert_eq!(index.position(Column::Size), Some(0));
        assert_eq!(index.position(Column::Payment), Some(7));
        assert_eq!(index.position(Column::Date), None);
        assert!(index.extras.is_empty());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let mut names = FULL.to_vec();
        names.retain(|h| *h != "age");
        let err = ColumnIndex::resolve(&headers(&names)).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(Column::Age)));
    }

    #[test]
    fn quantity_resolves_from_merge_suffix() {
        let mut names: Vec<&str> = FULL
            .iter()
            .map(|h| if *h == "quantity" { "quantity_x" } else { *h })
            .collect();
        names.push("quantity_y");
        let index = ColumnIndex::resolve(&headers(&names)).unwrap();
        assert_eq!(index.position(Column::Quantity), Some(6));
        assert_eq!(index.extras, vec![(8, "quantity_y".to_string())]);
    }

    #[test]
    fn headers_are_trimmed_and_extras_keep_order() {
        let mut names = vec!["customer_id", " size "];
        names.extend_from_slice(&FULL[1..]);
        names.push("date");
        let index = ColumnIndex::resolve(&headers(&names)).unwrap();
        assert_eq!(index.position(Column::Size), Some(1));
        assert_eq!(index.position(Column::Date), Some(9));
        assert_eq!(index.order[0], HeaderSlot::Extra("customer_id".into()));
        assert_eq!(index.order[1], HeaderSlot::Schema(Column::Size));
    }

    #[test]
    fn only_date_is_optional() {
        for column in Column::ALL {
            assert_eq!(column.is_required(), column != Column::Date);
        }
        assert!(Column::Age.is_numeric());
        assert!(!Column::Payment.is_numeric());
    }
}
