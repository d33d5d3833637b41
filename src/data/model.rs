use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::schema::{Column, HeaderSlot};

// ---------------------------------------------------------------------------
// Value – a single dynamically typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date kept as text; lexical order is chronological order.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so Value can key BTreeMaps --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Guess the type of a raw text cell. Empty text is null.
    pub fn guess(s: &str) -> Value {
        if s.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
        if s == "true" || s == "false" {
            return Value::Bool(s == "true");
        }
        if looks_like_iso_date(s) {
            return Value::Date(s.to_string());
        }
        Value::String(s.to_string())
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn looks_like_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b[..10]
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Transaction – one row of the dataset
// ---------------------------------------------------------------------------

/// A single shopping cart transaction (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub size: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub product_type: Option<String>,
    pub product_name: Option<String>,
    /// NaN when the cell was empty.
    pub total_price: f64,
    /// NaN when the cell was empty.
    pub quantity: f64,
    pub payment: Option<String>,
    pub date: Option<String>,
    /// Columns outside the schema: header → value.
    pub extra: BTreeMap<String, Value>,
}

impl Transaction {
    /// Textual value of a schema column, `None` for null cells.
    pub fn label(&self, column: Column) -> Option<Cow<'_, str>> {
        let text = match column {
            Column::Size => self.size.as_deref(),
            Column::Gender => self.gender.as_deref(),
            Column::ProductType => self.product_type.as_deref(),
            Column::ProductName => self.product_name.as_deref(),
            Column::Payment => self.payment.as_deref(),
            Column::Date => self.date.as_deref(),
            Column::Age => return self.age.map(|a| Cow::Owned(a.to_string())),
            Column::TotalPrice | Column::Quantity => {
                return self.number(column).map(|v| Cow::Owned(v.to_string()))
            }
        };
        text.map(Cow::Borrowed)
    }

    /// Numeric value of a schema column. `None` for categorical columns,
    /// null cells and NaN.
    pub fn number(&self, column: Column) -> Option<f64> {
        let v = match column {
            Column::Age => self.age? as f64,
            Column::TotalPrice => self.total_price,
            Column::Quantity => self.quantity,
            _ => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    /// Numeric value of any numeric column, schema or extra.
    pub fn numeric(&self, column: &NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Schema(c) => self.number(*c),
            NumericColumn::Extra(name) => self
                .extra
                .get(name)
                .and_then(Value::as_f64)
                .filter(|v| !v.is_nan()),
        }
    }

    /// Display text for a header slot, empty for null cells.
    pub fn display(&self, slot: &HeaderSlot) -> String {
        match slot {
            HeaderSlot::Schema(c) => self.label(*c).map(Cow::into_owned).unwrap_or_default(),
            HeaderSlot::Extra(name) => match self.extra.get(name) {
                Some(Value::Null) | None => String::new(),
                Some(v) => v.to_string(),
            },
        }
    }
}

/// A column that takes part in summary statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericColumn {
    Schema(Column),
    Extra(String),
}

impl NumericColumn {
    pub fn name(&self) -> &str {
        match self {
            NumericColumn::Schema(c) => c.name(),
            NumericColumn::Extra(name) => name,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with the option sets the sidebar offers.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Kept columns in header order.
    pub columns: Vec<HeaderSlot>,
    /// Distinct sizes in first-seen order.
    pub sizes: Vec<String>,
    /// Distinct genders in first-seen order.
    pub genders: Vec<String>,
    /// Observed (min, max) age, `None` if no row has an age.
    pub age_bounds: Option<(i64, i64)>,
    /// Numeric columns in header order.
    pub numeric_columns: Vec<NumericColumn>,
}

impl Dataset {
    /// Build the option sets and column classification from parsed rows.
    pub fn from_transactions(transactions: Vec<Transaction>, columns: Vec<HeaderSlot>) -> Self {
        let sizes = distinct(transactions.iter().filter_map(|t| t.size.as_deref()));
        let genders = distinct(transactions.iter().filter_map(|t| t.gender.as_deref()));

        let age_bounds = transactions
            .iter()
            .filter_map(|t| t.age)
            .fold(None, |acc: Option<(i64, i64)>, age| match acc {
                None => Some((age, age)),
                Some((lo, hi)) => Some((lo.min(age), hi.max(age))),
            });

        let numeric_columns = columns
            .iter()
            .filter_map(|slot| match slot {
                HeaderSlot::Schema(c) if c.is_numeric() => Some(NumericColumn::Schema(*c)),
                HeaderSlot::Extra(name) if is_numeric_extra(&transactions, name) => {
                    Some(NumericColumn::Extra(name.clone()))
                }
                _ => None,
            })
            .collect();

        Dataset {
            transactions,
            columns,
            sizes,
            genders,
            age_bounds,
            numeric_columns,
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&HeaderSlot::Schema(column))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// An extra column is numeric when it has at least one non-null value and
/// every non-null value is a number.
fn is_numeric_extra(transactions: &[Transaction], name: &str) -> bool {
    let mut any = false;
    for t in transactions {
        match t.extra.get(name) {
            None | Some(Value::Null) => {}
            Some(v) if v.as_f64().is_some() => any = true,
            Some(_) => return false,
        }
    }
    any
}
