use std::collections::HashMap;

use statrs::statistics::Statistics;

use super::filter::Subset;
use super::schema::Column;
use super::stats::all_same;

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountRow {
    pub value: String,
    pub count: usize,
}

/// `value_counts` of one column, most frequent first.
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    pub column: Column,
    pub rows: Vec<CountRow>,
}

impl CountTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Count subset rows per distinct value of `column`, descending by count.
///
/// Ties keep first-seen order. Null cells are not counted.
pub fn aggregate_counts(subset: &Subset<'_>, column: Column) -> CountTable {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<CountRow> = Vec::new();

    for t in subset.rows() {
        let Some(value) = t.label(column) else {
            continue;
        };
        match positions.get(&*value) {
            Some(&pos) => rows[pos].count += 1,
            None => {
                positions.insert(value.to_string(), rows.len());
                rows.push(CountRow {
                    value: value.into_owned(),
                    count: 1,
                });
            }
        }
    }

    // Stable: equal counts stay in first-seen order.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    CountTable { column, rows }
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SumRow {
    pub group: String,
    pub sum: f64,
}

/// Sum of `value_column` per distinct `group_column` value.
#[derive(Debug, Clone, PartialEq)]
pub struct SumTable {
    pub group_column: Column,
    pub value_column: Column,
    pub rows: Vec<SumRow>,
}

impl SumTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sum `value_column` per group.
///
/// Without `top_n` the rows are ascending by group value (dates sort
/// chronologically as ISO text). With `top_n` only the largest sums are kept,
/// descending, ties in first-seen order. NaN values are skipped and rows with
/// a null group are ignored.
pub fn aggregate_sum_by(
    subset: &Subset<'_>,
    group_column: Column,
    value_column: Column,
    top_n: Option<usize>,
) -> SumTable {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<SumRow> = Vec::new();

    for t in subset.rows() {
        let Some(group) = t.label(group_column) else {
            continue;
        };
        let value = t.number(value_column).unwrap_or(0.0);
        match positions.get(&*group) {
            Some(&pos) => rows[pos].sum += value,
            None => {
                positions.insert(group.to_string(), rows.len());
                rows.push(SumRow {
                    group: group.into_owned(),
                    sum: value,
                });
            }
        }
    }

    match top_n {
        Some(n) => {
            rows.sort_by(|a, b| b.sum.total_cmp(&a.sum));
            rows.truncate(n);
        }
        None => rows.sort_by(|a, b| a.group.cmp(&b.group)),
    }

    SumTable {
        group_column,
        value_column,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Square Pearson correlation matrix over named numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    /// Row-major, `columns.len()` squared entries.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size() + j]
    }

    /// True when no entry could be computed.
    pub fn is_undefined(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }
}

// Undefined (NaN) entries compare equal.
impl PartialEq for CorrelationMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && all_same(&self.values, &other.values)
    }
}

/// Pearson correlation between every pair of `columns` over the subset,
/// using pairwise complete observations.
///
/// Entries are NaN where a column has zero variance or fewer than two
/// observations remain.
pub fn correlation(subset: &Subset<'_>, columns: &[Column]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = subset
                .rows()
                .filter_map(|t| Some((t.number(columns[i])?, t.number(columns[j])?)))
                .unzip();
            let r = if i == j {
                if has_variance(&xs) {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(&xs, &ys)
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

fn has_variance(xs: &[f64]) -> bool {
    let sd = xs.iter().std_dev();
    sd.is_finite() && sd > 0.0
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if !has_variance(xs) || !has_variance(ys) {
        return f64::NAN;
    }
    let r = xs.iter().covariance(ys.iter()) / (xs.iter().std_dev() * ys.iter().std_dev());
    r.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::{filter, AgeRange, FilterParams};
    use crate::data::fixtures::{dataset, row, three_rows};

    fn priced(rows: &[(&str, f64)]) -> crate::data::model::Dataset {
        dataset(
            rows.iter()
                .map(|&(name, price)| {
                    let mut t = row("M", "F", 30, "shirt", price);
                    t.product_name = Some(name.to_string());
                    t
                })
                .collect(),
        )
    }

    #[test]
    fn counts_for_three_row_scenario() {
        let ds = three_rows();
        let params = FilterParams {
            size: "M".into(),
            gender: "F".into(),
            age: AgeRange::new(20, 40),
        };
        let subset = filter(&ds, &params);
        let counts = aggregate_counts(&subset, Column::ProductType);
        assert_eq!(
            counts.rows,
            vec![CountRow {
                value: "shirt".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn counts_descend_with_first_seen_ties() {
        let ds = dataset(vec![
            row("M", "F", 30, "hat", 1.0),
            row("M", "F", 30, "shoes", 1.0),
            row("M", "F", 30, "shirt", 1.0),
            row("M", "F", 30, "shirt", 1.0),
            row("M", "F", 30, "hat", 1.0),
            row("M", "F", 30, "shirt", 1.0),
            row("M", "F", 30, "bag", 1.0),
        ]);
        let counts = aggregate_counts(&Subset::all(&ds), Column::ProductType);
        let order: Vec<(&str, usize)> = counts
            .rows
            .iter()
            .map(|r| (r.value.as_str(), r.count))
            .collect();
        assert_eq!(order, vec![("shirt", 3), ("hat", 2), ("shoes", 1), ("bag", 1)]);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn counts_skip_nulls() {
        let mut t = row("M", "F", 30, "hat", 1.0);
        t.payment = None;
        let ds = dataset(vec![t, row("M", "F", 30, "hat", 1.0)]);
        let counts = aggregate_counts(&Subset::all(&ds), Column::Payment);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn empty_subset_gives_empty_tables() {
        let ds = three_rows();
        let subset = Subset::from_indices(&ds, vec![]);
        assert!(aggregate_counts(&subset, Column::ProductType).is_empty());
        assert!(aggregate_sum_by(&subset, Column::ProductName, Column::TotalPrice, Some(10)).is_empty());
        assert!(correlation(&subset, &[Column::TotalPrice, Column::Age]).is_undefined());
    }

    #[test]
    fn top_n_sums_descend_and_truncate() {
        let ds = priced(&[
            ("a", 5.0),
            ("b", 7.0),
            ("a", 4.0),
            ("c", 1.0),
            ("d", 9.0),
            ("b", 2.0),
        ]);
        let top = aggregate_sum_by(&Subset::all(&ds), Column::ProductName, Column::TotalPrice, Some(3));
        let got: Vec<(&str, f64)> = top.rows.iter().map(|r| (r.group.as_str(), r.sum)).collect();
        // a, b and d all sum to 9; first-seen order decides.
        assert_eq!(got, vec![("a", 9.0), ("b", 9.0), ("d", 9.0)]);
    }

    #[test]
    fn untrimmed_sums_ascend_by_group() {
        let mut rows = Vec::new();
        for (date, price) in [("2023-01-03", 1.0), ("2023-01-01", 2.0), ("2023-01-03", 3.0)] {
            let mut t = row("M", "F", 30, "shirt", price);
            t.date = Some(date.to_string());
            rows.push(t);
        }
        let ds = dataset(rows);
        let by_date = aggregate_sum_by(&Subset::all(&ds), Column::Date, Column::TotalPrice, None);
        assert_eq!(
            by_date.rows,
            vec![
                SumRow { group: "2023-01-01".into(), sum: 2.0 },
                SumRow { group: "2023-01-03".into(), sum: 4.0 },
            ]
        );
    }

    #[test]
    fn nan_values_are_skipped_in_sums() {
        let ds = priced(&[("a", f64::NAN), ("a", 3.0)]);
        let sums = aggregate_sum_by(&Subset::all(&ds), Column::ProductName, Column::TotalPrice, None);
        assert_eq!(sums.rows[0].sum, 3.0);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let mut rows = Vec::new();
        for (age, price, qty) in [(20, 10.0, 1.0), (30, 25.0, 3.0), (40, 20.0, 2.0), (50, 50.0, 4.0)] {
            let mut t = row("M", "F", age, "shirt", price);
            t.quantity = qty;
            rows.push(t);
        }
        let ds = dataset(rows);
        let cols = [Column::TotalPrice, Column::Quantity, Column::Age];
        let m = correlation(&Subset::all(&ds), &cols);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
                assert!(m.get(i, j).abs() <= 1.0);
            }
        }
        // numpy.corrcoef([10, 25, 20, 50], [20, 30, 40, 50])[0, 1]
        assert_relative_eq!(m.get(0, 2), 0.8724397280825138, epsilon = 1e-12);
    }

    #[test]
    fn zero_variance_yields_nan_not_panic() {
        let ds = dataset(vec![
            row("M", "F", 30, "shirt", 10.0),
            row("M", "F", 30, "shirt", 20.0),
        ]);
        let m = correlation(&Subset::all(&ds), &[Column::TotalPrice, Column::Age]);
        assert_eq!(m.get(0, 0), 1.0);
        assert!(m.get(1, 1).is_nan());
        assert!(m.get(0, 1).is_nan());
        assert!(!m.is_undefined());
    }

    #[test]
    fn aggregates_are_idempotent() {
        let ds = priced(&[("a", 5.0), ("b", 7.0), ("a", 4.0)]);
        let subset = Subset::all(&ds);
        assert_eq!(
            aggregate_counts(&subset, Column::ProductName),
            aggregate_counts(&subset, Column::ProductName)
        );
        assert_eq!(
            aggregate_sum_by(&subset, Column::ProductName, Column::TotalPrice, Some(10)),
            aggregate_sum_by(&subset, Column::ProductName, Column::TotalPrice, Some(10))
        );

        let columns = [Column::TotalPrice, Column::Quantity, Column::Age];
        let m = correlation(&subset, &columns);
        assert!(m.get(2, 2).is_nan());
        assert_eq!(m, correlation(&subset, &columns));
    }

    proptest! {
        #[test]
        fn counts_sum_to_subset_len(types in prop::collection::vec(0usize..5, 0..80)) {
            const TYPES: [&str; 5] = ["shirt", "pants", "shoes", "hat", "bag"];
            let ds = dataset(types.iter().map(|&t| row("M", "F", 30, TYPES[t], 1.0)).collect());
            let subset = Subset::all(&ds);
            let counts = aggregate_counts(&subset, Column::ProductType);
            prop_assert_eq!(counts.total(), subset.len());
            prop_assert!(counts.rows.windows(2).all(|w| w[0].count >= w[1].count));
        }

        #[test]
        fn top_ten_is_a_sorted_subset_of_all_groups(
            sales in prop::collection::vec((0usize..25, 0u32..1000), 0..120)
        ) {
            let names: Vec<String> = (0..25).map(|i| format!("product {i}")).collect();
            let rows: Vec<(&str, f64)> = sales
                .iter()
                .map(|&(p, cents)| (names[p].as_str(), cents as f64 / 100.0))
                .collect();
            let ds = priced(&rows);
            let subset = Subset::all(&ds);
            let all = aggregate_sum_by(&subset, Column::ProductName, Column::TotalPrice, None);
            let top = aggregate_sum_by(&subset, Column::ProductName, Column::TotalPrice, Some(10));

            prop_assert!(top.rows.len() <= 10);
            prop_assert_eq!(top.rows.len(), all.rows.len().min(10));
            prop_assert!(top.rows.windows(2).all(|w| w[0].sum >= w[1].sum));
            for r in &top.rows {
                prop_assert!(all.rows.contains(r));
            }
        }
    }
}
