use std::time::Instant;

use crate::config::ChartSettings;
use crate::data::aggregate::{
    aggregate_counts, aggregate_sum_by, correlation, CorrelationMatrix, CountTable, SumTable,
};
use crate::data::filter::Subset;
use crate::data::model::Transaction;
use crate::data::schema::Column;
use crate::data::stats::{describe, histogram, histogram_over, value_range, BoxStats, Histogram, Summary};

/// Columns of the correlation heatmap.
pub const CORRELATION_COLUMNS: [Column; 3] = [Column::TotalPrice, Column::Quantity, Column::Age];

/// Columns listed under "Counts of Unique Values in Categorical Columns".
pub const CATEGORICAL_COLUMNS: [Column; 3] = [Column::Payment, Column::Gender, Column::ProductType];

// ---------------------------------------------------------------------------
// Section – a derived table or the reason it cannot be drawn
// ---------------------------------------------------------------------------

/// Outcome of one dashboard section. Non-fatal conditions stay local to the
/// section that hits them.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    /// The filter matched no usable rows.
    NoData,
    /// An optional column the section needs is absent from the dataset.
    Omitted,
}

impl<T> Section<T> {
    fn unless_empty(value: T, empty: bool) -> Self {
        if empty {
            Section::NoData
        } else {
            Section::Ready(value)
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Chart-feeding tables
// ---------------------------------------------------------------------------

/// Histogram of one group; all groups of a chart share bin edges.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHistogram {
    pub group: String,
    pub histogram: Histogram,
}

/// (quantity, total_price) points of one gender, with product names for hover.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub group: String,
    pub points: Vec<[f64; 2]>,
    pub names: Vec<String>,
}

/// Box statistics of `total_price` for one product type and gender.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBox {
    pub product_type: String,
    pub gender: String,
    pub stats: BoxStats,
}

// ---------------------------------------------------------------------------
// DashboardView – everything the UI draws for one filter selection
// ---------------------------------------------------------------------------

/// Every derived table for one filtered subset. Rebuilt from scratch on
/// each filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub row_count: usize,
    // Charts tab
    pub price_by_gender: Section<Vec<GroupHistogram>>,
    pub product_types: Section<CountTable>,
    pub price_vs_quantity: Section<Vec<ScatterSeries>>,
    pub price_boxes: Section<Vec<GroupBox>>,
    pub sales_over_time: Section<SumTable>,
    // Statistics tab
    pub summary: Summary,
    pub top_products: Section<SumTable>,
    pub correlation: Section<CorrelationMatrix>,
    pub value_counts: Vec<(Column, Section<CountTable>)>,
    pub price_distribution: Section<Histogram>,
    pub age_box: Section<BoxStats>,
}

impl DashboardView {
    pub fn compute(subset: &Subset<'_>, settings: &ChartSettings) -> Self {
        let started = Instant::now();
        if subset.is_empty() {
            log::debug!("Filter matched no transactions");
        }

        let product_types = aggregate_counts(subset, Column::ProductType);
        let product_types_empty = product_types.is_empty();

        let sales_over_time = if subset.dataset().has_column(Column::Date) {
            let table = aggregate_sum_by(subset, Column::Date, Column::TotalPrice, None);
            let empty = table.is_empty();
            Section::unless_empty(table, empty)
        } else {
            Section::Omitted
        };

        let top = aggregate_sum_by(
            subset,
            Column::ProductName,
            Column::TotalPrice,
            Some(settings.top_products),
        );
        let top_empty = top.is_empty();

        let matrix = correlation(subset, &CORRELATION_COLUMNS);
        let matrix_undefined = matrix.is_undefined();

        let value_counts = CATEGORICAL_COLUMNS
            .iter()
            .map(|&column| {
                let table = aggregate_counts(subset, column);
                let empty = table.is_empty();
                (column, Section::unless_empty(table, empty))
            })
            .collect();

        let prices: Vec<f64> = subset.rows().filter_map(|t| t.number(Column::TotalPrice)).collect();
        let distribution = histogram(&prices, settings.distribution_bins);
        let distribution_empty = distribution.bins.is_empty();

        let ages: Vec<f64> = subset.rows().filter_map(|t| t.number(Column::Age)).collect();

        let view = DashboardView {
            row_count: subset.len(),
            price_by_gender: price_by_gender(subset, settings.price_bins),
            product_types: Section::unless_empty(product_types, product_types_empty),
            price_vs_quantity: price_vs_quantity(subset),
            price_boxes: price_boxes(subset),
            sales_over_time,
            summary: describe(subset),
            top_products: Section::unless_empty(top, top_empty),
            correlation: Section::unless_empty(matrix, matrix_undefined),
            value_counts,
            price_distribution: Section::unless_empty(distribution, distribution_empty),
            age_box: BoxStats::from_values(ages).map_or(Section::NoData, Section::Ready),
        };

        log::debug!(
            "Recomputed dashboard for {} rows in {:?}",
            view.row_count,
            started.elapsed()
        );
        view
    }
}

/// Distinct values of `column` in first-seen order, with their rows.
fn group_rows<'a>(
    rows: impl Iterator<Item = &'a Transaction>,
    column: Column,
) -> Vec<(String, Vec<&'a Transaction>)> {
    let mut groups: Vec<(String, Vec<&'a Transaction>)> = Vec::new();
    for t in rows {
        let Some(key) = t.label(column) else {
            continue;
        };
        match groups.iter_mut().find(|(k, _)| k.as_str() == &*key) {
            Some((_, members)) => members.push(t),
            None => groups.push((key.into_owned(), vec![t])),
        }
    }
    groups
}

fn price_by_gender(subset: &Subset<'_>, bins: usize) -> Section<Vec<GroupHistogram>> {
    let prices: Vec<f64> = subset.rows().filter_map(|t| t.number(Column::TotalPrice)).collect();
    let Some(range) = value_range(&prices) else {
        return Section::NoData;
    };

    let groups = group_rows(subset.rows(), Column::Gender)
        .into_iter()
        .map(|(group, members)| {
            let values: Vec<f64> = members
                .iter()
                .filter_map(|t| t.number(Column::TotalPrice))
                .collect();
            GroupHistogram {
                group,
                histogram: histogram_over(&values, range, bins),
            }
        })
        .collect::<Vec<_>>();
    let empty = groups.is_empty();
    Section::unless_empty(groups, empty)
}

fn price_vs_quantity(subset: &Subset<'_>) -> Section<Vec<ScatterSeries>> {
    let series = group_rows(subset.rows(), Column::Gender)
        .into_iter()
        .filter_map(|(group, members)| {
            let mut points = Vec::new();
            let mut names = Vec::new();
            for t in members {
                if let (Some(q), Some(p)) = (t.number(Column::Quantity), t.number(Column::TotalPrice)) {
                    points.push([q, p]);
                    names.push(t.product_name.clone().unwrap_or_default());
                }
            }
            (!points.is_empty()).then_some(ScatterSeries { group, points, names })
        })
        .collect::<Vec<_>>();
    let empty = series.is_empty();
    Section::unless_empty(series, empty)
}

fn price_boxes(subset: &Subset<'_>) -> Section<Vec<GroupBox>> {
    let mut boxes = Vec::new();
    for (product_type, members) in group_rows(subset.rows(), Column::ProductType) {
        for (gender, rows) in group_rows(members.into_iter(), Column::Gender) {
            let prices = rows.iter().filter_map(|t| t.number(Column::TotalPrice)).collect();
            if let Some(stats) = BoxStats::from_values(prices) {
                boxes.push(GroupBox {
                    product_type: product_type.clone(),
                    gender,
                    stats,
                });
            }
        }
    }
    let empty = boxes.is_empty();
    Section::unless_empty(boxes, empty)
}
