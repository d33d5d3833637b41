use eframe::egui::{self, Color32, Ui};

use crate::dashboard::DashboardView;
use crate::data::aggregate::CountTable;
use crate::data::stats::{Summary, STATISTICS};
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Statistics tab
// ---------------------------------------------------------------------------

pub fn statistics_tab(ui: &mut Ui, state: &AppState, view: &DashboardView) {
    ui.heading("Summary Statistics");
    summary_grid(ui, &view.summary);
    ui.add_space(12.0);

    let top_title = format!("Top {} Products by Total Price", state.config.charts.top_products);
    plot::section(ui, &top_title, &view.top_products, |ui, table| {
        let rows: Vec<(String, f64)> = table.rows.iter().map(|r| (r.group.clone(), r.sum)).collect();
        plot::category_bars(
            ui,
            "top_products",
            &rows,
            Color32::LIGHT_GREEN,
            table.group_column.name(),
            table.value_column.name(),
        );
    });

    plot::section(ui, "Correlation Heatmap", &view.correlation, |ui, matrix| {
        plot::heatmap(ui, matrix);
    });

    ui.strong("Counts of Unique Values in Categorical Columns");
    for (column, counts) in &view.value_counts {
        ui.collapsing(column.name(), |ui: &mut Ui| match counts.ready() {
            Some(table) => counts_grid(ui, table),
            None => plot::no_data(ui),
        });
    }
    ui.add_space(12.0);

    plot::section(ui, "Distribution of Total Price", &view.price_distribution, |ui, histogram| {
        ui.weak(format!("{} prices in {} bins", histogram.total(), histogram.bins.len()));
        plot::stacked_histograms(
            ui,
            "price_distribution",
            &[("total_price", histogram, Color32::LIGHT_BLUE)],
            "total_price",
        );
    });

    plot::section(ui, "Box Plot of Age Distribution", &view.age_box, |ui, stats| {
        plot::single_box(ui, "age_box", stats, "age", Color32::LIGHT_RED);
    });
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.4}")
    }
}

fn summary_grid(ui: &mut Ui, summary: &Summary) {
    egui::Grid::new("summary_grid")
        .striped(true)
        .min_col_width(70.0)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &summary.columns {
                ui.strong(&col.column);
            }
            ui.end_row();

            for (i, stat) in STATISTICS.iter().enumerate() {
                ui.strong(*stat);
                for col in &summary.columns {
                    if i == 0 {
                        ui.label(col.count.to_string());
                    } else {
                        ui.label(format_stat(col.statistic(i)));
                    }
                }
                ui.end_row();
            }
        });
}

fn counts_grid(ui: &mut Ui, table: &CountTable) {
    egui::Grid::new(("counts", table.column.name()))
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong(table.column.name());
            ui.strong("count");
            ui.end_row();
            for row in &table.rows {
                ui.label(&row.value);
                ui.label(row.count.to_string());
                ui.end_row();
            }
            ui.weak("total");
            ui.weak(table.total().to_string());
            ui.end_row();
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_render_nan_explicitly() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(2.5), "2.5000");
    }
}
