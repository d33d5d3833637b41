use eframe::egui::{Color32, Ui};
use egui_plot::{BoxPlot, Legend, Plot, Points};

use crate::dashboard::{DashboardView, GroupBox};
use crate::state::AppState;
use crate::ui::plot::{self, LabelledSeries, PLOT_HEIGHT};

// ---------------------------------------------------------------------------
// Charts tab
// ---------------------------------------------------------------------------

pub fn charts_tab(ui: &mut Ui, state: &AppState, view: &DashboardView) {
    ui.label(format!("{} transactions match the selected filters", view.row_count));
    ui.add_space(6.0);
    ui.columns(3, |cols| {
        plot::section(
            &mut cols[0],
            "Total Price Distribution by Gender",
            &view.price_by_gender,
            |ui, groups| {
                let groups: Vec<_> = groups
                    .iter()
                    .map(|g| {
                        let color = state.gender_colors.color_for(&g.group);
                        (g.group.as_str(), &g.histogram, color)
                    })
                    .collect();
                plot::stacked_histograms(ui, "price_by_gender", &groups, "total_price");
            },
        );

        plot::section(
            &mut cols[1],
            "Product Type Distribution",
            &view.product_types,
            |ui, counts| {
                let slices: Vec<(String, f64, Color32)> = counts
                    .rows
                    .iter()
                    .map(|r| {
                        let color = state.product_type_colors.color_for(&r.value);
                        (r.value.clone(), r.count as f64, color)
                    })
                    .collect();
                plot::pie_chart(ui, &slices);
            },
        );

        plot::section(
            &mut cols[2],
            "Total Price vs Quantity",
            &view.price_vs_quantity,
            |ui, series| {
                // Marker size follows quantity, the x coordinate.
                let quantities: Vec<Vec<f64>> = series
                    .iter()
                    .map(|s| s.points.iter().map(|p| p[0]).collect())
                    .collect();
                let series: Vec<LabelledSeries<'_>> = series
                    .iter()
                    .zip(&quantities)
                    .map(|(s, sizes)| LabelledSeries {
                        name: &s.group,
                        points: &s.points,
                        labels: &s.names,
                        sizes,
                        color: state.gender_colors.color_for(&s.group),
                    })
                    .collect();
                plot::labelled_scatter(ui, "price_vs_quantity", &series, "quantity", "total_price");
            },
        );
    });

    ui.separator();
    ui.heading("Additional Visualizations");
    ui.add_space(6.0);

    plot::section(
        ui,
        "Box Plot of Total Price by Product Type and Gender",
        &view.price_boxes,
        |ui, boxes| price_boxes(ui, state, boxes),
    );

    plot::section(ui, "Total Sales Over Time", &view.sales_over_time, |ui, table| {
        let rows: Vec<(String, f64)> = table.rows.iter().map(|r| (r.group.clone(), r.sum)).collect();
        plot::category_bars(
            ui,
            "sales_over_time",
            &rows,
            Color32::LIGHT_BLUE,
            table.group_column.name(),
            table.value_column.name(),
        );
    });
}

/// Boxes grouped by product type along x, one offset box per gender.
fn price_boxes(ui: &mut Ui, state: &AppState, boxes: &[GroupBox]) {
    let mut product_types: Vec<&str> = Vec::new();
    let mut genders: Vec<&str> = Vec::new();
    for b in boxes {
        if !product_types.contains(&b.product_type.as_str()) {
            product_types.push(&b.product_type);
        }
        if !genders.contains(&b.gender.as_str()) {
            genders.push(&b.gender);
        }
    }

    let slot = 0.8 / genders.len() as f64;
    let x_of = |b: &GroupBox| {
        let t = product_types.iter().position(|p| *p == b.product_type).unwrap_or(0);
        let g = genders.iter().position(|g| *g == b.gender).unwrap_or(0);
        t as f64 - 0.4 + slot * (g as f64 + 0.5)
    };

    let labels: Vec<String> = product_types.iter().map(|p| p.to_string()).collect();
    Plot::new("price_boxes")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("product_type")
        .y_axis_label("total_price")
        .x_axis_formatter(plot::category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for gender in &genders {
                let color = state.gender_colors.color_for(gender);
                let members: Vec<&GroupBox> = boxes.iter().filter(|b| b.gender == *gender).collect();
                let elems = members
                    .iter()
                    .map(|b| {
                        let name = format!("{} / {}", b.product_type, b.gender);
                        plot::box_elem(x_of(b), &b.stats, slot * 0.8, &name)
                    })
                    .collect();
                plot_ui.box_plot(BoxPlot::new(elems).name(gender).color(color));

                let outliers: Vec<[f64; 2]> = members
                    .iter()
                    .flat_map(|b| plot::outlier_points(x_of(b), &b.stats))
                    .collect();
                if !outliers.is_empty() {
                    plot_ui.points(Points::new(outliers).name(gender).color(color).radius(3.0));
                }
            }
        });
}
