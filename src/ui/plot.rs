use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, Points};

use crate::color::correlation_color;
use crate::dashboard::Section;
use crate::data::aggregate::CorrelationMatrix;
use crate::data::stats::{BoxStats, Histogram};

pub const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Sections and placeholders
// ---------------------------------------------------------------------------

pub fn no_data(ui: &mut Ui) {
    ui.label("No data available for the selected filters.");
}

/// Draw a titled section. `NoData` shows the placeholder, `Omitted` draws
/// nothing at all.
pub fn section<T>(ui: &mut Ui, title: &str, section: &Section<T>, draw: impl FnOnce(&mut Ui, &T)) {
    if let Section::Omitted = section {
        return;
    }
    ui.strong(title);
    match section {
        Section::Ready(value) => draw(ui, value),
        Section::NoData => no_data(ui),
        Section::Omitted => {}
    }
    ui.add_space(12.0);
}

/// Axis formatter labelling integer positions with category names.
pub fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let x = mark.value;
        if x < 0.0 || x.fract() != 0.0 {
            return String::new();
        }
        labels.get(x as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// One bar per category, in the given order.
pub fn category_bars(
    ui: &mut Ui,
    id: &str,
    rows: &[(String, f64)],
    color: Color32,
    x_label: &str,
    y_label: &str,
) {
    let labels: Vec<String> = rows.iter().map(|(label, _)| label.clone()).collect();
    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| Bar::new(i as f64, *value).width(0.7).name(label))
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(y_label));
        });
}

fn histogram_bars(histogram: &Histogram) -> Vec<Bar> {
    histogram
        .bins
        .iter()
        .map(|bin| Bar::new(bin.center(), bin.count as f64).width(bin.width()))
        .collect()
}

/// Histograms sharing bin edges, stacked in the given order.
pub fn stacked_histograms(ui: &mut Ui, id: &str, groups: &[(&str, &Histogram, Color32)], x_label: &str) {
    let mut charts: Vec<BarChart> = Vec::new();
    for &(name, histogram, color) in groups {
        let mut chart = BarChart::new(histogram_bars(histogram)).name(name).color(color);
        if !charts.is_empty() {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

const MIN_MARKER_RADIUS: f32 = 2.0;
const MAX_MARKER_RADIUS: f32 = 10.0;

/// A named series of points with a label and a marker size per point.
pub struct LabelledSeries<'a> {
    pub name: &'a str,
    pub points: &'a [[f64; 2]],
    pub labels: &'a [String],
    pub sizes: &'a [f64],
    pub color: Color32,
}

/// Marker radius for `size` relative to the largest size, area-proportional.
/// Non-positive or non-finite sizes get the smallest marker.
pub fn marker_radius(size: f64, max_size: f64) -> f32 {
    if !(size.is_finite() && max_size.is_finite()) || size <= 0.0 || max_size <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    let scale = (size / max_size).clamp(0.0, 1.0).sqrt() as f32;
    MIN_MARKER_RADIUS + (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS) * scale
}

/// Points of one series grouped by marker radius, in half-pixel steps.
fn by_radius(series: &LabelledSeries<'_>, max_size: f64) -> BTreeMap<u32, Vec<[f64; 2]>> {
    let mut groups: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for (point, &size) in series.points.iter().zip(series.sizes) {
        let half_pixels = (marker_radius(size, max_size) * 2.0).round() as u32;
        groups.entry(half_pixels).or_default().push(*point);
    }
    groups
}

/// Scatter plot whose hover text names the point under the cursor and whose
/// marker area follows each point's size.
pub fn labelled_scatter(ui: &mut Ui, id: &str, series: &[LabelledSeries<'_>], x_label: &str, y_label: &str) {
    let lookup: Vec<([f64; 2], String)> = series
        .iter()
        .flat_map(|s| s.points.iter().copied().zip(s.labels.iter().cloned()))
        .collect();
    let (x_name, y_name) = (x_label.to_string(), y_label.to_string());
    let max_size = series
        .iter()
        .flat_map(|s| s.sizes.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_scroll(false)
        .label_formatter(move |name, value| {
            let label = lookup
                .iter()
                .find(|(p, _)| p[0] == value.x && p[1] == value.y)
                .map(|(_, label)| label.as_str());
            match label {
                Some(label) => format!(
                    "{label} ({name})\n{x_name}: {}\n{y_name}: {:.2}",
                    value.x, value.y
                ),
                None => format!("{x_name}: {:.2}\n{y_name}: {:.2}", value.x, value.y),
            }
        })
        .show(ui, |plot_ui| {
            // Items sharing a name share one legend entry.
            for s in series {
                for (half_pixels, points) in by_radius(s, max_size) {
                    plot_ui.points(
                        Points::new(points)
                            .name(s.name)
                            .color(s.color)
                            .radius(half_pixels as f32 / 2.0),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

pub fn box_elem(x: f64, stats: &BoxStats, width: f64, name: &str) -> BoxElem {
    BoxElem::new(
        x,
        BoxSpread::new(
            stats.lower_whisker,
            stats.q1,
            stats.median,
            stats.q3,
            stats.upper_whisker,
        ),
    )
    .box_width(width)
    .whisker_width(width * 0.6)
    .name(name)
}

/// Outliers of a box at `x`, as plot points.
pub fn outlier_points(x: f64, stats: &BoxStats) -> Vec<[f64; 2]> {
    stats.outliers.iter().map(|&v| [x, v]).collect()
}

/// A single vertical box with its outliers.
pub fn single_box(ui: &mut Ui, id: &str, stats: &BoxStats, name: &str, color: Color32) {
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(name)
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(
                BoxPlot::new(vec![box_elem(0.0, stats, 0.5, name)])
                    .name(name)
                    .color(color),
            );
            if !stats.outliers.is_empty() {
                plot_ui.points(
                    Points::new(outlier_points(0.0, stats))
                        .name("outliers")
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Painter charts
// ---------------------------------------------------------------------------

/// Pie chart with a legend underneath. Each slice is drawn as a fan of
/// convex pieces no wider than a quarter turn.
pub fn pie_chart(ui: &mut Ui, slices: &[(String, f64, Color32)]) {
    let total: f64 = slices.iter().map(|(_, v, _)| v).sum();
    if total <= 0.0 {
        no_data(ui);
        return;
    }

    let diameter = ui.available_width().min(PLOT_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(egui::vec2(diameter, diameter), Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = diameter / 2.0 - 4.0;

    let mut start = -FRAC_PI_2;
    for (_, value, color) in slices {
        let sweep = (*value / total) as f32 * TAU;
        let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        for p in 0..pieces {
            let a0 = start + sweep * p as f32 / pieces as f32;
            let a1 = start + sweep * (p + 1) as f32 / pieces as f32;
            let mut points = vec![center];
            for s in 0..=16 {
                let a = a0 + (a1 - a0) * s as f32 / 16.0;
                points.push(center + radius * egui::vec2(a.cos(), a.sin()));
            }
            painter.add(Shape::convex_polygon(points, *color, Stroke::NONE));
        }
        start += sweep;
    }

    let hovered = response.hover_pos().and_then(|pos| {
        let d = pos - center;
        if d.length() > radius {
            return None;
        }
        let fraction = ((d.y.atan2(d.x) + FRAC_PI_2).rem_euclid(TAU) / TAU) as f64;
        let mut acc = 0.0;
        slices.iter().find(|(_, value, _)| {
            acc += value / total;
            fraction <= acc
        })
    });
    if let Some((label, value, _)) = hovered {
        response.on_hover_text(format!("{label}: {value} ({:.1}%)", value / total * 100.0));
    }

    for (label, value, color) in slices {
        ui.horizontal(|ui: &mut Ui| {
            ui.colored_label(*color, "■");
            ui.label(format!("{label}: {value} ({:.1}%)", value / total * 100.0));
        });
    }
}

/// Annotated heatmap of a correlation matrix.
pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.size();
    let label_width = 90.0;
    let cell = ((ui.available_width() - label_width) / n.max(1) as f32).clamp(40.0, 110.0);
    let size = egui::vec2(label_width + cell * n as f32, cell * n as f32 + 24.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(13.0);
    let text_color = ui.visuals().text_color();

    for (i, row_column) in matrix.columns.iter().enumerate() {
        let top = rect.top() + i as f32 * cell;
        painter.text(
            egui::pos2(rect.left() + label_width - 6.0, top + cell / 2.0),
            Align2::RIGHT_CENTER,
            row_column.name(),
            font.clone(),
            text_color,
        );
        for j in 0..n {
            let cell_rect = egui::Rect::from_min_size(
                egui::pos2(rect.left() + label_width + j as f32 * cell, top),
                egui::vec2(cell, cell),
            );
            let r = matrix.get(i, j);
            painter.rect_filled(cell_rect.shrink(1.0), 2.0, correlation_color(r));
            let text = if r.is_nan() { "NaN".to_string() } else { format!("{r:.2}") };
            painter.text(cell_rect.center(), Align2::CENTER_CENTER, text, font.clone(), Color32::BLACK);
        }
    }

    for (j, column) in matrix.columns.iter().enumerate() {
        painter.text(
            egui::pos2(
                rect.left() + label_width + (j as f32 + 0.5) * cell,
                rect.top() + n as f32 * cell + 12.0,
            ),
            Align2::CENTER_CENTER,
            column.name(),
            font.clone(),
            text_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_area_grows_with_size() {
        assert_eq!(marker_radius(4.0, 4.0), MAX_MARKER_RADIUS);
        assert_eq!(marker_radius(0.0, 4.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(f64::NAN, 4.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(1.0, 0.0), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(1.0, 4.0), 6.0);
        assert!(marker_radius(2.0, 4.0) < marker_radius(3.0, 4.0));
    }

    #[test]
    fn points_are_bucketed_by_marker_size() {
        let points = [[1.0, 10.0], [4.0, 40.0], [1.0, 12.0]];
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let sizes = [1.0, 4.0, 1.0];
        let series = LabelledSeries {
            name: "F",
            points: &points,
            labels: &labels,
            sizes: &sizes,
            color: Color32::RED,
        };
        let groups = by_radius(&series, 4.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&12], vec![[1.0, 10.0], [1.0, 12.0]]);
        assert_eq!(groups[&20], vec![[4.0, 40.0]]);
    }
}
