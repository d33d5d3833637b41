use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::state::{AppState, FilterEvent};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter sidebar. Widget changes are collected as events and
/// applied once the widgets are drawn.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("User Input Features");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some(params) = &state.params else {
        ui.label("The dataset has no size, gender or age to filter on.");
        return;
    };

    let mut events = Vec::new();

    let mut show_raw = state.show_raw;
    if ui.checkbox(&mut show_raw, "Show Data").changed() {
        events.push(FilterEvent::ShowRaw(show_raw));
    }
    ui.add_space(8.0);

    // ---- Size ----
    ui.strong("Select size");
    egui::ComboBox::from_id_salt("size")
        .selected_text(&params.size)
        .show_ui(ui, |ui: &mut Ui| {
            for size in &dataset.sizes {
                if ui.selectable_label(params.size == *size, size).clicked() {
                    events.push(FilterEvent::Size(size.clone()));
                }
            }
        });
    ui.add_space(8.0);

    // ---- Gender ----
    ui.strong("Select Gender");
    egui::ComboBox::from_id_salt("gender")
        .selected_text(&params.gender)
        .show_ui(ui, |ui: &mut Ui| {
            for gender in &dataset.genders {
                let text = RichText::new(gender).color(state.gender_colors.color_for(gender));
                if ui.selectable_label(params.gender == *gender, text).clicked() {
                    events.push(FilterEvent::Gender(gender.clone()));
                }
            }
        });
    ui.add_space(8.0);

    // ---- Age range ----
    ui.strong("Select Age Range");
    if let Some((min, max)) = dataset.age_bounds {
        let mut lo = params.age.lo;
        let mut hi = params.age.hi;
        if ui.add(egui::Slider::new(&mut lo, min..=max).text("from")).changed() {
            events.push(FilterEvent::AgeFrom(lo));
        }
        if ui.add(egui::Slider::new(&mut hi, min..=max).text("to")).changed() {
            events.push(FilterEvent::AgeTo(hi));
        }
    } else {
        ui.label("No ages in this dataset.");
    }

    ui.separator();
    ui.label(format!(
        "{} of {} transactions match",
        state.visible_indices.len(),
        dataset.len()
    ));

    for event in events {
        state.apply(event);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }
        if let Some(source) = &state.source {
            ui.weak(source.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open transaction data")
        .add_filter("Supported files", &["csv", "tsv", "tab", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv", "tab"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// The filtered rows, one column per header of the source file.
pub fn raw_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    ui.heading("Filtered Data");
    if state.visible_indices.is_empty() {
        plot::no_data(ui);
        return;
    }

    let columns = &dataset.columns;
    TableBuilder::new(ui)
        .id_salt("raw_data")
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(TableColumn::auto().at_least(60.0), columns.len())
        .header(20.0, |mut header| {
            for slot in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(slot.name());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let t = &dataset.transactions[state.visible_indices[row.index()]];
                for slot in columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(t.display(slot));
                    });
                }
            });
        });
}
