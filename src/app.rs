use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::{AppState, Tab};
use crate::ui::{charts, panels, statistics};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CartDashboardApp {
    pub state: AppState,
}

impl CartDashboardApp {
    /// Build the app and load the configured data file.
    pub fn new(config: DashboardConfig) -> Self {
        let path = config.data_path.clone();
        let mut state = AppState::new(config);
        state.load(&path);
        Self { state }
    }
}

impl eframe::App for CartDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Fatal load error: nothing but the message ----
        if let Some(message) = &self.state.fatal_error {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label(RichText::new(message).color(Color32::RED).heading());
                });
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: raw data and tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Shopping Cart Analysis Dashboard");
            ui.separator();

            let state = &mut self.state;
            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut state.tab, Tab::Charts, "Charts");
                ui.selectable_value(&mut state.tab, Tab::Statistics, "Statistics");
            });
            ui.separator();

            let state = &self.state;
            let Some(view) = &state.view else {
                ui.label("No dataset loaded.");
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    if state.show_raw {
                        panels::raw_table(ui, state);
                        ui.separator();
                    }
                    match state.tab {
                        Tab::Charts => charts::charts_tab(ui, state, view),
                        Tab::Statistics => statistics::statistics_tab(ui, state, view),
                    }
                });
        });
    }
}
