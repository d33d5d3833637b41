mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod error;
mod state;
mod ui;

use app::CartDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env().unwrap_or_else(|e| {
        log::warn!("Ignoring configuration, using defaults: {e:#}");
        DashboardConfig::default()
    });
    log::info!("Data file: {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Shopping Cart Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CartDashboardApp::new(config)))),
    )
}
