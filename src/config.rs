use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Names a JSON file with [`DashboardConfig`] keys.
pub const CONFIG_ENV: &str = "CART_DASHBOARD_CONFIG";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "CART_DASHBOARD_DATA";

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Settings for chart construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Products shown in the "Top Products by Total Price" chart.
    pub top_products: usize,
    /// Bins of the price-by-gender histogram.
    pub price_bins: usize,
    /// Bins of the "Distribution of Total Price" histogram.
    pub distribution_bins: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            top_products: 10,
            price_bins: 20,
            distribution_bins: 30,
        }
    }
}

/// Dashboard configuration, every key optional:
///
/// ```json
/// {
///   "data_path": "combined_data.csv",
///   "default_age_window": [20, 40],
///   "charts": { "top_products": 10, "price_bins": 20, "distribution_bins": 30 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Initial age range, clamped to the ages present in the data.
    pub default_age_window: (i64, i64),
    pub charts: ChartSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("combined_data.csv"),
            default_age_window: (20, 40),
            charts: ChartSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Layered configuration: defaults, then the file named by
    /// `CART_DASHBOARD_CONFIG`, then `CART_DASHBOARD_DATA`, then the first
    /// command-line argument as the data path.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(
            std::env::var_os(DATA_ENV).map(PathBuf::from),
            std::env::args_os().nth(1).map(PathBuf::from),
        );
        Ok(config)
    }

    fn apply_overrides(&mut self, env_path: Option<PathBuf>, arg_path: Option<PathBuf>) {
        if let Some(path) = arg_path.or(env_path) {
            self.data_path = path;
        }
    }
}
