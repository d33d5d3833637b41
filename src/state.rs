use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::dashboard::DashboardView;
use crate::data::filter::{filter, AgeRange, FilterParams};
use crate::data::loader;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Filter events
// ---------------------------------------------------------------------------

/// A change made through the sidebar controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    ShowRaw(bool),
    Size(String),
    Gender(String),
    /// New lower age bound; the upper bound follows if it would fall below.
    AgeFrom(i64),
    /// New upper age bound; the lower bound follows if it would rise above.
    AgeTo(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Charts,
    Statistics,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Load failure with no dataset to fall back on. When set, the UI shows
    /// only this message.
    pub fatal_error: Option<String>,

    /// Current sidebar selection. None when the dataset offers nothing to pick.
    pub params: Option<FilterParams>,

    pub show_raw: bool,

    /// Indices of transactions passing the current filter.
    pub visible_indices: Vec<usize>,

    /// Derived tables for the current filter.
    pub view: Option<DashboardView>,

    pub tab: Tab,

    pub gender_colors: ColorMap,
    pub product_type_colors: ColorMap,

    /// Non-fatal status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            fatal_error: None,
            params: None,
            show_raw: false,
            visible_indices: Vec::new(),
            view: None,
            tab: Tab::Charts,
            gender_colors: ColorMap::new(std::iter::empty()),
            product_type_colors: ColorMap::new(std::iter::empty()),
            status_message: None,
        }
    }

    /// Load a dataset from disk.
    ///
    /// Without a previously loaded dataset a failure is fatal; otherwise the
    /// current dataset stays and the failure is reported in the top bar.
    pub fn load(&mut self, path: &Path) {
        match loader::load(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                let message = e.to_string();
                if self.dataset.is_some() {
                    self.status_message = Some(format!("Error: {message}"));
                } else {
                    self.fatal_error = Some(message);
                    self.view = None;
                }
            }
        }
    }

    /// Ingest a newly loaded dataset, reset the filters and recompute.
    pub fn set_dataset(&mut self, dataset: Dataset, source: PathBuf) {
        if dataset.is_empty() {
            log::warn!("{} contains no transactions", source.display());
        }
        self.params = FilterParams::defaults_for(&dataset, self.config.default_age_window);
        if self.params.is_none() {
            log::warn!("{} offers no size, gender or age to filter on", source.display());
        }

        self.gender_colors = ColorMap::new(&dataset.genders);
        let product_types: Vec<String> = {
            let mut seen = Vec::new();
            for t in &dataset.transactions {
                if let Some(pt) = &t.product_type {
                    if !seen.contains(pt) {
                        seen.push(pt.clone());
                    }
                }
            }
            seen
        };
        self.product_type_colors = ColorMap::new(&product_types);

        self.dataset = Some(dataset);
        self.source = Some(source);
        self.fatal_error = None;
        self.status_message = None;
        self.recompute();
    }

    /// Apply one sidebar event. Filter changes recompute synchronously.
    pub fn apply(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::ShowRaw(show) => self.show_raw = show,
            other => {
                if self.update_params(other) {
                    self.recompute();
                }
            }
        }
    }

    fn update_params(&mut self, event: FilterEvent) -> bool {
        let bounds = self.dataset.as_ref().and_then(|ds| ds.age_bounds);
        let Some(params) = self.params.as_mut() else {
            return false;
        };
        let clamp = |age: i64| match bounds {
            Some((min, max)) => age.clamp(min, max),
            None => age,
        };

        match event {
            FilterEvent::Size(size) => params.size = size,
            FilterEvent::Gender(gender) => params.gender = gender,
            FilterEvent::AgeFrom(lo) => {
                let lo = clamp(lo);
                params.age = AgeRange {
                    lo,
                    hi: params.age.hi.max(lo),
                };
            }
            FilterEvent::AgeTo(hi) => {
                let hi = clamp(hi);
                params.age = AgeRange {
                    lo: params.age.lo.min(hi),
                    hi,
                };
            }
            FilterEvent::ShowRaw(_) => return false,
        }
        true
    }

    /// Recompute `visible_indices` and every derived table.
    pub fn recompute(&mut self) {
        let (Some(ds), Some(params)) = (&self.dataset, &self.params) else {
            self.visible_indices.clear();
            self.view = None;
            return;
        };
        let subset = filter(ds, params);
        self.view = Some(DashboardView::compute(&subset, &self.config.charts));
        self.visible_indices = subset.indices().to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Section;
    use crate::data::fixtures::{dataset, row, three_rows};

    fn loaded(ds: Dataset) -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(ds, PathBuf::from("combined_data.csv"));
        state
    }

    #[test]
    fn loading_selects_defaults_and_computes_view() {
        let state = loaded(three_rows());
        let params = state.params.as_ref().unwrap();
        assert_eq!(params.size, "M");
        assert_eq!(params.gender, "F");
        assert_eq!(params.age, AgeRange::new(25, 30));
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.view.as_ref().unwrap().row_count, 2);
    }

    #[test]
    fn each_event_recomputes() {
        let mut state = loaded(three_rows());

        state.apply(FilterEvent::Size("L".into()));
        assert_eq!(state.visible_indices, vec![2]);

        state.apply(FilterEvent::Gender("M".into()));
        assert!(state.visible_indices.is_empty());
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.product_types, Section::NoData);
    }

    #[test]
    fn age_bounds_push_each_other_and_clamp() {
        let mut state = loaded(dataset(vec![
            row("M", "F", 18, "shirt", 1.0),
            row("M", "F", 60, "shirt", 1.0),
        ]));
        assert_eq!(state.params.as_ref().unwrap().age, AgeRange::new(20, 40));

        state.apply(FilterEvent::AgeFrom(50));
        assert_eq!(state.params.as_ref().unwrap().age, AgeRange::new(50, 50));

        state.apply(FilterEvent::AgeTo(99));
        assert_eq!(state.params.as_ref().unwrap().age, AgeRange::new(50, 60));
        assert_eq!(state.visible_indices, vec![1]);

        state.apply(FilterEvent::AgeTo(10));
        assert_eq!(state.params.as_ref().unwrap().age, AgeRange::new(18, 18));
        assert_eq!(state.visible_indices, vec![0]);
    }

    #[test]
    fn raw_toggle_does_not_touch_filters() {
        let mut state = loaded(three_rows());
        let before = state.view.clone();
        state.apply(FilterEvent::ShowRaw(true));
        assert!(state.show_raw);
        assert_eq!(state.view, before);
    }

    #[test]
    fn missing_file_is_fatal_on_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.load(&dir.path().join("combined_data.csv"));
        assert!(state.fatal_error.as_deref().unwrap().contains("does not exist"));
        assert!(state.view.is_none());
        assert!(state.dataset.is_none());
    }

    #[test]
    fn failed_reload_keeps_current_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = loaded(three_rows());
        state.load(&dir.path().join("other.csv"));
        assert!(state.fatal_error.is_none());
        assert!(state.status_message.is_some());
        assert_eq!(state.visible_indices, vec![0, 1]);
    }
}
