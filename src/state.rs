use std::path::PathBuf;

use crate::color::ColorMap;
use crate::data::loader::{DatasetCache, LoaderConfig};
use crate::data::model::{AqiCategory, AqiDataset};
use crate::ui::views::View;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Session cache owning the canonical dataset (empty until loaded).
    pub cache: DatasetCache,

    /// Year range and data folder the cache is keyed on.
    pub config: LoaderConfig,

    /// Which chart page is shown in the central panel.
    pub selected_view: View,

    /// Band selection for the category analysis page.
    pub selected_category: AqiCategory,

    /// Per-location series colours.
    pub location_colors: ColorMap,

    /// Per-year series colours.
    pub year_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::default(),
            config: LoaderConfig::default(),
            selected_view: View::Overview,
            selected_category: AqiCategory::Good,
            location_colors: ColorMap::new(std::iter::empty::<String>()),
            year_colors: ColorMap::new(std::iter::empty::<String>()),
            status_message: None,
        }
    }
}

impl AppState {
    /// The canonical dataset, if one is loaded.
    pub fn dataset(&self) -> Option<&AqiDataset> {
        self.cache.cached()
    }

    /// Load (or re-use) the dataset for the current configuration and
    /// rebuild the series colour maps. Failures land in the status line.
    pub fn reload(&mut self) {
        match self.cache.get_or_load(&self.config) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} observations across {} locations and {} years",
                    dataset.len(),
                    dataset.locations.len(),
                    dataset.years.len()
                );
                let locations = dataset.locations.clone();
                let years: Vec<String> = dataset.years.iter().map(|y| y.to_string()).collect();
                self.location_colors = ColorMap::new(locations);
                self.year_colors = ColorMap::new(years);
                self.status_message = None;
            }
            Err(e) => {
                // anyhow's alternate format prints the whole cause chain.
                let e = anyhow::Error::new(e);
                log::error!("failed to load AQI data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Point the session at a different data folder and reload.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.config.dir = dir;
        self.cache.invalidate();
        self.reload();
    }

    /// Resolve a band selected by name. Unknown names leave the current
    /// selection untouched and surface the valid enumeration instead.
    pub fn select_category_label(&mut self, label: &str) {
        match AqiCategory::from_label(label) {
            Ok(category) => {
                self.selected_category = category;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_selection_by_valid_label() {
        let mut state = AppState::default();
        state.select_category_label("MODERATE");
        assert_eq!(state.selected_category, AqiCategory::Moderate);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn unknown_label_keeps_selection_and_reports() {
        let mut state = AppState::default();
        state.selected_category = AqiCategory::Poor;
        state.select_category_label("DREADFUL");
        assert_eq!(state.selected_category, AqiCategory::Poor);
        let message = state.status_message.unwrap();
        assert!(message.contains("DREADFUL"));
        assert!(message.contains("SEVERE"));
    }

    #[test]
    fn load_failure_surfaces_year_and_cause() {
        let mut state = AppState::default();
        state.config.dir = PathBuf::from("/nonexistent-aqi-data");
        state.reload();
        let message = state.status_message.as_ref().unwrap();
        assert!(message.contains("2016"));
        assert!(state.dataset().is_none());
    }
}
