use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::dashboard::{render, Dashboard};
use crate::data::error::DataLoadError;
use crate::data::filter::{Facet, FilterSelection};
use crate::data::loader::load_file;
use crate::data::model::SkillDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully). Never mutated.
    pub dataset: Option<Arc<SkillDataset>>,

    /// Current sidebar selection.
    pub selection: FilterSelection,

    /// Output of the last pipeline run for `selection`.
    pub dashboard: Option<Dashboard>,

    /// Colour per skill category, stable across filter changes.
    pub category_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            selection: FilterSelection {
                categories: Default::default(),
                industries: Default::default(),
                exposure_min: 0.0,
                exposure_max: 100.0,
            },
            dashboard: None,
            category_colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, reset filters to "everything" and render.
    pub fn set_dataset(&mut self, dataset: Arc<SkillDataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.category_colors = ColorMap::new(&dataset.categories);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Record a load failure; the previous dataset (if any) stays on screen.
    pub fn set_load_error(&mut self, err: &DataLoadError) {
        log::error!("Failed to load dataset: {err}");
        self.status_message = Some(format!("Error: {err}"));
    }

    /// Load a file chosen at runtime (File → Open…).
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} skill records from {}",
                    dataset.len(),
                    path.display()
                );
                self.set_dataset(Arc::new(dataset));
            }
            Err(e) => self.set_load_error(&e),
        }
    }

    /// Re-run the pipeline after a selection change.
    pub fn refilter(&mut self) {
        self.dashboard = self
            .dataset
            .as_ref()
            .map(|ds| render(ds, &self.selection, &self.config));
    }

    /// Toggle a single category or industry in the filter.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        self.selection.toggle(facet, value);
        self.refilter();
    }

    /// Select every value of `facet` the dataset offers.
    pub fn select_all(&mut self, facet: Facet) {
        if let Some(ds) = &self.dataset {
            *self.selection.selected_mut(facet) = facet.values(ds).iter().cloned().collect();
            self.refilter();
        }
    }

    /// Deselect every value of `facet`.
    pub fn select_none(&mut self, facet: Facet) {
        self.selection.selected_mut(facet).clear();
        self.refilter();
    }

    pub fn set_exposure_range(&mut self, min: f64, max: f64) {
        self.selection.set_exposure_range(min, max);
        self.refilter();
    }

    /// Back to the startup selection.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = FilterSelection::all(ds);
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::three_rows;

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Arc::new(three_rows()));
        state
    }

    #[test]
    fn loading_renders_full_dashboard() {
        let state = loaded();
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.visible_rows, 3);
        assert_eq!(state.selection.categories.len(), 2);
    }

    #[test]
    fn every_change_rerenders() {
        let mut state = loaded();

        state.toggle(Facet::Category, "Category B");
        assert_eq!(state.dashboard.as_ref().unwrap().visible_rows, 2);

        state.set_exposure_range(50.0, 0.0);
        assert_eq!(state.dashboard.as_ref().unwrap().visible_rows, 1);

        state.select_none(Facet::Industry);
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.visible_rows, 0);
        assert!(dash.warning.is_some());

        state.select_all(Facet::Industry);
        assert_eq!(state.dashboard.as_ref().unwrap().visible_rows, 1);
        assert_eq!(state.selection.selected(Facet::Industry).len(), 2);

        state.select_none(Facet::Category);
        assert!(state.selection.categories.is_empty());
        assert_eq!(state.selection.industries.len(), 2);
        state.select_all(Facet::Category);
        assert_eq!(state.selection.categories.len(), 2);

        state.reset_filters();
        assert_eq!(state.dashboard.as_ref().unwrap().visible_rows, 3);
    }

    #[test]
    fn load_error_keeps_previous_dataset() {
        let mut state = loaded();
        state.open_path(Path::new("/definitely/not/here.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        assert!(state.dataset.is_some());
        assert!(state.dashboard.is_some());
    }
}
