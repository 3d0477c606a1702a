use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{SkillDataset, SkillRecord};

// ---------------------------------------------------------------------------
// Filter selection: what the sidebar currently has selected
// ---------------------------------------------------------------------------

/// One of the two multi-select filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Category,
    Industry,
}

impl Facet {
    /// Every value the dataset offers for this facet, in first-appearance order.
    pub fn values(self, dataset: &SkillDataset) -> &[String] {
        match self {
            Facet::Category => &dataset.categories,
            Facet::Industry => &dataset.industries,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Facet::Category => "Skill Category",
            Facet::Industry => "Industry",
        }
    }
}

/// Sidebar selection state.
///
/// An empty category or industry set means "nothing selected" and matches no
/// rows; it is not a wildcard. The exposure range is inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub industries: BTreeSet<String>,
    pub exposure_min: f64,
    pub exposure_max: f64,
}

impl FilterSelection {
    /// Initialise a selection with every value selected and the exposure
    /// range spanning the dataset's integer slider bounds.
    pub fn all(dataset: &SkillDataset) -> Self {
        let (lo, hi) = dataset.exposure_bounds();
        Self {
            categories: dataset.categories.iter().cloned().collect(),
            industries: dataset.industries.iter().cloned().collect(),
            exposure_min: f64::from(lo),
            exposure_max: f64::from(hi),
        }
    }

    /// The default selection narrowed by explicit choices, as given on the
    /// command line. Empty `categories`/`industries` keep every value; a
    /// missing bound keeps the dataset's own. Values that never occur in the
    /// dataset are kept (they simply match nothing) and logged.
    pub fn narrowed(
        dataset: &SkillDataset,
        categories: &[String],
        industries: &[String],
        exposure_min: Option<f64>,
        exposure_max: Option<f64>,
    ) -> Self {
        let mut selection = Self::all(dataset);
        if !categories.is_empty() {
            selection.categories = categories.iter().cloned().collect();
        }
        if !industries.is_empty() {
            selection.industries = industries.iter().cloned().collect();
        }
        for unknown in selection.unknown_values(dataset) {
            log::warn!("Filter value '{unknown}' does not occur in the dataset");
        }

        let min = exposure_min.unwrap_or(selection.exposure_min);
        let max = exposure_max.unwrap_or(selection.exposure_max);
        selection.set_exposure_range(min, max);
        selection
    }

    /// Selected categories and industries absent from `dataset`.
    pub fn unknown_values<'s>(&'s self, dataset: &SkillDataset) -> Vec<&'s str> {
        let categories = self
            .categories
            .iter()
            .filter(|c| !dataset.categories.contains(c));
        let industries = self
            .industries
            .iter()
            .filter(|i| !dataset.industries.contains(i));
        categories.chain(industries).map(String::as_str).collect()
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, rec: &SkillRecord) -> bool {
        self.categories.contains(&rec.skill_category)
            && self.industries.contains(&rec.industry)
            && rec.ai_exposure_level >= self.exposure_min
            && rec.ai_exposure_level <= self.exposure_max
    }

    /// Set the exposure range; reversed bounds are swapped.
    pub fn set_exposure_range(&mut self, a: f64, b: f64) {
        self.exposure_min = a.min(b);
        self.exposure_max = a.max(b);
    }

    pub fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Category => &self.categories,
            Facet::Industry => &self.industries,
        }
    }

    pub fn selected_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Category => &mut self.categories,
            Facet::Industry => &mut self.industries,
        }
    }

    /// Toggle one value; returns whether it is now selected.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> bool {
        let set = self.selected_mut(facet);
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    /// Short human summary used in log lines.
    pub fn summary(&self) -> String {
        format!(
            "{} categories, {} industries, exposure {}..={}",
            self.categories.len(),
            self.industries.len(),
            self.exposure_min,
            self.exposure_max
        )
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Records passing the current selection, borrowed from the dataset and kept
/// in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    pub rows: Vec<&'a SkillRecord>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record, unfiltered.
    pub fn of_all(records: &'a [SkillRecord]) -> Self {
        Self {
            rows: records.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SkillRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Apply `selection` again on top of this view.
    pub fn refilter(&self, selection: &FilterSelection) -> FilteredView<'a> {
        FilteredView {
            rows: self.iter().filter(|r| selection.matches(r)).collect(),
        }
    }
}

/// Return the records of `dataset` that pass all three predicates.
pub fn apply<'a>(dataset: &'a SkillDataset, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView::of_all(&dataset.records).refilter(selection)
}
