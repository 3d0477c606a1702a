use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_SKILL_NAME: &str = "skill_name";
pub const COL_CATEGORY: &str = "skill_category";
pub const COL_INDUSTRY: &str = "industry";
pub const COL_EXPOSURE: &str = "ai_exposure_level";
pub const COL_RISK: &str = "automation_risk";
pub const COL_DEMAND: &str = "current_market_demand";
pub const COL_HALF_LIFE: &str = "skill_half_life_years";
pub const COL_RESKILLING: &str = "reskilling_frequency_years";
pub const COL_LEARNING_MODE: &str = "learning_mode";

/// Columns every dataset file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_CATEGORY,
    COL_INDUSTRY,
    COL_EXPOSURE,
    COL_RISK,
    COL_DEMAND,
    COL_HALF_LIFE,
    COL_RESKILLING,
    COL_LEARNING_MODE,
];

// ---------------------------------------------------------------------------
// SkillRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single skill observation (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Optional free-text name; not every export carries it.
    #[serde(default)]
    pub skill_name: Option<String>,
    pub skill_category: String,
    pub industry: String,
    /// 0–100.
    pub ai_exposure_level: f64,
    /// 0–100.
    pub automation_risk: f64,
    pub current_market_demand: f64,
    /// Years, strictly positive.
    pub skill_half_life_years: f64,
    /// Years, strictly positive.
    pub reskilling_frequency_years: f64,
    pub learning_mode: String,
}

// ---------------------------------------------------------------------------
// Typed column keys
// ---------------------------------------------------------------------------

/// Numeric columns usable as aggregation values, histogram inputs or axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    AiExposure,
    AutomationRisk,
    MarketDemand,
    HalfLife,
    ReskillingFrequency,
}

impl NumericField {
    pub fn value(self, record: &SkillRecord) -> f64 {
        match self {
            NumericField::AiExposure => record.ai_exposure_level,
            NumericField::AutomationRisk => record.automation_risk,
            NumericField::MarketDemand => record.current_market_demand,
            NumericField::HalfLife => record.skill_half_life_years,
            NumericField::ReskillingFrequency => record.reskilling_frequency_years,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            NumericField::AiExposure => COL_EXPOSURE,
            NumericField::AutomationRisk => COL_RISK,
            NumericField::MarketDemand => COL_DEMAND,
            NumericField::HalfLife => COL_HALF_LIFE,
            NumericField::ReskillingFrequency => COL_RESKILLING,
        }
    }

    /// Human-readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::AiExposure => "AI Exposure Level",
            NumericField::AutomationRisk => "Automation Risk",
            NumericField::MarketDemand => "Current Market Demand",
            NumericField::HalfLife => "Skill Half-Life (Years)",
            NumericField::ReskillingFrequency => "Reskilling Frequency (Years)",
        }
    }
}

/// Categorical columns usable as group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    SkillCategory,
    Industry,
    LearningMode,
}

impl CategoricalField {
    pub fn value(self, record: &SkillRecord) -> &str {
        match self {
            CategoricalField::SkillCategory => &record.skill_category,
            CategoricalField::Industry => &record.industry,
            CategoricalField::LearningMode => &record.learning_mode,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::SkillCategory => COL_CATEGORY,
            CategoricalField::Industry => COL_INDUSTRY,
            CategoricalField::LearningMode => COL_LEARNING_MODE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::SkillCategory => "Skill Category",
            CategoricalField::Industry => "Industry",
            CategoricalField::LearningMode => "Learning Mode",
        }
    }
}

// ---------------------------------------------------------------------------
// ExposureBand
// ---------------------------------------------------------------------------

/// Coarse bucket of the AI exposure level.
///
/// Bins are right-closed: Low = [0, 40], Medium = (40, 70], High = (70, 100].
/// Zero belongs to Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExposureBand {
    Low,
    Medium,
    High,
}

impl ExposureBand {
    pub const ALL: [ExposureBand; 3] = [ExposureBand::Low, ExposureBand::Medium, ExposureBand::High];

    pub fn from_level(level: f64) -> Self {
        if level <= 40.0 {
            ExposureBand::Low
        } else if level <= 70.0 {
            ExposureBand::Medium
        } else {
            ExposureBand::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExposureBand::Low => "Low",
            ExposureBand::Medium => "Medium",
            ExposureBand::High => "High",
        }
    }
}

impl fmt::Display for ExposureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SkillDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct SkillDataset {
    /// All records (rows), in file order.
    pub records: Vec<SkillRecord>,
    /// Distinct categories in first-appearance order.
    pub categories: Vec<String>,
    /// Distinct industries in first-appearance order.
    pub industries: Vec<String>,
    /// Distinct learning modes in first-appearance order.
    pub learning_modes: Vec<String>,
    /// Observed `(min, max)` AI exposure; `None` for an empty dataset.
    pub exposure_range: Option<(f64, f64)>,
}

impl SkillDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<SkillRecord>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let mut industries: Vec<String> = Vec::new();
        let mut learning_modes: Vec<String> = Vec::new();
        let mut exposure_range: Option<(f64, f64)> = None;

        for rec in &records {
            push_unique(&mut categories, &rec.skill_category);
            push_unique(&mut industries, &rec.industry);
            push_unique(&mut learning_modes, &rec.learning_mode);

            let e = rec.ai_exposure_level;
            exposure_range = Some(match exposure_range {
                Some((lo, hi)) => (lo.min(e), hi.max(e)),
                None => (e, e),
            });
        }

        SkillDataset {
            records,
            categories,
            industries,
            learning_modes,
            exposure_range,
        }
    }

    /// Integer slider bounds covering every observed exposure value.
    /// Falls back to the full 0–100 scale for an empty dataset.
    pub fn exposure_bounds(&self) -> (i32, i32) {
        match self.exposure_range {
            Some((lo, hi)) => (lo.floor() as i32, hi.ceil() as i32),
            None => (0, 100),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        category: &str,
        industry: &str,
        exposure: f64,
        risk: f64,
        half_life: f64,
    ) -> SkillRecord {
        SkillRecord {
            skill_name: None,
            skill_category: category.to_string(),
            industry: industry.to_string(),
            ai_exposure_level: exposure,
            automation_risk: risk,
            current_market_demand: 50.0,
            skill_half_life_years: half_life,
            reskilling_frequency_years: 2.0,
            learning_mode: "Online".to_string(),
        }
    }

    /// The three-row fixture used across the aggregation tests.
    pub(crate) fn three_rows() -> SkillDataset {
        SkillDataset::from_records(vec![
            record("Category A", "IndustryX", 80.0, 75.0, 2.0),
            record("Category A", "IndustryX", 30.0, 20.0, 5.0),
            record("Category B", "IndustryY", 90.0, 90.0, 1.0),
        ])
    }

    #[test]
    fn indices_keep_first_appearance_order() {
        let ds = SkillDataset::from_records(vec![
            record("Zeta", "Retail", 10.0, 10.0, 1.0),
            record("Alpha", "Finance", 20.0, 10.0, 1.0),
            record("Zeta", "Finance", 30.0, 10.0, 1.0),
        ]);
        assert_eq!(ds.categories, vec!["Zeta", "Alpha"]);
        assert_eq!(ds.industries, vec!["Retail", "Finance"]);
        assert_eq!(ds.learning_modes, vec!["Online"]);
        assert_eq!(ds.exposure_range, Some((10.0, 30.0)));
    }

    #[test]
    fn exposure_bounds_round_outwards() {
        let ds = SkillDataset::from_records(vec![
            record("A", "X", 12.7, 10.0, 1.0),
            record("A", "X", 88.2, 10.0, 1.0),
        ]);
        assert_eq!(ds.exposure_bounds(), (12, 89));
        assert_eq!(SkillDataset::default().exposure_bounds(), (0, 100));
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ExposureBand::from_level(0.0), ExposureBand::Low);
        assert_eq!(ExposureBand::from_level(30.0), ExposureBand::Low);
        assert_eq!(ExposureBand::from_level(40.0), ExposureBand::Low);
        assert_eq!(ExposureBand::from_level(41.0), ExposureBand::Medium);
        assert_eq!(ExposureBand::from_level(50.0), ExposureBand::Medium);
        assert_eq!(ExposureBand::from_level(70.0), ExposureBand::Medium);
        assert_eq!(ExposureBand::from_level(70.5), ExposureBand::High);
        assert_eq!(ExposureBand::from_level(80.0), ExposureBand::High);
        assert_eq!(ExposureBand::from_level(100.0), ExposureBand::High);
    }

    #[test]
    fn numeric_field_reads_matching_column() {
        let rec = record("A", "X", 11.0, 22.0, 3.0);
        assert_eq!(NumericField::AiExposure.value(&rec), 11.0);
        assert_eq!(NumericField::AutomationRisk.value(&rec), 22.0);
        assert_eq!(NumericField::HalfLife.value(&rec), 3.0);
        assert_eq!(NumericField::HalfLife.column(), "skill_half_life_years");
        assert_eq!(CategoricalField::Industry.value(&rec), "X");
    }
}
