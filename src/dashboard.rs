//! Presentation layer: maps aggregates onto KPI tiles and chart descriptors.
//!
//! Nothing here draws. A [`ChartSpec`] is a plain description (kind, labels,
//! data table) that the egui front-end paints and `--export` serialises.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::aggregate::{
    box_stats, cross_tab, group_mean, high_exposure_percentage, high_risk_count, histogram_bins,
    mean_half_life, mean_reskilling_interval, BoxStats, GroupMean, HistogramBin,
};
use crate::data::error::EmptyResultWarning;
use crate::data::filter::{apply, FilterSelection, FilteredView};
use crate::data::model::{CategoricalField, ExposureBand, NumericField, SkillDataset};

pub const TITLE: &str = "Skill Half-Life in the Age of AI";
pub const CAPTION: &str = "Workforce analytics dashboard: how fast skills decay as AI exposure grows";

/// Shown wherever a KPI has nothing to summarise.
pub const NO_DATA: &str = "no data";

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub avg_half_life: Option<f64>,
    pub high_exposure_pct: Option<f64>,
    pub avg_reskilling_interval: Option<f64>,
    pub high_risk_count: Option<usize>,
}

/// One labelled KPI display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiTile {
    pub label: &'static str,
    pub value: String,
}

impl Kpis {
    pub fn compute(view: &FilteredView<'_>, config: &DashboardConfig) -> Self {
        Self {
            avg_half_life: mean_half_life(view),
            high_exposure_pct: high_exposure_percentage(view, config.high_exposure_threshold),
            avg_reskilling_interval: mean_reskilling_interval(view),
            high_risk_count: (!view.is_empty())
                .then(|| high_risk_count(view, config.high_risk_threshold)),
        }
    }

    /// The four tiles of the KPI row, values rounded to one decimal.
    pub fn tiles(&self) -> [KpiTile; 4] {
        let one_decimal = |v: Option<f64>| v.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.1}"));
        [
            KpiTile {
                label: "Avg Skill Half-Life (Years)",
                value: one_decimal(self.avg_half_life),
            },
            KpiTile {
                label: "High AI-Exposure Skills (%)",
                value: self
                    .high_exposure_pct
                    .map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.1}%")),
            },
            KpiTile {
                label: "Avg Reskilling Interval (Years)",
                value: one_decimal(self.avg_reskilling_interval),
            },
            KpiTile {
                label: "High Automation-Risk Skills",
                value: self
                    .high_risk_count
                    .map_or_else(|| NO_DATA.to_string(), |n| n.to_string()),
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Chart descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    HorizontalBar,
    Bar,
    StackedBar,
    Scatter,
    Histogram,
    BoxPlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
}

/// One stacked layer; `values[i]` belongs to `categories[i]` of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker radius in points.
    pub size: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ChartData {
    Bars(Vec<BarDatum>),
    StackedBars {
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    Scatter(Vec<ScatterSeries>),
    Histogram(Vec<HistogramBin>),
    Boxes(Vec<BoxStats>),
}

impl ChartData {
    /// Whether the chart would draw nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Bars(bars) => bars.is_empty(),
            ChartData::StackedBars { categories, .. } => categories.is_empty(),
            ChartData::Scatter(series) => series.iter().all(|s| s.points.is_empty()),
            ChartData::Histogram(bins) => bins.is_empty(),
            ChartData::Boxes(boxes) => boxes.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub data: ChartData,
}

// ---------------------------------------------------------------------------
// Dashboard – one full render
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub selection: FilterSelection,
    pub total_rows: usize,
    pub visible_rows: usize,
    pub kpis: Kpis,
    pub charts: Vec<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<EmptyResultWarning>,
}

/// Run filter → aggregate → describe for one selection.
pub fn render(
    dataset: &SkillDataset,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> Dashboard {
    let view = apply(dataset, selection);
    log::debug!(
        "Rendering dashboard: {} -> {}/{} rows",
        selection.summary(),
        view.len(),
        dataset.len()
    );

    let warning = view.is_empty().then_some(EmptyResultWarning);
    if let Some(w) = &warning {
        log::warn!("{w} ({})", selection.summary());
    }

    Dashboard {
        title: TITLE,
        selection: selection.clone(),
        total_rows: dataset.len(),
        visible_rows: view.len(),
        kpis: Kpis::compute(&view, config),
        charts: charts(&view, config),
        warning,
    }
}

/// The seven dashboard charts, in display order.
pub fn charts(view: &FilteredView<'_>, config: &DashboardConfig) -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            id: "half_life_by_category",
            kind: ChartKind::HorizontalBar,
            title: "Average Skill Half-Life by Category",
            x_label: NumericField::HalfLife.label(),
            y_label: CategoricalField::SkillCategory.label(),
            data: bars(group_mean(view, CategoricalField::SkillCategory, NumericField::HalfLife)),
        },
        ChartSpec {
            id: "exposure_vs_half_life",
            kind: ChartKind::Scatter,
            title: "AI Exposure vs Skill Half-Life",
            x_label: NumericField::AiExposure.label(),
            y_label: NumericField::HalfLife.label(),
            data: scatter(
                view,
                NumericField::AiExposure,
                NumericField::HalfLife,
                NumericField::MarketDemand,
                config,
            ),
        },
        ChartSpec {
            id: "automation_risk_distribution",
            kind: ChartKind::Histogram,
            title: "Automation Risk Distribution",
            x_label: NumericField::AutomationRisk.label(),
            y_label: "Count",
            data: ChartData::Histogram(histogram_bins(
                view,
                NumericField::AutomationRisk,
                config.histogram_bins,
            )),
        },
        ChartSpec {
            id: "demand_vs_risk",
            kind: ChartKind::Scatter,
            title: "Market Demand vs Automation Risk",
            x_label: NumericField::AutomationRisk.label(),
            y_label: NumericField::MarketDemand.label(),
            data: scatter(
                view,
                NumericField::AutomationRisk,
                NumericField::MarketDemand,
                NumericField::HalfLife,
                config,
            ),
        },
        ChartSpec {
            id: "reskilling_by_category",
            kind: ChartKind::BoxPlot,
            title: "Reskilling Frequency by Skill Category",
            x_label: CategoricalField::SkillCategory.label(),
            y_label: NumericField::ReskillingFrequency.label(),
            data: ChartData::Boxes(box_stats(
                view,
                CategoricalField::SkillCategory,
                NumericField::ReskillingFrequency,
            )),
        },
        ChartSpec {
            id: "industry_exposure",
            kind: ChartKind::StackedBar,
            title: "Industry Exposure to Skill Decay",
            x_label: CategoricalField::Industry.label(),
            y_label: "Count",
            data: exposure_stack(view),
        },
        ChartSpec {
            id: "half_life_by_learning_mode",
            kind: ChartKind::Bar,
            title: "Learning Mode Impact on Skill Longevity",
            x_label: CategoricalField::LearningMode.label(),
            y_label: NumericField::HalfLife.label(),
            data: bars(group_mean(view, CategoricalField::LearningMode, NumericField::HalfLife)),
        },
    ]
}

fn bars(groups: Vec<GroupMean>) -> ChartData {
    ChartData::Bars(
        groups
            .into_iter()
            .map(|g| BarDatum {
                label: g.key,
                value: g.mean,
            })
            .collect(),
    )
}

/// Points grouped into one series per skill category, with marker radius
/// scaled linearly from `size_by` over the view's range.
fn scatter(
    view: &FilteredView<'_>,
    x: NumericField,
    y: NumericField,
    size_by: NumericField,
    config: &DashboardConfig,
) -> ChartData {
    let (lo, hi) = view
        .iter()
        .map(|r| size_by.value(r))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let (min_size, max_size) = (config.min_marker_size, config.max_marker_size);
    let scale = |v: f64| -> f32 {
        if hi > lo {
            min_size + ((v - lo) / (hi - lo)) as f32 * (max_size - min_size)
        } else {
            (min_size + max_size) / 2.0
        }
    };

    let mut series: BTreeMap<&str, Vec<ScatterPoint>> = BTreeMap::new();
    for rec in view.iter() {
        series
            .entry(CategoricalField::SkillCategory.value(rec))
            .or_default()
            .push(ScatterPoint {
                x: x.value(rec),
                y: y.value(rec),
                size: scale(size_by.value(rec)),
                label: rec.skill_name.clone(),
            });
    }

    ChartData::Scatter(
        series
            .into_iter()
            .map(|(name, points)| ScatterSeries {
                name: name.to_string(),
                points,
            })
            .collect(),
    )
}

/// Industry counts stacked Low → Medium → High.
fn exposure_stack(view: &FilteredView<'_>) -> ChartData {
    let cells = cross_tab(view, CategoricalField::Industry);

    let mut categories: Vec<String> = Vec::new();
    let mut series: Vec<BarSeries> = ExposureBand::ALL
        .iter()
        .map(|band| BarSeries {
            name: band.label().to_string(),
            values: Vec::new(),
        })
        .collect();

    // cross_tab yields each industry's three bands consecutively.
    for cell in cells {
        if categories.last() != Some(&cell.row) {
            categories.push(cell.row.clone());
        }
        series[cell.band as usize].values.push(cell.count as f64);
    }

    ChartData::StackedBars { categories, series }
}
