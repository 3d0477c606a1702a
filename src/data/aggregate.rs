use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{CategoricalField, ExposureBand, NumericField, SkillRecord};

/// Default cut-off for the "high exposure" and "high risk" KPIs.
pub const HIGH_THRESHOLD: f64 = 70.0;

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

/// Arithmetic mean of `field`; `None` when the view is empty.
pub fn mean_of(view: &FilteredView<'_>, field: NumericField) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    let sum: f64 = view.iter().map(|r| field.value(r)).sum();
    Some(sum / view.len() as f64)
}

pub fn mean_half_life(view: &FilteredView<'_>) -> Option<f64> {
    mean_of(view, NumericField::HalfLife)
}

pub fn mean_reskilling_interval(view: &FilteredView<'_>) -> Option<f64> {
    mean_of(view, NumericField::ReskillingFrequency)
}

/// Percentage (0–100) of rows whose exposure is strictly above `threshold`.
pub fn high_exposure_percentage(view: &FilteredView<'_>, threshold: f64) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    let above = count_above(view, NumericField::AiExposure, threshold);
    Some(above as f64 / view.len() as f64 * 100.0)
}

/// Rows whose automation risk is strictly above `threshold`.
pub fn high_risk_count(view: &FilteredView<'_>, threshold: f64) -> usize {
    count_above(view, NumericField::AutomationRisk, threshold)
}

fn count_above(view: &FilteredView<'_>, field: NumericField, threshold: f64) -> usize {
    view.iter().filter(|r| field.value(r) > threshold).count()
}

// ---------------------------------------------------------------------------
// Group-by mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
    pub count: usize,
}

/// Collect the rows of `view` per distinct `group` value, keys ascending.
fn grouped<'a>(
    view: &FilteredView<'a>,
    group: CategoricalField,
) -> BTreeMap<&'a str, Vec<&'a SkillRecord>> {
    let mut groups: BTreeMap<&'a str, Vec<&'a SkillRecord>> = BTreeMap::new();
    for rec in view.iter() {
        groups.entry(group.value(rec)).or_default().push(rec);
    }
    groups
}

/// Mean of `value` per distinct `group`, sorted by key ascending.
pub fn group_mean(
    view: &FilteredView<'_>,
    group: CategoricalField,
    value: NumericField,
) -> Vec<GroupMean> {
    grouped(view, group)
        .into_iter()
        .map(|(key, rows)| {
            let sum: f64 = rows.iter().map(|r| value.value(r)).sum();
            GroupMean {
                key: key.to_string(),
                mean: sum / rows.len() as f64,
                count: rows.len(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the observed range of `field`.
///
/// Bins are `[start, end)` except the last, which also holds the maximum.
/// A constant column is widened to `[v - 0.5, v + 0.5]`.
pub fn histogram_bins(
    view: &FilteredView<'_>,
    field: NumericField,
    bin_count: usize,
) -> Vec<HistogramBin> {
    if view.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let values: Vec<f64> = view.iter().map(|r| field.value(r)).collect();
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for v in values {
        let idx = ((v - min) / width).floor() as usize;
        counts[idx.min(bin_count - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: if i + 1 == bin_count {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cross-tab against exposure bands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub row: String,
    pub band: ExposureBand,
    pub count: usize,
}

/// Record counts per (`row` value, exposure band).
///
/// Every row value present in the view gets all three bands, zero counts
/// included, ordered by row key then Low/Medium/High.
pub fn cross_tab(view: &FilteredView<'_>, row: CategoricalField) -> Vec<CrossTabCell> {
    let mut counts: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
    for rec in view.iter() {
        let band = ExposureBand::from_level(rec.ai_exposure_level);
        counts.entry(row.value(rec)).or_default()[band as usize] += 1;
    }

    counts
        .into_iter()
        .flat_map(|(key, per_band)| {
            ExposureBand::ALL.into_iter().map(move |band| CrossTabCell {
                row: key.to_string(),
                band,
                count: per_band[band as usize],
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub key: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest data point within 1.5 × IQR below `q1`.
    pub lower_fence: f64,
    /// Highest data point within 1.5 × IQR above `q3`.
    pub upper_fence: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Linear-interpolation quantile of an ascending slice; `None` if empty.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Five-number summary with Tukey fences of `value` per `group`.
pub fn box_stats(
    view: &FilteredView<'_>,
    group: CategoricalField,
    value: NumericField,
) -> Vec<BoxStats> {
    grouped(view, group)
        .into_iter()
        .filter_map(|(key, rows)| {
            let mut values: Vec<f64> = rows.iter().map(|r| value.value(r)).collect();
            values.sort_by(f64::total_cmp);

            let q1 = quantile(&values, 0.25)?;
            let median = quantile(&values, 0.5)?;
            let q3 = quantile(&values, 0.75)?;
            let iqr = q3 - q1;
            let (lo_limit, hi_limit) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

            let mut lower_fence = f64::INFINITY;
            let mut upper_fence = f64::NEG_INFINITY;
            let mut outliers = Vec::new();
            for &v in &values {
                if (lo_limit..=hi_limit).contains(&v) {
                    lower_fence = lower_fence.min(v);
                    upper_fence = upper_fence.max(v);
                } else {
                    outliers.push(v);
                }
            }

            Some(BoxStats {
                key: key.to_string(),
                q1,
                median,
                q3,
                lower_fence,
                upper_fence,
                outliers,
                count: values.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::tests::{record, three_rows};
    use crate::data::model::SkillDataset;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn kpis_on_three_rows() {
        let ds = three_rows();
        let view = apply(&ds, &FilterSelection::all(&ds));

        assert!(approx(mean_half_life(&view).unwrap(), 8.0 / 3.0));
        assert!(approx(
            high_exposure_percentage(&view, HIGH_THRESHOLD).unwrap(),
            200.0 / 3.0
        ));
        assert_eq!(high_risk_count(&view, HIGH_THRESHOLD), 2);
        assert!(approx(mean_reskilling_interval(&view).unwrap(), 2.0));
    }

    #[test]
    fn kpis_on_narrowed_range() {
        let ds = three_rows();
        let mut sel = FilterSelection::all(&ds);
        sel.set_exposure_range(0.0, 50.0);
        let view = apply(&ds, &sel);

        assert_eq!(mean_half_life(&view), Some(5.0));
        assert_eq!(high_risk_count(&view, HIGH_THRESHOLD), 0);
        assert_eq!(high_exposure_percentage(&view, HIGH_THRESHOLD), Some(0.0));
    }

    #[test]
    fn empty_view_degrades_to_no_data() {
        let view = FilteredView::default();
        assert_eq!(mean_half_life(&view), None);
        assert_eq!(mean_reskilling_interval(&view), None);
        assert_eq!(high_exposure_percentage(&view, HIGH_THRESHOLD), None);
        assert_eq!(high_risk_count(&view, HIGH_THRESHOLD), 0);
        assert!(group_mean(&view, CategoricalField::SkillCategory, NumericField::HalfLife).is_empty());
        assert!(histogram_bins(&view, NumericField::AutomationRisk, 10).is_empty());
        assert!(cross_tab(&view, CategoricalField::Industry).is_empty());
        assert!(box_stats(&view, CategoricalField::SkillCategory, NumericField::HalfLife).is_empty());
    }

    #[test]
    fn group_mean_sorted_by_key() {
        let ds = SkillDataset::from_records(vec![
            record("Zeta", "X", 10.0, 10.0, 4.0),
            record("Alpha", "X", 10.0, 10.0, 1.0),
            record("Zeta", "X", 10.0, 10.0, 2.0),
        ]);
        let view = apply(&ds, &FilterSelection::all(&ds));
        let groups = group_mean(&view, CategoricalField::SkillCategory, NumericField::HalfLife);
        assert_eq!(
            groups,
            vec![
                GroupMean { key: "Alpha".into(), mean: 1.0, count: 1 },
                GroupMean { key: "Zeta".into(), mean: 3.0, count: 2 },
            ]
        );
    }

    #[test]
    fn histogram_spans_observed_range() {
        let ds = SkillDataset::from_records(
            [0.0, 10.0, 20.0, 50.0, 100.0]
                .iter()
                .map(|&risk| record("A", "X", 10.0, risk, 1.0))
                .collect(),
        );
        let view = apply(&ds, &FilterSelection::all(&ds));
        let bins = histogram_bins(&view, NumericField::AutomationRisk, 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 100.0);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[2].count, 1);
        assert_eq!(bins[5].count, 1);
        assert_eq!(bins[9].count, 1, "maximum lands in the last bin");
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn histogram_of_constant_column() {
        let ds = SkillDataset::from_records(vec![
            record("A", "X", 10.0, 42.0, 1.0),
            record("A", "X", 10.0, 42.0, 1.0),
        ]);
        let view = apply(&ds, &FilterSelection::all(&ds));
        let bins = histogram_bins(&view, NumericField::AutomationRisk, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 41.5);
        assert_eq!(bins[3].end, 42.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram_bins(&view, NumericField::AutomationRisk, 0).is_empty());
    }

    #[test]
    fn cross_tab_bands() {
        let ds = SkillDataset::from_records(vec![
            record("A", "Retail", 80.0, 10.0, 1.0),
            record("A", "Retail", 30.0, 10.0, 1.0),
            record("A", "Finance", 50.0, 10.0, 1.0),
            record("A", "Finance", 40.0, 10.0, 1.0),
            record("A", "Finance", 41.0, 10.0, 1.0),
        ]);
        let view = apply(&ds, &FilterSelection::all(&ds));
        let cells = cross_tab(&view, CategoricalField::Industry);

        let counts: Vec<(&str, ExposureBand, usize)> = cells
            .iter()
            .map(|c| (c.row.as_str(), c.band, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Finance", ExposureBand::Low, 1),
                ("Finance", ExposureBand::Medium, 2),
                ("Finance", ExposureBand::High, 0),
                ("Retail", ExposureBand::Low, 1),
                ("Retail", ExposureBand::Medium, 0),
                ("Retail", ExposureBand::High, 1),
            ]
        );
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let mut records: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&y| {
                let mut r = record("A", "X", 10.0, 10.0, 1.0);
                r.reskilling_frequency_years = y;
                r
            })
            .collect();
        let mut far = record("A", "X", 10.0, 10.0, 1.0);
        far.reskilling_frequency_years = 40.0;
        records.push(far);
        records.push(record("B", "X", 10.0, 10.0, 1.0));

        let ds = SkillDataset::from_records(records);
        let view = apply(&ds, &FilterSelection::all(&ds));
        let stats = box_stats(
            &view,
            CategoricalField::SkillCategory,
            NumericField::ReskillingFrequency,
        );

        assert_eq!(stats.len(), 2);
        let a = &stats[0];
        assert_eq!(a.key, "A");
        assert_eq!(a.count, 6);
        assert!(approx(a.q1, 2.25));
        assert!(approx(a.median, 3.5));
        assert!(approx(a.q3, 4.75));
        assert_eq!(a.lower_fence, 1.0);
        assert_eq!(a.upper_fence, 5.0);
        assert_eq!(a.outliers, vec![40.0]);

        let b = &stats[1];
        assert_eq!((b.q1, b.median, b.q3), (2.0, 2.0, 2.0));
        assert!(b.outliers.is_empty());
    }
}
