use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points,
};

use skill_halflife::color::{band_color, ColorMap};
use skill_halflife::dashboard::{ChartData, ChartKind, ChartSpec, Dashboard, CAPTION, NO_DATA, TITLE};
use skill_halflife::data::filter::apply;
use skill_halflife::data::model::{ExposureBand, SkillDataset};
use skill_halflife::state::AppState;

const CHART_HEIGHT: f32 = 280.0;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Central panel: KPI row + chart grid
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(dash)) = (&state.dataset, &state.dashboard) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a skill dataset to view the dashboard  (File → Open…)");
        });
        return;
    };

    ui.heading(TITLE);
    ui.label(RichText::new(CAPTION).weak());
    ui.separator();

    kpi_row(ui, dash);
    if let Some(warning) = &dash.warning {
        ui.label(RichText::new(warning.to_string()).color(Color32::YELLOW));
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // Two charts per row; an odd one out spans the full width.
            for pair in dash.charts.chunks(2) {
                match pair {
                    [left, right] => {
                        ui.columns(2, |cols| {
                            chart(&mut cols[0], left, &state.category_colors);
                            chart(&mut cols[1], right, &state.category_colors);
                        });
                    }
                    [single] => chart(ui, single, &state.category_colors),
                    _ => {}
                }
                ui.add_space(12.0);
            }

            egui::CollapsingHeader::new("Filtered records")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    preview_table(ui, dataset, state);
                });
        });
}

fn kpi_row(ui: &mut Ui, dash: &Dashboard) {
    let tiles = dash.kpis.tiles();
    ui.columns(tiles.len(), |cols| {
        for (col, tile) in cols.iter_mut().zip(tiles.iter()) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(tile.label).weak());
                ui.label(RichText::new(&tile.value).size(28.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// One chart descriptor → egui_plot
// ---------------------------------------------------------------------------

fn chart(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap) {
    ui.strong(spec.title);

    if spec.data.is_empty() {
        ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(NO_DATA).weak());
            });
        });
        return;
    }

    let mut plot = Plot::new(spec.id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x_label)
        .y_axis_label(spec.y_label)
        .allow_scroll(false);

    match &spec.data {
        ChartData::Bars(bars) => {
            let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
            let horizontal = spec.kind == ChartKind::HorizontalBar;
            plot = if horizontal {
                plot.y_axis_formatter(category_axis(labels))
            } else {
                plot.x_axis_formatter(category_axis(labels))
            };

            let bars: Vec<Bar> = bars
                .iter()
                .enumerate()
                .map(|(i, b)| Bar::new(i as f64, b.value).width(0.7).name(&b.label))
                .collect();
            let mut chart = BarChart::new(bars).color(BAR_COLOR).name(spec.y_label);
            if horizontal {
                chart = chart.horizontal().name(spec.x_label);
            }
            plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
        }

        ChartData::StackedBars { categories, series } => {
            plot = plot.x_axis_formatter(category_axis(categories.clone()));

            let mut layers: Vec<BarChart> = Vec::new();
            for (band, layer) in ExposureBand::ALL.iter().zip(series) {
                let bars: Vec<Bar> = layer
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| Bar::new(i as f64, v).width(0.7))
                    .collect();
                let below: Vec<&BarChart> = layers.iter().collect();
                let chart = BarChart::new(bars)
                    .name(&layer.name)
                    .color(band_color(*band))
                    .stack_on(&below);
                layers.push(chart);
            }
            plot.show(ui, |plot_ui| {
                for layer in layers {
                    plot_ui.bar_chart(layer);
                }
            });
        }

        ChartData::Scatter(series) => {
            plot.show(ui, |plot_ui| {
                for s in series {
                    // egui_plot has one radius per item: bucket points by size.
                    let mut by_size: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
                    for p in &s.points {
                        by_size
                            .entry(p.size.round() as u32)
                            .or_default()
                            .push([p.x, p.y]);
                    }
                    for (radius, points) in by_size {
                        plot_ui.points(
                            Points::new(PlotPoints::new(points))
                                .radius(radius as f32)
                                .color(colors.color_for(&s.name))
                                .name(&s.name),
                        );
                    }
                }
            });
        }

        ChartData::Histogram(bins) => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| {
                    Bar::new((b.start + b.end) / 2.0, b.count as f64)
                        .width(b.end - b.start)
                        .name(format!("{:.1} – {:.1}", b.start, b.end))
                })
                .collect();
            let chart = BarChart::new(bars).color(BAR_COLOR).name("count");
            plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
        }

        ChartData::Boxes(boxes) => {
            let labels: Vec<String> = boxes.iter().map(|b| b.key.clone()).collect();
            plot = plot.x_axis_formatter(category_axis(labels));

            plot.show(ui, |plot_ui| {
                for (i, b) in boxes.iter().enumerate() {
                    let x = i as f64;
                    let color = colors.color_for(&b.key);
                    let elem = BoxElem::new(
                        x,
                        BoxSpread::new(b.lower_fence, b.q1, b.median, b.q3, b.upper_fence),
                    )
                    .box_width(0.5)
                    .name(&b.key);
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).color(color).name(&b.key));

                    if !b.outliers.is_empty() {
                        let points: Vec<[f64; 2]> = b.outliers.iter().map(|&y| [x, y]).collect();
                        plot_ui.points(
                            Points::new(PlotPoints::new(points))
                                .radius(3.0)
                                .color(color)
                                .name(&b.key),
                        );
                    }
                }
            });
        }
    }
}

/// Axis labels for categorical charts: integer ticks map to `labels`.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Filtered-record preview
// ---------------------------------------------------------------------------

const PREVIEW_COLUMNS: [&str; 9] = [
    "Skill",
    "Category",
    "Industry",
    "AI Exposure",
    "Automation Risk",
    "Demand",
    "Half-Life",
    "Reskilling",
    "Learning Mode",
];

fn preview_table(ui: &mut Ui, dataset: &SkillDataset, state: &AppState) {
    let view = apply(dataset, &state.selection);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .columns(Column::auto().at_least(70.0), PREVIEW_COLUMNS.len())
        .header(20.0, |mut header| {
            for name in PREVIEW_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let rec = view.rows[row.index()];
                let cells = [
                    rec.skill_name.clone().unwrap_or_default(),
                    rec.skill_category.clone(),
                    rec.industry.clone(),
                    format!("{:.1}", rec.ai_exposure_level),
                    format!("{:.1}", rec.automation_risk),
                    format!("{:.1}", rec.current_market_demand),
                    format!("{:.1}", rec.skill_half_life_years),
                    format!("{:.1}", rec.reskilling_frequency_years),
                    rec.learning_mode.clone(),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
