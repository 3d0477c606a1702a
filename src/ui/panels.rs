use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use skill_halflife::data::filter::Facet;
use skill_halflife::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Global Filters");
    ui.separator();

    // The dataset is immutable; holding an `Arc` lets us mutate state below.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for facet in [Facet::Category, Facet::Industry] {
                multi_select(ui, state, facet, facet.values(&dataset));
            }
            ui.separator();

            // ---- Exposure range ----
            ui.strong("AI Exposure Level");
            let (lo, hi) = dataset.exposure_bounds();
            let mut min = state.selection.exposure_min.round() as i32;
            let mut max = state.selection.exposure_max.round() as i32;
            let mut changed = false;
            changed |= ui
                .add(egui::Slider::new(&mut min, lo..=hi).text("min"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut max, lo..=hi).text("max"))
                .changed();
            if changed {
                state.set_exposure_range(f64::from(min), f64::from(max));
            }

            ui.add_space(8.0);
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

/// Collapsible checkbox list with All / None buttons.
fn multi_select(ui: &mut Ui, state: &mut AppState, facet: Facet, values: &[String]) {
    let title = facet.label();
    let selected_count = state.selection.selected(facet).len();
    let header_text = format!("{title}  ({selected_count}/{})", values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(facet);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(facet);
                }
            });

            for value in values {
                let mut checked = state.selection.selected(facet).contains(value);

                // Categories carry their scatter colour as a legend.
                let mut text = RichText::new(value);
                if facet == Facet::Category {
                    text = text.color(state.category_colors.color_for(value));
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle(facet, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dash) = &state.dashboard {
            ui.label(format!(
                "{} skills loaded, {} visible",
                dash.total_rows, dash.visible_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open skill dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
