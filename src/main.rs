mod app;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::SkillDashboardApp;
use clap::Parser;
use eframe::egui;
use skill_halflife::config::DashboardConfig;
use skill_halflife::dashboard::TITLE;
use skill_halflife::data::cache::DatasetCache;
use skill_halflife::data::filter::FilterSelection;
use skill_halflife::data::model::SkillDataset;
use skill_halflife::export::export_to;
use skill_halflife::state::AppState;

/// Workforce skill half-life dashboard.
#[derive(Parser)]
#[command(name = "skill-halflife", version, about)]
struct Cli {
    /// Dataset file (.csv, .json or .parquet). Overrides the config file.
    dataset: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Render once without a window and write the dashboard as JSON here.
    #[arg(long, short = 'e')]
    export: Option<PathBuf>,

    /// Only include this skill category (repeatable). Default: all.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Only include this industry (repeatable). Default: all.
    #[arg(long = "industry")]
    industries: Vec<String>,

    /// Lower bound of the AI exposure range.
    #[arg(long)]
    min_exposure: Option<f64>,

    /// Upper bound of the AI exposure range.
    #[arg(long)]
    max_exposure: Option<f64>,
}

impl Cli {
    fn load_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(path) = &self.dataset {
            config.dataset_path = path.clone();
        }
        Ok(config)
    }

    /// Default selection narrowed by the command-line filters.
    fn selection(&self, dataset: &SkillDataset) -> FilterSelection {
        FilterSelection::narrowed(
            dataset,
            &self.categories,
            &self.industries,
            self.min_exposure,
            self.max_exposure,
        )
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let cache = DatasetCache::new(&config.dataset_path);

    if let Some(out) = &cli.export {
        export_to(out, &cache, &config, |ds| cli.selection(ds))?;
        return Ok(());
    }

    let mut state = AppState::new(config);
    match cache.load() {
        Ok(dataset) => {
            let selection = cli.selection(&dataset);
            state.set_dataset(dataset);
            state.selection = selection;
            state.refilter();
        }
        Err(e) => state.set_load_error(&e),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(SkillDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
