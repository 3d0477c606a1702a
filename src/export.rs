use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::DashboardConfig;
use crate::dashboard::{render, Dashboard};
use crate::data::cache::DatasetCache;
use crate::data::error::DataLoadError;
use crate::data::filter::FilterSelection;
use crate::data::model::SkillDataset;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("loading {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: DataLoadError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialising dashboard: {0}")]
    Json(#[from] serde_json::Error),
}

/// Headless mode: load the dataset, render once for the selection built by
/// `select`, and write the dashboard to `out` as pretty JSON.
///
/// Nothing is written when the load fails.
pub fn export_to<F>(
    out: &Path,
    cache: &DatasetCache,
    config: &DashboardConfig,
    select: F,
) -> Result<Dashboard, ExportError>
where
    F: FnOnce(&SkillDataset) -> FilterSelection,
{
    let dataset = cache.load().map_err(|source| ExportError::Load {
        path: cache.path().to_path_buf(),
        source,
    })?;
    let dashboard = render(&dataset, &select(&dataset), config);
    write_dashboard(&dashboard, out)?;

    log::info!(
        "Exported {} charts ({} of {} rows) to {}",
        dashboard.charts.len(),
        dashboard.visible_rows,
        dashboard.total_rows,
        out.display()
    );
    Ok(dashboard)
}

/// Serialise `dashboard` to `out`, replacing any existing file.
pub fn write_dashboard(dashboard: &Dashboard, out: &Path) -> Result<(), ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: out.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(out).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, dashboard)?;
    writer.flush().map_err(io_err)
}
