use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::error::DataLoadError;
use super::loader::load_file;
use super::model::SkillDataset;

// ---------------------------------------------------------------------------
// Load-once dataset handle
// ---------------------------------------------------------------------------

/// Reads the dataset file on first use and hands out the same immutable
/// table for the rest of the process.
///
/// A failed load leaves the cache empty so the next call retries.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    cell: OnceLock<Arc<SkillDataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached dataset, loading it on the first call.
    pub fn load(&self) -> Result<Arc<SkillDataset>, DataLoadError> {
        if let Some(ds) = self.cell.get() {
            return Ok(Arc::clone(ds));
        }

        let dataset = Arc::new(load_file(&self.path)?);
        log::info!(
            "Loaded {} skill records from {} ({} categories, {} industries)",
            dataset.len(),
            self.path.display(),
            dataset.categories.len(),
            dataset.industries.len()
        );
        Ok(Arc::clone(self.cell.get_or_init(|| dataset)))
    }

    /// Whether a successful load has already happened.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn second_load_returns_the_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "skill_category,industry,ai_exposure_level,automation_risk,current_market_demand,\
             skill_half_life_years,reskilling_frequency_years,learning_mode"
        )
        .unwrap();
        writeln!(f, "Data,Finance,80,75,60,2,1,Online").unwrap();
        drop(f);

        let cache = DatasetCache::new(&path);
        assert!(!cache.is_loaded());
        let first = cache.load().unwrap();
        assert!(cache.is_loaded());

        // Removing the file proves the second call never touches the disk.
        std::fs::remove_file(&path).unwrap();
        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.csv");
        let cache = DatasetCache::new(&path);

        assert!(matches!(cache.load(), Err(DataLoadError::Io { .. })));
        assert!(!cache.is_loaded());

        std::fs::write(
            &path,
            "skill_category,industry,ai_exposure_level,automation_risk,current_market_demand,\
             skill_half_life_years,reskilling_frequency_years,learning_mode\n",
        )
        .unwrap();
        let ds = cache.load().unwrap();
        assert!(ds.is_empty());
    }
}
