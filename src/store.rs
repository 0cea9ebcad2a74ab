//! Memoized loading of the program sheets.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::dataset::Dataset;
use crate::error::{AnalyzerError, Result};
use crate::loader::{build_sheet, list_sheet_files, RawSheet, SheetLoader};
use crate::models::{Config, DataSourceMode};

/// Where sheets come from.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub mode: DataSourceMode,
    pub directory: Option<PathBuf>,
    pub urls: Vec<String>,
}

impl DataSource {
    pub fn local(directory: impl Into<PathBuf>) -> Self {
        Self {
            mode: DataSourceMode::Local,
            directory: Some(directory.into()),
            urls: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.data_source_mode,
            directory: config.data_directory.as_ref().map(PathBuf::from),
            urls: config.internet_urls.clone().unwrap_or_default(),
        }
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.mode.uses_local() {
            if let Some(dir) = &self.directory {
                parts.push(dir.display().to_string());
            }
        }
        if self.mode.uses_internet() {
            parts.extend(self.urls.iter().cloned());
        }
        parts.join(", ")
    }
}

/// Identity of the local sheet files at load time. Remote sheets are not
/// tracked; they only reload through [`DataStore::invalidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFingerprint {
    files: Vec<(PathBuf, Option<SystemTime>, u64)>,
}

struct CachedLoad {
    fingerprint: SourceFingerprint,
    dataset: Dataset,
}

/// Lazily loads the dataset once and serves the cached copy until the local
/// source files change or the cache is invalidated.
pub struct DataStore {
    source: DataSource,
    loader: SheetLoader,
    cached: Option<CachedLoad>,
    loads: usize,
}

impl DataStore {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            loader: SheetLoader::new(),
            cached: None,
            loads: 0,
        }
    }

    /// Number of loads performed so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Drop the cached dataset; the next [`DataStore::dataset`] call reloads.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub async fn reload(&mut self) -> Result<&Dataset> {
        self.invalidate();
        self.dataset().await
    }

    pub async fn dataset(&mut self) -> Result<&Dataset> {
        let fingerprint = self.fingerprint()?;
        let cached = match self.cached.take() {
            Some(cached) if cached.fingerprint == fingerprint => cached,
            previous => {
                if previous.is_some() {
                    log::info!("Source files changed, reloading");
                }
                let dataset = self.load().await?;
                self.loads += 1;
                CachedLoad {
                    fingerprint,
                    dataset,
                }
            }
        };
        Ok(&self.cached.insert(cached).dataset)
    }

    fn fingerprint(&self) -> Result<SourceFingerprint> {
        let mut files = Vec::new();
        if let (true, Some(dir)) = (self.source.mode.uses_local(), &self.source.directory) {
            for path in list_sheet_files(dir)? {
                let metadata = std::fs::metadata(&path)?;
                files.push((path, metadata.modified().ok(), metadata.len()));
            }
        }
        Ok(SourceFingerprint { files })
    }

    async fn load(&self) -> Result<Dataset> {
        let mut raw_sheets: Vec<RawSheet> = Vec::new();

        if let (true, Some(dir)) = (self.source.mode.uses_local(), &self.source.directory) {
            log::info!("Reading sheets from: {}", dir.display());
            for path in list_sheet_files(dir)? {
                match self.loader.load_file(&path) {
                    Ok(sheet) => raw_sheets.push(sheet),
                    Err(e) => log::error!("Error loading {}: {}", path.display(), e),
                }
            }
        }

        if self.source.mode.uses_internet() {
            for url in &self.source.urls {
                match self.loader.fetch_url(url).await {
                    Ok(sheet) => raw_sheets.push(sheet),
                    Err(e) => log::error!("Error fetching {url}: {e}"),
                }
            }
        }

        let sheets: Vec<_> = raw_sheets.iter().filter_map(build_sheet).collect();
        if sheets.is_empty() {
            return Err(AnalyzerError::NoUsableSheets(self.source.describe()));
        }

        let dataset = Dataset::new(sheets);
        log::info!(
            "Data loaded: {} areas, {} programs",
            dataset.area_names().len(),
            dataset.total_records()
        );
        Ok(dataset)
    }
}
