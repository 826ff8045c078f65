// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — initialises the backend subsystems and provides
// async-friendly methods for a UI to call.
//
// The selection store is an actor and the job controller spawns its own
// blocking work, so the only shared mutable state here is the config, kept in
// an `Arc<Mutex<>>` that is only ever held for a clone or an assignment.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::human_errors::{humanize_error, humanize_skipped};
use bildwerk_core::{AppConfig, AssetId, CompositionResult, DisplayAsset, Folder, FolderId};
use bildwerk_document::PdfCompositor;
use bildwerk_selection::{AssetCatalog, SelectionStore, ToggleOutcome};
use tracing::{error, info, instrument, warn};

use super::data_dir::{self, DOCUMENTS_SUBDIR};
use super::job_controller::{CompositionJob, PdfJobController};

/// Shared application services.
///
/// All fields are cheaply cloneable (Arc-wrapped or handles) so that the
/// struct can be passed into closures and async blocks without lifetime
/// issues.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<dyn AssetCatalog>,
    store: SelectionStore,
    jobs: PdfJobController,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("data_dir", &self.data_dir)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl AppServices {
    /// Initialise all services over `catalog`. Call once at app startup,
    /// inside a tokio runtime.
    pub fn init(catalog: Arc<dyn AssetCatalog>) -> Result<Self> {
        Self::with_data_dir(data_dir::data_dir()?, catalog)
    }

    /// Initialise all services rooted at an explicit data directory.
    ///
    /// Loads the persisted config (or defaults), resolves the output
    /// directory, and starts the selection store. The catalog is not read
    /// until [`AppServices::refresh_catalog`].
    pub fn with_data_dir(dir: impl Into<PathBuf>, catalog: Arc<dyn AssetCatalog>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(path = %dir.display(), "Initialising app services");

        // Load persisted config or use defaults
        let config = load_config(&dir).unwrap_or_default();

        let output_dir = match &config.output_dir {
            Some(custom) => custom.clone(),
            None => data_dir::data_subdir(&dir, DOCUMENTS_SUBDIR)?,
        };
        let jobs = PdfJobController::new(PdfCompositor::new(&output_dir), &config.file_name_prefix);
        let store = SelectionStore::spawn_with_label(&config.all_folder_label)?;

        info!(output_dir = %output_dir.display(), "App services initialised");

        Ok(Self {
            catalog,
            store,
            jobs,
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        })
    }

    // -- Catalog -------------------------------------------------------------

    /// Re-read the catalog off the async threads and ingest it.
    ///
    /// The current selection is kept. Returns the number of assets listed.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&self) -> Result<usize> {
        let catalog = Arc::clone(&self.catalog);
        let assets = tokio::task::spawn_blocking(move || catalog.enumerate())
            .await
            .map_err(|err| BildwerkError::Task(err.to_string()))?
            .inspect_err(|err| error!(error = %err, "Catalog enumeration failed"))?;

        let count = assets.len();
        self.store.ingest(assets).await?;
        Ok(count)
    }

    /// Folders of the last ingested catalog, `ALL` first.
    pub fn folders(&self) -> Vec<Folder> {
        self.store.folders()
    }

    /// Images in `folder`, annotated with their selection index.
    pub fn images_in(&self, folder: &FolderId) -> Vec<DisplayAsset> {
        self.store.filter_by_folder(folder)
    }

    // -- Selection -----------------------------------------------------------

    /// Select or deselect one image.
    pub async fn toggle(&self, id: &AssetId) -> Result<ToggleOutcome> {
        self.store.toggle_selection(id).await
    }

    /// Selected images in selection order.
    pub fn selection(&self) -> Vec<DisplayAsset> {
        self.store.current_selection()
    }

    /// The store itself, for callers that want to subscribe to changes.
    pub fn selection_store(&self) -> &SelectionStore {
        &self.store
    }

    // -- PDF generation ------------------------------------------------------

    /// Compose the current selection into a PDF and wait for it.
    ///
    /// An empty selection is refused with `EmptySelection` and nothing is
    /// started.
    #[instrument(skip(self))]
    pub async fn create_pdf_from_selection(&self, name_hint: Option<&str>) -> CompositionResult {
        let selection = self.selection();
        let requested = selection.len();

        match self.jobs.run(&selection, name_hint).await {
            Ok(document) => {
                if let Some(notice) = humanize_skipped(document.skipped_pages(), requested) {
                    warn!(
                        skipped = document.skipped_pages(),
                        path = %document.path.display(),
                        "{}", notice.message
                    );
                }
                Ok(document)
            }
            Err(err) => {
                let human = humanize_error(&err);
                if err.is_fatal() && !matches!(err, BildwerkError::EmptySelection | BildwerkError::Cancelled) {
                    error!(error = %err, suggestion = %human.suggestion, "{}", human.message);
                } else {
                    info!(error = %err, "{}", human.message);
                }
                Err(err)
            }
        }
    }

    /// Start composing the current selection without waiting.
    pub fn start_pdf_from_selection(&self, name_hint: Option<&str>) -> Result<CompositionJob> {
        self.jobs.start(&self.selection(), name_hint)
    }

    /// Whether a PDF is currently being generated.
    pub fn is_generating(&self) -> bool {
        self.jobs.is_generating()
    }

    /// Directory receiving finished PDFs.
    pub fn output_dir(&self) -> &Path {
        self.jobs.compositor().output_dir()
    }

    // -- Config Persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.lock_config().clone()
    }

    /// Update and persist the config.
    ///
    /// Output directory, prefix and folder label take effect the next time
    /// the services are initialised.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.lock_config() = config.clone();
        persist_config(&self.data_dir, config)
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn lock_config(&self) -> MutexGuard<'_, AppConfig> {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::{Asset, Locator};
    use bildwerk_selection::MemoryCatalog;
    use image::{Rgb, RgbImage};

    /// Write `names` as small PNGs under `dir` and return matching assets.
    fn photo_catalog(dir: &Path, names: &[(&str, &str)]) -> Arc<dyn AssetCatalog> {
        let assets = names
            .iter()
            .map(|(name, container)| {
                let path = dir.join(format!("{name}.png"));
                RgbImage::from_pixel(30, 20, Rgb([10, 120, 240]))
                    .save(&path)
                    .unwrap();
                Asset::new(*name, Locator::from_path(&path), *name, *container)
            })
            .collect();
        Arc::new(MemoryCatalog::new(assets))
    }

    #[tokio::test]
    async fn browse_select_and_compose() {
        let photos = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let catalog = photo_catalog(
            photos.path(),
            &[("a", "Camera"), ("b", "Downloads"), ("c", "Camera")],
        );
        let services = AppServices::with_data_dir(data.path(), catalog).unwrap();

        assert_eq!(services.refresh_catalog().await.unwrap(), 3);
        let folders = services.folders();
        assert_eq!(folders.len(), 3);
        assert_eq!(folders[0].name, "All Images");
        assert_eq!(services.images_in(&FolderId::container("Camera")).len(), 2);

        services.toggle(&AssetId::from("c")).await.unwrap();
        services.toggle(&AssetId::from("a")).await.unwrap();
        let selection = services.selection();
        assert_eq!(selection[0].asset.id, AssetId::from("c"));
        assert_eq!(selection[1].selection_index, Some(2));

        let document = services.create_pdf_from_selection(Some("trip")).await.unwrap();
        assert_eq!(document.page_count, 2);
        assert!(document.is_complete());
        assert_eq!(document.path, data.path().join("documents").join("trip.pdf"));
        assert!(document.path.is_file());
        assert!(!services.is_generating());
    }

    #[tokio::test]
    async fn empty_selection_is_refused() {
        let photos = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let catalog = photo_catalog(photos.path(), &[("a", "Camera")]);
        let services = AppServices::with_data_dir(data.path(), catalog).unwrap();
        services.refresh_catalog().await.unwrap();

        let err = services.create_pdf_from_selection(None).await.unwrap_err();
        assert!(matches!(err, BildwerkError::EmptySelection));
        assert!(services.start_pdf_from_selection(None).is_err());
        assert_eq!(std::fs::read_dir(services.output_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn config_survives_restart() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let catalog: Arc<dyn AssetCatalog> = Arc::new(MemoryCatalog::default());

        let services = AppServices::with_data_dir(data.path(), Arc::clone(&catalog)).unwrap();
        assert_eq!(services.config(), AppConfig::default());

        let config = AppConfig {
            output_dir: Some(out.path().to_path_buf()),
            file_name_prefix: "Album".into(),
            all_folder_label: "Everything".into(),
        };
        services.save_config(&config).unwrap();
        assert_eq!(services.config(), config);

        let restarted = AppServices::with_data_dir(data.path(), catalog).unwrap();
        assert_eq!(restarted.config(), config);
        assert_eq!(restarted.output_dir(), out.path());
    }

    #[tokio::test]
    async fn unreadable_config_falls_back_to_defaults() {
        let data = tempfile::tempdir().unwrap();
        std::fs::write(data.path().join(CONFIG_FILE), "{ not json").unwrap();
        let services =
            AppServices::with_data_dir(data.path(), Arc::new(MemoryCatalog::default())).unwrap();
        assert_eq!(services.config(), AppConfig::default());
    }
}
