// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asset catalog — where the list of available images comes from.
//
// On a phone this is the platform media index; on desktop and in CI it is a
// directory tree or a fixed list. The store only ever sees the flat,
// newest-first `Vec<Asset>` a catalog returns.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{Asset, AssetId, Locator};
use tracing::{debug, info, instrument, warn};

/// Display name used when an image has no usable file name.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Container used for images that are not inside any folder.
pub const DEFAULT_CONTAINER: &str = "Other";

/// Enumerates the images available to the user.
///
/// Implementations may block on I/O; callers run them on the blocking pool.
/// A failure to read the underlying source (including a denied permission)
/// is reported as `BildwerkError::Catalog`.
pub trait AssetCatalog: Send + Sync {
    /// All images, most recently added first.
    fn enumerate(&self) -> Result<Vec<Asset>>;
}

/// A catalog over an already-built list.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    assets: Vec<Asset>,
}

impl MemoryCatalog {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

impl AssetCatalog for MemoryCatalog {
    fn enumerate(&self) -> Result<Vec<Asset>> {
        Ok(self.assets.clone())
    }
}

/// A catalog over a directory tree.
///
/// Image files directly inside `root` belong to the [`DEFAULT_CONTAINER`];
/// files one level down belong to a container named after their directory.
/// Hidden entries are ignored. Assets are ordered newest-modified first and
/// identified by their path relative to `root`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_dir(&self, dir: &Path) -> Result<std::fs::ReadDir> {
        std::fs::read_dir(dir).map_err(|err| {
            BildwerkError::Catalog(format!("cannot read {}: {err}", dir.display()))
        })
    }

    fn asset_for(&self, path: &Path, container: &str) -> Asset {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        Asset::new(AssetId(id), Locator::from_path(path), display_name, container)
    }
}

impl AssetCatalog for DirectoryCatalog {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn enumerate(&self) -> Result<Vec<Asset>> {
        let mut found: Vec<(SystemTime, Asset)> = Vec::new();

        for entry in self.read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable catalog entry");
                    continue;
                }
            };
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            if path.is_dir() {
                let container = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| DEFAULT_CONTAINER.to_string());
                let children = match self.read_dir(&path) {
                    Ok(children) => children,
                    Err(err) => {
                        warn!(error = %err, "Skipping unreadable folder");
                        continue;
                    }
                };
                for child in children.filter_map(std::result::Result::ok) {
                    let child_path = child.path();
                    if let Some(modified) = image_modified(&child_path) {
                        found.push((modified, self.asset_for(&child_path, &container)));
                    }
                }
            } else if let Some(modified) = image_modified(&path) {
                found.push((modified, self.asset_for(&path, DEFAULT_CONTAINER)));
            }
        }

        // Newest first; ties broken by id so the listing is deterministic.
        found.sort_by(|(a_time, a), (b_time, b)| b_time.cmp(a_time).then_with(|| a.id.cmp(&b.id)));
        let assets: Vec<Asset> = found.into_iter().map(|(_, asset)| asset).collect();

        info!(count = assets.len(), "Catalog enumerated");
        Ok(assets)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Modification time of `path` if it is a visible image file.
fn image_modified(path: &Path) -> Option<SystemTime> {
    if is_hidden(path) || !path.is_file() || image::ImageFormat::from_path(path).is_err() {
        return None;
    }
    match path.metadata().and_then(|meta| meta.modified()) {
        Ok(modified) => Some(modified),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "No modification time, treating as oldest");
            Some(SystemTime::UNIX_EPOCH)
        }
    }
}
