// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: assets, folders, selection views, and composition jobs.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BildwerkError;

/// Unique identifier for a composition job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of an enumerated image, as issued by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to image bytes.
///
/// The core never interprets a locator beyond handing it to an image source.
/// Filesystem sources accept either a plain path or a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(pub String);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem path for this locator, with any `file://` scheme removed.
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(self.0.strip_prefix("file://").unwrap_or(&self.0))
    }
}

impl From<&str> for Locator {
    fn from(locator: &str) -> Self {
        Self(locator.to_owned())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One enumerated image. Immutable once enumerated; equality is by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub locator: Locator,
    pub display_name: String,
    /// Name of the folder (album, bucket, directory) holding the image.
    pub container_name: String,
}

impl Asset {
    pub fn new(
        id: impl Into<AssetId>,
        locator: Locator,
        display_name: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            locator,
            display_name: display_name.into(),
            container_name: container_name.into(),
        }
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a derived folder.
///
/// The synthetic "all images" folder has its own variant so that a container
/// that happens to be called "ALL" can never shadow it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FolderId {
    All,
    Container(String),
}

impl FolderId {
    pub fn container(name: impl Into<String>) -> Self {
        Self::Container(name.into())
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Container(name) => f.write_str(name),
        }
    }
}

/// A folder aggregate derived from the canonical asset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    /// Locator of the first asset listed in this folder (used as its cover).
    pub representative: Locator,
    pub count: usize,
}

/// Association of an asset with its 1-based position in the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub asset_id: AssetId,
    pub order: usize,
}

/// An asset annotated with its selection state. Purely a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAsset {
    pub asset: Asset,
    /// 1-based position in the selection, `None` when unselected.
    pub selection_index: Option<usize>,
}

impl DisplayAsset {
    /// Sentinel reported by [`DisplayAsset::index_or_unselected`].
    pub const UNSELECTED: i64 = -1;

    pub fn is_selected(&self) -> bool {
        self.selection_index.is_some()
    }

    /// Selection index as a signed integer, `-1` when unselected.
    pub fn index_or_unselected(&self) -> i64 {
        self.selection_index
            .map_or(Self::UNSELECTED, |index| index as i64)
    }
}

/// Fixed page canvas in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    /// ISO A4 at 72 points per inch.
    pub const A4: Self = Self {
        width: 595.0,
        height: 842.0,
    };
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// One request to render an ordered locator sequence into a single PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub job_id: JobId,
    pub ordered_locators: Vec<Locator>,
    /// File stem of the output; `.pdf` is appended by the compositor.
    pub output_name: String,
}

impl CompositionRequest {
    pub fn new(ordered_locators: Vec<Locator>, output_name: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(),
            ordered_locators,
            output_name: output_name.into(),
        }
    }
}

/// An input the compositor could not decode and therefore left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// 1-based position of the locator in the request.
    pub position: usize,
    pub locator: Locator,
    pub reason: String,
}

/// A successfully written document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedDocument {
    pub job_id: JobId,
    pub path: PathBuf,
    pub page_count: usize,
    /// Inputs left out because they failed to decode, in request order.
    pub skipped: Vec<SkippedPage>,
    /// SHA-256 of the written bytes.
    pub sha256: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl ComposedDocument {
    pub fn skipped_pages(&self) -> usize {
        self.skipped.len()
    }

    /// True when every requested image made it into the document.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Outcome of one composition job.
pub type CompositionResult = Result<ComposedDocument, BildwerkError>;

/// Default file stem for a new document: `<prefix>_<unix millis>`.
pub fn default_output_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", prefix, now.timestamp_millis())
}
