// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Selection errors --
    #[error("no images selected")]
    EmptySelection,

    #[error("selection store is no longer running")]
    StoreClosed,

    // -- Catalog errors --
    #[error("asset catalog unavailable: {0}")]
    Catalog(String),

    // -- Document errors --
    /// A single image could not be decoded. Recovered by the compositor,
    /// which skips the page and records it on the result.
    #[error("failed to decode {locator}: {reason}")]
    AssetDecode { locator: String, reason: String },

    #[error("none of the {skipped} selected images could be decoded")]
    NothingDecoded { skipped: usize },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("failed to write {}: {reason}", path.display())]
    StorageWrite { path: PathBuf, reason: String },

    #[error("composition cancelled")]
    Cancelled,

    // -- Runtime --
    #[error("background task failed: {0}")]
    Task(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// Whether the error aborts a composition job (as opposed to a per-page
    /// fault the compositor recovers from).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AssetDecode { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
