// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Turns an ordered list of image locators into a PDF.
//
// Provides image sources (filesystem and in-memory), per-page raster handling
// that flattens transparency onto white and compresses pixels as soon as a page
// is built, fit-centre placement on a fixed A4 canvas, and crash-safe output.

pub mod image;
pub mod output;
pub mod pdf;

// Re-export the primary structs so callers can use `bildwerk_document::PdfCompositor` etc.
pub use crate::image::source::{FsImageSource, ImageSource, MemoryImageSource};
pub use crate::pdf::compositor::PdfCompositor;
pub use crate::pdf::layout::Placement;

// Cancellation handle accepted by the compositor.
pub use tokio_util::sync::CancellationToken;
