// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF compositor — ordered image locators in, one A4 page per image out.
//
// Pages are built strictly one at a time: decode, place, compress, release.
// Peak memory therefore holds a single decoded image regardless of how many
// images were selected. Undecodable inputs are skipped and reported on the
// result; only the final write can fail the job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bildwerk_core::error::BildwerkError;
use bildwerk_core::{ComposedDocument, CompositionRequest, CompositionResult, PageGeometry, SkippedPage};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::image::{FsImageSource, ImageSource, PageRaster};
use crate::output::{hash_bytes, output_path, write_atomically};
use crate::pdf::builder::PageDocument;

/// Renders composition requests into PDF files inside one output directory.
///
/// Cheap to clone; clones share the image source.
#[derive(Clone)]
pub struct PdfCompositor {
    /// Directory receiving finished documents.
    output_dir: PathBuf,
    /// Resolves locators to decoded images.
    source: Arc<dyn ImageSource>,
    /// Canvas of every page.
    page: PageGeometry,
}

impl std::fmt::Debug for PdfCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfCompositor")
            .field("output_dir", &self.output_dir)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl PdfCompositor {
    /// Compositor reading images from the local filesystem.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_source(output_dir, Arc::new(FsImageSource))
    }

    /// Compositor reading images through a custom source.
    pub fn with_source(output_dir: impl Into<PathBuf>, source: Arc<dyn ImageSource>) -> Self {
        Self {
            output_dir: output_dir.into(),
            source,
            page: PageGeometry::A4,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `request` to `<output_dir>/<output_name>.pdf`.
    pub fn compose(&self, request: &CompositionRequest) -> CompositionResult {
        self.compose_cancellable(request, &CancellationToken::new())
    }

    /// Render `request`, giving up as soon as `cancel` fires.
    ///
    /// Cancellation is observed before every page and before the final
    /// rename. A cancelled or failed job releases its document and leaves no
    /// file at the target path.
    #[instrument(
        skip_all,
        fields(job_id = %request.job_id, inputs = request.ordered_locators.len())
    )]
    pub fn compose_cancellable(
        &self,
        request: &CompositionRequest,
        cancel: &CancellationToken,
    ) -> CompositionResult {
        if request.ordered_locators.is_empty() {
            return Err(BildwerkError::EmptySelection);
        }
        let target = output_path(&self.output_dir, &request.output_name)?;

        info!(target = %target.display(), "Composing PDF");

        let mut document = PageDocument::new(self.page);
        let mut skipped: Vec<SkippedPage> = Vec::new();

        for (index, locator) in request.ordered_locators.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(completed = document.page_count(), "Composition cancelled");
                return Err(BildwerkError::Cancelled);
            }

            let image = match self.source.decode(locator) {
                Ok(image) => image,
                Err(err) => {
                    warn!(position = index + 1, locator = %locator, error = %err, "Skipping undecodable image");
                    skipped.push(SkippedPage {
                        position: index + 1,
                        locator: locator.clone(),
                        reason: skip_reason(err),
                    });
                    continue;
                }
            };

            // The raster is moved into the page and freed there.
            document.add_page(PageRaster::from_dynamic(image))?;
        }

        let page_count = document.page_count();
        if page_count == 0 {
            warn!(skipped = skipped.len(), "No image could be decoded");
            return Err(BildwerkError::NothingDecoded {
                skipped: skipped.len(),
            });
        }

        let bytes = document.finish(&request.output_name)?;
        let sha256 = hash_bytes(&bytes);
        let size_bytes = write_atomically(&target, &bytes, cancel)?;

        info!(
            pages = page_count,
            skipped = skipped.len(),
            size_bytes,
            path = %target.display(),
            "PDF composed"
        );

        Ok(ComposedDocument {
            job_id: request.job_id,
            path: target,
            page_count,
            skipped,
            sha256,
            size_bytes,
            created_at: Utc::now(),
        })
    }
}

fn skip_reason(err: BildwerkError) -> String {
    match err {
        BildwerkError::AssetDecode { reason, .. } => reason,
        other => other.to_string(),
    }
}
