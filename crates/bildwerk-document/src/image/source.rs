// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image sources — resolve an opaque locator to a decoded image.
//
// The compositor only ever talks to the `ImageSource` trait, so the same
// composition code runs against files on disk, content handed over by a
// platform media picker, or in-memory fixtures in tests.

use std::collections::HashMap;
use std::fmt::Display;

use ::image::{DynamicImage, ImageReader};
use bildwerk_core::Locator;
use bildwerk_core::error::{BildwerkError, Result};
use tracing::{debug, instrument};

/// Resolves locators to decoded images.
///
/// Implementations must be shareable across the blocking pool. Every failure
/// to produce pixels is reported as `BildwerkError::AssetDecode`, which the
/// compositor treats as recoverable.
pub trait ImageSource: Send + Sync {
    /// Resolve and decode the image behind `locator`.
    fn decode(&self, locator: &Locator) -> Result<DynamicImage>;
}

/// Reads images from the local filesystem.
///
/// Accepts plain paths and `file://` URIs. The format is sniffed from the
/// file contents, so a mislabelled extension still decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    #[instrument(skip(self), fields(locator = %locator))]
    fn decode(&self, locator: &Locator) -> Result<DynamicImage> {
        let path = locator.to_path();
        let image = ImageReader::open(&path)
            .map_err(|err| decode_error(locator, err))?
            .with_guessed_format()
            .map_err(|err| decode_error(locator, err))?
            .decode()
            .map_err(|err| decode_error(locator, err))?;
        ensure_pixels(locator, image)
    }
}

/// Serves encoded images held in memory, keyed by locator.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<Locator, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes (PNG, JPEG, ...) under `locator`.
    pub fn insert(&mut self, locator: Locator, encoded: Vec<u8>) {
        self.images.insert(locator, encoded);
    }

    /// Builder-style variant of [`MemoryImageSource::insert`].
    pub fn with(mut self, locator: impl Into<Locator>, encoded: Vec<u8>) -> Self {
        self.insert(locator.into(), encoded);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn decode(&self, locator: &Locator) -> Result<DynamicImage> {
        let encoded = self
            .images
            .get(locator)
            .ok_or_else(|| decode_error(locator, "no image registered for locator"))?;
        let image =
            ::image::load_from_memory(encoded).map_err(|err| decode_error(locator, err))?;
        ensure_pixels(locator, image)
    }
}

/// Reject images without pixels; they cannot be scaled onto a page.
fn ensure_pixels(locator: &Locator, image: DynamicImage) -> Result<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(decode_error(locator, "image has no pixels"));
    }
    debug!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Image decoded"
    );
    Ok(image)
}

fn decode_error(locator: &Locator, reason: impl Display) -> BildwerkError {
    BildwerkError::AssetDecode {
        locator: locator.to_string(),
        reason: reason.to_string(),
    }
}
