// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasters — the decoded pixels of exactly one page.
//
// A `PageRaster` is the only place uncompressed pixels live. It is consumed by
// `into_image_stream`, which deflates the pixels into a PDF image XObject and
// frees the buffer before the next image is decoded.

use std::io::Write;

use ::image::{DynamicImage, RgbImage};
use bildwerk_core::error::{BildwerkError, Result};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Stream, dictionary};
use tracing::debug;

/// Opaque RGB pixels of one page, already composited onto white.
pub struct PageRaster {
    pixels: RgbImage,
}

impl PageRaster {
    /// Take ownership of a decoded image.
    ///
    /// Images with an alpha channel are flattened onto a white background so
    /// transparent regions print as paper, not black.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let pixels = if image.color().has_alpha() {
            flatten_onto_white(image)
        } else {
            image.into_rgb8()
        };
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Deflate the pixels into an image XObject, releasing the raster.
    pub fn into_image_stream(self) -> Result<Stream> {
        let (width, height) = self.pixels.dimensions();
        let raw = self.pixels.into_raw();
        let raw_len = raw.len();

        let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw_len / 4), Compression::default());
        encoder
            .write_all(&raw)
            .map_err(|err| BildwerkError::PdfError(format!("failed to compress page image: {err}")))?;
        drop(raw);
        let compressed = encoder
            .finish()
            .map_err(|err| BildwerkError::PdfError(format!("failed to compress page image: {err}")))?;

        debug!(
            width,
            height,
            raw_len,
            compressed_len = compressed.len(),
            "Page raster released"
        );

        Ok(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        ))
    }
}

/// Alpha-composite every pixel over opaque white.
fn flatten_onto_white(image: DynamicImage) -> RgbImage {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = u16::from(src[3]);
        for channel in 0..3 {
            let value = u16::from(src[channel]);
            dst[channel] = ((value * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
    }
    out
}
