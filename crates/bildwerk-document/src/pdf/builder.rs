// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembly on top of `lopdf`.
//
// Each page is one image XObject drawn over a white rectangle. Page objects
// are appended as they are built; the page tree, catalog, and /Info dictionary
// are written once in `finish`.

use bildwerk_core::PageGeometry;
use bildwerk_core::error::{BildwerkError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::image::PageRaster;
use crate::pdf::layout::Placement;

/// Resource name of the page image inside each page's /XObject dictionary.
const IMAGE_NAME: &str = "Im0";

/// An in-progress PDF whose pages all share one fixed canvas.
///
/// Dropping the builder releases everything added so far, which is how the
/// compositor abandons a job on error or cancellation.
pub struct PageDocument {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    page: PageGeometry,
}

impl PageDocument {
    pub fn new(page: PageGeometry) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            page,
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append one page holding `raster`, fit-centred on a white canvas.
    ///
    /// The raster is consumed; its pixels are compressed into the document and
    /// the decoded buffer is freed before this returns.
    pub fn add_page(&mut self, raster: PageRaster) -> Result<Placement> {
        let placement = Placement::fit_center(raster.width(), raster.height(), self.page)
            .ok_or_else(|| BildwerkError::PdfError("cannot place an empty raster".into()))?;

        let image_id = self.document.add_object(raster.into_image_stream()?);

        let content = page_content(&placement, self.page);
        let encoded = content.encode().map_err(|err| {
            BildwerkError::PdfError(format!("failed to encode page content: {err}"))
        })?;
        let content_id = self.document.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(self.page),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        self.kids.push(Object::Reference(page_id));

        debug!(
            page = self.kids.len(),
            scale = placement.scale,
            left = placement.left,
            top = placement.top,
            width = placement.width,
            height = placement.height,
            "Page added"
        );
        Ok(placement)
    }

    /// Write the page tree, catalog, and metadata, and serialise the document.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>> {
        let page_count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => std::mem::take(&mut self.kids),
            "Count" => page_count,
            "MediaBox" => media_box(self.page),
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("Bildwerk"),
        });
        self.document.trailer.set("Info", info_id);

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            BildwerkError::PdfError(format!("failed to serialise document: {err}"))
        })?;

        debug!(pages = page_count, output_bytes = output.len(), "Document serialised");
        Ok(output)
    }
}

fn media_box(page: PageGeometry) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(page.width),
        Object::Real(page.height),
    ]
}

/// Content stream: fill the page white, then paint the image into its rect.
///
/// PDF user space has its origin at the bottom-left, so the placement's
/// top-based offset is converted with `Placement::pdf_y`.
fn page_content(placement: &Placement, page: PageGeometry) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Integer(1)]),
            Operation::new(
                "re",
                vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width),
                    Object::Real(page.height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(placement.width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(placement.height),
                    Object::Real(placement.left),
                    Object::Real(placement.pdf_y(page)),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
}
