// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fit-centre placement of a raster on a fixed page.

use bildwerk_core::PageGeometry;

/// Where an image lands on the page, in points.
///
/// `left` and `top` are measured from the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Uniformly scale a `source_width` x `source_height` raster so it fits
    /// inside `page`, then centre it.
    ///
    /// `scale = min(page.width / w, page.height / h)`, so the image's larger
    /// relative dimension exactly fills the page and the aspect ratio is kept.
    /// Returns `None` for an empty raster.
    pub fn fit_center(source_width: u32, source_height: u32, page: PageGeometry) -> Option<Self> {
        if source_width == 0 || source_height == 0 {
            return None;
        }
        let (w, h) = (source_width as f32, source_height as f32);
        let scale = (page.width / w).min(page.height / h);
        let width = w * scale;
        let height = h * scale;
        Some(Self {
            scale,
            left: (page.width - width) / 2.0,
            top: (page.height - height) / 2.0,
            width,
            height,
        })
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Lower edge in PDF user space, whose origin is the bottom-left corner.
    pub fn pdf_y(&self, page: PageGeometry) -> f32 {
        page.height - self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageGeometry = PageGeometry::A4;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn landscape_image_fills_width() {
        let p = Placement::fit_center(1190, 595, A4).unwrap();
        assert_close(p.scale, 0.5);
        assert_close(p.width, 595.0);
        assert_close(p.height, 297.5);
        assert_close(p.left, 0.0);
        assert_close(p.top, (842.0 - 297.5) / 2.0);
    }

    #[test]
    fn tall_image_fills_height() {
        let p = Placement::fit_center(100, 1684, A4).unwrap();
        assert_close(p.scale, 0.5);
        assert_close(p.height, 842.0);
        assert_close(p.top, 0.0);
        assert_close(p.left, (595.0 - 50.0) / 2.0);
    }

    #[test]
    fn small_image_is_scaled_up_to_fit() {
        let p = Placement::fit_center(10, 10, A4).unwrap();
        assert_close(p.scale, 59.5);
        assert_close(p.width, 595.0);
        assert_close(p.height, 595.0);
        assert_close(p.top, 123.5);
    }

    #[test]
    fn scale_matches_min_formula_for_many_sizes() {
        for (w, h) in [(1, 1), (640, 480), (480, 640), (4000, 3000), (595, 842), (3, 9000)] {
            let p = Placement::fit_center(w, h, A4).unwrap();
            let expected = (595.0 / w as f32).min(842.0 / h as f32);
            assert_close(p.scale, expected);
            assert_close(p.left, (595.0 - w as f32 * expected) / 2.0);
            assert_close(p.top, (842.0 - h as f32 * expected) / 2.0);
            assert!(p.right() <= 595.0 + 1e-3);
            assert!(p.bottom() <= 842.0 + 1e-3);
        }
    }

    #[test]
    fn centred_rect_is_symmetric_in_pdf_space() {
        let p = Placement::fit_center(640, 480, A4).unwrap();
        assert_close(p.pdf_y(A4), p.top);
    }

    #[test]
    fn empty_raster_has_no_placement() {
        assert!(Placement::fit_center(0, 10, A4).is_none());
        assert!(Placement::fit_center(10, 0, A4).is_none());
    }
}
