// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — resolving locators to decoded images and preparing page rasters.

pub mod raster;
pub mod source;

pub use raster::PageRaster;
pub use source::{FsImageSource, ImageSource, MemoryImageSource};
