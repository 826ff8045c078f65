// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-selection — Which images the user picked, and in what order.
//
// The asset catalog is consumed through a trait. Every selection state is an
// immutable `SelectionSnapshot`; the `SelectionStore` actor is the only writer
// and publishes each new snapshot atomically to any number of readers.

pub mod catalog;
pub mod folders;
pub mod snapshot;
pub mod store;

pub use catalog::{AssetCatalog, DirectoryCatalog, MemoryCatalog};
pub use snapshot::{SelectionSnapshot, ToggleOutcome};
pub use store::SelectionStore;
