// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — pick images from a collection, order them, and compose them into
// an A4 PDF.
//
// This crate is the entry point for a front end: initialise logging, build
// `AppServices` over an asset catalog, and drive it from the UI.

pub mod services;

pub use services::app_services::AppServices;
pub use services::job_controller::{CompositionJob, PdfJobController};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Returns `false` if a subscriber
/// was already installed.
pub fn init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!("Bildwerk starting");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_installs_once() {
        assert!(init_tracing());
        assert!(!init_tracing());
    }
}
