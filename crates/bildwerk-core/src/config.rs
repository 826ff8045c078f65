// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory that receives finished PDFs. `None` means the `documents`
    /// subdirectory of the data directory.
    pub output_dir: Option<PathBuf>,
    /// Prefix of generated file names (`<prefix>_<millis>.pdf`).
    pub file_name_prefix: String,
    /// Label of the synthetic folder that aggregates every image.
    pub all_folder_label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_name_prefix: "PDF".into(),
            all_folder_label: "All Images".into(),
        }
    }
}
