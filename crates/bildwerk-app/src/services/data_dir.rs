// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

use bildwerk_core::error::Result;

/// Explicit override for the data directory.
pub const DATA_DIR_ENV: &str = "BILDWERK_DATA_DIR";
/// Subdirectory receiving finished PDFs unless the config overrides it.
pub const DOCUMENTS_SUBDIR: &str = "documents";

/// Return the application data directory, creating it if needed.
///
/// On desktop this uses a conventional location. On mobile the platform
/// bridge should set `BILDWERK_DATA_DIR` to the app's documents directory.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve(|key| std::env::var(key).ok());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Return a subdirectory inside `base`, creating it if needed.
pub fn data_subdir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Pick the data directory from environment lookups.
fn resolve(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());

    if let Some(dir) = non_empty(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    // Try XDG data dir, then fallback to home
    let base = if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = non_empty("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        // Last resort
        std::env::temp_dir()
    };
    base.join("bildwerk")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn explicit_override_wins() {
        let dir = resolve(lookup(&[
            (DATA_DIR_ENV, "/data/app"),
            ("XDG_DATA_HOME", "/xdg"),
            ("HOME", "/home/u"),
        ]));
        assert_eq!(dir, PathBuf::from("/data/app"));
    }

    #[test]
    fn xdg_then_home_then_temp() {
        assert_eq!(
            resolve(lookup(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/u")])),
            PathBuf::from("/xdg/bildwerk")
        );
        assert_eq!(
            resolve(lookup(&[("HOME", "/home/u"), (DATA_DIR_ENV, "  ")])),
            PathBuf::from("/home/u/.local/share/bildwerk")
        );
        assert_eq!(resolve(lookup(&[])), std::env::temp_dir().join("bildwerk"));
    }

    #[test]
    fn subdir_is_created() {
        let base = tempfile::tempdir().unwrap();
        let docs = data_subdir(base.path(), DOCUMENTS_SUBDIR).unwrap();
        assert!(docs.is_dir());
        assert_eq!(docs, base.path().join("documents"));
    }
}
