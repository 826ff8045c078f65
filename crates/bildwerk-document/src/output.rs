// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output — file naming, integrity hashing, and crash-safe writes.
//
// Documents are written to a uniquely-named temporary file in the target
// directory and renamed over the final path only once fully flushed. Until
// the rename the temporary file deletes itself on drop, so an error or a
// cancellation never leaves a partial PDF at the target path.

use std::io::Write;
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Extension appended to every document.
pub const PDF_EXTENSION: &str = "pdf";

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Turn a caller-supplied name hint into a safe file stem.
///
/// Path separators and control characters become `_`, surrounding whitespace
/// is trimmed, and a trailing `.pdf` is dropped so it is not doubled. Returns
/// `None` when nothing usable is left.
pub fn sanitize_file_stem(hint: &str) -> Option<String> {
    let trimmed = hint.trim();
    let without_ext = match trimmed.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(PDF_EXTENSION) => stem,
        _ => trimmed,
    };
    let stem: String = without_ext
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_start_matches('.').to_string();
    if stem.is_empty() { None } else { Some(stem) }
}

/// Final location of a document named `hint` inside `dir`.
pub fn output_path(dir: &Path, hint: &str) -> Result<PathBuf> {
    let stem = sanitize_file_stem(hint).ok_or_else(|| BildwerkError::StorageWrite {
        path: dir.join(hint),
        reason: "output name is empty or invalid".into(),
    })?;
    Ok(dir.join(format!("{stem}.{PDF_EXTENSION}")))
}

/// Write `data` to `target` via temp file + rename.
///
/// `cancel` is checked after the data is flushed and before the rename; a
/// cancelled write removes the temporary file and leaves `target` untouched.
/// Returns the number of bytes written.
#[instrument(skip(data, cancel), fields(path = %target.display(), bytes = data.len()))]
pub fn write_atomically(target: &Path, data: &[u8], cancel: &CancellationToken) -> Result<u64> {
    let storage_error = |reason: String| BildwerkError::StorageWrite {
        path: target.to_path_buf(),
        reason,
    };

    let parent = target
        .parent()
        .ok_or_else(|| storage_error("target has no parent directory".into()))?;
    std::fs::create_dir_all(parent)
        .map_err(|err| storage_error(format!("cannot create {}: {err}", parent.display())))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".bildwerk-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|err| storage_error(format!("cannot create temporary file: {err}")))?;

    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| storage_error(err.to_string()))?;
    debug!(tmp = %tmp.path().display(), "Temporary document flushed");

    if cancel.is_cancelled() {
        return Err(BildwerkError::Cancelled);
    }

    tmp.persist(target)
        .map_err(|err| storage_error(format!("atomic rename failed: {}", err.error)))?;

    info!("Wrote PDF to {}", target.display());
    Ok(data.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn leftovers(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .collect()
    }

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn sanitize_strips_separators_and_extension() {
        assert_eq!(sanitize_file_stem("holiday").as_deref(), Some("holiday"));
        assert_eq!(sanitize_file_stem("  report.PDF ").as_deref(), Some("report"));
        assert_eq!(sanitize_file_stem("../etc/passwd").as_deref(), Some("_etc_passwd"));
        assert_eq!(sanitize_file_stem("a\\b:c").as_deref(), Some("a_b_c"));
        assert_eq!(sanitize_file_stem("photos.2024").as_deref(), Some("photos.2024"));
    }

    #[test]
    fn sanitize_rejects_blank_names() {
        assert!(sanitize_file_stem("").is_none());
        assert!(sanitize_file_stem("   ").is_none());
        assert!(sanitize_file_stem(".pdf").is_none());
        assert!(sanitize_file_stem("..").is_none());
    }

    #[test]
    fn output_path_appends_extension() {
        let path = output_path(Path::new("/docs"), "doc").unwrap();
        assert_eq!(path, PathBuf::from("/docs/doc.pdf"));
        assert!(matches!(
            output_path(Path::new("/docs"), " "),
            Err(BildwerkError::StorageWrite { .. })
        ));
    }

    #[test]
    fn atomic_write_leaves_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");

        let written = write_atomically(&target, b"%PDF-1.5", &CancellationToken::new()).unwrap();
        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.5");
        assert_eq!(leftovers(dir.path()), vec![target]);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"old").unwrap();

        write_atomically(&target, b"new", &CancellationToken::new()).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn cancelled_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = write_atomically(&target, b"%PDF-1.5", &cancel).unwrap_err();
        assert!(matches!(err, BildwerkError::Cancelled));
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn unwritable_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write_atomically(&blocker.join("out.pdf"), b"%PDF", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BildwerkError::StorageWrite { .. }));
    }
}
