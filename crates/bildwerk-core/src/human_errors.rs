// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the UI presents the message.

use crate::error::BildwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something went wrong but trying again may work.
    Transient,
    /// User must do something first (pick images, free storage space).
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
    /// Not a failure; the result is usable but incomplete.
    Warning,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action might succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `BildwerkError` into a `HumanError` suitable for display.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    match err {
        BildwerkError::EmptySelection => HumanError {
            message: "No images selected.".into(),
            suggestion: "Tap the images you want in the PDF, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BildwerkError::StoreClosed | BildwerkError::Task(_) => HumanError {
            message: "Something stopped working in the background.".into(),
            suggestion: "Close and reopen the app, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BildwerkError::Catalog(detail) => HumanError {
            message: "We can't read your photos.".into(),
            suggestion: format!(
                "Make sure the app is allowed to access your pictures, then reload. ({detail})"
            ),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        BildwerkError::AssetDecode { .. } => HumanError {
            message: "One of the images couldn't be opened.".into(),
            suggestion: "The image may be damaged or in an unusual format. It was left out of the PDF.".into(),
            retriable: false,
            severity: Severity::Warning,
        },

        BildwerkError::NothingDecoded { skipped } => HumanError {
            message: "None of the selected images could be opened.".into(),
            suggestion: format!(
                "All {skipped} images appear to be damaged or unsupported. Try choosing JPEG or PNG images."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        BildwerkError::PdfError(_) => HumanError {
            message: "The PDF couldn't be put together.".into(),
            suggestion: "Try again with fewer images.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BildwerkError::StorageWrite { reason, .. } => humanize_write_error(reason),

        BildwerkError::Cancelled => HumanError {
            message: "PDF creation was stopped.".into(),
            suggestion: "Nothing was saved. Start again when you're ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BildwerkError::Io(io_err) => humanize_write_error(&io_err.to_string()),

        BildwerkError::Serialization(_) => HumanError {
            message: "Your settings couldn't be read.".into(),
            suggestion: "The settings file may be damaged. Default settings will be used.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Warning for a document that was written but left out some images.
///
/// Returns `None` when nothing was skipped.
pub fn humanize_skipped(skipped: usize, requested: usize) -> Option<HumanError> {
    if skipped == 0 {
        return None;
    }
    let included = requested.saturating_sub(skipped);
    Some(HumanError {
        message: format!("Your PDF has {included} of {requested} pages."),
        suggestion: format!(
            "{skipped} image(s) couldn't be opened and were left out. They may be damaged or in an unusual format."
        ),
        retriable: false,
        severity: Severity::Warning,
    })
}

/// Storage failures: distinguish a full disk from permission problems.
fn humanize_write_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("no space") || lower.contains("quota") || lower.contains("storage full") {
        HumanError {
            message: "Your device is out of storage space.".into(),
            suggestion: "Delete some files you no longer need, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("permission denied") || lower.contains("read-only") {
        HumanError {
            message: "The PDF couldn't be saved here.".into(),
            suggestion: "The app isn't allowed to save to this folder. Choose a different folder in Settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The PDF couldn't be saved.".into(),
            suggestion: format!("Try again. If this keeps happening, restart the app. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
