// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF job controller — turns a selection into a composition job.
//
// The controller guards against empty selections, picks the output name, and
// runs the compositor on the blocking pool so callers on the async side only
// ever await a future. Each job gets its own cancellation token; dropping the
// job handle cancels it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{CompositionRequest, CompositionResult, DisplayAsset, JobId, default_output_name};
use bildwerk_document::{CancellationToken, PdfCompositor};
use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::DropGuard;
use tracing::{info, instrument};

/// Starts composition jobs. Cheap to clone; clones share the in-flight count.
#[derive(Debug, Clone)]
pub struct PdfJobController {
    compositor: PdfCompositor,
    file_name_prefix: Arc<str>,
    in_flight: Arc<AtomicUsize>,
}

impl PdfJobController {
    /// Controller naming unnamed documents `<file_name_prefix>_<millis>`.
    pub fn new(compositor: PdfCompositor, file_name_prefix: &str) -> Self {
        Self {
            compositor,
            file_name_prefix: Arc::from(file_name_prefix),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn compositor(&self) -> &PdfCompositor {
        &self.compositor
    }

    /// Whether any job started by this controller (or a clone) is running.
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Compose `selection` and wait for the result.
    ///
    /// The compositor's result is returned unchanged, skipped pages included.
    pub async fn run(&self, selection: &[DisplayAsset], output_name_hint: Option<&str>) -> CompositionResult {
        self.start(selection, output_name_hint)?.wait().await
    }

    /// Start composing `selection` in the background.
    ///
    /// Locators are taken in the order given. An empty selection is rejected
    /// before anything is spawned. A missing or blank name hint becomes the
    /// default `<prefix>_<millis>` name. Outside a tokio runtime this fails
    /// with `BildwerkError::Task` and nothing is started.
    #[instrument(skip_all, fields(images = selection.len()))]
    pub fn start(&self, selection: &[DisplayAsset], output_name_hint: Option<&str>) -> Result<CompositionJob> {
        if selection.is_empty() {
            return Err(BildwerkError::EmptySelection);
        }
        let runtime = Handle::try_current()
            .map_err(|err| BildwerkError::Task(format!("composition needs a tokio runtime: {err}")))?;

        let locators = selection
            .iter()
            .map(|item| item.asset.locator.clone())
            .collect();
        let output_name = match output_name_hint.map(str::trim) {
            Some(hint) if !hint.is_empty() => hint.to_string(),
            _ => default_output_name(&self.file_name_prefix, Utc::now()),
        };
        let request = CompositionRequest::new(locators, output_name);
        let id = request.job_id;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let compositor = self.compositor.clone();
        let busy = InFlight::enter(&self.in_flight);

        info!(job_id = %id, name = %request.output_name, "Starting composition job");
        let task = runtime.spawn_blocking(move || {
            let _busy = busy;
            compositor.compose_cancellable(&request, &token)
        });

        Ok(CompositionJob {
            id,
            cancel: cancel.clone(),
            _cancel_on_drop: cancel.drop_guard(),
            task,
        })
    }
}

/// Handle to one running composition.
///
/// Dropping the handle cancels the job; a cancelled job leaves no file behind.
#[derive(Debug)]
pub struct CompositionJob {
    id: JobId,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    task: JoinHandle<CompositionResult>,
}

impl CompositionJob {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Ask the job to stop at its next page boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the job and return its result.
    pub async fn wait(self) -> CompositionResult {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(BildwerkError::Task(err.to_string())),
        }
    }
}

/// Counts a job as in flight until dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
