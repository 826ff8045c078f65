// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection store — a single-writer actor over `SelectionSnapshot`.
//
// Mutations travel over an mpsc channel and are applied one at a time by the
// actor task, so concurrent toggles are serialized and never lose an update.
// Each accepted mutation publishes a fresh snapshot on a watch channel;
// readers always see a complete, consistent state.

use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{Asset, AssetId, DisplayAsset, Folder, FolderId};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::snapshot::{DEFAULT_ALL_LABEL, SelectionSnapshot, ToggleOutcome};

/// Pending mutations the actor will buffer before callers wait.
const COMMAND_BUFFER: usize = 64;

enum Command {
    Ingest {
        assets: Vec<Asset>,
        reply: oneshot::Sender<u64>,
    },
    Toggle {
        id: AssetId,
        reply: oneshot::Sender<ToggleOutcome>,
    },
}

/// Handle to the selection actor. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<SelectionSnapshot>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Ingest { assets, .. } => write!(f, "Ingest({} assets)", assets.len()),
            Command::Toggle { id, .. } => write!(f, "Toggle({id})"),
        }
    }
}

impl SelectionStore {
    /// Start the actor on the current tokio runtime.
    pub fn spawn() -> Result<Self> {
        Self::spawn_with_label(DEFAULT_ALL_LABEL)
    }

    /// Start the actor, naming the synthetic folder `all_label`.
    ///
    /// Fails with `BildwerkError::Task` when called outside a tokio runtime.
    pub fn spawn_with_label(all_label: &str) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|err| BildwerkError::Task(format!("selection store needs a tokio runtime: {err}")))?;
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, snapshots) =
            watch::channel(Arc::new(SelectionSnapshot::with_label(all_label)));
        runtime.spawn(run(inbox, publisher));
        Ok(Self {
            commands,
            snapshots,
        })
    }

    /// Replace the canonical asset list. The selection is kept.
    ///
    /// Returns the revision of the published snapshot.
    pub async fn ingest(&self, assets: Vec<Asset>) -> Result<u64> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::Ingest { assets, reply }).await?;
        answer.await.map_err(|_| BildwerkError::StoreClosed)
    }

    /// Select `id` if unselected, deselect it if selected.
    pub async fn toggle_selection(&self, id: &AssetId) -> Result<ToggleOutcome> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::Toggle {
            id: id.clone(),
            reply,
        })
        .await?;
        answer.await.map_err(|_| BildwerkError::StoreClosed)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<SelectionSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SelectionSnapshot>> {
        self.snapshots.clone()
    }

    pub fn filter_by_folder(&self, folder: &FolderId) -> Vec<DisplayAsset> {
        self.snapshot().filter_by_folder(folder)
    }

    pub fn current_selection(&self) -> Vec<DisplayAsset> {
        self.snapshot().current_selection()
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.snapshot().folders().to_vec()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| BildwerkError::StoreClosed)
    }
}

/// Actor loop. Ends when every store handle has been dropped.
async fn run(mut inbox: mpsc::Receiver<Command>, publisher: watch::Sender<Arc<SelectionSnapshot>>) {
    debug!("Selection store started");
    while let Some(command) = inbox.recv().await {
        let current = Arc::clone(&publisher.borrow());
        match command {
            Command::Ingest { assets, reply } => {
                let next = current.ingested(assets);
                let revision = next.revision();
                info!(
                    assets = next.assets().len(),
                    folders = next.folders().len(),
                    selected = next.selection_count(),
                    revision,
                    "Catalog ingested"
                );
                publisher.send_replace(Arc::new(next));
                let _ = reply.send(revision);
            }
            Command::Toggle { id, reply } => {
                let (next, outcome) = current.toggled(&id);
                if outcome == ToggleOutcome::UnknownAsset {
                    debug!(asset = %id, "Toggle ignored for unknown asset");
                } else {
                    debug!(asset = %id, ?outcome, selected = next.selection_count(), "Selection toggled");
                    publisher.send_replace(Arc::new(next));
                }
                let _ = reply.send(outcome);
            }
        }
    }
    debug!("Selection store stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::Locator;

    fn asset(id: &str, container: &str) -> Asset {
        Asset::new(id, Locator::new(format!("/img/{id}.jpg")), id, container)
    }

    fn catalog(n: usize) -> Vec<Asset> {
        (0..n)
            .map(|i| asset(&format!("a{i}"), if i % 2 == 0 { "Even" } else { "Odd" }))
            .collect()
    }

    #[test]
    fn spawning_without_a_runtime_is_an_error() {
        let err = SelectionStore::spawn().unwrap_err();
        assert!(matches!(err, BildwerkError::Task(_)));
    }

    #[tokio::test]
    async fn ingest_publishes_folders_and_assets() {
        let store = SelectionStore::spawn().unwrap();
        let revision = store.ingest(catalog(5)).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.revision(), revision);
        assert_eq!(snapshot.assets().len(), 5);
        let folders = store.folders();
        assert_eq!(folders[0].id, FolderId::All);
        assert_eq!(folders[0].count, 5);
        assert_eq!(store.filter_by_folder(&FolderId::container("Odd")).len(), 2);
    }

    #[tokio::test]
    async fn toggles_are_visible_to_every_handle() {
        let store = SelectionStore::spawn().unwrap();
        store.ingest(catalog(3)).await.unwrap();
        let other = store.clone();

        let outcome = store.toggle_selection(&AssetId::from("a2")).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Selected { index: 1 });

        let selection = other.current_selection();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].asset.id, AssetId::from("a2"));
        assert_eq!(selection[0].selection_index, Some(1));
    }

    #[tokio::test]
    async fn unknown_toggle_does_not_publish() {
        let store = SelectionStore::spawn().unwrap();
        store.ingest(catalog(2)).await.unwrap();
        let before = store.snapshot().revision();

        let outcome = store.toggle_selection(&AssetId::from("ghost")).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::UnknownAsset);
        assert_eq!(store.snapshot().revision(), before);
    }

    #[tokio::test]
    async fn subscribers_are_notified() {
        let store = SelectionStore::spawn().unwrap();
        let mut updates = store.subscribe();
        store.ingest(catalog(1)).await.unwrap();

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().assets().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_keep_indices_dense() {
        let store = SelectionStore::spawn().unwrap();
        store.ingest(catalog(40)).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..40 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .toggle_selection(&AssetId::new(format!("a{i}")))
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            assert!(matches!(task.await.unwrap(), ToggleOutcome::Selected { .. }));
        }

        // Deselect every third asset concurrently.
        let mut tasks = Vec::new();
        for i in (0..40).step_by(3) {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .toggle_selection(&AssetId::new(format!("a{i}")))
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            assert!(matches!(task.await.unwrap(), ToggleOutcome::Deselected { .. }));
        }

        let selection = store.current_selection();
        assert_eq!(selection.len(), 40 - 14);
        let indices: Vec<usize> = selection.iter().filter_map(|d| d.selection_index).collect();
        assert_eq!(indices, (1..=26).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn reingest_preserves_selection() {
        let store = SelectionStore::spawn().unwrap();
        store.ingest(catalog(4)).await.unwrap();
        store.toggle_selection(&AssetId::from("a3")).await.unwrap();
        store.toggle_selection(&AssetId::from("a0")).await.unwrap();

        store.ingest(catalog(4)).await.unwrap();
        let ids: Vec<String> = store
            .current_selection()
            .into_iter()
            .map(|d| d.asset.id.0)
            .collect();
        assert_eq!(ids, vec!["a3", "a0"]);
    }
}
