// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection snapshot — one immutable, self-consistent selection state.
//
// A snapshot holds the canonical asset list, the folders derived from it, and
// the ordered selection. Every view (all assets, one folder, selected only) is
// computed from those on read, so the views can never disagree. Mutations
// return a new snapshot and leave the old one untouched.

use std::collections::HashMap;
use std::sync::Arc;

use bildwerk_core::{Asset, AssetId, DisplayAsset, Folder, FolderId, SelectionEntry};

use crate::folders::derive_folders;

/// Label of the synthetic folder when none is configured.
pub const DEFAULT_ALL_LABEL: &str = "All Images";

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The asset was appended to the selection at this 1-based index.
    Selected { index: usize },
    /// The asset was removed; later entries moved up by one.
    Deselected { previous_index: usize },
    /// The id is neither selected nor in the catalog. Nothing changed.
    UnknownAsset,
}

/// An immutable selection state.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    /// Incremented on every published change.
    revision: u64,
    /// Canonical asset list, newest first, exactly as ingested.
    assets: Arc<[Asset]>,
    /// Position of each asset id in `assets`.
    positions: Arc<HashMap<AssetId, usize>>,
    folders: Arc<[Folder]>,
    /// Selected assets in selection order; position + 1 is the index.
    ///
    /// Entries keep their own copy of the asset so the selection survives a
    /// re-ingest that no longer lists it. Views read the canonical record
    /// whenever the id is still listed.
    selected: Vec<Asset>,
    all_label: Arc<str>,
}

impl Default for SelectionSnapshot {
    fn default() -> Self {
        Self::with_label(DEFAULT_ALL_LABEL)
    }
}

impl SelectionSnapshot {
    /// Empty state whose `ALL` folder will be called `all_label`.
    pub fn with_label(all_label: &str) -> Self {
        Self {
            revision: 0,
            assets: Arc::from(Vec::new()),
            positions: Arc::new(HashMap::new()),
            folders: Arc::from(Vec::new()),
            selected: Vec::new(),
            all_label: Arc::from(all_label),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The canonical asset list.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// 1-based selection index of `id`, if selected.
    pub fn selection_index(&self, id: &AssetId) -> Option<usize> {
        self.selected
            .iter()
            .position(|asset| &asset.id == id)
            .map(|pos| pos + 1)
    }

    /// Selection entries, ordered `1..=N`.
    pub fn entries(&self) -> Vec<SelectionEntry> {
        self.selected
            .iter()
            .enumerate()
            .map(|(pos, asset)| SelectionEntry {
                asset_id: asset.id.clone(),
                order: pos + 1,
            })
            .collect()
    }

    /// Replace the canonical list and folders; keep the selection.
    pub fn ingested(&self, assets: Vec<Asset>) -> Self {
        let positions = assets
            .iter()
            .enumerate()
            .map(|(pos, asset)| (asset.id.clone(), pos))
            .collect();
        let folders = derive_folders(&assets, &self.all_label);
        Self {
            revision: self.revision + 1,
            assets: Arc::from(assets),
            positions: Arc::new(positions),
            folders: Arc::from(folders),
            selected: self.selected.clone(),
            all_label: Arc::clone(&self.all_label),
        }
    }

    /// Select or deselect `id`.
    ///
    /// A selected id is removed and everything after it moves up one place,
    /// keeping indices dense and in selection order. An unselected id present
    /// in the catalog is appended at `N + 1`. Any other id is a no-op and the
    /// returned snapshot is an unchanged copy.
    pub fn toggled(&self, id: &AssetId) -> (Self, ToggleOutcome) {
        let mut selected = self.selected.clone();

        let outcome = if let Some(pos) = selected.iter().position(|asset| &asset.id == id) {
            selected.remove(pos);
            ToggleOutcome::Deselected {
                previous_index: pos + 1,
            }
        } else if let Some(&pos) = self.positions.get(id) {
            selected.push(self.assets[pos].clone());
            ToggleOutcome::Selected {
                index: selected.len(),
            }
        } else {
            return (self.clone(), ToggleOutcome::UnknownAsset);
        };

        let next = Self {
            revision: self.revision + 1,
            selected,
            ..self.clone()
        };
        (next, outcome)
    }

    /// Assets of one folder, annotated with selection state.
    ///
    /// `FolderId::All` yields the whole canonical list. A container folder
    /// yields the assets whose `container_name` equals the folder's name. A
    /// folder that does not exist in this snapshot yields nothing.
    pub fn filter_by_folder(&self, folder: &FolderId) -> Vec<DisplayAsset> {
        let Some(folder) = self.folders.iter().find(|f| &f.id == folder) else {
            return Vec::new();
        };
        let order = self.order_by_id();
        self.assets
            .iter()
            .filter(|asset| folder.id == FolderId::All || asset.container_name == folder.name)
            .map(|asset| DisplayAsset {
                asset: asset.clone(),
                selection_index: order.get(&asset.id).copied(),
            })
            .collect()
    }

    /// Selected assets ascending by selection index.
    ///
    /// Each entry carries the canonical record for its id, so locator and
    /// container match what `filter_by_folder` reports. An id that has left
    /// the catalog falls back to the record captured when it was selected.
    pub fn current_selection(&self) -> Vec<DisplayAsset> {
        self.selected
            .iter()
            .enumerate()
            .map(|(pos, retained)| DisplayAsset {
                asset: self.canonical(retained).clone(),
                selection_index: Some(pos + 1),
            })
            .collect()
    }

    fn canonical<'a>(&'a self, retained: &'a Asset) -> &'a Asset {
        self.positions
            .get(&retained.id)
            .map_or(retained, |&pos| &self.assets[pos])
    }

    fn order_by_id(&self) -> HashMap<&AssetId, usize> {
        self.selected
            .iter()
            .enumerate()
            .map(|(pos, asset)| (&asset.id, pos + 1))
            .collect()
    }
}
