// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder aggregates derived from the canonical asset list.

use std::collections::HashMap;

use bildwerk_core::{Asset, Folder, FolderId};

/// Group `assets` by container name.
///
/// The synthetic `ALL` folder (labelled `all_label`) comes first and only
/// exists when there is at least one asset. Container folders follow in order
/// of first appearance; each uses its first listed asset as representative.
pub fn derive_folders(assets: &[Asset], all_label: &str) -> Vec<Folder> {
    let Some(first) = assets.first() else {
        return Vec::new();
    };

    let mut folders = vec![Folder {
        id: FolderId::All,
        name: all_label.to_string(),
        representative: first.locator.clone(),
        count: assets.len(),
    }];

    let mut slots: HashMap<&str, usize> = HashMap::new();
    for asset in assets {
        match slots.get(asset.container_name.as_str()) {
            Some(&slot) => folders[slot].count += 1,
            None => {
                slots.insert(&asset.container_name, folders.len());
                folders.push(Folder {
                    id: FolderId::container(asset.container_name.clone()),
                    name: asset.container_name.clone(),
                    representative: asset.locator.clone(),
                    count: 1,
                });
            }
        }
    }

    folders
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::Locator;

    fn asset(id: &str, container: &str) -> Asset {
        Asset::new(id, Locator::new(format!("/img/{id}.jpg")), id, container)
    }

    #[test]
    fn no_assets_means_no_folders() {
        assert!(derive_folders(&[], "All Images").is_empty());
    }

    #[test]
    fn all_folder_first_then_containers_in_listing_order() {
        let assets = vec![
            asset("1", "Camera"),
            asset("2", "Downloads"),
            asset("3", "Camera"),
            asset("4", "ALL"),
        ];
        let folders = derive_folders(&assets, "All Images");

        let summary: Vec<(FolderId, usize)> =
            folders.iter().map(|f| (f.id.clone(), f.count)).collect();
        assert_eq!(
            summary,
            vec![
                (FolderId::All, 4),
                (FolderId::container("Camera"), 2),
                (FolderId::container("Downloads"), 1),
                (FolderId::container("ALL"), 1),
            ]
        );
        assert_eq!(folders[0].name, "All Images");
        assert_eq!(folders[0].representative, Locator::from("/img/1.jpg"));
        assert_eq!(folders[1].representative, Locator::from("/img/1.jpg"));
        assert_eq!(folders[2].representative, Locator::from("/img/2.jpg"));
    }
}
