//! Listing grouper: enumerate a source bucket and group objects into
//! ordered photo sets and blueprint sets keyed by destination folder.

use std::collections::BTreeMap;

use fotomigra_core::constants::{BLUEPRINTS_SUBPATH, PHOTOS_SUBPATH};
use fotomigra_core::naming;
use fotomigra_storage::{Bucket, StorageResult};

/// Folder groups: destination prefix to public URLs, group members in
/// deterministic order.
pub type FolderGroups = BTreeMap<String, Vec<String>>;

/// Group every photo object by its shared set prefix.
///
/// Entries are sorted by object name before grouping, so within a group the
/// fixed-width two-digit index suffix orders the URLs ascending (01, 02, …)
/// even when the store's listing order is not lexicographic.
pub async fn photo_groups(bucket: &dyn Bucket) -> StorageResult<FolderGroups> {
    let mut entries = bucket.list().await?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut groups = FolderGroups::new();
    for entry in &entries {
        if naming::is_ignorable(&entry.name) || !entry.name.contains(PHOTOS_SUBPATH) {
            continue;
        }
        groups
            .entry(naming::photo_group_key(&entry.name).to_string())
            .or_default()
            .push(bucket.public_url(&entry.name));
    }
    Ok(groups)
}

/// Group every blueprint object by its parent folder.
///
/// Each group is expected to hold exactly two entries: the location plan and
/// the usage plan. Members are sorted by object name so the index 0/1
/// assignment does not depend on the store's listing order; a short group is
/// returned as-is and fails its own upload task downstream.
pub async fn blueprint_groups(bucket: &dyn Bucket) -> StorageResult<FolderGroups> {
    let mut entries = bucket.list().await?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut groups = FolderGroups::new();
    for entry in &entries {
        if naming::is_ignorable(&entry.name) || !entry.name.contains(BLUEPRINTS_SUBPATH) {
            continue;
        }
        groups
            .entry(naming::blueprint_group_key(&entry.name).to_string())
            .or_default()
            .push(bucket.public_url(&entry.name));
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotomigra_core::naming::public_url;
    use fotomigra_storage::MemoryBucket;

    fn seeded_bucket(names: &[&str]) -> MemoryBucket {
        let bucket = MemoryBucket::new("src-bucket");
        for name in names {
            bucket.insert(*name, &b"img"[..]);
        }
        bucket
    }

    #[tokio::test]
    async fn groups_photos_and_skips_ignorable_entries() {
        let bucket = seeded_bucket(&[
            "b/u/fotos/x-01.jpg",
            "b/u/fotos/x-02.jpg",
            "b/u/.DS_Store",
            "b/u/0.-antecedentes/y.jpg",
        ]);

        let groups = photo_groups(&bucket).await.unwrap();
        assert_eq!(groups.len(), 1);

        let urls = &groups["b/u/fotos/x-"];
        assert_eq!(
            urls,
            &vec![
                public_url("src-bucket", "b/u/fotos/x-01.jpg"),
                public_url("src-bucket", "b/u/fotos/x-02.jpg"),
            ]
        );
    }

    #[tokio::test]
    async fn photo_urls_follow_index_order() {
        // Seed out of natural order; BTreeMap listing plus the sort keeps
        // the suffix order deterministic anyway.
        let bucket = seeded_bucket(&[
            "b/u/fotos/x-03.jpg",
            "b/u/fotos/x-01.jpg",
            "b/u/fotos/x-02.jpg",
        ]);

        let groups = photo_groups(&bucket).await.unwrap();
        let urls = &groups["b/u/fotos/x-"];
        assert!(urls[0].contains("x-01.jpg"));
        assert!(urls[1].contains("x-02.jpg"));
        assert!(urls[2].contains("x-03.jpg"));
    }

    #[tokio::test]
    async fn separate_units_become_separate_groups() {
        let bucket = seeded_bucket(&[
            "edificio/local-1/fotos/local-1-01.jpg",
            "edificio/local-2/fotos/local-2-01.jpg",
        ]);

        let groups = photo_groups(&bucket).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key("edificio/local-1/fotos/local-1-"));
        assert!(groups.contains_key("edificio/local-2/fotos/local-2-"));
    }

    #[tokio::test]
    async fn groups_blueprints_by_parent_folder() {
        let bucket = seeded_bucket(&[
            "edificio/local-3/planos/ubicacion.jpg",
            "edificio/local-3/planos/uso.jpg",
            "edificio/local-3/fotos/local-3-01.jpg",
            "edificio/local-4/planos/ubicacion.jpg",
        ]);

        let groups = blueprint_groups(&bucket).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["edificio/local-3/planos"].len(), 2);
        assert_eq!(groups["edificio/local-4/planos"].len(), 1);

        // Sorted by object name: ubicacion before uso.
        let urls = &groups["edificio/local-3/planos"];
        assert!(urls[0].contains("ubicacion.jpg"));
        assert!(urls[1].contains("uso.jpg"));
    }

    #[tokio::test]
    async fn blueprint_scan_skips_metadata_artifacts() {
        let bucket = seeded_bucket(&[
            "edificio/local-3/planos/.DS_Store",
            "edificio/local-3/planos/ubicacion.jpg",
        ]);

        let groups = blueprint_groups(&bucket).await.unwrap();
        assert_eq!(groups["edificio/local-3/planos"].len(), 1);
    }
}
