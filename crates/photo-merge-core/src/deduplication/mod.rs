//! Grouping of source files into duplicate sets and naming of their copies.
//!
//! Files are grouped by stem and lowercased extension, then by content hash.
//! Within a group key, hash groups are ranked by ascending hash; the rank is
//! the ordinal used in the destination name. Ranking by hash rather than by
//! scan order keeps names stable for the same set of file contents.

use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

use crate::types::{ContentHash, DestinationEntry, GroupKey, HashGroup, SourceFile};

/// Hash groups of every group key, each list sorted by ascending hash
pub type Groups = BTreeMap<GroupKey, Vec<HashGroup>>;

/// Destination entries to write, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPlan {
    /// One entry per distinct destination name
    pub entries: Vec<DestinationEntry>,

    /// Entries whose name was already claimed by an earlier entry of another group key
    pub conflicts: Vec<DestinationEntry>,

    /// Files with the same name and content as a representative
    pub duplicates: usize,
}

/// Group source files by key and content hash.
///
/// The first file of each hash group in input order becomes its representative.
pub fn group_files(files: &[SourceFile]) -> Groups {
    let mut by_key: BTreeMap<GroupKey, BTreeMap<ContentHash, HashGroup>> = BTreeMap::new();

    for file in files {
        let by_hash = by_key.entry(file.group_key()).or_default();
        match by_hash.get_mut(&file.content_hash) {
            Some(group) => group.duplicates.push(file.path.clone()),
            None => {
                by_hash.insert(
                    file.content_hash.clone(),
                    HashGroup {
                        content_hash: file.content_hash.clone(),
                        representative: file.path.clone(),
                        duplicates: Vec::new(),
                    },
                );
            }
        }
    }

    // BTreeMap iteration already yields hashes in ascending order
    by_key
        .into_iter()
        .map(|(key, by_hash)| (key, by_hash.into_values().collect()))
        .collect()
}

/// Assign a destination name to the representative of every hash group
pub fn plan_destinations(groups: &Groups) -> CopyPlan {
    let mut plan = CopyPlan::default();
    let mut claimed = HashSet::new();

    for (key, hash_groups) in groups {
        for (ordinal, group) in hash_groups.iter().enumerate() {
            plan.duplicates += group.duplicates.len();

            let entry = DestinationEntry {
                name: key.destination_name(ordinal),
                source: group.representative.clone(),
                content_hash: group.content_hash.clone(),
                ordinal,
            };

            // `IMG_1` ordinal 1 and a real `IMG_1_1` both want `IMG_1_1.jpg`
            if !claimed.insert(entry.name.clone()) {
                warn!(
                    "Destination name {} is already taken, not copying {}",
                    entry.name.to_string_lossy(),
                    entry.source.display()
                );
                plan.conflicts.push(entry);
                continue;
            }

            debug!(
                "{} <- {} ({} duplicates)",
                entry.name.to_string_lossy(),
                entry.source.display(),
                group.duplicates.len()
            );
            plan.entries.push(entry);
        }
    }

    plan
}

/// Group the files and name every distinct content variant
pub fn build_plan(files: &[SourceFile]) -> CopyPlan {
    plan_destinations(&group_files(files))
}
