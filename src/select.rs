//! Entry selection for the merged archive.
//!
//! Selection works on paths only; no entry content is touched here. The
//! overlay is consulted first: protected entries carry over unchanged, the
//! rename source takes its target name, and everything else is dropped.
//! Base entries then fill in every output path the overlay did not claim.

use crate::{ArchivePath, Error, MergeRules, Result};
use std::collections::BTreeMap;

/// Which archive a planned entry's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    /// The base archive.
    Base,
    /// The overlay archive.
    Overlay,
}

/// One entry of the merged archive.
#[derive(Debug, Clone)]
pub struct PlannedEntry {
    source_path: ArchivePath,
    effective_path: ArchivePath,
    origin: EntryOrigin,
}

impl PlannedEntry {
    /// Path of the entry in its source archive.
    pub fn source_path(&self) -> &ArchivePath {
        &self.source_path
    }

    /// Path the entry takes in the merged archive.
    pub fn effective_path(&self) -> &ArchivePath {
        &self.effective_path
    }

    /// Which archive the content comes from.
    pub fn origin(&self) -> EntryOrigin {
        self.origin
    }

    /// Returns true if the output path differs from the source path.
    pub fn is_renamed(&self) -> bool {
        self.source_path != self.effective_path
    }
}

/// The full relation between source archives and the merged archive.
#[derive(Debug, Clone)]
pub struct MergePlan {
    entries: Vec<PlannedEntry>,
    dropped_overlay: Vec<ArchivePath>,
}

impl MergePlan {
    /// Entries of the merged archive, sorted by output path.
    pub fn entries(&self) -> &[PlannedEntry] {
        &self.entries
    }

    /// Overlay entries excluded from the merge, in overlay order.
    pub fn dropped(&self) -> &[ArchivePath] {
        &self.dropped_overlay
    }

    /// Number of entries in the merged archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the merged archive would be empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose content comes from the base archive.
    pub fn entries_from_base(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.origin == EntryOrigin::Base)
            .count()
    }

    /// Number of entries whose content comes from the overlay archive.
    pub fn entries_from_overlay(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.origin == EntryOrigin::Overlay)
            .count()
    }

    /// Number of entries whose output path differs from their source path.
    pub fn entries_renamed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_renamed()).count()
    }
}

/// Plans a merge from the paths present in the base and overlay archives.
///
/// Every overlay entry is classified exactly once: protected entries keep
/// their path, the rename source takes the rules' target name, the rest
/// land in the dropped list. Base entries pass through unless an overlay
/// entry claimed their output path.
///
/// # Errors
///
/// Returns [`Error::RuleConflict`] if two entries map to the same output
/// path, which can happen when custom rules place the rename target inside
/// the protected prefix.
pub fn plan_merge<'a, B, O>(base: B, overlay: O, rules: &MergeRules) -> Result<MergePlan>
where
    B: IntoIterator<Item = &'a ArchivePath>,
    O: IntoIterator<Item = &'a ArchivePath>,
{
    let mut selected: BTreeMap<ArchivePath, PlannedEntry> = BTreeMap::new();
    let mut dropped_overlay = Vec::new();

    for path in overlay {
        let planned = if rules.is_protected(path.as_str()) {
            PlannedEntry {
                source_path: path.clone(),
                effective_path: path.clone(),
                origin: EntryOrigin::Overlay,
            }
        } else if rules.is_rename_source(path.as_str()) {
            PlannedEntry {
                source_path: path.clone(),
                effective_path: ArchivePath::new(rules.rename_target())?,
                origin: EntryOrigin::Overlay,
            }
        } else {
            log::debug!("dropping overlay entry {path}");
            dropped_overlay.push(path.clone());
            continue;
        };
        let effective = planned.effective_path.clone();
        if selected.insert(effective.clone(), planned).is_some() {
            return Err(Error::RuleConflict {
                path: effective.as_str().to_string(),
            });
        }
    }

    for path in base {
        if selected.contains_key(path) {
            continue;
        }
        selected.insert(
            path.clone(),
            PlannedEntry {
                source_path: path.clone(),
                effective_path: path.clone(),
                origin: EntryOrigin::Base,
            },
        );
    }

    Ok(MergePlan {
        entries: selected.into_values().collect(),
        dropped_overlay,
    })
}
