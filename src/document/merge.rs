//! Reconciliation of freshly rendered entries with an existing document.
//!
//! An existing block whose key collides with an incoming entry is always
//! replaced, whatever its classification. Manual blocks keep their relative
//! order; incoming entries are appended after them.

use std::collections::HashSet;

use super::classify::{classify_block, BlockOrigin};
use super::{Block, PersistedDocument};
use crate::constants::MODULES_SUBDIR;
use crate::models::{EntryKey, RenderedEntry};

/// Counts of what a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Manual blocks carried over
    pub kept: usize,
    /// Generated blocks discarded
    pub dropped_generated: usize,
    /// Blocks replaced because their key collides with an incoming entry
    pub replaced: usize,
    /// Incoming entries appended
    pub added: usize,
}

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Recomposed document
    pub document: PersistedDocument,
    /// What happened
    pub stats: MergeStats,
}

/// Drops every generated block and every block colliding with `fresh`, then
/// appends `fresh`.
#[must_use]
pub fn reconcile(document: &PersistedDocument, fresh: &[RenderedEntry]) -> MergeResult {
    merge(document, fresh, true, true)
}

/// Keeps only manual blocks that do not collide with `displaced`; appends nothing.
///
/// Used for the main document when every generated entry lives in modules.
#[must_use]
pub fn retain_manual(document: &PersistedDocument, displaced: &[RenderedEntry]) -> MergeResult {
    merge(document, displaced, true, false)
}

/// Drops only blocks colliding with `displaced`; everything else is untouched.
#[must_use]
pub fn displace_colliding(document: &PersistedDocument, displaced: &[RenderedEntry]) -> MergeResult {
    merge(document, displaced, false, false)
}

fn merge(
    document: &PersistedDocument,
    incoming: &[RenderedEntry],
    drop_generated: bool,
    append: bool,
) -> MergeResult {
    let incoming = dedup_entries(incoming);
    let incoming_keys: HashSet<EntryKey> = incoming.iter().filter_map(|e| e.key()).collect();

    let mut stats = MergeStats::default();
    let mut blocks: Vec<Block> = Vec::with_capacity(document.blocks.len() + incoming.len());

    for block in &document.blocks {
        if drop_generated && classify_block(block) == BlockOrigin::Generated {
            stats.dropped_generated += 1;
        } else if block.key().is_some_and(|key| incoming_keys.contains(&key)) {
            stats.replaced += 1;
        } else {
            stats.kept += 1;
            blocks.push(block.clone());
        }
    }

    if append {
        stats.added = incoming.len();
        blocks.extend(incoming.iter().map(|entry| Block::from_entry(entry)));
    }

    tracing::debug!(
        "Merged entries: {} kept, {} generated dropped, {} replaced, {} added",
        stats.kept,
        stats.dropped_generated,
        stats.replaced,
        stats.added
    );

    MergeResult {
        document: PersistedDocument {
            blocks,
            ..document.clone()
        },
        stats,
    }
}

/// Removes entries whose key was already seen; the first occurrence wins.
#[must_use]
pub fn dedup_entries(entries: &[RenderedEntry]) -> Vec<&RenderedEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| entry.key().map_or(true, |key| seen.insert(key)))
        .collect()
}

/// Returns true for include paths that point at generated module documents.
#[must_use]
pub fn is_module_include(path: &str) -> bool {
    path.strip_prefix(MODULES_SUBDIR)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Replaces all module includes with `modules`, sorted; other includes keep their order.
pub fn set_module_includes(document: &mut PersistedDocument, modules: &[String]) {
    let includes = document.includes.get_or_insert_with(Vec::new);
    includes.retain(|path| !is_module_include(path));

    let mut modules: Vec<&String> = modules.iter().collect();
    modules.sort();
    modules.dedup();
    includes.extend(modules.into_iter().cloned());
}

/// Appends an include unless it is already listed.
pub fn add_include(document: &mut PersistedDocument, path: &str) {
    let includes = document.includes.get_or_insert_with(Vec::new);
    if !includes.iter().any(|existing| existing == path) {
        includes.push(path.to_string());
    }
}
