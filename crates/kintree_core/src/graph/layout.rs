//! Layout engine.
//!
//! # Responsibility
//! - Assign canvas coordinates by generation-bucketed auto-arrange, or
//!   place newly created members at deterministic offsets from the
//!   member that spawned them.
//!
//! # Invariants
//! - Positions pinned by a user drag are never overwritten.
//! - Auto-arrange is idempotent for an unchanged graph.
//! - Within a generation, members keep their store order.

use crate::model::member::{Member, MemberId};
use std::collections::BTreeMap;

/// Left margin of the first column in a generation row.
pub const ROW_ORIGIN_X: f64 = 100.0;
/// Top margin of generation row 0.
pub const ROW_ORIGIN_Y: f64 = 100.0;
/// Horizontal pitch between members of one generation.
pub const COLUMN_PITCH: f64 = 180.0;
/// Vertical pitch between generation rows.
pub const GENERATION_PITCH: f64 = 150.0;

/// Horizontal fan-out between siblings placed under one parent.
const CHILD_FAN_PITCH: f64 = 150.0;
/// Horizontal fan-out between parents placed above one child.
const PARENT_FAN_PITCH: f64 = 120.0;
/// Horizontal gap between a member and a newly added spouse.
const SPOUSE_GAP: f64 = 100.0;

/// Strategy used after structural edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Re-bucket every generation row after each structural edit.
    #[default]
    AutoArrange,
    /// Keep existing coordinates; rely on creation-time placement only.
    Incremental,
}

/// Rearranges all members into generation rows.
///
/// Members are grouped by `generation`; within a group the existing
/// slice order is kept and columns are spaced at a fixed pitch. Members
/// with a pinned position keep their coordinates but still occupy their
/// column slot, so unpinned neighbours do not shift into it.
///
/// Returns the ids whose position actually changed.
pub fn auto_arrange(members: &mut [Member]) -> Vec<MemberId> {
    let mut rows: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, member) in members.iter().enumerate() {
        rows.entry(member.generation).or_default().push(index);
    }

    let mut changed = Vec::new();
    for (generation, row) in rows {
        let y = ROW_ORIGIN_Y + f64::from(generation) * GENERATION_PITCH;
        for (column, index) in row.into_iter().enumerate() {
            let member = &mut members[index];
            if member.position_pinned {
                continue;
            }
            let x = ROW_ORIGIN_X + column as f64 * COLUMN_PITCH;
            if member.x != x || member.y != y {
                member.x = x;
                member.y = y;
                changed.push(member.id);
            }
        }
    }
    changed
}

/// Creation-time position for a new child, fanned out below its parent.
pub fn place_child(parent: &Member, sibling_index: usize) -> (f64, f64) {
    (
        parent.x + sibling_index as f64 * CHILD_FAN_PITCH,
        parent.y + GENERATION_PITCH,
    )
}

/// Creation-time position for a new parent, fanned out above its child.
pub fn place_parent(child: &Member, parent_index: usize) -> (f64, f64) {
    (
        child.x + parent_index as f64 * PARENT_FAN_PITCH,
        child.y - GENERATION_PITCH,
    )
}

/// Creation-time position for a new spouse, beside the member.
pub fn place_spouse(member: &Member) -> (f64, f64) {
    (member.x + SPOUSE_GAP, member.y)
}
