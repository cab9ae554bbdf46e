//! Member domain model.
//!
//! # Responsibility
//! - Define the canonical person record and its relationship fields.
//! - Provide local (single-record) validation for relationship caps.
//!
//! # Invariants
//! - `id` is stable and never reused while the member set is non-empty.
//! - `generation` is derived by the generation resolver, never set
//!   independently by callers.
//! - At most two distinct parents; a member never parents or marries
//!   itself.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier for a family member.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type MemberId = i64;

/// Maximum number of parents a member may have.
pub const MAX_PARENTS: usize = 2;

/// Single-record invariant violations detected by `Member::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberInvalid {
    /// More than two parent ids.
    TooManyParents,
    /// The member lists itself as a parent.
    SelfParent,
    /// The same parent id appears twice.
    DuplicateParent,
    /// The member lists itself as its spouse.
    SelfSpouse,
    /// The member is reachable from itself via parent links.
    AncestryCycle,
    /// The spouse target is already married to someone else.
    SpouseTaken,
}

impl Display for MemberInvalid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyParents => write!(f, "a member can have at most two parents"),
            Self::SelfParent => write!(f, "a member cannot be its own parent"),
            Self::DuplicateParent => write!(f, "parent ids must be distinct"),
            Self::SelfSpouse => write!(f, "a member cannot be its own spouse"),
            Self::AncestryCycle => write!(f, "a member cannot be its own ancestor"),
            Self::SpouseTaken => write!(f, "spouse target is already married"),
        }
    }
}

impl Error for MemberInvalid {}

/// Canonical record for one person in the family graph.
///
/// Relationship fields are kept mutually consistent by the member store:
/// every id in `parent_ids` names an existing member whose `children`
/// contains this member's id, and `spouse_id` is always symmetric.
/// Serialized field names follow the external camelCase schema
/// (`parentIds`, `spouseId`, ...) so exports round-trip verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Store-assigned stable id.
    pub id: MemberId,
    /// Display name; mutable, no uniqueness constraint.
    pub name: String,
    /// Derived depth from the nearest root ancestor.
    #[serde(default)]
    pub generation: u32,
    /// Canvas x coordinate.
    #[serde(default)]
    pub x: f64,
    /// Canvas y coordinate.
    #[serde(default)]
    pub y: f64,
    /// Zero, one, or two parent ids. Empty means this member is a root.
    #[serde(default)]
    pub parent_ids: Vec<MemberId>,
    /// Ids of members whose `parent_ids` contain this member's id.
    #[serde(default)]
    pub children: Vec<MemberId>,
    /// At most one spouse; the relation is symmetric.
    #[serde(default)]
    pub spouse_id: Option<MemberId>,
    /// Set by a user drag; exempts the member from auto-layout writes.
    #[serde(default)]
    pub position_pinned: bool,
    /// Opaque passthrough field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    /// Opaque passthrough field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    /// Opaque passthrough field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    /// Epoch ms creation timestamp.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch ms update timestamp.
    #[serde(default)]
    pub updated_at: i64,
}

impl Member {
    /// Creates a new parentless member with no relationships.
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            name: name.into(),
            generation: 0,
            x: 0.0,
            y: 0.0,
            parent_ids: Vec::new(),
            children: Vec::new(),
            spouse_id: None,
            position_pinned: false,
            birth_year: None,
            death_year: None,
            photo_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether this member has no parents.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Checks single-record invariants: parent cap, distinct parents,
    /// no self-parenting, no self-spousing.
    ///
    /// Cross-record invariants (ancestry cycles, spouse symmetry) need
    /// the full member set and are checked by the store before commit.
    pub fn validate(&self) -> Result<(), MemberInvalid> {
        if self.parent_ids.len() > MAX_PARENTS {
            return Err(MemberInvalid::TooManyParents);
        }
        if self.parent_ids.contains(&self.id) {
            return Err(MemberInvalid::SelfParent);
        }
        if self.parent_ids.len() == 2 && self.parent_ids[0] == self.parent_ids[1] {
            return Err(MemberInvalid::DuplicateParent);
        }
        if self.spouse_id == Some(self.id) {
            return Err(MemberInvalid::SelfSpouse);
        }
        Ok(())
    }

    /// Updates the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
