//! Member store: the single source of truth for the member set.
//!
//! # Responsibility
//! - Provide `get` / `upsert` / `remove` / `all` over the member set.
//! - Reject writes that would break relationship invariants, before
//!   commit rather than after.
//! - Cascade link cleanup on removal so no dangling references survive.
//!
//! # Invariants
//! - Iteration order is insertion order; layout uses it as the stable
//!   within-generation tie-break.
//! - Allocated ids are strictly increasing and never reused while the
//!   member set is non-empty.

use crate::model::member::{Member, MemberId, MemberInvalid};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by member store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from member store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced member id does not exist.
    NotFound(MemberId),
    /// Applying the write would break a relationship invariant.
    InvariantViolation(MemberInvalid),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "member not found: {id}"),
            Self::InvariantViolation(cause) => write!(f, "invariant violation: {cause}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::InvariantViolation(cause) => Some(cause),
        }
    }
}

impl From<MemberInvalid> for StoreError {
    fn from(value: MemberInvalid) -> Self {
        Self::InvariantViolation(value)
    }
}

/// Outcome of a cascading removal.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// The removed member record.
    pub removed: Member,
    /// Ids of surviving members whose links were rewritten.
    pub touched: Vec<MemberId>,
}

/// Insertion-ordered in-memory member set.
#[derive(Debug, Default, Clone)]
pub struct MemberStore {
    members: Vec<Member>,
}

impl MemberStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from an existing member list, preserving
    /// the given order.
    pub fn from_members(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Returns the member with the given id, if present.
    pub fn get(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Returns all members in insertion order.
    pub fn all(&self) -> &[Member] {
        &self.members
    }

    /// Mutable view of all members, for resolver and layout passes.
    pub fn all_mut(&mut self) -> &mut [Member] {
        &mut self.members
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the store holds no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Allocates the next free id.
    ///
    /// Ids are `max(existing) + 1`, so an id is never reused while the
    /// member set is non-empty.
    pub fn allocate_id(&self) -> MemberId {
        self.members
            .iter()
            .map(|member| member.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Inserts or replaces one member.
    ///
    /// # Errors
    /// - `InvariantViolation` when the record fails local validation,
    ///   when its parent links would make the member its own ancestor,
    ///   or when its spouse target is already married to someone else.
    ///   The check runs before commit; on failure the store is
    ///   unchanged.
    pub fn upsert(&mut self, member: Member) -> StoreResult<()> {
        member.validate()?;
        self.check_ancestry(&member)?;
        self.check_spouse(&member)?;

        match self.members.iter_mut().find(|slot| slot.id == member.id) {
            Some(slot) => *slot = member,
            None => self.members.push(member),
        }
        Ok(())
    }

    /// Removes one member and cascades link cleanup.
    ///
    /// Every surviving member loses the removed id from `parent_ids`
    /// and `children`, and a `spouse_id` pointing at the removed member
    /// is cleared.
    ///
    /// # Errors
    /// - `NotFound` when the id does not exist; the store is unchanged.
    pub fn remove(&mut self, id: MemberId) -> StoreResult<CascadeOutcome> {
        let position = self
            .members
            .iter()
            .position(|member| member.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = self.members.remove(position);

        let mut touched = Vec::new();
        for member in &mut self.members {
            let before_parents = member.parent_ids.len();
            let before_children = member.children.len();
            member.parent_ids.retain(|parent_id| *parent_id != id);
            member.children.retain(|child_id| *child_id != id);
            let mut changed = member.parent_ids.len() != before_parents
                || member.children.len() != before_children;
            if member.spouse_id == Some(id) {
                member.spouse_id = None;
                changed = true;
            }
            if changed {
                touched.push(member.id);
            }
        }

        Ok(CascadeOutcome { removed, touched })
    }

    /// Rejects a write that would make the member its own ancestor.
    ///
    /// Walks parent links upward from the candidate's parents through
    /// the would-be state of the set. Dangling parent ids terminate the
    /// walk; they are a resolver concern, not a cycle.
    fn check_ancestry(&self, candidate: &Member) -> StoreResult<()> {
        let mut visited = HashSet::new();
        let mut frontier: Vec<MemberId> = candidate.parent_ids.clone();
        while let Some(current) = frontier.pop() {
            if current == candidate.id {
                return Err(MemberInvalid::AncestryCycle.into());
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(member) = self.get(current) {
                frontier.extend(member.parent_ids.iter().copied());
            }
        }
        Ok(())
    }

    /// Rejects a write whose spouse target is already married to a
    /// third member.
    ///
    /// Asymmetry against the candidate itself is allowed: the editor
    /// inserts the new spouse before rewriting the existing member, so
    /// the pair becomes symmetric within the same operation.
    fn check_spouse(&self, candidate: &Member) -> StoreResult<()> {
        let Some(spouse_id) = candidate.spouse_id else {
            return Ok(());
        };
        if let Some(spouse) = self.get(spouse_id) {
            if let Some(existing) = spouse.spouse_id {
                if existing != candidate.id {
                    return Err(MemberInvalid::SpouseTaken.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberStore, StoreError};
    use crate::model::member::{Member, MemberInvalid};

    fn store_with_chain() -> MemberStore {
        // 1 -> 2 -> 3 (parent to child)
        let mut store = MemberStore::new();
        let grandparent = Member::new(1, "Grandparent");
        let mut parent = Member::new(2, "Parent");
        parent.parent_ids = vec![1];
        let mut child = Member::new(3, "Child");
        child.parent_ids = vec![2];

        let mut linked_grandparent = grandparent;
        linked_grandparent.children = vec![2];
        let mut linked_parent = parent;
        linked_parent.children = vec![3];

        store.upsert(linked_grandparent).unwrap();
        store.upsert(linked_parent).unwrap();
        store.upsert(child).unwrap();
        store
    }

    #[test]
    fn allocate_id_never_reuses_live_ids() {
        let store = store_with_chain();
        assert_eq!(store.allocate_id(), 4);
    }

    #[test]
    fn upsert_rejects_ancestry_cycle() {
        let mut store = store_with_chain();
        let mut grandparent = store.get(1).cloned().unwrap();
        grandparent.parent_ids = vec![3];
        let err = store.upsert(grandparent).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvariantViolation(MemberInvalid::AncestryCycle)
        );
        // Failed write must leave the store untouched.
        assert!(store.get(1).unwrap().parent_ids.is_empty());
    }

    #[test]
    fn upsert_rejects_spouse_already_taken() {
        let mut store = MemberStore::new();
        let mut alice = Member::new(1, "Alice");
        alice.spouse_id = Some(2);
        let mut bob = Member::new(2, "Bob");
        bob.spouse_id = Some(1);
        store.upsert(Member::new(3, "Carol")).unwrap();
        store.upsert(alice).unwrap();
        store.upsert(bob).unwrap();

        let mut carol = store.get(3).cloned().unwrap();
        carol.spouse_id = Some(2);
        let err = store.upsert(carol).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvariantViolation(MemberInvalid::SpouseTaken)
        );
    }

    #[test]
    fn remove_cascades_parent_child_and_spouse_links() {
        let mut store = store_with_chain();
        let mut spouse = Member::new(4, "Spouse");
        spouse.spouse_id = Some(2);
        store.upsert(spouse).unwrap();
        let mut parent = store.get(2).cloned().unwrap();
        parent.spouse_id = Some(4);
        store.upsert(parent).unwrap();

        let outcome = store.remove(2).unwrap();
        assert_eq!(outcome.removed.id, 2);
        let mut touched = outcome.touched.clone();
        touched.sort_unstable();
        assert_eq!(touched, vec![1, 3, 4]);

        assert!(store.get(1).unwrap().children.is_empty());
        assert!(store.get(3).unwrap().parent_ids.is_empty());
        assert_eq!(store.get(4).unwrap().spouse_id, None);
    }

    #[test]
    fn remove_missing_id_fails_not_found() {
        let mut store = store_with_chain();
        assert_eq!(store.remove(99).unwrap_err(), StoreError::NotFound(99));
        assert_eq!(store.len(), 3);
    }
}
