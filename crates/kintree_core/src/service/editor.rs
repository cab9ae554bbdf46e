//! Relationship editor: the mutation API over the family graph.
//!
//! # Responsibility
//! - Expose one atomic operation per relationship type (add parent,
//!   add child, add spouse, delete, rename, reposition).
//! - Run the generation resolver and then the layout engine after every
//!   structural edit, before the result is considered committed.
//! - Emit one best-effort persistence call per changed member.
//!
//! # Invariants
//! - Preconditions are checked before any write, so a failed operation
//!   leaves the store at its prior valid state.
//! - The member set is never empty while the editor is live; the last
//!   member cannot be deleted.
//! - The local store is authoritative; persistence failures are logged
//!   and never block the edit (optimistic local state).

use crate::graph::generation::resolve_generations;
use crate::graph::layout::{
    auto_arrange, place_child, place_parent, place_spouse, LayoutMode,
};
use crate::model::member::{Member, MemberId, MAX_PARENTS};
use crate::repo::member_repo::{MemberPersistence, RepoError};
use crate::store::member_store::{MemberStore, StoreError};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name and position of the member seeded into an empty graph.
const SEED_ROOT_NAME: &str = "Root Person";
const SEED_ROOT_POSITION: (f64, f64) = (400.0, 300.0);

/// Result type used by editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors from relationship editor operations.
#[derive(Debug)]
pub enum EditorError {
    /// Referenced member id does not exist.
    NotFound(MemberId),
    /// The member already has two parents.
    TooManyParents(MemberId),
    /// The member already has a spouse.
    AlreadyMarried(MemberId),
    /// The last remaining member cannot be deleted.
    LastMember,
    /// Display name is blank after trim.
    InvalidName,
    /// Store-level failure.
    Store(StoreError),
    /// Persistence failure while bootstrapping from the collaborator.
    Persistence(RepoError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "member not found: {id}"),
            Self::TooManyParents(id) => write!(f, "member {id} already has two parents"),
            Self::AlreadyMarried(id) => write!(f, "member {id} already has a spouse"),
            Self::LastMember => write!(f, "the last member cannot be deleted"),
            Self::InvalidName => write!(f, "member name must not be blank"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Editor over one family graph, parameterized by a storage
/// collaborator.
///
/// The store is the single source of truth; the persistence sink is a
/// best-effort side channel receiving one create/update/delete call per
/// member whose record changed.
pub struct TreeEditor<P: MemberPersistence> {
    store: MemberStore,
    layout_mode: LayoutMode,
    persistence: P,
}

impl<P: MemberPersistence> TreeEditor<P> {
    /// Creates an editor over a fresh graph seeded with one root
    /// member, so the member set is non-empty from the first frame.
    pub fn new(persistence: P, layout_mode: LayoutMode) -> Self {
        let mut editor = Self {
            store: MemberStore::new(),
            layout_mode,
            persistence,
        };
        editor.seed_root();
        editor
    }

    /// Boots an editor from the persistence collaborator.
    ///
    /// Loads every member, recomputes generations, and pushes an update
    /// for each member whose generation was stale. An empty load seeds
    /// the initial root member instead.
    ///
    /// # Errors
    /// - `Persistence` when the initial load fails. Later persistence
    ///   failures during edits are logged, not surfaced.
    pub fn load(persistence: P, layout_mode: LayoutMode) -> EditorResult<Self> {
        let members = persistence.load_all()?;
        let mut editor = Self {
            store: MemberStore::from_members(members),
            layout_mode,
            persistence,
        };
        if editor.store.is_empty() {
            editor.seed_root();
            return Ok(editor);
        }

        let stale = resolve_generations(editor.store.all_mut());
        for id in &stale {
            if let Some(member) = editor.store.get(*id) {
                editor.persist_update(member);
            }
        }
        info!(
            "event=tree_load module=editor status=ok members={} stale_generations={}",
            editor.store.len(),
            stale.len()
        );
        Ok(editor)
    }

    /// Rebuilds an editor from an exported member list.
    ///
    /// Generations are re-resolved so a hand-edited document still
    /// yields a consistent graph; positions are taken verbatim. Nothing
    /// is pushed to persistence.
    pub fn from_members(
        members: Vec<Member>,
        persistence: P,
        layout_mode: LayoutMode,
    ) -> Self {
        let mut editor = Self {
            store: MemberStore::from_members(members),
            layout_mode,
            persistence,
        };
        if editor.store.is_empty() {
            editor.seed_root();
        } else {
            resolve_generations(editor.store.all_mut());
        }
        editor
    }

    /// Full member list in store order, for rendering surfaces.
    pub fn members(&self) -> &[Member] {
        self.store.all()
    }

    /// Returns one member by id.
    pub fn get(&self, id: MemberId) -> Option<&Member> {
        self.store.get(id)
    }

    /// Active layout strategy.
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    /// Creates a new parentless member at generation 0.
    pub fn add_root(&mut self) -> EditorResult<MemberId> {
        let id = self.store.allocate_id();
        let root_index = self.store.all().iter().filter(|m| m.is_root()).count();
        let member = Member::new(id, format!("Root {}", root_index + 1));
        self.store.upsert(member)?;
        self.commit_structural(&[id], Vec::new(), &[]);
        info!("event=add_root module=editor status=ok id={id}");
        Ok(id)
    }

    /// Creates a new child of the given parent.
    ///
    /// When the parent has a spouse, the child is attached to both
    /// spouses (two-parent semantics), and appended to both `children`
    /// lists.
    ///
    /// # Errors
    /// - `NotFound` when the parent id does not exist, or when the
    ///   parent's spouse reference is dangling (data-integrity fault).
    pub fn add_child(&mut self, parent_id: MemberId) -> EditorResult<MemberId> {
        let parent = self
            .store
            .get(parent_id)
            .cloned()
            .ok_or(EditorError::NotFound(parent_id))?;

        let mut parent_ids = vec![parent_id];
        if let Some(spouse_id) = parent.spouse_id {
            if self.store.get(spouse_id).is_none() {
                return Err(EditorError::NotFound(spouse_id));
            }
            parent_ids.push(spouse_id);
        }

        let id = self.store.allocate_id();
        let sibling_index = parent.children.len();
        let (x, y) = place_child(&parent, sibling_index);
        let mut child = Member::new(id, format!("Child {}", sibling_index + 1));
        child.parent_ids = parent_ids.clone();
        child.generation = parent.generation + 1;
        child.x = x;
        child.y = y;
        self.store.upsert(child)?;

        let mut touched = Vec::new();
        for pid in parent_ids {
            if let Some(existing) = self.store.get(pid).cloned() {
                let mut updated = existing;
                updated.children.push(id);
                updated.touch();
                self.store.upsert(updated)?;
                touched.push(pid);
            }
        }

        self.commit_structural(&[id], touched, &[]);
        info!("event=add_child module=editor status=ok parent={parent_id} child={id}");
        Ok(id)
    }

    /// Creates a new parent of the given child.
    ///
    /// # Errors
    /// - `NotFound` when the child id does not exist.
    /// - `TooManyParents` when the child already has two parents.
    pub fn add_parent(&mut self, child_id: MemberId) -> EditorResult<MemberId> {
        let child = self
            .store
            .get(child_id)
            .cloned()
            .ok_or(EditorError::NotFound(child_id))?;
        if child.parent_ids.len() >= MAX_PARENTS {
            return Err(EditorError::TooManyParents(child_id));
        }

        let id = self.store.allocate_id();
        let parent_index = child.parent_ids.len();
        let (x, y) = place_parent(&child, parent_index);
        let mut parent = Member::new(id, format!("Parent {}", parent_index + 1));
        parent.children = vec![child_id];
        parent.x = x;
        parent.y = y;
        self.store.upsert(parent)?;

        let mut updated_child = child;
        updated_child.parent_ids.push(id);
        updated_child.touch();
        self.store.upsert(updated_child)?;

        self.commit_structural(&[id], vec![child_id], &[]);
        info!("event=add_parent module=editor status=ok child={child_id} parent={id}");
        Ok(id)
    }

    /// Creates a new spouse for the given member.
    ///
    /// The spouse shares the member's children: every existing child
    /// gains the spouse as a second parent. If any shared child is
    /// already at the two-parent cap the whole operation fails without
    /// writing anything.
    ///
    /// # Errors
    /// - `NotFound` when the member id does not exist, or when a shared
    ///   child reference is dangling (data-integrity fault).
    /// - `AlreadyMarried` when the member already has a spouse.
    /// - `TooManyParents` when a shared child cannot take a second
    ///   parent.
    pub fn add_spouse(&mut self, member_id: MemberId) -> EditorResult<MemberId> {
        let member = self
            .store
            .get(member_id)
            .cloned()
            .ok_or(EditorError::NotFound(member_id))?;
        if member.spouse_id.is_some() {
            return Err(EditorError::AlreadyMarried(member_id));
        }
        for child_id in &member.children {
            let child = self
                .store
                .get(*child_id)
                .ok_or(EditorError::NotFound(*child_id))?;
            if child.parent_ids.len() >= MAX_PARENTS {
                return Err(EditorError::TooManyParents(*child_id));
            }
        }

        let id = self.store.allocate_id();
        let (x, y) = place_spouse(&member);
        let mut spouse = Member::new(id, format!("Spouse of {}", member.name));
        spouse.spouse_id = Some(member_id);
        spouse.children = member.children.clone();
        spouse.generation = member.generation;
        spouse.x = x;
        spouse.y = y;
        self.store.upsert(spouse)?;

        let mut updated_member = member.clone();
        updated_member.spouse_id = Some(id);
        updated_member.touch();
        self.store.upsert(updated_member)?;

        let mut touched = vec![member_id];
        for child_id in &member.children {
            if let Some(existing) = self.store.get(*child_id).cloned() {
                let mut updated = existing;
                updated.parent_ids.push(id);
                updated.touch();
                self.store.upsert(updated)?;
                touched.push(*child_id);
            }
        }

        self.commit_structural(&[id], touched, &[]);
        info!("event=add_spouse module=editor status=ok member={member_id} spouse={id}");
        Ok(id)
    }

    /// Deletes one member and cascades link cleanup.
    ///
    /// # Errors
    /// - `NotFound` when the id does not exist.
    /// - `LastMember` when it is the only member left.
    pub fn delete_member(&mut self, id: MemberId) -> EditorResult<()> {
        if self.store.get(id).is_none() {
            return Err(EditorError::NotFound(id));
        }
        if self.store.len() == 1 {
            return Err(EditorError::LastMember);
        }

        let outcome = self.store.remove(id)?;
        self.commit_structural(&[], outcome.touched, &[id]);
        info!("event=delete_member module=editor status=ok id={id}");
        Ok(())
    }

    /// Renames one member. Pure field update, no cascade.
    ///
    /// # Errors
    /// - `NotFound` when the id does not exist.
    /// - `InvalidName` when the name is blank after trim.
    pub fn rename_member(
        &mut self,
        id: MemberId,
        name: impl Into<String>,
    ) -> EditorResult<()> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EditorError::InvalidName);
        }
        let mut member = self
            .store
            .get(id)
            .cloned()
            .ok_or(EditorError::NotFound(id))?;
        member.name = trimmed.to_string();
        member.touch();
        self.store.upsert(member)?;
        if let Some(member) = self.store.get(id) {
            self.persist_update(member);
        }
        Ok(())
    }

    /// Moves one member to a user-chosen position.
    ///
    /// The position is marked pinned and is exempt from future
    /// auto-layout writes. Pure field update, no cascade.
    ///
    /// # Errors
    /// - `NotFound` when the id does not exist.
    pub fn reposition_member(&mut self, id: MemberId, x: f64, y: f64) -> EditorResult<()> {
        let mut member = self
            .store
            .get(id)
            .cloned()
            .ok_or(EditorError::NotFound(id))?;
        member.x = x;
        member.y = y;
        member.position_pinned = true;
        member.touch();
        self.store.upsert(member)?;
        if let Some(member) = self.store.get(id) {
            self.persist_update(member);
        }
        Ok(())
    }

    /// Seeds the initial root member into an empty store.
    fn seed_root(&mut self) {
        let id = self.store.allocate_id();
        let mut root = Member::new(id, SEED_ROOT_NAME);
        root.x = SEED_ROOT_POSITION.0;
        root.y = SEED_ROOT_POSITION.1;
        // An empty store accepts a parentless member unconditionally.
        let _ = self.store.upsert(root);
        if let Some(member) = self.store.get(id) {
            self.persist_create(member);
        }
    }

    /// Post-edit pipeline: resolver, then layout, then one persistence
    /// call per changed member.
    fn commit_structural(
        &mut self,
        created: &[MemberId],
        touched: Vec<MemberId>,
        deleted: &[MemberId],
    ) {
        let mut updated: BTreeSet<MemberId> = touched.into_iter().collect();
        updated.extend(resolve_generations(self.store.all_mut()));
        if self.layout_mode == LayoutMode::AutoArrange {
            updated.extend(auto_arrange(self.store.all_mut()));
        }

        for id in deleted {
            updated.remove(id);
            self.persist_delete(*id);
        }
        for id in created {
            updated.remove(id);
            if let Some(member) = self.store.get(*id) {
                self.persist_create(member);
            }
        }
        for id in updated {
            if let Some(member) = self.store.get(id) {
                self.persist_update(member);
            }
        }
    }

    fn persist_create(&self, member: &Member) {
        if let Err(err) = self.persistence.create(member) {
            warn!(
                "event=persist_failed module=editor op=create id={} error={err}",
                member.id
            );
        }
    }

    fn persist_update(&self, member: &Member) {
        if let Err(err) = self.persistence.update(member) {
            warn!(
                "event=persist_failed module=editor op=update id={} error={err}",
                member.id
            );
        }
    }

    fn persist_delete(&self, id: MemberId) {
        if let Err(err) = self.persistence.delete(id) {
            warn!("event=persist_failed module=editor op=delete id={id} error={err}");
        }
    }
}
