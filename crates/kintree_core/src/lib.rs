//! Core relationship-graph engine for KinTree.
//!
//! Keeps parent/child/spouse links, derived generation numbers, and
//! canvas layout consistent as family members are added, edited, moved,
//! or deleted. Rendering and remote persistence are external
//! collaborators; this crate only produces and consumes plain member
//! records.

pub mod db;
pub mod export;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use export::{ExportError, TreeExport};
pub use graph::generation::resolve_generations;
pub use graph::layout::{auto_arrange, LayoutMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberId, MemberInvalid, MAX_PARENTS};
pub use repo::member_repo::{
    MemberPersistence, NoPersistence, RepoError, RepoResult, SqliteMemberRepository,
};
pub use service::editor::{EditorError, EditorResult, TreeEditor};
pub use store::member_store::{CascadeOutcome, MemberStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
