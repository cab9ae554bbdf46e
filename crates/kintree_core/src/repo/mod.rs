//! Persistence collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the per-member create/update/delete contract the editor
//!   emits changes through.
//! - Isolate SQL details and the delimited-id column encoding from the
//!   in-memory engine.
//!
//! # Invariants
//! - The external store is keyed by member `id`; one call per changed
//!   member, no batching assumed.
//! - Relationship ids cross this boundary as native collections; the
//!   comma-joined encoding exists only inside the SQLite rows.

pub mod member_repo;
