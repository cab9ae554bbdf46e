//! Domain model for the family graph.
//!
//! # Responsibility
//! - Define the canonical member record shared by store, graph, and
//!   persistence layers.
//!
//! # Invariants
//! - Every member is identified by a stable store-assigned `MemberId`.
//! - Relationship fields are native id collections, never delimited
//!   strings; string encodings live only at persistence boundaries.

pub mod member;
