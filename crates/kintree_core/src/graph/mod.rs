//! Graph passes over the member set.
//!
//! # Responsibility
//! - Recompute derived generation numbers after structural edits.
//! - Assign canvas coordinates to members lacking a pinned position.
//!
//! # Invariants
//! - Both passes are idempotent: re-running them on an unchanged graph
//!   changes nothing.
//! - Both passes are defensive against dangling ids and never panic.

pub mod generation;
pub mod layout;
