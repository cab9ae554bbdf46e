//! In-memory member store.
//!
//! # Responsibility
//! - Hold the authoritative member set between editor operations.
//! - Enforce relationship invariants before any write is committed.
//!
//! # Invariants
//! - Parent/child links are bidirectionally consistent after every
//!   committed mutation.
//! - Removal cascades: no surviving member keeps a reference to a
//!   removed id.

pub mod member_store;
