//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, graph passes, and the persistence collaborator
//!   into atomic editor operations.
//! - Keep UI layers decoupled from store and persistence details.

pub mod editor;
