//! Entity mapping model.
//!
//! # Responsibility
//! - Define the contract application record types implement to be stored.
//! - Define the projected row shape returned by column selections.
//!
//! # Invariants
//! - Column metadata is static; it never changes after startup.

pub mod entity;
pub mod record;
