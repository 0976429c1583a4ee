//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define entity-generic data access contracts.
//! - Isolate SQL rendering and execution from the facade.
//!
//! # Invariants
//! - Repository APIs return semantic constraint errors (`UniqueViolation`)
//!   in addition to transport errors.

pub mod entity_repo;
