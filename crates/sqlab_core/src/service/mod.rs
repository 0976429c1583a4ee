//! Facade services.
//!
//! # Responsibility
//! - Orchestrate repository calls into one-shot CRUD operations.
//! - Own transactions, error classification and per-operation logging.

pub mod lab;
pub mod live_query;
