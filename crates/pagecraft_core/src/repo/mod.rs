//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details and position bookkeeping from the
//!   service/orchestration layer.
//!
//! # Invariants
//! - Every multi-row position mutation runs inside one immediate transaction.
//! - Repository APIs return semantic errors (`SectionNotFound`) in addition
//!   to DB transport errors.

pub mod project_repo;
pub mod section_repo;
