//! Domain model for projects and their ordered content sections.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one typed shape per section kind instead of an inheritance graph.
//!
//! # Invariants
//! - Every section belongs to exactly one project; `project_id` never changes.
//! - A `Text` section owns exactly one text payload; other kinds own none.

pub mod project;
pub mod section;
