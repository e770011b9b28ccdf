//! Core domain logic for the pagecraft page-builder backend.
//!
//! The hard guarantee this crate owns: a project's sections always carry
//! contiguous, zero-based, unique positions at the end of every completed
//! operation, across single-section edits, bulk reorders and full-list
//! reconciliation.

pub mod db;
pub mod logging;
pub mod model;
pub mod ops;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectId};
pub use model::section::{
    Section, SectionDraft, SectionId, SectionType, TextPayload, DEFAULT_TEXT_CONTENT,
};
pub use ops::OpResult;
pub use repo::project_repo::{ProjectRepoError, ProjectRepository, SqliteProjectRepository};
pub use repo::section_repo::{
    ReconcileOutcome, SectionRepoError, SectionRepoResult, SectionRepository,
    SqliteSectionRepository,
};
pub use service::section_service::{SectionService, SectionServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
