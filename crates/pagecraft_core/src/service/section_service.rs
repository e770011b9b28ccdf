//! Section use-case service.
//!
//! # Responsibility
//! - Validate structural input (positive ids, non-negative positions)
//!   before any repository call.
//! - Map repository errors into semantic service errors.
//!
//! # Invariants
//! - Service APIs never bypass repository ordering/payload contracts.
//! - Structural validation failures never reach the storage layer.

use crate::model::project::ProjectId;
use crate::model::section::{Section, SectionDraft, SectionId, SectionType};
use crate::repo::section_repo::{ReconcileOutcome, SectionRepoError, SectionRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from section service operations.
#[derive(Debug)]
pub enum SectionServiceError {
    /// An id argument was zero or negative.
    InvalidId(i64),
    /// A position argument was negative.
    InvalidPosition(i64),
    /// Target section does not exist.
    SectionNotFound(SectionId),
    /// Referenced project does not exist.
    ProjectNotFound(ProjectId),
    /// Payload write attempted on a non-text section.
    NotTextSection(SectionId),
    /// Repository-level failure.
    Repo(SectionRepoError),
}

impl Display for SectionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "id must be a positive integer, got {value}"),
            Self::InvalidPosition(value) => {
                write!(f, "position must be non-negative, got {value}")
            }
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::NotTextSection(id) => write!(f, "section {id} is not a text section"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SectionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SectionRepoError> for SectionServiceError {
    fn from(value: SectionRepoError) -> Self {
        match value {
            SectionRepoError::SectionNotFound(id) => Self::SectionNotFound(id),
            SectionRepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            SectionRepoError::NotTextSection(id) => Self::NotTextSection(id),
            other => Self::Repo(other),
        }
    }
}

/// Section use-case facade over a repository implementation.
pub struct SectionService<R: SectionRepository> {
    repo: R,
}

impl<R: SectionRepository> SectionService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one section; allocates the next free position when omitted.
    pub fn create_section(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        position: Option<i64>,
    ) -> Result<Section, SectionServiceError> {
        validate_id(project_id)?;
        if let Some(position) = position {
            validate_position(position)?;
        }
        self.repo
            .create_section(project_id, kind, position)
            .map_err(Into::into)
    }

    /// Loads one section with its payload.
    pub fn get_section(&self, id: SectionId) -> Result<Option<Section>, SectionServiceError> {
        validate_id(id)?;
        self.repo.get_section(id).map_err(Into::into)
    }

    /// Lists a project's sections in position order.
    pub fn list_sections(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Section>, SectionServiceError> {
        validate_id(project_id)?;
        self.repo.list_sections(project_id).map_err(Into::into)
    }

    /// Updates kind and/or position in place (no sibling reflow).
    pub fn update_section(
        &self,
        id: SectionId,
        kind: Option<SectionType>,
        position: Option<i64>,
    ) -> Result<Section, SectionServiceError> {
        validate_id(id)?;
        if let Some(position) = position {
            validate_position(position)?;
        }
        self.repo
            .update_section(id, kind, position)
            .map_err(Into::into)
    }

    /// Deletes one section without reflowing siblings.
    pub fn delete_section(&self, id: SectionId) -> Result<Section, SectionServiceError> {
        validate_id(id)?;
        self.repo.delete_section(id).map_err(Into::into)
    }

    /// Overwrites the text payload of a `text` section.
    pub fn update_text_content(
        &self,
        section_id: SectionId,
        content: &str,
    ) -> Result<Section, SectionServiceError> {
        validate_id(section_id)?;
        self.repo
            .update_text_content(section_id, content)
            .map_err(Into::into)
    }

    /// Inserts a section at the given position, shifting siblings up.
    pub fn create_section_with_reorder(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        insert_at_position: i64,
    ) -> Result<Section, SectionServiceError> {
        validate_id(project_id)?;
        validate_position(insert_at_position)?;
        self.repo
            .create_section_with_reorder(project_id, kind, insert_at_position)
            .map_err(Into::into)
    }

    /// Deletes a section and closes the gap it leaves.
    pub fn delete_section_with_reorder(
        &self,
        section_id: SectionId,
    ) -> Result<Section, SectionServiceError> {
        validate_id(section_id)?;
        self.repo
            .delete_section_with_reorder(section_id)
            .map_err(Into::into)
    }

    /// Assigns `position = index` for each listed id.
    pub fn reorder_sections(
        &self,
        project_id: ProjectId,
        section_ids: &[SectionId],
    ) -> Result<(), SectionServiceError> {
        validate_id(project_id)?;
        for section_id in section_ids {
            validate_id(*section_id)?;
        }
        self.repo
            .reorder_sections(project_id, section_ids)
            .map_err(Into::into)
    }

    /// Rewrites the project's positions to `0..n-1`.
    pub fn normalize_positions(&self, project_id: ProjectId) -> Result<(), SectionServiceError> {
        validate_id(project_id)?;
        self.repo.normalize_positions(project_id).map_err(Into::into)
    }

    /// Updates in place or creates, reconciling the text payload.
    pub fn upsert_section(
        &self,
        id: Option<SectionId>,
        project_id: ProjectId,
        kind: SectionType,
        position: i64,
        text_content: Option<&str>,
    ) -> Result<Section, SectionServiceError> {
        if let Some(id) = id {
            validate_id(id)?;
        }
        validate_id(project_id)?;
        validate_position(position)?;
        self.repo
            .upsert_section(id, project_id, kind, position, text_content)
            .map_err(Into::into)
    }

    /// Reconciles a client-proposed full section list against storage.
    pub fn reconcile_sections(
        &self,
        project_id: ProjectId,
        proposal: &[SectionDraft],
    ) -> Result<ReconcileOutcome, SectionServiceError> {
        validate_id(project_id)?;
        for entry in proposal {
            if let Some(id) = entry.id {
                validate_id(id)?;
            }
            validate_position(entry.position)?;
        }
        self.repo
            .reconcile_sections(project_id, proposal)
            .map_err(Into::into)
    }
}

fn validate_id(value: i64) -> Result<(), SectionServiceError> {
    if value <= 0 {
        return Err(SectionServiceError::InvalidId(value));
    }
    Ok(())
}

fn validate_position(value: i64) -> Result<(), SectionServiceError> {
    if value < 0 {
        return Err(SectionServiceError::InvalidPosition(value));
    }
    Ok(())
}
