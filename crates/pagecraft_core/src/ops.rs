//! Operation boundary for the page-builder backend.
//!
//! # Responsibility
//! - Expose every exported operation as a synchronous call returning a
//!   tagged success/failure result.
//! - Convert every internal error into a short, user-safe message; log the
//!   technical detail with stable event names.
//! - Emit a `view_invalidate` event after each successful mutation so the
//!   external cache/page layer can refresh.
//!
//! # Invariants
//! - No error propagates past this module as a panic or raw error value.
//! - Failure messages never carry SQL or schema detail.

use crate::model::project::{Project, ProjectId};
use crate::model::section::{Section, SectionDraft, SectionId, SectionType};
use crate::repo::section_repo::{ReconcileOutcome, SectionRepoError, SqliteSectionRepository};
use crate::service::section_service::{SectionService, SectionServiceError};
use log::{error, info};
use rusqlite::Connection;

/// Tagged outcome of one exported operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpResult<T> {
    /// Operation committed; carries the result and a short status message.
    Success { data: T, message: String },
    /// Operation aborted; carries only a generic, user-safe message.
    Failure { error: String },
}

impl<T> OpResult<T> {
    fn success(data: T, message: impl Into<String>) -> Self {
        Self::Success {
            data,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    /// Whether the operation committed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consumes the result, yielding the payload of a success.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, when the operation aborted.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error.as_str()),
        }
    }
}

/// Input for [`create_section`].
#[derive(Debug, Clone)]
pub struct CreateSectionRequest {
    pub project_id: ProjectId,
    pub kind: SectionType,
    /// Raw position; `None` allocates the next free slot. An explicit value
    /// is written as-is without reflowing siblings.
    pub position: Option<i64>,
}

/// Input for [`update_section`].
#[derive(Debug, Clone)]
pub struct UpdateSectionRequest {
    pub id: SectionId,
    pub kind: Option<SectionType>,
    pub position: Option<i64>,
}

/// Input for [`create_section_with_reorder`].
#[derive(Debug, Clone)]
pub struct CreateSectionWithReorderRequest {
    pub project_id: ProjectId,
    pub kind: SectionType,
    pub insert_at_position: i64,
}

/// Input for [`create_or_update_sections`].
#[derive(Debug, Clone)]
pub struct CreateOrUpdateSectionsRequest {
    pub project_id: ProjectId,
    pub sections: Vec<SectionDraft>,
}

/// Input for [`upsert_section`].
#[derive(Debug, Clone)]
pub struct UpsertSectionRequest {
    pub id: Option<SectionId>,
    pub project_id: ProjectId,
    pub kind: SectionType,
    pub position: i64,
    pub text_content: Option<String>,
}

/// Creates one section; Text sections receive the default payload.
pub fn create_section(conn: &Connection, request: CreateSectionRequest) -> OpResult<Section> {
    with_service(conn, "create_section", "Failed to create section. Please try again.", |service| {
        service.create_section(request.project_id, request.kind, request.position)
    })
    .map_mutation("Section created successfully!")
}

/// Updates kind and/or position of one section in place.
pub fn update_section(conn: &Connection, request: UpdateSectionRequest) -> OpResult<Section> {
    with_service(conn, "update_section", "Failed to update section. Please try again.", |service| {
        service.update_section(request.id, request.kind, request.position)
    })
    .map_mutation("Section updated successfully!")
}

/// Deletes one section without reflowing siblings.
pub fn delete_section(conn: &Connection, id: SectionId) -> OpResult<Section> {
    with_service(conn, "delete_section", "Failed to delete section. Please try again.", |service| {
        service.delete_section(id)
    })
    .map_mutation("Section deleted successfully!")
}

/// Loads one section by id.
pub fn get_section_by_id(conn: &Connection, id: SectionId) -> OpResult<Section> {
    let outcome = with_service(conn, "get_section_by_id", "Failed to load section.", |service| {
        service.get_section(id)
    });
    match outcome.0 {
        Ok(Some(section)) => OpResult::success(section, "Section loaded."),
        Ok(None) => OpResult::failure("Section not found."),
        Err(message) => OpResult::failure(message),
    }
}

/// Lists a project's sections in position order.
pub fn get_sections_by_project(conn: &Connection, project_id: ProjectId) -> OpResult<Vec<Section>> {
    let outcome = with_service(conn, "get_sections_by_project", "Failed to load sections.", |service| {
        service.list_sections(project_id)
    });
    match outcome.0 {
        Ok(sections) => OpResult::success(sections, "Sections loaded."),
        Err(message) => OpResult::failure(message),
    }
}

/// Overwrites the text payload of a `text` section.
pub fn update_text_content(
    conn: &Connection,
    section_id: SectionId,
    content: &str,
) -> OpResult<Section> {
    with_service(
        conn,
        "update_text_content",
        "Failed to update text content. Please try again.",
        |service| service.update_text_content(section_id, content),
    )
    .map_mutation("Text content updated successfully!")
}

/// Reorders sections by assigning each listed id its index as position.
pub fn reorder_sections(
    conn: &Connection,
    project_id: ProjectId,
    section_ids: &[SectionId],
) -> OpResult<()> {
    let outcome = with_service(
        conn,
        "reorder_sections",
        "Failed to reorder sections. Please try again.",
        |service| service.reorder_sections(project_id, section_ids),
    );
    match outcome.0 {
        Ok(()) => {
            emit_view_invalidate(project_id);
            OpResult::success((), "Sections reordered successfully!")
        }
        Err(message) => OpResult::failure(message),
    }
}

/// Inserts a section at a position, shifting trailing siblings up by one.
pub fn create_section_with_reorder(
    conn: &Connection,
    request: CreateSectionWithReorderRequest,
) -> OpResult<Section> {
    with_service(
        conn,
        "create_section_with_reorder",
        "Failed to create section. Please try again.",
        |service| {
            service.create_section_with_reorder(
                request.project_id,
                request.kind,
                request.insert_at_position,
            )
        },
    )
    .map_mutation("Section created successfully!")
}

/// Deletes a section and shifts trailing siblings down by one.
pub fn delete_section_with_reorder(conn: &Connection, section_id: SectionId) -> OpResult<Section> {
    with_service(
        conn,
        "delete_section_with_reorder",
        "Failed to delete section. Please try again.",
        |service| service.delete_section_with_reorder(section_id),
    )
    .map_mutation("Section deleted successfully!")
}

/// Reconciles a client-proposed full section list against storage.
pub fn create_or_update_sections(
    conn: &Connection,
    request: CreateOrUpdateSectionsRequest,
) -> OpResult<ReconcileOutcome> {
    let outcome = with_service(
        conn,
        "create_or_update_sections",
        "Failed to process sections. Please try again.",
        |service| service.reconcile_sections(request.project_id, &request.sections),
    );
    match outcome.0 {
        Ok(result) => {
            emit_view_invalidate(request.project_id);
            let message = format!(
                "Successfully processed sections: {} created, {} updated, {} deleted",
                result.created.len(),
                result.updated.len(),
                result.deleted.len()
            );
            OpResult::success(result, message)
        }
        Err(message) => OpResult::failure(message),
    }
}

/// Updates a section in place or creates it, reconciling the text payload.
pub fn upsert_section(conn: &Connection, request: UpsertSectionRequest) -> OpResult<Section> {
    let is_update = request.id.is_some();
    let outcome = with_service(
        conn,
        "upsert_section",
        "Failed to save section. Please try again.",
        |service| {
            service.upsert_section(
                request.id,
                request.project_id,
                request.kind,
                request.position,
                request.text_content.as_deref(),
            )
        },
    );
    match outcome.0 {
        Ok(section) => {
            emit_view_invalidate(section.project_id);
            let message = if is_update {
                "Section updated successfully!"
            } else {
                "Section created successfully!"
            };
            OpResult::success(section, message)
        }
        Err(message) => OpResult::failure(message),
    }
}

/// Rewrites a project's section positions to `0..n-1`.
pub fn normalize_positions(conn: &Connection, project_id: ProjectId) -> OpResult<()> {
    let outcome = with_service(
        conn,
        "normalize_positions",
        "Failed to normalize positions. Please try again.",
        |service| service.normalize_positions(project_id),
    );
    match outcome.0 {
        Ok(()) => {
            emit_view_invalidate(project_id);
            OpResult::success((), "Section positions normalized successfully!")
        }
        Err(message) => OpResult::failure(message),
    }
}

/// Creates one project row.
pub fn create_project(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
) -> OpResult<Project> {
    use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
    if title.trim().is_empty() {
        error!("event=create_project module=ops status=error error_code=validation error=blank title");
        return OpResult::failure("Failed to create project. Please try again.");
    }
    let repo = SqliteProjectRepository::new(conn);
    match repo.create_project(title.trim(), description) {
        Ok(project) => {
            emit_view_invalidate(project.id);
            OpResult::success(project, "Project created successfully!")
        }
        Err(err) => {
            error!("event=create_project module=ops status=error error={err}");
            OpResult::failure("Failed to create project. Please try again.")
        }
    }
}

/// Deletes one project; its sections and payloads cascade away.
pub fn delete_project(conn: &Connection, id: ProjectId) -> OpResult<Project> {
    use crate::repo::project_repo::{ProjectRepoError, ProjectRepository, SqliteProjectRepository};
    let repo = SqliteProjectRepository::new(conn);
    match repo.delete_project(id) {
        Ok(project) => {
            emit_view_invalidate(id);
            OpResult::success(project, "Project deleted successfully!")
        }
        Err(ProjectRepoError::NotFound(_)) => OpResult::failure("Project not found."),
        Err(err) => {
            error!("event=delete_project module=ops status=error error={err}");
            OpResult::failure("Failed to delete project. Please try again.")
        }
    }
}

/// Loads one project by id.
pub fn get_project_by_id(conn: &Connection, id: ProjectId) -> OpResult<Project> {
    use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
    let repo = SqliteProjectRepository::new(conn);
    match repo.get_project(id) {
        Ok(Some(project)) => OpResult::success(project, "Project loaded."),
        Ok(None) => OpResult::failure("Project not found."),
        Err(err) => {
            error!("event=get_project_by_id module=ops status=error error={err}");
            OpResult::failure("Failed to load project.")
        }
    }
}

/// Lists all projects, newest first.
pub fn list_projects(conn: &Connection) -> OpResult<Vec<Project>> {
    use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
    let repo = SqliteProjectRepository::new(conn);
    match repo.list_projects() {
        Ok(projects) => OpResult::success(projects, "Projects loaded."),
        Err(err) => {
            error!("event=list_projects module=ops status=error error={err}");
            OpResult::failure("Failed to load projects.")
        }
    }
}

/// Updates a project's title and/or description.
pub fn update_project(
    conn: &Connection,
    id: ProjectId,
    title: Option<&str>,
    description: Option<&str>,
) -> OpResult<Project> {
    use crate::repo::project_repo::{ProjectRepoError, ProjectRepository, SqliteProjectRepository};
    if let Some(title) = title {
        if title.trim().is_empty() {
            error!("event=update_project module=ops status=error error_code=validation error=blank title");
            return OpResult::failure("Failed to update project. Please try again.");
        }
    }
    let repo = SqliteProjectRepository::new(conn);
    match repo.update_project(id, title.map(str::trim), description) {
        Ok(project) => {
            emit_view_invalidate(id);
            OpResult::success(project, "Project updated successfully!")
        }
        Err(ProjectRepoError::NotFound(_)) => OpResult::failure("Project not found."),
        Err(err) => {
            error!("event=update_project module=ops status=error error={err}");
            OpResult::failure("Failed to update project. Please try again.")
        }
    }
}

struct ServiceOutcome<T>(Result<T, String>);

impl ServiceOutcome<Section> {
    fn map_mutation(self, message: &str) -> OpResult<Section> {
        match self.0 {
            Ok(section) => {
                emit_view_invalidate(section.project_id);
                OpResult::success(section, message)
            }
            Err(error) => OpResult::failure(error),
        }
    }
}

/// Runs one use case against a fresh repository/service pair and flattens
/// every error into the generic failure message after logging it.
fn with_service<'conn, T>(
    conn: &'conn Connection,
    op: &str,
    failure_message: &str,
    f: impl FnOnce(
        &SectionService<SqliteSectionRepository<'conn>>,
    ) -> Result<T, SectionServiceError>,
) -> ServiceOutcome<T> {
    let repo = match SqliteSectionRepository::try_new(conn) {
        Ok(repo) => repo,
        Err(err) => {
            error!("event={op} module=ops status=error error_code=persistence error={err}");
            return ServiceOutcome(Err(failure_message.to_string()));
        }
    };
    let service = SectionService::new(repo);
    match f(&service) {
        Ok(value) => ServiceOutcome(Ok(value)),
        Err(err) => {
            error!(
                "event={op} module=ops status=error error_code={} error={err}",
                classify(&err)
            );
            ServiceOutcome(Err(failure_message.to_string()))
        }
    }
}

fn emit_view_invalidate(project_id: ProjectId) {
    info!("event=view_invalidate module=ops project_id={project_id}");
}

/// Stable error-code tag for the boundary log line.
fn classify(err: &SectionServiceError) -> &'static str {
    match err {
        SectionServiceError::InvalidId(_) | SectionServiceError::InvalidPosition(_) => "validation",
        SectionServiceError::SectionNotFound(_) | SectionServiceError::ProjectNotFound(_) => {
            "not_found"
        }
        SectionServiceError::NotTextSection(_) => "validation",
        SectionServiceError::Repo(repo_err) => classify_repo(repo_err),
    }
}

fn classify_repo(err: &SectionRepoError) -> &'static str {
    use crate::db::DbError;
    use rusqlite::ErrorCode;

    match err {
        SectionRepoError::Db(DbError::Sqlite(sqlite_err)) => match sqlite_err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => "conflict",
            Some(ErrorCode::ConstraintViolation) => "conflict",
            _ => "persistence",
        },
        SectionRepoError::InvalidData(_) => "conflict",
        _ => "persistence",
    }
}
