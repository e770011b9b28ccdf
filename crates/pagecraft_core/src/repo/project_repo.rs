//! Project repository contracts and SQLite implementation.
//!
//! Projects exist here as the foreign-key owner of sections; deleting one
//! cascades away its sections and their payloads.

use crate::db::DbError;
use crate::model::project::{Project, ProjectId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProjectRepoResult<T> = Result<T, ProjectRepoError>;

/// Errors from project persistence operations.
#[derive(Debug)]
pub enum ProjectRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target project does not exist.
    NotFound(ProjectId),
}

impl Display for ProjectRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
        }
    }
}

impl Error for ProjectRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<DbError> for ProjectRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ProjectRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    /// Creates one project row.
    fn create_project(&self, title: &str, description: Option<&str>)
        -> ProjectRepoResult<Project>;
    /// Loads one project by id.
    fn get_project(&self, id: ProjectId) -> ProjectRepoResult<Option<Project>>;
    /// Lists projects, newest first.
    fn list_projects(&self) -> ProjectRepoResult<Vec<Project>>;
    /// Updates title and/or description.
    fn update_project(
        &self,
        id: ProjectId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> ProjectRepoResult<Project>;
    /// Deletes one project; sections and payloads cascade.
    fn delete_project(&self, id: ProjectId) -> ProjectRepoResult<Project>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load(&self, id: ProjectId) -> ProjectRepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, created_at, updated_at
             FROM projects
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> ProjectRepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (title, description) VALUES (?1, ?2);",
            params![title, description],
        )?;
        let id = self.conn.last_insert_rowid();
        self.load(id)?.ok_or(ProjectRepoError::NotFound(id))
    }

    fn get_project(&self, id: ProjectId) -> ProjectRepoResult<Option<Project>> {
        self.load(id)
    }

    fn list_projects(&self) -> ProjectRepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, created_at, updated_at
             FROM projects
             ORDER BY created_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(
        &self,
        id: ProjectId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> ProjectRepoResult<Project> {
        let existing = self.load(id)?.ok_or(ProjectRepoError::NotFound(id))?;
        self.conn.execute(
            "UPDATE projects
             SET title = ?1,
                 description = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![
                title.unwrap_or(existing.title.as_str()),
                description.or(existing.description.as_deref()),
                id,
            ],
        )?;
        self.load(id)?.ok_or(ProjectRepoError::NotFound(id))
    }

    fn delete_project(&self, id: ProjectId) -> ProjectRepoResult<Project> {
        let existing = self.load(id)?.ok_or(ProjectRepoError::NotFound(id))?;
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        Ok(existing)
    }
}

fn parse_project_row(row: &Row<'_>) -> ProjectRepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
