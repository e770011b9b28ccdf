//! Section repository: store contract, position allocation, normalization
//! and reconciliation over SQLite.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `sections`/`texts` storage.
//! - Keep a project's positions contiguous, zero-based and unique at the
//!   end of every completed operation.
//! - Diff client-proposed full section lists against persisted state.
//!
//! # Invariants
//! - Multi-row position shifts commit atomically; a concurrent reader never
//!   observes a half-applied shift.
//! - A `text` section always ends an operation with exactly one payload row;
//!   every other kind ends with none.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::project::ProjectId;
use crate::model::section::{
    Section, SectionDraft, SectionId, SectionType, TextPayload, DEFAULT_TEXT_CONTENT,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SECTION_SELECT_SQL: &str = "SELECT
    s.id AS id,
    s.project_id AS project_id,
    s.type AS type,
    s.position AS position,
    s.created_at AS created_at,
    s.updated_at AS updated_at,
    t.content AS text_content
 FROM sections s
 LEFT JOIN texts t ON t.section_id = s.id";

const TOUCH_UPDATED_AT: &str = "(strftime('%s', 'now') * 1000)";

pub type SectionRepoResult<T> = Result<T, SectionRepoError>;

/// Errors from section persistence and ordering operations.
#[derive(Debug)]
pub enum SectionRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target section does not exist.
    SectionNotFound(SectionId),
    /// Owning project does not exist.
    ProjectNotFound(ProjectId),
    /// Payload write attempted on a section that is not `text` kind.
    NotTextSection(SectionId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for SectionRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::NotTextSection(id) => {
                write!(f, "section {id} is not a text section")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "section repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "section repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "section repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid section data: {message}"),
        }
    }
}

impl Error for SectionRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SectionRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SectionRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of reconciling a client-proposed section list against storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Sections created by the proposal, in proposal order, final state.
    pub created: Vec<Section>,
    /// Sections updated by the proposal, in proposal order, final state.
    pub updated: Vec<Section>,
    /// Sections deleted because the proposal omitted them (pre-delete state).
    pub deleted: Vec<Section>,
    /// Full persisted list after normalization, ordered by position.
    pub sections: Vec<Section>,
}

/// Repository interface for section storage and ordering operations.
pub trait SectionRepository {
    /// Creates one section. Without an explicit position the next free slot
    /// (`max + 1`) is used; an explicit position is written as-is and does
    /// not reflow siblings.
    fn create_section(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        position: Option<i64>,
    ) -> SectionRepoResult<Section>;
    /// Loads one section with its payload.
    fn get_section(&self, id: SectionId) -> SectionRepoResult<Option<Section>>;
    /// Lists a project's sections ordered `position ASC, id ASC`.
    fn list_sections(&self, project_id: ProjectId) -> SectionRepoResult<Vec<Section>>;
    /// Updates kind and/or position in place; payload existence is
    /// re-reconciled when the kind changes.
    fn update_section(
        &self,
        id: SectionId,
        kind: Option<SectionType>,
        position: Option<i64>,
    ) -> SectionRepoResult<Section>;
    /// Deletes one section without reflowing siblings. Payload cascades.
    fn delete_section(&self, id: SectionId) -> SectionRepoResult<Section>;
    /// Overwrites (or creates) the text payload of a `text` section.
    fn update_text_content(
        &self,
        section_id: SectionId,
        content: &str,
    ) -> SectionRepoResult<Section>;
    /// Next free position for the project: `max(position) + 1`, or 0.
    fn next_position(&self, project_id: ProjectId) -> SectionRepoResult<i64>;
    /// Shifts every sibling at `position >= insert_at_position` up by one,
    /// then creates the new section in the opened slot, atomically.
    fn create_section_with_reorder(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        insert_at_position: i64,
    ) -> SectionRepoResult<Section>;
    /// Deletes one section and closes the gap it leaves, atomically.
    fn delete_section_with_reorder(&self, section_id: SectionId) -> SectionRepoResult<Section>;
    /// Assigns `position = index` for each listed id. Unlisted sections are
    /// left unmoved; an unknown id aborts the whole transaction.
    fn reorder_sections(
        &self,
        project_id: ProjectId,
        section_ids: &[SectionId],
    ) -> SectionRepoResult<()>;
    /// Rewrites the project's positions to `0..n-1`. Idempotent.
    fn normalize_positions(&self, project_id: ProjectId) -> SectionRepoResult<()>;
    /// Updates in place when `id` is given, creates otherwise; the text
    /// payload is reconciled against the desired content either way.
    fn upsert_section(
        &self,
        id: Option<SectionId>,
        project_id: ProjectId,
        kind: SectionType,
        position: i64,
        text_content: Option<&str>,
    ) -> SectionRepoResult<Section>;
    /// Applies the minimal create/update/delete diff that makes persisted
    /// state match the proposal, then normalizes positions.
    fn reconcile_sections(
        &self,
        project_id: ProjectId,
        proposal: &[SectionDraft],
    ) -> SectionRepoResult<ReconcileOutcome>;
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> SectionRepoResult<Self> {
        ensure_section_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn create_section(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        position: Option<i64>,
    ) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        let position = match position {
            Some(value) => value,
            None => next_position_in(&tx, project_id)?,
        };

        tx.execute(
            "INSERT INTO sections (project_id, type, position)
             VALUES (?1, ?2, ?3);",
            params![project_id, section_type_to_db(kind), position],
        )?;
        let id = tx.last_insert_rowid();

        if kind == SectionType::Text {
            insert_text_payload(&tx, id, DEFAULT_TEXT_CONTENT)?;
        }

        let section = load_required_section(&tx, id)?;
        tx.commit()?;
        Ok(section)
    }

    fn get_section(&self, id: SectionId) -> SectionRepoResult<Option<Section>> {
        load_section(self.conn, id)
    }

    fn list_sections(&self, project_id: ProjectId) -> SectionRepoResult<Vec<Section>> {
        list_project_sections(self.conn, project_id)
    }

    fn update_section(
        &self,
        id: SectionId,
        kind: Option<SectionType>,
        position: Option<i64>,
    ) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_section(&tx, id)?.ok_or(SectionRepoError::SectionNotFound(id))?;

        let new_kind = kind.unwrap_or(existing.kind);
        let new_position = position.unwrap_or(existing.position);

        tx.execute(
            &format!(
                "UPDATE sections
                 SET type = ?1,
                     position = ?2,
                     updated_at = {TOUCH_UPDATED_AT}
                 WHERE id = ?3;"
            ),
            params![section_type_to_db(new_kind), new_position, id],
        )?;

        reconcile_payload(&tx, id, new_kind, None, false)?;

        let section = load_required_section(&tx, id)?;
        tx.commit()?;
        Ok(section)
    }

    fn delete_section(&self, id: SectionId) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_section(&tx, id)?.ok_or(SectionRepoError::SectionNotFound(id))?;
        tx.execute("DELETE FROM sections WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(existing)
    }

    fn update_text_content(
        &self,
        section_id: SectionId,
        content: &str,
    ) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_section(&tx, section_id)?
            .ok_or(SectionRepoError::SectionNotFound(section_id))?;
        if existing.kind != SectionType::Text {
            return Err(SectionRepoError::NotTextSection(section_id));
        }

        upsert_text_payload(&tx, section_id, content)?;

        let section = load_required_section(&tx, section_id)?;
        tx.commit()?;
        Ok(section)
    }

    fn next_position(&self, project_id: ProjectId) -> SectionRepoResult<i64> {
        next_position_in(self.conn, project_id)
    }

    fn create_section_with_reorder(
        &self,
        project_id: ProjectId,
        kind: SectionType,
        insert_at_position: i64,
    ) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        tx.execute(
            &format!(
                "UPDATE sections
                 SET position = position + 1,
                     updated_at = {TOUCH_UPDATED_AT}
                 WHERE project_id = ?1
                   AND position >= ?2;"
            ),
            params![project_id, insert_at_position],
        )?;

        tx.execute(
            "INSERT INTO sections (project_id, type, position)
             VALUES (?1, ?2, ?3);",
            params![project_id, section_type_to_db(kind), insert_at_position],
        )?;
        let id = tx.last_insert_rowid();

        if kind == SectionType::Text {
            insert_text_payload(&tx, id, DEFAULT_TEXT_CONTENT)?;
        }

        let section = load_required_section(&tx, id)?;
        tx.commit()?;
        Ok(section)
    }

    fn delete_section_with_reorder(&self, section_id: SectionId) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_section(&tx, section_id)?
            .ok_or(SectionRepoError::SectionNotFound(section_id))?;

        tx.execute("DELETE FROM sections WHERE id = ?1;", [section_id])?;

        tx.execute(
            &format!(
                "UPDATE sections
                 SET position = position - 1,
                     updated_at = {TOUCH_UPDATED_AT}
                 WHERE project_id = ?1
                   AND position > ?2;"
            ),
            params![existing.project_id, existing.position],
        )?;

        tx.commit()?;
        Ok(existing)
    }

    fn reorder_sections(
        &self,
        project_id: ProjectId,
        section_ids: &[SectionId],
    ) -> SectionRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        for (index, section_id) in section_ids.iter().enumerate() {
            let changed = tx.execute(
                &format!(
                    "UPDATE sections
                     SET position = ?1,
                         updated_at = {TOUCH_UPDATED_AT}
                     WHERE id = ?2
                       AND project_id = ?3;"
                ),
                params![index as i64, section_id, project_id],
            )?;
            if changed == 0 {
                return Err(SectionRepoError::SectionNotFound(*section_id));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn normalize_positions(&self, project_id: ProjectId) -> SectionRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        normalize_in(&tx, project_id)?;
        tx.commit()?;
        Ok(())
    }

    fn upsert_section(
        &self,
        id: Option<SectionId>,
        project_id: ProjectId,
        kind: SectionType,
        position: i64,
        text_content: Option<&str>,
    ) -> SectionRepoResult<Section> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let section_id = match id {
            Some(id) => {
                let changed = tx.execute(
                    &format!(
                        "UPDATE sections
                         SET type = ?1,
                             position = ?2,
                             updated_at = {TOUCH_UPDATED_AT}
                         WHERE id = ?3;"
                    ),
                    params![section_type_to_db(kind), position, id],
                )?;
                if changed == 0 {
                    return Err(SectionRepoError::SectionNotFound(id));
                }
                reconcile_payload(&tx, id, kind, text_content, text_content.is_some())?;
                id
            }
            None => {
                ensure_project_exists(&tx, project_id)?;
                tx.execute(
                    "INSERT INTO sections (project_id, type, position)
                     VALUES (?1, ?2, ?3);",
                    params![project_id, section_type_to_db(kind), position],
                )?;
                let id = tx.last_insert_rowid();
                if kind == SectionType::Text {
                    insert_text_payload(&tx, id, text_content.unwrap_or(DEFAULT_TEXT_CONTENT))?;
                }
                id
            }
        };

        let section = load_required_section(&tx, section_id)?;
        tx.commit()?;
        Ok(section)
    }

    fn reconcile_sections(
        &self,
        project_id: ProjectId,
        proposal: &[SectionDraft],
    ) -> SectionRepoResult<ReconcileOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        let existing = list_project_sections(&tx, project_id)?;

        // Step 1: drop persisted sections the proposal no longer lists.
        let mut proposal_rank: HashMap<SectionId, usize> = HashMap::new();
        for (index, entry) in proposal.iter().enumerate() {
            if let Some(id) = entry.id {
                proposal_rank.insert(id, index);
            }
        }

        let mut deleted = Vec::new();
        for section in &existing {
            if !proposal_rank.contains_key(&section.id) {
                tx.execute("DELETE FROM sections WHERE id = ?1;", [section.id])?;
                deleted.push(section.clone());
            }
        }

        // Step 2: apply updates, then creations, in proposal order.
        let mut updated_ids = Vec::new();
        let mut created_ids = Vec::new();
        for (index, entry) in proposal.iter().enumerate() {
            match entry.id {
                Some(id) => {
                    let changed = tx.execute(
                        &format!(
                            "UPDATE sections
                             SET type = ?1,
                                 position = ?2,
                                 updated_at = {TOUCH_UPDATED_AT}
                             WHERE id = ?3
                               AND project_id = ?4;"
                        ),
                        params![section_type_to_db(entry.kind), entry.position, id, project_id],
                    )?;
                    if changed == 0 {
                        return Err(SectionRepoError::SectionNotFound(id));
                    }
                    reconcile_payload(
                        &tx,
                        id,
                        entry.kind,
                        Some(entry.text.as_deref().unwrap_or(DEFAULT_TEXT_CONTENT)),
                        true,
                    )?;
                    updated_ids.push(id);
                }
                None => {
                    tx.execute(
                        "INSERT INTO sections (project_id, type, position)
                         VALUES (?1, ?2, ?3);",
                        params![project_id, section_type_to_db(entry.kind), entry.position],
                    )?;
                    let id = tx.last_insert_rowid();
                    if entry.kind == SectionType::Text {
                        insert_text_payload(
                            &tx,
                            id,
                            entry.text.as_deref().unwrap_or(DEFAULT_TEXT_CONTENT),
                        )?;
                    }
                    proposal_rank.insert(id, index);
                    created_ids.push(id);
                }
            }
        }

        // Step 3: final ordering pass. Raw positions decide the order; ties
        // fall back to the entry's index in the proposal, then row id.
        let mut rows: Vec<(SectionId, i64)> = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT id, position
                 FROM sections
                 WHERE project_id = ?1
                 ORDER BY position ASC, id ASC;",
            )?;
            let mut result = stmt.query([project_id])?;
            while let Some(row) = result.next()? {
                rows.push((row.get(0)?, row.get(1)?));
            }
        }
        rows.sort_by_key(|(id, position)| {
            (*position, proposal_rank.get(id).copied().unwrap_or(usize::MAX), *id)
        });
        for (index, (id, position)) in rows.iter().enumerate() {
            if *position != index as i64 {
                tx.execute(
                    &format!(
                        "UPDATE sections
                         SET position = ?1,
                             updated_at = {TOUCH_UPDATED_AT}
                         WHERE id = ?2;"
                    ),
                    params![index as i64, id],
                )?;
            }
        }

        let sections = list_project_sections(&tx, project_id)?;
        let by_id: HashMap<SectionId, Section> = sections
            .iter()
            .map(|section| (section.id, section.clone()))
            .collect();

        let created = collect_by_ids(&by_id, &created_ids)?;
        let updated = collect_by_ids(&by_id, &updated_ids)?;

        tx.commit()?;
        Ok(ReconcileOutcome {
            created,
            updated,
            deleted,
            sections,
        })
    }
}

fn collect_by_ids(
    by_id: &HashMap<SectionId, Section>,
    ids: &[SectionId],
) -> SectionRepoResult<Vec<Section>> {
    ids.iter()
        .map(|id| {
            by_id
                .get(id)
                .cloned()
                .ok_or(SectionRepoError::SectionNotFound(*id))
        })
        .collect()
}

fn ensure_project_exists(conn: &Connection, project_id: ProjectId) -> SectionRepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
        [project_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(SectionRepoError::ProjectNotFound(project_id));
    }
    Ok(())
}

fn next_position_in(conn: &Connection, project_id: ProjectId) -> SectionRepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1
         FROM sections
         WHERE project_id = ?1;",
        [project_id],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn normalize_in(conn: &Connection, project_id: ProjectId) -> SectionRepoResult<()> {
    let mut rows: Vec<(SectionId, i64)> = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT id, position
             FROM sections
             WHERE project_id = ?1
             ORDER BY position ASC, id ASC;",
        )?;
        let mut result = stmt.query([project_id])?;
        while let Some(row) = result.next()? {
            rows.push((row.get(0)?, row.get(1)?));
        }
    }

    // Rows already at their index are left untouched so a repeat run leaves
    // stored state (timestamps included) byte-identical.
    for (index, (id, position)) in rows.iter().enumerate() {
        if *position != index as i64 {
            conn.execute(
                &format!(
                    "UPDATE sections
                     SET position = ?1,
                         updated_at = {TOUCH_UPDATED_AT}
                     WHERE id = ?2;"
                ),
                params![index as i64, id],
            )?;
        }
    }
    Ok(())
}

fn insert_text_payload(
    conn: &Connection,
    section_id: SectionId,
    content: &str,
) -> SectionRepoResult<()> {
    conn.execute(
        "INSERT INTO texts (section_id, content) VALUES (?1, ?2);",
        params![section_id, content],
    )?;
    Ok(())
}

fn upsert_text_payload(
    conn: &Connection,
    section_id: SectionId,
    content: &str,
) -> SectionRepoResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO texts (section_id, content)
             VALUES (?1, ?2)
             ON CONFLICT (section_id)
             DO UPDATE SET content = excluded.content,
                           updated_at = {TOUCH_UPDATED_AT};"
        ),
        params![section_id, content],
    )?;
    Ok(())
}

/// Brings a section's payload in line with its (possibly new) kind.
///
/// `text` kind: the payload is created when missing; existing content is
/// overwritten only when `overwrite` is set and `content` is provided.
/// Any other kind: a leftover payload is dropped.
fn reconcile_payload(
    conn: &Connection,
    section_id: SectionId,
    kind: SectionType,
    content: Option<&str>,
    overwrite: bool,
) -> SectionRepoResult<()> {
    if kind == SectionType::Text {
        if overwrite {
            upsert_text_payload(conn, section_id, content.unwrap_or(DEFAULT_TEXT_CONTENT))?;
        } else {
            conn.execute(
                "INSERT OR IGNORE INTO texts (section_id, content) VALUES (?1, ?2);",
                params![section_id, content.unwrap_or(DEFAULT_TEXT_CONTENT)],
            )?;
        }
    } else {
        conn.execute("DELETE FROM texts WHERE section_id = ?1;", [section_id])?;
    }
    Ok(())
}

fn load_section(conn: &Connection, id: SectionId) -> SectionRepoResult<Option<Section>> {
    let mut stmt = conn.prepare(&format!("{SECTION_SELECT_SQL} WHERE s.id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_section_row(row)?));
    }
    Ok(None)
}

fn load_required_section(conn: &Connection, id: SectionId) -> SectionRepoResult<Section> {
    load_section(conn, id)?.ok_or(SectionRepoError::SectionNotFound(id))
}

fn list_project_sections(
    conn: &Connection,
    project_id: ProjectId,
) -> SectionRepoResult<Vec<Section>> {
    let mut stmt = conn.prepare(&format!(
        "{SECTION_SELECT_SQL}
         WHERE s.project_id = ?1
         ORDER BY s.position ASC, s.id ASC;"
    ))?;
    let mut rows = stmt.query([project_id])?;
    let mut sections = Vec::new();
    while let Some(row) = rows.next()? {
        sections.push(parse_section_row(row)?);
    }
    Ok(sections)
}

fn parse_section_row(row: &Row<'_>) -> SectionRepoResult<Section> {
    let id: SectionId = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = parse_section_type(&type_text).ok_or_else(|| {
        SectionRepoError::InvalidData(format!("invalid section type `{type_text}` in sections.type"))
    })?;

    let text_content: Option<String> = row.get("text_content")?;
    let text = match (kind, text_content) {
        (SectionType::Text, Some(content)) => Some(TextPayload { content }),
        (SectionType::Text, None) => {
            return Err(SectionRepoError::InvalidData(format!(
                "text section {id} has no text payload"
            )));
        }
        (_, Some(_)) => {
            return Err(SectionRepoError::InvalidData(format!(
                "non-text section {id} has a text payload"
            )));
        }
        (_, None) => None,
    };

    Ok(Section {
        id,
        project_id: row.get("project_id")?,
        kind,
        position: row.get("position")?,
        text,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn section_type_to_db(kind: SectionType) -> &'static str {
    match kind {
        SectionType::Text => "text",
        SectionType::Image => "image",
        SectionType::Video => "video",
        SectionType::TextImage => "text_image",
        SectionType::Layout => "layout",
    }
}

fn parse_section_type(value: &str) -> Option<SectionType> {
    match value {
        "text" => Some(SectionType::Text),
        "image" => Some(SectionType::Image),
        "video" => Some(SectionType::Video),
        "text_image" => Some(SectionType::TextImage),
        "layout" => Some(SectionType::Layout),
        _ => None,
    }
}

fn ensure_section_connection_ready(conn: &Connection) -> SectionRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(SectionRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["projects", "sections", "texts"] {
        if !table_exists(conn, table)? {
            return Err(SectionRepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "project_id", "type", "position", "created_at", "updated_at"] {
        if !table_has_column(conn, "sections", column)? {
            return Err(SectionRepoError::MissingRequiredColumn {
                table: "sections",
                column,
            });
        }
    }

    for column in ["section_id", "content"] {
        if !table_has_column(conn, "texts", column)? {
            return Err(SectionRepoError::MissingRequiredColumn {
                table: "texts",
                column,
            });
        }
    }

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> SectionRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> SectionRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
