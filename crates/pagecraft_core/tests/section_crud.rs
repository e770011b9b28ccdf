use pagecraft_core::db::migrations::latest_version;
use pagecraft_core::db::open_db_in_memory;
use pagecraft_core::{
    ProjectRepository, SectionRepoError, SectionRepository, SectionType, SqliteProjectRepository,
    SqliteSectionRepository, DEFAULT_TEXT_CONTENT,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed_project(conn: &Connection) -> i64 {
    let repo = SqliteProjectRepository::new(conn);
    repo.create_project("Portfolio", None).unwrap().id
}

#[test]
fn create_text_section_on_empty_project_starts_at_zero_with_default_content() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Text, None)
        .unwrap();

    assert_eq!(section.position, 0);
    assert_eq!(section.kind, SectionType::Text);
    assert_eq!(section.text_content(), Some(DEFAULT_TEXT_CONTENT));
}

#[test]
fn create_without_position_appends_after_current_max() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    repo.create_section(project_id, SectionType::Image, None)
        .unwrap();
    repo.create_section(project_id, SectionType::Video, Some(7))
        .unwrap();
    let appended = repo
        .create_section(project_id, SectionType::Layout, None)
        .unwrap();

    assert_eq!(appended.position, 8);
}

#[test]
fn create_with_explicit_position_does_not_reflow_siblings() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let first = repo
        .create_section(project_id, SectionType::Image, None)
        .unwrap();
    let second = repo
        .create_section(project_id, SectionType::Video, Some(0))
        .unwrap();

    // Both sit at raw position 0; only the normalizer closes collisions.
    let sections = repo.list_sections(project_id).unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].id, first.id);
    assert_eq!(sections[0].position, 0);
    assert_eq!(sections[1].position, 0);
}

#[test]
fn non_text_sections_carry_no_payload() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    for kind in [
        SectionType::Image,
        SectionType::Video,
        SectionType::TextImage,
        SectionType::Layout,
    ] {
        let section = repo.create_section(project_id, kind, None).unwrap();
        assert_eq!(section.text, None, "kind {kind:?} must not own a payload");
    }
}

#[test]
fn get_section_returns_none_for_unknown_id() {
    let conn = setup();
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    assert!(repo.get_section(4242).unwrap().is_none());
}

#[test]
fn create_for_unknown_project_fails() {
    let conn = setup();
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_section(99, SectionType::Text, None)
        .unwrap_err();
    assert!(matches!(err, SectionRepoError::ProjectNotFound(99)));
}

#[test]
fn update_into_text_creates_default_payload() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Image, None)
        .unwrap();
    let updated = repo
        .update_section(section.id, Some(SectionType::Text), None)
        .unwrap();

    assert_eq!(updated.kind, SectionType::Text);
    assert_eq!(updated.text_content(), Some(DEFAULT_TEXT_CONTENT));
}

#[test]
fn update_away_from_text_drops_payload() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Text, None)
        .unwrap();
    let updated = repo
        .update_section(section.id, Some(SectionType::Image), None)
        .unwrap();
    assert_eq!(updated.text, None);

    let payloads: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM texts WHERE section_id = ?1;",
            [section.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(payloads, 0);
}

#[test]
fn update_keeps_existing_text_content() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Text, None)
        .unwrap();
    repo.update_text_content(section.id, "<p>custom</p>").unwrap();

    let moved = repo.update_section(section.id, None, Some(5)).unwrap();
    assert_eq!(moved.position, 5);
    assert_eq!(moved.text_content(), Some("<p>custom</p>"));
}

#[test]
fn update_unknown_section_fails() {
    let conn = setup();
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let err = repo
        .update_section(7, Some(SectionType::Layout), None)
        .unwrap_err();
    assert!(matches!(err, SectionRepoError::SectionNotFound(7)));
}

#[test]
fn plain_delete_leaves_sibling_positions_untouched() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    repo.create_section(project_id, SectionType::Image, None)
        .unwrap();
    let middle = repo
        .create_section(project_id, SectionType::Video, None)
        .unwrap();
    repo.create_section(project_id, SectionType::Layout, None)
        .unwrap();

    repo.delete_section(middle.id).unwrap();

    let positions: Vec<i64> = repo
        .list_sections(project_id)
        .unwrap()
        .iter()
        .map(|section| section.position)
        .collect();
    assert_eq!(positions, vec![0, 2]);
}

#[test]
fn update_text_content_upserts_payload() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Text, None)
        .unwrap();
    let updated = repo
        .update_text_content(section.id, "<h2>About</h2>")
        .unwrap();
    assert_eq!(updated.text_content(), Some("<h2>About</h2>"));

    let payloads: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM texts WHERE section_id = ?1;",
            [section.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(payloads, 1);
}

#[test]
fn update_text_content_rejects_non_text_section() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    let section = repo
        .create_section(project_id, SectionType::Image, None)
        .unwrap();
    let err = repo
        .update_text_content(section.id, "<p>nope</p>")
        .unwrap_err();
    assert!(matches!(err, SectionRepoError::NotTextSection(id) if id == section.id));
}

#[test]
fn deleting_project_cascades_sections_and_payloads() {
    let conn = setup();
    let project_id = seed_project(&conn);
    {
        let repo = SqliteSectionRepository::try_new(&conn).unwrap();
        repo.create_section(project_id, SectionType::Text, None)
            .unwrap();
        repo.create_section(project_id, SectionType::Image, None)
            .unwrap();
    }

    let projects = SqliteProjectRepository::new(&conn);
    projects.delete_project(project_id).unwrap();

    let (sections, payloads): (i64, i64) = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM sections), (SELECT COUNT(*) FROM texts);",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(sections, 0);
    assert_eq!(payloads, 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteSectionRepository::try_new(&conn) {
        Err(SectionRepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteSectionRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(SectionRepoError::MissingRequiredTable("projects"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_section_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE projects (id INTEGER PRIMARY KEY);
         CREATE TABLE sections (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL,
            type TEXT NOT NULL
         );
         CREATE TABLE texts (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL,
            content TEXT NOT NULL
         );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteSectionRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(SectionRepoError::MissingRequiredColumn {
            table: "sections",
            column: "position"
        })
    ));
}
