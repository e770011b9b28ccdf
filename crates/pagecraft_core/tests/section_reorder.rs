use pagecraft_core::db::open_db_in_memory;
use pagecraft_core::{
    ProjectRepository, SectionRepoError, SectionRepository, SectionType, SqliteProjectRepository,
    SqliteSectionRepository,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn seed_project(conn: &Connection) -> i64 {
    let repo = SqliteProjectRepository::new(conn);
    repo.create_project("Portfolio", None).unwrap().id
}

fn seed_three_sections(repo: &SqliteSectionRepository<'_>, project_id: i64) -> (i64, i64, i64) {
    let a = repo
        .create_section(project_id, SectionType::Text, None)
        .unwrap();
    let b = repo
        .create_section(project_id, SectionType::Image, None)
        .unwrap();
    let c = repo
        .create_section(project_id, SectionType::Video, None)
        .unwrap();
    (a.id, b.id, c.id)
}

fn positions_by_id(repo: &SqliteSectionRepository<'_>, project_id: i64) -> Vec<(i64, i64)> {
    repo.list_sections(project_id)
        .unwrap()
        .iter()
        .map(|section| (section.id, section.position))
        .collect()
}

#[test]
fn delete_with_reorder_closes_the_gap() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    let removed = repo.delete_section_with_reorder(b).unwrap();
    assert_eq!(removed.id, b);
    assert_eq!(removed.position, 1);

    assert_eq!(positions_by_id(&repo, project_id), vec![(a, 0), (c, 1)]);
}

#[test]
fn delete_with_reorder_of_last_section_shifts_nothing() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    repo.delete_section_with_reorder(c).unwrap();

    assert_eq!(positions_by_id(&repo, project_id), vec![(a, 0), (b, 1)]);
}

#[test]
fn reorder_assigns_positions_by_list_index() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    repo.reorder_sections(project_id, &[c, a, b]).unwrap();

    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(c, 0), (a, 1), (b, 2)]
    );
}

#[test]
fn reorder_with_unknown_id_rolls_back_every_assignment() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    let err = repo
        .reorder_sections(project_id, &[c, 4242, a])
        .unwrap_err();
    assert!(matches!(err, SectionRepoError::SectionNotFound(4242)));

    // The write to `c` preceded the failure and must not survive it.
    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(a, 0), (b, 1), (c, 2)]
    );
}

#[test]
fn reorder_leaves_unlisted_sections_unmoved() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    repo.reorder_sections(project_id, &[b, a]).unwrap();

    // `c` keeps its raw position 2; a later normalize pass owns collisions.
    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(b, 0), (a, 1), (c, 2)]
    );
}

#[test]
fn create_with_reorder_shifts_trailing_siblings_up() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    let inserted = repo
        .create_section_with_reorder(project_id, SectionType::Layout, 1)
        .unwrap();
    assert_eq!(inserted.position, 1);

    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(a, 0), (inserted.id, 1), (b, 2), (c, 3)]
    );
}

#[test]
fn create_with_reorder_at_end_shifts_nothing() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    let appended = repo
        .create_section_with_reorder(project_id, SectionType::Image, 3)
        .unwrap();

    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(a, 0), (b, 1), (c, 2), (appended.id, 3)]
    );
}

#[test]
fn normalize_closes_gaps_and_duplicates() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    conn.execute("UPDATE sections SET position = 7 WHERE id = ?1;", [a])
        .unwrap();
    conn.execute("UPDATE sections SET position = 3 WHERE id = ?1;", [b])
        .unwrap();
    conn.execute("UPDATE sections SET position = 3 WHERE id = ?1;", [c])
        .unwrap();

    repo.normalize_positions(project_id).unwrap();

    // Duplicate positions break by id ascending.
    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(b, 0), (c, 1), (a, 2)]
    );
}

#[test]
fn normalize_is_idempotent_including_timestamps() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, _, _) = seed_three_sections(&repo, project_id);

    conn.execute("UPDATE sections SET position = 9 WHERE id = ?1;", [a])
        .unwrap();
    repo.normalize_positions(project_id).unwrap();

    let snapshot_rows = |conn: &Connection| -> Vec<(i64, i64, i64)> {
        let mut stmt = conn
            .prepare("SELECT id, position, updated_at FROM sections ORDER BY id;")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap();
        rows.map(|row| row.unwrap()).collect()
    };

    let before = snapshot_rows(&conn);
    repo.normalize_positions(project_id).unwrap();
    let after = snapshot_rows(&conn);

    assert_eq!(before, after);
}

#[test]
fn normalize_on_empty_project_is_a_no_op() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();

    repo.normalize_positions(project_id).unwrap();
    assert!(repo.list_sections(project_id).unwrap().is_empty());
}

#[test]
fn delete_with_reorder_rolls_back_when_shift_fails() {
    let conn = setup();
    let project_id = seed_project(&conn);
    let repo = SqliteSectionRepository::try_new(&conn).unwrap();
    let (a, b, c) = seed_three_sections(&repo, project_id);

    conn.execute_batch(
        "CREATE TRIGGER block_position_shift
         BEFORE UPDATE OF position ON sections
         BEGIN
             SELECT RAISE(ABORT, 'position shift blocked');
         END;",
    )
    .unwrap();

    let result = repo.delete_section_with_reorder(b);
    assert!(result.is_err());

    conn.execute_batch("DROP TRIGGER block_position_shift;")
        .unwrap();

    // The delete preceded the failing shift and must have been rolled back.
    assert_eq!(
        positions_by_id(&repo, project_id),
        vec![(a, 0), (b, 1), (c, 2)]
    );
}
