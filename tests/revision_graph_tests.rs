//! Revision graph validation and path resolution

use sheets_migrate::revisions::{self, baseline, spell_table};
use sheets_migrate::{
    Direction, MemoryBackend, MigrateError, Migrator, Revision, RevisionGraph, SchemaBackend,
    TargetSpec,
};

fn chain(ids: &[&str]) -> Vec<Revision> {
    let mut parent: Option<&str> = None;
    ids.iter()
        .map(|id| {
            let revision = Revision::new(*id, parent);
            parent = Some(*id);
            revision
        })
        .collect()
}

#[test]
fn test_two_roots_are_rejected_up_front() {
    let mut revisions = chain(&["aaaa00000001", "aaaa00000002"]);
    revisions.push(Revision::new("bbbb00000001", None));

    match RevisionGraph::new(revisions).unwrap_err() {
        MigrateError::DisjointGraph { roots } => {
            assert_eq!(roots.len(), 2);
            assert!(roots.contains(&"aaaa00000001".to_string()));
            assert!(roots.contains(&"bbbb00000001".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_branch_is_rejected() {
    let mut revisions = chain(&["aaaa00000001", "aaaa00000002"]);
    revisions.push(Revision::new("aaaa00000003", Some("aaaa00000001")));

    assert!(matches!(
        RevisionGraph::new(revisions).unwrap_err(),
        MigrateError::BranchedGraph { ref parent, .. } if parent == "aaaa00000001"
    ));
}

#[test]
fn test_dangling_parent_is_rejected() {
    let revisions = vec![
        Revision::new("aaaa00000001", None),
        Revision::new("aaaa00000002", Some("ffff00000000")),
    ];
    assert!(matches!(
        RevisionGraph::new(revisions).unwrap_err(),
        MigrateError::UnknownRevision(ref id) if id == "ffff00000000"
    ));
}

#[test]
fn test_duplicate_id_is_rejected() {
    let mut revisions = chain(&["aaaa00000001", "aaaa00000002"]);
    revisions.push(Revision::new("aaaa00000002", Some("aaaa00000001")));
    assert!(matches!(
        RevisionGraph::new(revisions).unwrap_err(),
        MigrateError::DuplicateRevision(_)
    ));
}

#[test]
fn test_path_forward_and_back() {
    let graph = RevisionGraph::new(chain(&["a1", "b2", "c3", "d4"])).unwrap();

    let up = graph.path_from(Some("a1"), Some("d4")).unwrap();
    assert_eq!(up.direction, Direction::Upgrade);
    let ids: Vec<&str> = up.steps.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["b2", "c3", "d4"]);

    let down = graph.path_from(Some("d4"), Some("a1")).unwrap();
    assert_eq!(down.direction, Direction::Downgrade);
    let ids: Vec<&str> = down.steps.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["d4", "c3", "b2"]);

    let from_base = graph.path_from(None, Some("b2")).unwrap();
    assert_eq!(from_base.len(), 2);

    let to_base = graph.path_from(Some("b2"), None).unwrap();
    let ids: Vec<&str> = to_base.steps.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["b2", "a1"]);

    assert!(graph.path_from(Some("c3"), Some("c3")).unwrap().is_empty());
}

#[test]
fn test_unknown_ids_in_path() {
    let graph = RevisionGraph::new(chain(&["a1", "b2"])).unwrap();
    assert!(matches!(
        graph.path_from(Some("zz"), Some("b2")).unwrap_err(),
        MigrateError::UnknownRevision(_)
    ));
    assert!(matches!(
        graph.path_from(Some("a1"), Some("zz")).unwrap_err(),
        MigrateError::UnknownRevision(_)
    ));
}

#[test]
fn test_target_spec_resolution() {
    let graph = revisions::graph().unwrap();

    assert_eq!(
        graph.resolve(&TargetSpec::Head, None).unwrap().as_deref(),
        Some(spell_table::REVISION)
    );
    assert_eq!(graph.resolve(&TargetSpec::Base, None).unwrap(), None);
    assert_eq!(
        graph.resolve(&"+1".parse().unwrap(), None).unwrap().as_deref(),
        Some(baseline::REVISION)
    );
    assert_eq!(
        graph
            .resolve(&"-1".parse().unwrap(), Some(spell_table::REVISION))
            .unwrap()
            .as_deref(),
        Some(baseline::REVISION)
    );
    assert_eq!(
        graph.resolve(&"d4d2".parse().unwrap(), None).unwrap().as_deref(),
        Some(spell_table::REVISION)
    );
    assert!(graph.resolve(&"+3".parse().unwrap(), None).is_err());
}

#[test]
fn test_stamp_moves_pointer_without_ddl() {
    let backend = MemoryBackend::new();
    let migrator = Migrator::new(revisions::graph().unwrap(), backend.clone());

    let stamped = migrator.stamp(&TargetSpec::Head).unwrap();
    assert_eq!(stamped.as_deref(), Some(spell_table::REVISION));
    assert!(backend.load().unwrap().catalog.is_empty());

    migrator.stamp(&TargetSpec::Base).unwrap();
    assert_eq!(migrator.current().unwrap(), None);
}

#[test]
fn test_plan_renders_sql_without_running() {
    let backend = MemoryBackend::new();
    let migrator = Migrator::new(revisions::graph().unwrap(), backend.clone());

    let plan = migrator.plan(Direction::Upgrade, &TargetSpec::Head).unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan[0].statements.is_empty());
    assert_eq!(plan[1].revision, spell_table::REVISION);
    assert!(plan[1].statements[0].starts_with("CREATE TABLE spell ("));
    assert_eq!(
        plan[1].statements[1],
        "CREATE INDEX ix_spell_created_at ON spell (created_at);"
    );
    assert_eq!(
        plan[1].statements[2],
        "CREATE UNIQUE INDEX ix_spell_name ON spell (name);"
    );

    assert_eq!(migrator.current().unwrap(), None);
    assert!(backend.load().unwrap().catalog.is_empty());

    assert!(matches!(
        migrator.plan(Direction::Downgrade, &TargetSpec::Head).unwrap_err(),
        MigrateError::InvalidDirection { .. }
    ));
}

#[test]
fn test_history_flags_current_and_head() {
    let migrator = Migrator::new(revisions::graph().unwrap(), MemoryBackend::new());
    migrator.upgrade_to(baseline::REVISION).unwrap();

    let history = migrator.history().unwrap();
    assert_eq!(history.len(), 2);

    assert_eq!(history[0].revision, baseline::REVISION);
    assert!(history[0].applied);
    assert!(history[0].current);
    assert!(history[0].applied_at.is_some());

    assert_eq!(history[1].revision, spell_table::REVISION);
    assert!(!history[1].applied);
    assert!(history[1].head);
    assert_eq!(
        history[1].to_string(),
        "3fb13bacd9e0 -> d4d2b2fce5f8 (head), spell_table"
    );
}

#[test]
fn test_render_sql_downgrade_script() {
    let migrator = Migrator::new(revisions::graph().unwrap(), MemoryBackend::new());
    migrator.upgrade_to_latest().unwrap();

    let script = migrator
        .render_sql(Direction::Downgrade, &TargetSpec::Base)
        .unwrap();
    assert!(script.starts_with("-- Running d4d2b2fce5f8 spell_table\nDROP INDEX ix_spell_name;\n"));
    assert!(script.contains("DROP TABLE spell;\n"));
    assert!(script.contains("-- Running 3fb13bacd9e0 baseline\n"));
    assert_eq!(migrator.current().unwrap().as_deref(), Some(spell_table::REVISION));
}
