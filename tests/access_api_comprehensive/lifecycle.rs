//! Lifecycle Tests
//!
//! - Forward-only status machine
//! - Transitions gated at the write threshold
//! - Gated reads

use crate::*;
use warden::Error;

#[test]
fn test_full_happy_path() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);

    assert_eq!(t.db.runs.get(run).unwrap().status, RunStatus::Pending);
    assert_eq!(t.db.runs.start_as(ada, run).unwrap().status, RunStatus::Running);
    assert_eq!(t.db.runs.fail_as(ada, run).unwrap().status, RunStatus::Failed);
}

#[test]
fn test_terminal_statuses_reject_everything() {
    let t = create_test_db();
    let ada = t.user("ada");

    let succeeded = t.run(ada);
    t.db.runs.start_as(ada, succeeded).unwrap();
    t.db.runs.succeed_as(ada, succeeded).unwrap();

    let failed = t.run(ada);
    t.db.runs.start_as(ada, failed).unwrap();
    t.db.runs.fail_as(ada, failed).unwrap();

    let cancelled = t.run(ada);
    t.db.runs.cancel_as(ada, cancelled).unwrap();

    for run in [succeeded, failed, cancelled] {
        let before = t.db.runs.get(run).unwrap();
        for next in RunStatus::ALL {
            let err = t.db.runs.transition_as(ada, run, next).unwrap_err();
            assert!(err.is_invalid_transition(), "{} -> {}", before.status, next);
        }
        assert_eq!(t.db.runs.get(run).unwrap(), before);
    }
}

#[test]
fn test_no_backward_or_skipping_moves() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);

    assert!(t.db.runs.succeed_as(ada, run).unwrap_err().is_invalid_transition());
    assert!(t.db.runs.fail_as(ada, run).unwrap_err().is_invalid_transition());
    assert!(t
        .db
        .runs
        .transition_as(ada, run, RunStatus::Pending)
        .unwrap_err()
        .is_invalid_transition());

    t.db.runs.start_as(ada, run).unwrap();
    assert!(t
        .db
        .runs
        .transition_as(ada, run, RunStatus::Pending)
        .unwrap_err()
        .is_invalid_transition());
    assert!(t.db.runs.start_as(ada, run).unwrap_err().is_invalid_transition());
    assert_eq!(t.db.runs.cancel_as(ada, run).unwrap().status, RunStatus::Cancelled);
}

#[test]
fn test_reader_cannot_transition() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);
    t.grant_user(run, t.levels.read.id, bob);

    let err = t.db.runs.start_as(bob, run).unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(t.db.runs.get(run).unwrap().status, RunStatus::Pending);
}

#[test]
fn test_writer_via_group_can_transition() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);
    t.grant_group(run, t.levels.write.id, team);

    t.db.runs.start_as(bob, run).unwrap();
    t.db.runs.succeed_as(bob, run).unwrap();
    assert_eq!(t.db.runs.get(run).unwrap().status, RunStatus::Succeeded);
}

#[test]
fn test_transition_updates_timestamp() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);
    let created = t.db.runs.get(run).unwrap();

    let started = t.db.runs.start_as(ada, run).unwrap();
    assert_eq!(started.created_at, created.created_at);
    assert!(started.updated_at >= created.updated_at);
}

#[test]
fn test_custom_write_threshold() {
    init_tracing();
    let db = Warden::builder()
        .file_access(FileAccessPolicy::AnyRun)
        .write_level("read")
        .open()
        .unwrap();
    let levels = db.levels.seed_standard().unwrap();
    let ada = db.users.create("ada", "lab", "a").unwrap().id;
    let bob = db.users.create("bob", "lab", "b").unwrap().id;
    let run = db.runs.create(ada, json!({})).unwrap().id;
    db.grants.grant(run, levels.read.id, Principal::User(bob)).unwrap();

    assert_eq!(db.runs.start_as(bob, run).unwrap().status, RunStatus::Running);
}

#[test]
fn test_small_level_values_gate_by_name() {
    init_tracing();
    let db = Warden::ephemeral(FileAccessPolicy::AnyRun).unwrap();
    let read = db.levels.create("read", 1).unwrap();
    let write = db.levels.create("write", 2).unwrap();
    db.levels.create("admin", 3).unwrap();
    let ada = db.users.create("ada", "lab", "a").unwrap().id;
    let bob = db.users.create("bob", "lab", "b").unwrap().id;
    let carol = db.users.create("carol", "lab", "c").unwrap().id;
    let run = db.runs.create(ada, json!({})).unwrap().id;

    // The owner passes every gate without a grant
    let file = db.files.create("in.fq", ada).unwrap().id;
    db.files.attach_as(ada, file, run).unwrap();
    db.grants.grant_as(ada, run, read.id, Principal::User(bob)).unwrap();
    db.grants.grant_as(ada, run, write.id, Principal::User(carol)).unwrap();

    assert_eq!(db.runs.get_as(bob, run).unwrap().id, run);
    assert!(db.runs.start_as(bob, run).unwrap_err().is_authorization());
    assert_eq!(db.runs.start_as(carol, run).unwrap().status, RunStatus::Running);
    assert_eq!(db.runs.succeed_as(ada, run).unwrap().status, RunStatus::Succeeded);
}

#[test]
fn test_gated_reads() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);

    let err = t.db.runs.get_as(bob, run).unwrap_err();
    assert!(err.is_authorization());
    // Outward, a forbidden run looks exactly like a missing one
    let missing = t.db.runs.get_as(bob, RunId::new()).unwrap_err();
    assert_eq!(err.public_message(), missing.public_message());

    t.grant_user(run, t.levels.read.id, bob);
    assert_eq!(t.db.runs.get_as(bob, run).unwrap().id, run);
}

#[test]
fn test_accessible_runs() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let mine = t.run(bob);
    let shared = t.run(ada);
    let _private = t.run(ada);
    t.grant_group(shared, t.levels.read.id, team);

    let mut expected = vec![mine, shared];
    expected.sort();
    let got: Vec<_> = t
        .db
        .runs
        .accessible(bob, t.db.access.read_threshold().unwrap().level_value)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(got, expected);

    let writable: Vec<_> = t
        .db
        .runs
        .accessible(bob, t.db.access.write_threshold().unwrap().level_value)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(writable, vec![mine]);
}
