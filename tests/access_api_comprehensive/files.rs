//! File Tests
//!
//! - Attachment rules
//! - File access under each policy

use crate::*;
use warden::Error;

#[test]
fn test_file_requires_existing_owner() {
    let t = create_test_db();
    assert!(t
        .db
        .files
        .create("orphan.bam", UserId::new())
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_attach_twice_is_conflict() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);
    let file = t.db.files.create("reads.fq", ada).unwrap().id;

    t.db.files.attach(file, run).unwrap();
    assert!(t.db.files.attach(file, run).unwrap_err().is_conflict());
    assert!(t.db.files.attach_as(ada, file, run).unwrap_err().is_conflict());
    assert_eq!(t.db.files.runs(file), vec![run]);
    assert_eq!(t.db.runs.files(run), vec![file]);
}

#[test]
fn test_file_on_many_runs() {
    let t = create_test_db();
    let ada = t.user("ada");
    let a = t.run(ada);
    let b = t.run(ada);
    let file = t.db.files.create("genome.fa", ada).unwrap().id;

    t.db.files.attach_as(ada, file, a).unwrap();
    t.db.files.attach_as(ada, file, b).unwrap();

    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(t.db.files.runs(file), expected);
}

#[test]
fn test_attach_as_rules() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);
    let bobs_file = t.db.files.create("bob.bam", bob).unwrap().id;
    let adas_file = t.db.files.create("ada.bam", ada).unwrap().id;

    // Owner of the run, not of the file
    assert!(matches!(
        t.db.files.attach_as(ada, bobs_file, run),
        Err(Error::Forbidden(_))
    ));
    // Owner of the file, no write on the run
    t.grant_user(run, t.levels.read.id, bob);
    assert!(matches!(
        t.db.files.attach_as(bob, bobs_file, run),
        Err(Error::Forbidden(_))
    ));
    // Not the owner of ada's file, even with write
    t.grant_user(run, t.levels.write.id, bob);
    assert!(t.db.files.attach_as(bob, adas_file, run).is_err());

    t.db.files.attach_as(bob, bobs_file, run).unwrap();
    assert_eq!(t.db.runs.files(run), vec![bobs_file]);
}

#[test]
fn test_files_as_lists_attached_files() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);
    let file = t.db.files.create("out.vcf", ada).unwrap();
    t.db.files.attach(file.id, run).unwrap();

    assert!(t.db.runs.files_as(bob, run).unwrap_err().is_authorization());
    t.grant_user(run, t.levels.read.id, bob);
    assert_eq!(t.db.runs.files_as(bob, run).unwrap(), vec![file]);
}

/// Build: ada owns two runs and a file attached to both; bob is granted
/// `first` on run A and `second` on run B.
fn two_run_file(t: &TestDb, first: AccessLevelId, second: Option<AccessLevelId>) -> (UserId, FileId) {
    let ada = t.user("ada");
    let bob = t.user("bob");
    let a = t.run(ada);
    let b = t.run(ada);
    let file = t.db.files.create("shared.bam", ada).unwrap().id;
    t.db.files.attach(file, a).unwrap();
    t.db.files.attach(file, b).unwrap();
    t.grant_user(a, first, bob);
    if let Some(level) = second {
        t.grant_user(b, level, bob);
    }
    (bob, file)
}

#[test]
fn test_any_run_policy() {
    let t = create_db(FileAccessPolicy::AnyRun);
    let (bob, file) = two_run_file(&t, t.levels.write.id, None);

    assert_eq!(t.db.access.file_policy(), FileAccessPolicy::AnyRun);
    assert!(t.db.access.check_file(bob, file, t.levels.read.id).unwrap());
    assert!(t.db.access.check_file(bob, file, t.levels.write.id).unwrap());
    assert!(!t.db.access.check_file(bob, file, t.levels.admin.id).unwrap());
    assert_eq!(t.db.files.get_as(bob, file).unwrap().id, file);
}

#[test]
fn test_all_runs_policy() {
    let t = create_db(FileAccessPolicy::AllRuns);
    let (bob, file) = two_run_file(&t, t.levels.write.id, None);

    assert!(!t.db.access.check_file(bob, file, t.levels.read.id).unwrap());
    assert!(t.db.files.get_as(bob, file).unwrap_err().is_authorization());
}

#[test]
fn test_all_runs_policy_weakest_run_decides() {
    let t = create_db(FileAccessPolicy::AllRuns);
    let (bob, file) = two_run_file(&t, t.levels.admin.id, Some(t.levels.read.id));

    assert!(t.db.access.check_file(bob, file, t.levels.read.id).unwrap());
    assert!(!t.db.access.check_file(bob, file, t.levels.write.id).unwrap());
    assert_eq!(
        t.db.access.resolve_file(bob, file).unwrap().level_value(),
        Some(10)
    );
}

#[test]
fn test_unattached_file() {
    for policy in [FileAccessPolicy::AnyRun, FileAccessPolicy::AllRuns] {
        let t = create_db(policy);
        let ada = t.user("ada");
        let bob = t.user("bob");
        let file = t.db.files.create("loose.txt", ada).unwrap().id;

        assert!(t.db.access.check_file_value(ada, file, 30).unwrap());
        assert!(!t.db.access.check_file_value(bob, file, 10).unwrap());
    }
}
