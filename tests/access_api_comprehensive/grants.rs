//! Grant Tests
//!
//! - Validation of referenced entities
//! - Duplicate grants are conflicts
//! - Two-column grant rows
//! - Gated grant and revoke

use crate::*;
use warden::{Error, GrantRow};

#[test]
fn test_grant_validates_references() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);

    let err = t
        .db
        .grants
        .grant(RunId::new(), t.levels.read.id, Principal::User(ada))
        .unwrap_err();
    assert!(err.is_not_found());

    let err = t
        .db
        .grants
        .grant(run, AccessLevelId::new(), Principal::User(ada))
        .unwrap_err();
    assert!(err.is_not_found());

    let err = t
        .db
        .grants
        .grant(run, t.levels.read.id, Principal::Group(GroupId::new()))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(t.db.grants.on_run(run).is_empty());
}

#[test]
fn test_duplicate_grant_is_conflict_and_harmless() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);
    t.grant_user(run, t.levels.write.id, bob);

    let err = t
        .db
        .grants
        .grant(run, t.levels.write.id, Principal::User(bob))
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(t.db.grants.on_run(run).len(), 1);
    assert_eq!(t.level_of(bob, run), Some(20));
}

#[test]
fn test_same_level_for_user_and_group_is_not_duplicate() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);

    t.grant_user(run, t.levels.read.id, bob);
    t.grant_group(run, t.levels.read.id, team);
    assert_eq!(t.db.grants.on_run(run).len(), 2);
}

#[test]
fn test_grant_row_requires_exactly_one_principal() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);

    let row = |user: Option<UserId>, group: Option<GroupId>| GrantRow {
        id: None,
        run,
        level: t.levels.read.id,
        user,
        group,
    };

    assert!(matches!(
        t.db.grants.grant_row(row(Some(bob), Some(team))),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        t.db.grants.grant_row(row(None, None)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(t.db.grants.on_run(run).is_empty());

    let grant = t.db.grants.grant_row(row(Some(bob), None)).unwrap();
    assert_eq!(grant.principal, Principal::User(bob));
}

#[test]
fn test_revoke() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);
    let grant = t.grant_user(run, t.levels.write.id, bob);

    let revoked = t.db.grants.revoke(grant).unwrap();
    assert_eq!(revoked.id, grant);
    assert!(t.db.grants.get(grant).is_none());
    assert!(t.db.access.resolve(bob, run).unwrap().is_denied());
    assert!(t.db.grants.revoke(grant).unwrap_err().is_not_found());
}

#[test]
fn test_owner_grants_and_revokes() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);

    let grant = t
        .db
        .grants
        .grant_as(ada, run, t.levels.admin.id, Principal::User(bob))
        .unwrap();
    assert_eq!(t.level_of(bob, run), Some(30));

    t.db.grants.revoke_as(ada, grant.id).unwrap();
    assert_eq!(t.level_of(bob, run), None);
}

#[test]
fn test_non_admin_cannot_grant() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let carol = t.user("carol");
    let run = t.run(ada);
    t.grant_user(run, t.levels.write.id, bob);

    let err = t
        .db
        .grants
        .grant_as(bob, run, t.levels.read.id, Principal::User(carol))
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert!(err.is_authorization());
    assert_eq!(t.db.grants.on_run(run).len(), 1);
}

#[test]
fn test_admin_cannot_revoke_owner_level_grant_above_self() {
    init_tracing();
    let db = Warden::builder()
        .file_access(FileAccessPolicy::AnyRun)
        .admin_level("admin")
        .open()
        .unwrap();
    let levels = db.levels.seed_standard().unwrap();
    let root = db.levels.create("root", 99).unwrap();
    let ada = db.users.create("ada", "lab", "a").unwrap().id;
    let bob = db.users.create("bob", "lab", "b").unwrap().id;
    let carol = db.users.create("carol", "lab", "c").unwrap().id;
    let run = db.runs.create(ada, json!({})).unwrap().id;

    db.grants.grant(run, levels.admin.id, Principal::User(bob)).unwrap();
    let strong = db.grants.grant(run, root.id, Principal::User(carol)).unwrap();

    // bob is at the admin threshold but below carol's grant
    assert!(db.grants.revoke_as(bob, strong.id).unwrap_err().is_authorization());
    // ...and may not hand out root either
    assert!(db
        .grants
        .grant_as(bob, run, root.id, Principal::User(bob))
        .unwrap_err()
        .is_authorization());
    // but may grant up to their own level
    db.grants
        .grant_as(bob, run, levels.write.id, Principal::User(carol))
        .unwrap();
}

#[test]
fn test_on_run_as_requires_read() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);

    assert!(t.db.grants.on_run_as(bob, run).unwrap_err().is_authorization());
    t.grant_user(run, t.levels.read.id, bob);
    assert_eq!(t.db.grants.on_run_as(bob, run).unwrap().len(), 1);
}
