//! End-to-end scenarios

use crate::*;

/// Owner A creates a run; B receives write and drives it forward.
#[test]
fn test_grantee_drives_run() {
    let t = create_test_db();
    let a = t.user("a");
    let b = t.user("b");
    let run = t.run(a);

    assert!(t.db.runs.start_as(b, run).unwrap_err().is_authorization());

    t.grant_user(run, t.levels.write.id, b);
    let running = t.db.runs.start_as(b, run).unwrap();
    assert_eq!(running.status, RunStatus::Running);

    let back = t.db.runs.transition_as(b, run, RunStatus::Pending).unwrap_err();
    assert!(back.is_invalid_transition());

    t.db.runs.succeed_as(b, run).unwrap();
    assert_eq!(t.db.runs.get(run).unwrap().status, RunStatus::Succeeded);
}

/// Group read plus direct write resolves to write.
#[test]
fn test_group_and_direct_grant_combine() {
    let t = create_test_db();
    let a = t.user("a");
    let b = t.user("b");
    let c = t.user("c");
    let team = t.group("team", &[b, c]);
    let run = t.run(a);

    t.grant_group(run, t.levels.read.id, team);
    t.grant_user(run, t.levels.write.id, b);

    assert_eq!(t.level_of(b, run), Some(20));
    assert_eq!(t.level_of(c, run), Some(10));

    let resolved = t.db.access.resolve(b, run).unwrap();
    assert!(resolved.is_granted());

    // C may read but not act
    assert!(t.db.runs.get_as(c, run).is_ok());
    assert!(t.db.runs.start_as(c, run).is_err());
}

/// Access follows group membership as it changes.
#[test]
fn test_membership_change() {
    let t = create_test_db();
    let a = t.user("a");
    let b = t.user("b");
    let team = t.group("team", &[b]);
    let run = t.run(a);
    t.grant_group(run, t.levels.write.id, team);

    assert_eq!(t.level_of(b, run), Some(20));
    t.db.groups.remove_member(team, b).unwrap();
    assert_eq!(t.level_of(b, run), None);
    assert!(t.db.runs.accessible(b, 10).unwrap().is_empty());
}

/// Token to action: authenticate, then act as the token's user.
#[test]
fn test_session_then_act() {
    let t = create_test_db();
    let a = t.user("a");
    let b = t.user("b");
    let run = t.run(a);
    t.grant_user(run, t.levels.write.id, b);

    let session = t.db.sessions.issue("cred-b").unwrap();
    let actor = t.db.sessions.authenticate(&session.token).user().unwrap();
    assert_eq!(actor, b);
    t.db.runs.start_as(actor, run).unwrap();

    let visible: Vec<RunId> = t.db.runs.accessible(actor, 10).unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(visible, vec![run]);
}

/// Every refusal reads the same from outside.
#[test]
fn test_refusals_are_indistinguishable() {
    let t = create_test_db();
    let a = t.user("a");
    let b = t.user("b");
    let run = t.run(a);

    let forbidden = t.db.runs.get_as(b, run).unwrap_err();
    let missing = t.db.runs.get_as(b, RunId::new()).unwrap_err();
    let denied = t.db.access.require(b, run, 10).unwrap_err();

    assert_eq!(forbidden.public_message(), missing.public_message());
    assert_eq!(denied.public_message(), warden::PUBLIC_NOT_FOUND);
}
