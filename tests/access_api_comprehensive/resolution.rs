//! Resolution Tests
//!
//! - Owner short-circuit
//! - Default deny
//! - Group inheritance
//! - Strongest grant wins, ties to the lowest grant id
//! - Monotonicity under grant and revoke

use crate::*;
use proptest::prelude::*;
use warden::{AccessSource, Error};

#[test]
fn test_owner_resolves_to_strongest_level() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);

    let resolution = t.db.access.resolve(ada, run).unwrap();
    assert_eq!(resolution.level().unwrap().id, t.levels.admin.id);
    assert_eq!(resolution.source(), Some(AccessSource::Owner));
    assert!(t.db.access.check(ada, run, t.levels.admin.id).unwrap());
}

#[test]
fn test_owner_unaffected_by_weaker_grants() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);
    t.grant_user(run, t.levels.read.id, ada);

    assert_eq!(t.level_of(ada, run), Some(30));
}

#[test]
fn test_owner_tracks_newly_defined_stronger_level() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);
    let superuser = t.db.levels.create("superuser", 100).unwrap();

    assert_eq!(t.level_of(ada, run), Some(100));
    assert!(t.db.access.check(ada, run, superuser.id).unwrap());
}

#[test]
fn test_default_deny() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let run = t.run(ada);

    assert!(t.db.access.resolve(bob, run).unwrap().is_denied());
    assert!(!t.db.access.check(bob, run, t.levels.read.id).unwrap());
    assert!(!t.db.access.check_value(bob, run, i64::MIN).unwrap());
    assert!(matches!(
        t.db.access.require(bob, run, 10),
        Err(Error::Denied(_))
    ));
}

#[test]
fn test_unknown_ids_are_not_found() {
    let t = create_test_db();
    let ada = t.user("ada");
    let run = t.run(ada);

    assert!(t.db.access.resolve(ada, RunId::new()).unwrap_err().is_not_found());
    assert!(t.db.access.resolve(UserId::new(), run).unwrap_err().is_not_found());
    assert!(t
        .db
        .access
        .check(ada, run, AccessLevelId::new())
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_group_inheritance() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let carol = t.user("carol");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);
    let grant = t.grant_group(run, t.levels.write.id, team);

    let resolution = t.db.access.resolve(bob, run).unwrap();
    assert_eq!(resolution.level_value(), Some(20));
    assert_eq!(resolution.source(), Some(AccessSource::Group { group: team, grant }));
    assert!(t.db.access.check(bob, run, t.levels.write.id).unwrap());

    // Non-members inherit nothing
    assert!(t.db.access.resolve(carol, run).unwrap().is_denied());
}

#[test]
fn test_leaving_group_drops_inherited_access() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);
    t.grant_group(run, t.levels.write.id, team);

    t.db.groups.remove_member(team, bob).unwrap();
    assert!(t.db.access.resolve(bob, run).unwrap().is_denied());
}

#[test]
fn test_strongest_of_many_groups_wins() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let readers = t.group("readers", &[bob]);
    let writers = t.group("writers", &[bob]);
    let admins = t.group("admins", &[ada]);
    let run = t.run(ada);

    t.grant_group(run, t.levels.read.id, readers);
    let winning = t.grant_group(run, t.levels.write.id, writers);
    t.grant_group(run, t.levels.admin.id, admins);

    let resolution = t.db.access.resolve(bob, run).unwrap();
    assert_eq!(resolution.level_value(), Some(20));
    assert_eq!(resolution.source().unwrap().grant(), Some(winning));
}

#[test]
fn test_equal_levels_tie_to_lowest_grant_id() {
    let t = create_test_db();
    let ada = t.user("ada");
    let bob = t.user("bob");
    let team = t.group("team", &[bob]);
    let run = t.run(ada);
    let editor = t.db.levels.create("editor", 20).unwrap();

    let low = GrantId::from_uuid(uuid::Uuid::from_u128(10));
    let high = GrantId::from_uuid(uuid::Uuid::from_u128(20));
    t.db
        .grants
        .grant_with_id(high, run, t.levels.write.id, Principal::User(bob))
        .unwrap();
    t.db
        .grants
        .grant_with_id(low, run, editor.id, Principal::Group(team))
        .unwrap();

    for _ in 0..10 {
        let resolution = t.db.access.resolve(bob, run).unwrap();
        assert_eq!(resolution.source().unwrap().grant(), Some(low));
        assert_eq!(resolution.level().unwrap().description, "editor");
    }
}

#[test]
fn test_no_levels_defined_owner_still_resolves() {
    init_tracing();
    let db = Warden::ephemeral(FileAccessPolicy::AnyRun).unwrap();
    let ada = db.users.create("ada", "lab", "cred").unwrap();
    let run = db.runs.create(ada.id, json!({})).unwrap();

    let resolution = db.access.resolve(ada.id, run.id).unwrap();
    assert_eq!(resolution.level_value(), Some(i64::MAX));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Revoking a grant never raises the level; re-granting never lowers it.
    #[test]
    fn prop_revocation_never_raises_level(
        grants in proptest::collection::vec((0usize..3, any::<bool>()), 1..8),
        victim in any::<prop::sample::Index>(),
    ) {
        let t = create_test_db();
        let ada = t.user("ada");
        let bob = t.user("bob");
        let team = t.group("team", &[bob]);
        let run = t.run(ada);
        let levels = [t.levels.read.id, t.levels.write.id, t.levels.admin.id];

        let mut ids = Vec::new();
        for (lvl, direct) in grants {
            let principal = if direct { Principal::User(bob) } else { Principal::Group(team) };
            if let Ok(g) = t.db.grants.grant(run, levels[lvl], principal) {
                ids.push(g);
            }
        }
        prop_assume!(!ids.is_empty());

        let before = t.level_of(bob, run);
        let revoked = t.db.grants.revoke(ids[victim.index(ids.len())].id).unwrap();
        let after = t.level_of(bob, run);
        prop_assert!(after <= before);

        t.db.grants.grant(revoked.run, revoked.level, revoked.principal).unwrap();
        prop_assert_eq!(t.level_of(bob, run), before);
    }

    /// The resolved level is the maximum over applicable grants.
    #[test]
    fn prop_resolution_is_max_of_applicable(
        grants in proptest::collection::vec((0usize..3, 0usize..3), 0..9),
    ) {
        let t = create_test_db();
        let ada = t.user("ada");
        let bob = t.user("bob");
        let carol = t.user("carol");
        let team = t.group("team", &[bob]);
        let run = t.run(ada);
        let levels = [&t.levels.read, &t.levels.write, &t.levels.admin];

        let mut expected: Option<i64> = None;
        for (lvl, target) in grants {
            let principal = match target {
                0 => Principal::User(bob),
                1 => Principal::Group(team),
                _ => Principal::User(carol),
            };
            if t.db.grants.grant(run, levels[lvl].id, principal).is_ok() && target < 2 {
                expected = expected.max(Some(levels[lvl].level_value));
            }
        }
        prop_assert_eq!(t.level_of(bob, run), expected);
    }
}
