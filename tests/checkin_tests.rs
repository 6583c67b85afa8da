use chrono::Utc;
use qrcheckin::core::auth::{self, Authorizer, Credentials};
use qrcheckin::core::checkin::{
    CheckInEngine, ManualOutcome, ScanDesk, ScanOutcome, parse_payload, resolve_scan,
};
use qrcheckin::core::normalizer::normalize_str;
use qrcheckin::core::store::AttendeeStore;
use qrcheckin::db::repository::Repository;
use qrcheckin::errors::AppError;
use qrcheckin::models::operator::{Permission, Role};
use qrcheckin::models::session::Session;
use qrcheckin::qr;
use std::time::{Duration, Instant};

mod common;
use common::{attendee, repo_with_session};

fn seeded_repo() -> Repository {
    let mut repo = repo_with_session("Door");
    let mut store = AttendeeStore::new(&mut repo);
    store.add(attendee("Hong", "010-1111-2222")).unwrap();
    store.add(attendee("Kim", "010-3333-4444")).unwrap();
    repo
}

fn register(repo: &mut Repository, name: &str, role: Role) {
    let op = auth::new_operator(name, role, "1234").unwrap();
    repo.insert_operator(&op).unwrap();
}

fn creds(name: &str, passcode: &str) -> Credentials {
    Credentials {
        operator: name.into(),
        passcode: passcode.into(),
    }
}

fn hong_payload(repo: &Repository) -> String {
    qr::payload(&repo.active_session().unwrap().participants[0]).unwrap()
}

#[test]
fn qr_payload_round_trips_to_the_same_attendee() {
    let mut repo = seeded_repo();
    let hong = repo.active_session().unwrap().participants[0].clone();

    let raw = qr::payload(&hong).unwrap();
    assert_eq!(parse_payload(&raw).unwrap(), hong);

    let mut desk = ScanDesk::default();
    let outcome = CheckInEngine::new(&mut repo)
        .scan(&mut desk, &raw, Instant::now())
        .unwrap();

    match outcome {
        ScanOutcome::Success(a) => {
            assert_eq!(a.phone, hong.phone);
            assert!(a.checked_in);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let stored = &repo.active_session().unwrap().participants[0];
    assert!(stored.checked_in);
    assert!(stored.checked_in_at.is_some());
}

#[test]
fn rescanning_a_checked_in_attendee_keeps_the_timestamp() {
    let mut repo = seeded_repo();
    let raw = hong_payload(&repo);

    let mut desk = ScanDesk::new(Duration::from_secs(3));
    let t0 = Instant::now();
    CheckInEngine::new(&mut repo).scan(&mut desk, &raw, t0).unwrap();
    let first = repo.active_session().unwrap().participants[0].checked_in_at;
    assert!(first.is_some());

    // both rescans land after the debounce window
    for secs in [4, 8] {
        let outcome = CheckInEngine::new(&mut repo)
            .scan(&mut desk, &raw, t0 + Duration::from_secs(secs))
            .unwrap();
        assert!(matches!(outcome, ScanOutcome::AlreadyCheckedIn(_)));
        assert_eq!(outcome.message(), "Already checked in");
    }

    assert_eq!(repo.active_session().unwrap().participants[0].checked_in_at, first);
}

#[test]
fn identical_payload_within_the_window_is_ignored() {
    let mut repo = seeded_repo();
    let raw = hong_payload(&repo);

    let mut desk = ScanDesk::new(Duration::from_secs(3));
    let t0 = Instant::now();

    let first = CheckInEngine::new(&mut repo).scan(&mut desk, &raw, t0).unwrap();
    assert!(matches!(first, ScanOutcome::Success(_)));

    let again = CheckInEngine::new(&mut repo)
        .scan(&mut desk, &raw, t0 + Duration::from_secs(1))
        .unwrap();
    assert_eq!(again, ScanOutcome::Ignored);

    // the success stays on display until the window closes
    assert!(matches!(
        desk.current(t0 + Duration::from_secs(2)),
        Some(ScanOutcome::Success(_))
    ));
    assert!(desk.current(t0 + Duration::from_secs(3)).is_none());
}

#[test]
fn unknown_and_malformed_payloads_do_not_mutate() {
    let mut repo = seeded_repo();
    let before = repo.active_session().unwrap();
    let mut desk = ScanDesk::default();
    let now = Instant::now();

    let stranger = qr::payload(&attendee("Nobody", "010-0000-0000")).unwrap();
    let outcome = CheckInEngine::new(&mut repo).scan(&mut desk, &stranger, now).unwrap();
    assert!(matches!(outcome, ScanOutcome::NoMatch { ref name, .. } if name == "Nobody"));

    let outcome = CheckInEngine::new(&mut repo)
        .scan(&mut desk, "not json", now)
        .unwrap();
    assert!(matches!(outcome, ScanOutcome::Invalid(_)));

    // an unreadable code does not arm the debounce
    assert!(desk.admit("not json", now));

    assert_eq!(repo.active_session().unwrap(), before);
}

#[test]
fn scan_matches_on_phone_and_name_together() {
    let repo = seeded_repo();
    let session = repo.active_session().unwrap();

    let mut forged = session.participants[0].clone();
    forged.name = "Someone Else".into();
    let raw = qr::payload(&forged).unwrap();

    let (next, outcome) = resolve_scan(&session, &raw, Utc::now());
    assert!(next.is_none());
    assert!(matches!(outcome, ScanOutcome::NoMatch { .. }));
}

#[test]
fn manual_check_in_and_cancel_with_valid_credentials() {
    let mut repo = seeded_repo();
    register(&mut repo, "desk1", Role::Staff);

    let grant = Authorizer::new(&repo)
        .authorize(&creds("desk1", "1234"), Permission::CheckIn)
        .unwrap();

    let outcome = CheckInEngine::new(&mut repo)
        .check_in("010-3333-4444", &grant)
        .unwrap();
    assert!(matches!(outcome, ManualOutcome::CheckedIn(ref a) if a.checked_in_at.is_some()));

    let kim = repo.active_session().unwrap().participants[1].clone();
    assert!(kim.checked_in);
    assert!(kim.checked_in_at.is_some());

    let again = CheckInEngine::new(&mut repo)
        .check_in("010-3333-4444", &grant)
        .unwrap();
    assert!(matches!(again, ManualOutcome::Unchanged(_)));

    let outcome = CheckInEngine::new(&mut repo)
        .cancel("010-3333-4444", &grant)
        .unwrap();
    assert!(matches!(outcome, ManualOutcome::Cancelled(_)));

    let kim = repo.active_session().unwrap().participants[1].clone();
    assert!(!kim.checked_in);
    assert!(kim.checked_in_at.is_none());
}

#[test]
fn manual_check_in_of_unknown_phone_fails() {
    let mut repo = seeded_repo();
    register(&mut repo, "desk1", Role::Staff);
    let grant = Authorizer::new(&repo)
        .authorize(&creds("desk1", "1234"), Permission::CheckIn)
        .unwrap();

    let err = CheckInEngine::new(&mut repo)
        .check_in("999", &grant)
        .unwrap_err();
    assert!(matches!(err, AppError::AttendeeNotFound(_)));
}

#[test]
fn wrong_passcode_and_missing_role_are_rejected() {
    let mut repo = seeded_repo();
    register(&mut repo, "admin", Role::Admin);
    register(&mut repo, "desk1", Role::Staff);

    let authz = Authorizer::new(&repo);
    assert!(!authz.is_bootstrap().unwrap());

    assert!(matches!(
        authz.authorize(&creds("desk1", "0000"), Permission::CheckIn),
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        authz.authorize(&creds("ghost", "1234"), Permission::CheckIn),
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        authz.authorize(&creds("desk1", "1234"), Permission::ManageRoster),
        Err(AppError::Unauthorized(_))
    ));

    let grant = authz
        .authorize(&creds("admin", "1234"), Permission::ManageRoster)
        .unwrap();
    assert_eq!(grant.role, Role::Admin);
}

#[test]
fn passcodes_are_stored_salted() {
    let a = auth::new_operator("a", Role::Staff, "1234").unwrap();
    let b = auth::new_operator("b", Role::Staff, "1234").unwrap();

    assert_ne!(a.passcode_hash, b.passcode_hash);
    assert_ne!(a.passcode_hash, "1234");
    assert!(auth::verify(&a, "1234"));
    assert!(!auth::verify(&a, "12345"));
    assert!(auth::new_operator("c", Role::Staff, "12").is_err());
}

#[test]
fn payload_without_identity_matches_nobody() {
    // a vehicle-only line imports as a row with blank name and phone
    let rows = normalize_str("이름,소속,전화번호,차량번호\n,,,12가3456\n").unwrap();
    assert_eq!(rows.len(), 1);
    let session = Session::new("Lot").with_participants(rows);

    for raw in ["{}", r#"{"name":"","phone":""}"#, r#"{"name":"  ","phone":"010-1"}"#] {
        let (next, outcome) = resolve_scan(&session, raw, Utc::now());
        assert!(next.is_none());
        assert!(matches!(outcome, ScanOutcome::NoMatch { .. }), "{}", raw);
    }
}
