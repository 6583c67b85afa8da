use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::TestEnv;

const ROSTER_CSV: &str = "이름,소속,전화번호,차량\n홍길동,서울센터,010-1111-2222,12가3456\nKim,Busan,010-3333-4444,\n";

fn env_with_roster() -> TestEnv {
    let env = TestEnv::new();
    env.init_with_session("Spring Forum");
    let csv = env.write("roster.csv", ROSTER_CSV);
    env.cmd()
        .args(["import", &csv])
        .assert()
        .success()
        .stdout(contains("Imported 2 attendees"));
    env
}

fn with_admin(env: &TestEnv) {
    env.cmd()
        .args(["operator", "add", "boss", "--role", "admin", "--new-passcode", "1234"])
        .assert()
        .success()
        .stdout(contains("registered as admin"));
}

#[test]
fn init_creates_the_database() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("initialization completed"));

    assert!(fs::metadata(&env.db).is_ok());
    // test mode leaves the user configuration alone
    assert!(!env.dir.path().join(".qrcheckin").join("qrcheckin.conf").exists());
}

#[test]
fn commands_without_active_session_fail() {
    let env = TestEnv::new();
    env.cmd().args(["--test", "init"]).assert().success();

    env.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("No active session"));
}

#[test]
fn import_then_list_and_search() {
    let env = env_with_roster();

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Spring Forum"))
        .stdout(contains("홍길동"))
        .stdout(contains("Kim"))
        .stdout(contains("Total 2"));

    env.cmd()
        .args(["list", "--search", "busan"])
        .assert()
        .success()
        .stdout(contains("Kim").and(contains("홍길동").not()));
}

#[test]
fn merge_import_skips_known_phones() {
    let env = env_with_roster();
    let more = env.write("more.csv", "Name,Phone\nKim,010-3333-4444\nLee,010-5555-6666\n");

    env.cmd()
        .args(["import", &more, "--merge"])
        .assert()
        .success()
        .stdout(contains("Imported 1 attendees (1 skipped"));
}

#[test]
fn adding_a_duplicate_phone_fails() {
    let env = env_with_roster();

    env.cmd()
        .args(["add", "--name", "Other", "--phone", "010-3333-4444"])
        .assert()
        .failure()
        .stderr(contains("already registered"));

    env.cmd()
        .args(["add", "--name", "Lee", "--phone", "010-5555-6666", "--event", "Forum"])
        .assert()
        .success()
        .stdout(contains("Registered Lee"));
}

#[test]
fn manual_check_in_requires_valid_credentials() {
    let env = env_with_roster();
    with_admin(&env);

    env.cmd()
        .args(["--operator", "boss", "--passcode", "0000", "checkin", "010-3333-4444"])
        .assert()
        .failure()
        .stderr(contains("Not authorized"));

    env.cmd()
        .args(["--operator", "boss", "--passcode", "1234", "checkin", "010-3333-4444"])
        .assert()
        .success()
        .stdout(contains("Kim checked in"));

    env.cmd()
        .args(["list", "--checked"])
        .assert()
        .success()
        .stdout(contains("Kim").and(contains("홍길동").not()));

    env.cmd()
        .args(["--operator", "boss", "--passcode", "1234", "cancel", "010-3333-4444"])
        .assert()
        .success()
        .stdout(contains("cancelled"));
}

#[test]
fn staff_cannot_clear_the_roster() {
    let env = env_with_roster();
    with_admin(&env);

    env.cmd()
        .args([
            "--operator", "boss", "--passcode", "1234",
            "operator", "add", "desk", "--role", "staff", "--new-passcode", "5678",
        ])
        .assert()
        .success();

    env.cmd()
        .args(["--operator", "desk", "--passcode", "5678", "clear", "--yes"])
        .assert()
        .failure()
        .stderr(contains("may not perform"));

    env.cmd()
        .args(["--operator", "boss", "--passcode", "1234", "del", "010-1111-2222", "--yes"])
        .assert()
        .success()
        .stdout(contains("1 attendee(s) deleted"));
}

#[test]
fn scan_payload_checks_in_once() {
    let env = env_with_roster();
    let payload = r#"{"name":"Kim","affiliation":"Busan","phone":"010-3333-4444","vehicle":"","checkedIn":false,"checkedInAt":null}"#;

    env.cmd()
        .args(["scan", "--payload", payload])
        .assert()
        .success()
        .stdout(contains("Check-in complete"));

    env.cmd()
        .args(["scan", "--payload", payload])
        .assert()
        .success()
        .stdout(contains("Already checked in"));

    env.cmd()
        .args(["scan", "--payload", "garbage"])
        .assert()
        .success()
        .stderr(contains("Invalid QR code"));
}

#[test]
fn qr_command_writes_a_png() {
    let env = env_with_roster();
    let out = env.path("kim.png");

    env.cmd()
        .args(["qr", "010-3333-4444", "--out", &out])
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn sync_push_list_and_pull_through_a_csv_sheet() {
    let env = env_with_roster();
    let sheet = env.path("remote.csv");
    let conf_dir = env.dir.path().join(".qrcheckin");
    fs::create_dir_all(&conf_dir).unwrap();
    fs::write(
        conf_dir.join("qrcheckin.conf"),
        format!("database: {}\nsync_endpoint: {}\n", env.db, sheet),
    )
    .unwrap();

    env.cmd()
        .args(["sync", "push"])
        .assert()
        .success()
        .stdout(contains("2 rows stored"));

    env.cmd()
        .args(["sync", "sessions"])
        .assert()
        .success()
        .stdout(contains("Spring Forum"));

    env.cmd()
        .args(["sync", "pull", "Spring Forum", "--as", "Copy"])
        .assert()
        .success()
        .stdout(contains("new session 'Copy' (2 attendees)"));

    env.cmd()
        .args(["session", "list"])
        .assert()
        .success()
        .stdout(contains("Copy"))
        .stdout(contains("Spring Forum"));
}

#[test]
fn sync_without_endpoint_is_a_config_error() {
    let env = env_with_roster();

    env.cmd()
        .args(["sync", "push"])
        .assert()
        .failure()
        .stderr(contains("sync_endpoint"));
}

#[test]
fn send_without_credentials_is_rejected() {
    let env = env_with_roster();

    env.cmd()
        .args(["send", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Configuration error"));
}

#[test]
fn log_print_shows_audited_operations() {
    let env = env_with_roster();

    env.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("session_create"))
        .stdout(contains("import"))
        .stdout(contains("migration_applied"));
}

#[test]
fn import_into_a_filled_session_asks_before_touching_it() {
    let env = env_with_roster();
    let more = env.write("more.csv", "Name,Phone\nLee,010-5555-6666\n");

    env.cmd()
        .args(["import", &more])
        .write_stdin("c\n")
        .assert()
        .success()
        .stdout(contains("already has 2 attendees"))
        .stdout(contains("Import cancelled"));

    env.cmd()
        .args(["import", &more])
        .write_stdin("m\n")
        .assert()
        .success()
        .stdout(contains("Imported 1 attendees"));

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Total 3"));
}

#[test]
fn passcode_is_prompted_when_not_given() {
    let env = env_with_roster();
    with_admin(&env);

    env.cmd()
        .args(["--operator", "boss", "checkin", "010-3333-4444"])
        .write_stdin("1234\n")
        .assert()
        .success()
        .stdout(contains("Passcode:"))
        .stdout(contains("Kim checked in"));
}
