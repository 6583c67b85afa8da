#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use qrcheckin::db::repository::Repository;
use qrcheckin::models::attendee::Attendee;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn qrc() -> Command {
    cargo_bin_cmd!("qrcheckin")
}

/// Scratch HOME + database for one CLI test.
pub struct TestEnv {
    pub dir: TempDir,
    pub db: String,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir
            .path()
            .join("qrcheckin_test.sqlite")
            .to_string_lossy()
            .to_string();
        Self { dir, db }
    }

    /// Binary with HOME pointed at the scratch dir and `--db` set.
    pub fn cmd(&self) -> Command {
        let mut cmd = qrc();
        cmd.env("HOME", self.dir.path());
        cmd.args(["--db", &self.db]);
        cmd
    }

    /// `init` in test mode, then create and select `session`.
    pub fn init_with_session(&self, session: &str) {
        self.cmd().args(["--test", "init"]).assert().success();
        self.cmd()
            .args(["session", "create", session])
            .assert()
            .success();
    }

    pub fn write(&self, name: &str, content: &str) -> String {
        let path: PathBuf = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path.to_string_lossy().to_string()
    }

    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().to_string()
    }
}

/// In-memory repository with an active session named `name`.
pub fn repo_with_session(name: &str) -> Repository {
    let mut repo = Repository::in_memory().expect("in-memory db");
    qrcheckin::core::store::AttendeeStore::new(&mut repo)
        .create_session(name)
        .expect("create session");
    repo
}

pub fn attendee(name: &str, phone: &str) -> Attendee {
    Attendee::new(name, "Seoul Center", phone, "")
}
