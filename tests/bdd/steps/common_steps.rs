#![allow(deprecated)]
use cucumber::{given, then, when};
use predicates::prelude::*;

use campus_rentals::db::Database;

use crate::MarketWorld;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the scenario's database directly, bypassing the web server.
pub fn open_db(world: &MarketWorld) -> Database {
    let db_path = world
        .db_path
        .as_ref()
        .expect("db_path not set: did you forget 'Given a campus rentals database is initialized'?");
    Database::open(db_path).expect("failed to open database")
}

/// Raw connection for fixtures the web surface cannot create.
pub fn raw_connection(world: &MarketWorld) -> rusqlite::Connection {
    let db_path = world.db_path.as_ref().expect("db_path not set");
    rusqlite::Connection::open(db_path).expect("failed to open raw connection")
}

/// Run the CLI with the given args against the world's database.
fn run_cli(world: &mut MarketWorld, args: &[&str]) {
    let db_path = world.db_path.as_ref().expect("db_path not set").clone();
    let output = assert_cmd::Command::cargo_bin("campus-rentals")
        .expect("campus-rentals binary not found")
        .env("RENTALS_DB", &db_path)
        .args(args)
        .output()
        .expect("failed to run campus-rentals");

    world.last_stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    world.last_exit_code = output.status.code().unwrap_or(-1);
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

/// Initialize a fresh database in a temp dir using the CLI.
#[given("a campus rentals database is initialized")]
async fn a_database_is_initialized(world: &mut MarketWorld) {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("data").join("campus.db");

    assert_cmd::Command::cargo_bin("campus-rentals")
        .expect("campus-rentals binary not found")
        .env("RENTALS_DB", &db_path)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized campus rentals database"));

    world.db_path = Some(db_path);
    // Keep the TempDir alive for the lifetime of the scenario.
    world.db_dir = Some(dir);
}

/// A path for a database that has not been created yet.
#[given("an empty temporary directory")]
async fn an_empty_temporary_directory(world: &mut MarketWorld) {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    world.db_path = Some(dir.path().join("nested").join("campus.db"));
    world.db_dir = Some(dir);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I run the init command")]
async fn i_run_the_init_command(world: &mut MarketWorld) {
    run_cli(world, &["init"]);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the command succeeds")]
async fn the_command_succeeds(world: &mut MarketWorld) {
    assert_eq!(
        world.last_exit_code, 0,
        "expected exit code 0, stdout was:\n{}",
        world.last_stdout
    );
}

#[then(expr = "the command output contains {string}")]
async fn the_command_output_contains(world: &mut MarketWorld, expected: String) {
    assert!(
        world.last_stdout.contains(&expected),
        "expected stdout to contain {expected:?}, but it was:\n{}",
        world.last_stdout
    );
}

#[then("the database file exists")]
async fn the_database_file_exists(world: &mut MarketWorld) {
    let db_path = world.db_path.as_ref().expect("db_path not set");
    assert!(db_path.exists(), "expected {} to exist", db_path.display());
}

#[then(expr = "the schema version is {int}")]
async fn the_schema_version_is(world: &mut MarketWorld, expected: i32) {
    let version = open_db(world)
        .schema_version()
        .expect("failed to read schema version");
    assert_eq!(version, expected);
}
