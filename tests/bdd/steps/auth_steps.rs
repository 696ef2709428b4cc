use cucumber::{given, then, when};

use crate::MarketWorld;
use crate::steps::common_steps::{open_db, raw_connection};
use crate::steps::web_steps::post_form_as;

async fn log_in(world: &mut MarketWorld, name: &str, email: &str) -> (u16, String) {
    let fields = vec![
        ("name".to_string(), name.to_string()),
        ("email".to_string(), email.to_string()),
    ];
    post_form_as(world, name, "/", &fields).await
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given(expr = "{string} is logged in with email {string}")]
async fn user_is_logged_in(world: &mut MarketWorld, name: String, email: String) {
    let (status, body) = log_in(world, &name, &email).await;
    assert_eq!(status, 200, "login as {name} failed: {body}");
    assert_eq!(world.last_response_path.as_deref(), Some("/dashboard"));
}

/// Delete the user row while their session cookie stays valid.
#[given(expr = "the user with email {string} has been removed")]
async fn user_has_been_removed(world: &mut MarketWorld, email: String) {
    let removed = raw_connection(world)
        .execute("DELETE FROM users WHERE email = ?1", [&email])
        .expect("delete user");
    assert_eq!(removed, 1, "no user with email {email}");
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when(expr = "{string} logs in with email {string}")]
async fn user_logs_in(world: &mut MarketWorld, name: String, email: String) {
    log_in(world, &name, &email).await;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "the dashboard shows trust score {int}")]
async fn the_dashboard_shows_trust_score(world: &mut MarketWorld, expected: i64) {
    let body = world
        .last_response_body
        .as_deref()
        .expect("no HTTP response body recorded");
    let marker = format!("<strong id=\"trust-score\">{expected}</strong>");
    assert!(
        body.contains(&marker),
        "expected dashboard to show trust score {expected}, body was:\n{body}"
    );
}

#[then(expr = "the user with email {string} has trust score {int}")]
async fn user_has_trust_score(world: &mut MarketWorld, email: String, expected: i64) {
    let user = open_db(world)
        .find_user_by_email(&email)
        .expect("query failed")
        .unwrap_or_else(|| panic!("no user with email {email}"));
    assert_eq!(user.trust_score, expected);
}

#[then(expr = "the user with email {string} is named {string}")]
async fn user_is_named(world: &mut MarketWorld, email: String, expected: String) {
    let user = open_db(world)
        .find_user_by_email(&email)
        .expect("query failed")
        .unwrap_or_else(|| panic!("no user with email {email}"));
    assert_eq!(user.name, expected);
}

#[then(expr = "there is {int} user(s) registered")]
async fn there_are_n_users(world: &mut MarketWorld, expected: i64) {
    let count: i64 = raw_connection(world)
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .expect("count users");
    assert_eq!(count, expected);
}
