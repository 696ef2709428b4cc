use cucumber::{given, then, when};

use campus_rentals::models::{Task, TaskStatus};

use crate::MarketWorld;
use crate::steps::common_steps::open_db;
use crate::steps::web_steps::{get_as, post_form_as};

fn stored_task(world: &MarketWorld, id: i64) -> Task {
    open_db(world)
        .get_task(id)
        .expect("query failed")
        .unwrap_or_else(|| panic!("task {id} not found"))
}

async fn post_task(
    world: &mut MarketWorld,
    user: &str,
    description: &str,
    location: &str,
    reward: &str,
) -> (u16, String) {
    let fields = vec![
        ("description".to_string(), description.to_string()),
        ("location".to_string(), location.to_string()),
        ("reward".to_string(), reward.to_string()),
    ];
    post_form_as(world, user, "/post_task", &fields).await
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given(expr = "{string} posts a task {string} at {string} with reward {string}")]
async fn user_posted_a_task(
    world: &mut MarketWorld,
    user: String,
    description: String,
    location: String,
    reward: String,
) {
    let (status, body) = post_task(world, &user, &description, &location, &reward).await;
    assert_eq!(status, 200, "posting task failed: {body}");
}

#[given(expr = "{string} accepts task {int}")]
async fn user_accepted_task(world: &mut MarketWorld, user: String, id: i64) {
    get_as(world, &user, &format!("/accept_task/{id}")).await;
    assert_eq!(stored_task(world, id).status, TaskStatus::Accepted);
}

#[given(expr = "{string} completes task {int}")]
async fn user_completed_task(world: &mut MarketWorld, user: String, id: i64) {
    get_as(world, &user, &format!("/complete_task/{id}")).await;
    assert_eq!(stored_task(world, id).status, TaskStatus::Completed);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when(expr = "{string} posts a task {string} at {string} with reward {string}")]
async fn user_posts_a_task(
    world: &mut MarketWorld,
    user: String,
    description: String,
    location: String,
    reward: String,
) {
    post_task(world, &user, &description, &location, &reward).await;
}

#[when(expr = "{string} accepts task {int}")]
async fn user_accepts_task(world: &mut MarketWorld, user: String, id: i64) {
    get_as(world, &user, &format!("/accept_task/{id}")).await;
}

#[when(expr = "{string} completes task {int}")]
async fn user_completes_task(world: &mut MarketWorld, user: String, id: i64) {
    get_as(world, &user, &format!("/complete_task/{id}")).await;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "task {int} has status {string}")]
async fn task_has_status(world: &mut MarketWorld, id: i64, expected: String) {
    let expected = TaskStatus::from_str(&expected).expect("invalid status in feature");
    assert_eq!(stored_task(world, id).status, expected);
}

#[then(expr = "task {int} was posted by {string}")]
async fn task_was_posted_by(world: &mut MarketWorld, id: i64, expected: String) {
    assert_eq!(stored_task(world, id).posted_by, expected);
}

#[then(expr = "task {int} was accepted by {string}")]
async fn task_was_accepted_by(world: &mut MarketWorld, id: i64, expected: String) {
    assert_eq!(
        stored_task(world, id).accepted_by.as_deref(),
        Some(expected.as_str())
    );
}

#[then(expr = "task {int} has not been accepted")]
async fn task_has_not_been_accepted(world: &mut MarketWorld, id: i64) {
    assert_eq!(stored_task(world, id).accepted_by, None);
}

#[then(expr = "task {int} has reward {float}")]
async fn task_has_reward(world: &mut MarketWorld, id: i64, expected: f64) {
    let reward = stored_task(world, id).reward;
    assert!(
        (reward - expected).abs() < f64::EPSILON,
        "expected reward {expected}, got {reward}"
    );
}
