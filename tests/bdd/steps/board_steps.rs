use cucumber::{given, then};

use crate::MarketWorld;
use crate::steps::common_steps::{open_db, raw_connection};

// ---------------------------------------------------------------------------
// Given steps: rows no route can create
// ---------------------------------------------------------------------------

#[given(expr = "an unavailable item {string} owned by {string}")]
async fn an_unavailable_item(world: &mut MarketWorld, item_name: String, owner: String) {
    raw_connection(world)
        .execute(
            "INSERT INTO items (item_name, price_per_day, owner_name, is_available)
             VALUES (?1, 3.0, ?2, 0)",
            rusqlite::params![item_name, owner],
        )
        .expect("insert unavailable item");
}

#[given(expr = "a fulfilled wanted request for {string} by {string}")]
async fn a_fulfilled_wanted_request(world: &mut MarketWorld, item_name: String, requester: String) {
    raw_connection(world)
        .execute(
            "INSERT INTO wanted (item_name, max_budget, requester_name, urgency, status, created_at)
             VALUES (?1, 15.0, ?2, 'low', 'fulfilled', '2024-01-01T00:00:00.000000Z')",
            rusqlite::params![item_name, requester],
        )
        .expect("insert fulfilled request");
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "{int} item(s) is/are listed as available")]
async fn n_items_available(world: &mut MarketWorld, expected: usize) {
    let items = open_db(world).list_items(false).expect("list items");
    assert!(items.iter().all(|i| i.is_available));
    assert_eq!(items.len(), expected);
}

#[then(expr = "the item {string} is owned by {string}")]
async fn item_is_owned_by(world: &mut MarketWorld, item_name: String, owner: String) {
    let items = open_db(world).list_items(true).expect("list items");
    let item = items
        .iter()
        .find(|i| i.item_name == item_name)
        .unwrap_or_else(|| panic!("no item named {item_name}"));
    assert_eq!(item.owner_name, owner);
    assert!(item.is_available, "new listings start available");
}

#[then(expr = "there is {int} open wanted request(s)")]
async fn n_open_wanted(world: &mut MarketWorld, expected: usize) {
    let requests = open_db(world).list_open_wanted().expect("list wanted");
    assert_eq!(requests.len(), expected);
}
