use askama::Template;

use crate::db::BoardCounts;
use crate::models::{Item, Task, TaskStatus, Urgency, WantedRequest};
use crate::session::Identity;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
    pub name: String,
    pub trust_score: i64,
    pub counts: BoardCounts,
}

#[derive(Template)]
#[template(path = "tasks.html")]
pub struct TasksTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
    pub tasks: Vec<TaskRow>,
    pub open_only: bool,
}

#[derive(Template)]
#[template(path = "post_task.html")]
pub struct PostTaskTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
}

#[derive(Template)]
#[template(path = "items.html")]
pub struct ItemsTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
    pub items: Vec<ItemRow>,
    pub show_all: bool,
}

#[derive(Template)]
#[template(path = "list_item.html")]
pub struct ListItemTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
}

#[derive(Template)]
#[template(path = "wanted.html")]
pub struct WantedTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
    pub requests: Vec<WantedRow>,
}

#[derive(Template)]
#[template(path = "post_wanted.html")]
pub struct PostWantedTemplate {
    pub nav_user: Option<String>,
    pub flashes: Vec<String>,
    pub urgencies: Vec<&'static str>,
}

impl PostWantedTemplate {
    pub fn new(nav_user: Option<String>, flashes: Vec<String>) -> Self {
        Self {
            nav_user,
            flashes,
            urgencies: Urgency::ALL.iter().map(|u| u.as_str()).collect(),
        }
    }
}

/// A task as the board shows it to one viewer.
pub struct TaskRow {
    pub id: i64,
    pub heading: String,
    pub description: String,
    pub location: String,
    pub reward: String,
    pub posted_by: String,
    pub accepted_by: String,
    pub status: &'static str,
    pub posted_at: String,
    pub can_accept: bool,
    pub can_complete: bool,
}

impl TaskRow {
    pub fn new(task: &Task, viewer: &Identity) -> Self {
        Self {
            id: task.id,
            heading: task.heading().to_string(),
            description: task.description.clone(),
            location: task.location.clone().unwrap_or_default(),
            reward: money(task.reward),
            posted_by: task.posted_by.clone(),
            accepted_by: task.accepted_by.clone().unwrap_or_default(),
            status: task.status.as_str(),
            posted_at: task.created_at.format("%Y-%m-%d %H:%M").to_string(),
            can_accept: task.status == TaskStatus::Open,
            can_complete: task.status == TaskStatus::Accepted
                && task.accepted_by_user == Some(viewer.user_id),
        }
    }
}

pub struct ItemRow {
    pub item_name: String,
    pub description: String,
    pub category: String,
    pub price_per_day: String,
    pub owner_name: String,
    pub available: bool,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            item_name: item.item_name.clone(),
            description: item.description.clone().unwrap_or_default(),
            category: item.category.clone().unwrap_or_default(),
            price_per_day: money(item.price_per_day),
            owner_name: item.owner_name.clone(),
            available: item.is_available,
        }
    }
}

pub struct WantedRow {
    pub item_name: String,
    pub max_budget: String,
    pub requester_name: String,
    pub urgency: &'static str,
    pub posted_at: String,
}

impl From<&WantedRequest> for WantedRow {
    fn from(request: &WantedRequest) -> Self {
        Self {
            item_name: request.item_name.clone(),
            max_budget: money(request.max_budget),
            requester_name: request.requester_name.clone(),
            urgency: request.urgency.as_str(),
            posted_at: request.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}
