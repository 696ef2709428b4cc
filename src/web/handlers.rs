use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use super::errors::AppError;
use super::extract::{CurrentUser, Flashes, redirect_with_flash, render_page, with_cookies};
use super::forms::{ListItemForm, LoginForm, PostTaskForm, PostWantedForm};
use super::templates::{
    DashboardTemplate, ItemRow, ItemsTemplate, ListItemTemplate, LoginTemplate, PostTaskTemplate,
    PostWantedTemplate, TaskRow, TasksTemplate, WantedRow, WantedTemplate,
};
use crate::db::TaskFilter;
use crate::models::{DEFAULT_TRUST_SCORE, Transition};
use crate::session::{self, Identity, SESSION_COOKIE};

// -- Session --

pub async fn login_page(
    State(state): State<AppState>,
    Flashes(flashes): Flashes,
    headers: axum::http::HeaderMap,
) -> Result<Response, AppError> {
    let nav_user = session::identity_from_headers(&state.session_key, &headers).map(|i| i.name);
    let shown = !flashes.is_empty();
    render_page(LoginTemplate { nav_user, flashes }.render()?, shown)
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let (name, email) = form.validate()?;
    let (user, created) = state.db()?.find_or_create_user(&name, &email)?;
    if created {
        info!(user_id = user.id, email = %user.email, "registered new user");
    }
    info!(user_id = user.id, "user logged in");

    let cookie = session::session_cookie(&state.session_key, &Identity::from(&user))?;
    with_cookies(Redirect::to("/dashboard"), &[cookie])
}

pub async fn logout() -> Result<Response, AppError> {
    with_cookies(
        Redirect::to("/"),
        &[session::removal_cookie(SESSION_COOKIE)],
    )
}

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    let (trust_score, counts) = {
        let db = state.db()?;
        let trust = db
            .get_user(user.user_id)?
            .map_or(DEFAULT_TRUST_SCORE, |u| u.trust_score);
        (trust, db.board_counts()?)
    };
    let shown = !flashes.is_empty();
    let page = DashboardTemplate {
        nav_user: Some(user.name.clone()),
        flashes,
        name: user.name,
        trust_score,
        counts,
    };
    render_page(page.render()?, shown)
}

// -- Tasks --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskQuery {
    pub status: Option<String>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
    Query(query): Query<TaskQuery>,
) -> Result<Response, AppError> {
    let filter = match query.status.as_deref() {
        None | Some("") | Some("all") => TaskFilter::All,
        Some("open") => TaskFilter::Open,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "unknown status filter: {other}. valid filters: all, open"
            )));
        }
    };
    let tasks = state.db()?.list_tasks(filter)?;
    let shown = !flashes.is_empty();
    let page = TasksTemplate {
        tasks: tasks.iter().map(|t| TaskRow::new(t, &user)).collect(),
        nav_user: Some(user.name),
        flashes,
        open_only: filter == TaskFilter::Open,
    };
    render_page(page.render()?, shown)
}

pub async fn post_task_page(
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    let shown = !flashes.is_empty();
    let page = PostTaskTemplate {
        nav_user: Some(user.name),
        flashes,
    };
    render_page(page.render()?, shown)
}

pub async fn post_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostTaskForm>,
) -> Result<Response, AppError> {
    let new_task = form.validate(&user)?;
    let task = state.db()?.insert_task(&new_task)?;
    info!(task_id = task.id, posted_by = %task.posted_by, "task posted");
    redirect_with_flash(&state, "/tasks", "Task posted successfully!")
}

/// The session outlived its user row (e.g. the database was replaced).
fn user_is_gone(state: &AppState, user: &Identity) -> Result<bool, AppError> {
    let gone = state.db()?.get_user(user.user_id)?.is_none();
    if gone {
        warn!(user_id = user.user_id, "session refers to a missing user");
    }
    Ok(gone)
}

pub async fn accept_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<Response, AppError> {
    if user_is_gone(&state, &user)? {
        return logout().await;
    }
    let outcome = {
        let db = state.db()?;
        let outcome = db.accept_task(task_id, user.user_id, &user.name)?;
        if outcome == Transition::Skipped && db.get_task(task_id)?.is_none() {
            return Err(AppError::NotFound(format!("task not found: {task_id}")));
        }
        outcome
    };

    let message = match outcome {
        Transition::Applied => {
            info!(task_id, accepted_by = %user.name, "task accepted");
            "Task accepted!"
        }
        Transition::Skipped => "Task is no longer open.",
    };
    redirect_with_flash(&state, "/tasks", message)
}

pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<Response, AppError> {
    if user_is_gone(&state, &user)? {
        return logout().await;
    }
    let outcome = {
        let mut db = state.db()?;
        let outcome = db.complete_task(task_id, user.user_id)?;
        if outcome == Transition::Skipped && db.get_task(task_id)?.is_none() {
            return Err(AppError::NotFound(format!("task not found: {task_id}")));
        }
        outcome
    };

    let message = match outcome {
        Transition::Applied => {
            info!(task_id, user_id = user.user_id, "task completed, trust awarded");
            "Task completed! Trust increased."
        }
        Transition::Skipped => "Only the user who accepted this task can complete it.",
    };
    redirect_with_flash(&state, "/tasks", message)
}

// -- Items --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemQuery {
    pub all: Option<String>,
}

pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
    Query(query): Query<ItemQuery>,
) -> Result<Response, AppError> {
    let show_all = match query.all.as_deref() {
        None | Some("") | Some("false") => false,
        Some("true") => true,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "unknown value for all: {other}. valid values: true, false"
            )));
        }
    };
    let items = state.db()?.list_items(show_all)?;
    let shown = !flashes.is_empty();
    let page = ItemsTemplate {
        nav_user: Some(user.name),
        flashes,
        items: items.iter().map(ItemRow::from).collect(),
        show_all,
    };
    render_page(page.render()?, shown)
}

pub async fn list_item_page(
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    let shown = !flashes.is_empty();
    let page = ListItemTemplate {
        nav_user: Some(user.name),
        flashes,
    };
    render_page(page.render()?, shown)
}

pub async fn list_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ListItemForm>,
) -> Result<Response, AppError> {
    let new_item = form.validate(&user)?;
    let item = state.db()?.insert_item(&new_item)?;
    info!(item_id = item.id, owner = %item.owner_name, "item listed");
    redirect_with_flash(&state, "/items", "Item listed successfully!")
}

// -- Wanted requests --

pub async fn list_wanted(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    let requests = state.db()?.list_open_wanted()?;
    let shown = !flashes.is_empty();
    let page = WantedTemplate {
        nav_user: Some(user.name),
        flashes,
        requests: requests.iter().map(WantedRow::from).collect(),
    };
    render_page(page.render()?, shown)
}

pub async fn post_wanted_page(
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
) -> Result<Response, AppError> {
    let shown = !flashes.is_empty();
    render_page(
        PostWantedTemplate::new(Some(user.name), flashes).render()?,
        shown,
    )
}

pub async fn post_wanted(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostWantedForm>,
) -> Result<Response, AppError> {
    let new_request = form.validate(&user)?;
    let request = state.db()?.insert_wanted(&new_request)?;
    info!(request_id = request.id, requester = %request.requester_name, "wanted request posted");
    redirect_with_flash(&state, "/wanted", "Request posted successfully!")
}
