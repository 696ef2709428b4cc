use crate::db::Database;
use crate::session::SessionKey;
use axum::{
    Router,
    extract::Path as AxumPath,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_embed::Embed;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::trace::TraceLayer;

pub use errors::AppError;

/// Shared application state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub session_key: SessionKey,
}

impl AppState {
    pub fn new(db: Database, session_key: SessionKey) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            session_key,
        }
    }

    /// Lock the connection for the duration of one handler's statements.
    pub fn db(&self) -> Result<MutexGuard<'_, Database>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
    }
}

mod errors;
mod extract;
mod forms;
mod handlers;
mod templates;

/// Embedded static assets (stylesheet) compiled into the binary.
#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

/// Serve embedded static files at /static/{path}.
async fn static_handler(AxumPath(path): AxumPath<String>) -> Response {
    match StaticAssets::get(&path) {
        Some(content) => {
            let mime = if path.ends_with(".css") {
                "text/css"
            } else if path.ends_with(".js") {
                "application/javascript"
            } else {
                "application/octet-stream"
            };
            ([(header::CONTENT_TYPE, mime)], content.data).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Build the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/tasks", get(handlers::list_tasks))
        .route(
            "/post_task",
            get(handlers::post_task_page).post(handlers::post_task),
        )
        .route("/accept_task/{id}", get(handlers::accept_task))
        .route("/complete_task/{id}", get(handlers::complete_task))
        .route("/items", get(handlers::list_items))
        .route(
            "/list_item",
            get(handlers::list_item_page).post(handlers::list_item),
        )
        .route("/wanted", get(handlers::list_wanted))
        .route(
            "/post_wanted",
            get(handlers::post_wanted_page).post(handlers::post_wanted),
        )
        .route("/static/{*path}", get(static_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Campus rentals listening on http://{local}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
