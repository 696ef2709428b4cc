mod steps;

use std::collections::HashMap;
use std::path::PathBuf;

use cucumber::World;

/// Shared state carried through each scenario.
#[derive(Debug, Default, World)]
pub struct MarketWorld {
    /// Temporary directory that owns the database file.
    pub db_dir: Option<tempfile::TempDir>,
    /// Path to the SQLite database file inside `db_dir`.
    pub db_path: Option<PathBuf>,
    /// Port of the in-process web server, once started.
    pub server_port: Option<u16>,
    /// Task running the in-process web server.
    pub server_handle: Option<tokio::task::JoinHandle<()>>,
    /// One cookie-keeping HTTP client per named user.
    pub clients: HashMap<String, reqwest::Client>,
    /// Status of the most recent HTTP response (after redirects).
    pub last_response_status: Option<u16>,
    /// Path the most recent request ended up on after redirects.
    pub last_response_path: Option<String>,
    /// Content-Type of the most recent HTTP response.
    pub last_response_content_type: Option<String>,
    /// Body of the most recent HTTP response.
    pub last_response_body: Option<String>,
    /// The raw stdout of the most recent CLI invocation.
    pub last_stdout: String,
    /// Exit code of the most recent CLI invocation.
    pub last_exit_code: i32,
}

#[tokio::main]
async fn main() {
    MarketWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/features")
        .await;
}
