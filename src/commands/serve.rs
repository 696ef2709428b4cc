use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use campus_rentals::db::Database;
use campus_rentals::session::SessionKey;
use campus_rentals::web::{self, AppState};
use tracing::{info, warn};

use super::CommandError;

pub async fn run(
    db_path: &Path,
    host: IpAddr,
    port: u16,
    session_secret: Option<&str>,
) -> Result<(), CommandError> {
    let db = Database::open(db_path)?;
    db.migrate()?;
    let version = db.schema_version()?;
    info!(db = %db_path.display(), version, "database ready");

    let session_key = match session_secret {
        Some(secret) if !secret.is_empty() => SessionKey::new(secret.as_bytes()),
        _ => {
            warn!("SESSION_SECRET not set, generated a random key; sessions end on restart");
            SessionKey::generate()
        }
    };

    let addr = SocketAddr::new(host, port);
    web::serve(AppState::new(db, session_key), addr)
        .await
        .map_err(|source| CommandError::Io {
            context: format!("server error on {addr}"),
            source,
        })
}
