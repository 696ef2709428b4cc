use std::path::Path;

use campus_rentals::db::Database;

use super::CommandError;

pub fn run(db_path: &Path) -> Result<(), CommandError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CommandError::Io {
            context: format!("failed to create directory {}", parent.display()),
            source,
        })?;
    }

    let db = Database::open(db_path)?;
    db.migrate()?;
    db.set_config("version", env!("CARGO_PKG_VERSION"))?;

    println!("Initialized campus rentals database at {}", db_path.display());
    println!("Schema version: {}", db.schema_version()?);
    Ok(())
}
