use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::settings::resolve_database_path;
use crate::CliError;

/// Create the database file (and its directory) with the current schema.
pub(crate) fn run_init(db: Option<PathBuf>) -> Result<(), CliError> {
    let path = resolve_database_path(db);
    let existed = path.exists();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = studyhub_db::open_database(&path)
        .map_err(|e| CliError::database(format!("Failed to create database: {}", e)))?;
    let version = studyhub_db::schema::schema_version(&conn)
        .map_err(|e| CliError::database(format!("Failed to read schema version: {}", e)))?;

    if existed {
        log::info!(
            "Database {} already exists (schema v{})",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            version,
        );
    } else {
        log::info!(
            "{} {} (schema v{})",
            "Created".if_supports_color(Stdout, |t| t.green()),
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            version,
        );
    }
    Ok(())
}

/// Load a YAML fixture into the database, creating it if needed.
pub(crate) fn run_seed(db: Option<PathBuf>, fixture: &Path) -> Result<(), CliError> {
    let seed = studyhub_catalog::load_seed(fixture).map_err(|e| CliError::fixture(e.to_string()))?;

    let path = resolve_database_path(db);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = studyhub_db::open_database(&path)
        .map_err(|e| CliError::database(format!("Failed to open database: {}", e)))?;

    log::debug!("Seeding {} from {}", path.display(), fixture.display());
    let stats = studyhub_db::seed_from_fixture(&conn, &seed)
        .map_err(|e| CliError::database(format!("Failed to seed database: {}", e)))?;

    log::info!(
        "{}",
        "Seed complete".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Students:   {:>6}", stats.students);
    log::info!("  Courses:    {:>6}", stats.courses);
    log::info!("  Modules:    {:>6}", stats.modules);
    log::info!("  Classes:    {:>6}", stats.classes);
    log::info!("  Bundles:    {:>6}", stats.bundles);
    log::info!("  Purchases:  {:>6}", stats.purchases);
    Ok(())
}
