use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::settings;
use crate::CliError;

/// Show the settings file and the database path that would be used.
pub(crate) fn run_show(db: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "studyhub Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let from_flag = db.is_some();
    let resolved = settings::resolve_database_path(db);
    let source = if from_flag {
        "(--db)"
    } else if resolved == settings::default_database_path() {
        "(default)"
    } else {
        "(settings)"
    };
    log::info!(
        "  Database:      {} {}",
        resolved.display().if_supports_color(Stdout, |t| t.cyan()),
        source.if_supports_color(Stdout, |t| t.dimmed()),
    );

    if let Some(contents) = settings::load_settings_string(&path) {
        crate::log_blank();
        for line in contents.lines() {
            log::info!("  {}", line);
        }
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_path() -> Result<(), CliError> {
    log::info!("{}", settings::settings_path().display());
    Ok(())
}

/// Save `path` as the default database.
pub(crate) fn run_set_db(path: &Path) -> Result<(), CliError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let settings_file = settings::settings_path();
    settings::save_database_path(&settings_file, &absolute)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;

    log::info!(
        "Database path set to {}",
        absolute.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "  {}",
        format!("saved to {}", settings_file.display()).if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}
