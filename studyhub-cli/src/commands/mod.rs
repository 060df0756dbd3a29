pub(crate) mod bundles;
pub(crate) mod config;
pub(crate) mod db;
pub(crate) mod notifications;

use std::path::PathBuf;

use studyhub_db::Connection;

use crate::settings::resolve_database_path;
use crate::CliError;

/// Open the resolved database, failing if it has not been created yet.
pub(crate) fn open_existing(db: Option<PathBuf>) -> Result<Connection, CliError> {
    let path = resolve_database_path(db);
    if !path.exists() {
        log::warn!("No database found at {}", path.display());
        log::info!("Run 'studyhub db init' to create one.");
        return Err(CliError::not_found(format!("database {}", path.display())));
    }
    studyhub_db::open_database(&path)
        .map_err(|e| CliError::database(format!("Failed to open database: {}", e)))
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}

/// Format a length in minutes as `1h 05m` / `42m`.
pub(crate) fn format_minutes(minutes: u64) -> String {
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate_str("Python Basics", 20), "Python Basics");
        assert_eq!(truncate_str("Python Basics", 8), "Pytho...");
        assert_eq!(truncate_str("Python", 2), "Py");
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(42), "42m");
        assert_eq!(format_minutes(65), "1h 05m");
    }
}
