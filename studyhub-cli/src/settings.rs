//! Settings file handling (`~/.config/studyhub/settings.toml`).
//!
//! The only setting today is the default database path, stored as
//! `[database] path = "..."`.

use std::io;
use std::path::{Path, PathBuf};

/// Canonical path to the settings file: `~/.config/studyhub/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("studyhub").join("settings.toml")
}

/// Default database location when nothing else is configured.
pub(crate) fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyhub")
        .join("studyhub.db")
}

/// Resolve the database path using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `database.path` in `settings.toml`
/// 3. [`default_database_path`]
pub(crate) fn resolve_database_path(cli_override: Option<PathBuf>) -> PathBuf {
    resolve_database_path_in(cli_override, &settings_path())
}

pub(crate) fn resolve_database_path_in(cli_override: Option<PathBuf>, settings: &Path) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = load_database_path(settings) {
        return p;
    }
    default_database_path()
}

/// Read `database.path` from a settings file, if set.
fn load_database_path(settings: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let path = doc.get("database")?.get("path")?.as_str()?;
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Save the database path into a settings file.
///
/// Uses `toml::Value` for a surgical update so unrelated keys are preserved.
pub(crate) fn save_database_path(settings: &Path, path: &Path) -> io::Result<()> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let database = table
        .entry("database")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let db_table = database
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[database] is not a table"))?;
    db_table.insert(
        "path".to_string(),
        toml::Value::String(path.to_string_lossy().into_owned()),
    );

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;

    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub(crate) fn load_settings_string(settings: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cli_override_wins() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.toml");
        save_database_path(&settings, Path::new("/saved.db")).unwrap();
        let resolved = resolve_database_path_in(Some(PathBuf::from("/flag.db")), &settings);
        assert_eq!(resolved, PathBuf::from("/flag.db"));
    }

    #[test]
    fn saved_path_used_without_override() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("nested").join("settings.toml");
        save_database_path(&settings, Path::new("/saved.db")).unwrap();
        assert_eq!(
            resolve_database_path_in(None, &settings),
            PathBuf::from("/saved.db")
        );
    }

    #[test]
    fn falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("missing.toml");
        assert_eq!(
            resolve_database_path_in(None, &settings),
            default_database_path()
        );
    }

    #[test]
    fn save_preserves_other_keys() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.toml");
        std::fs::write(&settings, "[ui]\ncolor = false\n").unwrap();
        save_database_path(&settings, Path::new("/x.db")).unwrap();

        let shown = load_settings_string(&settings).unwrap();
        assert!(shown.contains("color = false"));
        assert!(shown.contains("path = \"/x.db\""));
    }
}
