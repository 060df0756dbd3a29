use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{open_existing, truncate_str};
use crate::CliError;

/// List a student's notifications, newest first.
pub(crate) fn run_list(db: Option<PathBuf>, student: i64, limit: Option<u32>) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let notifications = studyhub_db::notifications_of_student(&conn, student, limit)
        .map_err(|e| CliError::database(format!("Failed to load notifications: {}", e)))?;
    let unread = studyhub_db::count_unread(&conn, student)
        .map_err(|e| CliError::database(format!("Failed to count notifications: {}", e)))?;

    log::info!(
        "{} {}",
        format!("Notifications for student #{}", student).if_supports_color(Stdout, |t| t.bold()),
        format!("({} unread)", unread).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if notifications.is_empty() {
        log::info!("  {}", "none".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    for n in &notifications {
        let marker = if n.read { " " } else { "*" };
        log::info!(
            "  {} {:>5}  {}  {:<13}  {}",
            marker.if_supports_color(Stdout, |t| t.yellow()),
            n.id,
            n.date.format("%Y-%m-%d %H:%M"),
            n.kind.as_str(),
            truncate_str(&n.message, 60),
        );
    }
    Ok(())
}

pub(crate) fn run_read(db: Option<PathBuf>, student: i64, id: i64) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    studyhub_db::mark_as_read(&conn, student, id).map_err(map_notification_error)?;
    log::info!("Notification #{} marked as read", id);
    Ok(())
}

pub(crate) fn run_unread(db: Option<PathBuf>, student: i64, id: i64) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    studyhub_db::mark_as_unread(&conn, student, id).map_err(map_notification_error)?;
    log::info!("Notification #{} marked as unread", id);
    Ok(())
}

pub(crate) fn run_delete(db: Option<PathBuf>, student: i64, id: i64) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    studyhub_db::delete_notification(&conn, student, id).map_err(map_notification_error)?;
    log::info!(
        "{} notification #{}",
        "Deleted".if_supports_color(Stdout, |t| t.red()),
        id,
    );
    Ok(())
}

fn map_notification_error(e: studyhub_db::OperationError) -> CliError {
    match e {
        studyhub_db::OperationError::NotFound { entity_type, id } => {
            CliError::not_found(format!("{} {}", entity_type, id))
        }
        other => CliError::database(other.to_string()),
    }
}
