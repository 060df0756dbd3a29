//! Student notifications: listing, read/unread flags, deletion.
//!
//! Every operation is scoped to the owning student; touching another
//! student's notification affects nothing and reports `NotFound`.

use rusqlite::{params, Connection, Row};
use studyhub_catalog::*;

use crate::operations::{require_positive, OperationError};
use crate::query::SelectQuery;

/// Create a notification for a student. Returns the new notification id.
pub fn insert_notification(
    conn: &Connection,
    student_id: i64,
    kind: NotificationKind,
    reference_id: Option<i64>,
    message: &str,
) -> Result<i64, OperationError> {
    require_positive("student id", student_id)?;
    conn.execute(
        "INSERT INTO notifications (id_student, id_reference, type, message)
         VALUES (?1, ?2, ?3, ?4)",
        params![student_id, reference_id, kind.as_str(), message],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A student's notifications, newest first.
pub fn notifications_of_student(
    conn: &Connection,
    student_id: i64,
    limit: Option<u32>,
) -> Result<Vec<Notification>, OperationError> {
    require_positive("student id", student_id)?;
    let mut query = SelectQuery::from("notifications").columns([
        "id_notification",
        "id_student",
        "date",
        "id_reference",
        "type",
        "message",
        "read",
    ]);
    let student = query.bind(student_id);
    query = query
        .filter(format!("id_student = {student}"))
        .order_by("date", OrderDirection::Descending)
        .order_by("id_notification", OrderDirection::Descending);
    if let Some(n) = limit.filter(|n| *n > 0) {
        query = query.limit(n);
    }
    query.query_map(conn, row_to_notification)
}

pub fn count_unread(conn: &Connection, student_id: i64) -> Result<u64, OperationError> {
    require_positive("student id", student_id)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE id_student = ?1 AND read = 0",
        params![student_id],
        |r| r.get(0),
    )?;
    Ok(count as u64)
}

pub fn mark_as_read(
    conn: &Connection,
    student_id: i64,
    notification_id: i64,
) -> Result<(), OperationError> {
    set_read(conn, student_id, notification_id, true)
}

pub fn mark_as_unread(
    conn: &Connection,
    student_id: i64,
    notification_id: i64,
) -> Result<(), OperationError> {
    set_read(conn, student_id, notification_id, false)
}

pub fn delete_notification(
    conn: &Connection,
    student_id: i64,
    notification_id: i64,
) -> Result<(), OperationError> {
    require_positive("student id", student_id)?;
    require_positive("notification id", notification_id)?;
    let changed = conn.execute(
        "DELETE FROM notifications WHERE id_notification = ?1 AND id_student = ?2",
        params![notification_id, student_id],
    )?;
    ensure_touched(changed, notification_id)
}

fn set_read(
    conn: &Connection,
    student_id: i64,
    notification_id: i64,
    read: bool,
) -> Result<(), OperationError> {
    require_positive("student id", student_id)?;
    require_positive("notification id", notification_id)?;
    let changed = conn.execute(
        "UPDATE notifications SET read = ?3 WHERE id_notification = ?1 AND id_student = ?2",
        params![notification_id, student_id, read],
    )?;
    ensure_touched(changed, notification_id)
}

fn ensure_touched(changed: usize, notification_id: i64) -> Result<(), OperationError> {
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "notification".to_string(),
            id: notification_id.to_string(),
        });
    }
    Ok(())
}

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(4)?;
    let kind = kind.parse::<NotificationKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Notification {
        id: row.get(0)?,
        student_id: row.get(1)?,
        date: row.get(2)?,
        reference_id: row.get(3)?,
        kind,
        message: row.get(5)?,
        read: row.get(6)?,
    })
}
