//! Support topics and the messages exchanged on them.

use rusqlite::{params, Connection, Row};
use studyhub_catalog::*;

use crate::notifications::insert_notification;
use crate::operations::{require_positive, OperationError};

/// Open a topic. Returns the new topic id.
pub fn open_topic(
    conn: &Connection,
    student_id: i64,
    category: &str,
    title: &str,
    message: &str,
) -> Result<i64, OperationError> {
    require_positive("student id", student_id)?;
    conn.execute(
        "INSERT INTO support_topics (id_student, category, title, message)
         VALUES (?1, ?2, ?3, ?4)",
        params![student_id, category, title, message],
    )?;
    let id = conn.last_insert_rowid();
    log::debug!("Student {student_id} opened support topic {id}");
    Ok(id)
}

pub fn get_topic(conn: &Connection, topic_id: i64) -> Result<Option<SupportTopic>, OperationError> {
    require_positive("topic id", topic_id)?;
    let mut stmt = conn.prepare(
        "SELECT id_topic, id_student, category, title, date, closed
         FROM support_topics WHERE id_topic = ?1",
    )?;
    let result = stmt.query_row(params![topic_id], |row| {
        Ok(SupportTopic {
            id: row.get(0)?,
            student_id: row.get(1)?,
            category: row.get(2)?,
            title: row.get(3)?,
            date: row.get(4)?,
            closed: row.get(5)?,
        })
    });
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Reply to an open topic. When someone other than the topic's owner
/// replies, the owner is notified. Returns the reply id.
pub fn reply_to_topic(
    conn: &Connection,
    topic_id: i64,
    author_id: i64,
    message: &str,
) -> Result<i64, OperationError> {
    require_positive("author id", author_id)?;
    let topic = get_topic(conn, topic_id)?.ok_or_else(|| OperationError::NotFound {
        entity_type: "support topic".to_string(),
        id: topic_id.to_string(),
    })?;
    if topic.closed {
        return Err(OperationError::NotFound {
            entity_type: "open support topic".to_string(),
            id: topic_id.to_string(),
        });
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO support_topic_replies (id_topic, id_user, text) VALUES (?1, ?2, ?3)",
        params![topic_id, author_id, message],
    )?;
    let reply_id = tx.last_insert_rowid();
    if author_id != topic.student_id {
        insert_notification(
            &tx,
            topic.student_id,
            NotificationKind::SupportTopic,
            Some(topic_id),
            &format!("New reply on \"{}\"", topic.title),
        )?;
    }
    tx.commit()?;
    Ok(reply_id)
}

/// Messages of a topic, the opening message first, then replies by date.
pub fn topic_messages(conn: &Connection, topic_id: i64) -> Result<Vec<Message>, OperationError> {
    require_positive("topic id", topic_id)?;
    let mut stmt = conn.prepare(
        "SELECT id, author, author_name, date, content FROM (
             SELECT 0 AS seq, t.id_topic AS id, t.id_student AS author, s.name AS author_name,
                    t.date AS date, t.message AS content
             FROM support_topics t JOIN students s ON s.id_student = t.id_student
             WHERE t.id_topic = ?1
             UNION ALL
             SELECT 1, r.id_reply, r.id_user, s.name, r.date, r.text
             FROM support_topic_replies r JOIN students s ON s.id_student = r.id_user
             WHERE r.id_topic = ?1
         )
         ORDER BY seq, date, id",
    )?;
    let rows = stmt.query_map(params![topic_id], row_to_message)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn close_topic(conn: &Connection, topic_id: i64) -> Result<(), OperationError> {
    require_positive("topic id", topic_id)?;
    let changed = conn.execute(
        "UPDATE support_topics SET closed = 1 WHERE id_topic = ?1",
        params![topic_id],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "support topic".to_string(),
            id: topic_id.to_string(),
        });
    }
    Ok(())
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_name: row.get(2)?,
        date: row.get(3)?,
        content: row.get(4)?,
    })
}
