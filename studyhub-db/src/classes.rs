//! Video and questionnaire classes, and per-student watch progress.

use rusqlite::{params, Connection, Row};
use studyhub_catalog::*;

use crate::operations::{require_positive, OperationError};

// ── Questionnaires ──────────────────────────────────────────────────────────

/// Get a questionnaire class by module and position.
pub fn get_questionnaire(
    conn: &Connection,
    module_id: i64,
    class_order: i64,
) -> Result<Option<Questionnaire>, OperationError> {
    require_positive("module id", module_id)?;
    require_positive("class order", class_order)?;
    let mut stmt = conn.prepare(
        "SELECT id_module, class_order, question, q1, q2, q3, q4, answer
         FROM questionnaires WHERE id_module = ?1 AND class_order = ?2",
    )?;
    let result = stmt.query_row(params![module_id, class_order], row_to_questionnaire);
    match result {
        Ok(q) => Ok(Some(q)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Correct option (1-4) of a questionnaire, if the class exists.
pub fn questionnaire_answer(
    conn: &Connection,
    module_id: i64,
    class_order: i64,
) -> Result<Option<u8>, OperationError> {
    Ok(get_questionnaire(conn, module_id, class_order)?.map(|q| q.answer))
}

pub fn questionnaires_of_module(
    conn: &Connection,
    module_id: i64,
) -> Result<Vec<Questionnaire>, OperationError> {
    require_positive("module id", module_id)?;
    let mut stmt = conn.prepare(
        "SELECT id_module, class_order, question, q1, q2, q3, q4, answer
         FROM questionnaires WHERE id_module = ?1 ORDER BY class_order",
    )?;
    let rows = stmt.query_map(params![module_id], row_to_questionnaire)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Total length of all questionnaires, in minutes.
pub fn total_questionnaire_length(conn: &Connection) -> Result<u64, OperationError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM questionnaires", [], |r| r.get(0))?;
    Ok(count as u64 * u64::from(QUESTIONNAIRE_LENGTH_MINUTES))
}

// ── Videos ──────────────────────────────────────────────────────────────────

pub fn get_video(
    conn: &Connection,
    module_id: i64,
    class_order: i64,
) -> Result<Option<Video>, OperationError> {
    require_positive("module id", module_id)?;
    require_positive("class order", class_order)?;
    let mut stmt = conn.prepare(
        "SELECT id_module, class_order, title, videoID, length, description
         FROM videos WHERE id_module = ?1 AND class_order = ?2",
    )?;
    let result = stmt.query_row(params![module_id, class_order], row_to_video);
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn videos_of_module(conn: &Connection, module_id: i64) -> Result<Vec<Video>, OperationError> {
    require_positive("module id", module_id)?;
    let mut stmt = conn.prepare(
        "SELECT id_module, class_order, title, videoID, length, description
         FROM videos WHERE id_module = ?1 ORDER BY class_order",
    )?;
    let rows = stmt.query_map(params![module_id], row_to_video)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Total length of all videos, in minutes.
pub fn total_video_length(conn: &Connection) -> Result<u64, OperationError> {
    let total: i64 =
        conn.query_row("SELECT COALESCE(SUM(length), 0) FROM videos", [], |r| r.get(0))?;
    Ok(total as u64)
}

// ── Progress ────────────────────────────────────────────────────────────────

/// Record that a student watched a class. Watching twice is a no-op.
///
/// The class must exist with the given type, otherwise `NotFound`.
pub fn mark_as_watched(
    conn: &Connection,
    student_id: i64,
    module_id: i64,
    class_order: i64,
    class_type: ClassType,
) -> Result<(), OperationError> {
    require_positive("student id", student_id)?;
    require_positive("module id", module_id)?;
    require_positive("class order", class_order)?;
    let sql = format!(
        "INSERT OR IGNORE INTO student_historic (id_student, id_module, class_order, class_type)
         SELECT ?1, id_module, class_order, ?4 FROM {}
         WHERE id_module = ?2 AND class_order = ?3",
        class_table(class_type),
    );
    let inserted = conn.execute(
        &sql,
        params![student_id, module_id, class_order, class_type.as_str()],
    )?;
    if inserted > 0 {
        return Ok(());
    }

    // Nothing inserted: either already watched or no such class.
    let exists: bool = conn.query_row(
        &format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id_module = ?1 AND class_order = ?2)",
            class_table(class_type),
        ),
        params![module_id, class_order],
        |r| r.get(0),
    )?;
    if exists {
        return Ok(());
    }
    Err(OperationError::NotFound {
        entity_type: class_type.as_str().to_string(),
        id: format!("{module_id}/{class_order}"),
    })
}

fn class_table(class_type: ClassType) -> &'static str {
    match class_type {
        ClassType::Video => "videos",
        ClassType::Questionnaire => "questionnaires",
    }
}

/// Remove a watched mark. Returns whether a mark existed.
pub fn unmark_watched(
    conn: &Connection,
    student_id: i64,
    module_id: i64,
    class_order: i64,
) -> Result<bool, OperationError> {
    require_positive("student id", student_id)?;
    require_positive("module id", module_id)?;
    require_positive("class order", class_order)?;
    let removed = conn.execute(
        "DELETE FROM student_historic
         WHERE id_student = ?1 AND id_module = ?2 AND class_order = ?3",
        params![student_id, module_id, class_order],
    )?;
    Ok(removed > 0)
}

/// Watched and total class counts of a course for one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseProgress {
    pub watched: u64,
    pub total: u64,
}

impl CourseProgress {
    /// Completion percentage, 0 for a course without classes.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.watched * 100) / self.total).min(100) as u8
    }
}

pub fn course_progress(
    conn: &Connection,
    student_id: i64,
    course_id: i64,
) -> Result<CourseProgress, OperationError> {
    require_positive("student id", student_id)?;
    require_positive("course id", course_id)?;
    let (watched, total): (i64, i64) = conn.query_row(
        "SELECT
             (SELECT COUNT(*) FROM student_historic h
              JOIN (SELECT id_module, class_order FROM videos
                    UNION ALL
                    SELECT id_module, class_order FROM questionnaires) AS watched
                ON watched.id_module = h.id_module AND watched.class_order = h.class_order
              JOIN course_modules cm ON cm.id_module = h.id_module
              WHERE h.id_student = ?1 AND cm.id_course = ?2),
             (SELECT COUNT(*) FROM (SELECT id_module FROM videos
                                    UNION ALL
                                    SELECT id_module FROM questionnaires) AS classes
              JOIN course_modules cm ON cm.id_module = classes.id_module
              WHERE cm.id_course = ?2)",
        params![student_id, course_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(CourseProgress {
        watched: watched as u64,
        total: total as u64,
    })
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_questionnaire(row: &Row<'_>) -> rusqlite::Result<Questionnaire> {
    Ok(Questionnaire {
        module_id: row.get(0)?,
        class_order: row.get(1)?,
        question: row.get(2)?,
        options: [row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
        answer: row.get(7)?,
    })
}

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        module_id: row.get(0)?,
        class_order: row.get(1)?,
        title: row.get(2)?,
        video_id: row.get(3)?,
        length: row.get(4)?,
        description: row.get(5)?,
    })
}
