//! Write operations and fixture seeding.

use rusqlite::{params, Connection};
use studyhub_catalog::yaml::SeedData;
use studyhub_catalog::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Invalid argument: {what} must be positive, got {value}")]
    InvalidArgument { what: &'static str, value: i64 },
    #[error("Data access error: {0}")]
    DataAccess(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Class position {class_order} of module {module_id} is already taken")]
    SlotTaken { module_id: i64, class_order: i64 },
    #[error("Seed error: {0}")]
    Seed(String),
}

/// Fail with `InvalidArgument` unless `value > 0`.
pub(crate) fn require_positive(what: &'static str, value: i64) -> Result<(), OperationError> {
    if value <= 0 {
        return Err(OperationError::InvalidArgument { what, value });
    }
    Ok(())
}

// ── Student Operations ──────────────────────────────────────────────────────

pub fn insert_student(conn: &Connection, student: &Student) -> Result<(), OperationError> {
    require_positive("student id", student.id)?;
    conn.execute(
        "INSERT INTO students (id_student, name, email) VALUES (?1, ?2, ?3)",
        params![student.id, student.name, student.email],
    )?;
    Ok(())
}

// ── Course Operations ───────────────────────────────────────────────────────

pub fn insert_course(conn: &Connection, course: &Course) -> Result<(), OperationError> {
    require_positive("course id", course.id)?;
    conn.execute(
        "INSERT INTO courses (id_course, name, logo, description) VALUES (?1, ?2, ?3, ?4)",
        params![course.id, course.name, course.logo, course.description],
    )?;
    Ok(())
}

pub fn insert_module(
    conn: &Connection,
    module: &Module,
) -> Result<(), OperationError> {
    require_positive("module id", module.id)?;
    conn.execute(
        "INSERT INTO modules (id_module, name) VALUES (?1, ?2)",
        params![module.id, module.name],
    )?;
    Ok(())
}

/// Attach a module to a course at the given position.
pub fn add_module_to_course(
    conn: &Connection,
    course_id: i64,
    module_id: i64,
    order: i64,
) -> Result<(), OperationError> {
    require_positive("course id", course_id)?;
    require_positive("module id", module_id)?;
    require_positive("module order", order)?;
    conn.execute(
        "INSERT INTO course_modules (id_course, id_module, module_order) VALUES (?1, ?2, ?3)
         ON CONFLICT(id_course, id_module) DO UPDATE SET module_order = excluded.module_order",
        params![course_id, module_id, order],
    )?;
    Ok(())
}

// ── Class Operations ────────────────────────────────────────────────────────

/// Videos and questionnaires share one position space per module.
fn ensure_slot_free(
    conn: &Connection,
    module_id: i64,
    class_order: i64,
) -> Result<(), OperationError> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM videos WHERE id_module = ?1 AND class_order = ?2)
             OR EXISTS (SELECT 1 FROM questionnaires WHERE id_module = ?1 AND class_order = ?2)",
        params![module_id, class_order],
        |r| r.get(0),
    )?;
    if taken {
        return Err(OperationError::SlotTaken {
            module_id,
            class_order,
        });
    }
    Ok(())
}

pub fn insert_video(conn: &Connection, video: &Video) -> Result<(), OperationError> {
    require_positive("module id", video.module_id)?;
    require_positive("class order", video.class_order)?;
    ensure_slot_free(conn, video.module_id, video.class_order)?;
    conn.execute(
        "INSERT INTO videos (id_module, class_order, title, description, videoID, length)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            video.module_id,
            video.class_order,
            video.title,
            video.description,
            video.video_id,
            video.length,
        ],
    )?;
    Ok(())
}

pub fn insert_questionnaire(
    conn: &Connection,
    quest: &Questionnaire,
) -> Result<(), OperationError> {
    require_positive("module id", quest.module_id)?;
    require_positive("class order", quest.class_order)?;
    ensure_slot_free(conn, quest.module_id, quest.class_order)?;
    let [q1, q2, q3, q4] = &quest.options;
    conn.execute(
        "INSERT INTO questionnaires (id_module, class_order, question, q1, q2, q3, q4, answer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            quest.module_id,
            quest.class_order,
            quest.question,
            q1,
            q2,
            q3,
            q4,
            quest.answer,
        ],
    )?;
    Ok(())
}

// ── Bundle Operations ───────────────────────────────────────────────────────

pub fn insert_bundle(conn: &Connection, bundle: &Bundle) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO bundles (id_bundle, name, price, logo, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            bundle.id(),
            bundle.name(),
            bundle.price(),
            bundle.logo(),
            bundle.description(),
        ],
    )?;
    Ok(())
}

pub fn add_course_to_bundle(
    conn: &Connection,
    bundle_id: i64,
    course_id: i64,
) -> Result<(), OperationError> {
    require_positive("bundle id", bundle_id)?;
    require_positive("course id", course_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO bundle_courses (id_bundle, id_course) VALUES (?1, ?2)",
        params![bundle_id, course_id],
    )?;
    Ok(())
}

/// Record that a student bought a bundle. `price` defaults to the bundle's
/// current list price.
pub fn insert_purchase(
    conn: &Connection,
    student_id: i64,
    bundle_id: i64,
    price: Option<f64>,
) -> Result<(), OperationError> {
    require_positive("student id", student_id)?;
    require_positive("bundle id", bundle_id)?;
    let inserted = conn.execute(
        "INSERT INTO purchases (id_student, id_bundle, price)
         SELECT ?1, id_bundle, COALESCE(?3, price) FROM bundles WHERE id_bundle = ?2",
        params![student_id, bundle_id, price],
    )?;
    if inserted == 0 {
        return Err(OperationError::NotFound {
            entity_type: "bundle".to_string(),
            id: bundle_id.to_string(),
        });
    }
    log::debug!("Student {student_id} purchased bundle {bundle_id}");
    Ok(())
}

// ── Seeding ─────────────────────────────────────────────────────────────────

/// Write a fixture into the database inside a single transaction.
pub fn seed_from_fixture(conn: &Connection, seed: &SeedData) -> Result<SeedStats, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let mut stats = SeedStats::default();

    for student in &seed.students {
        insert_student(&tx, student)?;
        stats.students += 1;
    }

    for course in &seed.courses {
        insert_course(&tx, course)?;
        stats.courses += 1;
    }

    for entry in &seed.bundles {
        let bundle = entry
            .to_bundle()
            .map_err(|e| OperationError::Seed(e.to_string()))?;
        insert_bundle(&tx, &bundle)?;
        for course_id in &entry.courses {
            add_course_to_bundle(&tx, bundle.id(), *course_id)?;
        }
        stats.bundles += 1;
    }

    for module in &seed.modules {
        insert_module(
            &tx,
            &Module {
                id: module.id,
                name: module.name.clone(),
            },
        )?;
        add_module_to_course(&tx, module.course, module.id, module.order)?;
        stats.modules += 1;
    }

    for video in &seed.videos {
        insert_video(&tx, video)?;
        stats.classes += 1;
    }

    for quest in &seed.questionnaires {
        if !(1..=4).contains(&quest.answer) {
            return Err(OperationError::Seed(format!(
                "questionnaire {}/{} has answer {}, expected 1-4",
                quest.module_id, quest.class_order, quest.answer
            )));
        }
        insert_questionnaire(&tx, quest)?;
        stats.classes += 1;
    }

    for purchase in &seed.purchases {
        insert_purchase(&tx, purchase.student, purchase.bundle, purchase.price)?;
        stats.purchases += 1;
    }

    tx.commit()?;
    log::debug!(
        "Seeded {} students, {} courses, {} bundles, {} modules, {} classes, {} purchases",
        stats.students,
        stats.courses,
        stats.bundles,
        stats.modules,
        stats.classes,
        stats.purchases,
    );
    Ok(stats)
}

/// Statistics from seeding the database.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub students: usize,
    pub courses: usize,
    pub bundles: usize,
    pub modules: usize,
    pub classes: usize,
    pub purchases: usize,
}
