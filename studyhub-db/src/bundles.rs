//! Bundle catalog queries.
//!
//! Lookup by id, filtered listing, extension/unrelated bundle discovery and
//! class statistics. Every function validates its identifiers before
//! touching the database and returns `Option`/empty `Vec` for "not found".

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use studyhub_catalog::*;

use crate::operations::{require_positive, OperationError};
use crate::query::{CourseSetRelation, SelectQuery};

// Aliased so ORDER BY resolves `name`/`price` against the result columns
// rather than the joined purchases table.
const BUNDLE_COLUMNS: [&str; 5] = [
    "b.id_bundle AS id_bundle",
    "b.name AS name",
    "b.price AS price",
    "b.logo AS logo",
    "b.description AS description",
];

/// Optional filters for [`list_bundles`].
#[derive(Debug, Clone, Default)]
pub struct BundleFilter {
    /// Annotate each entry with whether this student owns the bundle.
    pub student_id: Option<i64>,
    /// Maximum number of entries; `Some(0)` means no limit.
    pub limit: Option<u32>,
    /// Case-sensitive name prefix. Empty matches everything.
    pub name_prefix: String,
    pub order_by: Option<BundleOrderType>,
    pub order_direction: OrderDirection,
}

impl BundleFilter {
    pub fn for_student(mut self, student_id: i64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn order_by(mut self, column: BundleOrderType, direction: OrderDirection) -> Self {
        self.order_by = Some(column);
        self.order_direction = direction;
        self
    }
}

// ── Lookups ─────────────────────────────────────────────────────────────────

/// Get a bundle by id. Returns `None` if no bundle has that id.
pub fn get_bundle(conn: &Connection, bundle_id: i64) -> Result<Option<Bundle>, OperationError> {
    require_positive("bundle id", bundle_id)?;
    let mut stmt = conn.prepare(
        "SELECT b.id_bundle, b.name, b.price, b.logo, b.description
         FROM bundles b WHERE b.id_bundle = ?1",
    )?;
    let result = stmt.query_row(params![bundle_id], row_to_bundle);
    match result {
        Ok(b) => Ok(Some(b)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Build the listing query without running it.
pub fn listing_query(filter: &BundleFilter) -> SelectQuery {
    let mut query = SelectQuery::from("bundles b").columns(BUNDLE_COLUMNS);
    query = query.column("COUNT(DISTINCT bc.id_course) AS courses");

    if let Some(student_id) = filter.student_id {
        let student = query.bind(student_id);
        query = query.column(format!(
            "CASE WHEN EXISTS (SELECT 1 FROM purchases own \
             WHERE own.id_bundle = b.id_bundle AND own.id_student = {student}) \
             THEN 1 ELSE 0 END AS has_bundle"
        ));
    }

    query = query
        .column("COUNT(DISTINCT p.id_student) AS sales")
        .join("LEFT JOIN bundle_courses bc ON bc.id_bundle = b.id_bundle")
        .join("LEFT JOIN purchases p ON p.id_bundle = b.id_bundle")
        .group_by("b.id_bundle");

    if !filter.name_prefix.is_empty() {
        // LIKE is case-insensitive in SQLite; compare the leading substring instead.
        let prefix = query.bind(filter.name_prefix.clone());
        query = query.having(format!("substr(b.name, 1, length({prefix})) = {prefix}"));
    }

    if let Some(order) = filter.order_by {
        query = query.order_by(order.column(), filter.order_direction);
    }

    if let Some(n) = filter.limit.filter(|n| *n > 0) {
        query = query.limit(n);
    }

    query
}

/// List bundles matching `filter`.
///
/// When `filter.student_id` is set, every entry carries `has_bundle`.
pub fn list_bundles(
    conn: &Connection,
    filter: &BundleFilter,
) -> Result<Vec<BundleListingEntry>, OperationError> {
    if let Some(student_id) = filter.student_id {
        require_positive("student id", student_id)?;
    }
    let with_owner = filter.student_id.is_some();
    let query = listing_query(filter);
    query.query_map(conn, |row| {
        let has_bundle = if with_owner {
            Some(row.get::<_, i64>("has_bundle")? > 0)
        } else {
            None
        };
        Ok(BundleListingEntry {
            bundle: row_to_bundle(row)?,
            courses: row.get("courses")?,
            sales: row.get("sales")?,
            has_bundle,
        })
    })
}

/// Total number of bundles.
pub fn total_bundles(conn: &Connection) -> Result<u64, OperationError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM bundles", [], |r| r.get(0))?;
    Ok(total as u64)
}

// ── Related Bundles ─────────────────────────────────────────────────────────

/// Bundles containing every course of `bundle_id`, excluding the bundle
/// itself and, if `student_id` is given, bundles the student already owns.
pub fn extension_bundles(
    conn: &Connection,
    bundle_id: i64,
    student_id: Option<i64>,
) -> Result<Vec<Bundle>, OperationError> {
    related_bundles(conn, bundle_id, student_id, CourseSetRelation::Superset)
}

/// Bundles sharing no course with `bundle_id`, excluding the bundle itself
/// and, if `student_id` is given, bundles the student already owns.
pub fn unrelated_bundles(
    conn: &Connection,
    bundle_id: i64,
    student_id: Option<i64>,
) -> Result<Vec<Bundle>, OperationError> {
    related_bundles(conn, bundle_id, student_id, CourseSetRelation::Disjoint)
}

/// Build the query behind [`extension_bundles`] and [`unrelated_bundles`].
pub fn related_query(
    bundle_id: i64,
    student_id: Option<i64>,
    relation: CourseSetRelation,
) -> SelectQuery {
    let mut query = SelectQuery::from("bundles b").columns(BUNDLE_COLUMNS);
    let reference = query.bind(bundle_id);
    query = query.filter(format!("b.id_bundle <> {reference}"));

    if let Some(student_id) = student_id {
        let student = query.bind(student_id);
        query = query.filter(format!(
            "NOT EXISTS (SELECT 1 FROM purchases own \
             WHERE own.id_bundle = b.id_bundle AND own.id_student = {student})"
        ));
    }

    query
        .filter(relation.predicate(&reference, "b.id_bundle"))
        .order_by("b.id_bundle", OrderDirection::Ascending)
}

fn related_bundles(
    conn: &Connection,
    bundle_id: i64,
    student_id: Option<i64>,
    relation: CourseSetRelation,
) -> Result<Vec<Bundle>, OperationError> {
    require_positive("bundle id", bundle_id)?;
    if let Some(student_id) = student_id {
        require_positive("student id", student_id)?;
    }
    related_query(bundle_id, student_id, relation).query_map(conn, row_to_bundle)
}

/// Whether `candidate`'s course set relates to `reference`'s as `relation`.
pub fn course_set_relation(
    conn: &Connection,
    reference: i64,
    candidate: i64,
    relation: CourseSetRelation,
) -> Result<bool, OperationError> {
    require_positive("bundle id", reference)?;
    require_positive("bundle id", candidate)?;
    let sql = format!("SELECT {}", relation.predicate("?1", "?2"));
    let holds: bool = conn.query_row(&sql, params![reference, candidate], |r| r.get(0))?;
    Ok(holds)
}

// ── Classes & Courses ───────────────────────────────────────────────────────

/// Count the classes of a bundle and their total length in minutes.
///
/// Questionnaires count as a fixed [`QUESTIONNAIRE_LENGTH_MINUTES`];
/// videos count their stored length. Always returns both values, zero when
/// the bundle has no classes (or does not exist).
pub fn count_total_classes(
    conn: &Connection,
    bundle_id: i64,
) -> Result<BundleClassStats, OperationError> {
    require_positive("bundle id", bundle_id)?;
    let (total_classes, total_length): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(length), 0)
         FROM (SELECT id_module, ?2 AS length FROM questionnaires
               UNION ALL
               SELECT id_module, length FROM videos) AS classes
         WHERE id_module IN (SELECT cm.id_module
                             FROM course_modules cm
                             JOIN bundle_courses bc ON bc.id_course = cm.id_course
                             WHERE bc.id_bundle = ?1)",
        params![bundle_id, QUESTIONNAIRE_LENGTH_MINUTES],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(BundleClassStats {
        total_classes: total_classes as u64,
        total_length: total_length as u64,
    })
}

/// Courses of a bundle, ordered by name.
pub fn courses_of_bundle(conn: &Connection, bundle_id: i64) -> Result<Vec<Course>, OperationError> {
    require_positive("bundle id", bundle_id)?;
    let mut stmt = conn.prepare(
        "SELECT c.id_course, c.name, c.logo, c.description
         FROM courses c JOIN bundle_courses bc ON bc.id_course = c.id_course
         WHERE bc.id_bundle = ?1
         ORDER BY c.name",
    )?;
    let rows = stmt.query_map(params![bundle_id], |row| {
        Ok(Course {
            id: row.get(0)?,
            name: row.get(1)?,
            logo: row.get(2)?,
            description: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// A bundle with its courses and class statistics, or `None` if absent.
pub fn bundle_details(
    conn: &Connection,
    bundle_id: i64,
) -> Result<Option<BundleDetails>, OperationError> {
    let Some(bundle) = get_bundle(conn, bundle_id)? else {
        return Ok(None);
    };
    Ok(Some(BundleDetails {
        courses: courses_of_bundle(conn, bundle_id)?,
        stats: count_total_classes(conn, bundle_id)?,
        bundle,
    }))
}

/// Bundles a student has purchased, most recent purchase first.
pub fn bundles_of_student(
    conn: &Connection,
    student_id: i64,
) -> Result<Vec<Bundle>, OperationError> {
    require_positive("student id", student_id)?;
    let mut query = SelectQuery::from("bundles b")
        .columns(BUNDLE_COLUMNS)
        .join("JOIN purchases p ON p.id_bundle = b.id_bundle");
    let student = query.bind(student_id);
    query
        .filter(format!("p.id_student = {student}"))
        .order_by("p.date", OrderDirection::Descending)
        .order_by("b.id_bundle", OrderDirection::Ascending)
        .query_map(conn, row_to_bundle)
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_bundle(row: &Row<'_>) -> rusqlite::Result<Bundle> {
    let id: i64 = row.get(0)?;
    let price: f64 = row.get(2)?;
    Bundle::new(id, row.get::<_, String>(1)?, price, row.get(3)?, row.get(4)?).map_err(|e| {
        let (column, kind) = match &e {
            ModelError::InvalidBundlePrice(_) => (2, Type::Real),
            _ => (0, Type::Integer),
        };
        rusqlite::Error::FromSqlConversionFailure(column, kind, Box::new(e))
    })
}
