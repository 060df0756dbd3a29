//! Composable SELECT builder.
//!
//! Clauses are collected as separate pieces and rendered once. Values are
//! always bound through numbered placeholders (`?1`, `?2`, ...), so the order
//! in which a caller registers projection and filter parameters does not
//! need to match their position in the rendered SQL. Only identifiers that
//! come from closed enums (sort columns, direction keywords) are written
//! into the SQL text.

use std::fmt::Write as _;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use studyhub_catalog::OrderDirection;

use crate::operations::OperationError;

/// A SELECT statement under construction.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    filters: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<(String, OrderDirection)>,
    limit: Option<String>,
    params: Vec<Value>,
}

impl SelectQuery {
    /// Start a query over `table` (may include an alias, e.g. `"bundles b"`).
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            from: table.into(),
            ..Default::default()
        }
    }

    /// Register a bound value and return its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    pub fn column(mut self, expr: impl Into<String>) -> Self {
        self.columns.push(expr.into());
        self
    }

    pub fn columns<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add a full join clause, e.g. `"LEFT JOIN purchases p ON ..."`.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Add a WHERE predicate. Multiple predicates are AND-combined.
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Add a HAVING predicate. Multiple predicates are AND-combined.
    pub fn having(mut self, predicate: impl Into<String>) -> Self {
        self.having.push(predicate.into());
        self
    }

    /// Sort on a result column. `column` must not carry user input.
    pub fn order_by(mut self, column: &'static str, direction: OrderDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    /// Cap the number of rows. The limit is bound, not interpolated.
    pub fn limit(mut self, n: u32) -> Self {
        let placeholder = self.bind(i64::from(n));
        self.limit = Some(placeholder);
        self
    }

    /// Values bound so far, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render the statement.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        let _ = write!(sql, " FROM {}", self.from);
        for join in &self.joins {
            let _ = write!(sql, " {join}");
        }
        if !self.filters.is_empty() {
            let _ = write!(sql, " WHERE {}", self.filters.join(" AND "));
        }
        if !self.group_by.is_empty() {
            let _ = write!(sql, " GROUP BY {}", self.group_by.join(", "));
        }
        if !self.having.is_empty() {
            let _ = write!(sql, " HAVING {}", self.having.join(" AND "));
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(col, dir)| format!("{col} {}", dir.as_sql()))
                .collect();
            let _ = write!(sql, " ORDER BY {}", terms.join(", "));
        }
        if let Some(ref limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        sql
    }

    /// Execute the query and map every row with `f`.
    pub fn query_map<T, F>(&self, conn: &Connection, f: F) -> Result<Vec<T>, OperationError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let sql = self.to_sql();
        log::debug!("query: {sql} params: {:?}", self.params);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), f)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// How a candidate bundle's course set must relate to a reference bundle's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSetRelation {
    /// Every course of the reference is also in the candidate.
    Superset,
    /// The candidate shares no course with the reference.
    Disjoint,
}

impl CourseSetRelation {
    /// Anti-join predicate over `bundle_courses` that holds when the bundle
    /// in `candidate` (a column expression) relates to the bundle bound at
    /// `reference` (a placeholder or column expression).
    ///
    /// Superset: no course of the reference is missing from the candidate.
    /// Disjoint: no course of the reference is present in the candidate.
    pub fn predicate(self, reference: &str, candidate: &str) -> String {
        let membership = match self {
            Self::Superset => "NOT IN",
            Self::Disjoint => "IN",
        };
        format!(
            "NOT EXISTS (SELECT 1 FROM bundle_courses rc \
             WHERE rc.id_bundle = {reference} \
             AND rc.id_course {membership} (SELECT cc.id_course FROM bundle_courses cc \
             WHERE cc.id_bundle = {candidate}))"
        )
    }
}
