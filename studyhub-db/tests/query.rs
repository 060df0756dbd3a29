use rusqlite::types::Value;
use studyhub_catalog::OrderDirection;
use studyhub_db::{open_memory, CourseSetRelation, SelectQuery};

#[test]
fn renders_bare_select() {
    let q = SelectQuery::from("bundles");
    assert_eq!(q.to_sql(), "SELECT * FROM bundles");
    assert!(q.params().is_empty());
}

#[test]
fn renders_clauses_in_sql_order() {
    let mut q = SelectQuery::from("bundles b")
        .columns(["b.id_bundle", "b.name"])
        .join("LEFT JOIN purchases p ON p.id_bundle = b.id_bundle");
    let min = q.bind(5.0);
    q = q
        .filter(format!("b.price >= {min}"))
        .filter("b.logo IS NULL")
        .group_by("b.id_bundle")
        .having("COUNT(p.id_student) > 0")
        .order_by("b.name", OrderDirection::Descending)
        .limit(10);
    assert_eq!(
        q.to_sql(),
        "SELECT b.id_bundle, b.name FROM bundles b \
         LEFT JOIN purchases p ON p.id_bundle = b.id_bundle \
         WHERE b.price >= ?1 AND b.logo IS NULL \
         GROUP BY b.id_bundle HAVING COUNT(p.id_student) > 0 \
         ORDER BY b.name DESC LIMIT ?2"
    );
    assert_eq!(q.params(), &[Value::Real(5.0), Value::Integer(10)]);
}

#[test]
fn placeholders_are_numbered_by_registration() {
    let mut q = SelectQuery::from("t");
    let a = q.bind(1i64);
    let b = q.bind("x".to_string());
    assert_eq!(a, "?1");
    assert_eq!(b, "?2");
}

#[test]
fn executes_with_bound_values() {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO courses (id_course, name) VALUES (1, 'a'), (2, 'b'), (3, 'c');",
    )
    .unwrap();
    let mut q = SelectQuery::from("courses").column("name");
    let min = q.bind(2i64);
    let names: Vec<String> = q
        .filter(format!("id_course >= {min}"))
        .order_by("name", OrderDirection::Ascending)
        .query_map(&conn, |r| r.get(0))
        .unwrap();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn course_set_predicates_are_mirror_images() {
    let superset = CourseSetRelation::Superset.predicate("?1", "b.id_bundle");
    let disjoint = CourseSetRelation::Disjoint.predicate("?1", "b.id_bundle");
    assert!(superset.contains("rc.id_course NOT IN"));
    assert!(disjoint.contains("rc.id_course IN"));
    assert_eq!(superset.replace("NOT IN", "IN"), disjoint);
}
