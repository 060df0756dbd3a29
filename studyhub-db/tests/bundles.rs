use std::collections::HashSet;

use studyhub_catalog::*;
use studyhub_db::*;

fn student(id: i64, name: &str) -> Student {
    Student {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

fn course(id: i64) -> Course {
    Course {
        id,
        name: format!("C{id}"),
        logo: None,
        description: None,
    }
}

fn video(module_id: i64, class_order: i64, length: u32) -> Video {
    Video {
        module_id,
        class_order,
        title: format!("Video {module_id}.{class_order}"),
        video_id: "abcdefghijk".to_string(),
        length,
        description: None,
    }
}

fn questionnaire(module_id: i64, class_order: i64) -> Questionnaire {
    Questionnaire {
        module_id,
        class_order,
        question: "Pick one".to_string(),
        options: ["a".into(), "b".into(), "c".into(), "d".into()],
        answer: 2,
    }
}

/// Bundles:
/// 1 "Python Basics" {1,2}, 2 "Python Pro" {1,2,3}, 3 "Rust Intro" {4,5},
/// 4 "python lower" {2,4}, 5 "Empty" {}.
/// Student 1 owns bundle 2; student 2 owns bundles 1 and 2.
fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    insert_student(&conn, &student(1, "Ada")).unwrap();
    insert_student(&conn, &student(2, "Bob")).unwrap();
    insert_student(&conn, &student(3, "Cy")).unwrap();
    for id in 1..=5 {
        insert_course(&conn, &course(id)).unwrap();
    }

    let bundles: [(i64, &str, f64, &[i64]); 5] = [
        (1, "Python Basics", 10.0, &[1, 2]),
        (2, "Python Pro", 30.0, &[1, 2, 3]),
        (3, "Rust Intro", 20.0, &[4, 5]),
        (4, "python lower", 5.0, &[2, 4]),
        (5, "Empty", 0.0, &[]),
    ];
    for (id, name, price, courses) in bundles {
        let bundle = Bundle::new(id, name, price, None, Some(format!("{name} bundle"))).unwrap();
        insert_bundle(&conn, &bundle).unwrap();
        for course_id in courses {
            add_course_to_bundle(&conn, id, *course_id).unwrap();
        }
    }

    insert_purchase(&conn, 1, 2, None).unwrap();
    insert_purchase(&conn, 2, 1, None).unwrap();
    insert_purchase(&conn, 2, 2, Some(25.0)).unwrap();

    for (module_id, course_id) in [(10, 1), (11, 2), (12, 3), (13, 4)] {
        insert_module(
            &conn,
            &Module {
                id: module_id,
                name: format!("M{module_id}"),
            },
        )
        .unwrap();
        add_module_to_course(&conn, course_id, module_id, 1).unwrap();
    }
    insert_video(&conn, &video(10, 1, 12)).unwrap();
    insert_questionnaire(&conn, &questionnaire(10, 2)).unwrap();
    insert_video(&conn, &video(11, 1, 8)).unwrap();
    insert_video(&conn, &video(12, 1, 30)).unwrap();
    insert_questionnaire(&conn, &questionnaire(12, 2)).unwrap();

    conn
}

fn ids(bundles: &[Bundle]) -> Vec<i64> {
    bundles.iter().map(Bundle::id).collect()
}

fn entry_ids(entries: &[BundleListingEntry]) -> Vec<i64> {
    entries.iter().map(|e| e.bundle.id()).collect()
}

fn assert_invalid(result: Result<impl std::fmt::Debug, OperationError>) {
    match result {
        Err(OperationError::InvalidArgument { .. }) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

// ── get ─────────────────────────────────────────────────────────────────────

#[test]
fn get_existing_bundle() {
    let conn = setup_db();
    let bundle = get_bundle(&conn, 3).unwrap().unwrap();
    assert_eq!(bundle.id(), 3);
    assert_eq!(bundle.name(), "Rust Intro");
    assert_eq!(bundle.price(), 20.0);
    assert_eq!(bundle.logo(), None);
    assert_eq!(bundle.description(), Some("Rust Intro bundle"));
}

#[test]
fn get_missing_bundle_is_none() {
    let conn = setup_db();
    assert!(get_bundle(&conn, 99).unwrap().is_none());
}

#[test]
fn non_positive_ids_are_rejected() {
    let conn = setup_db();
    for id in [0, -1, i64::MIN] {
        assert_invalid(get_bundle(&conn, id));
        assert_invalid(count_total_classes(&conn, id));
        assert_invalid(extension_bundles(&conn, id, None));
        assert_invalid(unrelated_bundles(&conn, id, None));
    }
    assert_invalid(extension_bundles(&conn, 1, Some(0)));
    assert_invalid(list_bundles(&conn, &BundleFilter::default().for_student(-4)));
}

// ── listing ─────────────────────────────────────────────────────────────────

#[test]
fn list_without_filters_returns_every_bundle_once() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default()).unwrap();
    let mut got = entry_ids(&entries);
    got.sort();
    assert_eq!(got, vec![1, 2, 3, 4, 5]);
    assert!(entries.iter().all(|e| e.has_bundle.is_none()));
}

#[test]
fn list_counts_courses_and_sales() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default()).unwrap();
    let pro = entries.iter().find(|e| e.bundle.id() == 2).unwrap();
    assert_eq!(pro.courses, 3);
    assert_eq!(pro.sales, 2);
    let empty = entries.iter().find(|e| e.bundle.id() == 5).unwrap();
    assert_eq!(empty.courses, 0);
    assert_eq!(empty.sales, 0);
}

#[test]
fn list_for_student_flags_owned_bundles() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default().for_student(1)).unwrap();
    assert_eq!(entries.len(), 5);
    for entry in &entries {
        let expected = entry.bundle.id() == 2;
        assert_eq!(entry.has_bundle, Some(expected), "bundle {}", entry.bundle.id());
    }

    let entries = list_bundles(&conn, &BundleFilter::default().for_student(3)).unwrap();
    assert!(entries.iter().all(|e| e.has_bundle == Some(false)));
}

#[test]
fn list_respects_limit() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default().limit(2)).unwrap();
    assert_eq!(entries.len(), 2);

    // Zero means no limit.
    let entries = list_bundles(&conn, &BundleFilter::default().limit(0)).unwrap();
    assert_eq!(entries.len(), 5);
}

#[test]
fn list_name_prefix_is_case_sensitive() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default().name_prefix("Py")).unwrap();
    let mut got = entry_ids(&entries);
    got.sort();
    assert_eq!(got, vec![1, 2]);
    assert!(entries.iter().all(|e| e.bundle.name().starts_with("Py")));

    let entries = list_bundles(&conn, &BundleFilter::default().name_prefix("py")).unwrap();
    assert_eq!(entry_ids(&entries), vec![4]);

    let entries = list_bundles(&conn, &BundleFilter::default().name_prefix("Go")).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn list_prefix_with_wildcards_is_literal() {
    let conn = setup_db();
    let entries = list_bundles(&conn, &BundleFilter::default().name_prefix("%")).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn list_ordered_by_price_descending() {
    let conn = setup_db();
    let filter =
        BundleFilter::default().order_by(BundleOrderType::Price, OrderDirection::Descending);
    let entries = list_bundles(&conn, &filter).unwrap();
    assert_eq!(entry_ids(&entries), vec![2, 3, 1, 4, 5]);
}

#[test]
fn list_ordered_by_name_uses_binary_collation() {
    let conn = setup_db();
    let filter = BundleFilter::default().order_by(BundleOrderType::Name, OrderDirection::Ascending);
    let names: Vec<String> = list_bundles(&conn, &filter)
        .unwrap()
        .into_iter()
        .map(|e| e.bundle.name().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["Empty", "Python Basics", "Python Pro", "Rust Intro", "python lower"]
    );
}

#[test]
fn list_ordered_by_sales_with_all_filters() {
    let conn = setup_db();
    let filter = BundleFilter::default()
        .for_student(2)
        .name_prefix("Py")
        .order_by(BundleOrderType::Sales, OrderDirection::Descending)
        .limit(1);
    let entries = list_bundles(&conn, &filter).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bundle.id(), 2);
    assert_eq!(entries[0].has_bundle, Some(true));
}

#[test]
fn listing_query_shape_follows_filters() {
    let bare = bundles::listing_query(&BundleFilter::default());
    let sql = bare.to_sql();
    assert!(!sql.contains("HAVING"));
    assert!(!sql.contains("ORDER BY"));
    assert!(!sql.contains("LIMIT"));
    assert!(!sql.contains("has_bundle"));
    assert!(bare.params().is_empty());

    let full = bundles::listing_query(
        &BundleFilter::default()
            .for_student(7)
            .name_prefix("Ru")
            .order_by(BundleOrderType::Courses, OrderDirection::Descending)
            .limit(3),
    );
    let sql = full.to_sql();
    assert!(sql.contains("AS has_bundle"));
    assert!(sql.contains("HAVING substr(b.name, 1, length(?2)) = ?2"));
    assert!(sql.ends_with("ORDER BY courses DESC LIMIT ?3"));
    assert!(!sql.contains("Ru"));
    assert_eq!(full.params().len(), 3);
}

#[test]
fn total_counts_all_bundles() {
    let conn = setup_db();
    assert_eq!(total_bundles(&conn).unwrap(), 5);
}

// ── related bundles ─────────────────────────────────────────────────────────

#[test]
fn extension_bundles_are_supersets() {
    let conn = setup_db();
    let found = extension_bundles(&conn, 1, None).unwrap();
    assert_eq!(ids(&found), vec![2]);
}

#[test]
fn extension_bundles_skip_owned() {
    let conn = setup_db();
    assert!(extension_bundles(&conn, 1, Some(1)).unwrap().is_empty());
    assert_eq!(ids(&extension_bundles(&conn, 1, Some(3)).unwrap()), vec![2]);
}

#[test]
fn extension_of_empty_bundle_is_everything_else() {
    let conn = setup_db();
    let found = extension_bundles(&conn, 5, None).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 3, 4]);
}

#[test]
fn unrelated_bundles_are_disjoint() {
    let conn = setup_db();
    let found = unrelated_bundles(&conn, 1, None).unwrap();
    assert_eq!(ids(&found), vec![3, 5]);
    assert!(!ids(&found).contains(&1));
}

#[test]
fn unrelated_bundles_skip_owned() {
    let conn = setup_db();
    assert_eq!(ids(&unrelated_bundles(&conn, 3, None).unwrap()), vec![1, 2, 5]);
    assert_eq!(ids(&unrelated_bundles(&conn, 3, Some(1)).unwrap()), vec![1, 5]);
    assert_eq!(ids(&unrelated_bundles(&conn, 3, Some(2)).unwrap()), vec![5]);
}

#[test]
fn related_bundles_of_missing_reference() {
    let conn = setup_db();
    // A missing bundle has no courses: everything else qualifies, nothing is excluded by id.
    assert_eq!(ids(&extension_bundles(&conn, 42, None).unwrap()).len(), 5);
    assert_eq!(ids(&unrelated_bundles(&conn, 42, None).unwrap()).len(), 5);
}

#[test]
fn course_set_relation_pairs() {
    let conn = setup_db();
    assert!(course_set_relation(&conn, 1, 2, CourseSetRelation::Superset).unwrap());
    assert!(!course_set_relation(&conn, 2, 1, CourseSetRelation::Superset).unwrap());
    assert!(!course_set_relation(&conn, 1, 3, CourseSetRelation::Superset).unwrap());
    assert!(course_set_relation(&conn, 1, 3, CourseSetRelation::Disjoint).unwrap());
    assert!(!course_set_relation(&conn, 1, 2, CourseSetRelation::Disjoint).unwrap());
    assert!(!course_set_relation(&conn, 1, 4, CourseSetRelation::Disjoint).unwrap());
    assert!(!course_set_relation(&conn, 1, 4, CourseSetRelation::Superset).unwrap());
}

// ── class statistics ────────────────────────────────────────────────────────

#[test]
fn count_classes_mixes_fixed_and_stored_lengths() {
    let conn = setup_db();
    let stats = count_total_classes(&conn, 1).unwrap();
    assert_eq!(stats.total_classes, 3);
    assert_eq!(stats.total_length, 12 + 5 + 8);

    let stats = count_total_classes(&conn, 2).unwrap();
    assert_eq!(stats.total_classes, 5);
    assert_eq!(stats.total_length, 12 + 5 + 8 + 30 + 5);
}

#[test]
fn count_classes_defaults_to_zero() {
    let conn = setup_db();
    assert_eq!(count_total_classes(&conn, 3).unwrap(), BundleClassStats::default());
    assert_eq!(count_total_classes(&conn, 5).unwrap(), BundleClassStats::default());
    assert_eq!(count_total_classes(&conn, 404).unwrap(), BundleClassStats::default());
}

#[test]
fn module_shared_by_two_courses_counts_once() {
    let conn = setup_db();
    // Module 11 is also attached to course 1; bundle 1 has both courses.
    add_module_to_course(&conn, 1, 11, 2).unwrap();
    let stats = count_total_classes(&conn, 1).unwrap();
    assert_eq!(stats.total_classes, 3);
    assert_eq!(stats.total_length, 25);
}

// ── courses, details, ownership ─────────────────────────────────────────────

#[test]
fn courses_of_bundle_are_resolved() {
    let conn = setup_db();
    let names: Vec<String> = courses_of_bundle(&conn, 2)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["C1", "C2", "C3"]);
    assert!(courses_of_bundle(&conn, 5).unwrap().is_empty());
}

#[test]
fn bundle_details_resolves_everything() {
    let conn = setup_db();
    let details = bundle_details(&conn, 1).unwrap().unwrap();
    assert_eq!(details.bundle.id(), 1);
    assert_eq!(details.courses.len(), 2);
    assert_eq!(details.stats.total_classes, 3);
    assert!(bundle_details(&conn, 77).unwrap().is_none());
}

#[test]
fn bundles_of_student_lists_purchases() {
    let conn = setup_db();
    let owned: HashSet<i64> = ids(&bundles_of_student(&conn, 2).unwrap()).into_iter().collect();
    assert_eq!(owned, HashSet::from([1, 2]));
    assert!(bundles_of_student(&conn, 3).unwrap().is_empty());
}

#[test]
fn purchase_of_missing_bundle_is_not_found() {
    let conn = setup_db();
    let err = insert_purchase(&conn, 3, 99, None).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
}

#[test]
fn purchase_defaults_to_list_price() {
    let conn = setup_db();
    insert_purchase(&conn, 3, 3, None).unwrap();
    let paid: f64 = conn
        .query_row(
            "SELECT price FROM purchases WHERE id_student = 3 AND id_bundle = 3",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(paid, 20.0);
}

// ── failures ────────────────────────────────────────────────────────────────

#[test]
fn missing_table_surfaces_data_access_error() {
    let conn = setup_db();
    conn.execute_batch("DROP TABLE videos").unwrap();
    let err = count_total_classes(&conn, 1).unwrap_err();
    assert!(matches!(err, OperationError::DataAccess(_)));
}

#[test]
fn negative_price_is_rejected_by_schema() {
    let conn = setup_db();
    let err = conn
        .execute(
            "INSERT INTO bundles (id_bundle, name, price) VALUES (9, 'Bad', -1)",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("CHECK"));
}

#[test]
fn invalid_stored_price_reports_price_column() {
    let conn = setup_db();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE bundles SET price = -5 WHERE id_bundle = 3;
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();
    let err = get_bundle(&conn, 3).unwrap_err();
    match err {
        OperationError::DataAccess(rusqlite::Error::FromSqlConversionFailure(column, kind, _)) => {
            assert_eq!(column, 2);
            assert_eq!(kind, rusqlite::types::Type::Real);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
