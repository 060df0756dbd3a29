//! SQLite persistence layer for the learning platform.
//!
//! Provides schema creation, a small SELECT builder, the bundle catalog
//! queries, class/progress lookups, notifications and support topics,
//! backed by SQLite (via rusqlite with bundled feature).

pub mod bundles;
pub mod classes;
pub mod notifications;
pub mod operations;
pub mod query;
pub mod schema;
pub mod support;

pub use bundles::{
    bundle_details, bundles_of_student, count_total_classes, course_set_relation,
    courses_of_bundle, extension_bundles, get_bundle, list_bundles, total_bundles,
    unrelated_bundles, BundleFilter,
};
pub use classes::{
    course_progress, get_questionnaire, get_video, mark_as_watched, questionnaire_answer,
    questionnaires_of_module, total_questionnaire_length, total_video_length, unmark_watched,
    videos_of_module, CourseProgress,
};
pub use notifications::{
    count_unread, delete_notification, insert_notification, mark_as_read, mark_as_unread,
    notifications_of_student,
};
pub use operations::{
    add_course_to_bundle, add_module_to_course, insert_bundle, insert_course, insert_module,
    insert_purchase, insert_questionnaire, insert_student, insert_video, seed_from_fixture,
    OperationError, SeedStats,
};
pub use query::{CourseSetRelation, SelectQuery};
pub use schema::{open_database, open_memory, SchemaError};
pub use support::{close_topic, get_topic, open_topic, reply_to_topic, topic_messages};

pub use rusqlite::Connection;
