//! Data model types for the learning platform.
//!
//! These types mirror single database rows: bundles and their listing
//! annotations, courses, modules, video and questionnaire classes,
//! notifications, and support messages.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed length, in minutes, credited for every questionnaire class.
pub const QUESTIONNAIRE_LENGTH_MINUTES: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Invalid bundle: id must be positive, got {0}")]
    InvalidBundleId(i64),
    #[error("Invalid bundle: price must be a non-negative number, got {0}")]
    InvalidBundlePrice(f64),
    #[error("Unknown bundle order type '{0}': expected one of name, price, sales, courses")]
    UnknownOrderType(String),
    #[error("Unknown order direction '{0}': expected asc or desc")]
    UnknownOrderDirection(String),
    #[error("Unknown class type '{0}'")]
    UnknownClassType(String),
    #[error("Unknown notification type '{0}'")]
    UnknownNotificationKind(String),
}

// ── Student ─────────────────────────────────────────────────────────────────

/// A registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
}

// ── Bundle ──────────────────────────────────────────────────────────────────

/// A purchasable grouping of courses.
///
/// Fields are private so that a constructed bundle always satisfies
/// `id > 0` and `price >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    id: i64,
    name: String,
    price: f64,
    logo: Option<String>,
    description: Option<String>,
}

impl Bundle {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        price: f64,
        logo: Option<String>,
        description: Option<String>,
    ) -> Result<Self, ModelError> {
        if id <= 0 {
            return Err(ModelError::InvalidBundleId(id));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ModelError::InvalidBundlePrice(price));
        }
        Ok(Self {
            id,
            name: name.into(),
            price,
            logo: logo.filter(|s| !s.is_empty()),
            description: description.filter(|s| !s.is_empty()),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One row of a bundle listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleListingEntry {
    pub bundle: Bundle,
    /// Number of courses in the bundle.
    pub courses: u32,
    /// Number of purchases of the bundle.
    pub sales: u32,
    /// Whether the requesting student owns the bundle. `None` when the
    /// listing was not requested on behalf of a student.
    pub has_bundle: Option<bool>,
}

/// Class count and total duration (minutes) of a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleClassStats {
    pub total_classes: u64,
    pub total_length: u64,
}

/// A bundle with its courses and class statistics resolved up front.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleDetails {
    pub bundle: Bundle,
    pub courses: Vec<Course>,
    pub stats: BundleClassStats,
}

// ── Ordering ────────────────────────────────────────────────────────────────

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ModelError::UnknownOrderDirection(other.to_string())),
        }
    }
}

/// Sortable columns of a bundle listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleOrderType {
    Name,
    Price,
    Sales,
    Courses,
}

impl BundleOrderType {
    pub const ALL: [BundleOrderType; 4] = [Self::Name, Self::Price, Self::Sales, Self::Courses];

    /// Result column the listing query sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Sales => "sales",
            Self::Courses => "courses",
        }
    }
}

impl fmt::Display for BundleOrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for BundleOrderType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.column() == wanted)
            .ok_or(ModelError::UnknownOrderType(wanted))
    }
}

// ── Course & Module ─────────────────────────────────────────────────────────

/// A course, the unit bundles are composed of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A module of a course; classes belong to modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
}

// ── Classes ─────────────────────────────────────────────────────────────────

/// The two kinds of class content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Video,
    Questionnaire,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Questionnaire => "questionnaire",
        }
    }
}

impl FromStr for ClassType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "questionnaire" | "quest" => Ok(Self::Questionnaire),
            other => Err(ModelError::UnknownClassType(other.to_string())),
        }
    }
}

/// A video class. `length` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub module_id: i64,
    pub class_order: i64,
    pub title: String,
    /// YouTube video id, e.g. `abcdefghijk`.
    pub video_id: String,
    pub length: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// A multiple-choice questionnaire class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub module_id: i64,
    pub class_order: i64,
    pub question: String,
    pub options: [String; 4],
    /// Correct option, 1 through 4.
    pub answer: u8,
}

impl Questionnaire {
    pub fn is_correct(&self, choice: u8) -> bool {
        choice == self.answer
    }
}

// ── Notifications ───────────────────────────────────────────────────────────

/// What a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A reply to a comment the student left on a class.
    Comment,
    /// A reply to one of the student's support topics.
    SupportTopic,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::SupportTopic => "support_topic",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(Self::Comment),
            "support_topic" => Ok(Self::SupportTopic),
            other => Err(ModelError::UnknownNotificationKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDateTime,
    pub reference_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
}

// ── Support ─────────────────────────────────────────────────────────────────

/// A message of a support topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub date: NaiveDateTime,
    pub content: String,
}

/// Header of a support topic opened by a student.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportTopic {
    pub id: i64,
    pub student_id: i64,
    pub category: String,
    pub title: String,
    pub date: NaiveDateTime,
    pub closed: bool,
}
