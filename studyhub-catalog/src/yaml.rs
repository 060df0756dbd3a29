//! YAML loading for seed fixtures.
//!
//! A fixture is a single YAML document describing students, courses,
//! bundles, modules, classes and purchases. Every section is optional.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::types::{Bundle, Course, ModelError, Questionnaire, Student, Video};

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
}

/// Everything a fixture file can contain.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub bundles: Vec<BundleSeed>,
    #[serde(default)]
    pub modules: Vec<ModuleSeed>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
    #[serde(default)]
    pub purchases: Vec<PurchaseSeed>,
}

/// A bundle entry together with the ids of the courses it groups.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleSeed {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub courses: Vec<i64>,
}

impl BundleSeed {
    pub fn to_bundle(&self) -> Result<Bundle, ModelError> {
        Bundle::new(
            self.id,
            self.name.clone(),
            self.price,
            self.logo.clone(),
            self.description.clone(),
        )
    }
}

/// A module and the course it is attached to.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSeed {
    pub id: i64,
    pub name: String,
    pub course: i64,
    /// Position of the module inside the course, starting at 1.
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseSeed {
    pub student: i64,
    pub bundle: i64,
    /// Price paid; defaults to the bundle's list price.
    #[serde(default)]
    pub price: Option<f64>,
}

/// Load a fixture file.
pub fn load_seed(path: &Path) -> Result<SeedData, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_seed_named(&contents, &path.display().to_string())
}

/// Parse a fixture from an in-memory string.
pub fn parse_seed(contents: &str) -> Result<SeedData, YamlError> {
    parse_seed_named(contents, "<string>")
}

fn parse_seed_named(contents: &str, name: &str) -> Result<SeedData, YamlError> {
    // An empty document is a valid, empty fixture.
    if contents.trim().is_empty() {
        return Ok(SeedData::default());
    }
    serde_yml::from_str(contents).map_err(|e| YamlError::Parse {
        path: name.to_string(),
        source: e,
    })
}
