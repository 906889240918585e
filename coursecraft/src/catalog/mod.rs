//! Course catalog loading and lookup.
//!
//! The planner only needs one capability from the catalog:
//! [`CourseLookup::get_course`].  [`CourseCatalog`] is the YAML-backed
//! implementation used by the binary and the tests.
//!
//! The expected YAML structure is:
//! ```yaml
//! courses:
//!   - id: cs101
//!     code: CS101
//!     title: "Introduction to Programming"
//!     credits: 4
//!     department: "Computer Science"
//!     description: "Variables, control flow, functions"
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::course::{Course, Department};

// ── Lookup capability ─────────────────────────────────────────────────────────

/// Read-only course lookup by identifier.
pub trait CourseLookup {
    /// Returns the course for `id`, or `None` when the catalog has no entry.
    fn get_course(&self, id: &str) -> Option<&Course>;
}

impl CourseLookup for HashMap<String, Course> {
    fn get_course(&self, id: &str) -> Option<&Course> {
        self.get(id)
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    courses: Vec<Course>,
}

// ── CourseCatalog ─────────────────────────────────────────────────────────────

/// Ordered, id-indexed collection of catalog courses.
#[derive(Debug, Default, Clone)]
pub struct CourseCatalog {
    /// Catalog order, as listed in the source file.
    courses: Vec<Course>,

    /// id → position in `courses`.
    index: HashMap<String, usize>,
}

impl CourseCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from courses already in memory.
    ///
    /// # Errors
    /// Fails on a duplicate id or a course with zero credits.
    pub fn from_courses(courses: Vec<Course>) -> Result<Self> {
        let mut seen = HashSet::new();
        for c in &courses {
            if !seen.insert(c.id.as_str()) {
                bail!("duplicate course id '{}' in catalog", c.id);
            }
            if c.credits == 0 {
                bail!("course '{}' has zero credits", c.id);
            }
        }

        let index = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Ok(Self { courses, index })
    }

    /// Parse a catalog from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_yaml::from_str(content).context("Failed to parse catalog YAML")?;
        Self::from_courses(file.courses)
    }

    /// Parse the catalog file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, or the entries break the catalog rules.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading course catalog from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open catalog file: {}", path.display()))?;

        let catalog = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

        for c in &catalog.courses {
            debug!(
                "  Course: {} | {} | {} credits | {}",
                c.code, c.title, c.credits, c.department
            );
        }
        info!("Loaded {} course(s)", catalog.len());

        Ok(catalog)
    }

    /// All courses in catalog order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses whose code or title contains `query` (case-insensitive),
    /// optionally restricted to `department`.  An empty query matches all.
    pub fn search(&self, query: &str, department: Option<Department>) -> Vec<&Course> {
        let needle = query.trim().to_lowercase();
        self.courses
            .iter()
            .filter(|c| department.map_or(true, |d| c.department == d))
            .filter(|c| {
                needle.is_empty()
                    || c.code.to_lowercase().contains(&needle)
                    || c.title.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl CourseLookup for CourseCatalog {
    fn get_course(&self, id: &str) -> Option<&Course> {
        self.index.get(id).map(|&i| &self.courses[i])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const SAMPLE: &str = r#"
courses:
  - id: cs101
    code: CS101
    title: "Introduction to Programming"
    credits: 4
    department: "Computer Science"
    description: "Variables, control flow, functions"
  - id: ma201
    code: MA201
    title: "Linear Algebra"
    credits: 3
    department: "Mathematics"
  - id: cs240
    code: CS240
    title: "Data Structures"
    credits: 4
    department: "Computer Science"
  - id: hu110
    code: HU110
    title: "Programming Ethics"
    credits: 2
    department: "Humanities"
"#;

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_sample_yaml() {
        let f = yaml_tempfile(SAMPLE);
        let catalog = CourseCatalog::load_from_file(f.path()).unwrap();

        assert_eq!(catalog.len(), 4);
        let cs101 = catalog.get_course("cs101").unwrap();
        assert_eq!(cs101.code, "CS101");
        assert_eq!(cs101.credits, 4);
        assert_eq!(cs101.department, Department::ComputerScience);

        let ma201 = catalog.get_course("ma201").unwrap();
        assert_eq!(ma201.description, ""); // optional field
    }

    #[test]
    fn unknown_id_is_none() {
        let catalog = CourseCatalog::from_yaml_str(SAMPLE).unwrap();
        assert!(catalog.get_course("xx999").is_none());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = CourseCatalog::load_from_file(Path::new("/nonexistent/catalog.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("courses: [ {id: 1, credits: lots ");
        assert!(CourseCatalog::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_department_is_rejected() {
        let yaml = r#"
courses:
  - id: bio1
    code: BIO1
    title: Biology
    credits: 3
    department: Biology
"#;
        assert!(CourseCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r#"
courses:
  - { id: a, code: A, title: A, credits: 3, department: Physics }
  - { id: a, code: B, title: B, credits: 3, department: Physics }
"#;
        let err = CourseCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn zero_credit_course_is_rejected() {
        let yaml = "courses:\n  - { id: z, code: Z, title: Z, credits: 0, department: Physics }\n";
        assert!(CourseCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn empty_file_yields_empty_catalog() {
        let catalog = CourseCatalog::from_yaml_str("courses: []\n").unwrap();
        assert!(catalog.is_empty());
    }

    // ── search ────────────────────────────────────────────────────────────────

    #[test]
    fn search_matches_code_and_title_case_insensitively() {
        let catalog = CourseCatalog::from_yaml_str(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog
            .search("programming", None)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["cs101", "hu110"]);

        let by_code: Vec<&str> = catalog
            .search("ma2", None)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(by_code, vec!["ma201"]);
    }

    #[test]
    fn search_filters_by_department() {
        let catalog = CourseCatalog::from_yaml_str(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog
            .search("programming", Some(Department::ComputerScience))
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["cs101"]);
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let catalog = CourseCatalog::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(catalog.search("  ", None).len(), 4);
        assert_eq!(
            catalog.search("", Some(Department::ComputerScience)).len(),
            2
        );
    }

    #[test]
    fn search_with_no_match_is_empty() {
        let catalog = CourseCatalog::from_yaml_str(SAMPLE).unwrap();
        assert!(catalog.search("quantum", None).is_empty());
    }
}
