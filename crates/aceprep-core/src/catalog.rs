//! Subject catalogs.
//!
//! A catalog maps subject names to their ordered chapter lists. Each tool
//! carries its own catalog: the archive browser works from a shorter list
//! than the generators, and the two are deliberately kept apart.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One subject and its chapters, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Read-only mapping from subject name to ordered topic list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCatalog {
    subjects: Vec<Subject>,
}

/// TOML file layout: a list of `[[subjects]]` tables.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    subjects: Vec<Subject>,
}

impl SubjectCatalog {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    /// Full chapter lists used by the test generator, formula cards and
    /// time table.
    pub fn standard() -> Self {
        Self::from_static(&[
            ("Physics", STANDARD_PHYSICS),
            ("Chemistry", STANDARD_CHEMISTRY),
            ("Mathematics", STANDARD_MATHEMATICS),
            ("Biology", STANDARD_BIOLOGY),
        ])
    }

    /// Abbreviated chapter lists used by the archive browser.
    pub fn archive() -> Self {
        Self::from_static(&[
            ("Physics", ARCHIVE_PHYSICS),
            ("Chemistry", ARCHIVE_CHEMISTRY),
            ("Mathematics", ARCHIVE_MATHEMATICS),
            ("Biology", ARCHIVE_BIOLOGY),
        ])
    }

    fn from_static(entries: &[(&str, &[&str])]) -> Self {
        Self {
            subjects: entries
                .iter()
                .map(|(name, topics)| Subject {
                    name: name.to_string(),
                    topics: topics.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: TomlCatalogFile = toml::from_str(content)
            .with_context(|| format!("failed to parse catalog: {}", source_path.display()))?;
        Ok(Self::new(parsed.subjects))
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::from_toml_str(&content, path)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }

    pub fn contains_subject(&self, name: &str) -> bool {
        self.subjects.iter().any(|s| s.name == name)
    }

    /// Topics of `subject`, or an empty slice for an unknown subject.
    pub fn topics(&self, subject: &str) -> &[String] {
        self.subjects
            .iter()
            .find(|s| s.name == subject)
            .map(|s| s.topics.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `topic` belongs to `subject`.
    pub fn subject_has_topic(&self, subject: &str, topic: &str) -> bool {
        self.topics(subject).iter().any(|t| t == topic)
    }

    /// Subjects whose chapter list contains `topic`. A chapter name may
    /// appear under more than one subject (e.g. Thermodynamics).
    pub fn subjects_for_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a str> {
        self.subjects
            .iter()
            .filter(move |s| s.topics.iter().any(|t| t == topic))
            .map(|s| s.name.as_str())
    }

    /// Check the catalog for entries a selection could not handle sensibly.
    pub fn validate(&self) -> Vec<CatalogWarning> {
        let mut warnings = Vec::new();

        let mut seen = HashSet::new();
        for subject in &self.subjects {
            if subject.name.trim().is_empty() {
                warnings.push(CatalogWarning {
                    subject: None,
                    message: "subject name is empty".into(),
                });
            } else if !seen.insert(subject.name.as_str()) {
                warnings.push(CatalogWarning {
                    subject: Some(subject.name.clone()),
                    message: format!("duplicate subject: {}", subject.name),
                });
            }
        }

        for subject in &self.subjects {
            if subject.topics.is_empty() {
                warnings.push(CatalogWarning {
                    subject: Some(subject.name.clone()),
                    message: "subject has no topics".into(),
                });
            }
            let mut topics = HashSet::new();
            for topic in &subject.topics {
                if !topics.insert(topic.as_str()) {
                    warnings.push(CatalogWarning {
                        subject: Some(subject.name.clone()),
                        message: format!("duplicate topic: {topic}"),
                    });
                }
            }
        }

        warnings
    }
}

/// A problem found while validating a catalog.
#[derive(Debug, Clone)]
pub struct CatalogWarning {
    pub subject: Option<String>,
    pub message: String,
}

const STANDARD_PHYSICS: &[&str] = &[
    "Units and Measurements",
    "Kinematics",
    "Laws of Motion",
    "Work, Energy and Power",
    "Rotational Mechanics",
    "Gravitation",
    "Thermodynamics",
    "Oscillations and Waves",
    "Electrostatics",
    "Current Electricity",
    "Magnetic Effects of Current",
    "Optics",
    "Dual Nature of Matter",
    "Atoms and Nuclei",
    "Electronic Devices",
];

const STANDARD_CHEMISTRY: &[&str] = &[
    "Some Basic Concepts",
    "Structure of Atom",
    "Classification of Elements",
    "Chemical Bonding",
    "States of Matter",
    "Thermodynamics",
    "Equilibrium",
    "Redox Reactions",
    "Hydrogen",
    "s-Block Elements",
    "p-Block Elements",
    "Organic Chemistry Basics",
    "Hydrocarbons",
    "Environmental Chemistry",
    "Solid State",
    "Solutions",
    "Electrochemistry",
    "Chemical Kinetics",
    "Surface Chemistry",
    "Coordination Compounds",
    "Haloalkanes",
    "Alcohols and Phenols",
    "Aldehydes and Ketones",
    "Amines",
    "Biomolecules",
    "Polymers",
];

const STANDARD_MATHEMATICS: &[&str] = &[
    "Sets and Functions",
    "Trigonometric Functions",
    "Complex Numbers",
    "Quadratic Equations",
    "Permutations and Combinations",
    "Binomial Theorem",
    "Sequences and Series",
    "Straight Lines",
    "Conic Sections",
    "Limits and Derivatives",
    "Mathematical Reasoning",
    "Matrices and Determinants",
    "Continuity and Differentiability",
    "Integrals",
    "Differential Equations",
    "Vector Algebra",
    "Three Dimensional Geometry",
    "Probability",
];

const STANDARD_BIOLOGY: &[&str] = &[
    "Diversity in Living World",
    "Structural Organization",
    "Cell Structure and Function",
    "Plant Physiology",
    "Human Physiology",
    "Reproduction",
    "Genetics and Evolution",
    "Biology and Human Welfare",
    "Biotechnology",
    "Ecology and Environment",
];

const ARCHIVE_PHYSICS: &[&str] = &[
    "Kinematics",
    "Laws of Motion",
    "Work & Energy",
    "Rotational Mechanics",
    "Gravitation",
    "Thermodynamics",
    "Electrostatics",
    "Optics",
];

const ARCHIVE_CHEMISTRY: &[&str] = &[
    "Atomic Structure",
    "Chemical Bonding",
    "Thermodynamics",
    "Equilibrium",
    "Hydrocarbons",
    "Solutions",
    "Electrochemistry",
    "Coordination Compounds",
];

const ARCHIVE_MATHEMATICS: &[&str] = &[
    "Quadratic Equations",
    "Matrices",
    "Calculus",
    "Vectors",
    "3D Geometry",
    "Probability",
    "Trigonometry",
    "Sequences",
];

const ARCHIVE_BIOLOGY: &[&str] = &[
    "Cell Biology",
    "Genetics",
    "Plant Physiology",
    "Human Physiology",
    "Ecology",
    "Biotechnology",
    "Reproduction",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn standard_catalog_sizes() {
        let catalog = SubjectCatalog::standard();
        assert_eq!(catalog.topics("Physics").len(), 15);
        assert_eq!(catalog.topics("Chemistry").len(), 26);
        assert_eq!(catalog.topics("Mathematics").len(), 18);
        assert_eq!(catalog.topics("Biology").len(), 10);
        assert!(catalog.topics("History").is_empty());
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn archive_catalog_is_separate() {
        let archive = SubjectCatalog::archive();
        assert_eq!(archive.topics("Biology").len(), 7);
        assert!(archive.subject_has_topic("Mathematics", "Calculus"));
        assert!(!SubjectCatalog::standard().subject_has_topic("Mathematics", "Calculus"));
        assert!(archive.validate().is_empty());
    }

    #[test]
    fn shared_topic_lists_both_subjects() {
        let catalog = SubjectCatalog::standard();
        let owners: Vec<&str> = catalog.subjects_for_topic("Thermodynamics").collect();
        assert_eq!(owners, vec!["Physics", "Chemistry"]);
    }

    #[test]
    fn parse_toml_catalog() {
        let toml = r#"
[[subjects]]
name = "Physics"
topics = ["Optics", "Kinematics"]

[[subjects]]
name = "Economics"
topics = ["Demand"]
"#;
        let catalog = SubjectCatalog::from_toml_str(toml, &PathBuf::from("c.toml")).unwrap();
        assert_eq!(catalog.subject_names().collect::<Vec<_>>(), ["Physics", "Economics"]);
        assert_eq!(catalog.topics("Economics"), ["Demand".to_string()]);
    }

    #[test]
    fn validate_flags_duplicates_and_empty_subjects() {
        let toml = r#"
[[subjects]]
name = "Physics"
topics = ["Optics", "Optics"]

[[subjects]]
name = "Physics"

[[subjects]]
name = " "
topics = ["x"]
"#;
        let catalog = SubjectCatalog::from_toml_str(toml, &PathBuf::from("c.toml")).unwrap();
        let warnings = catalog.validate();
        assert!(warnings.iter().any(|w| w.message.contains("duplicate subject")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate topic")));
        assert!(warnings.iter().any(|w| w.message.contains("no topics")));
        assert!(warnings.iter().any(|w| w.message.contains("name is empty")));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "[[subjects]]\nname = \"Art\"\ntopics = [\"Colour\"]\n").unwrap();
        let catalog = SubjectCatalog::load(&path).unwrap();
        assert!(catalog.contains_subject("Art"));
        assert!(SubjectCatalog::load(&dir.path().join("missing.toml")).is_err());
    }
}
