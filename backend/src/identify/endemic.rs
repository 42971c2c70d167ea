//! Heuristic endemic classification.
//!
//! The model's own `endemicStatus` is never trusted. The status is recomputed
//! from four keyword lists using case-insensitive substring matching:
//! a species match or a genus match is sufficient on its own, otherwise both
//! the origin (an Indonesian region) and the description (explicit endemic
//! language) must match. The heuristic leans towards precision: endemics that
//! are missing from the lists and come without rich description text are
//! reported as not endemic.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use shared::EndemicStatus;

use crate::config::ConfigError;

const BUILTIN_KEYWORDS: &str = include_str!("../../../config/endemic_keywords.yaml");

/// Replaceable keyword table. Entries are stored lowercased and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndemicKeywords {
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub genera: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub endemic_terms: Vec<String>,
}

impl EndemicKeywords {
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_KEYWORDS, "built-in endemic keywords")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&source, &path.display().to_string())
    }

    pub fn from_yaml(source: &str, origin: &str) -> Result<Self, ConfigError> {
        let keywords: EndemicKeywords =
            serde_yaml::from_str(source).map_err(|source| ConfigError::Yaml {
                path: origin.to_string(),
                source,
            })?;
        Ok(keywords.normalized())
    }

    fn normalized(self) -> Self {
        fn clean(list: Vec<String>) -> Vec<String> {
            list.into_iter()
                .map(|entry| entry.trim().to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect()
        }

        Self {
            species: clean(self.species),
            genera: clean(self.genera),
            regions: clean(self.regions),
            endemic_terms: clean(self.endemic_terms),
        }
    }

    pub fn len(&self) -> usize {
        self.species.len() + self.genera.len() + self.regions.len() + self.endemic_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The free-text fields the classifier looks at.
#[derive(Debug, Clone, Copy)]
pub struct EndemicEvidence<'a> {
    pub scientific_name: &'a str,
    pub common_name: &'a str,
    pub origin: &'a str,
    pub description: &'a str,
}

/// Which signals matched, and the resulting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndemicVerdict {
    pub species_match: bool,
    pub genus_match: bool,
    pub region_match: bool,
    pub endemic_language: bool,
}

impl EndemicVerdict {
    pub fn is_endemic(&self) -> bool {
        self.species_match || self.genus_match || (self.region_match && self.endemic_language)
    }

    pub fn status(&self) -> EndemicStatus {
        EndemicStatus::from_flag(self.is_endemic())
    }
}

#[derive(Debug, Clone)]
pub struct EndemicClassifier {
    keywords: EndemicKeywords,
}

impl EndemicClassifier {
    pub fn new(keywords: EndemicKeywords) -> Self {
        Self {
            keywords: keywords.normalized(),
        }
    }

    pub fn classify(&self, evidence: &EndemicEvidence<'_>) -> EndemicVerdict {
        let scientific_name = evidence.scientific_name.to_lowercase();
        let common_name = evidence.common_name.to_lowercase();
        let origin = evidence.origin.to_lowercase();
        let description = evidence.description.to_lowercase();

        let names_match = |list: &[String]| {
            contains_any(&scientific_name, list) || contains_any(&common_name, list)
        };

        let verdict = EndemicVerdict {
            species_match: names_match(&self.keywords.species),
            genus_match: names_match(&self.keywords.genera),
            region_match: contains_any(&origin, &self.keywords.regions),
            endemic_language: contains_any(&description, &self.keywords.endemic_terms),
        };

        debug!(
            "Endemic signals for {}: {:?} -> {}",
            evidence.scientific_name,
            verdict,
            verdict.status()
        );
        verdict
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    !haystack.is_empty() && needles.iter().any(|needle| haystack.contains(needle.as_str()))
}
