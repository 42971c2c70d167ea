use std::collections::HashSet;
use std::path::Path;

use log::info;
use shared::{PlantQuery, PlantRecord};
use thiserror::Error;

const BUILTIN_PLANTS: &str = include_str!("../../../config/plants.yaml");

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read plant directory {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid plant directory {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Duplicate plant id {id} in {path}")]
    DuplicateId { path: String, id: u32 },
}

/// Read-only catalogue of known plants, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct PlantDirectory {
    records: Vec<PlantRecord>,
}

impl PlantDirectory {
    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_yaml(BUILTIN_PLANTS, "built-in plant directory")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&source, &path.display().to_string())
    }

    pub fn from_yaml(source: &str, origin: &str) -> Result<Self, DirectoryError> {
        let records: Vec<PlantRecord> =
            serde_yaml::from_str(source).map_err(|source| DirectoryError::Yaml {
                path: origin.to_string(),
                source,
            })?;
        Self::from_records(records, origin)
    }

    fn from_records(records: Vec<PlantRecord>, origin: &str) -> Result<Self, DirectoryError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(DirectoryError::DuplicateId {
                    path: origin.to_string(),
                    id: record.id,
                });
            }
        }
        info!("Loaded {} plants from {}", records.len(), origin);
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&PlantRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Case-insensitive substring match on either name, combined with an
    /// exact case-insensitive region match. Blank filters are ignored.
    pub fn search(&self, query: &PlantQuery) -> Vec<&PlantRecord> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let region = query
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        self.records
            .iter()
            .filter(|record| match &needle {
                Some(needle) => {
                    record.name.to_lowercase().contains(needle)
                        || record.scientific_name.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|record| match region {
                Some(region) => record.region.eq_ignore_ascii_case(region),
                None => true,
            })
            .collect()
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::new();
        for record in &self.records {
            if !regions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(&record.region))
            {
                regions.push(&record.region);
            }
        }
        regions
    }
}
