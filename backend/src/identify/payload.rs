use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::{CareTips, Confidence, EndemicStatus, PlantIdentification};

use super::endemic::EndemicEvidence;
use super::normalizer::{ModelPayload, require_text};
use crate::error::ScanResult;

/// Identification exactly as the model reported it, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdentification {
    pub name: String,
    pub scientific_name: String,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: Confidence,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub characteristics: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub family: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub habitat: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub origin: String,
    /// Advisory only; the classifier decides the final status.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub endemic_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub distribution: String,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub uses: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub care_instructions: String,
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    pub is_edible: bool,
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    pub is_decorative: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub conservation_status: Option<String>,
}

impl ModelPayload for RawIdentification {
    const KIND: &'static str = "identification";

    fn check_required(object: &Map<String, Value>) -> ScanResult<()> {
        require_text(object, "name")?;
        require_text(object, "scientificName")
    }
}

impl RawIdentification {
    pub fn evidence(&self) -> EndemicEvidence<'_> {
        EndemicEvidence {
            scientific_name: &self.scientific_name,
            common_name: &self.name,
            origin: &self.origin,
            description: &self.description,
        }
    }

    pub fn into_identification(self, endemic_status: EndemicStatus) -> PlantIdentification {
        PlantIdentification {
            name: self.name.trim().to_string(),
            scientific_name: self.scientific_name.trim().to_string(),
            confidence: self.confidence,
            description: self.description,
            characteristics: self.characteristics,
            family: self.family,
            habitat: self.habitat,
            origin: self.origin,
            endemic_status,
            distribution: self.distribution,
            uses: self.uses,
            care_instructions: self.care_instructions,
            is_edible: self.is_edible,
            is_decorative: self.is_decorative,
            conservation_status: self.conservation_status,
        }
    }
}

/// Care tips as the model reported them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCareTips {
    pub watering: String,
    pub sunlight: String,
    pub soil: String,
    pub temperature: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub fertilizer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub pruning: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub common_problems: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub seasonal_care: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub propagation: Option<String>,
}

impl ModelPayload for RawCareTips {
    const KIND: &'static str = "care tips";

    fn check_required(object: &Map<String, Value>) -> ScanResult<()> {
        for key in ["watering", "sunlight", "soil", "temperature"] {
            require_text(object, key)?;
        }
        Ok(())
    }
}

impl From<RawCareTips> for CareTips {
    fn from(raw: RawCareTips) -> Self {
        CareTips {
            watering: raw.watering,
            sunlight: raw.sunlight,
            soil: raw.soil,
            temperature: raw.temperature,
            humidity: raw.humidity,
            fertilizer: raw.fertilizer,
            pruning: raw.pruning,
            common_problems: raw.common_problems,
            tips: raw.tips,
            seasonal_care: raw.seasonal_care,
            propagation: raw.propagation,
        }
    }
}

// The model is loose with primitive types; these accept the common variants.

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<Confidence, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Confidence::default()),
        Value::Number(n) => n
            .as_f64()
            .map(Confidence::from_score)
            .ok_or_else(|| de::Error::custom(format!("Invalid confidence: {}", n))),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map(Confidence::from_score)
            .map_err(|_| de::Error::custom(format!("Invalid confidence string: {}", s))),
        _ => Err(de::Error::custom("Expected number or numeric string")),
    }
}

fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "ya" => Ok(true),
            "false" | "no" | "tidak" => Ok(false),
            _ => Err(de::Error::custom(format!(
                "Invalid boolean string: {}",
                s
            ))),
        },
        _ => Err(de::Error::custom("Expected boolean or string")),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.unwrap_or_default())
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(de::Error::custom("Expected text")),
    }
}

fn deserialize_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                _ => Err(de::Error::custom("Expected a list of strings")),
            })
            .collect(),
        _ => Err(de::Error::custom("Expected a list of strings")),
    }
}
