use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

use crate::status::EndemicStatus;

/// Self-reported model certainty, always within 0..=100.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Display, Into,
)]
#[serde(from = "u8", into = "u8")]
pub struct Confidence(u8);

impl From<u8> for Confidence {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl Confidence {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Rounds and clamps an arbitrary score into range. NaN maps to zero.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            return Self(0);
        }
        Self(score.round().clamp(0.0, Self::MAX as f64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantIdentification {
    pub name: String,
    pub scientific_name: String,
    pub confidence: Confidence,
    pub description: String,
    pub characteristics: Vec<String>,
    pub family: String,
    pub habitat: String,
    pub origin: String,
    pub endemic_status: EndemicStatus,
    pub distribution: String,
    pub uses: Vec<String>,
    pub care_instructions: String,
    pub is_edible: bool,
    pub is_decorative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTips {
    pub watering: String,
    pub sunlight: String,
    pub soil: String,
    pub temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pruning: Option<String>,
    #[serde(default)]
    pub common_problems: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_care: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<String>,
}
