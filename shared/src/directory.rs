use serde::{Deserialize, Serialize};

use crate::status::ConservationStatus;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub id: u32,
    pub name: String,
    pub scientific_name: String,
    pub region: String,
    pub image_url: String,
    pub description: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub conservation_status: ConservationStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlantQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTipsRequest {
    pub plant_name: String,
}
