use std::sync::Arc;

use log::{debug, info};
use shared::{CareTips, PlantIdentification};

use super::endemic::EndemicClassifier;
use super::normalizer::normalize;
use super::payload::{RawCareTips, RawIdentification};
use super::prompt;
use crate::ai::{AiClient, ImagePart};
use crate::error::{ScanError, ScanResult};

/// One user-initiated scan. Created per request and dropped afterwards.
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    pub image: ImagePart,
    pub prompt_template: Option<String>,
}

impl IdentificationRequest {
    pub fn new(image: ImagePart) -> Self {
        Self {
            image,
            prompt_template: None,
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }
}

/// Orchestrates prompt, AI call, normalization and classification. Holds no
/// per-request state, so concurrent calls are independent.
#[derive(Clone)]
pub struct PlantIdentifier {
    client: Arc<dyn AiClient>,
    classifier: Arc<EndemicClassifier>,
}

impl PlantIdentifier {
    pub fn new(client: Arc<dyn AiClient>, classifier: EndemicClassifier) -> Self {
        Self {
            client,
            classifier: Arc::new(classifier),
        }
    }

    pub async fn identify(
        &self,
        request: &IdentificationRequest,
    ) -> ScanResult<PlantIdentification> {
        let prompt = prompt::identification_prompt(request.prompt_template.as_deref());
        let raw = self.client.identify(&request.image, &prompt).await?;
        debug!("Raw identification response: {}", raw);

        let payload: RawIdentification = normalize(&raw)?;
        let verdict = self.classifier.classify(&payload.evidence());

        if let Some(hint) = payload.endemic_status.as_deref() {
            debug!(
                "Model reported endemic status {:?}, classifier decided {}",
                hint,
                verdict.status()
            );
        }
        info!(
            "Identified {} ({}) with confidence {}, {}",
            payload.name.trim(),
            payload.scientific_name.trim(),
            payload.confidence,
            verdict.status()
        );

        Ok(payload.into_identification(verdict.status()))
    }

    pub async fn care_tips(&self, plant_name: &str) -> ScanResult<CareTips> {
        let plant_name = plant_name.trim();
        if plant_name.is_empty() {
            return Err(ScanError::Input("A plant name is required".to_string()));
        }

        let prompt = prompt::care_tips_prompt(plant_name);
        let raw = self.client.complete(&prompt).await?;
        debug!("Raw care tips response for {}: {}", plant_name, raw);

        let payload: RawCareTips = normalize(&raw)?;
        info!("Fetched care tips for {}", plant_name);
        Ok(payload.into())
    }
}
