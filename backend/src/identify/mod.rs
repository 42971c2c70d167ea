pub mod endemic;
pub mod intake;
pub mod normalizer;
pub mod payload;
pub mod prompt;
pub mod service;

pub use endemic::{EndemicClassifier, EndemicKeywords};
pub use service::{IdentificationRequest, PlantIdentifier};
