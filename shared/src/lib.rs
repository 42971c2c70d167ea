mod directory;
mod outcome;
mod plant;
mod status;

pub use directory::{CareTipsRequest, PlantQuery, PlantRecord};
pub use outcome::{FailureKind, ScanOutcome};
pub use plant::{CareTips, Confidence, PlantIdentification};
pub use status::{ConservationBadge, ConservationStatus, EndemicStatus, Locale};
