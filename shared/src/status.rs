use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Display language for labels. Domain values never carry localized text.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    Id,
    En,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "camelCase")]
pub enum EndemicStatus {
    Endemic,
    NotEndemic,
}

impl EndemicStatus {
    pub fn from_flag(is_endemic: bool) -> Self {
        if is_endemic {
            Self::Endemic
        } else {
            Self::NotEndemic
        }
    }

    pub fn is_endemic(&self) -> bool {
        matches!(self, Self::Endemic)
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Endemic, Locale::Id) => "Tanaman endemik",
            (Self::Endemic, Locale::En) => "Endemic plant",
            (Self::NotEndemic, Locale::Id) => "Bukan tanaman endemik",
            (Self::NotEndemic, Locale::En) => "Not an endemic plant",
        }
    }
}

/// IUCN-style threat category. Variants are declared from least to most
/// severe so the derived ordering follows severity.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ConservationStatus {
    #[serde(rename = "LC")]
    #[strum(serialize = "LC")]
    LeastConcern,
    #[serde(rename = "NT")]
    #[strum(serialize = "NT")]
    NearThreatened,
    #[serde(rename = "VU")]
    #[strum(serialize = "VU")]
    Vulnerable,
    #[serde(rename = "EN")]
    #[strum(serialize = "EN")]
    Endangered,
    #[serde(rename = "CR")]
    #[strum(serialize = "CR")]
    CriticallyEndangered,
}

impl ConservationStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::LeastConcern => "LC",
            Self::NearThreatened => "NT",
            Self::Vulnerable => "VU",
            Self::Endangered => "EN",
            Self::CriticallyEndangered => "CR",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::LeastConcern, Locale::Id) => "Risiko Rendah",
            (Self::NearThreatened, Locale::Id) => "Hampir Terancam",
            (Self::Vulnerable, Locale::Id) => "Rentan",
            (Self::Endangered, Locale::Id) => "Terancam Punah",
            (Self::CriticallyEndangered, Locale::Id) => "Kritis",
            (Self::LeastConcern, Locale::En) => "Least Concern",
            (Self::NearThreatened, Locale::En) => "Near Threatened",
            (Self::Vulnerable, Locale::En) => "Vulnerable",
            (Self::Endangered, Locale::En) => "Endangered",
            (Self::CriticallyEndangered, Locale::En) => "Critically Endangered",
        }
    }

    /// Severity styling used by badges.
    pub fn color(&self) -> &'static str {
        match self {
            Self::LeastConcern => "green",
            Self::NearThreatened => "blue",
            Self::Vulnerable => "yellow",
            Self::Endangered => "orange",
            Self::CriticallyEndangered => "red",
        }
    }

    /// Every badge, least severe first.
    pub fn badges(locale: Locale) -> Vec<ConservationBadge> {
        Self::iter().map(|status| status.badge(locale)).collect()
    }

    pub fn badge(&self, locale: Locale) -> ConservationBadge {
        ConservationBadge {
            code: *self,
            label: self.label(locale).to_string(),
            color: self.color().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConservationBadge {
    pub code: ConservationStatus,
    pub label: String,
    pub color: String,
}
