//! Normalized collaborator payloads.
//!
//! These are the shapes the lookup layer hands over once a request has
//! resolved. Every field is optional and every payload may instead carry
//! only `error`. Numeric fields accept JSON numbers or strings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::measure::parse_number;
use crate::model::Recovery;
use crate::registry::{classify_usage, UsageEntry, UsageZoning};
use crate::source::{DirectAreaSource, EstimatedAreaSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Address,
    LandInfo,
    Price,
    Usage,
    BuildingUnit,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::LandInfo => write!(f, "land info"),
            Self::Price => write!(f, "price"),
            Self::Usage => write!(f, "usage"),
            Self::BuildingUnit => write!(f, "building unit"),
        }
    }
}

/// Common behaviour of collaborator payloads.
pub trait Lookup: Sized {
    const KIND: LookupKind;

    fn error(&self) -> Option<&str>;

    /// The payload itself, or the recovery to record when it is an error
    /// payload. Error payloads contribute no fields.
    fn into_usable(self) -> Result<Self, Recovery> {
        match self.error() {
            Some(message) => {
                tracing::warn!(lookup = %Self::KIND, "lookup returned error: {message}");
                Err(Recovery::LookupError {
                    lookup: Self::KIND,
                    message: message.to_string(),
                })
            }
            None => Ok(self),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(n)) if n.is_finite() => Some(n),
        Some(NumberOrText::Text(s)) => parse_number(&s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(n)) => Some(n.to_string()),
        Some(NumberOrText::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A picked address-search result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressSelection {
    #[serde(deserialize_with = "lenient_text")]
    pub jibun_address: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub road_address: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub pnu: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub jibun: Option<String>,
    pub error: Option<String>,
}

impl AddressSelection {
    /// Address written into the form: lot-number address first.
    pub fn display_address(&self) -> Option<&str> {
        self.jibun_address.as_deref().or(self.road_address.as_deref())
    }
}

impl Lookup for AddressSelection {
    const KIND: LookupKind = LookupKind::Address;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Land attribute lookup: `{jimokName?, area?, error?}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandInfoLookup {
    #[serde(alias = "jimok_name", deserialize_with = "lenient_text")]
    pub jimok_name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub area: Option<f64>,
    pub error: Option<String>,
}

impl Lookup for LandInfoLookup {
    const KIND: LookupKind = LookupKind::LandInfo;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Official land price lookup: `{price?, error?}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceLookup {
    #[serde(deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub year: Option<String>,
    pub error: Option<String>,
}

impl Lookup for PriceLookup {
    const KIND: LookupKind = LookupKind::Price;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Land-use zoning lookup: `{usageAreas?, usageDistricts?, entries?, error?}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageLookup {
    #[serde(alias = "usage_areas")]
    pub usage_areas: Vec<String>,
    #[serde(alias = "usage_districts")]
    pub usage_districts: Vec<String>,
    /// Unclassified register rows, used when both lists are empty.
    pub entries: Vec<UsageEntry>,
    pub error: Option<String>,
}

impl UsageLookup {
    pub fn zoning(&self) -> UsageZoning {
        if self.usage_areas.is_empty() && self.usage_districts.is_empty() {
            return classify_usage(&self.entries);
        }
        UsageZoning {
            areas: self.usage_areas.clone(),
            districts: self.usage_districts.clone(),
        }
    }
}

impl Lookup for UsageLookup {
    const KIND: LookupKind = LookupKind::Usage;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Which registry answered a building-unit lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSource {
    /// The land-share registry itself.
    #[serde(alias = "vworld")]
    Direct,
    /// The building registry; land share has to be estimated.
    Estimated,
}

/// Building-unit lookup for one dong/ho.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnitLookup {
    pub source: Option<UnitSource>,
    #[serde(alias = "land_share", deserialize_with = "lenient_number")]
    pub land_share: Option<f64>,
    #[serde(alias = "land_area", deserialize_with = "lenient_number")]
    pub land_area: Option<f64>,
    #[serde(alias = "exclusive_area", deserialize_with = "lenient_number")]
    pub exclusive_area: Option<f64>,
    #[serde(alias = "total_area", deserialize_with = "lenient_number")]
    pub total_area: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub structure: Option<String>,
    #[serde(alias = "building_name", deserialize_with = "lenient_text")]
    pub building_name: Option<String>,
    #[serde(alias = "ground_floor", deserialize_with = "lenient_text")]
    pub ground_floor: Option<String>,
    #[serde(alias = "underground_floor", deserialize_with = "lenient_text")]
    pub underground_floor: Option<String>,
    pub error: Option<String>,
}

impl Lookup for UnitLookup {
    const KIND: LookupKind = LookupKind::BuildingUnit;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl UnitLookup {
    /// Split the payload into the two competing land-share sources.
    ///
    /// A direct source exists only when the land-share registry answered and
    /// reported a share. The estimated basis is whatever building-registry
    /// areas are present. Error payloads yield neither.
    pub fn sources(&self) -> (Option<DirectAreaSource>, Option<EstimatedAreaSource>) {
        if self.error.is_some() {
            return (None, None);
        }

        let direct = match self.source {
            Some(UnitSource::Direct) => DirectAreaSource::new(self.land_share, self.land_area),
            _ => None,
        };

        let basis = EstimatedAreaSource {
            exclusive_area: self.exclusive_area,
            total_area: self.total_area,
            land_area: self.land_area,
        };
        let basis = (!basis.is_empty()).then_some(basis);

        (direct, basis)
    }
}
