use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Every field the engine reads or writes.
///
/// Parcel-scoped keys address one parcel row; form-scoped keys exist once
/// per form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    // Parcel identity
    Address,
    Pnu,
    Jibun,
    Dong,
    Ho,
    JimokName,
    UsageAreas,

    // Parcel inputs
    /// Land-area field, `share/total` or a plain number.
    LandArea,
    /// Area column of the price table; takes precedence over `LandArea`.
    PriceArea,
    UnitPrice,
    FixtureValuation,
    FixtureContent,
    FixtureType,

    // Parcel outputs
    LandValuation,
    RowTotal,

    // Form inputs
    ContractTotal,
    RightType,
    FixtureRightType,

    // Form outputs
    TotalArea,
    TotalLandAmount,
    TotalFixtureAmount,
    GrandTotal,
}

impl FieldKey {
    pub const ALL: [FieldKey; 22] = [
        Self::Address,
        Self::Pnu,
        Self::Jibun,
        Self::Dong,
        Self::Ho,
        Self::JimokName,
        Self::UsageAreas,
        Self::LandArea,
        Self::PriceArea,
        Self::UnitPrice,
        Self::FixtureValuation,
        Self::FixtureContent,
        Self::FixtureType,
        Self::LandValuation,
        Self::RowTotal,
        Self::ContractTotal,
        Self::RightType,
        Self::FixtureRightType,
        Self::TotalArea,
        Self::TotalLandAmount,
        Self::TotalFixtureAmount,
        Self::GrandTotal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Pnu => "pnu",
            Self::Jibun => "jibun",
            Self::Dong => "dong",
            Self::Ho => "ho",
            Self::JimokName => "jimok_name",
            Self::UsageAreas => "usage_areas",
            Self::LandArea => "land_area",
            Self::PriceArea => "price_area",
            Self::UnitPrice => "unit_price",
            Self::FixtureValuation => "fixture_valuation",
            Self::FixtureContent => "fixture_content",
            Self::FixtureType => "fixture_type",
            Self::LandValuation => "land_valuation",
            Self::RowTotal => "row_total",
            Self::ContractTotal => "contract_total",
            Self::RightType => "right_type",
            Self::FixtureRightType => "fixture_right_type",
            Self::TotalArea => "total_area",
            Self::TotalLandAmount => "total_land_amount",
            Self::TotalFixtureAmount => "total_fixture_amount",
            Self::GrandTotal => "grand_total",
        }
    }

    /// Exists once per form rather than once per parcel.
    pub fn is_form_level(&self) -> bool {
        matches!(
            self,
            Self::ContractTotal
                | Self::RightType
                | Self::FixtureRightType
                | Self::TotalArea
                | Self::TotalLandAmount
                | Self::TotalFixtureAmount
                | Self::GrandTotal
        )
    }

    /// Written by the engine only.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Self::LandValuation
                | Self::RowTotal
                | Self::TotalArea
                | Self::TotalLandAmount
                | Self::TotalFixtureAmount
                | Self::GrandTotal
        )
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EngineError::UnknownField(s.to_string()))
    }
}
