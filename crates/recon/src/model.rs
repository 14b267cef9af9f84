use serde::Serialize;

use crate::lookup::LookupKind;

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// How a parcel's land-share area was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Read from the registry's own land-share record.
    Direct,
    /// Computed from building-registry areas.
    Estimated,
    /// Typed into the land-area field by the user.
    Manual,
    /// No usable source; the share must be typed in by hand.
    #[default]
    Unavailable,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Estimated => write!(f, "estimated"),
            Self::Manual => write!(f, "manual"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Advisory
// ---------------------------------------------------------------------------

/// What the form should tell the user about a reconciled share.
///
/// `EstimatedShare` and `ExclusiveAreaProxy` both carry provenance
/// `Estimated`; only the advisory separates a true proportional estimate
/// from the exclusive floor area standing in for it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    #[default]
    None,
    EstimatedShare,
    ExclusiveAreaProxy,
    ManualEntryRequired {
        #[serde(skip_serializing_if = "Option::is_none")]
        land_area_total: Option<f64>,
    },
}

impl Advisory {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// User-facing text shown next to the land-area field.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::EstimatedShare => Some(
                "대지권면적(추정)/대지면적 - 정확한 값은 등기부등본 확인 필요".to_string(),
            ),
            Self::ExclusiveAreaProxy => {
                Some("전용면적 - 대지권 비율은 등기부등본 확인 필요".to_string())
            }
            Self::ManualEntryRequired { land_area_total } => {
                let mut msg = String::from(
                    "전유부 데이터를 찾을 수 없습니다. 대지권 비율은 등기부등본을 확인하여 직접 입력해주세요. (예: 35.9790/36645.30 형식)",
                );
                if let Some(total) = land_area_total {
                    msg.push_str(&format!(" 대지면적: {total}㎡"));
                }
                Some(msg)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

/// Authoritative land share of one parcel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledArea {
    /// Land share in m². Never negative.
    pub land_share_area: f64,
    /// Whole-site land area the share is a part of, when known.
    pub land_area_total: Option<f64>,
    pub provenance: Provenance,
    pub advisory: Advisory,
}

impl ReconciledArea {
    pub fn unavailable(land_area_total: Option<f64>) -> Self {
        Self {
            land_share_area: 0.0,
            land_area_total,
            provenance: Provenance::Unavailable,
            advisory: Advisory::ManualEntryRequired { land_area_total },
        }
    }

    pub fn is_available(&self) -> bool {
        self.provenance != Provenance::Unavailable
    }
}

// ---------------------------------------------------------------------------
// Recoveries
// ---------------------------------------------------------------------------

/// A condition the engine absorbed instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recovery {
    /// Non-numeric area/price input, read as 0.
    ParseFailure { field: String, value: String },
    /// No usable lookup data; provenance set to unavailable.
    MissingSource,
    /// Collaborator returned an error payload; its fields were ignored.
    LookupError { lookup: LookupKind, message: String },
}

impl std::fmt::Display for Recovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure { field, value } => {
                write!(f, "{field}: cannot read '{value}' as a number, using 0")
            }
            Self::MissingSource => write!(f, "no land-share source, manual entry required"),
            Self::LookupError { lookup, message } => write!(f, "{lookup} lookup failed: {message}"),
        }
    }
}
