//! Land-share sources and their reconciliation.
//!
//! Precedence: a direct land-share record wins outright; otherwise the share
//! is estimated from the unit's exclusive floor area relative to the
//! building's total floor area, scaled by the site land area; otherwise the
//! exclusive area stands in as a proxy; otherwise nothing is known.

use serde::Serialize;

use crate::measure::{non_negative, round4};
use crate::model::{Advisory, Provenance, ReconciledArea};

/// Land share as recorded by the land-share registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectAreaSource {
    pub land_share: f64,
    pub land_area: Option<f64>,
}

impl DirectAreaSource {
    /// A direct source exists only when it supplies a share.
    pub fn new(land_share: Option<f64>, land_area: Option<f64>) -> Option<Self> {
        land_share.map(|land_share| Self {
            land_share,
            land_area,
        })
    }
}

/// Building-registry areas a share can be estimated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstimatedAreaSource {
    /// Exclusive floor area of the unit.
    pub exclusive_area: Option<f64>,
    /// Total floor area of the building.
    pub total_area: Option<f64>,
    /// Site land area.
    pub land_area: Option<f64>,
}

impl EstimatedAreaSource {
    pub fn is_empty(&self) -> bool {
        self.exclusive_area.is_none() && self.total_area.is_none() && self.land_area.is_none()
    }
}

/// The single source a parcel's share is taken from.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaSource {
    Direct(DirectAreaSource),
    Estimated(EstimatedAreaSource),
    NoSource,
}

impl AreaSource {
    /// Pick the most authoritative source on offer.
    pub fn select(direct: Option<DirectAreaSource>, basis: Option<EstimatedAreaSource>) -> Self {
        match (direct, basis) {
            (Some(direct), _) => Self::Direct(direct),
            (None, Some(basis)) if !basis.is_empty() => Self::Estimated(basis),
            _ => Self::NoSource,
        }
    }

    pub fn reconcile(&self) -> ReconciledArea {
        match self {
            Self::Direct(direct) => ReconciledArea {
                land_share_area: non_negative(direct.land_share),
                land_area_total: direct.land_area,
                provenance: Provenance::Direct,
                advisory: Advisory::None,
            },
            Self::Estimated(basis) => estimate(basis),
            Self::NoSource => ReconciledArea::unavailable(None),
        }
    }
}

fn estimate(basis: &EstimatedAreaSource) -> ReconciledArea {
    match (basis.exclusive_area, basis.total_area, basis.land_area) {
        (Some(exclusive), Some(total), Some(land)) if total > 0.0 => ReconciledArea {
            land_share_area: non_negative(round4(exclusive / total * land)),
            land_area_total: Some(land),
            provenance: Provenance::Estimated,
            advisory: Advisory::EstimatedShare,
        },
        // Exclusive area as a proxy: not a land share, so no false precision
        (Some(exclusive), _, _) => ReconciledArea {
            land_share_area: non_negative(exclusive),
            land_area_total: None,
            provenance: Provenance::Estimated,
            advisory: Advisory::ExclusiveAreaProxy,
        },
        (None, _, land) => ReconciledArea::unavailable(land),
    }
}

/// Reconcile a parcel's land share from the direct record and the
/// estimation basis, either of which may be missing.
pub fn reconcile_parcel_area(
    direct: Option<&DirectAreaSource>,
    basis: Option<&EstimatedAreaSource>,
) -> ReconciledArea {
    let area = AreaSource::select(direct.cloned(), basis.cloned()).reconcile();
    tracing::debug!(
        provenance = %area.provenance,
        land_share_area = area.land_share_area,
        "reconciled land share"
    );
    area
}
