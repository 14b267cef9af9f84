use landpermit_recon::Provenance;
use serde::Serialize;

use crate::valuation::ParcelValuation;

// ---------------------------------------------------------------------------
// Parcel
// ---------------------------------------------------------------------------

/// One parcel row of the form.
///
/// Identity fields are filled once per lookup result; `valuation` is
/// re-derived from the inputs every time one of them changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Parcel {
    /// 1-based row number.
    pub index: usize,

    pub address: String,
    pub pnu: String,
    pub jibun: String,
    pub dong: Option<String>,
    pub ho: Option<String>,
    pub jimok_name: Option<String>,

    /// Land-area field as typed or looked up: `share/total` or a number.
    pub land_area_raw: String,
    /// Area column of the price table. When positive it is used instead of
    /// re-reading `land_area_raw`.
    pub price_area: f64,

    /// Reconciled land share (m²). Never negative.
    pub land_share_area: f64,
    pub land_share_provenance: Provenance,

    /// Official land price per m².
    pub unit_price: f64,
    /// Fixture amount as typed by the user.
    pub fixture_input: i64,

    pub valuation: ParcelValuation,

    pub structure_description: String,
    pub fixture_type_description: String,
    pub usage_areas: Vec<String>,
}

impl Parcel {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Form-wide totals. A pure function of the parcel set; `None` is the
/// empty sentinel for non-positive totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FormAggregate {
    pub total_area: Option<f64>,
    pub total_land_amount: Option<i64>,
    pub total_fixture_amount: Option<i64>,
    pub grand_total: Option<i64>,
}
