//! Per-parcel valuation and form totals.

use serde::Serialize;

use crate::area::parse_area;
use crate::display::{blank_area, blank_if_nonpositive};
use crate::form::{FormAggregate, Parcel};
use crate::ValuationMode;

/// Derived values of one parcel.
///
/// INVARIANT: `row_total == land_valuation + fixture_valuation`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ParcelValuation {
    /// Area the land valuation was computed from.
    pub effective_area: f64,
    pub land_valuation: i64,
    pub fixture_valuation: i64,
    pub row_total: i64,
}

/// Price-table area when positive, otherwise the share in the land-area
/// field. A lookup may already have written the resolved share into the
/// price table.
pub fn effective_area(parcel: &Parcel) -> f64 {
    if parcel.price_area.is_finite() && parcel.price_area > 0.0 {
        parcel.price_area
    } else {
        parse_area(&parcel.land_area_raw)
    }
}

/// `round(area * unit_price)`, half away from zero, floored at 0.
pub fn land_valuation(area: f64, unit_price: f64) -> i64 {
    let value = (area * unit_price).round();
    if value.is_finite() && value > 0.0 {
        // saturating
        value as i64
    } else {
        0
    }
}

/// Derive a parcel's valuation.
///
/// `contract_total` is only read in [`ValuationMode::Derived`]; when it is
/// absent there, the typed fixture amount is kept.
pub fn compute_parcel(
    parcel: &Parcel,
    mode: ValuationMode,
    contract_total: Option<i64>,
) -> ParcelValuation {
    let effective_area = effective_area(parcel);
    let land = land_valuation(effective_area, parcel.unit_price);

    let fixture = match mode {
        ValuationMode::Direct => parcel.fixture_input.max(0),
        ValuationMode::Derived => match contract_total {
            Some(total) if total > 0 => total.saturating_sub(land).max(0),
            _ => parcel.fixture_input.max(0),
        },
    };

    ParcelValuation {
        effective_area,
        land_valuation: land,
        fixture_valuation: fixture,
        row_total: land.saturating_add(fixture),
    }
}

/// Sum the current valuations of all parcels.
pub fn compute_aggregate(parcels: &[Parcel]) -> FormAggregate {
    let mut area = 0.0_f64;
    let mut land = 0_i64;
    let mut fixture = 0_i64;

    for parcel in parcels {
        let v = &parcel.valuation;
        area += v.effective_area;
        land = land.saturating_add(v.land_valuation);
        fixture = fixture.saturating_add(v.fixture_valuation);
    }

    FormAggregate {
        total_area: blank_area(area),
        total_land_amount: blank_if_nonpositive(land),
        total_fixture_amount: blank_if_nonpositive(fixture),
        grand_total: blank_if_nonpositive(land.saturating_add(fixture)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parcel(area: f64, unit_price: f64) -> Parcel {
        Parcel {
            price_area: area,
            unit_price,
            ..Parcel::new(1)
        }
    }

    fn valued(index: usize, area: f64, unit_price: f64, fixture: i64) -> Parcel {
        let mut p = Parcel {
            price_area: area,
            unit_price,
            fixture_input: fixture,
            ..Parcel::new(index)
        };
        p.valuation = compute_parcel(&p, ValuationMode::Direct, None);
        p
    }

    #[test]
    fn land_valuation_rounds() {
        let v = compute_parcel(&parcel(35.979, 5_000_000.0), ValuationMode::Direct, None);
        assert_eq!(v.land_valuation, (35.979_f64 * 5_000_000.0).round() as i64);
        assert_eq!(v.land_valuation, 179_895_000);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(land_valuation(0.5, 1.0), 1);
        assert_eq!(land_valuation(2.5, 1.0), 3);
        assert_eq!(land_valuation(1.25, 2.0), 3);
        assert_eq!(land_valuation(1.2, 2.0), 2);
    }

    #[test]
    fn non_finite_products_are_zero() {
        assert_eq!(land_valuation(f64::NAN, 5.0), 0);
        assert_eq!(land_valuation(f64::INFINITY, 5.0), 0);
        assert_eq!(land_valuation(-3.0, 5.0), 0);
    }

    #[test]
    fn price_area_takes_precedence() {
        let p = Parcel {
            land_area_raw: "99/1000".into(),
            price_area: 10.0,
            unit_price: 100.0,
            ..Parcel::new(1)
        };
        assert_eq!(effective_area(&p), 10.0);
        let p = Parcel { price_area: 0.0, ..p };
        assert_eq!(effective_area(&p), 99.0);
    }

    #[test]
    fn derived_fixture() {
        let p = Parcel {
            price_area: 80.0,
            unit_price: 5_000_000.0,
            ..Parcel::new(1)
        };
        let v = compute_parcel(&p, ValuationMode::Derived, Some(500_000_000));
        assert_eq!(v.land_valuation, 400_000_000);
        assert_eq!(v.fixture_valuation, 100_000_000);
        assert_eq!(v.row_total, 500_000_000);
    }

    #[test]
    fn derived_fixture_floors_at_zero() {
        let p = Parcel {
            price_area: 200.0,
            unit_price: 5_000_000.0,
            ..Parcel::new(1)
        };
        let v = compute_parcel(&p, ValuationMode::Derived, Some(500_000_000));
        assert_eq!(v.land_valuation, 1_000_000_000);
        assert_eq!(v.fixture_valuation, 0);
        assert_eq!(v.row_total, v.land_valuation);
    }

    #[test]
    fn derived_without_contract_keeps_typed_fixture() {
        let p = Parcel {
            price_area: 10.0,
            unit_price: 100.0,
            fixture_input: 250,
            ..Parcel::new(1)
        };
        let v = compute_parcel(&p, ValuationMode::Derived, None);
        assert_eq!(v.fixture_valuation, 250);
        assert_eq!(v.row_total, 1_250);
    }

    #[test]
    fn direct_mode_ignores_contract_total() {
        let p = Parcel {
            price_area: 10.0,
            unit_price: 100.0,
            fixture_input: 7,
            ..Parcel::new(1)
        };
        let v = compute_parcel(&p, ValuationMode::Direct, Some(1_000_000));
        assert_eq!(v.fixture_valuation, 7);
    }

    #[test]
    fn three_parcel_scenario() {
        let parcels = vec![
            valued(1, 10.0, 1000.0, 0),
            valued(2, 0.0, 500.0, 0),
            valued(3, 5.0, 2000.0, 0),
        ];
        assert_eq!(parcels[1].valuation.land_valuation, 0);
        let agg = compute_aggregate(&parcels);
        assert_eq!(agg.total_land_amount, Some(20_000));
        assert_eq!(agg.total_area, Some(15.0));
        assert_eq!(agg.total_fixture_amount, None);
        assert_eq!(agg.grand_total, Some(20_000));
    }

    #[test]
    fn empty_form_is_all_sentinels() {
        let agg = compute_aggregate(&[Parcel::new(1)]);
        assert_eq!(agg, FormAggregate::default());
    }

    fn arb_parcels() -> impl Strategy<Value = Vec<Parcel>> {
        proptest::collection::vec(
            (0.0..5_000.0f64, 0.0..20_000_000.0f64, 0..1_000_000_000i64),
            1..12,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (area, price, fixture))| valued(i + 1, area, price, fixture))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn aggregate_is_idempotent(parcels in arb_parcels()) {
            prop_assert_eq!(compute_aggregate(&parcels), compute_aggregate(&parcels));
        }

        #[test]
        fn sum_law(parcels in arb_parcels()) {
            let agg = compute_aggregate(&parcels);
            let land: i64 = parcels.iter().map(|p| p.valuation.land_valuation).sum();
            let fixture: i64 = parcels.iter().map(|p| p.valuation.fixture_valuation).sum();
            prop_assert_eq!(agg.total_land_amount.unwrap_or(0), land);
            prop_assert_eq!(agg.total_fixture_amount.unwrap_or(0), fixture);
            prop_assert_eq!(
                agg.grand_total.unwrap_or(0),
                agg.total_land_amount.unwrap_or(0) + agg.total_fixture_amount.unwrap_or(0)
            );
        }

        #[test]
        fn row_total_invariant(parcels in arb_parcels()) {
            for p in &parcels {
                let v = p.valuation;
                prop_assert_eq!(v.row_total, v.land_valuation + v.fixture_valuation);
                prop_assert!(v.land_valuation >= 0);
            }
        }
    }
}
