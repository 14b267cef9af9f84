//! Field propagation.
//!
//! Every input change runs one pass: the new value is stored, the fields
//! that mirror it are written, the parcel and the form totals are
//! recomputed, and the resulting writes are returned as a [`ChangeSet`].
//! A pass never writes back into the field that triggered it, and nothing
//! written during a pass triggers another pass.

use std::collections::BTreeSet;

use landpermit_recon::measure::{non_negative, parse_number};
use landpermit_recon::{Advisory, Provenance, Recovery};

use crate::area::AreaFraction;
use crate::display::{format_amount, format_area};
use crate::error::EngineError;
use crate::field::FieldKey;
use crate::session::FormSession;
use crate::surface::FormSurface;
use crate::valuation::{compute_aggregate, compute_parcel};
use crate::ValuationMode;

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// One rendered write into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    /// `None` for form-level fields.
    pub parcel: Option<usize>,
    pub key: FieldKey,
    pub value: String,
}

/// Hover text and empty-field hint for one field. Both `None` clears them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHint {
    pub parcel: Option<usize>,
    pub key: FieldKey,
    pub title: Option<String>,
    pub placeholder: Option<String>,
}

/// Outcome of one propagation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Session revision after the pass.
    pub revision: u64,
    /// Dependent fields to update, in write order. At most one write per
    /// field.
    pub writes: Vec<FieldWrite>,
    /// Parcels whose valuation was recomputed.
    pub recomputed: Vec<usize>,
    pub recoveries: Vec<Recovery>,
    pub advisories: Vec<Advisory>,
    pub hints: Vec<FieldHint>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.recomputed.is_empty() && self.hints.is_empty()
    }

    /// Value written to a field during this pass.
    pub fn value(&self, parcel: Option<usize>, key: FieldKey) -> Option<&str> {
        self.writes
            .iter()
            .find(|w| w.parcel == parcel && w.key == key)
            .map(|w| w.value.as_str())
    }

    pub fn touches(&self, key: FieldKey) -> bool {
        self.writes.iter().any(|w| w.key == key)
    }

    pub fn hint(&self, parcel: Option<usize>, key: FieldKey) -> Option<&FieldHint> {
        self.hints.iter().find(|h| h.parcel == parcel && h.key == key)
    }

    /// Copy every write into `surface`. Fields the surface lacks are
    /// skipped. Returns the number of fields written.
    pub fn write_to<S: FormSurface + ?Sized>(&self, surface: &mut S) -> usize {
        let mut written = 0;
        for w in &self.writes {
            if surface.write(w.parcel, w.key, &w.value) {
                written += 1;
            } else {
                tracing::trace!(key = %w.key, parcel = ?w.parcel, "field absent from surface");
            }
        }
        for h in &self.hints {
            surface.describe(h.parcel, h.key, h.title.as_deref(), h.placeholder.as_deref());
        }
        written
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// Accumulates the effects of one change before they are committed.
#[derive(Debug)]
pub(crate) struct Pass {
    trigger: Option<(Option<usize>, FieldKey)>,
    omitted: BTreeSet<FieldKey>,
    pub(crate) touched: bool,
    pub(crate) writes: Vec<FieldWrite>,
    pub(crate) recomputed: Vec<usize>,
    pub(crate) recoveries: Vec<(Option<usize>, Recovery)>,
    pub(crate) advisories: Vec<(usize, Advisory)>,
    pub(crate) hints: Vec<FieldHint>,
}

impl Pass {
    pub(crate) fn new(trigger: Option<(Option<usize>, FieldKey)>, omitted: &BTreeSet<FieldKey>) -> Self {
        Self {
            trigger,
            omitted: omitted.clone(),
            touched: false,
            writes: Vec::new(),
            recomputed: Vec::new(),
            recoveries: Vec::new(),
            advisories: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub(crate) fn write(&mut self, parcel: Option<usize>, key: FieldKey, value: String) {
        self.touched = true;
        if self.trigger == Some((parcel, key)) || self.omitted.contains(&key) {
            return;
        }
        match self
            .writes
            .iter_mut()
            .find(|w| w.parcel == parcel && w.key == key)
        {
            Some(existing) => existing.value = value,
            None => self.writes.push(FieldWrite { parcel, key, value }),
        }
    }

    /// Replace the hover text and hint of a field. Last hint wins.
    pub(crate) fn hint(
        &mut self,
        parcel: Option<usize>,
        key: FieldKey,
        title: Option<String>,
        placeholder: Option<String>,
    ) {
        if self.omitted.contains(&key) {
            return;
        }
        self.hints.retain(|h| !(h.parcel == parcel && h.key == key));
        self.hints.push(FieldHint {
            parcel,
            key,
            title,
            placeholder,
        });
    }

    pub(crate) fn recover(&mut self, parcel: Option<usize>, recovery: Recovery) {
        tracing::debug!(parcel = ?parcel, "{recovery}");
        self.recoveries.push((parcel, recovery));
    }

    pub(crate) fn advise(&mut self, parcel: usize, advisory: Advisory) {
        self.advisories.push((parcel, advisory));
    }

    /// Read a non-negative measure. Empty is 0; unreadable is 0 plus a
    /// recorded parse failure.
    pub(crate) fn read_measure(&mut self, parcel: Option<usize>, key: FieldKey, raw: &str) -> f64 {
        let raw = raw.trim();
        if raw.is_empty() {
            return 0.0;
        }
        match parse_number(raw) {
            Some(v) => non_negative(v),
            None => {
                self.recover(
                    parcel,
                    Recovery::ParseFailure {
                        field: key.to_string(),
                        value: raw.to_string(),
                    },
                );
                0.0
            }
        }
    }

    /// Read a whole currency amount.
    pub(crate) fn read_amount(&mut self, parcel: Option<usize>, key: FieldKey, raw: &str) -> i64 {
        let v = self.read_measure(parcel, key, raw).round();
        // saturating
        v as i64
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

impl FormSession {
    /// React to a user edit of `key` on parcel `parcel` (1-based).
    ///
    /// Form-level keys ignore `parcel`. Keys missing from the layout and a
    /// contract total in direct mode are no-ops. So is a fixture valuation
    /// while a contract total drives it. Derived outputs cannot be
    /// edited. A typed land area becomes the parcel's share with provenance
    /// `manual`.
    pub fn on_field_change(
        &mut self,
        parcel: usize,
        key: FieldKey,
        value: &str,
    ) -> Result<ChangeSet, EngineError> {
        if key.is_derived() {
            return Err(EngineError::ReadOnlyField(key));
        }
        if self.omitted.contains(&key) {
            tracing::trace!(%key, "field not in layout, ignoring change");
            return Ok(self.unchanged());
        }

        if key.is_form_level() {
            return Ok(self.on_form_field_change(key, value));
        }

        let slot = self.slot(parcel)?;
        if key == FieldKey::FixtureValuation
            && self.config.valuation_mode == ValuationMode::Derived
            && self.contract_total.is_some()
        {
            tracing::trace!(parcel, "fixture valuation follows the contract total, ignoring change");
            return Ok(self.unchanged());
        }
        let mut pass = Pass::new(Some((Some(parcel), key)), &self.omitted);
        pass.touched = true;
        let mut recompute = false;

        match key {
            FieldKey::LandArea => {
                let fraction = AreaFraction::parse(value);
                let share_text = value.split('/').next().unwrap_or_default().trim();
                if !share_text.is_empty() && parse_number(share_text).is_none() {
                    pass.recover(
                        Some(parcel),
                        Recovery::ParseFailure {
                            field: key.to_string(),
                            value: value.trim().to_string(),
                        },
                    );
                }
                let p = &mut self.parcels[slot];
                p.land_area_raw = value.trim().to_string();
                p.price_area = fraction.share;
                p.land_share_area = fraction.share;
                p.land_share_provenance = if fraction.share > 0.0 {
                    Provenance::Manual
                } else {
                    Provenance::Unavailable
                };
                pass.write(Some(parcel), FieldKey::PriceArea, format_area(Some(fraction.share)));
                pass.hint(Some(parcel), FieldKey::LandArea, None, None);
                recompute = true;
            }
            FieldKey::PriceArea => {
                let area = pass.read_measure(Some(parcel), key, value);
                self.parcels[slot].price_area = area;
                recompute = true;
            }
            FieldKey::UnitPrice => {
                let price = pass.read_measure(Some(parcel), key, value);
                self.parcels[slot].unit_price = price;
                recompute = true;
            }
            FieldKey::FixtureValuation => {
                let amount = pass.read_amount(Some(parcel), key, value);
                self.parcels[slot].fixture_input = amount;
                recompute = true;
            }
            FieldKey::Address => self.parcels[slot].address = value.trim().to_string(),
            FieldKey::Pnu => self.parcels[slot].pnu = value.trim().to_string(),
            FieldKey::Jibun => self.parcels[slot].jibun = value.trim().to_string(),
            FieldKey::Dong => self.parcels[slot].dong = optional_text(value),
            FieldKey::Ho => self.parcels[slot].ho = optional_text(value),
            FieldKey::JimokName => self.parcels[slot].jimok_name = optional_text(value),
            FieldKey::UsageAreas => {
                self.parcels[slot].usage_areas = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            FieldKey::FixtureContent => {
                self.parcels[slot].structure_description = value.trim().to_string()
            }
            FieldKey::FixtureType => {
                self.parcels[slot].fixture_type_description = value.trim().to_string()
            }
            FieldKey::LandValuation
            | FieldKey::RowTotal
            | FieldKey::ContractTotal
            | FieldKey::RightType
            | FieldKey::FixtureRightType
            | FieldKey::TotalArea
            | FieldKey::TotalLandAmount
            | FieldKey::TotalFixtureAmount
            | FieldKey::GrandTotal => {}
        }

        if recompute {
            self.recompute_parcel(slot, &mut pass);
            self.refresh_aggregate(&mut pass);
        }
        Ok(self.commit(pass))
    }

    fn on_form_field_change(&mut self, key: FieldKey, value: &str) -> ChangeSet {
        let mut pass = Pass::new(Some((None, key)), &self.omitted);
        pass.touched = true;

        match key {
            FieldKey::ContractTotal => {
                if self.config.valuation_mode != ValuationMode::Derived {
                    tracing::trace!("contract total has no effect in direct mode");
                    return self.unchanged();
                }
                let total = pass.read_amount(None, key, value);
                self.contract_total = (total > 0).then_some(total);
                for slot in 0..self.parcels.len() {
                    self.recompute_parcel(slot, &mut pass);
                }
                self.refresh_aggregate(&mut pass);
            }
            FieldKey::RightType => {
                let right = optional_text(value);
                self.right_type = right.clone();
                // Mirrors into the fixture rights field; never back
                self.fixture_right_type = right;
                pass.write(
                    None,
                    FieldKey::FixtureRightType,
                    self.fixture_right_type.clone().unwrap_or_default(),
                );
            }
            FieldKey::FixtureRightType => {
                self.fixture_right_type = optional_text(value);
            }
            _ => {}
        }

        self.commit(pass)
    }

    /// Recompute one parcel's valuation and queue its output writes.
    pub(crate) fn recompute_parcel(&mut self, slot: usize, pass: &mut Pass) {
        let mode = self.config.valuation_mode;
        let contract_total = self.contract_total;
        let parcel = &mut self.parcels[slot];
        let valuation = compute_parcel(parcel, mode, contract_total);
        parcel.valuation = valuation;
        let index = parcel.index;

        pass.write(
            Some(index),
            FieldKey::LandValuation,
            format_amount(Some(valuation.land_valuation)),
        );
        if mode == ValuationMode::Derived && contract_total.is_some() {
            pass.write(
                Some(index),
                FieldKey::FixtureValuation,
                format_amount(Some(valuation.fixture_valuation)),
            );
        }
        pass.write(Some(index), FieldKey::RowTotal, format_amount(Some(valuation.row_total)));

        if !pass.recomputed.contains(&index) {
            pass.recomputed.push(index);
        }
    }

    /// Recompute the form totals and queue their writes.
    pub(crate) fn refresh_aggregate(&mut self, pass: &mut Pass) {
        let aggregate = compute_aggregate(&self.parcels);
        self.aggregate = aggregate;

        pass.write(None, FieldKey::TotalArea, format_area(aggregate.total_area));
        pass.write(None, FieldKey::TotalLandAmount, format_amount(aggregate.total_land_amount));
        pass.write(
            None,
            FieldKey::TotalFixtureAmount,
            format_amount(aggregate.total_fixture_amount),
        );
        pass.write(None, FieldKey::GrandTotal, format_amount(aggregate.grand_total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FieldMap;
    use landpermit_config::FormConfig;

    fn single() -> FormSession {
        FormSession::new(FormConfig::default()).unwrap()
    }

    fn multi(n: usize) -> FormSession {
        FormSession::new(FormConfig::multi_parcel(n)).unwrap()
    }

    #[test]
    fn land_area_propagates_to_price_area() {
        let mut s = single();
        s.on_field_change(1, FieldKey::UnitPrice, "5000000").unwrap();
        let cs = s.on_field_change(1, FieldKey::LandArea, "35.9790/36645.30").unwrap();

        assert_eq!(cs.value(Some(1), FieldKey::PriceArea), Some("35.979"));
        assert_eq!(cs.value(Some(1), FieldKey::LandValuation), Some("179,895,000"));
        assert_eq!(cs.value(None, FieldKey::TotalLandAmount), Some("179,895,000"));
        assert_eq!(s.parcel(1).unwrap().price_area, 35.979);
        assert_eq!(cs.recomputed, vec![1]);
    }

    #[test]
    fn trigger_is_never_written_back() {
        let mut s = single();
        s.on_field_change(1, FieldKey::ContractTotal, "500000000").unwrap();
        let cs = s.on_field_change(1, FieldKey::FixtureValuation, "123").unwrap();
        assert!(cs.value(Some(1), FieldKey::FixtureValuation).is_none());
        for key in [FieldKey::LandArea, FieldKey::PriceArea, FieldKey::UnitPrice] {
            let cs = s.on_field_change(1, key, "10").unwrap();
            assert!(cs.value(Some(1), key).is_none(), "{key} written back");
        }
    }

    #[test]
    fn writes_are_unique_per_field() {
        let mut s = single();
        s.on_field_change(1, FieldKey::UnitPrice, "1000").unwrap();
        let cs = s.on_field_change(1, FieldKey::ContractTotal, "50000").unwrap();
        let mut seen = BTreeSet::new();
        for w in &cs.writes {
            assert!(seen.insert((w.parcel, w.key)), "duplicate write {:?}", w);
        }
    }

    #[test]
    fn derived_mode_contract_total() {
        let mut s = single();
        s.on_field_change(1, FieldKey::UnitPrice, "5000000").unwrap();
        s.on_field_change(1, FieldKey::PriceArea, "80").unwrap();
        let cs = s.on_field_change(1, FieldKey::ContractTotal, "500,000,000").unwrap();

        assert_eq!(cs.value(Some(1), FieldKey::FixtureValuation), Some("100,000,000"));
        assert_eq!(cs.value(Some(1), FieldKey::RowTotal), Some("500,000,000"));
        let v = s.parcel(1).unwrap().valuation;
        assert_eq!(v.fixture_valuation, 100_000_000);
    }

    #[test]
    fn derived_fixture_renders_blank_when_floored() {
        let mut s = single();
        s.on_field_change(1, FieldKey::UnitPrice, "5000000").unwrap();
        s.on_field_change(1, FieldKey::PriceArea, "200").unwrap();
        let cs = s.on_field_change(1, FieldKey::ContractTotal, "500000000").unwrap();
        assert_eq!(cs.value(Some(1), FieldKey::FixtureValuation), Some(""));
        assert_eq!(s.parcel(1).unwrap().valuation.fixture_valuation, 0);
    }

    #[test]
    fn fixture_edit_is_noop_while_contract_total_drives_it() {
        let mut s = single();
        s.on_field_change(1, FieldKey::ContractTotal, "1000").unwrap();
        let revision = s.revision();
        let cs = s.on_field_change(1, FieldKey::FixtureValuation, "700").unwrap();
        assert!(cs.is_empty());
        assert_eq!(s.revision(), revision);
        assert_eq!(s.parcel(1).unwrap().fixture_input, 0);
        assert_eq!(s.parcel(1).unwrap().valuation.fixture_valuation, 1000);

        // Without a contract total the typed amount counts again
        s.on_field_change(1, FieldKey::ContractTotal, "").unwrap();
        s.on_field_change(1, FieldKey::FixtureValuation, "700").unwrap();
        assert_eq!(s.parcel(1).unwrap().valuation.fixture_valuation, 700);
    }

    #[test]
    fn typed_land_area_is_a_manual_share() {
        let mut s = single();
        let cs = s.on_field_change(1, FieldKey::LandArea, "12/100").unwrap();
        let p = s.parcel(1).unwrap();
        assert_eq!(p.land_share_area, 12.0);
        assert_eq!(p.land_share_provenance, Provenance::Manual);
        let hint = cs.hint(Some(1), FieldKey::LandArea).unwrap();
        assert_eq!((hint.title.as_ref(), hint.placeholder.as_ref()), (None, None));

        s.on_field_change(1, FieldKey::LandArea, "").unwrap();
        let p = s.parcel(1).unwrap();
        assert_eq!(p.land_share_area, 0.0);
        assert_eq!(p.land_share_provenance, Provenance::Unavailable);
    }

    #[test]
    fn contract_total_is_noop_in_direct_mode() {
        let mut s = FormSession::new(FormConfig {
            parcel_count: 1,
            valuation_mode: ValuationMode::Direct,
            ..FormConfig::default()
        })
        .unwrap();
        let before = s.revision();
        let cs = s.on_field_change(1, FieldKey::ContractTotal, "1000").unwrap();
        assert!(cs.is_empty());
        assert_eq!(s.revision(), before);
        assert_eq!(s.contract_total(), None);
    }

    #[test]
    fn omitted_field_is_noop() {
        let mut s = multi(2);
        let cs = s.on_field_change(1, FieldKey::ContractTotal, "1000").unwrap();
        assert!(cs.is_empty());
    }

    #[test]
    fn right_type_mirrors_into_fixture_rights() {
        let mut s = single();
        let cs = s.on_field_change(1, FieldKey::RightType, "지상권").unwrap();
        assert_eq!(cs.value(None, FieldKey::FixtureRightType), Some("지상권"));
        assert_eq!(s.fixture_right_type(), Some("지상권"));
        assert!(cs.recomputed.is_empty());

        // last writer wins, no back-propagation
        let cs = s.on_field_change(1, FieldKey::FixtureRightType, "소유권").unwrap();
        assert!(cs.writes.is_empty());
        assert_eq!(s.right_type(), Some("지상권"));
        assert_eq!(s.fixture_right_type(), Some("소유권"));
    }

    #[test]
    fn derived_outputs_are_read_only() {
        let mut s = single();
        let err = s.on_field_change(1, FieldKey::GrandTotal, "1").unwrap_err();
        assert!(matches!(err, EngineError::ReadOnlyField(FieldKey::GrandTotal)));
    }

    #[test]
    fn parcel_out_of_range() {
        let mut s = multi(3);
        assert!(matches!(
            s.on_field_change(4, FieldKey::UnitPrice, "1"),
            Err(EngineError::ParcelOutOfRange { index: 4, count: 3 })
        ));
        assert!(s.on_field_change(0, FieldKey::UnitPrice, "1").is_err());
    }

    #[test]
    fn garbage_reads_as_zero_with_recovery() {
        let mut s = single();
        let cs = s.on_field_change(1, FieldKey::UnitPrice, "abc").unwrap();
        assert_eq!(s.parcel(1).unwrap().unit_price, 0.0);
        assert_eq!(
            cs.recoveries,
            vec![Recovery::ParseFailure {
                field: "unit_price".into(),
                value: "abc".into()
            }]
        );
        let cs = s.on_field_change(1, FieldKey::LandArea, "abc/100").unwrap();
        assert_eq!(cs.recoveries.len(), 1);
        assert_eq!(s.parcel(1).unwrap().price_area, 0.0);
    }

    #[test]
    fn empty_input_is_not_a_parse_failure() {
        let mut s = single();
        let cs = s.on_field_change(1, FieldKey::UnitPrice, "").unwrap();
        assert!(cs.recoveries.is_empty());
    }

    #[test]
    fn three_parcels_end_to_end() {
        let mut s = multi(3);
        let mut surface = FieldMap::new();
        for (i, (area, price)) in [("10", "1000"), ("0", "500"), ("5", "2000")].iter().enumerate() {
            let parcel = i + 1;
            s.on_field_change(parcel, FieldKey::LandArea, area).unwrap().write_to(&mut surface);
            s.on_field_change(parcel, FieldKey::UnitPrice, price).unwrap().write_to(&mut surface);
        }
        assert_eq!(s.aggregate().total_land_amount, Some(20_000));
        assert_eq!(s.parcel(2).unwrap().valuation.land_valuation, 0);
        assert_eq!(surface.get(Some(2), FieldKey::LandValuation), Some(""));
        assert_eq!(surface.get(None, FieldKey::TotalLandAmount), Some("20,000"));
        assert_eq!(surface.get(None, FieldKey::TotalFixtureAmount), Some(""));
        assert_eq!(surface.get(None, FieldKey::GrandTotal), Some("20,000"));
    }

    #[test]
    fn direct_mode_fixture_inputs_sum() {
        let mut s = multi(2);
        s.on_field_change(1, FieldKey::FixtureValuation, "1,000").unwrap();
        let cs = s.on_field_change(2, FieldKey::FixtureValuation, "2500").unwrap();
        assert_eq!(cs.value(None, FieldKey::TotalFixtureAmount), Some("3,500"));
        assert_eq!(cs.value(Some(2), FieldKey::RowTotal), Some("2,500"));
        assert_eq!(s.aggregate().grand_total, Some(3_500));
    }

    #[test]
    fn repeated_change_is_idempotent() {
        let mut s = multi(2);
        s.on_field_change(1, FieldKey::UnitPrice, "1000").unwrap();
        let a = s.on_field_change(1, FieldKey::LandArea, "12.5").unwrap();
        let agg_a = s.aggregate();
        let b = s.on_field_change(1, FieldKey::LandArea, "12.5").unwrap();
        assert_eq!(a.writes, b.writes);
        assert_eq!(agg_a, s.aggregate());
        assert!(b.revision > a.revision);
    }

    #[test]
    fn descriptive_fields_do_not_recompute() {
        let mut s = single();
        let cs = s.on_field_change(1, FieldKey::UsageAreas, "제2종일반주거지역, 방화지구").unwrap();
        assert!(cs.recomputed.is_empty());
        assert_eq!(s.parcel(1).unwrap().usage_areas.len(), 2);
        s.on_field_change(1, FieldKey::Dong, " ").unwrap();
        assert_eq!(s.parcel(1).unwrap().dong, None);
    }

    #[test]
    fn change_events_carry_revision() {
        let mut s = multi(1);
        let cs = s.on_field_change(1, FieldKey::UnitPrice, "10").unwrap();
        let events = s.events();
        let changed = events.fields_changed();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].revision, cs.revision);
        assert_eq!(events.recomputed()[0].parcel, 1);
    }
}
