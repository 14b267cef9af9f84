//! Form session: the live form model plus everything that mutates it.
//!
//! User edits go through [`FormSession::on_field_change`](crate::sync).
//! Lookup results go through the `apply_*` methods below, each guarded by
//! the per-parcel generation token obtained from [`FormSession::begin_lookup`]
//! and judged against earlier results of the same lookup kind.

use std::collections::BTreeSet;

use landpermit_config::FormConfig;
use landpermit_recon::measure::non_negative;
use landpermit_recon::registry::jimok_name;
use landpermit_recon::{
    reconcile_parcel_area, AddressSelection, LandInfoLookup, Lookup, LookupKind, Pnu, PriceLookup,
    Provenance, Recovery, UnitLookup, UsageLookup,
};
use serde::{Deserialize, Serialize};

use crate::describe::{fixture_content, AreaFieldDisplay};
use crate::display::format_area;
use crate::error::EngineError;
use crate::events::{
    AdvisoryEvent, EventCollector, FieldsChangedEvent, FormEvent, LookupRejectedEvent,
    RecomputedEvent, RecoveredEvent,
};
use crate::field::FieldKey;
use crate::form::{FormAggregate, Parcel};
use crate::generation::{Generation, GenerationGuard};
use crate::sync::{ChangeSet, Pass};
use crate::ValuationMode;

/// Land attribute, price and zoning results for one parcel, applied together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LandBundle {
    pub info: Option<LandInfoLookup>,
    pub price: Option<PriceLookup>,
    pub usage: Option<UsageLookup>,
}

/// Result of handing a lookup payload to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Accepted(ChangeSet),
    /// A newer lookup of the same kind for the same parcel was applied
    /// first; nothing changed.
    Stale {
        generation: Generation,
        superseded_by: Generation,
    },
}

impl Applied {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub fn change_set(&self) -> Option<&ChangeSet> {
        match self {
            Self::Accepted(cs) => Some(cs),
            Self::Stale { .. } => None,
        }
    }
}

/// A recovery recorded against the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryNote {
    pub revision: u64,
    pub parcel: Option<usize>,
    #[serde(flatten)]
    pub recovery: Recovery,
}

#[derive(Debug)]
pub struct FormSession {
    pub(crate) config: FormConfig,
    pub(crate) parcels: Vec<Parcel>,
    pub(crate) contract_total: Option<i64>,
    pub(crate) right_type: Option<String>,
    pub(crate) fixture_right_type: Option<String>,
    pub(crate) aggregate: FormAggregate,
    pub(crate) omitted: BTreeSet<FieldKey>,
    guard: GenerationGuard,
    revision: u64,
    events: EventCollector,
    notes: Vec<RecoveryNote>,
}

impl FormSession {
    pub fn new(config: FormConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let omitted = config
            .layout
            .omit
            .iter()
            .map(|k| k.parse::<FieldKey>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        let parcels = (1..=config.parcel_count).map(Parcel::new).collect();
        tracing::debug!(
            parcels = config.parcel_count,
            mode = %config.valuation_mode,
            omitted = omitted.len(),
            "form session opened"
        );

        Ok(Self {
            guard: GenerationGuard::new(config.parcel_count),
            config,
            parcels,
            contract_total: None,
            right_type: None,
            fixture_right_type: None,
            aggregate: FormAggregate::default(),
            omitted,
            revision: 0,
            events: EventCollector::new(),
            notes: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn mode(&self) -> ValuationMode {
        self.config.valuation_mode
    }

    pub fn parcel_count(&self) -> usize {
        self.parcels.len()
    }

    /// Parcel by 1-based index.
    pub fn parcel(&self, index: usize) -> Result<&Parcel, EngineError> {
        let slot = self.slot(index)?;
        Ok(&self.parcels[slot])
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn aggregate(&self) -> FormAggregate {
        self.aggregate
    }

    pub fn contract_total(&self) -> Option<i64> {
        self.contract_total
    }

    pub fn right_type(&self) -> Option<&str> {
        self.right_type.as_deref()
    }

    pub fn fixture_right_type(&self) -> Option<&str> {
        self.fixture_right_type.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn events(&self) -> &EventCollector {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<FormEvent> {
        self.events.drain()
    }

    /// Every recovery recorded since the session opened.
    pub fn notes(&self) -> &[RecoveryNote] {
        &self.notes
    }

    pub(crate) fn slot(&self, index: usize) -> Result<usize, EngineError> {
        if index == 0 || index > self.parcels.len() {
            return Err(EngineError::ParcelOutOfRange {
                index,
                count: self.parcels.len(),
            });
        }
        Ok(index - 1)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Token for a lookup about to be issued for `parcel`.
    pub fn begin_lookup(&mut self, parcel: usize) -> Result<Generation, EngineError> {
        let slot = self.slot(parcel)?;
        let generation = self.guard.issue(slot);
        tracing::trace!(parcel, %generation, "lookup issued");
        Ok(generation)
    }

    /// Apply a picked address: address, PNU and lot number.
    pub fn apply_address(
        &mut self,
        parcel: usize,
        generation: Generation,
        selection: AddressSelection,
    ) -> Result<Applied, EngineError> {
        let slot = self.slot(parcel)?;
        if let Some(stale) = self.admit(slot, generation, LookupKind::Address) {
            return Ok(stale);
        }

        let mut pass = Pass::new(None, &self.omitted);
        match selection.into_usable() {
            Err(recovery) => pass.recover(Some(parcel), recovery),
            Ok(selection) => {
                let p = &mut self.parcels[slot];
                p.address = selection.display_address().unwrap_or_default().to_string();
                p.pnu = selection.pnu.clone().unwrap_or_default();
                p.jibun = match selection.jibun.clone() {
                    Some(jibun) => jibun,
                    None => Pnu::parse(&p.pnu).map(|pnu| pnu.jibun()).unwrap_or_default(),
                };
                pass.write(Some(parcel), FieldKey::Address, p.address.clone());
                pass.write(Some(parcel), FieldKey::Pnu, p.pnu.clone());
                pass.write(Some(parcel), FieldKey::Jibun, p.jibun.clone());
            }
        }
        Ok(Applied::Accepted(self.commit(pass)))
    }

    /// Apply land attribute, price and zoning results for `parcel`.
    ///
    /// Each part is independent: an error payload in one leaves the fields
    /// of the others intact. The lot area is skipped when a unit lookup
    /// issued after this one has already set the share.
    pub fn apply_land_lookup(
        &mut self,
        parcel: usize,
        generation: Generation,
        bundle: LandBundle,
    ) -> Result<Applied, EngineError> {
        let slot = self.slot(parcel)?;
        if let Some(stale) = self.admit(slot, generation, LookupKind::LandInfo) {
            return Ok(stale);
        }

        // A share set by a later unit lookup outranks this lot area
        let unit_share = self
            .guard
            .newer_applied(slot, LookupKind::BuildingUnit, generation)
            .filter(|_| self.parcels[slot].land_share_provenance != Provenance::Unavailable);
        let mut pass = Pass::new(None, &self.omitted);
        let mut recompute = false;

        if let Some(info) = bundle.info {
            match info.into_usable() {
                Err(recovery) => pass.recover(Some(parcel), recovery),
                Ok(info) => {
                    let p = &mut self.parcels[slot];
                    if let Some(code) = info.jimok_name.as_deref() {
                        let name = jimok_name(code).to_string();
                        p.jimok_name = Some(name.clone());
                        pass.write(Some(parcel), FieldKey::JimokName, name);
                    }
                    let area = info.area.map(non_negative).filter(|a| *a > 0.0);
                    match (area, unit_share) {
                        (Some(_), Some(newer)) => tracing::debug!(
                            parcel,
                            %generation,
                            %newer,
                            "land area superseded by a newer unit share"
                        ),
                        (Some(area), None) => {
                            p.land_area_raw = format_area(Some(area));
                            p.price_area = area;
                            pass.write(Some(parcel), FieldKey::LandArea, p.land_area_raw.clone());
                            pass.write(Some(parcel), FieldKey::PriceArea, p.land_area_raw.clone());
                            recompute = true;
                        }
                        (None, _) => {}
                    }
                }
            }
        }

        if let Some(price) = bundle.price {
            match price.into_usable() {
                Err(recovery) => pass.recover(Some(parcel), recovery),
                Ok(price) => {
                    if let Some(unit_price) = price.price.map(non_negative) {
                        self.parcels[slot].unit_price = unit_price;
                        pass.write(Some(parcel), FieldKey::UnitPrice, format!("{unit_price}"));
                        recompute = true;
                    }
                }
            }
        }

        if let Some(usage) = bundle.usage {
            match usage.into_usable() {
                Err(recovery) => pass.recover(Some(parcel), recovery),
                Ok(usage) => {
                    let p = &mut self.parcels[slot];
                    p.usage_areas = usage.zoning().areas;
                    pass.write(Some(parcel), FieldKey::UsageAreas, p.usage_areas.join(", "));
                }
            }
        }

        if recompute {
            self.recompute_parcel(slot, &mut pass);
            self.refresh_aggregate(&mut pass);
        }
        Ok(Applied::Accepted(self.commit(pass)))
    }

    /// Apply a building-unit result for dong/ho of `parcel`.
    ///
    /// Reconciles the land share, writes it into the land-area field, copies
    /// a positive share into the price table and refreshes the fixture
    /// description. With no usable source the share becomes 0 and the land
    /// area field is left for manual entry.
    pub fn apply_unit_lookup(
        &mut self,
        parcel: usize,
        generation: Generation,
        dong: Option<&str>,
        ho: &str,
        unit: UnitLookup,
    ) -> Result<Applied, EngineError> {
        let slot = self.slot(parcel)?;
        if let Some(stale) = self.admit(slot, generation, LookupKind::BuildingUnit) {
            return Ok(stale);
        }

        let mut pass = Pass::new(None, &self.omitted);
        let usable = match unit.into_usable() {
            Ok(unit) => Some(unit),
            Err(recovery) => {
                pass.recover(Some(parcel), recovery);
                None
            }
        };

        let (direct, basis) = usable
            .as_ref()
            .map(UnitLookup::sources)
            .unwrap_or((None, None));
        let area = reconcile_parcel_area(direct.as_ref(), basis.as_ref());
        if !area.is_available() {
            pass.recover(Some(parcel), Recovery::MissingSource);
        }
        let display = AreaFieldDisplay::from_reconciled(&area);
        pass.hint(
            Some(parcel),
            FieldKey::LandArea,
            display.title.clone(),
            display.placeholder.clone(),
        );

        let dong = dong.map(str::trim).filter(|d| !d.is_empty());
        let ho = ho.trim();
        let p = &mut self.parcels[slot];
        p.dong = dong.map(String::from);
        p.ho = (!ho.is_empty()).then(|| ho.to_string());
        pass.write(Some(parcel), FieldKey::Dong, dong.unwrap_or_default().to_string());
        pass.write(Some(parcel), FieldKey::Ho, ho.to_string());

        p.land_share_area = area.land_share_area;
        p.land_share_provenance = area.provenance;
        if let Some(value) = display.value {
            p.land_area_raw = value.clone();
            pass.write(Some(parcel), FieldKey::LandArea, value);
        }
        if area.land_share_area > 0.0 {
            p.price_area = area.land_share_area;
            pass.write(Some(parcel), FieldKey::PriceArea, format_area(Some(area.land_share_area)));
        }

        if let Some(unit) = &usable {
            let content = fixture_content(
                dong,
                p.ho.as_deref(),
                unit.structure.as_deref(),
                unit.exclusive_area,
                &self.config.fixture.default_structure,
            );
            p.structure_description = content.clone();
            pass.write(Some(parcel), FieldKey::FixtureContent, content);
        }

        tracing::debug!(
            parcel,
            share = area.land_share_area,
            provenance = %area.provenance,
            "unit lookup applied"
        );
        if let Some(message) = area.advisory.message() {
            tracing::info!(parcel, "{message}");
            pass.advise(parcel, area.advisory);
        }

        self.recompute_parcel(slot, &mut pass);
        self.refresh_aggregate(&mut pass);
        Ok(Applied::Accepted(self.commit(pass)))
    }

    /// Recompute every parcel and the totals, writing all outputs.
    pub fn recompute_all(&mut self) -> ChangeSet {
        let mut pass = Pass::new(None, &self.omitted);
        for slot in 0..self.parcels.len() {
            self.recompute_parcel(slot, &mut pass);
        }
        self.refresh_aggregate(&mut pass);
        self.commit(pass)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn admit(&mut self, slot: usize, generation: Generation, lookup: LookupKind) -> Option<Applied> {
        match self.guard.admit(slot, lookup, generation) {
            Ok(()) => None,
            Err(superseded_by) => {
                let parcel = slot + 1;
                tracing::warn!(
                    parcel,
                    %lookup,
                    %generation,
                    %superseded_by,
                    "discarding stale lookup result"
                );
                self.events.push(FormEvent::LookupRejected(LookupRejectedEvent {
                    parcel,
                    lookup,
                    generation,
                    superseded_by,
                }));
                Some(Applied::Stale {
                    generation,
                    superseded_by,
                })
            }
        }
    }

    pub(crate) fn unchanged(&self) -> ChangeSet {
        ChangeSet {
            revision: self.revision,
            ..ChangeSet::default()
        }
    }

    /// Close a pass: bump the revision once, emit events, keep recoveries.
    pub(crate) fn commit(&mut self, pass: Pass) -> ChangeSet {
        if pass.touched || !pass.recoveries.is_empty() {
            self.revision += 1;
        }
        let revision = self.revision;

        if !pass.writes.is_empty() {
            self.events.push(FormEvent::FieldsChanged(FieldsChangedEvent {
                revision,
                fields: pass.writes.iter().map(|w| (w.parcel, w.key)).collect(),
            }));
        }
        for &index in &pass.recomputed {
            self.events.push(FormEvent::Recomputed(RecomputedEvent {
                revision,
                parcel: index,
                valuation: self.parcels[index - 1].valuation,
                aggregate: self.aggregate,
            }));
        }
        for &(parcel, advisory) in &pass.advisories {
            self.events.push(FormEvent::AdvisoryRaised(AdvisoryEvent {
                revision,
                parcel,
                advisory,
            }));
        }

        let mut recoveries = Vec::with_capacity(pass.recoveries.len());
        for (parcel, recovery) in pass.recoveries {
            self.events.push(FormEvent::Recovered(RecoveredEvent {
                parcel,
                recovery: recovery.clone(),
            }));
            self.notes.push(RecoveryNote {
                revision,
                parcel,
                recovery: recovery.clone(),
            });
            recoveries.push(recovery);
        }

        ChangeSet {
            revision,
            writes: pass.writes,
            recomputed: pass.recomputed,
            recoveries,
            advisories: pass.advisories.into_iter().map(|(_, a)| a).collect(),
            hints: pass.hints,
        }
    }
}
