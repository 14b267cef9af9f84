//! Event types for form change notifications.
//!
//! These let the presentation layer react to changes without re-reading the
//! whole form. Tests also use them to check that every change is tagged with
//! exactly one revision.

use landpermit_recon::{Advisory, LookupKind, Recovery};

use crate::field::FieldKey;
use crate::form::FormAggregate;
use crate::generation::Generation;
use crate::valuation::ParcelValuation;

/// Events emitted by a form session.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Fields were written as a result of one change.
    /// Always tagged with the revision that produced the writes.
    FieldsChanged(FieldsChangedEvent),

    /// A parcel and the aggregate were recomputed.
    Recomputed(RecomputedEvent),

    /// A lookup result arrived after a newer one had been applied.
    LookupRejected(LookupRejectedEvent),

    /// The user needs to be told something about a reconciled share.
    AdvisoryRaised(AdvisoryEvent),

    /// A malformed input or lookup was absorbed.
    Recovered(RecoveredEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldsChangedEvent {
    /// Revision that produced these writes.
    /// INVARIANT: All fields in this event belong to this single revision.
    pub revision: u64,
    /// `(parcel, key)`; parcel is `None` for form-level fields.
    pub fields: Vec<(Option<usize>, FieldKey)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecomputedEvent {
    pub revision: u64,
    pub parcel: usize,
    pub valuation: ParcelValuation,
    pub aggregate: FormAggregate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupRejectedEvent {
    pub parcel: usize,
    pub lookup: LookupKind,
    /// Token the rejected result carried.
    pub generation: Generation,
    /// Newer token already applied.
    pub superseded_by: Generation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryEvent {
    pub revision: u64,
    pub parcel: usize,
    pub advisory: Advisory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredEvent {
    pub parcel: Option<usize>,
    pub recovery: Recovery,
}

/// Simple event collector.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<FormEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: FormEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[FormEvent] {
        &self.events
    }

    /// Hand over everything collected so far.
    pub fn drain(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only FieldsChanged events.
    pub fn fields_changed(&self) -> Vec<&FieldsChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FormEvent::FieldsChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Recomputed events.
    pub fn recomputed(&self) -> Vec<&RecomputedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FormEvent::Recomputed(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Filter to only LookupRejected events.
    pub fn rejected(&self) -> Vec<&LookupRejectedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FormEvent::LookupRejected(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Filter to only AdvisoryRaised events.
    pub fn advisories(&self) -> Vec<&AdvisoryEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FormEvent::AdvisoryRaised(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Recovered events.
    pub fn recoveries(&self) -> Vec<&RecoveredEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FormEvent::Recovered(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}
