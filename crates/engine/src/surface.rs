//! Presentation adapter.
//!
//! The engine never touches a rendered form directly. It produces
//! [`ChangeSet`](crate::sync::ChangeSet)s, and a `FormSurface` copies them
//! into whatever displays the form.

use std::collections::{BTreeMap, BTreeSet};

use landpermit_config::LayoutSettings;

use crate::error::EngineError;
use crate::field::FieldKey;

pub trait FormSurface {
    /// Write rendered text into a field. Returns `false` when this layout
    /// has no such field; the write is then dropped.
    fn write(&mut self, parcel: Option<usize>, key: FieldKey, value: &str) -> bool;

    /// Set a field's hover text and empty-field hint. Surfaces without
    /// either ignore it.
    fn describe(
        &mut self,
        _parcel: Option<usize>,
        _key: FieldKey,
        _title: Option<&str>,
        _placeholder: Option<&str>,
    ) {
    }
}

/// Hover text and placeholder currently set on a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescription {
    pub title: Option<String>,
    pub placeholder: Option<String>,
}

/// In-memory surface, honouring a layout's omitted fields.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    values: BTreeMap<(Option<usize>, FieldKey), String>,
    descriptions: BTreeMap<(Option<usize>, FieldKey), FieldDescription>,
    omitted: BTreeSet<FieldKey>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layout(layout: &LayoutSettings) -> Result<Self, EngineError> {
        let omitted = layout
            .omit
            .iter()
            .map(|k| k.parse::<FieldKey>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            omitted,
            ..Self::default()
        })
    }

    pub fn has_field(&self, key: FieldKey) -> bool {
        !self.omitted.contains(&key)
    }

    pub fn get(&self, parcel: Option<usize>, key: FieldKey) -> Option<&str> {
        self.values.get(&(parcel, key)).map(String::as_str)
    }

    pub fn description(&self, parcel: Option<usize>, key: FieldKey) -> Option<&FieldDescription> {
        self.descriptions.get(&(parcel, key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Option<usize>, FieldKey), &String)> {
        self.values.iter()
    }
}

impl FormSurface for FieldMap {
    fn write(&mut self, parcel: Option<usize>, key: FieldKey, value: &str) -> bool {
        if !self.has_field(key) {
            return false;
        }
        self.values.insert((parcel, key), value.to_string());
        true
    }

    fn describe(
        &mut self,
        parcel: Option<usize>,
        key: FieldKey,
        title: Option<&str>,
        placeholder: Option<&str>,
    ) {
        if !self.has_field(key) {
            return;
        }
        if title.is_none() && placeholder.is_none() {
            self.descriptions.remove(&(parcel, key));
            return;
        }
        self.descriptions.insert(
            (parcel, key),
            FieldDescription {
                title: title.map(String::from),
                placeholder: placeholder.map(String::from),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads() {
        let mut map = FieldMap::new();
        assert!(map.write(Some(1), FieldKey::LandValuation, "1,000"));
        assert!(map.write(None, FieldKey::GrandTotal, "1,000"));
        assert_eq!(map.get(Some(1), FieldKey::LandValuation), Some("1,000"));
        assert_eq!(map.get(Some(2), FieldKey::LandValuation), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn omitted_fields_are_dropped() {
        let layout = LayoutSettings {
            omit: vec!["contract_total".into()],
        };
        let mut map = FieldMap::from_layout(&layout).unwrap();
        assert!(!map.write(None, FieldKey::ContractTotal, "5"));
        assert!(map.is_empty());
    }

    #[test]
    fn descriptions_are_set_and_cleared() {
        let mut map = FieldMap::new();
        map.describe(Some(1), FieldKey::LandArea, Some("대지권면적"), None);
        assert_eq!(
            map.description(Some(1), FieldKey::LandArea).unwrap().title.as_deref(),
            Some("대지권면적")
        );
        map.describe(Some(1), FieldKey::LandArea, None, None);
        assert!(map.description(Some(1), FieldKey::LandArea).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn unknown_layout_key_is_an_error() {
        let layout = LayoutSettings {
            omit: vec!["price1_total".into()],
        };
        assert!(matches!(
            FieldMap::from_layout(&layout),
            Err(EngineError::UnknownField(_))
        ));
    }
}
