//! `landpermit compute` - evaluate a saved form session.
//!
//! A session file replays what happened on the form: lookup payloads per
//! parcel, in the order address → land → unit, then manual edits, then the
//! form-level fields.
//!
//! ```json
//! {
//!   "contract_total": "500,000,000",
//!   "right_type": "소유권",
//!   "parcels": [{
//!     "address": { "jibun_address": "...", "pnu": "1168010100107360001" },
//!     "land": { "price": { "price": 5000000 } },
//!     "unit": { "dong": "101", "ho": "1203", "result": { "source": "direct", "landShare": "35.979" } },
//!     "edits": [{ "field": "unit_price", "value": "5,100,000" }]
//!   }]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use landpermit_config::FormConfig;
use landpermit_engine::display::{format_amount, format_area};
use landpermit_engine::report::ValuationReport;
use landpermit_engine::{FieldKey, FormSession, LandBundle};
use landpermit_recon::{AddressSelection, UnitLookup};

use crate::exit_codes::{EXIT_SESSION_FIELD, EXIT_SESSION_IO, EXIT_SESSION_PARSE};
use crate::CliError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionFile {
    pub parcels: Vec<ParcelEntry>,
    pub contract_total: Option<serde_json::Value>,
    pub right_type: Option<String>,
    pub fixture_right_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParcelEntry {
    pub address: Option<AddressSelection>,
    pub land: Option<LandBundle>,
    pub unit: Option<UnitEntry>,
    pub edits: Vec<FieldEdit>,
}

#[derive(Debug, Deserialize)]
pub struct UnitEntry {
    #[serde(default)]
    pub dong: Option<String>,
    pub ho: String,
    pub result: UnitLookup,
}

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: FieldKey,
    pub value: serde_json::Value,
}

/// Field text for a JSON value: strings as-is, anything else rendered.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn load_session_file(path: &Path) -> Result<SessionFile, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_SESSION_IO, format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::new(EXIT_SESSION_PARSE, format!("{}: {e}", path.display())))
}

/// Replay a session file onto a fresh form.
pub fn replay(config: FormConfig, file: SessionFile) -> Result<FormSession, CliError> {
    if file.parcels.len() > config.parcel_count {
        return Err(CliError::new(
            EXIT_SESSION_FIELD,
            format!(
                "session has {} parcel(s) but the form has {}",
                file.parcels.len(),
                config.parcel_count
            ),
        )
        .with_hint("raise parcel_count in the form config"));
    }

    let mut session = FormSession::new(config).map_err(CliError::engine)?;

    for (i, entry) in file.parcels.into_iter().enumerate() {
        let parcel = i + 1;

        if let Some(address) = entry.address {
            let generation = session.begin_lookup(parcel).map_err(CliError::engine)?;
            session
                .apply_address(parcel, generation, address)
                .map_err(CliError::engine)?;
        }
        if let Some(land) = entry.land {
            let generation = session.begin_lookup(parcel).map_err(CliError::engine)?;
            session
                .apply_land_lookup(parcel, generation, land)
                .map_err(CliError::engine)?;
        }
        if let Some(unit) = entry.unit {
            let generation = session.begin_lookup(parcel).map_err(CliError::engine)?;
            session
                .apply_unit_lookup(parcel, generation, unit.dong.as_deref(), &unit.ho, unit.result)
                .map_err(CliError::engine)?;
        }
        for edit in entry.edits {
            session
                .on_field_change(parcel, edit.field, &value_text(&edit.value))
                .map_err(CliError::engine)?;
        }
    }

    let form_fields = [
        (FieldKey::ContractTotal, file.contract_total.as_ref().map(value_text)),
        (FieldKey::RightType, file.right_type),
        (FieldKey::FixtureRightType, file.fixture_right_type),
    ];
    for (key, value) in form_fields {
        if let Some(value) = value {
            session
                .on_field_change(1, key, &value)
                .map_err(CliError::engine)?;
        }
    }

    session.recompute_all();
    Ok(session)
}

pub fn cmd_compute(
    session_path: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = match &config_path {
        Some(path) => FormConfig::load(path).map_err(CliError::config)?,
        None => FormConfig::load_or_default(),
    };
    let file = load_session_file(&session_path)?;
    let session = replay(config, file)?;

    let report = ValuationReport::from_session(&session);
    let rendered = report
        .to_json_pretty()
        .map_err(|e| CliError::other(format!("cannot serialize report: {e}")))?;

    if let Some(path) = &output {
        std::fs::write(path, format!("{rendered}\n")).map_err(|e| {
            CliError::new(EXIT_SESSION_IO, format!("cannot write {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "report written");
    }

    if json {
        println!("{rendered}");
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &ValuationReport) {
    println!(
        "{:<6} {:>14} {:>14} {:>16} {:>16} {:>16}  {}",
        "parcel", "area(㎡)", "unit price", "land", "fixture", "total", "share source"
    );
    for p in &report.parcels {
        let v = &p.valuation;
        println!(
            "{:<6} {:>14} {:>14} {:>16} {:>16} {:>16}  {}",
            p.index,
            format_area(Some(v.effective_area)),
            format_area(Some(p.unit_price)),
            format_amount(Some(v.land_valuation)),
            format_amount(Some(v.fixture_valuation)),
            format_amount(Some(v.row_total)),
            p.land_share_provenance,
        );
    }

    let agg = &report.aggregate;
    println!(
        "{:<6} {:>14} {:>14} {:>16} {:>16} {:>16}",
        "total",
        format_area(agg.total_area),
        "",
        format_amount(agg.total_land_amount),
        format_amount(agg.total_fixture_amount),
        format_amount(agg.grand_total),
    );

    if !report.recoveries.is_empty() {
        println!();
        println!("notes:");
        for note in &report.recoveries {
            match note.parcel {
                Some(parcel) => println!("  parcel {parcel}: {}", note.recovery),
                None => println!("  form: {}", note.recovery),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SessionFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn replays_lookups_then_edits() {
        let file = parse(
            r#"{
                "contract_total": 500000000,
                "parcels": [{
                    "land": { "price": { "price": "5000000" } },
                    "unit": { "dong": "101", "ho": "1203",
                              "result": { "source": "direct", "landShare": "35.979", "landArea": 36645.3 } }
                }]
            }"#,
        );
        let session = replay(FormConfig::default(), file).unwrap();
        let p = session.parcel(1).unwrap();
        assert_eq!(p.valuation.land_valuation, 179_895_000);
        assert_eq!(p.valuation.fixture_valuation, 320_105_000);
        assert_eq!(session.aggregate().grand_total, Some(500_000_000));
    }

    #[test]
    fn edits_override_lookups() {
        let file = parse(
            r#"{ "parcels": [{
                "land": { "price": { "price": 1000 } },
                "edits": [ { "field": "land_area", "value": "10" },
                           { "field": "unit_price", "value": 2000 } ]
            }] }"#,
        );
        let session = replay(FormConfig::default(), file).unwrap();
        assert_eq!(session.aggregate().total_land_amount, Some(20_000));
    }

    #[test]
    fn too_many_parcels() {
        let file = parse(r#"{ "parcels": [{}, {}] }"#);
        let err = replay(FormConfig::default(), file).unwrap_err();
        assert_eq!(err.code, EXIT_SESSION_FIELD);
        assert!(err.hint.is_some());
    }

    #[test]
    fn derived_field_edit_is_rejected() {
        let file = parse(r#"{ "parcels": [{ "edits": [{ "field": "row_total", "value": "1" }] }] }"#);
        let err = replay(FormConfig::default(), file).unwrap_err();
        assert_eq!(err.code, EXIT_SESSION_FIELD);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<SessionFile>(r#"{ "parcel": [] }"#).is_err());
    }
}
