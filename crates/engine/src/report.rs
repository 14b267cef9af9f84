//! Serializable snapshot of a computed form.

use chrono::Utc;
use serde::Serialize;

use crate::form::{FormAggregate, Parcel};
use crate::session::{FormSession, RecoveryNote};
use crate::ValuationMode;

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub engine_version: &'static str,
    /// RFC 3339, UTC.
    pub computed_at: String,
    pub valuation_mode: ValuationMode,
    pub parcel_count: usize,
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuationReport {
    pub meta: ReportMeta,
    pub parcels: Vec<Parcel>,
    pub aggregate: FormAggregate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_total: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recoveries: Vec<RecoveryNote>,
}

impl ValuationReport {
    pub fn from_session(session: &FormSession) -> Self {
        Self {
            meta: ReportMeta {
                engine_version: env!("CARGO_PKG_VERSION"),
                computed_at: Utc::now().to_rfc3339(),
                valuation_mode: session.mode(),
                parcel_count: session.parcel_count(),
                revision: session.revision(),
            },
            parcels: session.parcels().to_vec(),
            aggregate: session.aggregate(),
            contract_total: session.contract_total(),
            recoveries: session.notes().to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKey;
    use landpermit_config::FormConfig;

    #[test]
    fn report_carries_totals_and_recoveries() {
        let mut session = FormSession::new(FormConfig::multi_parcel(2)).unwrap();
        session.on_field_change(1, FieldKey::LandArea, "10").unwrap();
        session.on_field_change(1, FieldKey::UnitPrice, "1000").unwrap();
        session.on_field_change(2, FieldKey::UnitPrice, "n/a").unwrap();

        let report = ValuationReport::from_session(&session);
        assert_eq!(report.aggregate.total_land_amount, Some(10_000));
        assert_eq!(report.recoveries.len(), 1);

        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["meta"]["valuation_mode"], "direct");
        assert_eq!(json["parcels"][0]["valuation"]["land_valuation"], 10_000);
        assert_eq!(json["aggregate"]["total_fixture_amount"], serde_json::Value::Null);
        assert_eq!(json["recoveries"][0]["kind"], "parse_failure");
        assert_eq!(json["recoveries"][0]["parcel"], 2);
        assert!(json.get("contract_total").is_none());
    }
}
