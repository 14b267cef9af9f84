use landpermit_recon::measure::round4;
use landpermit_recon::{
    reconcile_parcel_area, Advisory, Lookup, Provenance, Recovery, UnitLookup,
};

fn reconcile_json(payload: &str) -> (landpermit_recon::ReconciledArea, Option<Recovery>) {
    let unit: UnitLookup = serde_json::from_str(payload).unwrap();
    match unit.into_usable() {
        Ok(unit) => {
            let (direct, basis) = unit.sources();
            (reconcile_parcel_area(direct.as_ref(), basis.as_ref()), None)
        }
        Err(recovery) => (reconcile_parcel_area(None, None), Some(recovery)),
    }
}

// -------------------------------------------------------------------------
// Building-unit payloads end to end
// -------------------------------------------------------------------------

#[test]
fn direct_registry_answer() {
    let (area, recovery) = reconcile_json(
        r#"{"source":"vworld","landShare":"35.979","landArea":"36645.3","exclusiveArea":"84.97","totalArea":"120.1"}"#,
    );
    assert!(recovery.is_none());
    assert_eq!(area.provenance, Provenance::Direct);
    assert_eq!(area.land_share_area, 35.979);
    assert_eq!(area.land_area_total, Some(36645.3));
    assert_eq!(area.advisory, Advisory::None);
}

#[test]
fn direct_source_without_share_falls_back_to_estimate() {
    let (area, _) = reconcile_json(
        r#"{"source":"direct","landShare":"","exclusiveArea":59.97,"totalArea":120.5,"landArea":300}"#,
    );
    assert_eq!(area.provenance, Provenance::Estimated);
    assert_eq!(area.land_share_area, round4(59.97 / 120.5 * 300.0));
    assert_eq!(area.advisory, Advisory::EstimatedShare);
}

#[test]
fn building_registry_proxy() {
    let (area, _) = reconcile_json(r#"{"source":"estimated","exclusiveArea":"84.97"}"#);
    assert_eq!(area.provenance, Provenance::Estimated);
    assert_eq!(area.land_share_area, 84.97);
    assert_eq!(area.land_area_total, None);
    assert_eq!(area.advisory, Advisory::ExclusiveAreaProxy);
}

#[test]
fn land_area_only_is_unavailable() {
    let (area, _) = reconcile_json(r#"{"source":"estimated","landArea":"300"}"#);
    assert_eq!(area.provenance, Provenance::Unavailable);
    assert_eq!(area.land_share_area, 0.0);
    assert_eq!(
        area.advisory,
        Advisory::ManualEntryRequired {
            land_area_total: Some(300.0)
        }
    );
    assert!(area.advisory.message().unwrap().contains("300"));
}

#[test]
fn error_payload_is_absorbed() {
    let (area, recovery) = reconcile_json(r#"{"error":"전유부 조회 실패"}"#);
    assert_eq!(area.provenance, Provenance::Unavailable);
    assert!(matches!(recovery, Some(Recovery::LookupError { .. })));
}

#[test]
fn negative_registry_values_never_leak() {
    let (area, _) = reconcile_json(r#"{"source":"direct","landShare":"-4.2"}"#);
    assert_eq!(area.provenance, Provenance::Direct);
    assert_eq!(area.land_share_area, 0.0);
}
