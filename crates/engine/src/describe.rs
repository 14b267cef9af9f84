//! Text written into descriptive fields after a building-unit lookup.

use landpermit_recon::{Advisory, Provenance, ReconciledArea};
use serde::Serialize;

/// What the land-area field should show for a reconciled share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaFieldDisplay {
    /// New field text; `None` leaves the field as it is.
    pub value: Option<String>,
    /// Hover text explaining where the value came from.
    pub title: Option<String>,
    /// Hint shown in an empty field.
    pub placeholder: Option<String>,
}

impl AreaFieldDisplay {
    pub fn from_reconciled(area: &ReconciledArea) -> Self {
        match (area.provenance, area.advisory) {
            (Provenance::Direct | Provenance::Manual, _) => {
                let share = format!("{}", area.land_share_area);
                let value = match area.land_area_total {
                    Some(total) => format!("{share}/{total}"),
                    None => share,
                };
                Self {
                    value: Some(value),
                    title: Some(if area.land_area_total.is_some() {
                        "대지권면적/대지면적".to_string()
                    } else {
                        "대지권면적".to_string()
                    }),
                    placeholder: None,
                }
            }
            (Provenance::Estimated, Advisory::EstimatedShare) => {
                let share = format!("{:.4}", area.land_share_area);
                let value = match area.land_area_total {
                    Some(total) => format!("{share}/{total:.2}"),
                    None => share,
                };
                Self {
                    value: Some(value),
                    title: area.advisory.message(),
                    placeholder: None,
                }
            }
            (Provenance::Estimated, _) => Self {
                value: Some(format!("{:.2}", area.land_share_area)),
                title: area.advisory.message(),
                placeholder: None,
            },
            (Provenance::Unavailable, _) => Self {
                value: None,
                title: None,
                placeholder: area
                    .land_area_total
                    .map(|total| format!("대지권비율 입력 (대지면적: {total}㎡)")),
            },
        }
    }
}

/// Fixture content line: `"{dong}동 {ho}호 ({structure}, 전용면적 {area}㎡)"`.
///
/// Missing parts are left out; the structure falls back to `default_structure`.
pub fn fixture_content(
    dong: Option<&str>,
    ho: Option<&str>,
    structure: Option<&str>,
    exclusive_area: Option<f64>,
    default_structure: &str,
) -> String {
    let mut content = String::new();
    if let Some(dong) = dong.filter(|d| !d.is_empty()) {
        content.push_str(&format!("{dong}동 "));
    }
    if let Some(ho) = ho.filter(|h| !h.is_empty()) {
        content.push_str(&format!("{ho}호"));
    }

    let structure = structure.filter(|s| !s.is_empty()).unwrap_or(default_structure);
    let area = exclusive_area.map(|a| format!("전용면적 {a:.2}㎡"));
    match (structure.is_empty(), area) {
        (true, None) => {}
        (true, Some(area)) => content.push_str(&format!(" ({area})")),
        (false, None) => content.push_str(&format!(" ({structure})")),
        (false, Some(area)) => content.push_str(&format!(" ({structure}, {area})")),
    }
    content.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use landpermit_recon::{reconcile_parcel_area, DirectAreaSource, EstimatedAreaSource};

    #[test]
    fn direct_share_with_total() {
        let direct = DirectAreaSource::new(Some(35.979), Some(36645.3)).unwrap();
        let d = AreaFieldDisplay::from_reconciled(&reconcile_parcel_area(Some(&direct), None));
        assert_eq!(d.value.as_deref(), Some("35.979/36645.3"));
        assert_eq!(d.title.as_deref(), Some("대지권면적/대지면적"));
    }

    #[test]
    fn estimated_share_keeps_four_decimals() {
        let basis = EstimatedAreaSource {
            exclusive_area: Some(59.97),
            total_area: Some(120.5),
            land_area: Some(300.0),
        };
        let d = AreaFieldDisplay::from_reconciled(&reconcile_parcel_area(None, Some(&basis)));
        assert_eq!(d.value.as_deref(), Some("149.3029/300.00"));
        assert!(d.title.unwrap().contains("추정"));
    }

    #[test]
    fn exclusive_proxy() {
        let basis = EstimatedAreaSource {
            exclusive_area: Some(84.9712),
            ..EstimatedAreaSource::default()
        };
        let d = AreaFieldDisplay::from_reconciled(&reconcile_parcel_area(None, Some(&basis)));
        assert_eq!(d.value.as_deref(), Some("84.97"));
        assert!(d.title.unwrap().starts_with("전용면적"));
    }

    #[test]
    fn unavailable_leaves_value_and_hints_total() {
        let basis = EstimatedAreaSource {
            land_area: Some(300.0),
            ..EstimatedAreaSource::default()
        };
        let d = AreaFieldDisplay::from_reconciled(&reconcile_parcel_area(None, Some(&basis)));
        assert_eq!(d.value, None);
        assert_eq!(d.placeholder.as_deref(), Some("대지권비율 입력 (대지면적: 300㎡)"));
    }

    #[test]
    fn fixture_line() {
        assert_eq!(
            fixture_content(Some("101"), Some("1203"), Some("철골구조"), Some(84.97), "철근콘크리트구조"),
            "101동 1203호 (철골구조, 전용면적 84.97㎡)"
        );
        assert_eq!(
            fixture_content(None, Some("1203"), None, None, "철근콘크리트구조"),
            "1203호 (철근콘크리트구조)"
        );
        assert_eq!(fixture_content(None, None, None, Some(59.9), ""), "(전용면적 59.90㎡)");
    }
}
