//! Land-area strings: `"<share>/<total>"` or a plain decimal.

use landpermit_recon::measure::{non_negative, parse_number};
use serde::Serialize;

/// Both halves of a land-area string.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AreaFraction {
    /// Land share in m². Never negative.
    pub share: f64,
    /// Whole-site land area, present only in the `share/total` form.
    pub total: Option<f64>,
}

impl AreaFraction {
    /// Split on the first `/`. Unreadable halves read as 0 / absent.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('/') {
            Some((share, total)) => Self {
                share: read_share(share),
                total: parse_number(total).map(non_negative).filter(|t| *t > 0.0),
            },
            None => Self {
                share: read_share(raw),
                total: None,
            },
        }
    }
}

fn read_share(raw: &str) -> f64 {
    parse_number(raw).map(non_negative).unwrap_or(0.0)
}

/// Land share encoded in `raw`. Total: never fails, never negative.
///
/// ```
/// use landpermit_engine::parse_area;
/// assert_eq!(parse_area("35.9790/36645.30"), 35.979);
/// assert_eq!(parse_area("abc"), 0.0);
/// ```
pub fn parse_area(raw: &str) -> f64 {
    AreaFraction::parse(raw).share
}
