//! Parcel-number and land-register vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// PNU
// ---------------------------------------------------------------------------

/// 19-digit parcel number:
/// sigungu(5) + bjdong(5) + mountain flag(1) + main lot(4) + sub lot(4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pnu(String);

impl Pnu {
    pub const LEN: usize = 19;

    pub fn parse(s: &str) -> Result<Self, ReconError> {
        let s = s.trim();
        if s.len() != Self::LEN {
            return Err(ReconError::InvalidPnu {
                value: s.to_string(),
                reason: "expected 19 digits",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReconError::InvalidPnu {
                value: s.to_string(),
                reason: "non-digit character",
            });
        }
        if !matches!(&s[10..11], "1" | "2") {
            return Err(ReconError::InvalidPnu {
                value: s.to_string(),
                reason: "land/mountain flag must be 1 or 2",
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Build a PNU from a 10-digit legal-dong code and the lot numbers.
    /// Empty lot numbers count as zero.
    pub fn compose(
        adm_code: &str,
        mountain: bool,
        main_no: &str,
        sub_no: &str,
    ) -> Result<Self, ReconError> {
        if adm_code.len() != 10 || !adm_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReconError::InvalidAdmCode(adm_code.to_string()));
        }
        let main = pad_lot(main_no)?;
        let sub = pad_lot(sub_no)?;
        let flag = if mountain { '2' } else { '1' };
        Ok(Self(format!("{adm_code}{flag}{main}{sub}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn sigungu_code(&self) -> &str {
        &self.0[0..5]
    }

    pub fn bjdong_code(&self) -> &str {
        &self.0[5..10]
    }

    /// Lot is on a mountain register (임야대장).
    pub fn is_mountain(&self) -> bool {
        &self.0[10..11] == "2"
    }

    pub fn bun(&self) -> &str {
        &self.0[11..15]
    }

    pub fn ji(&self) -> &str {
        &self.0[15..19]
    }

    /// Human lot number, e.g. `"706-13"` or `"706"`.
    pub fn jibun(&self) -> String {
        let main = self.bun().trim_start_matches('0');
        let sub = self.ji().trim_start_matches('0');
        jibun_label(if main.is_empty() { "0" } else { main }, sub)
    }
}

fn pad_lot(raw: &str) -> Result<String, ReconError> {
    let raw = raw.trim();
    if raw.len() > 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReconError::InvalidLotNumber(raw.to_string()));
    }
    Ok(format!("{raw:0>4}"))
}

impl TryFrom<String> for Pnu {
    type Error = ReconError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pnu> for String {
    fn from(pnu: Pnu) -> Self {
        pnu.0
    }
}

impl std::fmt::Display for Pnu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"main-sub"`, or just `"main"` when there is no sub lot.
pub fn jibun_label(main_no: &str, sub_no: &str) -> String {
    let sub = sub_no.trim();
    if sub.is_empty() || sub == "0" {
        main_no.trim().to_string()
    } else {
        format!("{}-{}", main_no.trim(), sub)
    }
}

// ---------------------------------------------------------------------------
// Land category (지목)
// ---------------------------------------------------------------------------

/// Full land-category name for a register code or its one-letter
/// abbreviation. Unknown codes are returned unchanged.
pub fn jimok_name(code: &str) -> &str {
    match code.trim() {
        "01" | "전" => "전",
        "02" | "답" => "답",
        "03" | "과" => "과수원",
        "04" | "목" => "목장용지",
        "05" | "임" => "임야",
        "06" | "광" => "광천지",
        "07" | "염" => "염전",
        "08" | "대" => "대",
        "09" | "장" => "공장용지",
        "10" | "학" => "학교용지",
        "11" | "차" => "주차장",
        "12" | "주" => "주유소용지",
        "13" | "창" => "창고용지",
        "14" | "도" => "도로",
        "15" | "철" => "철도용지",
        "16" | "제" => "제방",
        "17" | "천" => "하천",
        "18" | "구" => "구거",
        "19" | "유" => "유지",
        "20" | "양" => "양어장",
        "21" | "수" => "수도용지",
        "22" | "공" => "공원",
        "23" | "체" => "체육용지",
        "24" | "원" => "유원지",
        "25" | "종" => "종교용지",
        "26" | "사" => "사적지",
        "27" | "묘" => "묘지",
        "28" | "잡" => "잡종지",
        _ => code,
    }
}

// ---------------------------------------------------------------------------
// Land-use zoning
// ---------------------------------------------------------------------------

/// One raw land-use entry from the zoning register.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsageEntry {
    pub name: String,
    #[serde(alias = "codeName")]
    pub code_name: String,
}

/// Zoning split into use areas (용도지역) and use districts (용도지구).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageZoning {
    pub areas: Vec<String>,
    pub districts: Vec<String>,
}

/// Classify raw entries, de-duplicated and in first-seen order.
pub fn classify_usage(entries: &[UsageEntry]) -> UsageZoning {
    let mut zoning = UsageZoning::default();
    for entry in entries {
        let name = entry.name.trim();
        if name.is_empty() {
            continue;
        }
        let bucket = if entry.code_name.contains("용도지구") || name.contains("지구") {
            &mut zoning.districts
        } else {
            &mut zoning.areas
        };
        if !bucket.iter().any(|n| n == name) {
            bucket.push(name.to_string());
        }
    }
    zoning
}
