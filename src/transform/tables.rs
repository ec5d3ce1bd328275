//! Static lookup tables shared by the transformers and the area-based fetcher.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::api::Lang;

/// Administrative (ldong) code to region slug, in output order.
///
/// Sejong is the only province-level region published under its
/// five-digit district code.
pub const REGION_CODES: &[(&str, &str)] = &[
    ("11", "seoul"),
    ("26", "busan"),
    ("27", "daegu"),
    ("28", "incheon"),
    ("29", "gwangju"),
    ("30", "daejeon"),
    ("31", "ulsan"),
    ("36110", "sejong"),
    ("41", "gyeonggi"),
    ("43", "chungbuk"),
    ("44", "chungnam"),
    ("46", "jeonnam"),
    ("47", "gyeongbuk"),
    ("48", "gyeongnam"),
    ("50", "jeju"),
    ("51", "gangwon"),
    ("52", "jeonbuk"),
];

/// Full Korean province names to their short form
pub const KR_SHORT_NAMES: &[(&str, &str)] = &[
    ("서울특별시", "서울"),
    ("부산광역시", "부산"),
    ("대구광역시", "대구"),
    ("인천광역시", "인천"),
    ("광주광역시", "광주"),
    ("대전광역시", "대전"),
    ("울산광역시", "울산"),
    ("세종특별자치시", "세종"),
    ("경기도", "경기"),
    ("강원특별자치도", "강원"),
    ("충청북도", "충북"),
    ("충청남도", "충남"),
    ("전북특별자치도", "전북"),
    ("전라남도", "전남"),
    ("경상북도", "경북"),
    ("경상남도", "경남"),
    ("제주특별자치도", "제주"),
];

/// English names for taxonomy codes the English service does not publish
pub const CATEGORY_EN_OVERRIDES: &[(&str, &str)] = &[
    ("AC", "Accommodation"),
    ("C0", "Recommended Course"),
    ("C01", "Family Course"),
    ("C02", "Solo Course"),
    ("C03", "Healing Course"),
    ("C04", "Walking Course"),
    ("C05", "Camping Course"),
    ("C06", "Food Course"),
    ("EV", "Festivals, Performances and Events"),
    ("EX", "Experience Tourism"),
    ("FD", "Food"),
    ("HS", "Historical Tourism"),
    ("LS", "Leisure Sports"),
    ("NA", "Nature Tourism"),
    ("SH", "Shopping"),
    ("VE", "Cultural Tourism"),
];

/// Third-level classification codes diverted away from the primary POI set
const EXCLUDED_LCLS3_KR: &[&str] = &["SH040300", "SH040400", "SH060100"];
const EXCLUDED_LCLS3_EN: &[&str] = &["SH040300", "SH040400", "SH060100"];

static SLUG_BY_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| REGION_CODES.iter().copied().collect());

static CODE_BY_SLUG: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| REGION_CODES.iter().map(|&(code, slug)| (slug, code)).collect());

static SHORT_NAME: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| KR_SHORT_NAMES.iter().copied().collect());

static EN_OVERRIDE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CATEGORY_EN_OVERRIDES.iter().copied().collect());

pub fn region_slug(code: &str) -> Option<&'static str> {
    SLUG_BY_CODE.get(code).copied()
}

pub fn region_code(slug: &str) -> Option<&'static str> {
    CODE_BY_SLUG.get(slug).copied()
}

/// Short Korean name, or the input unchanged when it has none
pub fn short_kr_name(full_name: &str) -> &str {
    SHORT_NAME.get(full_name).copied().unwrap_or(full_name)
}

pub fn category_en_override(code: &str) -> Option<&'static str> {
    EN_OVERRIDE.get(code).copied()
}

pub fn excluded_lcls3(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Kr => EXCLUDED_LCLS3_KR,
        Lang::En => EXCLUDED_LCLS3_EN,
    }
}

pub fn is_excluded(lang: Lang, lcls3: &str) -> bool {
    !lcls3.is_empty() && excluded_lcls3(lang).contains(&lcls3)
}
