use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tables::{region_slug, short_kr_name};
use super::BilingualName;
use crate::api::types::{field_or, RawItem};
use crate::api::{ApiDomain, Lang, PerLang};
use crate::cache::{RawCache, RawKey};
use crate::error::Result;
use crate::fetchers::ldong::{CODE_FIELD, NAME_FIELD};
use crate::fetchers::CodeLevels;

/// One entry of `regions.json`; `code` is the region slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: BilingualName,
}

/// Map province-level codes onto the fixed slug taxonomy.
///
/// Codes without a slug are dropped; they are administrative levels the
/// output does not model.
pub fn transform_regions(kr_depth1: &[RawItem], en_depth1: &[RawItem]) -> Vec<Region> {
    let en_names: HashMap<String, String> = en_depth1
        .iter()
        .map(|item| (field_or(item, CODE_FIELD, "code"), field_or(item, NAME_FIELD, "name")))
        .filter(|(code, name)| !code.is_empty() && !name.is_empty())
        .collect();

    kr_depth1
        .iter()
        .filter_map(|item| {
            let code = field_or(item, CODE_FIELD, "code");
            let slug = region_slug(&code)?;
            let kr_name = field_or(item, NAME_FIELD, "name");

            Some(Region {
                code: slug.to_string(),
                name: BilingualName {
                    ko: short_kr_name(&kr_name).to_string(),
                    en: en_names
                        .get(&code)
                        .cloned()
                        .unwrap_or_else(|| capitalize(slug)),
                },
            })
        })
        .collect()
}

/// Build regions from an in-memory fetch result
pub fn regions_from_levels(levels: &PerLang<CodeLevels>) -> Vec<Region> {
    transform_regions(&levels.kr.depth1, &levels.en.depth1)
}

/// Build regions from the raw cache; both depth-1 files must exist
pub fn regions_from_cache(cache: &RawCache) -> Result<Vec<Region>> {
    let kr = cache.require(&RawKey::depth1(ApiDomain::LdongCode, Lang::Kr))?;
    let en = cache.require(&RawKey::depth1(ApiDomain::LdongCode, Lang::En))?;
    Ok(transform_regions(&kr, &en))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
