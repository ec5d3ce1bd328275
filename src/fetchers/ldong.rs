use log::{info, warn};
use std::collections::BTreeMap;

use super::CodeLevels;
use crate::api::types::field_or;
use crate::api::{ApiDomain, Lang, PerLang, TourApi};
use crate::cache::{RawCache, RawKey};
use crate::error::Result;

pub const CODE_FIELD: &str = "lDongRegnCd";
pub const NAME_FIELD: &str = "lDongRegnNm";

const DOMAIN: ApiDomain = ApiDomain::LdongCode;

/// Fetch province and district codes in both languages, persisting every call
pub async fn fetch_ldong_code(api: &dyn TourApi, cache: &RawCache) -> Result<PerLang<CodeLevels>> {
    let mut result = PerLang::<CodeLevels>::default();

    for (index, lang) in Lang::ALL.into_iter().enumerate() {
        if index > 0 {
            api.pause().await;
        }
        *result.get_mut(lang) = fetch_lang(api, cache, lang).await?;
    }

    Ok(result)
}

async fn fetch_lang(api: &dyn TourApi, cache: &RawCache, lang: Lang) -> Result<CodeLevels> {
    let depth1 = api.fetch_single(DOMAIN, lang, &[("lDongListYn", "N")]).await?;
    cache.save(&RawKey::depth1(DOMAIN, lang), &depth1)?;
    info!("  [{}] depth1: {} regions", lang.as_str(), depth1.len());

    let mut depth2 = BTreeMap::new();
    for region in &depth1 {
        let code = field_or(region, CODE_FIELD, "code");
        if code.is_empty() {
            warn!("  [{}] region without code skipped", lang.as_str());
            continue;
        }

        api.pause().await;
        let children = api
            .fetch_single(DOMAIN, lang, &[("lDongRegnCd", code.as_str()), ("lDongListYn", "N")])
            .await?;
        cache.save(&RawKey::depth2(DOMAIN, lang, &code), &children)?;
        info!(
            "  [{}] depth2 ({}): {} districts",
            lang.as_str(),
            code,
            children.len()
        );
        depth2.insert(code, children);
    }

    Ok(CodeLevels {
        depth1,
        depth2,
        depth3: BTreeMap::new(),
    })
}
