use log::{info, warn};
use std::collections::BTreeMap;

use super::CodeLevels;
use crate::api::types::field_or;
use crate::api::{ApiDomain, Lang, PerLang, TourApi};
use crate::cache::{RawCache, RawKey};
use crate::error::Result;

pub const CODE_FIELD: &str = "lclsSystmCode";
pub const NAME_FIELD: &str = "lclsSystmNm";

const DOMAIN: ApiDomain = ApiDomain::CategoryCode;

/// Fetch the three-level classification taxonomy in both languages
pub async fn fetch_category_code(
    api: &dyn TourApi,
    cache: &RawCache,
) -> Result<PerLang<CodeLevels>> {
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
    let depth1 = api.fetch_single(DOMAIN, lang, &[]).await?;
    cache.save(&RawKey::depth1(DOMAIN, lang), &depth1)?;
    info!("  [{}] depth1: {} categories", lang.as_str(), depth1.len());

    let mut depth2 = BTreeMap::new();
    let mut depth3 = BTreeMap::new();

    for top in &depth1 {
        let cat1 = field_or(top, CODE_FIELD, "code");
        if cat1.is_empty() {
            warn!("  [{}] top-level category without code skipped", lang.as_str());
            continue;
        }

        api.pause().await;
        let mids = api.fetch_single(DOMAIN, lang, &[("lclsSystm1", cat1.as_str())]).await?;
        cache.save(&RawKey::depth2(DOMAIN, lang, &cat1), &mids)?;
        info!(
            "  [{}] depth2 ({}): {} sub-categories",
            lang.as_str(),
            cat1,
            mids.len()
        );

        for mid in &mids {
            let cat2 = field_or(mid, CODE_FIELD, "code");
            if cat2.is_empty() {
                continue;
            }

            api.pause().await;
            let subs = api
                .fetch_single(DOMAIN, lang, &[("lclsSystm1", cat1.as_str()), ("lclsSystm2", cat2.as_str())])
                .await?;
            cache.save(&RawKey::depth3(DOMAIN, lang, &cat2), &subs)?;
            info!(
                "  [{}] depth3 ({}): {} sub-categories",
                lang.as_str(),
                cat2,
                subs.len()
            );
            depth3.insert(cat2, subs);
        }

        depth2.insert(cat1, mids);
    }

    Ok(CodeLevels {
        depth1,
        depth2,
        depth3,
    })
}
