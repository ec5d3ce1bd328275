use log::info;

use super::Context;
use crate::api::types::RawItem;
use crate::api::{ApiDomain, PerLang, TourApi};
use crate::error::Result;
use crate::fetchers::{self, CodeLevels};

pub async fn run_fetch_ldong_code(ctx: &Context, api: &dyn TourApi) -> Result<PerLang<CodeLevels>> {
    info!("[Fetch] {}: start", ApiDomain::LdongCode.display_name());
    let data = fetchers::fetch_ldong_code(api, &ctx.raw).await?;
    info!(
        "[Fetch] {}: done ({} kr / {} en provinces)",
        ApiDomain::LdongCode.display_name(),
        data.kr.depth1.len(),
        data.en.depth1.len()
    );
    Ok(data)
}

pub async fn run_fetch_category_code(ctx: &Context, api: &dyn TourApi) -> Result<PerLang<CodeLevels>> {
    info!("[Fetch] {}: start", ApiDomain::CategoryCode.display_name());
    let data = fetchers::fetch_category_code(api, &ctx.raw).await?;
    info!(
        "[Fetch] {}: done ({} kr / {} en top-level)",
        ApiDomain::CategoryCode.display_name(),
        data.kr.depth1.len(),
        data.en.depth1.len()
    );
    Ok(data)
}

pub async fn run_fetch_area_based(ctx: &Context, api: &dyn TourApi) -> Result<PerLang<Vec<RawItem>>> {
    info!("[Fetch] {}: start", ApiDomain::AreaBased.display_name());
    let data = fetchers::fetch_area_based(api, &ctx.raw, &ctx.output, &ctx.progress).await?;
    info!(
        "[Fetch] {}: done ({} kr / {} en)",
        ApiDomain::AreaBased.display_name(),
        data.kr.len(),
        data.en.len()
    );
    Ok(data)
}
