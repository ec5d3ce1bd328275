use log::info;

use super::Context;
use crate::api::PerLang;
use crate::error::Result;
use crate::fetchers::CodeLevels;
use crate::output::files;
use crate::transform::categories::{trees_from_cache, trees_from_levels, transform_categories};
use crate::transform::pois::{save_pois, transform_pois_from_output, PoiSet};
use crate::transform::regions::{regions_from_cache, regions_from_levels};

/// Write `regions.json` from a fresh fetch, or from the raw cache when `None`
pub fn run_transform_regions(ctx: &Context, ldong: Option<&PerLang<CodeLevels>>) -> Result<()> {
    info!("[Transform] regions.json: start");
    let regions = match ldong {
        Some(levels) => regions_from_levels(levels),
        None => regions_from_cache(&ctx.raw)?,
    };
    let path = ctx.output.write_json(files::REGIONS, &regions)?;
    info!(
        "[Transform] regions.json saved: {} ({} regions)",
        path.display(),
        regions.len()
    );
    Ok(())
}

/// Write `categories.json` and `categories_db.json`
pub fn run_transform_categories(ctx: &Context, category: Option<&PerLang<CodeLevels>>) -> Result<()> {
    info!("[Transform] categories: start");
    let trees = match category {
        Some(levels) => trees_from_levels(levels),
        None => trees_from_cache(&ctx.raw)?,
    };
    let result = transform_categories(&trees);

    let path = ctx.output.write_json(files::CATEGORIES, &result.categories)?;
    info!(
        "[Transform] categories.json saved: {} ({} top-level categories)",
        path.display(),
        result.categories.len()
    );

    let path = ctx.output.write_json(files::CATEGORIES_DB, &result.documents)?;
    info!(
        "[Transform] categories_db.json saved: {} ({} documents)",
        path.display(),
        result.documents.len()
    );
    Ok(())
}

/// Write the POI, GeoJSON and excluded-POI files for every language with listings
pub fn run_transform_pois(ctx: &Context) -> Result<PerLang<Option<PoiSet>>> {
    info!("[Transform] pois: start");
    let sets = transform_pois_from_output(&ctx.output)?;
    for path in save_pois(&ctx.output, &sets)? {
        info!("[Transform] saved: {}", path.display());
    }
    Ok(sets)
}
