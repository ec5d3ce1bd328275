use log::{info, warn};

use super::Context;
use crate::api::{Lang, PerLang};
use crate::error::Result;
use crate::output::format_upsert_stats;
use crate::storage::{
    load_inputs_from_output, load_inputs_from_sets, save_pois_to_store, LoaderConfig, SqliteStore,
};
use crate::transform::pois::PoiSet;

/// Load POIs into the document store.
///
/// Uses the given sets, or the output files when `None`. Without a
/// configured store URI this logs a warning and does nothing.
pub async fn run_save_store(ctx: &Context, sets: Option<&PerLang<Option<PoiSet>>>) -> Result<()> {
    let Some(uri) = ctx.config.store.uri.as_deref() else {
        warn!("[Store] no store URI configured, skipping load");
        return Ok(());
    };

    let data = match sets {
        Some(sets) => load_inputs_from_sets(sets)?,
        None => load_inputs_from_output(&ctx.output)?,
    };
    if Lang::ALL.iter().all(|lang| data.get(*lang).is_none()) {
        warn!("[Store] no POI output files to load");
        return Ok(());
    }

    let store = SqliteStore::open(uri, &ctx.config.store.database).await?;
    info!("[Store] loading POIs into {}", store.path().display());
    let config = LoaderConfig::from_settings(&ctx.config.store);
    let stats = save_pois_to_store(&store, &data, &config).await?;

    let total: u64 = stats.values().sum();
    info!("[Store] done: {} documents upserted", total);
    println!("{}", format_upsert_stats(&stats));
    Ok(())
}
