pub mod fetch;
pub mod store;
pub mod transform;

use log::info;

use super::{Cli, FetchTarget, Mode, Step};
use crate::api::{ClientConfig, TourApiClient};
use crate::cache::RawCache;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputDir;
use crate::progress::ProgressManager;

/// Everything a stage needs: settings and the two working directories
pub struct Context {
    pub config: Config,
    pub raw: RawCache,
    pub output: OutputDir,
    pub progress: ProgressManager,
}

impl Context {
    pub fn new(config: Config, progress: ProgressManager) -> Self {
        Self {
            raw: RawCache::new(&config.paths.raw_dir),
            output: OutputDir::new(&config.paths.output_dir),
            config,
            progress,
        }
    }

    /// Build the upstream client; fails without an API key
    pub fn client(&self) -> Result<TourApiClient> {
        let api_key = self.config.require_api_key()?;
        TourApiClient::new(ClientConfig::from_settings(&self.config.api, api_key))
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config.with_overrides(cli.api_key.clone(), cli.store_uri.clone()))
}

pub async fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::new(load_config(cli)?, ProgressManager::new(false));

    match cli.mode() {
        Mode::SaveStore => {
            info!("=== Store load only ===");
            store::run_save_store(&ctx, None).await
        }
        Mode::TransformOnly => {
            info!("=== Transform only (raw cache) ===");
            transform::run_transform_regions(&ctx, None)?;
            transform::run_transform_categories(&ctx, None)?;
            transform::run_transform_pois(&ctx)?;
            Ok(())
        }
        Mode::Fetch(target) => {
            let client = ctx.client()?;
            match target {
                FetchTarget::LdongCode => fetch::run_fetch_ldong_code(&ctx, &client).await.map(|_| ()),
                FetchTarget::CategoryCode => {
                    fetch::run_fetch_category_code(&ctx, &client).await.map(|_| ())
                }
                FetchTarget::AreaBased => fetch::run_fetch_area_based(&ctx, &client).await.map(|_| ()),
            }
        }
        Mode::Step(Step::One) => run_step1(&ctx).await,
        Mode::Step(Step::Two) => run_step2(&ctx).await,
    }
}

/// Code tables: fetch both hierarchies, then write regions and categories
pub async fn run_step1(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let ldong = fetch::run_fetch_ldong_code(ctx, &client).await?;
    let category = fetch::run_fetch_category_code(ctx, &client).await?;
    transform::run_transform_regions(ctx, Some(&ldong))?;
    transform::run_transform_categories(ctx, Some(&category))?;
    Ok(())
}

/// Points of interest: fetch listings, transform, load
pub async fn run_step2(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    fetch::run_fetch_area_based(ctx, &client).await?;
    let sets = transform::run_transform_pois(ctx)?;
    store::run_save_store(ctx, Some(&sets)).await
}
