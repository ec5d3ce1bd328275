pub mod commands;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::api::ApiDomain;
use crate::config::{API_KEY_ENV, STORE_URI_ENV};
use crate::error::Result;

/// Korea Tourism reference data pipeline
#[derive(Parser, Debug)]
#[command(
    name = "tourdata",
    about = "Fetch, normalize and load Korea Tourism regions, categories and POIs",
    version,
    author,
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Pipeline step (1: code tables, 2: points of interest)
    #[arg(long, value_enum)]
    pub step: Option<Step>,

    /// Run a single fetcher
    #[arg(long, value_enum)]
    pub fetch: Option<FetchTarget>,

    /// Transform from the raw cache and existing outputs without fetching
    #[arg(long)]
    pub transform_only: bool,

    /// Load POI output files into the document store only
    #[arg(long)]
    pub save_store: bool,

    /// Service key for the tourism API
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Document store connection string (sqlite://<path>)
    #[arg(long, env = STORE_URI_ENV, hide_env_values = true)]
    pub store_uri: Option<String>,

    /// Config file (defaults to ~/.pyhub/tourdata/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Region and category codes
    #[value(name = "1")]
    One,
    /// Area-based POIs, transform and store load
    #[value(name = "2")]
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchTarget {
    #[value(name = "ldong_code")]
    LdongCode,
    #[value(name = "category_code")]
    CategoryCode,
    #[value(name = "area_based")]
    AreaBased,
}

impl From<FetchTarget> for ApiDomain {
    fn from(target: FetchTarget) -> Self {
        match target {
            FetchTarget::LdongCode => ApiDomain::LdongCode,
            FetchTarget::CategoryCode => ApiDomain::CategoryCode,
            FetchTarget::AreaBased => ApiDomain::AreaBased,
        }
    }
}

/// What a single invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SaveStore,
    TransformOnly,
    Fetch(FetchTarget),
    Step(Step),
}

impl Cli {
    /// Resolve flags to one mode; store-only wins, then transform-only,
    /// then a single fetch, then the step (step 1 by default)
    pub fn mode(&self) -> Mode {
        if self.save_store {
            Mode::SaveStore
        } else if self.transform_only {
            Mode::TransformOnly
        } else if let Some(target) = self.fetch {
            Mode::Fetch(target)
        } else {
            Mode::Step(self.step.unwrap_or(Step::One))
        }
    }

    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Self::parse();

        let default_filter = if cli.verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .init();

        let result = commands::execute(&cli).await;

        if let Err(e) = &result {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("\n{} {}", "Hint:".yellow().bold(), hint);
            }
        }
        result
    }
}
