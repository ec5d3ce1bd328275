//! Document store loading: batched, retrying upserts of POI documents and
//! GeoJSON features into four collections.

pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::deserializers::value_to_string;
use crate::api::{Lang, PerLang};
use crate::config::StoreSettings;
use crate::error::Result;
use crate::output::{files, OutputDir};
use crate::transform::pois::PoiSet;

/// A store of JSON documents keyed by their string `id`
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upsert documents by `id`; returns inserted plus modified
    async fn bulk_upsert(&self, collection: &str, documents: &[Value]) -> Result<u64>;

    /// Release the connection
    async fn close(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Attempts per batch, the first included
    pub max_retries: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 300,
            batch_delay: Duration::from_secs(1),
            max_retries: 3,
        }
    }
}

impl LoaderConfig {
    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            batch_delay: settings.batch_delay(),
            max_retries: settings.max_retries,
        }
    }
}

pub fn pois_collection(lang: Lang) -> String {
    format!("pois_{}", lang.as_str())
}

pub fn geo_collection(lang: Lang) -> String {
    format!("pois_geo_{}", lang.as_str())
}

/// Write documents in fixed-size batches and return the summed upsert count.
///
/// A batch failing transiently is retried after `batch_delay * 2^attempt`;
/// a batch that runs out of attempts fails the whole write.
pub async fn bulk_write_batched(
    store: &dyn DocumentStore,
    collection: &str,
    documents: &[Value],
    config: &LoaderConfig,
) -> Result<u64> {
    let batch_size = config.batch_size.max(1);
    let total_batches = documents.len().div_ceil(batch_size);
    let mut total = 0;

    for (index, batch) in documents.chunks(batch_size).enumerate() {
        let batch_num = index + 1;
        total += write_batch(store, collection, batch, config).await?;
        info!(
            "    batch {}/{} done ({} documents)",
            batch_num,
            total_batches,
            batch.len()
        );

        if batch_num < total_batches && !config.batch_delay.is_zero() {
            tokio::time::sleep(config.batch_delay).await;
        }
    }

    Ok(total)
}

async fn write_batch(
    store: &dyn DocumentStore,
    collection: &str,
    batch: &[Value],
    config: &LoaderConfig,
) -> Result<u64> {
    let mut attempt: u32 = 1;
    loop {
        match store.bulk_upsert(collection, batch).await {
            Ok(count) => return Ok(count),
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                let wait = config.batch_delay * 2u32.pow(attempt);
                warn!(
                    "    {}; retrying in {:?} ({}/{})",
                    e, wait, attempt, config.max_retries
                );
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Documents for one language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadInput {
    pub pois: Vec<Value>,
    pub features: Vec<Value>,
}

impl LoadInput {
    pub fn from_poi_set(set: &PoiSet) -> Result<Self> {
        Ok(Self {
            pois: set
                .pois
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
            features: set
                .geojson
                .features
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
        })
    }
}

pub type LoadData = PerLang<Option<LoadInput>>;

pub fn load_inputs_from_sets(sets: &PerLang<Option<PoiSet>>) -> Result<LoadData> {
    let mut data = LoadData::default();
    for lang in Lang::ALL {
        if let Some(set) = sets.get(lang) {
            *data.get_mut(lang) = Some(LoadInput::from_poi_set(set)?);
        }
    }
    Ok(data)
}

/// Read `pois_<lang>.json` and `pois_geo_<lang>.json`; a language missing
/// either file is skipped
pub fn load_inputs_from_output(output: &OutputDir) -> Result<LoadData> {
    let mut data = LoadData::default();
    for lang in Lang::ALL {
        let pois = output.read_json::<Vec<Value>>(&files::pois(lang))?;
        let geo = output.read_json::<Value>(&files::pois_geo(lang))?;
        let (Some(pois), Some(geo)) = (pois, geo) else {
            warn!("POI output for [{}] not found, skipping", lang.as_str());
            continue;
        };

        let features = match geo.get("features") {
            Some(Value::Array(features)) => features.clone(),
            _ => Vec::new(),
        };
        *data.get_mut(lang) = Some(LoadInput { pois, features });
    }
    Ok(data)
}

fn document_id(value: Option<&Value>) -> Option<String> {
    value.map(value_to_string).filter(|id| !id.is_empty())
}

/// A feature keyed for upsert: `properties.id` copied onto `id`
fn feature_document(feature: &Value) -> Option<Value> {
    let id = document_id(feature.pointer("/properties/id"))?;
    let mut document = feature.clone();
    document
        .as_object_mut()?
        .insert("id".to_string(), Value::String(id));
    Some(document)
}

/// Keep documents that carry an id, logging how many were dropped
fn keyed_documents(collection: &str, documents: Vec<Value>) -> Vec<Value> {
    let before = documents.len();
    let keyed: Vec<Value> = documents
        .into_iter()
        .filter(|doc| document_id(doc.get("id")).is_some())
        .collect();
    if keyed.len() < before {
        warn!(
            "  [Store] {}: skipping {} documents without id",
            collection,
            before - keyed.len()
        );
    }
    keyed
}

async fn upsert_collection(
    store: &dyn DocumentStore,
    collection: String,
    documents: &[Value],
    config: &LoaderConfig,
    stats: &mut BTreeMap<String, u64>,
) -> Result<()> {
    if documents.is_empty() {
        return Ok(());
    }
    info!("  [Store] {}: writing {} documents", collection, documents.len());
    let count = bulk_write_batched(store, &collection, documents, config).await?;
    info!("  [Store] {}: {} upserted", collection, count);
    stats.insert(collection, count);
    Ok(())
}

async fn upsert_all(
    store: &dyn DocumentStore,
    data: &LoadData,
    config: &LoaderConfig,
) -> Result<BTreeMap<String, u64>> {
    let mut stats = BTreeMap::new();
    for lang in Lang::ALL {
        let Some(input) = data.get(lang) else {
            continue;
        };

        let collection = pois_collection(lang);
        let pois = keyed_documents(&collection, input.pois.clone());
        upsert_collection(store, collection, &pois, config, &mut stats).await?;

        let collection = geo_collection(lang);
        let features: Vec<Value> = input.features.iter().filter_map(feature_document).collect();
        if features.len() < input.features.len() {
            warn!(
                "  [Store] {}: skipping {} features without properties.id",
                collection,
                input.features.len() - features.len()
            );
        }
        upsert_collection(store, collection, &features, config, &mut stats).await?;
    }
    Ok(stats)
}

/// Upsert every language's documents and features, closing the store on
/// success and on failure
pub async fn save_pois_to_store(
    store: &dyn DocumentStore,
    data: &LoadData,
    config: &LoaderConfig,
) -> Result<BTreeMap<String, u64>> {
    let result = upsert_all(store, data, config).await;
    let closed = store.close().await;

    let stats = result?;
    closed?;
    Ok(stats)
}
