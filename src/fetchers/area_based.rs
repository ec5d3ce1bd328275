use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::api::deserializers::value_to_string;
use crate::api::types::RawItem;
use crate::api::{ApiDomain, Lang, PerLang, TourApi};
use crate::cache::{RawCache, RawKey};
use crate::error::Result;
use crate::output::{files, OutputDir};
use crate::progress::{messages, ProgressManager, StageProgress};
use crate::transform::regions::Region;
use crate::transform::tables::REGION_CODES;

const DOMAIN: ApiDomain = ApiDomain::AreaBased;

/// Entry of `content-types.json`; only the per-language code is used here
#[derive(Debug, Deserialize)]
struct ContentTypeEntry {
    #[serde(default)]
    code: BTreeMap<String, Value>,
}

/// Content-type ids available in one language, in file order
fn content_type_ids(output: &OutputDir, lang: Lang) -> Result<Vec<String>> {
    let entries: Vec<ContentTypeEntry> = output.require_json(files::CONTENT_TYPES)?;
    Ok(entries
        .iter()
        .filter_map(|entry| entry.code.get(lang.as_str()))
        .map(value_to_string)
        .filter(|code| !code.is_empty())
        .collect())
}

/// Administrative codes of the regions in `regions.json`, in slug-table order
fn region_codes(output: &OutputDir) -> Result<Vec<&'static str>> {
    let regions: Vec<Region> = output.require_json(files::REGIONS)?;
    let known: HashSet<&str> = REGION_CODES.iter().map(|(_, slug)| *slug).collect();

    for region in &regions {
        if !known.contains(region.code.as_str()) {
            warn!("Unknown region slug '{}' skipped", region.code);
        }
    }

    let wanted: HashSet<&str> = regions.iter().map(|r| r.code.as_str()).collect();
    Ok(REGION_CODES
        .iter()
        .filter(|(_, slug)| wanted.contains(slug))
        .map(|(code, _)| *code)
        .collect())
}

/// Fetch every (content type × region) listing per language.
///
/// Each pair is cached on its own; a language's accumulated listings are
/// written to `area_based_<lang>.json` once that language completes.
pub async fn fetch_area_based(
    api: &dyn TourApi,
    cache: &RawCache,
    output: &OutputDir,
    progress: &ProgressManager,
) -> Result<PerLang<Vec<RawItem>>> {
    let codes = region_codes(output)?;
    let mut result = PerLang::<Vec<RawItem>>::default();

    for lang in Lang::ALL {
        let content_types = content_type_ids(output, lang)?;
        let total = content_types.len() * codes.len();
        let stage = StageProgress::new(progress, total as u64, &format!("[{}] area-based", lang.as_str()));
        let mut collected = Vec::new();
        let mut count = 0;

        for content_type in &content_types {
            for code in &codes {
                count += 1;
                debug!(
                    "  [{}] {} contentTypeId={}, lDongRegnCd={}",
                    lang.as_str(),
                    messages::pair_progress(count, total),
                    content_type,
                    code
                );
                stage.set_message(&messages::fetching_pair(lang.as_str(), content_type, code));

                api.pause().await;
                let items = api
                    .fetch_all_pages(
                        DOMAIN,
                        lang,
                        &[
                            ("arrange", "A"),
                            ("contentTypeId", content_type.as_str()),
                            ("lDongRegnCd", *code),
                        ],
                    )
                    .await?;
                debug!("    -> {} items", items.len());

                cache.save(&RawKey::area_pair(lang, content_type, code), &items)?;
                collected.extend(items);
                stage.inc();
            }
        }

        let done = messages::fetch_complete(lang.as_str(), collected.len());
        stage.finish_with_message(&done);
        info!("  {}", done);

        let path = output.write_json(&files::area_based(lang), &collected)?;
        info!("  [Output] {} ({} items)", path.display(), collected.len());
        *result.get_mut(lang) = collected;
    }

    Ok(result)
}
