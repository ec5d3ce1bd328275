//! Points of interest: area-based listings joined against the category and
//! region tables, reshaped into flat documents and a GeoJSON collection.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::categories::{category_map, CategoryMap, CategoryNode};
use super::tables::{is_excluded, region_slug};
use crate::api::deserializers::lenient_string;
use crate::api::{Lang, PerLang};
use crate::error::{Result, TourError};
use crate::output::{files, OutputDir};

/// One upstream area-based listing, as stored in `area_based_<lang>.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaBasedItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub contentid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mapx: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mapy: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub addr1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub addr2: String,
    #[serde(rename = "lDongRegnCd", default, deserialize_with = "lenient_string")]
    pub ldong_regn_cd: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub firstimage: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub firstimage2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tel: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modifiedtime: String,
    #[serde(rename = "lclsSystm1", default, deserialize_with = "lenient_string")]
    pub lcls1: String,
    #[serde(rename = "lclsSystm2", default, deserialize_with = "lenient_string")]
    pub lcls2: String,
    #[serde(rename = "lclsSystm3", default, deserialize_with = "lenient_string")]
    pub lcls3: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoiSource {
    pub area: String,
    pub lcls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiDocument {
    pub id: String,
    pub slug: String,
    pub category: String,
    pub coordinates: Coordinates,
    pub name: String,
    pub address: String,
    pub description: String,
    pub region: String,
    pub images: Vec<String>,
    pub contact: String,
    pub website: String,
    pub tags: Vec<String>,
    pub updated_at: String,
    pub source: PoiSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: String,
    pub slug: String,
    pub category: String,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<GeoFeature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// `"20250312152659"` to `"2025-03-12"`; anything shorter than a date is blank
pub fn format_date(raw: &str) -> String {
    match (raw.get(0..4), raw.get(4..6), raw.get(6..8)) {
        (Some(year), Some(month), Some(day)) => format!("{}-{}-{}", year, month, day),
        _ => String::new(),
    }
}

fn parse_coordinate(raw: &str, field: &str, content_id: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| {
        TourError::Parse(format!(
            "Invalid {} '{}' for content {}",
            field, raw, content_id
        ))
    })
}

fn join_address(addr1: &str, addr2: &str) -> String {
    [addr1.trim(), addr2.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(values: &[&str]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}

/// Reshape one listing into a POI document in the given language
pub fn transform_item(item: &AreaBasedItem, lang: Lang, categories: &CategoryMap) -> Result<PoiDocument> {
    let display_name = |code: &str| -> Option<String> {
        categories
            .get(code)
            .map(|name| name.get(lang).to_string())
            .filter(|name| !name.is_empty())
    };

    let category = display_name(&item.lcls1).unwrap_or_else(|| item.lcls1.clone());

    let mut tags: Vec<String> = Vec::new();
    for code in [&item.lcls1, &item.lcls2, &item.lcls3] {
        if code.is_empty() {
            continue;
        }
        if let Some(name) = display_name(code) {
            if !tags.contains(&name) {
                tags.push(name);
            }
        }
    }

    let coordinates = Coordinates {
        lat: parse_coordinate(&item.mapy, "mapy", &item.contentid)?,
        lng: parse_coordinate(&item.mapx, "mapx", &item.contentid)?,
    };

    Ok(PoiDocument {
        id: item.contentid.clone(),
        slug: item.contentid.clone(),
        category,
        coordinates,
        name: item.title.clone(),
        address: join_address(&item.addr1, &item.addr2),
        description: item.title.clone(),
        region: region_slug(&item.ldong_regn_cd).unwrap_or_default().to_string(),
        images: non_empty(&[item.firstimage.as_str(), item.firstimage2.as_str()]),
        contact: item.tel.clone(),
        website: String::new(),
        tags,
        updated_at: format_date(&item.modifiedtime),
        source: PoiSource {
            area: item.ldong_regn_cd.clone(),
            lcls: non_empty(&[item.lcls1.as_str(), item.lcls2.as_str(), item.lcls3.as_str()]),
        },
    })
}

pub fn to_geojson_feature(poi: &PoiDocument) -> GeoFeature {
    GeoFeature {
        kind: "Feature".to_string(),
        geometry: PointGeometry {
            kind: "Point".to_string(),
            coordinates: [poi.coordinates.lng, poi.coordinates.lat],
        },
        properties: FeatureProperties {
            id: poi.id.clone(),
            slug: poi.slug.clone(),
            category: poi.category.clone(),
            name: poi.name.clone(),
            region: poi.region.clone(),
        },
    }
}

/// Transformed POIs for one language
#[derive(Debug, Clone, PartialEq)]
pub struct PoiSet {
    pub pois: Vec<PoiDocument>,
    pub excluded: Vec<PoiDocument>,
    pub geojson: FeatureCollection,
}

/// Transform every listing, diverting excluded sub-categories.
///
/// The feature collection follows the primary list, in the same order.
pub fn transform_pois(items: &[AreaBasedItem], lang: Lang, categories: &CategoryMap) -> Result<PoiSet> {
    let mut pois = Vec::with_capacity(items.len());
    let mut excluded = Vec::new();

    for item in items {
        let poi = transform_item(item, lang, categories)?;
        if is_excluded(lang, &item.lcls3) {
            excluded.push(poi);
        } else {
            pois.push(poi);
        }
    }

    let geojson = FeatureCollection::new(pois.iter().map(to_geojson_feature).collect());
    Ok(PoiSet {
        pois,
        excluded,
        geojson,
    })
}

/// Build POIs from `area_based_<lang>.json` and `categories.json`.
///
/// A language without listings is skipped; missing categories are fatal.
pub fn transform_pois_from_output(output: &OutputDir) -> Result<PerLang<Option<PoiSet>>> {
    let categories: Vec<CategoryNode> = output.require_json(files::CATEGORIES)?;
    let map = category_map(&categories);

    let mut result = PerLang::<Option<PoiSet>>::default();
    for lang in Lang::ALL {
        let Some(items) = output.read_json::<Vec<AreaBasedItem>>(&files::area_based(lang))? else {
            warn!(
                "{} not found, skipping [{}]",
                output.area_based_path(lang).display(),
                lang.as_str()
            );
            continue;
        };

        let set = transform_pois(&items, lang, &map)?;
        info!(
            "  [{}] {} POIs, {} excluded",
            lang.as_str(),
            set.pois.len(),
            set.excluded.len()
        );
        *result.get_mut(lang) = Some(set);
    }

    Ok(result)
}

/// Write `pois_<lang>.json`, `pois_geo_<lang>.json` and `pois_exclude_<lang>.json`
pub fn save_pois(output: &OutputDir, sets: &PerLang<Option<PoiSet>>) -> Result<Vec<PathBuf>> {
    let mut saved = Vec::new();
    for lang in Lang::ALL {
        let Some(set) = sets.get(lang) else {
            continue;
        };
        saved.push(output.write_json(&files::pois(lang), &set.pois)?);
        saved.push(output.write_json(&files::pois_geo(lang), &set.geojson)?);
        saved.push(output.write_json(&files::pois_exclude(lang), &set.excluded)?);
    }
    Ok(saved)
}
