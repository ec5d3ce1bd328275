use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::tempdir;
use tourdata::api::types::RawItem;
use tourdata::api::{ApiDomain, Lang};
use tourdata::cache::{RawCache, RawKey};
use tourdata::error::TourError;
use tourdata::output::{files, OutputDir};
use tourdata::storage::{
    load_inputs_from_output, save_pois_to_store, DocumentStore, LoaderConfig, SqliteStore,
};
use tourdata::transform::categories::{
    nest_documents, transform_categories, trees_from_cache, CategoryNode,
};
use tourdata::transform::pois::{save_pois, transform_pois_from_output};
use tourdata::transform::regions::regions_from_cache;

fn raw(value: Value) -> Vec<RawItem> {
    serde_json::from_value(value).unwrap()
}

fn seed_raw_cache(cache: &RawCache) {
    let ldong = ApiDomain::LdongCode;
    cache
        .save(
            &RawKey::depth1(ldong, Lang::Kr),
            &raw(json!([
                {"lDongRegnCd": "11", "lDongRegnNm": "서울특별시"},
                {"lDongRegnCd": "50", "lDongRegnNm": "제주특별자치도"},
                {"lDongRegnCd": "99", "lDongRegnNm": "미지정"}
            ])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth1(ldong, Lang::En),
            &raw(json!([{"lDongRegnCd": "11", "lDongRegnNm": "Seoul"}])),
        )
        .unwrap();

    let category = ApiDomain::CategoryCode;
    cache
        .save(
            &RawKey::depth1(category, Lang::Kr),
            &raw(json!([
                {"lclsSystmCode": "FD", "lclsSystmNm": "음식"},
                {"lclsSystmCode": "SH", "lclsSystmNm": "쇼핑"}
            ])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth2(category, Lang::Kr, "FD"),
            &raw(json!([{"lclsSystmCode": "FD01", "lclsSystmNm": "한식"}])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth3(category, Lang::Kr, "FD01"),
            &raw(json!([{"lclsSystmCode": "FD010100", "lclsSystmNm": "백반"}])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth2(category, Lang::Kr, "SH"),
            &raw(json!([{"lclsSystmCode": "SH04", "lclsSystmNm": "상설시장"}])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth1(category, Lang::En),
            &raw(json!([{"lclsSystmCode": "FD", "lclsSystmNm": "Food"}])),
        )
        .unwrap();
    cache
        .save(
            &RawKey::depth2(category, Lang::En, "FD"),
            &raw(json!([{"lclsSystmCode": "FD01", "lclsSystmNm": "Korean"}])),
        )
        .unwrap();
}

fn area_based_kr() -> Value {
    json!([
        {
            "contentid": "1001", "title": "한식당", "mapx": "126.98", "mapy": "37.57",
            "addr1": "서울 중구", "addr2": "", "lDongRegnCd": "11",
            "firstimage": "http://img/1.jpg", "firstimage2": "", "tel": "02-000-0000",
            "modifiedtime": "20240101120000",
            "lclsSystm1": "FD", "lclsSystm2": "FD01", "lclsSystm3": "FD010100"
        },
        {
            "contentid": "1002", "title": "시장", "mapx": "", "mapy": "",
            "addr1": "", "addr2": "", "lDongRegnCd": "50",
            "lclsSystm1": "SH", "lclsSystm2": "SH04", "lclsSystm3": "SH040300"
        }
    ])
}

#[test]
fn test_transform_from_raw_cache() {
    let dir = tempdir().unwrap();
    let cache = RawCache::new(dir.path().join("raw"));
    let output = OutputDir::new(dir.path().join("output"));
    seed_raw_cache(&cache);

    let regions = regions_from_cache(&cache).unwrap();
    let slugs: Vec<&str> = regions.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(slugs, vec!["seoul", "jeju"]);
    assert_eq!(regions[1].name.ko, "제주");
    assert_eq!(regions[1].name.en, "Jeju");

    let trees = trees_from_cache(&cache).unwrap();
    let result = transform_categories(&trees);
    assert_eq!(result.categories.len(), 2);
    assert_eq!(result.categories[0].list[0].list[0].code, "FD010100");
    assert_eq!(result.categories[1].name.en, "SH");
    // Override table supplies the storage name the English tree lacks
    let shopping = result.documents.iter().find(|d| d.id == "SH").unwrap();
    assert_eq!(shopping.name.en, "Shopping");

    output.write_json(files::CATEGORIES, &result.categories).unwrap();
    output.write_json(&files::area_based(Lang::Kr), &area_based_kr()).unwrap();

    let sets = transform_pois_from_output(&output).unwrap();
    assert!(sets.en.is_none());
    let kr = sets.kr.as_ref().unwrap();
    assert_eq!(kr.pois.len(), 1);
    assert_eq!(kr.pois[0].tags, vec!["음식", "한식", "백반"]);
    assert_eq!(kr.excluded[0].id, "1002");

    save_pois(&output, &sets).unwrap();
    let geo: Value = output.require_json(&files::pois_geo(Lang::Kr)).unwrap();
    assert_eq!(geo["features"][0]["geometry"]["coordinates"], json!([126.98, 37.57]));
    let excluded: Value = output.require_json(&files::pois_exclude(Lang::Kr)).unwrap();
    assert_eq!(excluded[0]["coordinates"], json!({"lat": 0.0, "lng": 0.0}));
    assert!(!output.exists(&files::pois(Lang::En)));
}

#[test]
fn test_category_documents_regroup_to_tree_shape() {
    let dir = tempdir().unwrap();
    let cache = RawCache::new(dir.path());
    seed_raw_cache(&cache);

    let result = transform_categories(&trees_from_cache(&cache).unwrap());
    let rebuilt = nest_documents(&result.documents);

    fn shape(nodes: &[CategoryNode]) -> Vec<(String, Value)> {
        nodes
            .iter()
            .map(|n| (n.code.clone(), json!(shape(&n.list))))
            .collect()
    }
    assert_eq!(shape(&rebuilt), shape(&result.categories));
}

#[test]
fn test_pois_require_categories() {
    let dir = tempdir().unwrap();
    let output = OutputDir::new(dir.path());
    output.write_json(&files::area_based(Lang::Kr), &area_based_kr()).unwrap();

    let result = transform_pois_from_output(&output);
    assert!(matches!(result, Err(TourError::MissingOutput(_))));
}

#[tokio::test]
async fn test_store_load_from_output_files_is_idempotent() {
    let dir = tempdir().unwrap();
    let cache = RawCache::new(dir.path().join("raw"));
    let output = OutputDir::new(dir.path().join("output"));
    seed_raw_cache(&cache);

    let result = transform_categories(&trees_from_cache(&cache).unwrap());
    output.write_json(files::CATEGORIES, &result.categories).unwrap();
    output.write_json(&files::area_based(Lang::Kr), &area_based_kr()).unwrap();
    save_pois(&output, &transform_pois_from_output(&output).unwrap()).unwrap();

    let data = load_inputs_from_output(&output).unwrap();
    assert!(data.en.is_none());

    let config = LoaderConfig {
        batch_size: 1,
        batch_delay: Duration::ZERO,
        max_retries: 3,
    };
    let uri = format!("sqlite://{}", dir.path().join("store").join("tour.db").display());

    let store = SqliteStore::open(&uri, "korea_tourism").await.unwrap();
    let stats = save_pois_to_store(&store, &data, &config).await.unwrap();
    assert_eq!(stats.get("pois_kr"), Some(&1));
    assert_eq!(stats.get("pois_geo_kr"), Some(&1));
    // Closed by the loader
    assert!(store.bulk_upsert("pois_kr", &[json!({"id": "x"})]).await.is_err());

    let store = SqliteStore::open(&uri, "korea_tourism").await.unwrap();
    let stats = save_pois_to_store(&store, &data, &config).await.unwrap();
    assert_eq!(stats.values().sum::<u64>(), 0);

    let store = SqliteStore::open(&uri, "korea_tourism").await.unwrap();
    let feature = store.get("pois_geo_kr", "1001").await.unwrap().unwrap();
    assert_eq!(feature["properties"]["id"], "1001");
    assert_eq!(feature["type"], "Feature");
    store.close().await.unwrap();
}
