use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tourdata::api::{ApiDomain, ClientConfig, Lang, TourApi, TourApiClient};
use tourdata::error::TourError;

const AREA_PATH: &str = "/KorService2/areaBasedList2";

fn client_for(server: &ServerGuard, rows_per_page: u32) -> TourApiClient {
    paced_client_for(server, rows_per_page, Duration::ZERO)
}

fn paced_client_for(server: &ServerGuard, rows_per_page: u32, request_delay: Duration) -> TourApiClient {
    TourApiClient::new(ClientConfig {
        api_key: "test_key".to_string(),
        base_url: server.url(),
        rows_per_page,
        request_delay,
        ..Default::default()
    })
    .unwrap()
}

fn page_body(total: u32, ids: std::ops::Range<u32>) -> String {
    let items: Vec<_> = ids.map(|i| json!({"contentid": i.to_string()})).collect();
    json!({
        "response": {
            "header": {"resultCode": "0000", "resultMsg": "OK"},
            "body": {"totalCount": total, "items": {"item": items}}
        }
    })
    .to_string()
}

fn page_matcher(page: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("serviceKey".to_string(), "test_key".to_string()),
        Matcher::UrlEncoded("_type".to_string(), "json".to_string()),
        Matcher::UrlEncoded("contentTypeId".to_string(), "12".to_string()),
        Matcher::UrlEncoded("pageNo".to_string(), page.to_string()),
    ])
}

const EXTRA: &[(&str, &str)] = &[("arrange", "A"), ("contentTypeId", "12"), ("lDongRegnCd", "11")];

#[test]
fn test_client_requires_api_key() {
    let result = TourApiClient::new(ClientConfig::default());
    assert!(matches!(result, Err(TourError::NoApiKey)));
}

#[tokio::test]
async fn test_fetch_all_pages_follows_total_count() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (page, range) in [(1, 0..200), (2, 200..400), (3, 400..450)] {
        mocks.push(
            server
                .mock("GET", AREA_PATH)
                .match_query(page_matcher(page))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(page_body(450, range))
                .expect(1)
                .create_async()
                .await,
        );
    }
    let beyond = server
        .mock("GET", AREA_PATH)
        .match_query(page_matcher(4))
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, 200);
    let items = client
        .fetch_all_pages(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await
        .unwrap();

    assert_eq!(items.len(), 450);
    assert_eq!(items[0]["contentid"], "0");
    assert_eq!(items[449]["contentid"], "449");
    for mock in &mocks {
        mock.assert_async().await;
    }
    beyond.assert_async().await;
}

#[tokio::test]
async fn test_pages_after_the_first_are_paced() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (page, range) in [(1, 0..2), (2, 2..4), (3, 4..5)] {
        let mock = server
            .mock("GET", AREA_PATH)
            .match_query(page_matcher(page))
            .with_status(200)
            .with_body(page_body(5, range))
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let delay = Duration::from_millis(100);
    let client = paced_client_for(&server, 2, delay);

    let started = Instant::now();
    let items = client
        .fetch_all_pages(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(items.len(), 5);
    // Pages 2 and 3 each wait; page 1 does not
    assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
    for mock in &mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_single_page_is_not_paced() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", AREA_PATH)
        .match_query(page_matcher(1))
        .with_status(200)
        .with_body(page_body(2, 0..2))
        .create_async()
        .await;

    let delay = Duration::from_millis(200);
    let client = paced_client_for(&server, 2, delay);

    let started = Instant::now();
    let items = client
        .fetch_all_pages(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert!(started.elapsed() < delay);
}

#[tokio::test]
async fn test_empty_items_string_means_no_results() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", AREA_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"response":{"body":{"totalCount":0,"items":""}}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 200);
    let items = client
        .fetch_all_pages(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await
        .unwrap();

    assert!(items.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_single_object_item_is_one_element() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/EngService2/ldongCode2")
        .match_query(Matcher::UrlEncoded("lDongListYn".to_string(), "N".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "response": {"body": {"totalCount": "1", "items": {"item": {"lDongRegnCd": 11, "lDongRegnNm": "Seoul"}}}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server, 200);
    let items = client
        .fetch_single(ApiDomain::LdongCode, Lang::En, &[("lDongListYn", "N")])
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["lDongRegnNm"], "Seoul");
}

#[tokio::test]
async fn test_fetch_single_ignores_further_pages() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/KorService2/lclsSystmCode2")
        .match_query(Matcher::UrlEncoded("pageNo".to_string(), "1".to_string()))
        .with_status(200)
        .with_body(
            json!({"response": {"body": {"totalCount": 5, "items": {"item": [
                {"lclsSystmCode": "AC", "lclsSystmNm": "숙박"},
                {"lclsSystmCode": "C0", "lclsSystmNm": "추천코스"}
            ]}}}})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/KorService2/lclsSystmCode2")
        .match_query(Matcher::UrlEncoded("pageNo".to_string(), "2".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, 2);
    let items = client
        .fetch_single(ApiDomain::CategoryCode, Lang::Kr, &[])
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", AREA_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server, 200);
    let result = client
        .fetch_all_pages(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await;

    match result {
        Err(TourError::Http { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with(AREA_PATH));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_xml_error_body_is_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", AREA_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<OpenAPI_ServiceResponse><cmmMsgHeader><returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg></cmmMsgHeader></OpenAPI_ServiceResponse>")
        .create_async()
        .await;

    let client = client_for(&server, 200);
    let result = client
        .fetch_single(ApiDomain::AreaBased, Lang::Kr, EXTRA)
        .await;

    assert!(matches!(result, Err(TourError::Api { ref code, .. }) if code == "INVALID_RESPONSE"));
}
