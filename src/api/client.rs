use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

use super::http_client::create_custom_client;
use super::types::{ApiEnvelope, RawItem, ResponseBody};
use super::{endpoint_url, ApiDomain, Lang, DEFAULT_BASE_URL};
use crate::config::ApiSettings;
use crate::error::{Result, TourError};

/// Sequential, rate-limited access to the tourism API.
///
/// Implementations never issue two calls concurrently; callers pace
/// consecutive calls with [`TourApi::pause`].
#[async_trait]
pub trait TourApi: Send + Sync {
    /// Fetch every page of a listing and concatenate the items in page order
    async fn fetch_all_pages(
        &self,
        domain: ApiDomain,
        lang: Lang,
        extra: &[(&str, &str)],
    ) -> Result<Vec<RawItem>>;

    /// Fetch only the first page of a listing
    async fn fetch_single(
        &self,
        domain: ApiDomain,
        lang: Lang,
        extra: &[(&str, &str)],
    ) -> Result<Vec<RawItem>>;

    /// Wait out the courtesy delay between two upstream calls
    async fn pause(&self);
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// data.go.kr service key
    pub api_key: String,
    /// Base URL; the language service and operation are appended
    pub base_url: String,
    /// Rows requested per page
    pub rows_per_page: u32,
    /// Delay between consecutive requests
    pub request_delay: Duration,
    /// Request timeout in seconds
    pub timeout: u64,
    pub mobile_os: String,
    pub mobile_app: String,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            rows_per_page: 200,
            request_delay: Duration::from_millis(300),
            timeout: 30,
            mobile_os: "ETC".to_string(),
            mobile_app: "AppTest".to_string(),
            user_agent: format!("tourdata/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn from_settings(settings: &ApiSettings, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: settings.base_url.clone(),
            rows_per_page: settings.rows_per_page,
            request_delay: settings.request_delay(),
            timeout: settings.timeout_secs,
            mobile_os: settings.mobile_os.clone(),
            mobile_app: settings.mobile_app.clone(),
            ..Default::default()
        }
    }
}

/// Number of pages needed to cover `total_count` rows
pub fn page_count(total_count: u32, rows_per_page: u32) -> u32 {
    if rows_per_page == 0 {
        return 0;
    }
    total_count.div_ceil(rows_per_page)
}

/// HTTP implementation of [`TourApi`]
pub struct TourApiClient {
    config: ClientConfig,
    http_client: Client,
}

impl TourApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(TourError::NoApiKey);
        }
        if config.rows_per_page == 0 {
            return Err(TourError::Config("rows_per_page must be positive".to_string()));
        }
        let http_client = create_custom_client(config.timeout, &config.user_agent)?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn build_params(&self, page_no: u32, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut params = vec![
            ("serviceKey".to_string(), self.config.api_key.clone()),
            ("numOfRows".to_string(), self.config.rows_per_page.to_string()),
            ("pageNo".to_string(), page_no.to_string()),
            ("MobileOS".to_string(), self.config.mobile_os.clone()),
            ("MobileApp".to_string(), self.config.mobile_app.clone()),
            ("_type".to_string(), "json".to_string()),
        ];
        params.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        params
    }

    /// Issue one GET and decode the response body
    async fn fetch_page(
        &self,
        domain: ApiDomain,
        lang: Lang,
        page_no: u32,
        extra: &[(&str, &str)],
    ) -> Result<ResponseBody> {
        let endpoint = endpoint_url(&self.config.base_url, domain, lang);
        let url = reqwest::Url::parse_with_params(&endpoint, &self.build_params(page_no, extra))
            .map_err(|e| TourError::Parse(e.to_string()))?;

        debug!(
            "GET {} [{}] page={} {:?}",
            domain.as_str(),
            lang.as_str(),
            page_no,
            extra
        );

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TourError::Http {
                status: status.as_u16(),
                url: endpoint,
            });
        }

        let text = response.text().await?;

        // Key and quota failures come back as XML regardless of _type
        if text.trim_start().starts_with('<') {
            return Err(TourError::Api {
                code: "INVALID_RESPONSE".to_string(),
                message: format!(
                    "API returned XML instead of JSON: {}",
                    text.chars().take(200).collect::<String>()
                ),
            });
        }

        let envelope: ApiEnvelope = serde_json::from_str(&text).map_err(|e| {
            TourError::Parse(format!(
                "Failed to parse API response as JSON: {}. Response starts with: {}",
                e,
                text.chars().take(100).collect::<String>()
            ))
        })?;

        if let Some(header) = &envelope.response.header {
            if !header.is_success() {
                return Err(TourError::Api {
                    code: header.result_code.clone(),
                    message: header.result_msg.clone(),
                });
            }
        }

        Ok(envelope.response.body)
    }
}

#[async_trait]
impl TourApi for TourApiClient {
    async fn fetch_all_pages(
        &self,
        domain: ApiDomain,
        lang: Lang,
        extra: &[(&str, &str)],
    ) -> Result<Vec<RawItem>> {
        let first = self.fetch_page(domain, lang, 1, extra).await?;
        if first.total_count == 0 {
            return Ok(Vec::new());
        }

        let total_pages = page_count(first.total_count, self.config.rows_per_page);
        let mut items = first.items;

        for page_no in 2..=total_pages {
            self.pause().await;
            let body = self.fetch_page(domain, lang, page_no, extra).await?;
            if body.items.is_empty() {
                warn!(
                    "{} [{}] page {}/{} returned no items",
                    domain.as_str(),
                    lang.as_str(),
                    page_no,
                    total_pages
                );
            }
            items.extend(body.items);
        }

        Ok(items)
    }

    async fn fetch_single(
        &self,
        domain: ApiDomain,
        lang: Lang,
        extra: &[(&str, &str)],
    ) -> Result<Vec<RawItem>> {
        Ok(self.fetch_page(domain, lang, 1, extra).await?.items)
    }

    async fn pause(&self) {
        if !self.config.request_delay.is_zero() {
            sleep(self.config.request_delay).await;
        }
    }
}
