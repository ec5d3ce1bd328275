use serde::Deserialize;
use serde_json::{Map, Value};

use super::deserializers::{items_wrapper, lenient_string, lenient_u32, value_to_string};

/// A raw upstream item, kept verbatim so it can be replayed from the raw cache
pub type RawItem = Map<String, Value>;

/// Result codes the upstream uses for a successful call
const SUCCESS_CODES: [&str; 2] = ["0000", "00"];

/// Response envelope: `{response: {header, body: {totalCount, items}}}`
#[derive(Debug, Deserialize, Default)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub response: ApiResponse,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub header: Option<ResponseHeader>,
    #[serde(default)]
    pub body: ResponseBody,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResponseHeader {
    #[serde(rename = "resultCode", default, deserialize_with = "lenient_string")]
    pub result_code: String,
    #[serde(rename = "resultMsg", default, deserialize_with = "lenient_string")]
    pub result_msg: String,
}

impl ResponseHeader {
    pub fn is_success(&self) -> bool {
        self.result_code.is_empty() || SUCCESS_CODES.contains(&self.result_code.as_str())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ResponseBody {
    #[serde(rename = "totalCount", default, deserialize_with = "lenient_u32")]
    pub total_count: u32,
    #[serde(default, deserialize_with = "items_wrapper")]
    pub items: Vec<RawItem>,
}

/// Read a field as text, falling back to `fallback` only when `key` is absent
pub fn field_or(item: &RawItem, key: &str, fallback: &str) -> String {
    item.get(key)
        .or_else(|| item.get(fallback))
        .map(value_to_string)
        .unwrap_or_default()
}

/// Read a field as text; absent fields are empty
pub fn field(item: &RawItem, key: &str) -> String {
    item.get(key).map(value_to_string).unwrap_or_default()
}
