//! Fetch stages: recursive descent over the code hierarchies and the
//! area-based cross product. Every call is persisted to the raw cache.

pub mod area_based;
pub mod category;
pub mod ldong;

pub use area_based::fetch_area_based;
pub use category::fetch_category_code;
pub use ldong::fetch_ldong_code;

use std::collections::BTreeMap;

use crate::api::types::RawItem;

/// Raw items of one code hierarchy in one language.
///
/// `depth2` is keyed by the top-level parent code, `depth3` by the
/// second-level parent code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeLevels {
    pub depth1: Vec<RawItem>,
    pub depth2: BTreeMap<String, Vec<RawItem>>,
    pub depth3: BTreeMap<String, Vec<RawItem>>,
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::api::types::RawItem;
    use crate::api::{ApiDomain, Lang, TourApi};
    use crate::error::{Result, TourError};

    /// Request key: `<domain>/<lang>?k=v&k=v` with the extra parameters only
    pub fn request_key(domain: ApiDomain, lang: Lang, extra: &[(&str, &str)]) -> String {
        let query: Vec<String> = extra.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}/{}?{}", domain.as_str(), lang.as_str(), query.join("&"))
    }

    pub fn items(value: serde_json::Value) -> Vec<RawItem> {
        serde_json::from_value(value).unwrap()
    }

    /// Canned responses keyed by request; unknown requests return no items
    #[derive(Default)]
    pub struct ScriptedApi {
        responses: HashMap<String, Vec<RawItem>>,
        failing: Option<String>,
        calls: Mutex<Vec<String>>,
        pauses: AtomicUsize,
    }

    impl ScriptedApi {
        pub fn respond(mut self, key: &str, items: Vec<RawItem>) -> Self {
            self.responses.insert(key.to_string(), items);
            self
        }

        pub fn fail_on(mut self, key: &str) -> Self {
            self.failing = Some(key.to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn pauses(&self) -> usize {
            self.pauses.load(Ordering::SeqCst)
        }

        fn answer(&self, domain: ApiDomain, lang: Lang, extra: &[(&str, &str)]) -> Result<Vec<RawItem>> {
            let key = request_key(domain, lang, extra);
            self.calls.lock().unwrap().push(key.clone());
            if self.failing.as_deref() == Some(key.as_str()) {
                return Err(TourError::Http {
                    status: 500,
                    url: key,
                });
            }
            Ok(self.responses.get(&key).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl TourApi for ScriptedApi {
        async fn fetch_all_pages(
            &self,
            domain: ApiDomain,
            lang: Lang,
            extra: &[(&str, &str)],
        ) -> Result<Vec<RawItem>> {
            self.answer(domain, lang, extra)
        }

        async fn fetch_single(
            &self,
            domain: ApiDomain,
            lang: Lang,
            extra: &[(&str, &str)],
        ) -> Result<Vec<RawItem>> {
            self.answer(domain, lang, extra)
        }

        async fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
    }
}
