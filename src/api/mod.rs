pub mod client;
pub mod deserializers;
pub mod http_client;
pub mod types;

pub use client::{ClientConfig, TourApi, TourApiClient};

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://apis.data.go.kr/B551011";

/// Upstream API domains used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiDomain {
    /// Legal administrative-division codes (법정동 코드)
    LdongCode,
    /// Classification taxonomy (분류체계 코드)
    CategoryCode,
    /// Area-based POI listing (지역기반 관광정보)
    AreaBased,
}

impl ApiDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LdongCode => "ldong_code",
            Self::CategoryCode => "category_code",
            Self::AreaBased => "area_based",
        }
    }

    /// Operation path segment on the upstream service
    pub fn operation(&self) -> &'static str {
        match self {
            Self::LdongCode => "ldongCode2",
            Self::CategoryCode => "lclsSystmCode2",
            Self::AreaBased => "areaBasedList2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LdongCode => "법정동 코드",
            Self::CategoryCode => "분류체계 코드",
            Self::AreaBased => "지역기반 관광정보",
        }
    }
}

/// Language variant; each has its own upstream service rather than a query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Kr,
    En,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::Kr, Lang::En];

    /// Key used in file names and collection names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kr => "kr",
            Self::En => "en",
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Kr => "KorService2",
            Self::En => "EngService2",
        }
    }
}

/// Build the endpoint URL for a domain in a language
pub fn endpoint_url(base_url: &str, domain: ApiDomain, lang: Lang) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        lang.service(),
        domain.operation()
    )
}

/// A value held once per language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerLang<T> {
    pub kr: T,
    pub en: T,
}

impl<T> PerLang<T> {
    pub fn get(&self, lang: Lang) -> &T {
        match lang {
            Lang::Kr => &self.kr,
            Lang::En => &self.en,
        }
    }

    pub fn get_mut(&mut self, lang: Lang) -> &mut T {
        match lang {
            Lang::Kr => &mut self.kr,
            Lang::En => &mut self.en,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url(DEFAULT_BASE_URL, ApiDomain::LdongCode, Lang::Kr),
            "https://apis.data.go.kr/B551011/KorService2/ldongCode2"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:1234/", ApiDomain::AreaBased, Lang::En),
            "http://127.0.0.1:1234/EngService2/areaBasedList2"
        );
    }

    #[test]
    fn test_domain_names() {
        assert_eq!(ApiDomain::AreaBased.as_str(), "area_based");
        assert_eq!(ApiDomain::CategoryCode.operation(), "lclsSystmCode2");
        assert_eq!(ApiDomain::LdongCode.display_name(), "법정동 코드");
    }

    #[test]
    fn test_per_lang_access() {
        let mut value = PerLang { kr: 1, en: 2 };
        *value.get_mut(Lang::En) += 10;
        assert_eq!(*value.get(Lang::Kr), 1);
        assert_eq!(*value.get(Lang::En), 12);
    }
}
