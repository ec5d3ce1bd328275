use crate::api::{ApiDomain, Lang};
use std::fmt;
use std::path::PathBuf;

/// Identifies one persisted upstream call: (domain, language, logical key)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawKey {
    pub domain: ApiDomain,
    pub lang: Lang,
    pub name: String,
}

impl RawKey {
    pub fn new(domain: ApiDomain, lang: Lang, name: impl Into<String>) -> Self {
        Self {
            domain,
            lang,
            name: name.into(),
        }
    }

    /// Top level of a code hierarchy
    pub fn depth1(domain: ApiDomain, lang: Lang) -> Self {
        Self::new(domain, lang, "depth1")
    }

    /// Children of a top-level code
    pub fn depth2(domain: ApiDomain, lang: Lang, parent: &str) -> Self {
        Self::new(domain, lang, format!("depth2_{}", sanitize(parent)))
    }

    /// Children of a second-level code
    pub fn depth3(domain: ApiDomain, lang: Lang, parent: &str) -> Self {
        Self::new(domain, lang, format!("depth3_{}", sanitize(parent)))
    }

    /// One (content type, administrative code) pair of the area-based listing
    pub fn area_pair(lang: Lang, content_type: &str, region_code: &str) -> Self {
        Self::new(
            ApiDomain::AreaBased,
            lang,
            format!("ct{}_rg{}", sanitize(content_type), sanitize(region_code)),
        )
    }

    /// Path of the cache file relative to the raw root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.domain.as_str())
            .join(self.lang.as_str())
            .join(format!("{}.json", self.name))
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.domain.as_str(), self.lang.as_str(), self.name)
    }
}

/// Upstream codes are alphanumeric; anything else must not escape the cache dir
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
