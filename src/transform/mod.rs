//! Transform stages: raw upstream items to the bilingual output schema.

pub mod categories;
pub mod pois;
pub mod regions;
pub mod tables;

use serde::{Deserialize, Serialize};

use crate::api::Lang;

/// Display name in both languages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BilingualName {
    pub ko: String,
    pub en: String,
}

impl BilingualName {
    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Kr => &self.ko,
            Lang::En => &self.en,
        }
    }
}
