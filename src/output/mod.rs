//! Output directory: the transformed JSON files consumed downstream.

pub mod formatter;

pub use formatter::format_upsert_stats;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::api::Lang;
use crate::error::{Result, TourError};

/// File names written to the output directory
pub mod files {
    use crate::api::Lang;

    pub const REGIONS: &str = "regions.json";
    pub const CATEGORIES: &str = "categories.json";
    pub const CATEGORIES_DB: &str = "categories_db.json";
    pub const CONTENT_TYPES: &str = "content-types.json";

    pub fn area_based(lang: Lang) -> String {
        format!("area_based_{}.json", lang.as_str())
    }

    pub fn pois(lang: Lang) -> String {
        format!("pois_{}.json", lang.as_str())
    }

    pub fn pois_geo(lang: Lang) -> String {
        format!("pois_geo_{}.json", lang.as_str())
    }

    pub fn pois_exclude(lang: Lang) -> String {
        format!("pois_exclude_{}.json", lang.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Write a value as indented JSON, keeping non-ASCII text unescaped
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Read a JSON file; `None` when it does not exist
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&contents)
            .map_err(|e| TourError::Parse(format!("Invalid JSON in {}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    /// Read a JSON file an earlier stage must have produced
    pub fn require_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.read_json(name)?
            .ok_or_else(|| TourError::MissingOutput(self.path(name)))
    }

    pub fn area_based_path(&self, lang: Lang) -> PathBuf {
        self.path(&files::area_based(lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let output = OutputDir::new(dir.path().join("output"));

        let value = json!([{"code": "seoul", "name": {"ko": "서울", "en": "Seoul"}}]);
        let path = output.write_json(files::REGIONS, &value).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"서울\""));

        let read: Value = output.require_json(files::REGIONS).unwrap();
        assert_eq!(read, value);
    }

    #[test]
    fn test_missing_required_file() {
        let dir = tempdir().unwrap();
        let output = OutputDir::new(dir.path());

        let result: Result<Value> = output.require_json(files::CATEGORIES);
        match result {
            Err(TourError::MissingOutput(path)) => assert!(path.ends_with("categories.json")),
            other => panic!("expected MissingOutput, got {:?}", other),
        }
        assert!(output.read_json::<Value>(files::CATEGORIES).unwrap().is_none());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(files::pois(Lang::Kr), "pois_kr.json");
        assert_eq!(files::pois_geo(Lang::En), "pois_geo_en.json");
        assert_eq!(files::pois_exclude(Lang::Kr), "pois_exclude_kr.json");
        assert_eq!(files::area_based(Lang::En), "area_based_en.json");
    }
}
