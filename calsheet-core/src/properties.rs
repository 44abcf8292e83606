//! Persisted key-value settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CalSheetError, CalSheetResult};

/// A flat string-to-string settings store.
pub trait PropertyStore {
    fn get(&self, key: &str) -> CalSheetResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CalSheetResult<()>;
    fn delete(&mut self, key: &str) -> CalSheetResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProperties {
    values: BTreeMap<String, String>,
}

impl MemoryProperties {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for MemoryProperties {
    fn get(&self, key: &str) -> CalSheetResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CalSheetResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> CalSheetResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Properties stored as a JSON object in a single file.
/// The file is re-read on every access and replaced atomically on write.
pub struct PropertyFile {
    path: PathBuf,
}

impl PropertyFile {
    pub fn new(path: &Path) -> Self {
        PropertyFile {
            path: path.to_path_buf(),
        }
    }

    fn load(&self) -> CalSheetResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            CalSheetError::Properties(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> CalSheetResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(values)?;
        let temp = self.path.with_extension("json.tmp");

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl PropertyStore for PropertyFile {
    fn get(&self, key: &str) -> CalSheetResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> CalSheetResult<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn delete(&mut self, key: &str) -> CalSheetResult<()> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calsheet/properties.json");

        let mut props = PropertyFile::new(&path);
        assert_eq!(props.get("CALENDAR_IDS").unwrap(), None);

        props.set("CALENDAR_IDS", r#"["a"]"#).unwrap();
        props.set("DAILY_TRIGGER_HOUR", "5").unwrap();

        let reopened = PropertyFile::new(&path);
        assert_eq!(reopened.get("CALENDAR_IDS").unwrap().as_deref(), Some(r#"["a"]"#));

        props.delete("CALENDAR_IDS").unwrap();
        assert_eq!(reopened.get("CALENDAR_IDS").unwrap(), None);
        assert_eq!(reopened.get("DAILY_TRIGGER_HOUR").unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_corrupt_property_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("properties.json");
        std::fs::write(&path, "{not json").unwrap();

        let props = PropertyFile::new(&path);
        assert!(matches!(props.get("x"), Err(CalSheetError::Properties(_))));
    }
}
