//! Storage module for saving and loading card sets.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::exchange::parse_exchange;
use crate::models::{CardSet, ExchangeSet};

const SETS_FILE: &str = "sets.json";

/// Handles set persistence and single-set file exchange.
pub struct SetStorage {
    data_dir: PathBuf,
}

impl SetStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        Ok(Self { data_dir })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashmind")
    }

    /// Get default directory for exported sets.
    pub fn default_export_dir() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn sets_path(&self) -> PathBuf {
        self.data_dir.join(SETS_FILE)
    }

    /// Load the whole collection. `None` when nothing has been saved yet.
    ///
    /// A file that exists but does not parse is an error, so a corrupt
    /// collection is never silently replaced by the example set.
    pub fn load(&self) -> Result<Option<Vec<CardSet>>> {
        let path = self.sets_path();
        if !path.exists() {
            log::debug!("No saved sets at {:?}", path);
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read sets file: {:?}", path))?;
        let sets: Vec<CardSet> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse sets file: {:?}", path))?;
        log::debug!("Loaded {} sets from {:?}", sets.len(), path);
        Ok(Some(sets))
    }

    /// Save the whole collection.
    pub fn save(&self, sets: &[CardSet]) -> Result<PathBuf> {
        let path = self.sets_path();
        let json = serde_json::to_string_pretty(sets)?;
        fs::write(&path, json).with_context(|| format!("Failed to write sets file: {:?}", path))?;
        log::debug!("Saved {} sets to {:?}", sets.len(), path);
        Ok(path)
    }

    /// Delete the saved collection.
    pub fn clear(&self) -> Result<bool> {
        let path = self.sets_path();
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Write one set as an exchange document into `dir`.
    pub fn export_set(&self, set: &CardSet, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

        let path = dir.join(format!("{}.json", export_file_name(&set.name)));
        let json = serde_json::to_string_pretty(&set.to_exchange())?;
        fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
        log::info!("Exported '{}' to {:?}", set.name, path);
        Ok(path)
    }

    /// Read and validate an exchange document from disk.
    ///
    /// Validation failures surface as [`crate::FlashError`] inside the error chain.
    pub fn import_set(&self, path: &Path) -> Result<ExchangeSet> {
        let json =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let data = parse_exchange(&json)?;
        log::info!("Read '{}' with {} cards from {:?}", data.name, data.cards.len(), path);
        Ok(data)
    }
}

/// File stem for an exported set: every non-alphanumeric character becomes `_`.
fn export_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlashError;
    use crate::models::{Card, CardId, SetId};

    fn storage() -> (tempfile::TempDir, SetStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SetStorage::new(dir.path().join("data")).unwrap();
        (dir, storage)
    }

    fn sample() -> CardSet {
        CardSet::new(
            SetId(10),
            "Столиці Європи",
            vec![Card::new(CardId(1), "France", "Paris"), Card::new(CardId(2), "Spain", "Madrid")],
        )
    }

    #[test]
    fn test_load_without_file_is_none() {
        let (_dir, storage) = storage();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, storage) = storage();
        let mut set = sample();
        set.last_score = Some(67);
        storage.save(&[set.clone()]).unwrap();

        assert_eq!(storage.load().unwrap(), Some(vec![set]));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, storage) = storage();
        fs::write(storage.data_dir().join(SETS_FILE), "{ nope").unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_clear() {
        let (_dir, storage) = storage();
        assert!(!storage.clear().unwrap());
        storage.save(&[sample()]).unwrap();
        assert!(storage.clear().unwrap());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_export_writes_exchange_format() {
        let (dir, storage) = storage();
        let path = storage.export_set(&sample(), &dir.path().join("out")).unwrap();

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("Столиці_Європи.json"));
        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["name"], "Столиці Європи");
        assert_eq!(doc["cards"][1]["answer"], "Madrid");
        assert!(doc["cards"][0].get("id").is_none());
    }

    #[test]
    fn test_import_reads_exported_file() {
        let (dir, storage) = storage();
        let path = storage.export_set(&sample(), dir.path()).unwrap();
        let data = storage.import_set(&path).unwrap();
        assert_eq!(data, sample().to_exchange());
    }

    #[test]
    fn test_import_rejects_bad_documents() {
        let (dir, storage) = storage();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"cards": []}"#).unwrap();

        let err = storage.import_set(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlashError>(),
            Some(FlashError::MalformedImport(_))
        ));
        assert!(storage.import_set(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Verbs: past/present"), "Verbs__past_present");
        assert_eq!(export_file_name("Слова 2"), "Слова_2");
    }
}
