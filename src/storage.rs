//! Local persistence for the roster and the settings.
//!
//! Each record lives in its own file under the storage root:
//!
//! ```text
//! <root>/
//!   roster.json      # Locomotive table
//!   settings.json    # Global options
//! ```
//!
//! A missing file is a valid default record.

use std::{fs, io, path::PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{model::Settings, roster::Roster};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// The fixed keys the store is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Roster,
    Settings,
}

impl Record {
    fn file_name(self) -> &'static str {
        match self {
            Self::Roster => "roster.json",
            Self::Settings => "settings.json",
        }
    }
}

/// On-disk wrapper recording when a record was last written.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document<T> {
    saved_at: Timestamp,
    #[serde(flatten)]
    body: T,
}

/// Local file-based storage for the console state.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.wmc/state/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wmc").join("state"))
    }

    /// Loads the locomotive table, empty if never saved.
    pub fn load_roster(&self) -> Result<Roster> {
        self.load(Record::Roster)
    }

    pub fn save_roster(&self, roster: &Roster) -> Result<()> {
        self.save(Record::Roster, roster)
    }

    /// Loads the settings, defaults if never saved.
    pub fn load_settings(&self) -> Result<Settings> {
        self.load(Record::Settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save(Record::Settings, settings)
    }

    fn load<T: DeserializeOwned + Default>(&self, record: Record) -> Result<T> {
        let json = match fs::read_to_string(self.path(record)) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        let document: Document<T> = serde_json::from_str(&json)?;
        Ok(document.body)
    }

    /// Writes through a temporary file so a crash never leaves half a record.
    fn save<T: Serialize>(&self, record: Record, body: &T) -> Result<()> {
        let document = Document {
            saved_at: Timestamp::now(),
            body,
        };
        let json = serde_json::to_string_pretty(&document)?;
        let path = self.path(record);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn path(&self, record: Record) -> PathBuf {
        self.root.join(record.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;

    use tempfile::TempDir;

    use crate::roster::LocomotiveRegistry;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("state")).unwrap();
        (dir, storage)
    }

    #[test]
    fn missing_files_load_as_defaults() {
        let (_dir, storage) = test_storage();

        assert!(storage.load_roster().unwrap().is_empty());
        assert_eq!(storage.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn save_and_load_roster() {
        let (_dir, storage) = test_storage();
        let mut roster = Roster::default();
        roster.add(3, &[0, 1, 2, 3, 4]).unwrap();
        roster.set_name(3, "BR 218").unwrap();

        storage.save_roster(&roster).unwrap();
        let loaded = storage.load_roster().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(0), roster.get(0));
    }

    #[test]
    fn save_and_load_settings() {
        let (_dir, storage) = test_storage();
        let mut settings = Settings::default();
        settings.emergency_stop = true;
        settings.network.peer = Ipv4Addr::new(10, 0, 0, 2);

        storage.save_settings(&settings).unwrap();

        assert_eq!(storage.load_settings().unwrap(), settings);
    }

    #[test]
    fn saved_file_carries_timestamp() {
        let (dir, storage) = test_storage();
        storage.save_settings(&Settings::default()).unwrap();

        let json = fs::read_to_string(dir.path().join("state").join("settings.json")).unwrap();
        assert!(json.contains("savedAt"));
        assert!(!dir.path().join("state").join("settings.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (dir, storage) = test_storage();
        fs::write(dir.path().join("state").join("roster.json"), "{not json").unwrap();

        let err = storage.load_roster().unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
