use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_RECENTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentConnection {
    pub url: String,
    pub username: String,
}

impl RecentConnection {
    #[must_use]
    pub fn new(url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecentsError {
    #[error("config directory is unavailable for this platform")]
    ConfigDirUnavailable,
    #[error("failed to read recents file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse recents file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to create config directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize recents: {source}")]
    Serialize {
        #[source]
        source: toml::ser::Error,
    },
    #[error("failed to write recents file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentsDocument {
    #[serde(default)]
    connections: Vec<RecentConnection>,
}

impl RecentsDocument {
    fn normalize(&mut self) {
        let mut seen = BTreeSet::new();
        self.connections.retain(|connection| {
            seen.insert((connection.url.clone(), connection.username.clone()))
        });
        self.connections.truncate(MAX_RECENTS);
    }
}

#[derive(Debug, Clone)]
pub struct FileRecentsStore {
    path: PathBuf,
    connections: Vec<RecentConnection>,
}

impl FileRecentsStore {
    pub fn load_default() -> Result<Self, RecentsError> {
        let path = default_recents_path()?;
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl Into<PathBuf>) -> Result<Self, RecentsError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                connections: Vec::new(),
            });
        }

        let raw = fs::read_to_string(&path).map_err(|source| RecentsError::Read {
            path: path.clone(),
            source,
        })?;

        if raw.trim().is_empty() {
            return Ok(Self {
                path,
                connections: Vec::new(),
            });
        }

        let mut doc: RecentsDocument =
            toml::from_str(&raw).map_err(|source| RecentsError::Parse {
                path: path.clone(),
                source,
            })?;
        doc.normalize();

        Ok(Self {
            path,
            connections: doc.connections,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn connections(&self) -> &[RecentConnection] {
        &self.connections
    }

    pub fn record(&mut self, url: impl Into<String>, username: impl Into<String>) {
        let connection = RecentConnection::new(url, username);
        self.connections.retain(|existing| existing != &connection);
        self.connections.insert(0, connection);
        self.connections.truncate(MAX_RECENTS);
    }

    pub fn persist(&self) -> Result<(), RecentsError> {
        if let Some(parent_dir) = self.path.parent() {
            fs::create_dir_all(parent_dir).map_err(|source| RecentsError::CreateDir {
                path: parent_dir.to_path_buf(),
                source,
            })?;
        }

        let doc = RecentsDocument {
            connections: self.connections.clone(),
        };
        let rendered =
            toml::to_string_pretty(&doc).map_err(|source| RecentsError::Serialize { source })?;

        fs::write(&self.path, rendered).map_err(|source| RecentsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

pub fn default_recents_path() -> Result<PathBuf, RecentsError> {
    let base_dir = if let Some(custom) = env::var_os("SCRY_CONFIG_DIR") {
        PathBuf::from(custom)
    } else if cfg!(target_os = "windows") {
        env::var_os("APPDATA")
            .map(PathBuf::from)
            .ok_or(RecentsError::ConfigDirUnavailable)?
    } else if let Some(xdg_config_home) = env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home)
    } else {
        let home = env::var_os("HOME").ok_or(RecentsError::ConfigDirUnavailable)?;
        PathBuf::from(home).join(".config")
    };

    Ok(base_dir.join("scry").join("recents.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::FileRecentsStore;

    fn temp_recents_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("recents.toml")
    }

    #[test]
    fn missing_recents_file_loads_empty_store() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);

        let store = FileRecentsStore::load_from_path(path).expect("failed to load store");
        assert!(store.connections().is_empty());
    }

    #[test]
    fn record_persist_and_reload_keeps_most_recent_first() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);

        let mut store = FileRecentsStore::load_from_path(&path).expect("failed to load store");
        store.record("http://one:9925", "admin");
        store.record("http://two:9925", "admin");
        store.persist().expect("failed to persist store");

        let reloaded = FileRecentsStore::load_from_path(&path).expect("failed to reload");
        assert_eq!(reloaded.connections().len(), 2);
        assert_eq!(reloaded.connections()[0].url, "http://two:9925");
        assert_eq!(reloaded.connections()[1].url, "http://one:9925");
    }

    #[test]
    fn re_recording_moves_the_pair_to_the_front() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);

        let mut store = FileRecentsStore::load_from_path(path).expect("failed to load store");
        store.record("http://one:9925", "admin");
        store.record("http://two:9925", "admin");
        store.record("http://one:9925", "admin");

        assert_eq!(store.connections().len(), 2);
        assert_eq!(store.connections()[0].url, "http://one:9925");

        store.record("http://one:9925", "reader");
        assert_eq!(store.connections().len(), 3);
        assert_eq!(store.connections()[0].username, "reader");
    }

    #[test]
    fn store_is_capped_at_ten_entries() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);

        let mut store = FileRecentsStore::load_from_path(path).expect("failed to load store");
        for index in 0..12 {
            store.record(format!("http://host-{index}:9925"), "admin");
        }

        assert_eq!(store.connections().len(), 10);
        assert_eq!(store.connections()[0].url, "http://host-11:9925");
        assert_eq!(store.connections()[9].url, "http://host-2:9925");
    }

    #[test]
    fn duplicate_entries_in_the_file_are_normalized_on_load() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);
        fs::write(
            &path,
            concat!(
                "[[connections]]\n",
                "url = \"http://one:9925\"\n",
                "username = \"admin\"\n\n",
                "[[connections]]\n",
                "url = \"http://one:9925\"\n",
                "username = \"admin\"\n\n",
                "[[connections]]\n",
                "url = \"http://two:9925\"\n",
                "username = \"admin\"\n",
            ),
        )
        .expect("failed to seed recents file");

        let store = FileRecentsStore::load_from_path(path).expect("failed to load store");
        assert_eq!(store.connections().len(), 2);
        assert_eq!(store.connections()[0].url, "http://one:9925");
        assert_eq!(store.connections()[1].url, "http://two:9925");
    }

    #[test]
    fn blank_file_loads_empty_store() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_recents_path(&temp_dir);
        fs::write(&path, "\n\n").expect("failed to seed recents file");

        let store = FileRecentsStore::load_from_path(path).expect("failed to load store");
        assert!(store.connections().is_empty());
    }
}
