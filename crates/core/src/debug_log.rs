use std::collections::BTreeSet;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recent_connections::{default_recents_path, RecentsError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugRecord {
    pub timestamp_unix_ms: u128,
    pub namespace: String,
    pub message: String,
}

#[must_use]
pub fn unix_timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceFilter {
    Disabled,
    All,
    Namespaces(BTreeSet<String>),
}

impl NamespaceFilter {
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(env::var("SCRY_DEBUG").ok().as_deref())
    }

    #[must_use]
    pub fn parse(spec: Option<&str>) -> Self {
        let Some(spec) = spec else {
            return Self::Disabled;
        };
        if spec.trim().is_empty() {
            return Self::Disabled;
        }
        if spec.split(',').any(|entry| entry.trim() == "*") {
            return Self::All;
        }
        Self::Namespaces(
            spec.split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn enabled(&self, namespace: &str) -> bool {
        match self {
            Self::Disabled => false,
            Self::All => true,
            Self::Namespaces(namespaces) => namespaces.contains(namespace),
        }
    }
}

#[derive(Debug, Error)]
pub enum DebugLogError {
    #[error("failed to resolve default config path: {0}")]
    Config(#[from] RecentsError),
    #[error("invalid debug log path `{0}`")]
    InvalidPath(PathBuf),
    #[error("failed to create debug log directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize debug record: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to append debug record at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FileDebugLog {
    path: PathBuf,
    filter: NamespaceFilter,
}

impl FileDebugLog {
    pub fn load_default() -> Result<Self, DebugLogError> {
        Ok(Self {
            path: default_debug_path()?,
            filter: NamespaceFilter::from_env(),
        })
    }

    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>, filter: NamespaceFilter) -> Self {
        Self {
            path: path.into(),
            filter,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn filter(&self) -> &NamespaceFilter {
        &self.filter
    }

    pub fn append(&self, namespace: &str, message: impl Into<String>) -> Result<(), DebugLogError> {
        if !self.filter.enabled(namespace) {
            return Ok(());
        }

        let record = DebugRecord {
            timestamp_unix_ms: unix_timestamp_millis(),
            namespace: namespace.to_string(),
            message: message.into(),
        };
        self.append_record(&record)
    }

    fn append_record(&self, record: &DebugRecord) -> Result<(), DebugLogError> {
        let parent_dir = self
            .path
            .parent()
            .ok_or_else(|| DebugLogError::InvalidPath(self.path.clone()))?;
        fs::create_dir_all(parent_dir).map_err(|source| DebugLogError::CreateDir {
            path: parent_dir.to_path_buf(),
            source,
        })?;

        let rendered = serde_json::to_string(record)
            .map_err(|source| DebugLogError::Serialize { source })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| DebugLogError::Write {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{rendered}").map_err(|source| DebugLogError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn default_debug_path() -> Result<PathBuf, DebugLogError> {
    let recents_path = default_recents_path()?;
    let Some(config_dir) = recents_path.parent() else {
        return Err(DebugLogError::InvalidPath(recents_path));
    };
    Ok(config_dir.join("debug.ndjson"))
}
