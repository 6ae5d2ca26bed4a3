//! Runtime configuration: API base URL and session storage backend.
//!
//! Values come from command-line flags first, then the environment (a `.env`
//! file is loaded into it at startup), then built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use thiserror::Error;

use crate::session::file::SESSION_FILE_NAME;
use crate::session::{FileStore, MemoryStore, SessionStore};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Environment variables consulted for the API URL, in order.
pub const API_URL_VARS: [&str; 2] = ["DOCVAULT_API_URL", "VITE_API_URL"];

const CONFIG_DIR_NAME: &str = "docvault";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user config directory; pass --session-file")]
    NoConfigDir,
    #[cfg(not(feature = "keychain"))]
    #[error("this build has no keychain support; use --store file")]
    KeychainUnavailable,
}

/// Where the session is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreKind {
    /// JSON file in the user config directory.
    #[default]
    File,
    /// One OS keychain entry per session key.
    Keychain,
    /// Process memory only; every run starts signed out.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub store: StoreKind,
    pub session_file: Option<PathBuf>,
}

impl Config {
    /// Resolve the configuration from flag values and an environment lookup.
    pub fn resolve(
        api_url: Option<String>,
        store: StoreKind,
        session_file: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                API_URL_VARS
                    .iter()
                    .filter_map(|var| env(var))
                    .find(|url| !url.trim().is_empty())
            })
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            store,
            session_file,
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(api_url: Option<String>, store: StoreKind, session_file: Option<PathBuf>) -> Self {
        Self::resolve(api_url, store, session_file, |var| std::env::var(var).ok())
    }

    /// Session file location: the explicit path or `<config dir>/docvault/session.json`.
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(CONFIG_DIR_NAME).join(SESSION_FILE_NAME))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Open the configured session store.
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>, ConfigError> {
        match self.store {
            StoreKind::File => {
                let path = self.session_path()?;
                log::debug!("Using session file {}", path.display());
                Ok(Arc::new(FileStore::new(path)))
            }
            #[cfg(feature = "keychain")]
            StoreKind::Keychain => Ok(Arc::new(crate::session::KeychainStore::new())),
            #[cfg(not(feature = "keychain"))]
            StoreKind::Keychain => Err(ConfigError::KeychainUnavailable),
            StoreKind::Memory => Ok(Arc::new(MemoryStore::default())),
        }
    }
}
