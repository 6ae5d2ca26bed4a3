//! Client-side session storage.
//!
//! The session is a small set of string keys (`accessToken`, `refreshToken`,
//! `user`, `lang`) kept in a pluggable [`SessionStore`]. The [`Session`]
//! façade is what the API client and commands hold; it knows the key names
//! and the JSON shape of the stored user.

pub mod file;
#[cfg(feature = "keychain")]
pub mod keychain;
pub mod memory;

pub use file::FileStore;
#[cfg(feature = "keychain")]
pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::api::types::{LoginResponse, User};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";
pub const LANG_KEY: &str = "lang";

/// Keys removed on logout and on irrecoverable refresh failure.
/// `lang` is deliberately absent: the language choice outlives sessions.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("keychain operation failed: {0}")]
    Keychain(String),
}

/// String key/value storage backing the session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// UI language persisted under the `lang` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    En,
    #[default]
    Ar,
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    /// Text direction for the language.
    pub fn dir(self) -> &'static str {
        match self {
            Lang::En => "ltr",
            Lang::Ar => "rtl",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "ar" => Ok(Lang::Ar),
            other => Err(format!("unsupported language '{}' (expected en or ar)", other)),
        }
    }
}

/// Typed access to the stored session.
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, token)
    }

    /// The stored user, if any. A corrupt entry reads as no user.
    pub fn user(&self) -> Result<Option<User>, StoreError> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                log::warn!("Ignoring unreadable stored user: {}", e);
                Ok(None)
            }
        }
    }

    /// Whether an access token is present. Read failures count as logged out.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    /// Persist the tokens and user returned by signin.
    ///
    /// A login without a refresh token removes any stored one, so a stale
    /// token from an earlier session is never sent to the refresh endpoint.
    pub fn save_login(&self, login: &LoginResponse) -> Result<(), StoreError> {
        let access_token = login.access_token.as_deref().unwrap_or_default();
        let user = match &login.user {
            Some(user) => serde_json::to_string(user)?,
            None => "{}".to_string(),
        };
        self.store.set(ACCESS_TOKEN_KEY, access_token)?;
        match login.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            Some(refresh_token) => self.store.set(REFRESH_TOKEN_KEY, refresh_token)?,
            None => self.store.remove(REFRESH_TOKEN_KEY)?,
        }
        self.store.set(USER_KEY, &user)?;
        Ok(())
    }

    /// Remove every session key. Best effort: failures are logged, never returned.
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                log::warn!("Failed to remove '{}' from session store: {}", key, e);
            }
        }
    }

    pub fn lang(&self) -> Lang {
        match self.store.get(LANG_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => Lang::default(),
            Err(e) => {
                log::warn!("Failed to read language preference: {}", e);
                Lang::default()
            }
        }
    }

    pub fn set_lang(&self, lang: Lang) -> Result<(), StoreError> {
        self.store.set(LANG_KEY, lang.as_str())
    }

    /// Raw access to the underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose removals always fail, to check `clear` never propagates.
    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Keychain("locked".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Keychain("locked".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Keychain("locked".to_string()))
        }
    }

    fn login(access: Option<&str>, refresh: Option<&str>) -> LoginResponse {
        LoginResponse {
            access_token: access.map(str::to_string),
            refresh_token: refresh.map(str::to_string),
            user: Some(User {
                id: Some("u1".to_string()),
                name: Some("Amal".to_string()),
                email: Some("amal@example.com".to_string()),
            }),
            message: None,
        }
    }

    #[test]
    fn test_save_login_and_clear() {
        let session = Session::in_memory();
        session.save_login(&login(Some("A1"), Some("R1"))).unwrap();
        session.set_lang(Lang::En).unwrap();

        assert_eq!(session.access_token().unwrap().as_deref(), Some("A1"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("R1"));
        assert_eq!(
            session.user().unwrap().and_then(|u| u.email).as_deref(),
            Some("amal@example.com")
        );
        assert!(session.is_authenticated());

        session.clear();
        for key in SESSION_KEYS {
            assert_eq!(session.store().get(key).unwrap(), None, "{} not cleared", key);
        }
        assert!(!session.is_authenticated());
        // Language preference survives logout
        assert_eq!(session.lang(), Lang::En);
    }

    #[test]
    fn test_login_without_refresh_token_drops_stale_one() {
        let session = Session::in_memory();
        session.save_login(&login(Some("A0"), Some("R0"))).unwrap();

        session.save_login(&login(Some("A1"), None)).unwrap();
        assert_eq!(session.store().get(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(session.refresh_token().unwrap(), None);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("A1"));

        session.save_login(&login(Some("A2"), Some(""))).unwrap();
        assert_eq!(session.store().get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_swallows_store_errors() {
        let session = Session::new(Arc::new(BrokenStore));
        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.lang(), Lang::Ar);
    }

    #[test]
    fn test_corrupt_user_reads_as_none() {
        let session = Session::in_memory();
        session.store().set(USER_KEY, "{not json").unwrap();
        assert!(session.user().unwrap().is_none());
    }

    #[test]
    fn test_lang_parsing() {
        assert_eq!("EN".parse::<Lang>().unwrap(), Lang::En);
        assert_eq!("ar".parse::<Lang>().unwrap(), Lang::Ar);
        assert!("fr".parse::<Lang>().is_err());
        assert_eq!(Lang::Ar.dir(), "rtl");
        assert_eq!(Lang::En.dir(), "ltr");
    }

    #[test]
    fn test_lang_defaults_to_arabic() {
        let session = Session::in_memory();
        assert_eq!(session.lang(), Lang::Ar);
        session.store().set(LANG_KEY, "xx").unwrap();
        assert_eq!(session.lang(), Lang::Ar);
    }
}
