//! Application state for the docvault CLI.
//!
//! One `AppState` is built per invocation and handed to every command. It
//! owns the authenticated API client, which in turn owns the session and
//! the navigator.

use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::api::ApiError;
use crate::config::Config;
use crate::routes::{self, Navigator};
use crate::session::{Session, SessionStore};

pub struct AppState {
    /// HTTP client for docvault API communication.
    pub api: Arc<ApiClient>,

    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        let session = Session::new(store);
        Self {
            api: Arc::new(ApiClient::new(&config.api_url, session, navigator)),
            config,
        }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Fail with a login hint unless an access token is stored.
    pub fn require_session(&self) -> Result<(), ApiError> {
        routes::require_session(self.session(), self.api.navigator().as_ref())
    }
}
