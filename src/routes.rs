//! Application routes and the navigation seam.
//!
//! The API client never prints or exits on its own; when the session dies it
//! asks its [`Navigator`] to replace the current route with [`Route::Login`].

use std::fmt;

use crate::api::ApiError;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Folders(String),
    Document(String),
    Search,
    PublicPreview(String),
}

impl Route {
    /// Landing route for a signed-in user.
    pub fn home() -> Self {
        Route::Folders("root".to_string())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str("/login"),
            Route::Register => f.write_str("/register"),
            Route::Folders(id) => write!(f, "/folders/{}", id),
            Route::Document(id) => write!(f, "/documents/{}", id),
            Route::Search => f.write_str("/search"),
            Route::PublicPreview(token) => write!(f, "/public/{}", token),
        }
    }
}

pub trait Navigator: Send + Sync {
    /// Replace the current route (no history entry).
    fn replace(&self, route: Route);
}

/// Navigator for the command-line front end: routes map onto commands, so
/// navigating means telling the user what to run next.
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn replace(&self, route: Route) {
        log::debug!("Navigating to {}", route);
        match route {
            Route::Login => eprintln!("Not signed in. Run `docvault login` to sign in."),
            Route::Register => eprintln!("Run `docvault register` to create an account."),
            Route::Folders(id) => eprintln!("Run `docvault folders ls {}` to continue.", id),
            Route::Document(id) => eprintln!("Run `docvault docs show {}` to continue.", id),
            Route::Search => eprintln!("Run `docvault search <query>` to continue."),
            Route::PublicPreview(token) => eprintln!("Run `docvault share open {}` to continue.", token),
        }
    }
}

/// Guard for commands that need a signed-in user: without a stored access
/// token, navigate to login and fail.
pub fn require_session(session: &Session, navigator: &dyn Navigator) -> Result<(), ApiError> {
    if session.is_authenticated() {
        Ok(())
    } else {
        navigator.replace(Route::Login);
        Err(ApiError::NotAuthenticated)
    }
}

/// Navigator that records every route, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: std::sync::Mutex<Vec<Route>>,
}

#[cfg(test)]
impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn replace(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}
