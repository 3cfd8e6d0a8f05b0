//! Screen routing.
//!
//! The core only decides *where* to go; a [`Navigator`] implementation does
//! the actual switching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// A screen of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Register,
    Posts,
    Profile,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Posts => "/posts",
            Route::Profile => "/profile",
        }
    }

    /// Screens only reachable with an authenticated session.
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Posts | Route::Profile)
    }

    /// Where a signed-out user landing on `self` ends up.
    pub fn guarded(self, authenticated: bool) -> Route {
        match (self.requires_auth(), authenticated) {
            (true, false) => Route::Login,
            (false, true) if matches!(self, Route::Login | Route::Register) => Route::Posts,
            _ => self,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().copied())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "Navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_redirects() {
        assert_eq!(Route::Posts.guarded(false), Route::Login);
        assert_eq!(Route::Profile.guarded(true), Route::Profile);
        assert_eq!(Route::Login.guarded(true), Route::Posts);
        assert_eq!(Route::Register.guarded(false), Route::Register);
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert!(nav.current().is_none());

        nav.navigate(Route::Login);
        nav.navigate(Route::Posts);

        assert_eq!(nav.history(), vec![Route::Login, Route::Posts]);
        assert_eq!(nav.current(), Some(Route::Posts));
        assert_eq!(Route::Posts.to_string(), "/posts");
    }
}
