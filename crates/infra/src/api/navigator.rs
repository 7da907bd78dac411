//! Redirect-on-session-loss hook
//!
//! The client does not own routing. When a session is lost it asks the host
//! (dashboard shell, CLI, test harness) to move to the login entry point
//! through a [`Navigator`].

use crmdesk_domain::constants::{AUTH_AREA_PREFIX, LOGIN_ROUTE};
use tracing::{debug, info};

/// Host navigation surface
pub trait Navigator: Send + Sync {
    /// Current route, when the host has one
    fn current_path(&self) -> Option<String>;

    /// Move the host to `path`
    fn navigate(&self, path: &str);
}

/// Navigator for headless hosts: records nothing, only logs the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn current_path(&self) -> Option<String> {
        None
    }

    fn navigate(&self, path: &str) {
        info!(path, "Navigation requested after session loss");
    }
}

/// Send the host to the login route unless it is already in the auth area.
pub(crate) fn redirect_to_login(navigator: &dyn Navigator) {
    let current = navigator.current_path();
    if current.as_deref().is_some_and(|path| path.starts_with(AUTH_AREA_PREFIX)) {
        debug!(current = ?current, "Already inside auth area; skipping redirect");
        return;
    }

    navigator.navigate(LOGIN_ROUTE);
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        current: Option<String>,
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for Recorder {
        fn current_path(&self) -> Option<String> {
            self.current.clone()
        }

        fn navigate(&self, path: &str) {
            self.visited.lock().push(path.to_string());
        }
    }

    #[test]
    fn redirects_from_dashboard_routes() {
        let nav = Recorder { current: Some("/customers/42".into()), ..Default::default() };
        redirect_to_login(&nav);
        assert_eq!(*nav.visited.lock(), vec!["/auth/login".to_string()]);
    }

    #[test]
    fn redirects_when_host_has_no_route() {
        let nav = Recorder::default();
        redirect_to_login(&nav);
        assert_eq!(nav.visited.lock().len(), 1);
    }

    #[test]
    fn stays_put_inside_auth_area() {
        let nav = Recorder { current: Some("/auth/register".into()), ..Default::default() };
        redirect_to_login(&nav);
        assert!(nav.visited.lock().is_empty());
    }
}
