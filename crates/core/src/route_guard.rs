//! Navigation guard for the admin console.
//!
//! The guard is a small state machine over a single suspended navigation:
//! an anonymous (or non-admin) visitor asking for an admin page is sent to
//! the login screen and the requested path is remembered; after a
//! successful login the remembered path is handed out exactly once.
//!
//! The guard holds no session state itself. Callers pass the current
//! [`SessionState`] in and persist the [`PendingRedirect`] wherever it
//! survives the identity's lifecycle.

use serde::{Deserialize, Serialize};

/// What the guard knows about the visitor when a navigation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Identity lookup has not finished yet.
    Loading,
    /// A signed-in user.
    Authenticated {
        /// Whether the user holds the admin role.
        is_admin: bool,
    },
    /// Nobody is signed in.
    Anonymous,
}

/// Outcome of checking one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity is still loading; render nothing and re-check.
    Wait,
    /// Admin session; let the navigation through.
    Allow,
    /// Send the visitor to the login screen.
    RedirectToLogin {
        /// Login screen path.
        login_path: String,
        /// Path to remember for after login, when it is safe to return to.
        remember: Option<String>,
    },
}

/// A remembered destination waiting for the next successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingRedirect(Option<String>);

impl PendingRedirect {
    /// An empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Remember `path`, replacing anything remembered earlier.
    pub fn remember(&mut self, path: impl Into<String>) {
        self.0 = Some(path.into());
    }

    /// Take the remembered path, leaving the slot empty.
    pub const fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<String>> for PendingRedirect {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

/// Role-gated guard for admin console navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    landing_path: String,
}

impl RouteGuard {
    /// Login screen path used when none is configured.
    pub const DEFAULT_LOGIN_PATH: &'static str = "/login";

    /// Post-login landing page used when none is configured.
    pub const DEFAULT_LANDING_PATH: &'static str = "/admin";

    /// Create a guard with explicit login and landing paths.
    #[must_use]
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    /// The login screen path.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The default post-login destination.
    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Decide what to do with a navigation to `requested_path`.
    #[must_use]
    pub fn check(&self, state: SessionState, requested_path: &str) -> GuardDecision {
        match state {
            SessionState::Loading => GuardDecision::Wait,
            SessionState::Authenticated { is_admin: true } => GuardDecision::Allow,
            SessionState::Authenticated { is_admin: false } | SessionState::Anonymous => {
                GuardDecision::RedirectToLogin {
                    login_path: self.login_path.clone(),
                    remember: self.is_returnable(requested_path).then(|| requested_path.to_owned()),
                }
            }
        }
    }

    /// Record the outcome of [`Self::check`] into `pending`.
    ///
    /// Only a redirect with a safe path changes the slot.
    pub fn record(decision: &GuardDecision, pending: &mut PendingRedirect) {
        if let GuardDecision::RedirectToLogin {
            remember: Some(path),
            ..
        } = decision
        {
            pending.remember(path.clone());
        }
    }

    /// Consume the remembered destination after a successful login.
    ///
    /// Falls back to the landing page when nothing was remembered.
    #[must_use]
    pub fn after_login(&self, pending: &mut PendingRedirect) -> String {
        pending
            .take()
            .filter(|path| self.is_returnable(path))
            .unwrap_or_else(|| self.landing_path.clone())
    }

    /// Same-site absolute paths only, never the login screen itself.
    fn is_returnable(&self, path: &str) -> bool {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.chars().any(char::is_control)
            && path.split(['?', '#']).next() != Some(self.login_path.as_str())
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOGIN_PATH, Self::DEFAULT_LANDING_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(remember: Option<&str>) -> GuardDecision {
        GuardDecision::RedirectToLogin {
            login_path: "/login".to_owned(),
            remember: remember.map(str::to_owned),
        }
    }

    #[test]
    fn loading_waits() {
        let guard = RouteGuard::default();
        assert_eq!(guard.check(SessionState::Loading, "/admin/users"), GuardDecision::Wait);
    }

    #[test]
    fn admin_is_allowed() {
        let guard = RouteGuard::default();
        let state = SessionState::Authenticated { is_admin: true };
        assert_eq!(guard.check(state, "/admin/users"), GuardDecision::Allow);
    }

    #[test]
    fn anonymous_and_non_admin_are_redirected_with_path() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.check(SessionState::Anonymous, "/admin/settings?tab=seo"),
            redirect(Some("/admin/settings?tab=seo"))
        );
        assert_eq!(
            guard.check(SessionState::Authenticated { is_admin: false }, "/admin"),
            redirect(Some("/admin"))
        );
    }

    #[test]
    fn unsafe_paths_are_not_remembered() {
        let guard = RouteGuard::default();
        for path in ["https://evil.example", "//evil.example", "/\\evil", "/login", "/login?x=1"] {
            assert_eq!(guard.check(SessionState::Anonymous, path), redirect(None), "{path}");
        }
    }

    #[test]
    fn remembered_path_is_consumed_exactly_once() {
        let guard = RouteGuard::default();
        let mut pending = PendingRedirect::empty();

        let decision = guard.check(SessionState::Anonymous, "/admin/users/7");
        RouteGuard::record(&decision, &mut pending);

        assert_eq!(guard.after_login(&mut pending), "/admin/users/7");
        assert!(pending.is_empty());
        assert_eq!(guard.after_login(&mut pending), "/admin");
    }

    #[test]
    fn later_navigation_replaces_earlier_one() {
        let guard = RouteGuard::new("/signin", "/dashboard");
        let mut pending = PendingRedirect::empty();
        RouteGuard::record(&guard.check(SessionState::Anonymous, "/a"), &mut pending);
        RouteGuard::record(&guard.check(SessionState::Anonymous, "/b"), &mut pending);
        assert_eq!(guard.after_login(&mut pending), "/b");
        assert_eq!(guard.after_login(&mut pending), "/dashboard");
    }

    #[test]
    fn tampered_pending_path_falls_back_to_landing() {
        let guard = RouteGuard::default();
        let mut pending = PendingRedirect::from(Some("//evil.example".to_owned()));
        assert_eq!(guard.after_login(&mut pending), "/admin");
    }
}
