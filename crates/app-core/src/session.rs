//! Cookie-based session management and the OAuth CSRF state guard.
//!
//! Both the authenticated session and the in-flight OAuth login attempt
//! live in private (encrypted and authenticated) cookies, so the browser
//! carries the state the way a server-side session store would. The state
//! token is single-use: it is cleared on a successful callback and left in
//! place on failure, where the next login attempt overwrites it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tower_cookies::cookie::time;
use tower_cookies::{Cookie, Cookies, Key};

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "__session";
pub const OAUTH_STATE_COOKIE: &str = "__oauth_state";

/// 32 bytes of entropy, URL-safe base64 encoded (43 characters).
const STATE_TOKEN_BYTES: usize = 32;

/// An abandoned login attempt expires with its cookie.
const STATE_MAX_AGE_MINUTES: i64 = 10;

/// One in-flight authorization-code exchange, bound to the browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthLoginAttempt {
    pub state: String,
    pub provider: String,
}

/// Issues and validates session cookies with a shared encryption key.
#[derive(Clone)]
pub struct SessionManager {
    key: Key,
}

impl SessionManager {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    /// Mints a fresh CSRF state token and stores it, together with the
    /// provider it was issued for, in the login-attempt cookie. Any
    /// previous attempt is overwritten.
    pub fn issue_state(&self, cookies: &Cookies, provider: &str) -> Result<String, AppError> {
        let mut bytes = [0u8; STATE_TOKEN_BYTES];
        rand::thread_rng().fill(&mut bytes);
        let state = URL_SAFE_NO_PAD.encode(bytes);

        let attempt = OAuthLoginAttempt {
            state: state.clone(),
            provider: provider.to_string(),
        };
        let value = serde_json::to_string(&attempt).map_err(|_| AppError::Internal)?;

        let cookie = Cookie::build((OAUTH_STATE_COOKIE, value))
            .http_only(true)
            .path("/")
            .max_age(time::Duration::minutes(STATE_MAX_AGE_MINUTES))
            .build();
        cookies.private(&self.key).add(cookie);

        Ok(state)
    }

    /// The stored login attempt, if any. A cookie that fails decryption or
    /// parsing is treated as absent.
    pub fn stored_attempt(&self, cookies: &Cookies) -> Option<OAuthLoginAttempt> {
        let cookie = cookies.private(&self.key).get(OAUTH_STATE_COOKIE)?;
        serde_json::from_str(cookie.value()).ok()
    }

    /// True only if a state was previously stored and exactly equals the
    /// returned value. Absence of a stored state is always invalid.
    pub fn state_matches(&self, cookies: &Cookies, returned: &str) -> bool {
        match self.stored_attempt(cookies) {
            Some(attempt) => constant_time_eq(&attempt.state, returned),
            None => false,
        }
    }

    /// Removes the login-attempt cookie, leaving all other session data
    /// untouched. Called only on successful callback completion.
    pub fn clear_state(&self, cookies: &Cookies) {
        cookies
            .private(&self.key)
            .remove(Cookie::build((OAUTH_STATE_COOKIE, "")).path("/").build());
    }

    /// Establishes the authenticated session for `user_id`.
    pub fn log_in(&self, cookies: &Cookies, user_id: i64) {
        let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .http_only(true)
            .path("/")
            .build();
        cookies.private(&self.key).add(cookie);
    }

    pub fn log_out(&self, cookies: &Cookies) {
        cookies
            .private(&self.key)
            .remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    }

    pub fn current_user_id(&self, cookies: &Cookies) -> Option<i64> {
        let cookie = cookies.private(&self.key).get(SESSION_COOKIE)?;
        cookie.value().parse().ok()
    }
}

/// Timing-safe string comparison for the CSRF state token.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Key::generate())
    }

    #[test]
    fn state_token_is_long_and_url_safe() {
        let mut bytes = [0u8; STATE_TOKEN_BYTES];
        rand::thread_rng().fill(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        assert!(token.len() >= 32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn constant_time_eq_only_accepts_exact_match() {
        assert!(constant_time_eq("abcdef", "abcdef"));
        assert!(!constant_time_eq("abcdef", "abcdeg"));
        assert!(!constant_time_eq("abcdef", "abcde"));
        assert!(!constant_time_eq("", "abcdef"));
    }

    #[test]
    fn issue_store_validate_and_clear() {
        let manager = manager();
        let cookies = Cookies::default();

        let state = manager.issue_state(&cookies, "google").unwrap();
        let attempt = manager.stored_attempt(&cookies).unwrap();
        assert_eq!(attempt.state, state);
        assert_eq!(attempt.provider, "google");

        assert!(manager.state_matches(&cookies, &state));
        assert!(!manager.state_matches(&cookies, "forged"));

        manager.clear_state(&cookies);
        assert!(manager.stored_attempt(&cookies).is_none());
        assert!(!manager.state_matches(&cookies, &state));
    }

    #[test]
    fn absent_state_is_always_invalid() {
        let manager = manager();
        let cookies = Cookies::default();
        assert!(!manager.state_matches(&cookies, ""));
        assert!(!manager.state_matches(&cookies, "anything"));
    }

    #[test]
    fn login_roundtrip_preserves_oauth_state() {
        let manager = manager();
        let cookies = Cookies::default();

        let state = manager.issue_state(&cookies, "facebook").unwrap();
        manager.log_in(&cookies, 42);

        assert_eq!(manager.current_user_id(&cookies), Some(42));
        // Unrelated session data survives clearing the login attempt.
        manager.clear_state(&cookies);
        assert_eq!(manager.current_user_id(&cookies), Some(42));
        assert!(!manager.state_matches(&cookies, &state));

        manager.log_out(&cookies);
        assert_eq!(manager.current_user_id(&cookies), None);
    }
}
