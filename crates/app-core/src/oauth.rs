//! OAuth 2.0 authorization-code flow adapters.
//!
//! One implementation per identity provider, all behind the same
//! [`OAuthProvider`] contract so the callback orchestrator never sees a
//! provider quirk. The quirks live here: Facebook exchanges the code with a
//! GET, LinkedIn needs two calls to assemble a profile, and only Google
//! reports whether the email is actually verified. Facebook and LinkedIn
//! profiles are treated as verified unconditionally once fetched.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status} from its {endpoint} endpoint")]
    UpstreamStatus { status: StatusCode, endpoint: &'static str },

    #[error("Failed to parse provider profile response")]
    ProfileParse,
}

/// Raw decoded token-endpoint payload. The exchange is only usable
/// downstream when `access_token` is present.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPayload {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Provider-independent shape every adapter normalizes profiles into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedProfile {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Composes the provider's authorization URL. No network call.
    fn authorization_url<'a>(&self, redirect_uri: &str, state: Option<&'a str>) -> String;

    /// Exchanges an authorization code for the raw token payload.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenPayload, OAuthError>;

    /// Fetches and normalizes the user's profile.
    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile, OAuthError>;
}

fn ensure_success(status: StatusCode, endpoint: &'static str) -> Result<(), OAuthError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(OAuthError::UpstreamStatus { status, endpoint })
    }
}

// ---------------------------------------------------------------------------
// Google

const GOOGLE_AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub struct GoogleProvider {
    client_id: String,
    client_secret: String,
    auth_url: Url,
    http: Client,
}

impl GoogleProvider {
    pub fn new(client_id: String, client_secret: String, http: Client) -> Result<Self, OAuthError> {
        Ok(Self {
            client_id,
            client_secret,
            auth_url: Url::parse(GOOGLE_AUTHORIZATION_URL)?,
            http,
        })
    }
}

#[async_trait::async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url<'a>(&self, redirect_uri: &str, state: Option<&'a str>) -> String {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("scope", "openid email profile")
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("access_type", "offline");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        url.to_string()
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenPayload, OAuthError> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        ensure_success(response.status(), "token")?;
        Ok(response.json().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile, OAuthError> {
        #[derive(Deserialize)]
        struct GoogleProfile {
            id: String,
            email: Option<String>,
            name: Option<String>,
            picture: Option<String>,
            #[serde(default)]
            verified_email: bool,
        }

        let response = self
            .http
            .get(GOOGLE_USER_INFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response.status(), "userinfo")?;
        let profile: GoogleProfile = response.json().await.map_err(|_| OAuthError::ProfileParse)?;

        Ok(NormalizedProfile {
            external_id: profile.id,
            email: profile.email,
            name: profile.name,
            picture: profile.picture,
            email_verified: profile.verified_email,
        })
    }
}

// ---------------------------------------------------------------------------
// Facebook

const FACEBOOK_AUTHORIZATION_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_USER_INFO_URL: &str = "https://graph.facebook.com/v18.0/me";

pub struct FacebookProvider {
    client_id: String,
    client_secret: String,
    auth_url: Url,
    http: Client,
}

impl FacebookProvider {
    pub fn new(client_id: String, client_secret: String, http: Client) -> Result<Self, OAuthError> {
        Ok(Self {
            client_id,
            client_secret,
            auth_url: Url::parse(FACEBOOK_AUTHORIZATION_URL)?,
            http,
        })
    }
}

#[async_trait::async_trait]
impl OAuthProvider for FacebookProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn authorization_url<'a>(&self, redirect_uri: &str, state: Option<&'a str>) -> String {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("scope", "email,public_profile")
                .append_pair("redirect_uri", redirect_uri);
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        url.to_string()
    }

    // Facebook's documented token exchange is a GET with query parameters.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenPayload, OAuthError> {
        let response = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        ensure_success(response.status(), "token")?;
        Ok(response.json().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile, OAuthError> {
        #[derive(Deserialize)]
        struct FacebookProfile {
            id: String,
            name: Option<String>,
            email: Option<String>,
            picture: Option<FacebookPicture>,
        }
        #[derive(Deserialize)]
        struct FacebookPicture {
            data: Option<FacebookPictureData>,
        }
        #[derive(Deserialize)]
        struct FacebookPictureData {
            url: Option<String>,
        }

        let response = self
            .http
            .get(FACEBOOK_USER_INFO_URL)
            .query(&[
                ("access_token", access_token),
                ("fields", "id,name,email,picture"),
            ])
            .send()
            .await?;

        ensure_success(response.status(), "me")?;
        let profile: FacebookProfile = response.json().await.map_err(|_| OAuthError::ProfileParse)?;

        Ok(NormalizedProfile {
            external_id: profile.id,
            email: profile.email,
            name: profile.name,
            picture: profile.picture.and_then(|p| p.data).and_then(|d| d.url),
            // Facebook only returns emails it has already verified.
            email_verified: true,
        })
    }
}

// ---------------------------------------------------------------------------
// LinkedIn

const LINKEDIN_AUTHORIZATION_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const LINKEDIN_PROFILE_URL: &str = "https://api.linkedin.com/v2/people/~";
const LINKEDIN_EMAIL_URL: &str = "https://api.linkedin.com/v2/emailAddresses";

pub struct LinkedInProvider {
    client_id: String,
    client_secret: String,
    auth_url: Url,
    http: Client,
}

impl LinkedInProvider {
    pub fn new(client_id: String, client_secret: String, http: Client) -> Result<Self, OAuthError> {
        Ok(Self {
            client_id,
            client_secret,
            auth_url: Url::parse(LINKEDIN_AUTHORIZATION_URL)?,
            http,
        })
    }
}

#[async_trait::async_trait]
impl OAuthProvider for LinkedInProvider {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    fn authorization_url<'a>(&self, redirect_uri: &str, state: Option<&'a str>) -> String {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", "r_liteprofile r_emailaddress");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        url.to_string()
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenPayload, OAuthError> {
        let response = self
            .http
            .post(LINKEDIN_TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        ensure_success(response.status(), "accessToken")?;
        Ok(response.json().await?)
    }

    // LinkedIn splits profile and email across two endpoints.
    async fn fetch_profile(&self, access_token: &str) -> Result<NormalizedProfile, OAuthError> {
        let profile_response = self
            .http
            .get(LINKEDIN_PROFILE_URL)
            .bearer_auth(access_token)
            .query(&[(
                "projection",
                "(id,firstName,lastName,profilePicture(displayImage~:playableStreams))",
            )])
            .send()
            .await?;

        ensure_success(profile_response.status(), "profile")?;
        let profile: Value = profile_response.json().await.map_err(|_| OAuthError::ProfileParse)?;

        let email_response = self
            .http
            .get(LINKEDIN_EMAIL_URL)
            .bearer_auth(access_token)
            .query(&[("q", "members"), ("projection", "(elements*(handle~))")])
            .send()
            .await?;

        ensure_success(email_response.status(), "emailAddress")?;
        let email_doc: Value = email_response.json().await.map_err(|_| OAuthError::ProfileParse)?;

        let external_id = profile
            .get("id")
            .and_then(Value::as_str)
            .ok_or(OAuthError::ProfileParse)?
            .to_string();

        let first_name = localized_en_us(&profile, "firstName");
        let last_name = localized_en_us(&profile, "lastName");
        let name = format!("{first_name} {last_name}").trim().to_string();

        let email = email_doc
            .get("elements")
            .and_then(Value::as_array)
            .and_then(|elements| elements.first())
            .and_then(|element| element.get("handle~"))
            .and_then(|handle| handle.get("emailAddress"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let picture = profile
            .get("profilePicture")
            .and_then(|p| p.get("displayImage~"))
            .and_then(|d| d.get("elements"))
            .and_then(Value::as_array)
            .and_then(|elements| elements.first())
            .and_then(|element| element.get("identifiers"))
            .and_then(Value::as_array)
            .and_then(|identifiers| identifiers.first())
            .and_then(|identifier| identifier.get("identifier"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(NormalizedProfile {
            external_id,
            email,
            name: if name.is_empty() { None } else { Some(name) },
            picture,
            // LinkedIn only exposes verified member emails.
            email_verified: true,
        })
    }
}

fn localized_en_us<'a>(profile: &'a Value, field: &str) -> &'a str {
    profile
        .get(field)
        .and_then(|f| f.get("localized"))
        .and_then(|l| l.get("en_US"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Registry

/// Holds the configured providers, keyed by name.
#[derive(Clone, Default)]
pub struct OAuthManager {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
}

impl OAuthManager {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    pub fn register(&mut self, provider: Arc<dyn OAuthProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn OAuthProvider>> {
        self.providers.get(name)
    }

    pub fn supports(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Configured provider names, sorted for stable responses.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registers the named provider only when both credentials are present and
/// non-empty; otherwise the provider is left out of the available set.
/// Returns whether the provider was registered.
pub fn register_configured(
    manager: &mut OAuthManager,
    name: &str,
    client_id: &str,
    client_secret: &str,
    http: &Client,
) -> Result<bool, OAuthError> {
    if client_id.is_empty() || client_secret.is_empty() {
        return Ok(false);
    }

    let provider: Arc<dyn OAuthProvider> = match name {
        "google" => Arc::new(GoogleProvider::new(
            client_id.to_string(),
            client_secret.to_string(),
            http.clone(),
        )?),
        "facebook" => Arc::new(FacebookProvider::new(
            client_id.to_string(),
            client_secret.to_string(),
            http.clone(),
        )?),
        "linkedin" => Arc::new(LinkedInProvider::new(
            client_id.to_string(),
            client_secret.to_string(),
            http.clone(),
        )?),
        _ => return Ok(false),
    };

    manager.register(provider);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> Client {
        Client::new()
    }

    #[test]
    fn google_authorization_url_is_deterministic() {
        let provider =
            GoogleProvider::new("gid".to_string(), "gsecret".to_string(), http()).unwrap();
        let url = provider.authorization_url("https://example.com/auth/callback/google", Some("tok123"));

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=gid"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fauth%2Fcallback%2Fgoogle"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=tok123"));
    }

    #[test]
    fn google_authorization_url_omits_absent_state() {
        let provider =
            GoogleProvider::new("gid".to_string(), "gsecret".to_string(), http()).unwrap();
        let url = provider.authorization_url("https://example.com/cb", None);
        assert!(!url.contains("state="));
    }

    #[test]
    fn facebook_authorization_url_has_facebook_scopes() {
        let provider =
            FacebookProvider::new("fid".to_string(), "fsecret".to_string(), http()).unwrap();
        let url = provider.authorization_url("https://example.com/cb", Some("s"));

        assert!(url.starts_with("https://www.facebook.com/v18.0/dialog/oauth?"));
        assert!(url.contains("client_id=fid"));
        assert!(url.contains("scope=email%2Cpublic_profile"));
        assert!(url.contains("state=s"));
    }

    #[test]
    fn linkedin_authorization_url_has_linkedin_scopes() {
        let provider =
            LinkedInProvider::new("lid".to_string(), "lsecret".to_string(), http()).unwrap();
        let url = provider.authorization_url("https://example.com/cb", Some("s"));

        assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?"));
        assert!(url.contains("client_id=lid"));
        assert!(url.contains("scope=r_liteprofile+r_emailaddress"));
    }

    #[test]
    fn manager_lookup_and_listing() {
        let mut manager = OAuthManager::new();
        let mut provider = MockOAuthProvider::new();
        provider.expect_name().return_const("google");
        manager.register(Arc::new(provider));

        assert!(manager.supports("google"));
        assert!(manager.get("google").is_some());
        assert!(manager.get("github").is_none());
        assert_eq!(manager.available(), vec!["google".to_string()]);
    }

    #[test]
    fn register_skips_missing_or_empty_credentials() {
        let http = http();
        let mut manager = OAuthManager::new();

        assert!(!register_configured(&mut manager, "google", "", "secret", &http).unwrap());
        assert!(!register_configured(&mut manager, "facebook", "id", "", &http).unwrap());
        assert!(!register_configured(&mut manager, "myspace", "id", "secret", &http).unwrap());
        assert!(manager.available().is_empty());

        assert!(register_configured(&mut manager, "google", "id", "secret", &http).unwrap());
        assert!(register_configured(&mut manager, "linkedin", "id", "secret", &http).unwrap());
        assert_eq!(
            manager.available(),
            vec!["google".to_string(), "linkedin".to_string()]
        );
    }

    #[test]
    fn token_payload_tolerates_missing_access_token() {
        let payload: TokenPayload =
            serde_json::from_str(r#"{"error": "invalid_grant"}"#).unwrap();
        assert!(payload.access_token.is_none());

        let payload: TokenPayload = serde_json::from_str(
            r#"{"access_token": "at", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .unwrap();
        assert_eq!(payload.access_token.as_deref(), Some("at"));
    }
}
