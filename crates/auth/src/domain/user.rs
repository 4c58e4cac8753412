use chrono::{DateTime, Utc};

/// The identity providers the application can log users in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Facebook,
    Linkedin,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Facebook, Provider::Linkedin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Linkedin => "linkedin",
        }
    }

    pub fn parse(name: &str) -> Option<Provider> {
        match name {
            "google" => Some(Provider::Google),
            "facebook" => Some(Provider::Facebook),
            "linkedin" => Some(Provider::Linkedin),
            _ => None,
        }
    }
}

/// A user account. One account can be linked to several providers; the
/// per-provider external ids record which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub linkedin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn provider_id(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Google => self.google_id.as_deref(),
            Provider::Facebook => self.facebook_id.as_deref(),
            Provider::Linkedin => self.linkedin_id.as_deref(),
        }
    }

    pub fn set_provider_id(&mut self, provider: Provider, external_id: String) {
        match provider {
            Provider::Google => self.google_id = Some(external_id),
            Provider::Facebook => self.facebook_id = Some(external_id),
            Provider::Linkedin => self.linkedin_id = Some(external_id),
        }
    }
}
