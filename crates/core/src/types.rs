use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a single availability check, kept as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCheck {
    pub domain: String,
    pub available: bool,
    pub checked_at: DateTime<Utc>,
}

/// Body of `POST /check-domain`.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainCheckRequest {
    pub domain: String,
}

/// Registrar the frontend can deep-link to.
///
/// `url` is a template whose `{}` placeholder is substituted with the checked
/// domain by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub url: String,
    pub logo_url: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Platform {
    /// Builds a user-created platform with a fresh id.
    pub fn from_new(input: NewPlatform, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            url: input.url,
            logo_url: input.logo_url,
            is_default: false,
            created_at,
        }
    }
}

/// Body of `POST /platforms`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPlatform {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Body of `PUT /platforms/{id}`. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatformUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Append-only liveness record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.into(),
            timestamp,
        }
    }
}

/// Body of `POST /status`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStatusCheck {
    pub client_name: String,
}
