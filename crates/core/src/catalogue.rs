use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::Platform;

/// A registrar shipped with every installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPlatform {
    pub name: &'static str,
    pub url: &'static str,
    pub logo_url: &'static str,
}

impl DefaultPlatform {
    /// Materializes the entry as a stored platform with a fresh id.
    pub fn to_platform(self, created_at: DateTime<Utc>) -> Platform {
        Platform {
            id: Uuid::new_v4().to_string(),
            name: self.name.to_string(),
            url: self.url.to_string(),
            logo_url: Some(self.logo_url.to_string()),
            is_default: true,
            created_at,
        }
    }
}

/// Registrars seeded at startup, keyed by name.
pub const DEFAULT_PLATFORMS: [DefaultPlatform; 4] = [
    DefaultPlatform {
        name: "GoDaddy",
        url: "https://godaddy.com/domainsearch/find?checkAvail=1&domainToCheck={}",
        logo_url: "https://img.godaddy.com/assets/brand/gd-logo.svg",
    },
    DefaultPlatform {
        name: "Namecheap",
        url: "https://www.namecheap.com/domains/registration/results/?domain={}",
        logo_url: "https://www.namecheap.com/assets/img/nc-icon.svg",
    },
    DefaultPlatform {
        name: "Google Domains",
        url: "https://domains.google.com/registrar/search?searchTerm={}",
        logo_url: "https://www.google.com/images/branding/googleg/1x/googleg_standard_color_128dp.png",
    },
    DefaultPlatform {
        name: "Registro.br",
        url: "https://registro.br/",
        logo_url: "https://registro.br/images/logo-registro-br.png",
    },
];
