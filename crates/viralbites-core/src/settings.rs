use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Social platforms a user can connect through OAuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    #[serde(rename = "youtube")]
    YouTube,
}

impl SocialPlatform {
    /// Lowercase path segment used in OAuth routes (`/auth/{slug}`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::YouTube => "youtube",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialPlatform::Instagram => write!(f, "Instagram"),
            SocialPlatform::YouTube => write!(f, "YouTube"),
        }
    }
}

impl FromStr for SocialPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(SocialPlatform::Instagram),
            "youtube" => Ok(SocialPlatform::YouTube),
            other => Err(format!("unsupported platform: {other}")),
        }
    }
}

/// Which social accounts the user has connected. Drives the platform bias
/// of trend discovery. Held in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub connect_instagram: bool,
    pub connect_youtube: bool,
    pub connect_tiktok: bool,
}

impl UserSettings {
    /// Marks `platform` as connected.
    pub fn connect(&mut self, platform: SocialPlatform) {
        match platform {
            SocialPlatform::Instagram => self.connect_instagram = true,
            SocialPlatform::YouTube => self.connect_youtube = true,
        }
    }

    /// Marks `platform` as disconnected.
    pub fn disconnect(&mut self, platform: SocialPlatform) {
        match platform {
            SocialPlatform::Instagram => self.connect_instagram = false,
            SocialPlatform::YouTube => self.connect_youtube = false,
        }
    }

    #[must_use]
    pub fn is_connected(&self, platform: SocialPlatform) -> bool {
        match platform {
            SocialPlatform::Instagram => self.connect_instagram,
            SocialPlatform::YouTube => self.connect_youtube,
        }
    }
}
