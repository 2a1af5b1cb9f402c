//! Venue records flowing through discovery and verification.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;

/// Distance label used when a venue could not be located.
pub const UNKNOWN_DISTANCE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoPlatform {
    Instagram,
    TikTok,
    YouTube,
    #[serde(other)]
    Other,
}

/// A short-form video (or a search for one) about a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLink {
    pub platform: VideoPlatform,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl VideoLink {
    #[must_use]
    pub fn new(platform: VideoPlatform, url: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            platform,
            url: url.into(),
            title: title.map(str::to_owned),
        }
    }
}

/// A citation the search API reported as evidence for its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// A venue mention produced by trend discovery, not yet checked against a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub viral_reason: Option<String>,
    pub cuisine: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub popular_dishes: Vec<String>,
    pub sentiment_summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub video_links: Vec<VideoLink>,
}

/// Model replies write `null` where a list or name is absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A fully-formed venue, as returned to callers.
///
/// `verified` is true only when the maps lookup produced both a resolved
/// name and a latitude. `video_links` is never empty and `distance` is
/// either `"<km> km"` or [`UNKNOWN_DISTANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenuePlace {
    pub id: Uuid,
    pub name: String,
    pub viral_reason: String,
    pub cuisine: String,
    pub popular_dishes: Vec<String>,
    pub sentiment_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u64>,
    pub distance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub video_links: Vec<VideoLink>,
    pub sources: Vec<Source>,
    #[serde(rename = "isVerified")]
    pub verified: bool,
}

impl VenuePlace {
    /// Formats a kilometer distance the way venue cards display it.
    #[must_use]
    pub fn distance_label(km: f64) -> String {
        format!("{km:.1} km")
    }
}
