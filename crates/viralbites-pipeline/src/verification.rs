//! Map verification: resolves each candidate to a mapped place, concurrently.

use futures::future::join_all;
use serde_json::Value;
use uuid::Uuid;
use viralbites_core::venue::UNKNOWN_DISTANCE;
use viralbites_core::{Candidate, Coordinates, VenuePlace};
use viralbites_gemini::{extract_json, GeminiClient, GeminiError, GenerateContentRequest, Tool};

use crate::error::PipelineError;
use crate::links::{degraded_fallback_links, fallback_links};
use crate::prompts::verification_prompt;

/// Venues resolved farther than this from the origin are dropped.
pub const MAX_DISTANCE_KM: f64 = 20.0;

const CDN_HOSTS: [&str; 2] = ["googleusercontent.com", "ggpht.com"];
const CDN_SIZING_SUFFIX: &str = "=w400-h300-k-no";
const MIN_IMAGE_URL_LEN: usize = 10;

/// Fields read from the maps lookup reply. Values are read leniently:
/// numbers may arrive as strings and unknown shapes become `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MapsReply {
    pub(crate) verified_name: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) rating: Option<f64>,
    pub(crate) user_rating_count: Option<u64>,
    pub(crate) price_level: Option<String>,
    pub(crate) google_maps_uri: Option<String>,
    pub(crate) photo_uri: Option<String>,
}

impl MapsReply {
    pub(crate) fn from_value(value: &Value) -> Result<Self, GeminiError> {
        let object = match value {
            Value::Object(_) => value,
            Value::Array(items) => items.iter().find(|v| v.is_object()).ok_or_else(|| {
                GeminiError::MalformedResponse("expected a place object".to_string())
            })?,
            _ => {
                return Err(GeminiError::MalformedResponse(
                    "expected a place object".to_string(),
                ))
            }
        };

        Ok(Self {
            verified_name: string_field(object, "verifiedName"),
            address: string_field(object, "address"),
            latitude: f64_field(object, "latitude"),
            longitude: f64_field(object, "longitude"),
            rating: f64_field(object, "rating"),
            user_rating_count: u64_field(object, "userRatingCount"),
            price_level: string_field(object, "priceLevel"),
            google_maps_uri: string_field(object, "googleMapsUri"),
            photo_uri: object
                .get("photoUri")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn f64_field(object: &Value, key: &str) -> Option<f64> {
    let value = match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn u64_field(object: &Value, key: &str) -> Option<u64> {
    match object.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    }
}

/// Accepts an image URL only if it looks like a real http(s) URL. Google
/// CDN URLs without a sizing or query component get a fixed size suffix.
pub(crate) fn normalize_image_url(raw: Option<&str>) -> Option<String> {
    let url = raw?.trim();
    if url.len() < MIN_IMAGE_URL_LEN || !url.starts_with("http") {
        return None;
    }

    let on_cdn = CDN_HOSTS.iter().any(|host| url.contains(host));
    if on_cdn && !url.contains('=') && !url.contains('?') {
        Some(format!("{url}{CDN_SIZING_SUFFIX}"))
    } else {
        Some(url.to_string())
    }
}

/// Builds the final record for one candidate from the maps reply.
///
/// Returns `None` when the resolved place lies beyond [`MAX_DISTANCE_KM`].
/// A reply without coordinates keeps the record with an unknown distance.
pub(crate) fn build_place(
    candidate: &Candidate,
    reply: &MapsReply,
    origin: &Coordinates,
) -> Option<VenuePlace> {
    let verified = reply.verified_name.is_some() && reply.latitude.is_some();
    let location = reply.coordinates();

    let distance = match location {
        Some(point) => {
            let km = origin.distance_to(&point);
            if km > MAX_DISTANCE_KM {
                tracing::debug!(
                    candidate = %candidate.name,
                    distance_km = km,
                    "dropping candidate outside search radius"
                );
                return None;
            }
            VenuePlace::distance_label(km)
        }
        None => UNKNOWN_DISTANCE.to_string(),
    };

    let name = reply
        .verified_name
        .clone()
        .or_else(|| Some(candidate.name.clone()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "Unknown Spot".to_string());

    let video_links = if candidate.video_links.is_empty() {
        fallback_links(&name)
    } else {
        candidate.video_links.clone()
    };

    Some(VenuePlace {
        id: Uuid::new_v4(),
        name,
        viral_reason: non_empty_or(candidate.viral_reason.as_deref(), "Trending locally"),
        cuisine: non_empty_or(candidate.cuisine.as_deref(), "Food"),
        popular_dishes: candidate.popular_dishes.clone(),
        sentiment_summary: non_empty_or(candidate.sentiment_summary.as_deref(), "Popular spot"),
        address: reply.address.clone(),
        location,
        rating: reply.rating,
        user_rating_count: reply.user_rating_count,
        distance,
        price_level: reply.price_level.clone(),
        google_maps_uri: reply.google_maps_uri.clone(),
        image_url: normalize_image_url(reply.photo_uri.as_deref()),
        video_links,
        sources: Vec::new(),
        verified,
    })
}

/// Minimal unverified record used when the lookup for one candidate fails.
pub(crate) fn degraded_place(candidate: &Candidate) -> VenuePlace {
    let name = if candidate.name.is_empty() {
        "Unknown".to_string()
    } else {
        candidate.name.clone()
    };
    let video_links = if candidate.video_links.is_empty() {
        degraded_fallback_links(&name)
    } else {
        candidate.video_links.clone()
    };

    VenuePlace {
        id: Uuid::new_v4(),
        viral_reason: non_empty_or(candidate.viral_reason.as_deref(), "Trending"),
        cuisine: non_empty_or(candidate.cuisine.as_deref(), "Food"),
        popular_dishes: candidate.popular_dishes.clone(),
        sentiment_summary: "Verification unavailable".to_string(),
        address: None,
        location: None,
        rating: None,
        user_rating_count: None,
        distance: UNKNOWN_DISTANCE.to_string(),
        price_level: None,
        google_maps_uri: None,
        image_url: None,
        video_links,
        sources: Vec::new(),
        verified: false,
        name,
    }
}

fn non_empty_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

async fn lookup(
    client: &GeminiClient,
    model: &str,
    candidate: &Candidate,
    origin: &Coordinates,
) -> Result<MapsReply, GeminiError> {
    let request = GenerateContentRequest::prompt(verification_prompt(candidate, origin))
        .with_tool(Tool::google_maps())
        .with_tool(Tool::google_search())
        .with_location(origin.latitude, origin.longitude);

    let response = client.generate(model, &request).await?;
    let text = response.text().unwrap_or_else(|| "{}".to_string());
    let value = extract_json(&text)?;
    MapsReply::from_value(&value)
}

/// Verifies one candidate. `Ok(None)` means it was dropped for distance.
///
/// # Errors
///
/// Returns [`PipelineError::Unauthorized`] if the API rejected the key.
/// Every other failure degrades to an unverified record.
pub async fn verify_candidate(
    client: &GeminiClient,
    model: &str,
    candidate: &Candidate,
    origin: &Coordinates,
) -> Result<Option<VenuePlace>, PipelineError> {
    match lookup(client, model, candidate, origin).await {
        Ok(reply) => Ok(build_place(candidate, &reply, origin)),
        Err(e) if e.is_auth_failure() => Err(PipelineError::Unauthorized(e)),
        Err(e) => {
            tracing::warn!(
                candidate = %candidate.name,
                error = %e,
                "verification failed; returning unverified record"
            );
            Ok(Some(degraded_place(candidate)))
        }
    }
}

/// Verifies all candidates concurrently, one request each, and waits for
/// every request to settle. Input order is preserved; dropped candidates
/// are removed.
///
/// # Errors
///
/// Returns [`PipelineError::Unauthorized`] if any lookup was rejected for
/// an invalid or leaked key.
pub async fn verify_candidates(
    client: &GeminiClient,
    model: &str,
    candidates: &[Candidate],
    origin: &Coordinates,
) -> Result<Vec<VenuePlace>, PipelineError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let settled = join_all(
        candidates
            .iter()
            .map(|candidate| verify_candidate(client, model, candidate, origin)),
    )
    .await;

    let mut places = Vec::with_capacity(settled.len());
    for result in settled {
        if let Some(place) = result? {
            places.push(place);
        }
    }

    tracing::info!(
        candidates = candidates.len(),
        kept = places.len(),
        "map verification complete"
    );
    Ok(places)
}

#[cfg(test)]
#[path = "verification_test.rs"]
mod tests;
