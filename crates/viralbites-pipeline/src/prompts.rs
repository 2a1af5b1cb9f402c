//! Prompt text for the discovery and verification calls.

use viralbites_core::{Candidate, Coordinates, UserSettings};

/// Platform emphasis derived from which accounts are connected.
pub(crate) fn platform_focus(settings: &UserSettings) -> String {
    let mut focus = String::from("YouTube Shorts and Instagram Reels");
    if settings.connect_instagram {
        focus = String::from("Instagram Reels (Prioritize these)");
    }
    if settings.connect_youtube {
        focus.push_str(", YouTube Shorts (Prioritize these)");
    }
    focus
}

pub(crate) fn discovery_prompt(
    origin: &Coordinates,
    query: &str,
    settings: &UserSettings,
) -> String {
    let query = query.trim();
    let context = if query.is_empty() {
        "Look for highly viral food trends in this city/area.".to_string()
    } else {
        format!("User craving: {query}.")
    };
    let focus = platform_focus(settings);

    format!(
        r#"I am at Latitude: {lat}, Longitude: {lon}.

Task: Find 5-7 viral food places near me that are specifically trending on {focus}.

Context: {context}

Instructions:
1. Search specifically for "YouTube Shorts food [city]" and "Instagram Reels food [city]".
2. STRICTLY only return places that have a viral short-form video presence.
3. Video Links: You MUST try to find a real link to a YouTube Short (youtube.com/shorts/...) or Instagram Reel (instagram.com/reel/...).
4. Images: Do not generate or hallucinate images here. They are resolved from Maps later.
5. Extract the viral reason (e.g. "cheese pull", "hidden gem"), cuisine, and popular dishes.

Output JSON Schema:
[
  {{
    "name": "Social Media Name",
    "viralReason": "Reason",
    "cuisine": "Cuisine",
    "popularDishes": ["Dish1", "Dish2"],
    "sentimentSummary": "Sentiment",
    "videoLinks": [
      {{ "platform": "YouTube" | "Instagram", "url": "https://...", "title": "Title" }}
    ]
  }}
]"#,
        lat = origin.latitude,
        lon = origin.longitude,
    )
}

pub(crate) fn verification_prompt(candidate: &Candidate, origin: &Coordinates) -> String {
    let name = &candidate.name;
    let context = candidate
        .viral_reason
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or("Trending food");

    format!(
        r#"My location: {lat}, {lon}.
Candidate Name: "{name}"
Viral Context: "{context}"

Task: Verify this specific place and find a visual image.

1. Verification (Maps):
   - Use 'googleMaps' to search for "{name}".
   - Extract: exact verified name, address, latitude, longitude, rating, userRatingCount, googleMapsUri.
   - If multiple locations exist, choose the one closest to my location.

2. Image Search (MANDATORY):
   - Use 'googleSearch' to find a high-quality photo.
   - Search query: "{name} food photo" or "{name} atmosphere".
   - Extract the most relevant 'photoUri' (must be http/https).

3. Data Merging:
   - Combine Maps data with the Image URL.

Return a SINGLE JSON object:
{{
  "verifiedName": "...",
  "address": "...",
  "latitude": 12.34,
  "longitude": 56.78,
  "rating": 4.5,
  "userRatingCount": 100,
  "priceLevel": "$$",
  "googleMapsUri": "https://...",
  "photoUri": "https://..."
}}"#,
        lat = origin.latitude,
        lon = origin.longitude,
    )
}
