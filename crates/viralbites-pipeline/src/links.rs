//! Video link classification and fallback search links.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use viralbites_core::{VideoLink, VideoPlatform};

/// Characters escaped when building a query component (everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Classifies a citation URI as an Instagram reel or YouTube short.
pub(crate) fn classify_citation(uri: &str) -> Option<VideoLink> {
    let lower = uri.to_ascii_lowercase();
    if lower.contains("instagram.com/reel/") {
        Some(VideoLink::new(VideoPlatform::Instagram, uri, Some("Watch Reel")))
    } else if lower.contains("youtube.com/shorts/") {
        Some(VideoLink::new(VideoPlatform::YouTube, uri, Some("Watch Short")))
    } else {
        None
    }
}

/// Whether a link points at an actual short-form video rather than a
/// profile, search page, or long-form video.
pub(crate) fn is_short_form(url: &str) -> bool {
    url.contains("/shorts/") || url.contains("/reel/")
}

fn youtube_search(query: &str) -> VideoLink {
    let encoded = utf8_percent_encode(query, QUERY_COMPONENT);
    VideoLink::new(
        VideoPlatform::YouTube,
        format!("https://www.youtube.com/results?search_query={encoded}"),
        Some("Search Shorts"),
    )
}

/// Lowercased ASCII-alphanumeric hashtag derived from a venue name.
pub(crate) fn instagram_tag(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Search links used when a verified venue came without real video links.
///
/// Always contains the YouTube search; the Instagram hashtag link is added
/// when the name yields a non-empty tag.
pub(crate) fn fallback_links(name: &str) -> Vec<VideoLink> {
    let mut links = vec![youtube_search(&format!("{name} food shorts"))];
    let tag = instagram_tag(name);
    if !tag.is_empty() {
        links.push(VideoLink::new(
            VideoPlatform::Instagram,
            format!("https://www.instagram.com/explore/tags/{tag}/"),
            Some("Search Reels"),
        ));
    }
    links
}

/// Single search link for records whose verification failed.
pub(crate) fn degraded_fallback_links(name: &str) -> Vec<VideoLink> {
    vec![youtube_search(&format!("{name} shorts"))]
}
