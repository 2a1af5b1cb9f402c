use serde_json::json;
use viralbites_core::{VideoLink, VideoPlatform};

use super::*;

const ORIGIN: Coordinates = Coordinates::new(0.0, 0.0);

fn candidate(name: &str) -> Candidate {
    Candidate {
        name: name.to_string(),
        viral_reason: Some("Cheese pull".to_string()),
        cuisine: Some("Mexican".to_string()),
        popular_dishes: vec!["Quesabirria".to_string()],
        sentiment_summary: Some("People love the consomme".to_string()),
        video_links: Vec::new(),
    }
}

fn reply_at(latitude: f64, longitude: f64) -> MapsReply {
    MapsReply {
        verified_name: Some("Birria Bros Taqueria".to_string()),
        address: Some("1 Main St".to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
        rating: Some(4.6),
        user_rating_count: Some(812),
        price_level: Some("$$".to_string()),
        google_maps_uri: Some("https://maps.google.com/?cid=1".to_string()),
        photo_uri: Some("https://lh3.googleusercontent.com/p/AF1Qip".to_string()),
    }
}

#[test]
fn nearby_resolved_place_is_verified_with_distance_label() {
    let place = build_place(&candidate("Birria Bros"), &reply_at(0.0, 0.1), &ORIGIN)
        .expect("11 km should be kept");

    assert!(place.verified);
    assert_eq!(place.name, "Birria Bros Taqueria");
    assert_eq!(place.distance, "11.1 km");
    assert_eq!(place.location, Some(Coordinates::new(0.0, 0.1)));
    assert_eq!(place.rating, Some(4.6));
    assert_eq!(place.user_rating_count, Some(812));
    assert_eq!(place.viral_reason, "Cheese pull");
    assert!(place.sources.is_empty());
}

#[test]
fn candidate_at_25_km_is_dropped() {
    let origin = Coordinates::new(0.0, 0.0);
    let point = Coordinates::new(0.2248, 0.0);
    let km = origin.distance_to(&point);
    assert!((24.9..=25.1).contains(&km), "fixture should sit at 25 km, got {km}");

    assert!(build_place(&candidate("Far Away"), &reply_at(0.2248, 0.0), &origin).is_none());
}

#[test]
fn place_just_inside_radius_is_kept() {
    // 0.179 degrees of latitude is about 19.9 km.
    assert!(build_place(&candidate("Edge"), &reply_at(0.179, 0.0), &ORIGIN).is_some());
}

#[test]
fn missing_coordinates_yield_unknown_distance_and_unverified() {
    let reply = MapsReply {
        verified_name: Some("Somewhere".to_string()),
        ..MapsReply::default()
    };
    let place = build_place(&candidate("Somewhere"), &reply, &ORIGIN)
        .expect("records without coordinates are kept");

    assert!(!place.verified);
    assert_eq!(place.distance, "Unknown");
    assert!(place.location.is_none());
}

#[test]
fn latitude_without_name_is_not_verified() {
    let reply = MapsReply {
        latitude: Some(0.01),
        longitude: Some(0.01),
        ..MapsReply::default()
    };
    let place = build_place(&candidate("Nameless"), &reply, &ORIGIN).unwrap();
    assert!(!place.verified);
    assert_eq!(place.name, "Nameless");
}

#[test]
fn name_without_latitude_is_not_verified() {
    let reply = MapsReply {
        verified_name: Some("Resolved".to_string()),
        longitude: Some(0.01),
        ..MapsReply::default()
    };
    let place = build_place(&candidate("Resolved"), &reply, &ORIGIN).unwrap();
    assert!(!place.verified);
    assert_eq!(place.distance, "Unknown");
}

#[test]
fn defaults_fill_missing_candidate_metadata() {
    let bare = Candidate {
        name: "Bare".to_string(),
        ..Candidate::default()
    };
    let place = build_place(&bare, &MapsReply::default(), &ORIGIN).unwrap();
    assert_eq!(place.viral_reason, "Trending locally");
    assert_eq!(place.cuisine, "Food");
    assert_eq!(place.sentiment_summary, "Popular spot");
}

#[test]
fn existing_video_links_are_kept() {
    let mut with_links = candidate("Birria Bros");
    with_links.video_links = vec![VideoLink::new(
        VideoPlatform::Instagram,
        "https://www.instagram.com/reel/abc/",
        Some("Watch Reel"),
    )];
    let place = build_place(&with_links, &reply_at(0.0, 0.01), &ORIGIN).unwrap();
    assert_eq!(place.video_links, with_links.video_links);
}

#[test]
fn fallback_links_use_resolved_name() {
    let place = build_place(&candidate("Birria Bros"), &reply_at(0.0, 0.01), &ORIGIN).unwrap();
    assert_eq!(place.video_links.len(), 2);
    assert!(place.video_links[0]
        .url
        .contains("search_query=Birria%20Bros%20Taqueria%20food%20shorts"));
    assert_eq!(
        place.video_links[1].url,
        "https://www.instagram.com/explore/tags/birriabrostaqueria/"
    );
}

#[test]
fn cdn_image_gets_sizing_suffix_exactly_once() {
    let once = normalize_image_url(Some("https://lh3.googleusercontent.com/p/AF1Qip")).unwrap();
    assert_eq!(once, "https://lh3.googleusercontent.com/p/AF1Qip=w400-h300-k-no");

    let twice = normalize_image_url(Some(&once)).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn cdn_image_with_query_string_is_left_alone() {
    let url = "https://lh5.ggpht.com/photo?sz=large";
    assert_eq!(normalize_image_url(Some(url)).as_deref(), Some(url));
}

#[test]
fn non_cdn_image_is_unchanged() {
    let url = "https://images.example.com/tacos.jpg";
    assert_eq!(normalize_image_url(Some(url)).as_deref(), Some(url));
}

#[test]
fn invalid_images_are_rejected() {
    assert_eq!(normalize_image_url(None), None);
    assert_eq!(normalize_image_url(Some("ftp://x.example.com/a.png")), None);
    assert_eq!(normalize_image_url(Some("http://a")), None);
    assert_eq!(normalize_image_url(Some("data:image/png;base64,AAAA")), None);
}

#[test]
fn degraded_place_is_minimal_and_unverified() {
    let place = degraded_place(&candidate("Birria Bros"));
    assert!(!place.verified);
    assert_eq!(place.sentiment_summary, "Verification unavailable");
    assert_eq!(place.distance, "Unknown");
    assert!(place.address.is_none());
    assert!(place.location.is_none());
    assert!(place.image_url.is_none());
    assert_eq!(place.cuisine, "Mexican");
    assert_eq!(place.video_links.len(), 1);
    assert!(place.video_links[0]
        .url
        .ends_with("search_query=Birria%20Bros%20shorts"));
}

#[test]
fn maps_reply_reads_lenient_values() {
    let reply = MapsReply::from_value(&json!({
        "verifiedName": "  Joe's Pizza ",
        "latitude": "40.7306",
        "longitude": -73.9896,
        "rating": 4.5,
        "userRatingCount": "1,204",
        "priceLevel": 2,
        "photoUri": 42
    }))
    .unwrap();

    assert_eq!(reply.verified_name.as_deref(), Some("Joe's Pizza"));
    assert_eq!(reply.latitude, Some(40.7306));
    assert_eq!(reply.longitude, Some(-73.9896));
    assert_eq!(reply.user_rating_count, Some(1204));
    assert_eq!(reply.price_level.as_deref(), Some("2"));
    assert!(reply.photo_uri.is_none());
}

#[test]
fn maps_reply_takes_first_object_from_array() {
    let reply = MapsReply::from_value(&json!([{"verifiedName": "First"}, {"verifiedName": "Second"}]))
        .unwrap();
    assert_eq!(reply.verified_name.as_deref(), Some("First"));
}

#[test]
fn maps_reply_rejects_scalars() {
    assert!(MapsReply::from_value(&json!("nope")).is_err());
    assert!(MapsReply::from_value(&json!([1, 2])).is_err());
}

#[test]
fn empty_verified_name_counts_as_missing() {
    let reply = MapsReply::from_value(&json!({"verifiedName": "", "latitude": 0.01, "longitude": 0.0}))
        .unwrap();
    assert!(reply.verified_name.is_none());
    let place = build_place(&candidate("Fallback Name"), &reply, &ORIGIN).unwrap();
    assert!(!place.verified);
    assert_eq!(place.name, "Fallback Name");
}
