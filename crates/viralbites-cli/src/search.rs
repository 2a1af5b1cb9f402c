use std::fmt::Write as _;

use viralbites_core::{AppConfig, Coordinates, UserSettings, VenuePlace};
use viralbites_pipeline::{run_diagnostics, SearchPipeline, SearchResults, TestResult};

pub(crate) async fn run_search(
    config: &AppConfig,
    lat: f64,
    lon: f64,
    query: &str,
    settings: &UserSettings,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = SearchPipeline::from_config(config)?;
    let results = pipeline
        .search(&Coordinates::new(lat, lon), query, settings)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_results(&results));
    }
    Ok(())
}

pub(crate) async fn run_diagnose(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let pipeline = SearchPipeline::from_config(config)?;
    let results = run_diagnostics(&pipeline).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_diagnostics(&results));
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} diagnostic check(s) failed");
    }
    Ok(())
}

pub(crate) fn render_place(index: usize, place: &VenuePlace) -> String {
    let mut out = String::new();
    let badge = if place.verified { "verified" } else { "unverified" };
    let _ = writeln!(out, "{index}. {} [{badge}] {}", place.name, place.distance);
    let _ = writeln!(out, "   {} | {}", place.cuisine, place.viral_reason);
    if let Some(address) = &place.address {
        let _ = writeln!(out, "   {address}");
    }
    if let Some(rating) = place.rating {
        match place.user_rating_count {
            Some(count) => {
                let _ = writeln!(out, "   rating {rating:.1} ({count} reviews)");
            }
            None => {
                let _ = writeln!(out, "   rating {rating:.1}");
            }
        }
    }
    if !place.popular_dishes.is_empty() {
        let _ = writeln!(out, "   try: {}", place.popular_dishes.join(", "));
    }
    let _ = writeln!(out, "   {}", place.sentiment_summary);
    for link in &place.video_links {
        let label = link.title.as_deref().unwrap_or("Video");
        let _ = writeln!(out, "   {label}: {}", link.url);
    }
    if let Some(uri) = &place.google_maps_uri {
        let _ = writeln!(out, "   Map: {uri}");
    }
    out
}

pub(crate) fn render_results(results: &SearchResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} viral spots!\n", results.places.len());
    for (i, place) in results.places.iter().enumerate() {
        out.push_str(&render_place(i + 1, place));
        out.push('\n');
    }
    if !results.sources.is_empty() {
        out.push_str("Sources:\n");
        for source in &results.sources {
            let _ = writeln!(out, "  - {} <{}>", source.title, source.uri);
        }
    }
    out
}

pub(crate) fn render_diagnostics(results: &[TestResult]) -> String {
    results.iter().fold(String::new(), |mut out, r| {
        let _ = writeln!(out, "[{}] {}: {}", r.status, r.name, r.message);
        out
    })
}
