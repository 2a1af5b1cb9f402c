//! Trend discovery: the search-grounded call that nominates candidates.

use serde_json::Value;
use viralbites_core::{Candidate, Coordinates, Source, UserSettings, VideoLink};
use viralbites_gemini::{
    extract_json, GeminiClient, GeminiError, GenerateContentRequest, Tool, WebCitation,
};

use crate::error::PipelineError;
use crate::links::{classify_citation, is_short_form};
use crate::prompts::discovery_prompt;

/// Output of the discovery phase.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidates: Vec<Candidate>,
    pub sources: Vec<Source>,
}

/// Asks the generation API for venues trending near `origin`.
///
/// Citations from the grounding payload are returned as sources; those that
/// point at Instagram reels or YouTube shorts are also attached to the
/// candidates they appear to mention. Zero candidates is not an error here.
///
/// # Errors
///
/// - [`PipelineError::Unauthorized`] if the API rejected the key.
/// - [`PipelineError::Discovery`] for any other failure, including output
///   that contains no usable JSON.
pub async fn discover(
    client: &GeminiClient,
    model: &str,
    origin: &Coordinates,
    query: &str,
    settings: &UserSettings,
) -> Result<Discovery, PipelineError> {
    let request = GenerateContentRequest::prompt(discovery_prompt(origin, query, settings))
        .with_tool(Tool::google_search())
        .json_output();

    let response = client.generate(model, &request).await.map_err(|e| {
        tracing::error!(error = %e, "trend discovery request failed");
        PipelineError::from_discovery(e)
    })?;

    let citations = response.web_citations();
    let sources: Vec<Source> = citations
        .iter()
        .map(|c| Source {
            uri: c.uri.clone(),
            title: c.title.clone(),
        })
        .collect();

    let text = response.text().unwrap_or_else(|| "[]".to_string());
    let mut candidates = extract_json(&text)
        .and_then(parse_candidates)
        .map_err(|e| {
            tracing::error!(error = %e, "trend discovery returned malformed output");
            PipelineError::from_discovery(e)
        })?;

    associate_citation_links(&mut candidates, &citations);

    tracing::info!(
        candidates = candidates.len(),
        sources = sources.len(),
        "trend discovery complete"
    );

    Ok(Discovery {
        candidates,
        sources,
    })
}

/// Turns the model's JSON into candidates.
///
/// Accepts a bare array, a single candidate object, or an object wrapping
/// the array under any key. Entries that fail to deserialize or have no
/// name are skipped. Candidate-supplied links that are not short-form
/// videos are dropped.
pub(crate) fn parse_candidates(value: Value) -> Result<Vec<Candidate>, GeminiError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if map.contains_key("name") {
                vec![Value::Object(map)]
            } else {
                map.into_iter()
                    .find_map(|(_, v)| match v {
                        Value::Array(items) => Some(items),
                        _ => None,
                    })
                    .ok_or_else(|| {
                        GeminiError::MalformedResponse("expected an array of places".to_string())
                    })?
            }
        }
        other => {
            return Err(GeminiError::MalformedResponse(format!(
                "expected an array of places, got {other}"
            )))
        }
    };

    let candidates = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Candidate>(item) {
            Ok(mut candidate) => {
                candidate.name = candidate.name.trim().to_string();
                if candidate.name.is_empty() {
                    tracing::warn!("skipping discovered place without a name");
                    return None;
                }
                candidate.video_links.retain(|l| is_short_form(&l.url));
                Some(candidate)
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unparseable discovered place");
                None
            }
        })
        .collect();

    Ok(candidates)
}

/// Attaches citation-derived reel/short links to candidates.
///
/// A link is attached when the citation title contains the candidate name,
/// or when the candidate name itself contains "viral". This is a loose
/// heuristic: a generic name can pick up links about other venues.
pub(crate) fn associate_citation_links(candidates: &mut [Candidate], citations: &[WebCitation]) {
    let video_citations: Vec<(String, VideoLink)> = citations
        .iter()
        .filter_map(|c| classify_citation(&c.uri).map(|link| (c.title.to_lowercase(), link)))
        .collect();

    if video_citations.is_empty() {
        return;
    }

    for candidate in candidates.iter_mut() {
        let name = candidate.name.to_lowercase();
        for (title, link) in &video_citations {
            let matches = title.contains(&name) || name.contains("viral");
            if matches && !candidate.video_links.iter().any(|l| l.url == link.url) {
                candidate.video_links.push(link.clone());
            }
        }
    }
}
