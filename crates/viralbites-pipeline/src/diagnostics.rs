//! Self-checks for the distance math, API connectivity, and map verification.

use serde::Serialize;
use viralbites_core::{distance_km, Candidate, Coordinates};
use viralbites_gemini::GenerateContentRequest;

use crate::pipeline::SearchPipeline;
use crate::verification::verify_candidate;

/// Times Square, used as the fixed reference for the verification probe.
const REFERENCE_ORIGIN: Coordinates = Coordinates::new(40.7580, -73.9855);
const REFERENCE_VENUE: &str = "Starbucks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "PASS"),
            TestStatus::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub message: String,
}

impl TestResult {
    fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: TestStatus::Pass,
            message: message.into(),
        }
    }

    fn fail(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: TestStatus::Fail,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Runs all probes in order. A failing probe never stops later ones.
pub async fn run_diagnostics(pipeline: &SearchPipeline) -> Vec<TestResult> {
    let results = vec![
        check_distance(),
        check_connection(pipeline).await,
        check_image_fetch(pipeline).await,
    ];

    let failed = results.iter().filter(|r| !r.passed()).count();
    tracing::info!(total = results.len(), failed, "diagnostics complete");
    results
}

fn check_distance() -> TestResult {
    const NAME: &str = "Distance Algorithm";
    let d = distance_km(0.0, 0.0, 0.0, 1.0);
    if (110.0..=112.0).contains(&d) {
        TestResult::pass(NAME, format!("Calculated 1 deg ≈ {d}km"))
    } else {
        TestResult::fail(NAME, format!("Math error: {d}km"))
    }
}

async fn check_connection(pipeline: &SearchPipeline) -> TestResult {
    const NAME: &str = "Gemini API Connection";
    let request = GenerateContentRequest::prompt("Ping");

    match pipeline
        .client()
        .generate(pipeline.verification_model(), &request)
        .await
    {
        Ok(response) if response.text().is_some() => {
            TestResult::pass(NAME, "Connected to the generation API.")
        }
        Ok(_) => TestResult::fail(NAME, "No text returned."),
        Err(e) if e.is_auth_failure() => TestResult::fail(NAME, "API Key Invalid/Leaked (403)"),
        Err(e) => TestResult::fail(NAME, e.to_string()),
    }
}

async fn check_image_fetch(pipeline: &SearchPipeline) -> TestResult {
    const NAME: &str = "Maps Image Fetch";
    let candidate = Candidate {
        name: REFERENCE_VENUE.to_string(),
        viral_reason: Some("Test".to_string()),
        ..Candidate::default()
    };

    match verify_candidate(
        pipeline.client(),
        pipeline.verification_model(),
        &candidate,
        &REFERENCE_ORIGIN,
    )
    .await
    {
        Ok(Some(place)) => match place.image_url {
            Some(url) => {
                let preview: String = url.chars().take(30).collect();
                TestResult::pass(NAME, format!("Found image: {preview}..."))
            }
            None => TestResult::fail(
                NAME,
                format!("Verified '{}' but image URL is missing.", place.name),
            ),
        },
        Ok(None) => TestResult::fail(NAME, "Verification returned no results."),
        Err(e) => TestResult::fail(NAME, e.to_string()),
    }
}
