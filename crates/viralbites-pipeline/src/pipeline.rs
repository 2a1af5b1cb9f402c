//! End-to-end search: discovery, then concurrent verification, then assembly.

use serde::Serialize;
use viralbites_core::{AppConfig, Coordinates, Source, UserSettings, VenuePlace};
use viralbites_gemini::GeminiClient;

use crate::assembler::assemble;
use crate::discovery::discover;
use crate::error::PipelineError;
use crate::verification::verify_candidates;

/// Places and citations returned from one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub places: Vec<VenuePlace>,
    pub sources: Vec<Source>,
}

/// A configured search pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    client: GeminiClient,
    discovery_model: String,
    verification_model: String,
}

impl SearchPipeline {
    #[must_use]
    pub fn new(
        client: GeminiClient,
        discovery_model: impl Into<String>,
        verification_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            discovery_model: discovery_model.into(),
            verification_model: verification_model.into(),
        }
    }

    /// Builds a pipeline from application config.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `GEMINI_API_KEY` is not set, or
    /// [`PipelineError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let api_key = config.require_gemini_api_key()?;
        let client = GeminiClient::with_base_url(
            api_key,
            config.request_timeout_secs,
            &config.gemini_base_url,
        )
        .map_err(PipelineError::Client)?;

        Ok(Self::new(
            client,
            config.discovery_model.clone(),
            config.verification_model.clone(),
        ))
    }

    #[must_use]
    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    #[must_use]
    pub fn verification_model(&self) -> &str {
        &self.verification_model
    }

    /// Runs one full search around `origin`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Unauthorized`] if any call was rejected for the key.
    /// - [`PipelineError::Discovery`] if trend discovery failed.
    /// - [`PipelineError::NoPlacesFound`] if discovery nominated nothing or
    ///   every candidate was dropped for distance.
    pub async fn search(
        &self,
        origin: &Coordinates,
        query: &str,
        settings: &UserSettings,
    ) -> Result<SearchResults, PipelineError> {
        tracing::info!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            query,
            "Scanning social media for verified trends..."
        );
        let discovery = discover(
            &self.client,
            &self.discovery_model,
            origin,
            query,
            settings,
        )
        .await?;

        if discovery.candidates.is_empty() {
            return Err(PipelineError::NoPlacesFound);
        }

        tracing::info!(
            "Verifying {} potential spots...",
            discovery.candidates.len()
        );
        let places = verify_candidates(
            &self.client,
            &self.verification_model,
            &discovery.candidates,
            origin,
        )
        .await?;

        if places.is_empty() {
            return Err(PipelineError::NoPlacesFound);
        }

        let places = assemble(places, &discovery.sources);
        tracing::info!("Found {} viral spots!", places.len());

        Ok(SearchResults {
            places,
            sources: discovery.sources,
        })
    }
}
