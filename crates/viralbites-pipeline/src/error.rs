use thiserror::Error;
use viralbites_core::ConfigError;
use viralbites_gemini::GeminiError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The generation API rejected the key. Never degraded: the user has to
    /// rotate the key before anything else can work.
    #[error(
        "Access denied: the API key was rejected or flagged as leaked. \
         Generate a new key and update GEMINI_API_KEY."
    )]
    Unauthorized(#[source] GeminiError),

    #[error("Failed to discover viral trends. Please try again.")]
    Discovery(#[source] GeminiError),

    #[error("No viral places found matching your criteria.")]
    NoPlacesFound,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build generation client: {0}")]
    Client(#[source] GeminiError),
}

impl PipelineError {
    /// Wraps a discovery-phase failure, keeping key rejections distinct.
    pub(crate) fn from_discovery(err: GeminiError) -> Self {
        if err.is_auth_failure() {
            PipelineError::Unauthorized(err)
        } else {
            PipelineError::Discovery(err)
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PipelineError::Unauthorized(_))
    }
}
