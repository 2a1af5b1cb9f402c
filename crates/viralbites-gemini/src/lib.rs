//! Client for the Gemini `generateContent` REST endpoint.
//!
//! Wraps `reqwest` with API-key handling, typed request/response bodies
//! (including grounding citations), classification of authorization
//! failures, and a tolerant extractor for JSON embedded in model text.

pub mod client;
pub mod error;
pub mod json;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use json::{extract_json, fenced_block};
pub use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GroundingChunk, Part, Tool,
    WebCitation,
};
