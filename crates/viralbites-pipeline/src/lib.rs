//! Viral venue discovery pipeline.
//!
//! Discovers venues trending on short-form video platforms through a
//! search-grounded generation call, verifies each one against a maps
//! lookup concurrently, and assembles the surviving records with their
//! citations, verified venues first.

pub mod assembler;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod verification;

mod links;
mod prompts;

pub use assembler::assemble;
pub use diagnostics::{run_diagnostics, TestResult, TestStatus};
pub use discovery::{discover, Discovery};
pub use error::PipelineError;
pub use pipeline::{SearchPipeline, SearchResults};
pub use verification::{verify_candidates, MAX_DISTANCE_KM};
