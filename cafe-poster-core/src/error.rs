//! Error taxonomy for the publishing pipeline.
//!
//! Each variant is caught at a fixed boundary:
//! - [`PipelineError::ImageFetch`] at the single image,
//! - [`PipelineError::ContentGeneration`] and [`PipelineError::Publish`] at the item,
//! - [`PipelineError::Listing`] at the instrument type,
//! - [`PipelineError::Credential`] and [`PipelineError::UnknownType`] at the account.
//!
//! Only [`PipelineError::Configuration`] escapes [`crate::orchestrate::Orchestrator::run`].

use thiserror::Error;

/// Error returned by external collaborators (HTTP clients, mocks).
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Account lookup, token exchange or token persistence failed.
    #[error("credential error: {0}")]
    Credential(String),

    /// The instrument list could not be fetched or was empty.
    #[error("listing error: {0}")]
    Listing(String),

    #[error("content generation failed: {0}")]
    ContentGeneration(String),

    #[error("publish failed: {0}")]
    Publish(String),

    /// Non-fatal; logged and skipped.
    #[error("image fetch failed: {0}")]
    ImageFetch(String),

    #[error("unknown instrument type: {0}")]
    UnknownType(String),

    /// Wiring defect in the run itself (e.g. nothing to process).
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
