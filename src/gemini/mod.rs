//! Generation client for the hosted multimodal image model.
//!
//! - `client.rs` - request assembly, the HTTP call and response normalization
//! - `credentials.rs` - API key resolution (session selection, then env)
//! - `error.rs` - failure taxonomy used by the UI
//! - `wire.rs` - serde types for the `generateContent` JSON format

pub mod client;
pub mod credentials;
pub mod error;
pub mod wire;

pub use client::GenerationClient;
pub use credentials::CredentialStore;
pub use error::{ErrorKind, GenerateError};

use crate::state::data::EncodedImage;

/// One generation call's inputs
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Tool instruction, before the action prefix and exclusions are added
    pub instruction: String,
    /// Image to edit, sent first
    pub primary_image: Option<EncodedImage>,
    /// Style reference, sent second
    pub reference_image: Option<EncodedImage>,
    /// Negative prompt; blank means none
    pub excluded_terms: Option<String>,
}

/// A citation returned by grounding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub title: String,
    pub uri: String,
}

/// Normalized successful response
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Always tagged `image/png`
    pub image: EncodedImage,
    /// Citations in the order returned, possibly empty
    pub source_links: Vec<SourceLink>,
}
