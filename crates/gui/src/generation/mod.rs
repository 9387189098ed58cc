//! Backend generation: HTTP client, request sequencing and the UI-facing
//! state that ties them to the tokio runtime.

pub mod client;
pub mod state;
pub mod tracker;

use serde::{Deserialize, Serialize};

pub use client::{GenerationClient, ImageUpload};
pub use state::GenerationState;
pub use tracker::{RequestTracker, Ticket};

/// Failure of a generation request. All variants are terminal for that
/// request; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("enter a prompt first")]
    EmptyPrompt,
    #[error("choose a front image first")]
    MissingFrontImage,
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned HTTP {code}: {detail}")]
    Status { code: u16, detail: String },
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("invalid backend address: {0}")]
    Url(#[from] url::ParseError),
    #[error("cannot read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed quality knobs sent with every text-to-3D request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationQuality {
    pub steps: u32,
    pub guidance: f64,
}

impl Default for GenerationQuality {
    fn default() -> Self {
        Self {
            steps: 64,
            guidance: 15.0,
        }
    }
}
