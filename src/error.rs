//! Unified error type for the generation and export pipeline.

use thiserror::Error;

/// Failures surfaced by the export pipeline and its boundaries.
///
/// Silent fidelity degradation (a utility class without a literal override)
/// is deliberately *not* represented here — it is logged, not raised.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The preview markup did not contain the expected content node.
    /// Raised immediately during isolation; no retry.
    #[error("preview content node '#{0}' not found in markup")]
    ContentNodeMissing(&'static str),

    /// The rasterizer could not produce a bitmap.
    #[error("rasterization failed: {0}")]
    Raster(String),

    /// PDF assembly or image encoding failed.
    #[error("document encoding failed: {0}")]
    Pdf(String),

    /// The profile JSON handed over by the profile subsystem was malformed.
    #[error("invalid profile data: {0}")]
    Profile(#[from] serde_json::Error),

    /// Artifact persistence failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
