//! # vitae-forge – profile → resume document pipeline
//!
//! This crate renders a professional profile into two artifacts:
//!
//! 1. **Typesetting source** – [`latex`] emits a complete LaTeX document in
//!    one of two grammars (row-based single column, or two-column), built
//!    from the shared [`doctree`] representation with [`escape`]d leaves.
//! 2. **Paginated PDF** – [`preview`] renders the same document tree as
//!    markup; [`export`] isolates the content subtree, normalizes its
//!    styles ([`style`]), settles the layout ([`layout`]), rasterizes it
//!    ([`raster`]), and windows the flattened bitmap across A4 pages.
//!
//! Profile data arrives as a partially-populated object and is defaulted
//! once, upstream of everything else, by [`profile::normalize`].

pub mod doctree;
pub mod dom;
pub mod error;
pub mod escape;
pub mod export;
pub mod fonts;
pub mod latex;
pub mod layout;
pub mod pipeline;
pub mod preview;
pub mod profile;
pub mod raster;
pub mod samples;
pub mod style;

// Re-exports for convenience
pub use doctree::Variant;
pub use error::ExportError;
pub use export::{export_to_document, export_to_file, ExportArtifact, ExportConfig};
pub use latex::{generate_variant_a, generate_variant_b};
pub use pipeline::{export_profile, export_profile_to_file, generate_source, profile_from_json};
pub use preview::{preview_surface, render_preview, PreviewView};
pub use profile::{normalize, PartialProfile, ProfileAggregate};
