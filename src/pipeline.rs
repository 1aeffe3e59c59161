//! Pipeline – ties together normalization, source generation, and the
//! export stages behind one-call entry points.

use std::path::{Path, PathBuf};

use crate::doctree::Variant;
use crate::error::ExportError;
use crate::export::{export_to_document, export_to_file, ExportArtifact, ExportConfig};
use crate::latex::{generate_variant_a, generate_variant_b};
use crate::profile::{normalize, PartialProfile, ProfileAggregate};

/// Parse the profile JSON handed over by the profile-management subsystem.
pub fn profile_from_json(json: &str) -> Result<PartialProfile, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// The text artifact for one profile/variant pairing.
pub fn generate_source(profile: &ProfileAggregate, variant: Variant) -> String {
    match variant {
        Variant::RowBased => generate_variant_a(profile),
        Variant::TwoColumn => generate_variant_b(profile),
    }
}

/// Full pipeline: partial profile → normalized aggregate → PDF artifact.
pub fn export_profile(
    partial: &PartialProfile,
    variant: Variant,
    config: &ExportConfig,
) -> Result<ExportArtifact, ExportError> {
    let profile = normalize(partial);
    export_to_document(&profile, variant, config)
}

/// Like [`export_profile`], persisting the artifact under `dir`.
pub fn export_profile_to_file(
    partial: &PartialProfile,
    variant: Variant,
    config: &ExportConfig,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let profile = normalize(partial);
    export_to_file(&profile, variant, config, dir)
}
