//! Integration tests for the vitae-forge pipeline.
//!
//! These tests validate:
//! - Escaping safety and single-application discipline
//! - Generator determinism and fixed section emission
//! - Pagination arithmetic, including the exact-multiple boundary
//! - Filename derivation
//! - Override coverage for every class the previews emit
//! - PDF output exists and has valid format

use vitae_forge::escape::{escape, needs_escaping};
use vitae_forge::export::{artifact_file_name, paginate, ExportConfig};
use vitae_forge::pipeline::{export_profile, profile_from_json};
use vitae_forge::preview::render_preview;
use vitae_forge::profile::{
    normalize, EducationDraft, ExperienceDraft, PartialProfile, PersonDraft, ProjectDraft,
};
use vitae_forge::{generate_variant_a, generate_variant_b, samples, style, Variant};

// =====================================================================
// Helpers
// =====================================================================

fn empty_aggregate() -> vitae_forge::ProfileAggregate {
    normalize(&PartialProfile::default())
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

// =====================================================================
// Escaping engine
// =====================================================================

#[test]
fn escaping_covers_every_special_character() {
    let input = r"\ { } $ % # & _ ^ ~";
    let escaped = escape(input);
    assert!(escaped.contains("\\textbackslash "));
    assert!(escaped.contains("\\textasciicircum{}"));
    assert!(escaped.contains("\\textasciitilde{}"));

    // After removing the emitted escape sequences, no special character
    // may survive: every occurrence was escaped.
    let cleaned = escaped
        .replace("\\textbackslash ", "")
        .replace("\\textasciicircum{}", "")
        .replace("\\textasciitilde{}", "")
        .replace("\\{", "")
        .replace("\\}", "")
        .replace("\\$", "")
        .replace("\\%", "")
        .replace("\\#", "")
        .replace("\\&", "")
        .replace("\\_", "");
    for c in ['\\', '{', '}', '$', '%', '#', '&', '_', '^', '~'] {
        assert!(
            !cleaned.contains(c),
            "unescaped {c:?} leaked into {escaped:?}"
        );
    }
}

#[test]
fn escaping_is_not_idempotent() {
    for s in ["a&b", "50%", "x_y", "\\cmd", "{}", "2^8", "~home"] {
        assert!(needs_escaping(s));
        let once = escape(s);
        assert_ne!(
            escape(&once),
            once,
            "single-application discipline regression for {s:?}"
        );
    }
}

#[test]
fn generator_never_leaks_unescaped_leaves() {
    let mut profile = empty_aggregate();
    profile.experience.company = "B&O 100% _rail_ #1".to_string();
    profile.education[0].school = "École ^Polytechnique~".to_string();
    for src in [generate_variant_a(&profile), generate_variant_b(&profile)] {
        assert!(src.contains("B\\&O 100\\% \\_rail\\_ \\#1"));
        assert!(src.contains("École \\textasciicircum{}Polytechnique\\textasciitilde{}"));
        assert!(!src.contains("B&O"));
    }
}

// =====================================================================
// Generators
// =====================================================================

#[test]
fn generators_are_byte_deterministic() {
    let partial = profile_from_json(samples::sample_profile_json()).unwrap();
    let profile = normalize(&partial);
    assert_eq!(generate_variant_a(&profile), generate_variant_a(&profile));
    assert_eq!(generate_variant_b(&profile), generate_variant_b(&profile));
}

#[test]
fn empty_profile_still_emits_every_section() {
    let profile = empty_aggregate();

    let a = generate_variant_a(&profile);
    for section in ["Education", "Experience", "Projects", "Technologies"] {
        assert!(
            a.contains(&format!("\\section{{{section}}}")),
            "variant A missing section {section}"
        );
    }

    let b = generate_variant_b(&profile);
    for section in ["Experience", "Projects", "Education", "Skills", "Links"] {
        assert!(
            b.contains(&format!("\\columnSection{{{section}}}")),
            "variant B missing section {section}"
        );
    }

    // Sample placeholders, never blank bodies.
    assert!(a.contains("Nimbus Labs"));
    assert!(a.contains("State University"));
    assert!(b.contains("Trailhead"));
}

#[test]
fn empty_detail_lists_emit_no_list_construct() {
    let partial = PartialProfile {
        person: PersonDraft {
            first: "Sam".into(),
            last: "Quiet".into(),
            ..Default::default()
        },
        experience: Some(ExperienceDraft {
            company: "Stillwater".into(),
            title: "Engineer".into(),
            work_done: vec![],
            tools_used: vec!["Rust".into()],
            ..Default::default()
        }),
        education: vec![EducationDraft {
            school: "Quiet College".into(),
            ..Default::default()
        }],
        projects: vec![ProjectDraft {
            name: "Hush".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let profile = normalize(&partial);

    // The preambles define the list macros; only the body may not use them.
    let body = |src: &str| src[src.find("\\begin{document}").unwrap()..].to_string();

    let a = body(&generate_variant_a(&profile));
    assert!(
        !a.contains("\\detailListStart"),
        "no bullet source anywhere, so variant A must emit no detail list"
    );

    let b = body(&generate_variant_b(&profile));
    assert!(
        !b.contains("\\begin{itemize}"),
        "no bullet source anywhere, so variant B must emit no itemize"
    );
}

#[test]
fn technologies_omits_the_empty_tool_source() {
    // One education entry, an experience with no tools, two projects: the
    // first with tools, the second without.
    let partial = PartialProfile {
        experience: Some(ExperienceDraft {
            company: "Stillwater".into(),
            title: "Engineer".into(),
            tools_used: vec![],
            ..Default::default()
        }),
        education: vec![EducationDraft {
            school: "Quiet College".into(),
            ..Default::default()
        }],
        projects: vec![
            ProjectDraft {
                name: "Tooling".into(),
                tools: vec!["Rust".into(), "SQLite".into()],
                ..Default::default()
            },
            ProjectDraft {
                name: "Toolless".into(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let profile = normalize(&partial);
    let src = generate_variant_a(&profile);

    assert!(src.contains("\\textbf{Projects}{: Rust, SQLite}"));
    assert!(
        !src.contains("\\textbf{Professional}"),
        "empty experience tool source must be omitted, not emitted blank"
    );
    assert!(!src.contains("\\textbf{Technologies}{:"));

    // Both sources empty → the generic sample line appears instead.
    let mut bare = profile.clone();
    bare.projects[0].tools.clear();
    let src = generate_variant_a(&bare);
    assert!(src.contains("\\textbf{Technologies}{:"));
}

// =====================================================================
// Pagination arithmetic
// =====================================================================

#[test]
fn three_thousand_units_make_three_pages() {
    let slices = paginate(900, 3000, 900.0, 1000.0);
    let offsets: Vec<f32> = slices.iter().map(|s| s.offset_y).collect();
    assert_eq!(offsets, vec![0.0, -1000.0, -2000.0]);
}

#[test]
fn exact_multiple_emits_no_spurious_trailing_page() {
    assert_eq!(paginate(900, 2000, 900.0, 1000.0).len(), 2);
    assert_eq!(paginate(900, 1000, 900.0, 1000.0).len(), 1);
}

#[test]
fn short_image_is_placed_once_at_origin() {
    let slices = paginate(794, 600, 210.0, 297.0);
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].offset_y, 0.0);
}

// =====================================================================
// Filename derivation
// =====================================================================

#[test]
fn filename_from_messy_name() {
    let partial = PartialProfile {
        person: PersonDraft {
            first: "  Ada  ".into(),
            last: " Lovelace ".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    let profile = normalize(&partial);
    assert_eq!(artifact_file_name(&profile.person), "ada_lovelace_resume.pdf");
}

#[test]
fn filename_generic_fallback() {
    let mut profile = empty_aggregate();
    profile.person.first.clear();
    profile.person.middle.clear();
    profile.person.last.clear();
    assert_eq!(artifact_file_name(&profile.person), "untitled_resume.pdf");
}

// =====================================================================
// Preview / export invariants
// =====================================================================

#[test]
fn every_preview_class_has_a_literal_override() {
    let profile = empty_aggregate();
    for variant in [Variant::RowBased, Variant::TwoColumn] {
        let markup = render_preview(&profile, variant, 1.0);
        let nodes = vitae_forge::dom::parse_markup(&markup);
        for class in vitae_forge::dom::collect_classes(&nodes) {
            assert!(
                style::is_supported_class(&class),
                "class '{class}' reachable by {variant:?} has no literal override"
            );
        }
    }
}

#[test]
fn scale_never_changes_the_content_subtree() {
    let profile = empty_aggregate();
    for variant in [Variant::RowBased, Variant::TwoColumn] {
        let unscaled = render_preview(&profile, variant, 1.0);
        let scaled = render_preview(&profile, variant, 2.5);
        let content = |s: &str| s[s.find("resume-content").unwrap()..].to_string();
        assert_eq!(content(&unscaled), content(&scaled));
    }
}

// =====================================================================
// Full export path
// =====================================================================

#[test]
fn export_produces_valid_pdf_for_both_variants() {
    let partial = profile_from_json(samples::sample_profile_json()).unwrap();
    for variant in [Variant::RowBased, Variant::TwoColumn] {
        let artifact = export_profile(&partial, variant, &ExportConfig::default())
            .unwrap_or_else(|e| panic!("export failed for {variant:?}: {e}"));
        assert_valid_pdf(&artifact.bytes);
        assert!(artifact.page_count >= 1);
        assert_eq!(artifact.file_name, "jordan_rivera_resume.pdf");
    }
}

#[test]
fn sequential_exports_reuse_the_slot_cleanly() {
    let partial = PartialProfile::default();
    for _ in 0..2 {
        let artifact = export_profile(&partial, Variant::RowBased, &ExportConfig::default())
            .expect("export should succeed");
        assert_valid_pdf(&artifact.bytes);
    }
    // Holding the slot guarantees no export is mid-flight while we check
    // that every container was released.
    let _slot = vitae_forge::export::ExportGuard::acquire();
    assert_eq!(vitae_forge::export::live_isolation_containers(), 0);
}
