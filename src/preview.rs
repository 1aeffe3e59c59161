//! Preview renderer – emits the markup tree that mirrors the chosen
//! template's layout, used both for user feedback and as the rasterization
//! source of the export pipeline.
//!
//! The markup is built from the same [`Document`] tree the text generators
//! consume, so section ordering and conditional-render rules cannot drift
//! between the two output paths. Every utility class emitted here must have
//! a literal override in [`crate::style`] – see the override-coverage test
//! in the integration suite.

use crate::doctree::{
    Column, Document, Entry, HeaderBlock, NamedLink, Section, SectionBody, SectionKind,
    SkillGroup, Variant,
};
use crate::latex::{generate_variant_a, generate_variant_b};
use crate::profile::ProfileAggregate;

/// Id of the unscaled content node the export pipeline isolates.
pub const CONTENT_NODE_ID: &str = "resume-content";

/// Which face of the preview surface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewView {
    /// The rendered visual tree.
    #[default]
    Rendered,
    /// The generated typesetting source text.
    Source,
}

/// Render the preview markup for one profile/variant pairing.
///
/// `scale` is a pure display multiplier: it is carried on the outer wrapper
/// only (`data-scale`) and never alters the content subtree, which is what
/// the export pipeline clones.
pub fn render_preview(profile: &ProfileAggregate, variant: Variant, scale: f32) -> String {
    let doc = Document::compose(profile, variant);
    let mut out = String::with_capacity(2048);
    out.push_str(&format!(
        "<div class=\"resume-preview\" data-scale=\"{scale}\">\n"
    ));
    out.push_str(&format!(
        "<div id=\"{CONTENT_NODE_ID}\" class=\"bg-white text-gray-900 p-10\">\n"
    ));
    match variant {
        Variant::RowBased => render_row_based(&mut out, &doc),
        Variant::TwoColumn => render_two_column(&mut out, &doc),
    }
    out.push_str("</div>\n</div>\n");
    out
}

/// The interactive toggle between the rendered preview and the generated
/// source text for the same profile/variant pairing.
pub fn preview_surface(
    profile: &ProfileAggregate,
    variant: Variant,
    view: PreviewView,
    scale: f32,
) -> String {
    match view {
        PreviewView::Rendered => render_preview(profile, variant, scale),
        PreviewView::Source => format!(
            "<div class=\"resume-preview\" data-scale=\"{scale}\"><pre>{}</pre></div>\n",
            html_escape(&copy_source(profile, variant))
        ),
    }
}

/// The text artifact for the copy-to-clipboard affordance (and for handoff
/// to an external compiler).
pub fn copy_source(profile: &ProfileAggregate, variant: Variant) -> String {
    match variant {
        Variant::RowBased => generate_variant_a(profile),
        Variant::TwoColumn => generate_variant_b(profile),
    }
}

// ---------------------------------------------------------------------------
// Variant A – row-based
// ---------------------------------------------------------------------------

fn render_row_based(out: &mut String, doc: &Document) {
    for section in &doc.sections {
        match &section.body {
            SectionBody::Header(header) => render_header(out, header),
            SectionBody::Entries(entries) => {
                render_section_heading(out, section);
                for entry in entries {
                    render_row_entry(out, entry);
                }
                out.push_str("</div>\n");
            }
            SectionBody::SkillGroups(groups) => {
                render_section_heading(out, section);
                render_skill_groups(out, groups);
                out.push_str("</div>\n");
            }
            SectionBody::Links(_) => {}
        }
    }
}

fn render_row_entry(out: &mut String, entry: &Entry) {
    out.push_str("<div class=\"mb-2\">\n");
    out.push_str("<div class=\"flex justify-between\">\n");
    out.push_str(&format!(
        "<span class=\"font-bold\">{}</span>\n<span class=\"text-sm\">{}</span>\n",
        primary_markup(entry),
        html_escape(&entry.date_range)
    ));
    out.push_str("</div>\n<div class=\"flex justify-between\">\n");
    out.push_str(&format!(
        "<span class=\"italic text-sm\">{}</span>\n<span class=\"italic text-sm\">{}</span>\n",
        html_escape(&entry.secondary),
        html_escape(&entry.location)
    ));
    out.push_str("</div>\n");
    render_bullets(out, &entry.bullets);
    out.push_str("</div>\n");
}

// ---------------------------------------------------------------------------
// Variant B – two-column
// ---------------------------------------------------------------------------

fn render_two_column(out: &mut String, doc: &Document) {
    for section in doc.sections_in(Column::Full) {
        if let SectionBody::Header(header) = &section.body {
            render_header(out, header);
        }
    }
    out.push_str("<div class=\"flex gap-6\">\n<div class=\"w-2/3\">\n");
    for section in doc.sections_in(Column::Left) {
        render_column_section(out, section);
    }
    out.push_str("</div>\n<div class=\"w-1/3\">\n");
    for section in doc.sections_in(Column::Right) {
        render_column_section(out, section);
    }
    out.push_str("</div>\n</div>\n");
}

fn render_column_section(out: &mut String, section: &Section) {
    render_section_heading(out, section);
    match &section.body {
        SectionBody::Entries(entries) => {
            for entry in entries {
                render_triple_entry(out, entry);
            }
        }
        SectionBody::SkillGroups(groups) => render_skill_groups(out, groups),
        SectionBody::Links(links) => render_links(out, links),
        SectionBody::Header(_) => {}
    }
    out.push_str("</div>\n");
}

/// Label / descriptor / date-location triple stack.
fn render_triple_entry(out: &mut String, entry: &Entry) {
    out.push_str("<div class=\"mb-2\">\n");
    out.push_str(&format!(
        "<p class=\"font-bold\">{}</p>\n",
        primary_markup(entry)
    ));
    if !entry.secondary.is_empty() {
        out.push_str(&format!(
            "<p class=\"italic text-sm\">{}</p>\n",
            html_escape(&entry.secondary)
        ));
    }
    let date_loc = match (entry.date_range.is_empty(), entry.location.is_empty()) {
        (false, false) => format!("{} | {}", entry.date_range, entry.location),
        (false, true) => entry.date_range.clone(),
        (true, false) => entry.location.clone(),
        (true, true) => String::new(),
    };
    if !date_loc.is_empty() {
        out.push_str(&format!(
            "<p class=\"text-xs text-gray-600\">{}</p>\n",
            html_escape(&date_loc)
        ));
    }
    render_bullets(out, &entry.bullets);
    out.push_str("</div>\n");
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn render_header(out: &mut String, header: &HeaderBlock) {
    out.push_str("<div class=\"text-center mb-4\">\n");
    out.push_str(&format!(
        "<h1 class=\"text-3xl font-bold uppercase\">{}</h1>\n",
        html_escape(&header.full_name)
    ));
    let mut parts = vec![html_escape(&header.email)];
    parts.extend(header.links.iter().map(anchor_markup));
    out.push_str(&format!(
        "<p class=\"text-sm text-gray-600\">{}</p>\n",
        parts.join(" | ")
    ));
    out.push_str("</div>\n");
}

fn render_section_heading(out: &mut String, section: &Section) {
    out.push_str("<div class=\"mb-4\">\n");
    out.push_str(&format!(
        "<h2 class=\"text-lg font-bold uppercase border-b mb-2\">{}</h2>\n",
        section_title(section)
    ));
}

fn section_title(section: &Section) -> &'static str {
    debug_assert!(section.kind != SectionKind::Header);
    section.kind.title()
}

/// Zero bullets emit no list element at all.
fn render_bullets(out: &mut String, bullets: &[String]) {
    if bullets.is_empty() {
        return;
    }
    out.push_str("<ul class=\"list-disc pl-5 text-sm\">\n");
    for bullet in bullets {
        out.push_str(&format!("<li>{}</li>\n", html_escape(bullet)));
    }
    out.push_str("</ul>\n");
}

fn render_skill_groups(out: &mut String, groups: &[SkillGroup]) {
    for group in groups {
        out.push_str(&format!(
            "<p class=\"text-sm\"><span class=\"font-bold\">{}:</span> {}</p>\n",
            html_escape(&group.label),
            html_escape(&group.items.join(", "))
        ));
    }
}

fn render_links(out: &mut String, links: &[NamedLink]) {
    for link in links {
        out.push_str(&format!(
            "<p class=\"text-sm\">{}</p>\n",
            anchor_markup(link)
        ));
    }
}

fn primary_markup(entry: &Entry) -> String {
    match &entry.link {
        Some(url) => format!(
            "<a href=\"{}\" class=\"underline\">{}</a>",
            html_escape(url),
            html_escape(&entry.primary)
        ),
        None => html_escape(&entry.primary),
    }
}

fn anchor_markup(link: &NamedLink) -> String {
    let display = link
        .url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!(
        "<a href=\"{}\" class=\"underline\">{}</a>",
        html_escape(&link.url),
        html_escape(display)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{normalize, PartialProfile};

    fn sample() -> ProfileAggregate {
        normalize(&PartialProfile::default())
    }

    #[test]
    fn preview_carries_scale_on_wrapper_only() {
        let a = render_preview(&sample(), Variant::RowBased, 1.0);
        let b = render_preview(&sample(), Variant::RowBased, 1.5);
        assert!(a.contains("data-scale=\"1\""));
        assert!(b.contains("data-scale=\"1.5\""));
        // Content subtree is unaffected by scale.
        let content = |s: &str| s[s.find(CONTENT_NODE_ID).unwrap()..].to_string();
        assert_eq!(content(&a), content(&b));
    }

    #[test]
    fn both_variants_mark_the_content_node() {
        for variant in [Variant::RowBased, Variant::TwoColumn] {
            let markup = render_preview(&sample(), variant, 1.0);
            assert!(markup.contains(&format!("id=\"{CONTENT_NODE_ID}\"")));
        }
    }

    #[test]
    fn two_column_orders_sections_like_grammar_b() {
        let markup = render_preview(&sample(), Variant::TwoColumn, 1.0);
        let exp = markup.find("Experience").unwrap();
        let edu = markup.find("Education").unwrap();
        assert!(exp < edu, "experience column precedes education column");
    }

    #[test]
    fn source_view_wraps_the_text_artifact() {
        let surface = preview_surface(&sample(), Variant::RowBased, PreviewView::Source, 1.0);
        assert!(surface.contains("<pre>"));
        assert!(surface.contains("documentclass"));
    }

    #[test]
    fn text_is_entity_escaped() {
        let mut p = sample();
        p.experience.company = "Fish & Chips <Co>".to_string();
        let markup = render_preview(&p, Variant::RowBased, 1.0);
        assert!(markup.contains("Fish &amp; Chips &lt;Co&gt;"));
    }
}
