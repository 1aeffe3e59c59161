//! Document tree – the neutral intermediate representation between the
//! profile aggregate and the three rendering backends (text grammar A, text
//! grammar B, markup preview).
//!
//! Both text generators and the preview renderer consume this tree, so the
//! fixed section ordering and conditional-render rules live in exactly one
//! place. All strings in the tree are raw profile text; each backend applies
//! its own escaping at emission time.

use crate::profile::ProfileAggregate;
use crate::samples;

/// One of the two supported document layout grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Single-column, ATS-oriented row layout.
    #[default]
    RowBased,
    /// Two-column layout: centered header, independently flowing columns.
    TwoColumn,
}

impl Variant {
    /// Parse a user-facing selector ("a"/"b", case-insensitive).
    pub fn from_selector(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "row" | "row-based" => Some(Variant::RowBased),
            "b" | "column" | "two-column" => Some(Variant::TwoColumn),
            _ => None,
        }
    }
}

/// Which column of the two-column grammar a section flows into.
/// Row-based sections always span the full width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Full,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Education,
    Experience,
    Projects,
    Technologies,
    Skills,
    Links,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Header => "",
            SectionKind::Education => "Education",
            SectionKind::Experience => "Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Technologies => "Technologies",
            SectionKind::Skills => "Skills",
            SectionKind::Links => "Links",
        }
    }
}

/// A complete document ready for emission by any backend.
#[derive(Debug, Clone)]
pub struct Document {
    pub variant: Variant,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub column: Column,
    pub body: SectionBody,
}

#[derive(Debug, Clone)]
pub enum SectionBody {
    Header(HeaderBlock),
    Entries(Vec<Entry>),
    SkillGroups(Vec<SkillGroup>),
    Links(Vec<NamedLink>),
}

/// Centered name + contact line.
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub full_name: String,
    pub email: String,
    pub links: Vec<NamedLink>,
}

/// One dated entry: education record, the experience record, or a project.
#[derive(Debug, Clone)]
pub struct Entry {
    /// School, company, or project name.
    pub primary: String,
    /// Degree line, job title, or project owner.
    pub secondary: String,
    pub date_range: String,
    pub location: String,
    /// Optional detail bullets; an empty list emits no list construct.
    pub bullets: Vec<String>,
    /// Hyperlink attached to the primary label, when one exists.
    pub link: Option<String>,
}

/// A labelled tool list inside the Technologies/Skills section.
#[derive(Debug, Clone)]
pub struct SkillGroup {
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NamedLink {
    pub label: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

impl Document {
    /// Compose the section tree for one variant. Section ordering is fixed
    /// and independent of input order; every section is always present
    /// because the aggregate is fully defaulted.
    pub fn compose(profile: &ProfileAggregate, variant: Variant) -> Self {
        let sections = match variant {
            Variant::RowBased => vec![
                header_section(profile, Column::Full),
                entries_section(SectionKind::Education, Column::Full, education_entries(profile)),
                entries_section(SectionKind::Experience, Column::Full, experience_entries(profile)),
                entries_section(SectionKind::Projects, Column::Full, project_entries(profile)),
                Section {
                    kind: SectionKind::Technologies,
                    column: Column::Full,
                    body: SectionBody::SkillGroups(skill_groups(profile)),
                },
            ],
            Variant::TwoColumn => vec![
                header_section(profile, Column::Full),
                entries_section(SectionKind::Experience, Column::Left, experience_entries(profile)),
                entries_section(SectionKind::Projects, Column::Left, project_entries(profile)),
                entries_section(SectionKind::Education, Column::Right, education_entries(profile)),
                Section {
                    kind: SectionKind::Skills,
                    column: Column::Right,
                    body: SectionBody::SkillGroups(skill_groups(profile)),
                },
                Section {
                    kind: SectionKind::Links,
                    column: Column::Right,
                    body: SectionBody::Links(profile_links(profile)),
                },
            ],
        };
        Document { variant, sections }
    }

    pub fn sections_in(&self, column: Column) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.column == column)
    }
}

fn header_section(profile: &ProfileAggregate, column: Column) -> Section {
    Section {
        kind: SectionKind::Header,
        column,
        body: SectionBody::Header(HeaderBlock {
            full_name: profile.person.full_name(),
            email: profile.links.display_email(),
            links: profile_links(profile),
        }),
    }
}

fn entries_section(kind: SectionKind, column: Column, entries: Vec<Entry>) -> Section {
    Section {
        kind,
        column,
        body: SectionBody::Entries(entries),
    }
}

/// Join two date display strings into a range, tolerating absent ends.
pub fn date_range(start: &str, end: &str) -> String {
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (false, false) => format!("{start} -- {end}"),
    }
}

fn education_entries(profile: &ProfileAggregate) -> Vec<Entry> {
    profile
        .education
        .iter()
        .map(|e| {
            let degree_line = match (e.degree.is_empty(), e.field.is_empty()) {
                (false, false) => format!("{}, {}", e.degree, e.field),
                (false, true) => e.degree.clone(),
                (true, false) => e.field.clone(),
                (true, true) => String::new(),
            };
            Entry {
                primary: e.school.clone(),
                secondary: degree_line,
                date_range: date_range(&e.start_date, &e.end_date),
                location: e.location.clone(),
                bullets: if e.description.is_empty() {
                    vec![]
                } else {
                    vec![e.description.clone()]
                },
                link: None,
            }
        })
        .collect()
}

fn experience_entries(profile: &ProfileAggregate) -> Vec<Entry> {
    let x = &profile.experience;
    vec![Entry {
        primary: x.company.clone(),
        secondary: x.title.clone(),
        date_range: date_range(&x.start_date, &x.end_date),
        location: x.location.clone(),
        bullets: x.work_done.clone(),
        link: None,
    }]
}

fn project_entries(profile: &ProfileAggregate) -> Vec<Entry> {
    profile
        .projects
        .iter()
        .map(|p| {
            let mut bullets = Vec::new();
            if !p.description.is_empty() {
                bullets.push(p.description.clone());
            }
            if !p.topics.is_empty() {
                bullets.push(p.topics.join(", "));
            }
            Entry {
                primary: p.name.clone(),
                secondary: p.owner.clone(),
                date_range: date_range(&p.created_at, &p.updated_at),
                location: String::new(),
                bullets,
                link: if p.landing_page.is_empty() {
                    None
                } else {
                    Some(p.landing_page.clone())
                },
            }
        })
        .collect()
}

/// Aggregate tool lists from the two independent sources: the experience
/// record and the first project. A source with no tools contributes no
/// sub-block; the generic sample line appears only when both are empty.
fn skill_groups(profile: &ProfileAggregate) -> Vec<SkillGroup> {
    let mut groups = Vec::new();
    if !profile.experience.tools_used.is_empty() {
        groups.push(SkillGroup {
            label: "Professional".to_string(),
            items: profile.experience.tools_used.clone(),
        });
    }
    if let Some(first) = profile.projects.first() {
        if !first.tools.is_empty() {
            groups.push(SkillGroup {
                label: "Projects".to_string(),
                items: first.tools.clone(),
            });
        }
    }
    if groups.is_empty() {
        groups.push(SkillGroup {
            label: "Technologies".to_string(),
            items: samples::sample_skill_line(),
        });
    }
    groups
}

fn profile_links(profile: &ProfileAggregate) -> Vec<NamedLink> {
    let mut links = Vec::new();
    for (label, url) in [
        ("Portfolio", &profile.links.portfolio),
        ("GitHub", &profile.links.github),
        ("LinkedIn", &profile.links.linkedin),
    ] {
        if !url.is_empty() {
            links.push(NamedLink {
                label: label.to_string(),
                url: url.clone(),
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{normalize, PartialProfile};

    fn empty_profile() -> ProfileAggregate {
        normalize(&PartialProfile::default())
    }

    #[test]
    fn row_based_section_order_is_fixed() {
        let doc = Document::compose(&empty_profile(), Variant::RowBased);
        let kinds: Vec<SectionKind> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Header,
                SectionKind::Education,
                SectionKind::Experience,
                SectionKind::Projects,
                SectionKind::Technologies,
            ]
        );
    }

    #[test]
    fn two_column_partitioning() {
        let doc = Document::compose(&empty_profile(), Variant::TwoColumn);
        let left: Vec<SectionKind> = doc.sections_in(Column::Left).map(|s| s.kind).collect();
        let right: Vec<SectionKind> = doc.sections_in(Column::Right).map(|s| s.kind).collect();
        assert_eq!(left, vec![SectionKind::Experience, SectionKind::Projects]);
        assert_eq!(
            right,
            vec![SectionKind::Education, SectionKind::Skills, SectionKind::Links]
        );
    }

    #[test]
    fn skill_groups_fall_back_only_when_both_sources_empty() {
        let mut profile = empty_profile();
        profile.experience.tools_used.clear();
        profile.projects[0].tools.clear();
        let groups = skill_groups(&profile);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Technologies");

        profile.experience.tools_used = vec!["Rust".into()];
        let groups = skill_groups(&profile);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Professional");
    }

    #[test]
    fn date_range_tolerates_absent_ends() {
        assert_eq!(date_range("Jan 2020", "May 2021"), "Jan 2020 -- May 2021");
        assert_eq!(date_range("Jan 2020", ""), "Jan 2020");
        assert_eq!(date_range("", ""), "");
    }
}
