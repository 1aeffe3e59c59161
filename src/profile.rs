//! Profile aggregate & defaulting – normalizes the partially-populated
//! profile object handed over by the profile-management subsystem into a
//! fully-populated snapshot the rest of the pipeline can consume without
//! special-casing missing sections.
//!
//! Absence is data, not error: a missing section (or a blank required
//! sub-field) is replaced by a complete, realistic sample sub-object from
//! [`crate::samples`]. Every date is an opaque display string – the core
//! never parses or validates it.

use serde::Deserialize;

use crate::samples;

// ---------------------------------------------------------------------------
// Input shape (everything optional)
// ---------------------------------------------------------------------------

/// The raw profile object as supplied upstream. Any field may be absent;
/// absent string fields deserialize to `""` and are treated as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialProfile {
    pub person: PersonDraft,
    pub experience: Option<ExperienceDraft>,
    pub education: Vec<EducationDraft>,
    pub projects: Vec<ProjectDraft>,
    pub links: LinksDraft,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonDraft {
    pub first: String,
    pub middle: String,
    pub last: String,
    pub github_handle: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceDraft {
    pub company: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub work_done: Vec<String>,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationDraft {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub tools: Vec<String>,
    pub organization_or_owner: String,
    pub landing_page_link: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinksDraft {
    pub portfolio: String,
    pub github: String,
    pub linkedin: String,
    pub handle: String,
}

// ---------------------------------------------------------------------------
// Normalized aggregate
// ---------------------------------------------------------------------------

/// Fully-populated, read-only snapshot for one generation/export call.
#[derive(Debug, Clone)]
pub struct ProfileAggregate {
    pub person: Person,
    /// At most one employer is representable.
    pub experience: Experience,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub links: Links,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub first: String,
    pub middle: String,
    pub last: String,
    pub github_handle: String,
}

impl Person {
    /// Display name: the non-empty parts joined by single spaces.
    pub fn full_name(&self) -> String {
        [&self.first, &self.middle, &self.last]
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct Experience {
    pub company: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub work_done: Vec<String>,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub tools: Vec<String>,
    pub owner: String,
    pub landing_page: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct Links {
    pub portfolio: String,
    pub github: String,
    pub linkedin: String,
    /// Derived handle used to synthesize the display email.
    pub handle: String,
}

impl Links {
    /// The display email shown in document headers.
    pub fn display_email(&self) -> String {
        format!("{}@gmail.com", self.handle)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolve all defaulting once, upstream of the generators. Pure and
/// infallible: every section of the result is populated, either with real
/// data or with a complete sample sub-object.
pub fn normalize(partial: &PartialProfile) -> ProfileAggregate {
    ProfileAggregate {
        person: normalize_person(&partial.person),
        experience: normalize_experience(partial.experience.as_ref()),
        education: normalize_education(&partial.education),
        projects: normalize_projects(&partial.projects),
        links: normalize_links(&partial.links, &partial.person),
    }
}

fn normalize_person(draft: &PersonDraft) -> Person {
    if blank(&draft.first) && blank(&draft.last) {
        return samples::sample_person();
    }
    Person {
        first: draft.first.trim().to_string(),
        middle: draft.middle.trim().to_string(),
        last: draft.last.trim().to_string(),
        github_handle: draft.github_handle.trim().to_string(),
    }
}

fn normalize_experience(draft: Option<&ExperienceDraft>) -> Experience {
    let draft = match draft {
        // Company and title are required; a record missing either is
        // replaced wholesale rather than rendered half-empty.
        Some(d) if !blank(&d.company) && !blank(&d.title) => d,
        _ => return samples::sample_experience(),
    };
    Experience {
        company: draft.company.trim().to_string(),
        title: draft.title.trim().to_string(),
        start_date: draft.start_date.trim().to_string(),
        end_date: draft.end_date.trim().to_string(),
        location: draft.location.trim().to_string(),
        work_done: clean_list(&draft.work_done),
        tools_used: clean_list(&draft.tools_used),
    }
}

fn normalize_education(drafts: &[EducationDraft]) -> Vec<Education> {
    if drafts.is_empty() {
        return vec![samples::sample_education()];
    }
    drafts
        .iter()
        .map(|d| {
            if blank(&d.school) {
                return samples::sample_education();
            }
            Education {
                school: d.school.trim().to_string(),
                degree: d.degree.trim().to_string(),
                field: d.field.trim().to_string(),
                start_date: d.start_date.trim().to_string(),
                end_date: d.end_date.trim().to_string(),
                location: d.location.trim().to_string(),
                description: d.description.trim().to_string(),
            }
        })
        .collect()
}

fn normalize_projects(drafts: &[ProjectDraft]) -> Vec<Project> {
    if drafts.is_empty() {
        return samples::sample_projects();
    }
    drafts
        .iter()
        .map(|d| {
            if blank(&d.name) {
                return samples::sample_project();
            }
            Project {
                name: d.name.trim().to_string(),
                description: d.description.trim().to_string(),
                topics: clean_list(&d.topics),
                tools: clean_list(&d.tools),
                owner: d.organization_or_owner.trim().to_string(),
                landing_page: d.landing_page_link.trim().to_string(),
                created_at: d.created_at.trim().to_string(),
                updated_at: d.updated_at.trim().to_string(),
            }
        })
        .collect()
}

fn normalize_links(draft: &LinksDraft, person: &PersonDraft) -> Links {
    if blank(&draft.portfolio)
        && blank(&draft.github)
        && blank(&draft.linkedin)
        && blank(&draft.handle)
        && blank(&person.github_handle)
    {
        return samples::sample_links();
    }
    let handle = if !blank(&draft.handle) {
        draft.handle.trim().to_string()
    } else if !blank(&person.github_handle) {
        person.github_handle.trim().to_string()
    } else {
        // Last path segment of the github URL, when one was given.
        draft
            .github
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    };
    Links {
        portfolio: draft.portfolio.trim().to_string(),
        github: draft.github.trim().to_string(),
        linkedin: draft.linkedin.trim().to_string(),
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_fully_populated_aggregate() {
        let agg = normalize(&PartialProfile::default());
        assert!(!agg.person.full_name().is_empty());
        assert!(!agg.experience.company.is_empty());
        assert!(!agg.education.is_empty());
        assert!(!agg.projects.is_empty());
        assert!(!agg.links.handle.is_empty());
    }

    #[test]
    fn real_sections_survive_normalization() {
        let partial = PartialProfile {
            person: PersonDraft {
                first: "Ada".into(),
                last: "Lovelace".into(),
                ..Default::default()
            },
            education: vec![EducationDraft {
                school: "University of London".into(),
                degree: "B.Sc.".into(),
                field: "Mathematics".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let agg = normalize(&partial);
        assert_eq!(agg.person.full_name(), "Ada Lovelace");
        assert_eq!(agg.education[0].school, "University of London");
        // Missing sections still default independently.
        assert!(!agg.experience.company.is_empty());
    }

    #[test]
    fn experience_missing_required_field_is_replaced_wholesale() {
        let partial = PartialProfile {
            experience: Some(ExperienceDraft {
                company: "Orbit Systems".into(),
                title: "".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let agg = normalize(&partial);
        assert_ne!(agg.experience.company, "Orbit Systems");
        assert!(!agg.experience.title.is_empty());
    }

    #[test]
    fn handle_falls_back_to_github_url_segment() {
        let partial = PartialProfile {
            links: LinksDraft {
                github: "https://github.com/adalove/".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let agg = normalize(&partial);
        assert_eq!(agg.links.handle, "adalove");
        assert_eq!(agg.links.display_email(), "adalove@gmail.com");
    }

    #[test]
    fn dates_are_opaque_strings() {
        let partial = PartialProfile {
            experience: Some(ExperienceDraft {
                company: "Nimbus".into(),
                title: "Engineer".into(),
                start_date: "circa 2019".into(),
                end_date: "heat death".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let agg = normalize(&partial);
        assert_eq!(agg.experience.start_date, "circa 2019");
        assert_eq!(agg.experience.end_date, "heat death");
    }
}
