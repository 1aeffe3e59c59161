//! Sample profile content used by the defaulting engine and for demos.
//!
//! Each function returns a complete, realistic sub-object so that a missing
//! section still renders as a plausible placeholder rather than a blank
//! block.

use crate::profile::{Education, Experience, Links, Person, Project};

pub fn sample_person() -> Person {
    Person {
        first: "Jordan".to_string(),
        middle: String::new(),
        last: "Rivera".to_string(),
        github_handle: "jrivera".to_string(),
    }
}

pub fn sample_experience() -> Experience {
    Experience {
        company: "Nimbus Labs".to_string(),
        title: "Software Engineer".to_string(),
        start_date: "Jun 2021".to_string(),
        end_date: "Present".to_string(),
        location: "Austin, TX".to_string(),
        work_done: vec![
            "Designed and shipped a customer-facing analytics dashboard used by 40+ accounts"
                .to_string(),
            "Cut p95 API latency from 800ms to 120ms by introducing request-level caching"
                .to_string(),
            "Mentored two interns through their first production releases".to_string(),
        ],
        tools_used: vec![
            "Rust".to_string(),
            "TypeScript".to_string(),
            "PostgreSQL".to_string(),
            "AWS".to_string(),
        ],
    }
}

pub fn sample_education() -> Education {
    Education {
        school: "State University".to_string(),
        degree: "B.S.".to_string(),
        field: "Computer Science".to_string(),
        start_date: "Aug 2017".to_string(),
        end_date: "May 2021".to_string(),
        location: "Austin, TX".to_string(),
        description: "Dean's list; coursework in distributed systems and compilers".to_string(),
    }
}

pub fn sample_project() -> Project {
    Project {
        name: "Trailhead".to_string(),
        description: "Offline-first hiking log with route sharing and elevation profiles"
            .to_string(),
        topics: vec!["maps".to_string(), "offline-sync".to_string()],
        tools: vec!["Rust".to_string(), "SQLite".to_string()],
        owner: "jrivera".to_string(),
        landing_page: "https://github.com/jrivera/trailhead".to_string(),
        created_at: "Mar 2022".to_string(),
        updated_at: "Jan 2024".to_string(),
    }
}

pub fn sample_projects() -> Vec<Project> {
    vec![
        sample_project(),
        Project {
            name: "Inkwell".to_string(),
            description: "Minimal markdown journal that renders straight to print-ready pages"
                .to_string(),
            topics: vec!["markdown".to_string(), "typesetting".to_string()],
            tools: vec![],
            owner: "jrivera".to_string(),
            landing_page: String::new(),
            created_at: "Nov 2020".to_string(),
            updated_at: "Aug 2021".to_string(),
        },
    ]
}

pub fn sample_links() -> Links {
    Links {
        portfolio: "https://jrivera.dev".to_string(),
        github: "https://github.com/jrivera".to_string(),
        linkedin: "https://linkedin.com/in/jrivera".to_string(),
        handle: "jrivera".to_string(),
    }
}

/// A generic skills line used only when both tool sources are empty.
pub fn sample_skill_line() -> Vec<String> {
    vec![
        "Git".to_string(),
        "Linux".to_string(),
        "Docker".to_string(),
        "CI/CD".to_string(),
    ]
}

/// Canned profile JSON exercising every section, for demos and tests.
pub fn sample_profile_json() -> &'static str {
    r#"{
  "person": { "first": "Jordan", "last": "Rivera", "githubHandle": "jrivera" },
  "experience": {
    "company": "Nimbus Labs",
    "title": "Software Engineer",
    "startDate": "Jun 2021",
    "endDate": "Present",
    "location": "Austin, TX",
    "workDone": ["Shipped the analytics dashboard", "Cut p95 latency to 120ms"],
    "toolsUsed": ["Rust", "TypeScript", "PostgreSQL"]
  },
  "education": [{
    "school": "State University",
    "degree": "B.S.",
    "field": "Computer Science",
    "startDate": "Aug 2017",
    "endDate": "May 2021",
    "location": "Austin, TX",
    "description": "Dean's list"
  }],
  "projects": [{
    "name": "Trailhead",
    "description": "Offline-first hiking log",
    "topics": ["maps"],
    "tools": ["Rust", "SQLite"],
    "organizationOrOwner": "jrivera",
    "landingPageLink": "https://github.com/jrivera/trailhead",
    "createdAt": "Mar 2022",
    "updatedAt": "Jan 2024"
  }],
  "links": {
    "portfolio": "https://jrivera.dev",
    "github": "https://github.com/jrivera",
    "linkedin": "https://linkedin.com/in/jrivera"
  }
}"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_complete() {
        assert!(!sample_experience().work_done.is_empty());
        assert!(!sample_education().school.is_empty());
        assert_eq!(sample_projects().len(), 2);
    }

    #[test]
    fn sample_json_parses() {
        let partial: crate::profile::PartialProfile =
            serde_json::from_str(sample_profile_json()).unwrap();
        assert_eq!(partial.person.first, "Jordan");
        assert_eq!(partial.projects.len(), 1);
    }
}
