//! Template generators – two independently callable pure functions mapping a
//! normalized profile to a complete document source string, one per layout
//! grammar.
//!
//! Both generators are deterministic (no timestamps, no randomness): byte-
//! identical output for identical input, which the snapshot tests rely on.
//! Every leaf value is passed through [`escape`] exactly once at
//! interpolation time; fragments assembled here (hyperlink macros, row
//! constructs) are never re-escaped.

use crate::doctree::{
    Column, Document, Entry, HeaderBlock, Section, SectionBody, SkillGroup, Variant,
};
use crate::escape::escape;
use crate::profile::ProfileAggregate;

// ---------------------------------------------------------------------------
// Variant A – row-based single column
// ---------------------------------------------------------------------------

const PREAMBLE_A: &str = r"\documentclass[letterpaper,11pt]{article}

\usepackage{latexsym}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage[usenames,dvipsnames]{color}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\usepackage{fancyhdr}
\usepackage{tabularx}

\pagestyle{fancy}
\fancyhf{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}

\addtolength{\oddsidemargin}{-0.5in}
\addtolength{\evensidemargin}{-0.5in}
\addtolength{\textwidth}{1in}
\addtolength{\topmargin}{-.5in}
\addtolength{\textheight}{1.0in}

\titleformat{\section}{\vspace{-4pt}\scshape\raggedright\large}{}{0em}{}[\color{black}\titlerule\vspace{-5pt}]

% Two-cell entry row: label/content left, date or location right.
\newcommand{\entryRow}[4]{
  \item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \textbf{#1} & #2 \\
      \textit{\small#3} & \textit{\small #4} \\
    \end{tabular*}\vspace{-7pt}
}
\newcommand{\projectRow}[2]{
  \item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \small#1 & #2 \\
    \end{tabular*}\vspace{-7pt}
}
\newcommand{\detailItem}[1]{\item\small{#1\vspace{-2pt}}}
\newcommand{\entryListStart}{\begin{itemize}[leftmargin=0.15in, label={}]}
\newcommand{\entryListEnd}{\end{itemize}}
\newcommand{\detailListStart}{\begin{itemize}}
\newcommand{\detailListEnd}{\end{itemize}\vspace{-5pt}}
";

/// Generate the complete row-based (ATS-oriented) document source.
/// Section order: Header, Education, Experience, Projects, Technologies.
pub fn generate_variant_a(profile: &ProfileAggregate) -> String {
    let doc = Document::compose(profile, Variant::RowBased);
    let mut out = String::with_capacity(4096);
    out.push_str(PREAMBLE_A);
    out.push_str("\n\\begin{document}\n");

    for section in &doc.sections {
        match &section.body {
            SectionBody::Header(header) => emit_header_a(&mut out, header),
            SectionBody::Entries(entries) => {
                out.push_str(&format!("\n\\section{{{}}}\n", section.kind.title()));
                out.push_str("  \\entryListStart\n");
                for entry in entries {
                    emit_entry_a(&mut out, section, entry);
                }
                out.push_str("  \\entryListEnd\n");
            }
            SectionBody::SkillGroups(groups) => emit_skills_a(&mut out, groups),
            SectionBody::Links(_) => {}
        }
    }

    out.push_str("\n\\end{document}\n");
    out
}

fn emit_header_a(out: &mut String, header: &HeaderBlock) {
    out.push_str("\n\\begin{center}\n");
    out.push_str(&format!(
        "    \\textbf{{\\Huge \\scshape {}}} \\\\ \\vspace{{1pt}}\n",
        escape(&header.full_name)
    ));
    let mut contact = vec![format!(
        "\\href{{mailto:{0}}}{{\\underline{{{0}}}}}",
        escape(&header.email)
    )];
    contact.extend(header.links.iter().map(|l| hyperlink(&l.url, &bare_url(&l.url))));
    out.push_str(&format!("    \\small {}\n", contact.join(" $|$ ")));
    out.push_str("\\end{center}\n");
}

fn emit_entry_a(out: &mut String, section: &Section, entry: &Entry) {
    use crate::doctree::SectionKind;
    if section.kind == SectionKind::Projects {
        // Single-line project heading with the dates flush right.
        let mut heading = match &entry.link {
            Some(url) => format!("\\textbf{{{}}}", linked(url, &entry.primary)),
            None => format!("\\textbf{{{}}}", escape(&entry.primary)),
        };
        if !entry.secondary.is_empty() {
            heading.push_str(&format!(" $|$ \\emph{{{}}}", escape(&entry.secondary)));
        }
        out.push_str(&format!(
            "    \\projectRow{{{}}}{{{}}}\n",
            heading,
            escape(&entry.date_range)
        ));
    } else {
        out.push_str(&format!(
            "    \\entryRow{{{}}}{{{}}}{{{}}}{{{}}}\n",
            escape(&entry.primary),
            escape(&entry.date_range),
            escape(&entry.secondary),
            escape(&entry.location)
        ));
    }
    emit_detail_list_a(out, &entry.bullets);
}

/// Zero bullets emit nothing at all – never a dangling empty list.
fn emit_detail_list_a(out: &mut String, bullets: &[String]) {
    if bullets.is_empty() {
        return;
    }
    out.push_str("    \\detailListStart\n");
    for bullet in bullets {
        out.push_str(&format!("      \\detailItem{{{}}}\n", escape(bullet)));
    }
    out.push_str("    \\detailListEnd\n");
}

fn emit_skills_a(out: &mut String, groups: &[SkillGroup]) {
    out.push_str("\n\\section{Technologies}\n");
    out.push_str(" \\begin{itemize}[leftmargin=0.15in, label={}]\n    \\small{\\item{\n");
    let lines: Vec<String> = groups
        .iter()
        .map(|g| {
            format!(
                "     \\textbf{{{}}}{{: {}}}",
                escape(&g.label),
                g.items.iter().map(|i| escape(i)).collect::<Vec<_>>().join(", ")
            )
        })
        .collect();
    out.push_str(&lines.join(" \\\\\n"));
    out.push_str("\n    }}\n \\end{itemize}\n");
}

// ---------------------------------------------------------------------------
// Variant B – two-column
// ---------------------------------------------------------------------------

const PREAMBLE_B: &str = r"\documentclass[letterpaper,10pt]{article}

\usepackage[margin=0.5in]{geometry}
\usepackage[usenames,dvipsnames]{color}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}

\pagestyle{empty}
\setlength{\parindent}{0pt}

% Ruled column-section heading.
\newcommand{\columnSection}[1]{\vspace{8pt}{\large\scshape #1}\\[-6pt]\rule{\linewidth}{0.6pt}\\[4pt]}
% Name / descriptor / date-location triple.
\newcommand{\tripleEntry}[3]{\textbf{#1}\\ \textit{\small #2}\\ {\footnotesize #3}\\[3pt]}
";

/// Generate the complete two-column document source. Header spans the full
/// width; left column carries Experience and Projects, right column carries
/// Education, Skills and Links.
pub fn generate_variant_b(profile: &ProfileAggregate) -> String {
    let doc = Document::compose(profile, Variant::TwoColumn);
    let mut out = String::with_capacity(4096);
    out.push_str(PREAMBLE_B);
    out.push_str("\n\\begin{document}\n");

    for section in doc.sections_in(Column::Full) {
        if let SectionBody::Header(header) = &section.body {
            emit_header_b(&mut out, header);
        }
    }

    out.push_str("\n\\noindent\n\\begin{minipage}[t]{0.60\\textwidth}\n");
    for section in doc.sections_in(Column::Left) {
        emit_column_section_b(&mut out, section);
    }
    out.push_str("\\end{minipage}%\n\\hfill\n\\begin{minipage}[t]{0.36\\textwidth}\n");
    for section in doc.sections_in(Column::Right) {
        emit_column_section_b(&mut out, section);
    }
    out.push_str("\\end{minipage}\n");

    out.push_str("\n\\end{document}\n");
    out
}

fn emit_header_b(out: &mut String, header: &HeaderBlock) {
    out.push_str("\n\\begin{center}\n");
    out.push_str(&format!(
        "    {{\\Huge \\scshape {}}}\\\\[2pt]\n",
        escape(&header.full_name)
    ));
    let mut contact = vec![escape(&header.email)];
    contact.extend(header.links.iter().map(|l| hyperlink(&l.url, &bare_url(&l.url))));
    out.push_str(&format!("    {{\\small {}}}\n", contact.join(" $|$ ")));
    out.push_str("\\end{center}\n");
}

fn emit_column_section_b(out: &mut String, section: &Section) {
    out.push_str(&format!("\n\\columnSection{{{}}}\n", section.kind.title()));
    match &section.body {
        SectionBody::Entries(entries) => {
            for entry in entries {
                emit_entry_b(out, entry);
            }
        }
        SectionBody::SkillGroups(groups) => {
            let lines: Vec<String> = groups
                .iter()
                .map(|g| {
                    format!(
                        "\\textbf{{{}}}: {{\\small {}}}",
                        escape(&g.label),
                        g.items.iter().map(|i| escape(i)).collect::<Vec<_>>().join(", ")
                    )
                })
                .collect();
            out.push_str(&lines.join("\\\\[2pt]\n"));
            out.push('\n');
        }
        SectionBody::Links(links) => {
            let lines: Vec<String> = links
                .iter()
                .map(|l| format!("{}: {}", escape(&l.label), hyperlink(&l.url, &bare_url(&l.url))))
                .collect();
            out.push_str(&lines.join("\\\\[2pt]\n"));
            out.push('\n');
        }
        SectionBody::Header(_) => {}
    }
}

fn emit_entry_b(out: &mut String, entry: &Entry) {
    let primary = match &entry.link {
        Some(url) => linked(url, &entry.primary),
        None => escape(&entry.primary),
    };
    let date_loc = match (entry.date_range.is_empty(), entry.location.is_empty()) {
        (false, false) => format!(
            "{} \\textbar{{}} {}",
            escape(&entry.date_range),
            escape(&entry.location)
        ),
        (false, true) => escape(&entry.date_range),
        (true, false) => escape(&entry.location),
        (true, true) => String::new(),
    };
    out.push_str(&format!(
        "\\tripleEntry{{{}}}{{{}}}{{{}}}\n",
        primary,
        escape(&entry.secondary),
        date_loc
    ));
    if !entry.bullets.is_empty() {
        out.push_str("\\begin{itemize}[leftmargin=*, itemsep=1pt]\n");
        for bullet in &entry.bullets {
            out.push_str(&format!("  \\item {{\\small {}}}\n", escape(bullet)));
        }
        out.push_str("\\end{itemize}\n");
    }
}

// ---------------------------------------------------------------------------
// Shared fragment assembly (never re-escaped)
// ---------------------------------------------------------------------------

/// Build an underlined hyperlink macro from raw url and raw display text.
fn hyperlink(url: &str, text: &str) -> String {
    format!("\\href{{{}}}{{\\underline{{{}}}}}", escape(url), escape(text))
}

/// Hyperlink whose display text keeps surrounding weight (used in headings).
fn linked(url: &str, text: &str) -> String {
    format!("\\href{{{}}}{{{}}}", escape(url), escape(text))
}

/// Display form of a URL: scheme stripped, no trailing slash.
fn bare_url(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{normalize, PartialProfile};

    fn sample() -> ProfileAggregate {
        normalize(&PartialProfile::default())
    }

    #[test]
    fn variant_a_emits_fixed_sections_in_order() {
        let src = generate_variant_a(&sample());
        let edu = src.find("\\section{Education}").unwrap();
        let exp = src.find("\\section{Experience}").unwrap();
        let proj = src.find("\\section{Projects}").unwrap();
        let tech = src.find("\\section{Technologies}").unwrap();
        assert!(edu < exp && exp < proj && proj < tech);
    }

    #[test]
    fn variant_b_partitions_columns() {
        let src = generate_variant_b(&sample());
        let left = src.find("\\begin{minipage}[t]{0.60\\textwidth}").unwrap();
        let right = src.find("\\begin{minipage}[t]{0.36\\textwidth}").unwrap();
        let exp = src.find("\\columnSection{Experience}").unwrap();
        let edu = src.find("\\columnSection{Education}").unwrap();
        assert!(left < exp && exp < right, "experience flows left");
        assert!(right < edu, "education flows right");
        assert!(src.contains("\\columnSection{Links}"));
    }

    #[test]
    fn generators_are_deterministic() {
        let p = sample();
        assert_eq!(generate_variant_a(&p), generate_variant_a(&p));
        assert_eq!(generate_variant_b(&p), generate_variant_b(&p));
    }

    #[test]
    fn leaf_specials_are_escaped_once() {
        let mut p = sample();
        p.experience.company = "AT&T R_D #1".to_string();
        let src = generate_variant_a(&p);
        assert!(src.contains("AT\\&T R\\_D \\#1"));
        assert!(!src.contains("AT&T"));
    }

    #[test]
    fn empty_work_done_emits_no_detail_list() {
        let mut p = sample();
        p.experience.work_done.clear();
        let src = generate_variant_a(&p);
        let exp = src.find("\\section{Experience}").unwrap();
        let proj = src.find("\\section{Projects}").unwrap();
        assert!(
            !src[exp..proj].contains("\\detailListStart"),
            "empty bullet source must not open a list"
        );
    }
}
