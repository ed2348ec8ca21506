use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::models::job::Job;
use crate::models::match_report::MatchReport;
use crate::models::profile::{CandidateProfile, ExperienceEntry};

use super::AnalysisEngine;

/// Placeholders returned when a field cannot be recovered from the text.
pub const NAME_PLACEHOLDER: &str = "Unknown Candidate";
pub const EMAIL_PLACEHOLDER: &str = "not provided";
pub const SUMMARY_PLACEHOLDER: &str = "No summary provided.";
pub const DURATION_PLACEHOLDER: &str = "Not specified";
pub const EXPERIENCE_PLACEHOLDER: &str = "Experience not specified";

/// Fixed vocabulary the skill scan matches against, case-insensitively.
const SKILL_VOCABULARY: &[&str] = &[
    "Python", "JavaScript", "TypeScript", "Java", "Kotlin", "Swift", "Go", "Rust", "C++", "C#",
    "Ruby", "PHP", "Scala", "SQL", "PostgreSQL", "MySQL", "MongoDB", "Redis", "Elasticsearch",
    "Kafka", "RabbitMQ", "GraphQL", "REST", "gRPC", "HTML", "CSS", "React", "Angular", "Vue",
    "Svelte", "Next.js", "Node.js", "Express", "Django", "Flask", "FastAPI", "Spring", "Rails",
    "Laravel", ".NET", "Docker", "Kubernetes", "Terraform", "Ansible", "AWS", "GCP", "Azure",
    "Linux", "Git", "CI/CD", "Jenkins", "Prometheus", "Grafana", "Machine Learning",
    "Deep Learning", "TensorFlow", "PyTorch", "Pandas", "NumPy", "Data Analysis", "ETL",
    "Microservices", "Agile", "Scrum", "Project Management", "Figma", "UX", "Accessibility",
];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern")
    })
}

fn name_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Two to four Title-Case words; all-caps headings do not qualify.
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][a-z][A-Za-z'.-]*(?:\s+[A-Z][a-z][A-Za-z'.-]*){1,3}$")
            .expect("name pattern")
    })
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"',)]+"#).expect("link pattern"))
}

fn years_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d{1,2})\s*\+?\s*years?").expect("years pattern"))
}

fn year_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"((?:19|20)\d{2})\s*(?:-|–|—|to)\s*((?:19|20)\d{2}|[Pp]resent)")
            .expect("year range pattern")
    })
}

/// Deterministic extraction and scoring with no external dependency. Never
/// fails on well-formed UTF-8: absent fields come back as placeholders.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEngine;

impl HeuristicEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, resume_text: &str) -> CandidateProfile {
        let name = resume_text
            .lines()
            .map(str::trim)
            .find(|line| name_line_regex().is_match(line))
            .unwrap_or(NAME_PLACEHOLDER)
            .to_string();

        let email = email_regex()
            .find(resume_text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| EMAIL_PLACEHOLDER.to_string());

        let links: Vec<String> = link_regex()
            .find_iter(resume_text)
            .map(|m| m.as_str().trim_end_matches(['.', ';']).to_string())
            .collect();

        CandidateProfile {
            name,
            email,
            links,
            skills: scan_skills(resume_text),
            experience: parse_experience(resume_text),
            total_experience: total_experience(resume_text),
            summary: find_summary(resume_text),
        }
    }

    pub fn score(&self, profile: &CandidateProfile, job: &Job) -> MatchReport {
        let candidate_skills: Vec<String> =
            profile.skills.iter().map(|s| s.to_lowercase()).collect();

        let mut matched: Vec<&str> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();
        for required in &job.required_skills {
            if candidate_skills.contains(&required.to_lowercase()) {
                matched.push(required);
            } else {
                missing.push(required);
            }
        }

        let skill_score = if job.required_skills.is_empty() {
            50
        } else {
            (matched.len() * 100 / job.required_skills.len()) as u32
        };

        let years = max_years(&profile.total_experience).unwrap_or(0);
        let experience_bonus = (years * 2).min(10);
        let match_percentage = (skill_score + experience_bonus).min(100) as u8;

        let mut strengths: Vec<String> = matched
            .iter()
            .map(|s| format!("Hands-on experience with {}", s))
            .collect();
        if years > 0 {
            strengths.push(format!("{} years of professional experience", years));
        }
        if strengths.is_empty() {
            strengths.push("Background available for review".to_string());
        }

        let gaps: Vec<String> = missing
            .iter()
            .map(|s| format!("No evidence of {} experience", s))
            .collect();

        MatchReport {
            candidate_id: None,
            candidate_name: profile.name.clone(),
            candidate_email: profile.email.clone(),
            match_percentage,
            strengths,
            gaps,
        }
    }
}

#[async_trait]
impl AnalysisEngine for HeuristicEngine {
    async fn extract_profile(&self, resume_text: &str) -> Result<CandidateProfile> {
        Ok(self.extract(resume_text))
    }

    async fn score_match(&self, profile: &CandidateProfile, job: &Job) -> Result<MatchReport> {
        Ok(self.score(profile, job))
    }
}

fn scan_skills(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut seen = std::collections::HashSet::new();
    let mut skills = Vec::new();
    for skill in SKILL_VOCABULARY {
        if haystack.contains(&skill.to_lowercase()) && seen.insert(skill.to_lowercase()) {
            skills.push(skill.to_string());
        }
    }
    skills
}

/// `Title | Company | Duration` lines; a two-segment line is treated as
/// title and company with an unspecified duration.
fn parse_experience(text: &str) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let segments: Vec<&str> = line.split('|').map(str::trim).collect();
        if segments.len() < 2 || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
            continue;
        }

        let duration = segments
            .get(2)
            .map(|s| s.to_string())
            .unwrap_or_else(|| DURATION_PLACEHOLDER.to_string());

        let (start_year, end_year) = match year_range_regex().captures(line) {
            Some(caps) => {
                let start = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let end = caps.get(2).and_then(|m| m.as_str().parse().ok());
                (start, end)
            }
            None => (None, None),
        };

        entries.push(ExperienceEntry {
            position: segments[0].to_string(),
            company: segments[1].to_string(),
            duration,
            start_year,
            end_year,
            description: None,
        });
    }
    entries
}

/// Maximum "N years" mention anywhere in the text.
fn total_experience(text: &str) -> String {
    let mut max: Option<u32> = None;
    for caps in years_regex().captures_iter(text) {
        if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            max = Some(max.map_or(n, |m| m.max(n)));
        }
    }
    match max {
        Some(n) => format!("{} years total", n),
        None => EXPERIENCE_PLACEHOLDER.to_string(),
    }
}

fn max_years(total_experience: &str) -> Option<u32> {
    years_regex()
        .captures(total_experience)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Paragraph following a SUMMARY / PROFILE / OVERVIEW heading.
fn find_summary(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let upper = line.trim().trim_end_matches(':').to_uppercase();
        let is_heading = upper.len() <= 30
            && ["SUMMARY", "PROFILE", "OVERVIEW"]
                .iter()
                .any(|h| upper.ends_with(h));
        if !is_heading {
            continue;
        }

        let paragraph: Vec<&str> = lines[idx + 1..]
            .iter()
            .map(|l| l.trim())
            .skip_while(|l| l.is_empty())
            .take_while(|l| !l.is_empty())
            .collect();
        if !paragraph.is_empty() {
            return paragraph.join(" ");
        }
    }
    SUMMARY_PLACEHOLDER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const RESUME: &str = "\
Jane Smith
jane.smith@example.com
https://github.com/janesmith

SUMMARY
Backend engineer focused on reliable distributed systems.

EXPERIENCE
Senior Engineer | Initech | 2019 - 2023
Engineer | Globex | 3 years

Worked with Rust, PostgreSQL and Kafka for 5 years.
";

    fn job(required: &[&str]) -> Job {
        Job {
            id: 7,
            org_id: 1,
            title: "Backend Engineer".into(),
            description: "Build services".into(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn extracts_core_fields() {
        let profile = HeuristicEngine::new().extract(RESUME);
        assert_eq!(profile.name, "Jane Smith");
        assert_eq!(profile.email, "jane.smith@example.com");
        assert_eq!(profile.links, vec!["https://github.com/janesmith"]);
        assert!(profile.skills.iter().any(|s| s == "Rust"));
        assert!(profile.skills.iter().any(|s| s == "PostgreSQL"));
        assert_eq!(
            profile.summary,
            "Backend engineer focused on reliable distributed systems."
        );
    }

    #[test]
    fn total_experience_takes_the_maximum_mention() {
        let profile = HeuristicEngine::new().extract(RESUME);
        assert_eq!(profile.total_experience, "5 years total");
    }

    #[test]
    fn experience_lines_parse_with_year_ranges() {
        let profile = HeuristicEngine::new().extract(RESUME);
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].position, "Senior Engineer");
        assert_eq!(profile.experience[0].company, "Initech");
        assert_eq!(profile.experience[0].start_year, Some(2019));
        assert_eq!(profile.experience[0].end_year, Some(2023));
        assert_eq!(profile.experience[1].duration, "3 years");
    }

    #[test]
    fn missing_fields_become_placeholders_not_errors() {
        let profile = HeuristicEngine::new().extract("just some text without anything useful");
        assert_eq!(profile.name, NAME_PLACEHOLDER);
        assert_eq!(profile.email, EMAIL_PLACEHOLDER);
        assert_eq!(profile.summary, SUMMARY_PLACEHOLDER);
        assert_eq!(profile.total_experience, EXPERIENCE_PLACEHOLDER);
        assert!(profile.experience.is_empty());
    }

    #[test]
    fn empty_input_is_fine_too() {
        let profile = HeuristicEngine::new().extract("");
        assert_eq!(profile.name, NAME_PLACEHOLDER);
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn skills_deduplicate_case_insensitively() {
        let profile = HeuristicEngine::new().extract("rust RUST Rust python");
        let rust_count = profile.skills.iter().filter(|s| *s == "Rust").count();
        assert_eq!(rust_count, 1);
        assert!(profile.skills.iter().any(|s| s == "Python"));
    }

    #[test]
    fn match_score_counts_required_skill_overlap() {
        let engine = HeuristicEngine::new();
        let profile = engine.extract(RESUME);

        let report = engine.score(&profile, &job(&["Rust", "PostgreSQL", "Erlang"]));
        // Two of three required skills, plus the capped experience bonus.
        assert_eq!(report.match_percentage, 76);
        assert!(report.gaps.iter().any(|g| g.contains("Erlang")));
    }

    #[test]
    fn match_score_is_monotonic_in_held_skills() {
        let engine = HeuristicEngine::new();
        let profile = engine.extract(RESUME);

        let base = engine.score(&profile, &job(&["Rust", "Erlang"]));
        let extended = engine.score(&profile, &job(&["Rust", "Erlang", "Kafka"]));
        assert!(extended.match_percentage >= base.match_percentage);
    }

    #[test]
    fn score_is_capped_at_one_hundred() {
        let engine = HeuristicEngine::new();
        let profile = engine.extract(RESUME);
        let report = engine.score(&profile, &job(&["Rust"]));
        assert!(report.match_percentage <= 100);
    }
}
