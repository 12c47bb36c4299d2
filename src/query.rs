//! Query engine over the résumé snapshot.
//!
//! A deterministic rule table, not a model: rules are evaluated top to
//! bottom and the first one that produces an answer wins. Tests pin the
//! exact wording of every answer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::resume::Resume;

static LAST_ROLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(what|which).*(role|title).*last (position|job|role)").unwrap()
});

static COMPANIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"companies|where.*worked|worked at which companies").unwrap());

static WORKED_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"work(ed)? at ([a-z0-9 .&-]+)").unwrap());

/// A rule inspects the normalized question and either answers it or passes.
type Rule = fn(&Resume, &str) -> Option<String>;

/// Ordered rule table; first match wins.
const RULES: &[Rule] = &[last_role_rule, companies_rule, worked_at_rule];

/// Answer a free-text question against the résumé. Never fails; unmatched
/// questions get the fixed help text.
pub fn answer(resume: &Resume, question: &str) -> String {
    let normalized = question.trim().to_lowercase();
    for rule in RULES {
        if let Some(reply) = rule(resume, &normalized) {
            return reply;
        }
    }
    help_text()
}

fn last_role_rule(resume: &Resume, question: &str) -> Option<String> {
    if !LAST_ROLE_RE.is_match(question) {
        return None;
    }
    let Some(last) = resume.last_role() else {
        return Some("I couldn't find any work entries.".to_string());
    };
    let end_label = last
        .end
        .as_deref()
        .map(|end| format!(" ({end})"))
        .unwrap_or_default();
    Some(format!(
        "Your last role: {} at {}{}.",
        last.title, last.company, end_label
    ))
}

fn companies_rule(resume: &Resume, question: &str) -> Option<String> {
    if !COMPANIES_RE.is_match(question) {
        return None;
    }
    let companies: Vec<&str> = resume
        .work
        .iter()
        .map(|item| item.company.as_str())
        .filter(|company| !company.is_empty())
        .collect();
    if companies.is_empty() {
        Some("No companies found.".to_string())
    } else {
        Some(format!("Companies: {}.", companies.join(", ")))
    }
}

fn worked_at_rule(resume: &Resume, question: &str) -> Option<String> {
    let captures = WORKED_AT_RE.captures(question)?;
    let wanted = captures.get(2)?.as_str().trim();
    // Pattern matched but the company is unknown: fall through to help.
    let hit = resume
        .work
        .iter()
        .find(|item| !item.company.is_empty() && item.company.to_lowercase() == wanted)?;
    Some(format!(
        "At {}: {} — {} to {}.",
        hit.company,
        hit.title,
        hit.start.as_deref().unwrap_or("?"),
        hit.end.as_deref().unwrap_or("?"),
    ))
}

fn help_text() -> String {
    [
        "I can answer:",
        "• What role did I have at my last position?",
        "• Which companies have I worked at?",
        "• When did I work at <company>?",
        "Update resume.json to improve answers.",
    ]
    .join("\n")
}
