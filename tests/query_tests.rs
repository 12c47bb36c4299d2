//! Rule-table tests for the query engine. The engine is a deterministic
//! first-match-wins table, so these pin exact wording.

use cv_mcp_server::query::answer;
use cv_mcp_server::resume::Resume;

fn resume(value: serde_json::Value) -> Resume {
    serde_json::from_value(value).unwrap()
}

const HELP: &str = "I can answer:\n\
    • What role did I have at my last position?\n\
    • Which companies have I worked at?\n\
    • When did I work at <company>?\n\
    Update resume.json to improve answers.";

#[test]
fn last_role_with_present_end() {
    let r = resume(serde_json::json!({
        "work": [{ "title": "Engineer", "company": "Acme", "end": "present" }]
    }));
    assert_eq!(
        answer(&r, "What role did I have at my last position?"),
        "Your last role: Engineer at Acme (present)."
    );
}

#[test]
fn last_role_prefers_present_over_dates() {
    let r = resume(serde_json::json!({
        "work": [
            { "title": "Analyst", "company": "Beta", "end": "2024-12" },
            { "title": "Engineer", "company": "Acme", "end": "present" },
            { "title": "Intern", "company": "Gamma", "end": "scheduled" }
        ]
    }));
    assert_eq!(
        answer(&r, "Which title did I hold in my last role?"),
        "Your last role: Engineer at Acme (present)."
    );
}

#[test]
fn last_role_without_end_label() {
    let r = resume(serde_json::json!({
        "work": [{ "title": "Engineer", "company": "Acme", "start": "2020-01" }]
    }));
    assert_eq!(
        answer(&r, "What role did I have at my last position?"),
        "Your last role: Engineer at Acme."
    );
}

#[test]
fn last_role_empty_work_is_not_found_message() {
    let r = Resume::default();
    assert_eq!(
        answer(&r, "What role did I have at my last position?"),
        "I couldn't find any work entries."
    );
}

#[test]
fn companies_joined_in_source_order() {
    let r = resume(serde_json::json!({
        "work": [{ "company": "Acme" }, { "company": "Beta" }]
    }));
    assert_eq!(
        answer(&r, "Which companies have I worked at?"),
        "Companies: Acme, Beta."
    );
}

#[test]
fn companies_filters_empty_names() {
    let r = resume(serde_json::json!({
        "work": [{ "company": "Acme" }, { "title": "Freelance" }, { "company": "Beta" }]
    }));
    assert_eq!(answer(&r, "companies"), "Companies: Acme, Beta.");
}

#[test]
fn companies_none_found() {
    let r = Resume::default();
    assert_eq!(answer(&r, "Which companies have I worked at?"), "No companies found.");
}

#[test]
fn worked_at_known_company_reports_tenure() {
    let r = resume(serde_json::json!({
        "work": [
            { "title": "Engineer", "company": "Acme", "start": "2021-02", "end": "present" }
        ]
    }));
    assert_eq!(
        answer(&r, "When did I work at Acme?"),
        "At Acme: Engineer — 2021-02 to present."
    );
}

#[test]
fn worked_at_uses_question_marks_for_missing_dates() {
    let r = resume(serde_json::json!({
        "work": [{ "title": "Engineer", "company": "Acme" }]
    }));
    assert_eq!(answer(&r, "did i work at acme"), "At Acme: Engineer — ? to ?.");
}

#[test]
fn worked_at_match_is_case_insensitive() {
    let r = resume(serde_json::json!({
        "work": [{ "title": "Engineer", "company": "ACME", "start": "2021-02" }]
    }));
    assert_eq!(
        answer(&r, "When did I work at acme?"),
        "At ACME: Engineer — 2021-02 to ?."
    );
}

#[test]
fn worked_at_unknown_company_falls_through_to_help() {
    let r = resume(serde_json::json!({
        "work": [{ "title": "Engineer", "company": "Acme" }]
    }));
    assert_eq!(answer(&r, "When did I work at Nowhere Inc?"), HELP);
}

#[test]
fn unmatched_question_gets_help_text() {
    let r = Resume::default();
    assert_eq!(answer(&r, "tell me a joke"), HELP);
}

#[test]
fn rule_order_companies_wins_over_worked_at() {
    // "worked at which companies" satisfies both the companies rule and the
    // worked-at pattern; the companies rule is evaluated first.
    let r = resume(serde_json::json!({
        "work": [{ "company": "Acme" }]
    }));
    assert_eq!(answer(&r, "I worked at which companies?"), "Companies: Acme.");
}
