//! Résumé data source.
//!
//! Loaded once at startup and shared read-only for the process lifetime.
//! Entries keep their source-file order; nothing here is ever mutated.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Ranking sentinel for `end: "present"` — above any parseable YYYYMM.
const RANK_PRESENT: i64 = 99_999_999;

/// Ranking sentinel for `end: "scheduled"` — below "present", above dates.
const RANK_SCHEDULED: i64 = 99_999_998;

#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    #[error("cannot read resume file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resume file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Basics {
    pub name: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// One work entry. `start`/`end` are `YYYY-MM`; `end` may also be the
/// literal `"present"` or `"scheduled"` (case-insensitive).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resume {
    pub basics: Option<Basics>,
    #[serde(default)]
    pub work: Vec<WorkItem>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Resume {
    /// Load the résumé snapshot from disk.
    pub async fn load(path: &Path) -> Result<Self, ResumeError> {
        let raw = tokio::fs::read(path).await.map_err(|source| ResumeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ResumeError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The most recent work entry by recency rank; ties keep the earliest
    /// entry in source order.
    pub fn last_role(&self) -> Option<&WorkItem> {
        let mut best: Option<(&WorkItem, i64)> = None;
        for item in &self.work {
            let rank = recency_rank(item);
            match best {
                Some((_, best_rank)) if rank <= best_rank => {}
                _ => best = Some((item, rank)),
            }
        }
        best.map(|(item, _)| item)
    }
}

/// Recency ranking key: `present` > `scheduled` > parsed `YYYYMM` from `end`
/// (falling back to `start`) > unparsable (0).
pub fn recency_rank(item: &WorkItem) -> i64 {
    if let Some(end) = item.end.as_deref() {
        match end.trim().to_lowercase().as_str() {
            "present" => return RANK_PRESENT,
            "scheduled" => return RANK_SCHEDULED,
            _ => {}
        }
    }
    // An empty end string counts as absent and falls back to start.
    let raw = item
        .end
        .as_deref()
        .filter(|end| !end.trim().is_empty())
        .or(item.start.as_deref())
        .unwrap_or("");
    raw.replace('-', "").trim().parse::<i64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(end: Option<&str>, start: Option<&str>) -> WorkItem {
        WorkItem {
            end: end.map(String::from),
            start: start.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn present_outranks_scheduled_and_dates() {
        let present = recency_rank(&entry(Some("present"), None));
        let scheduled = recency_rank(&entry(Some("scheduled"), None));
        let dated = recency_rank(&entry(Some("2024-12"), None));
        assert!(present > scheduled);
        assert!(scheduled > dated);
    }

    #[test]
    fn end_wins_over_start_and_separators_are_stripped() {
        assert_eq!(recency_rank(&entry(Some("2021-06"), Some("2019-01"))), 202106);
        assert_eq!(recency_rank(&entry(None, Some("2019-01"))), 201901);
    }

    #[test]
    fn empty_end_falls_back_to_start() {
        assert_eq!(recency_rank(&entry(Some(""), Some("2019-01"))), 201901);
        assert_eq!(recency_rank(&entry(Some("  "), Some("2019-01"))), 201901);
    }

    #[test]
    fn unparsable_dates_rank_zero() {
        assert_eq!(recency_rank(&entry(Some("someday"), None)), 0);
        assert_eq!(recency_rank(&entry(None, None)), 0);
    }

    #[test]
    fn last_role_ties_keep_source_order() {
        let resume = Resume {
            work: vec![
                WorkItem { company: "First".into(), end: Some("present".into()), ..Default::default() },
                WorkItem { company: "Second".into(), end: Some("present".into()), ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(resume.last_role().unwrap().company, "First");
    }

    #[test]
    fn last_role_none_when_empty() {
        assert!(Resume::default().last_role().is_none());
    }
}
