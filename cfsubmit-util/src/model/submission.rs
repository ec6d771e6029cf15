use std::fmt;

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::model::{ContestId, LangId, ProblemIndex};
use crate::regex;

/// Everything the judge needs to accept one submission.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct SubmissionRequest {
    contest_id: ContestId,
    problem_index: ProblemIndex,
    lang_id: LangId,
    #[serde(skip_serializing)]
    source: String,
}

impl SubmissionRequest {
    pub fn new(
        contest_id: impl Into<ContestId>,
        problem_index: impl Into<ProblemIndex>,
        lang_id: impl Into<LangId>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            contest_id: contest_id.into(),
            problem_index: problem_index.into(),
            lang_id: lang_id.into(),
            source: source.into(),
        }
    }

    /// Prefix of the problem label shown in submission history (e.g. `1A`).
    pub fn label_prefix(&self) -> String {
        format!("{}{}", self.contest_id, self.problem_index)
    }
}

/// Substrings marking a verdict as final. Anything else is still pending.
static TERMINAL_VERDICTS: &[&str] = &[
    "accepted",
    "wrong answer",
    "time limit",
    "memory limit",
    "runtime error",
    "output limit",
    "compilation error",
    "skipped",
    "hacked",
    "rejected",
];

/// Returns true if the judge has finished grading.
///
/// Substring heuristic: an unknown synonym of a final verdict is treated as pending.
pub fn is_terminal(verdict: &str) -> bool {
    let verdict = verdict.to_lowercase();
    TERMINAL_VERDICTS.iter().any(|pat| verdict.contains(pat))
}

/// Collapses runs of whitespace and trims, as a browser renders cell text.
pub fn normalize_text(text: &str) -> String {
    regex!(r"\s+").replace_all(text, " ").trim().to_owned()
}

/// One row of the submission history, as scraped.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct SubmissionRecord {
    id: String,
    problem: String,
    verdict: String,
    time: Option<String>,
    memory: Option<String>,
    link: Option<String>,
}

impl SubmissionRecord {
    pub const COL_ID: usize = 0;
    pub const COL_PROBLEM: usize = 3;
    pub const COL_VERDICT: usize = 5;
    pub const COL_TIME: usize = 6;
    pub const COL_MEMORY: usize = 7;

    /// Rows narrower than this are not submissions (headers, spacers, changed layout).
    pub const MIN_COLUMNS: usize = 7;

    pub fn new(
        id: impl Into<String>,
        problem: impl Into<String>,
        verdict: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            problem: problem.into(),
            verdict: verdict.into(),
            time: None,
            memory: None,
            link: None,
        }
    }

    /// Builds a record from the text of each cell, by fixed position.
    ///
    /// Columns are `id | when | who | problem | lang | verdict | time | memory`.
    /// Returns `None` for rows with fewer than `MIN_COLUMNS` cells.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Option<Self> {
        if columns.len() < Self::MIN_COLUMNS {
            return None;
        }
        let cell = |i: usize| columns.get(i).map(|s| normalize_text(s.as_ref()));
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        let verdict = cell(Self::COL_VERDICT)
            .and_then(non_empty)
            .unwrap_or_else(|| "Unknown".to_owned());
        Some(Self {
            id: cell(Self::COL_ID).unwrap_or_default(),
            problem: cell(Self::COL_PROBLEM).unwrap_or_default(),
            verdict,
            time: cell(Self::COL_TIME).and_then(non_empty),
            memory: cell(Self::COL_MEMORY).and_then(non_empty),
            link: None,
        })
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = Some(memory.into());
        self
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn is_terminal(&self) -> bool {
        is_terminal(&self.verdict)
    }

    /// True if the problem label starts with `prefix`, ignoring case.
    pub fn matches_problem(&self, prefix: &str) -> bool {
        self.problem
            .to_uppercase()
            .starts_with(&prefix.trim().to_uppercase())
    }
}

impl fmt::Display for SubmissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {} : {}", self.id, self.problem, self.verdict)?;
        if let Some(time) = &self.time {
            write!(f, " ({}", time)?;
            if let Some(memory) = &self.memory {
                write!(f, ", {}", memory)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
