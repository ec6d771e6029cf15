use std::fmt;

use serde::Serialize;

use crate::console::{sty_dim, sty_g, sty_r, sty_y};
use crate::model::{is_terminal, ContestId, SubmissionRecord};
use crate::page::submission_url;
use crate::poller::PollState;
use crate::Error;

static MSG_PENDING: &str =
    "Submitted, but no final verdict was observed before the deadline. Check the submission on Codeforces.";

static MSG_NOT_LOCATED: &str =
    "Submitted, but the submission could not be located in the history. Check it on Codeforces.";

/// What one tracked submission ended up as.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Verdict {
        submission_id: String,
        verdict: String,
        time: Option<String>,
        memory: Option<String>,
        link: String,
    },
    #[serde(rename_all = "camelCase")]
    Pending {
        message: String,
        last_seen: SubmissionRecord,
    },
    NotLocated { message: String },
    Error { error: String },
}

impl Outcome {
    /// Maps the final poller state. Never fails.
    pub fn assemble(state: PollState, contest_id: &ContestId) -> Self {
        match state {
            PollState::Terminal(record) => Self::verdict(record, contest_id),
            PollState::TimedOut(Some(last_seen)) => Self::Pending {
                message: MSG_PENDING.to_owned(),
                last_seen,
            },
            PollState::TimedOut(None) | PollState::Polling(_) => Self::NotLocated {
                message: MSG_NOT_LOCATED.to_owned(),
            },
        }
    }

    /// Verdict outcome for a row, linking to it even if the page did not.
    pub fn verdict(record: SubmissionRecord, contest_id: &ContestId) -> Self {
        let link = record.link().clone().unwrap_or_else(|| {
            submission_url(contest_id, record.id())
                .map(String::from)
                .unwrap_or_default()
        });
        Self::Verdict {
            submission_id: record.id().clone(),
            verdict: record.verdict().clone(),
            time: record.time().clone(),
            memory: record.memory().clone(),
            link,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::Error {
            error: format!("{:#}", err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Verdict {
                submission_id,
                verdict,
                time,
                memory,
                link,
            } => {
                let verdict = if verdict.to_lowercase().contains("accepted") {
                    sty_g(verdict).bold()
                } else if is_terminal(verdict) {
                    sty_r(verdict).bold()
                } else {
                    sty_y(verdict).bold()
                };
                write!(f, "#{} {}", submission_id, verdict)?;
                if let Some(time) = time {
                    write!(f, " {}", time)?;
                }
                if let Some(memory) = memory {
                    write!(f, " {}", memory)?;
                }
                write!(f, "\n{}", sty_dim(link))
            }
            Self::Pending { message, last_seen } => {
                write!(f, "{}\nLast seen : {}", sty_y(message), last_seen)?;
                if let Some(link) = last_seen.link() {
                    write!(f, "\n{}", sty_dim(link))?;
                }
                Ok(())
            }
            Self::NotLocated { message } => write!(f, "{}", sty_y(message)),
            Self::Error { error } => write!(f, "{} {}", sty_r("Error").bold(), error),
        }
    }
}
