use std::fmt;

use cfsubmit_codeforces::{HistoryLocator, HttpDriver, Locate as _, Submit as _};
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{read_required, Outcome, Run};
use crate::config::Config;
use crate::console::sty_dim;
use crate::model::{Handle, SessionContext, SubmissionRecord};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct StatusOpt {
    /// Only looks at this problem, given as a code such as `1A`
    problem: Option<String>,
    /// Handle whose submission history is read [env: CFSUBMIT_HANDLE]
    #[structopt(long)]
    handle: Option<String>,
    /// Cookies of a logged-in browser session. Not needed for public history
    #[structopt(long)]
    cookies: Option<String>,
}

impl StatusOpt {
    fn label_prefix(&self) -> String {
        self.problem
            .as_deref()
            .map(|problem| problem.trim().to_uppercase())
            .unwrap_or_default()
    }
}

impl Run for StatusOpt {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let handle = read_required(&self.handle, "handle", "CFSUBMIT_HANDLE", false, cnsl)?;

        let mut driver = HttpDriver::new(conf.session())?;
        if let Some(cookies) = &self.cookies {
            driver.prime(&SessionContext::from_credential_str(cookies)?, cnsl)?;
        }
        let submission =
            HistoryLocator::new(&mut driver).find(&handle, &self.label_prefix(), cnsl);
        driver.release()?;

        Ok(Box::new(StatusOutcome {
            handle,
            problem: self.problem.clone(),
            submission: submission?,
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusOutcome {
    handle: Handle,
    problem: Option<String>,
    submission: Option<SubmissionRecord>,
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.submission {
            Some(record) => {
                write!(f, "{}", record)?;
                if let Some(link) = record.link() {
                    write!(f, "\n{}", sty_dim(link))?;
                }
                Ok(())
            }
            None => match &self.problem {
                Some(problem) => write!(f, "No submission of {} found for {}", problem, self.handle),
                None => write!(f, "No submission found for {}", self.handle),
            },
        }
    }
}

impl Outcome for StatusOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
