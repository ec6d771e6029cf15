use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use cfsubmit_codeforces::submit_and_track;
use structopt::StructOpt;
use strum::VariantNames;

use crate::cmd::{read_required, Outcome, Run};
use crate::config::Config;
use crate::model::{split_problem_code, ContestId, DriverKind, ProblemIndex, SubmissionRequest};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct SubmitOpt {
    /// Problem code such as `1A`, or just the index if --contest is given
    problem: String,
    /// Source file to submit
    #[structopt(parse(from_os_str))]
    source: PathBuf,
    /// Contest id, taken from the problem code if omitted
    #[structopt(long, short)]
    contest: Option<String>,
    /// Language id as in the `programTypeId` field of the submit form (e.g. 54)
    #[structopt(long, short, env = "CFSUBMIT_LANG")]
    lang: String,
    /// Handle whose submission history is watched [env: CFSUBMIT_HANDLE]
    #[structopt(long)]
    handle: Option<String>,
    /// Cookies of a logged-in browser session, as `name=value; ...` [env: CFSUBMIT_COOKIES]
    #[structopt(long)]
    cookies: Option<String>,
    /// Overrides the driver in config
    #[structopt(long, possible_values = &DriverKind::VARIANTS)]
    driver: Option<DriverKind>,
    /// Overrides how long to wait for a verdict (e.g. `2m`)
    #[structopt(long, parse(try_from_str = humantime::parse_duration))]
    deadline: Option<Duration>,
}

impl SubmitOpt {
    fn build_request(&self) -> Result<SubmissionRequest> {
        let (contest_id, problem_index) = match &self.contest {
            Some(contest_id) => (
                ContestId::from(contest_id.as_str()),
                ProblemIndex::from(self.problem.as_str()),
            ),
            None => split_problem_code(&self.problem).with_context(|| {
                format!(
                    "Could not find contest id in problem {:?}. Give --contest or a code like 1A.",
                    self.problem
                )
            })?,
        };
        let contest_id_str: &str = contest_id.as_ref();
        if contest_id_str.is_empty() || !contest_id_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("Found invalid contest id : {:?}", contest_id_str));
        }
        let problem_index_str: &str = problem_index.as_ref();
        if problem_index_str.is_empty() {
            return Err(anyhow!("Missing required field : problem"));
        }
        let lang_id = self.lang.trim();
        if lang_id.is_empty() {
            return Err(anyhow!("Missing required field : lang"));
        }

        let source = fs::read_to_string(&self.source)
            .with_context(|| format!("Could not read source file : {}", self.source.display()))?;
        if source.trim().is_empty() {
            return Err(anyhow!("Found empty source file : {}", self.source.display()));
        }
        Ok(SubmissionRequest::new(
            contest_id,
            problem_index,
            lang_id,
            source,
        ))
    }

    fn apply_overrides(&self, conf: &Config) -> Config {
        let mut conf = conf.clone();
        if let Some(driver) = self.driver {
            conf.set_driver(driver);
        }
        if let Some(deadline) = self.deadline {
            conf.set_deadline(deadline);
        }
        conf
    }
}

impl Run for SubmitOpt {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let request = self.build_request()?;
        let handle = read_required(&self.handle, "handle", "CFSUBMIT_HANDLE", false, cnsl)?;
        let cookies = read_required(&self.cookies, "cookies", "CFSUBMIT_COOKIES", true, cnsl)?;
        let conf = self.apply_overrides(conf);

        writeln!(
            cnsl,
            "Submitting {} as {} with {} driver",
            request.label_prefix(),
            handle,
            conf.driver()
        )?;
        let outcome = submit_and_track(&conf, &cookies, &handle, &request, cnsl);
        Ok(Box::new(outcome))
    }
}
