#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use strum::VariantNames;

mod cmd;

use cfsubmit_config as config;
use cfsubmit_util::{abs_path, console, model};

use crate::abs_path::AbsPathBuf;
use crate::cmd::{Cmd, Outcome as _};
use crate::config::Config;
pub use crate::console::{Console, ConsoleConfig};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Config file. Searched from the current directory upwards if omitted
    #[structopt(long, global = true, env = "CFSUBMIT_CONFIG")]
    config: Option<PathBuf>,
    /// Format of the outcome printed to stdout
    #[structopt(
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    format: OutputFormat,
    /// Assumes "yes" as answer to all prompts
    #[structopt(long, short = "y", global = true)]
    assume_yes: bool,
}

impl GlobalOpt {
    fn load_config(&self, cnsl: &mut Console) -> Result<Config> {
        let path = match &self.config {
            Some(path) => Some(AbsPathBuf::cwd()?.join_expand(path)?),
            None => None,
        };
        Config::load(path, cnsl).context("Could not load config")
    }
}

impl Opt {
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            assume_yes: self.global_opt.assume_yes,
        }
    }

    /// Runs the command and prints its outcome. Returns false if the outcome is an error.
    pub fn run(&self, cnsl: &mut Console) -> Result<bool> {
        let outcome = self.cmd.run(&self.global_opt, cnsl)?;
        cnsl.flush()?;
        let stdout = &mut io::stdout();
        outcome.print(stdout, self.global_opt.format)?;
        Ok(!outcome.is_error())
    }
}
