use std::{fmt, io};

use anyhow::{anyhow, Context as _};
use serde::Serialize;
use structopt::StructOpt;

use crate::config::Config;
use crate::{Console, GlobalOpt, OutputFormat, Result};

mod init;
mod show;
mod status;
mod submit;

pub use init::InitOpt;
pub use show::ShowOpt;
pub use status::StatusOpt;
pub use submit::SubmitOpt;

pub trait Outcome: OutcomeSerialize {
    fn is_error(&self) -> bool;
}

pub trait OutcomeSerialize: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:#?}", self)?,
            OutputFormat::Json => {
                self.write_json(stdout)?;
                writeln!(stdout)?;
            }
            OutputFormat::Yaml => self.write_yaml(stdout)?,
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> OutcomeSerialize for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).context("Could not print outcome as yaml")
    }
}

/// Takes `value`, or reads it from env `env_name`, or prompts for it.
fn read_required(
    value: &Option<String>,
    name: &str,
    env_name: &str,
    is_password: bool,
    cnsl: &mut Console,
) -> Result<String> {
    let value = match value {
        Some(value) => value.clone(),
        None => {
            let prompt = format!("{:8} : ", name);
            cnsl.get_env_or_prompt_and_read(env_name, &prompt, is_password)?
        }
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("Missing required field : {}", name));
    }
    Ok(value.to_owned())
}

pub trait Run {
    fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Outcome>>;
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Creates config file
    Init(InitOpt),
    /// Shows current config
    Show(ShowOpt),
    /// Submits source code and waits for its verdict
    Submit(SubmitOpt),
    /// Shows the newest submission of a handle
    Status(StatusOpt),
}

impl Cmd {
    pub fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        match self {
            // init writes the config, so it must not need one
            Self::Init(opt) => Ok(Box::new(opt.run(cnsl)?)),
            Self::Show(opt) => opt.run(&global_opt.load_config(cnsl)?, cnsl),
            Self::Submit(opt) => opt.run(&global_opt.load_config(cnsl)?, cnsl),
            Self::Status(opt) => opt.run(&global_opt.load_config(cnsl)?, cnsl),
        }
    }
}

impl Outcome for Config {
    fn is_error(&self) -> bool {
        false
    }
}

impl Outcome for cfsubmit_codeforces::Outcome {
    fn is_error(&self) -> bool {
        cfsubmit_codeforces::Outcome::is_error(self)
    }
}
