use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::config::Config;
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ShowOpt {}

impl Run for ShowOpt {
    fn run(&self, conf: &Config, _cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        Ok(Box::new(conf.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConsoleConfig, OutputFormat};

    #[test]
    fn show_default_config() -> anyhow::Result<()> {
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let outcome = ShowOpt {}.run(&Config::default(), cnsl)?;
        assert!(!outcome.is_error());

        let mut buf = Vec::new();
        outcome.print(&mut buf, OutputFormat::Yaml)?;
        let printed = String::from_utf8(buf)?;
        assert!(printed.contains("driver: browser"));
        assert!(printed.contains("deadline: 1m 30s"));
        Ok(())
    }
}
