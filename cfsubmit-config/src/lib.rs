//! Config for cfsubmit.
//!
//! The config file `cfsubmit.yaml` is searched in the current directory, then in
//! its ancestors, then in the user config directory (e.g. `~/.config/cfsubmit`).
//! When none is found, built-in defaults are used.
//!
//! Durations are written in [humantime](https://docs.rs/humantime) format
//! such as `2s 500ms` or `1m 30s`.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use getset::{CopyGetters, Getters};
use lazy_static::lazy_static;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use cfsubmit_util::{abs_path, console, model, service, CONFIG_DIR};

mod session_config;

use crate::abs_path::AbsPathBuf;
use crate::console::Console;
use crate::model::DriverKind;
pub use session_config::SessionConfig;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

lazy_static! {
    static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    /// File the body was read from, `None` when running on defaults.
    pub path: Option<AbsPathBuf>,
    body: ConfigBody,
}

impl Config {
    /// Loads `path`, or the first config file found, or falls back to defaults.
    pub fn load(path: Option<AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path),
            None => ConfigBody::search(cnsl)?,
        };
        let body = match &path {
            Some(path) => ConfigBody::load(path, cnsl)?,
            None => {
                writeln!(cnsl, "No config file found, using defaults")?;
                ConfigBody::default()
            }
        };
        Ok(Self { path, body })
    }

    pub fn driver(&self) -> DriverKind {
        self.body.driver
    }

    pub fn session(&self) -> &SessionConfig {
        &self.body.session
    }

    pub fn poll(&self) -> &PollConfig {
        &self.body.poll
    }

    pub fn browser(&self) -> &BrowserConfig {
        &self.body.browser
    }

    pub fn set_driver(&mut self, driver: DriverKind) {
        self.body.driver = driver;
    }

    pub fn set_deadline(&mut self, deadline: Duration) {
        self.body.poll.deadline = deadline;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            body: ConfigBody::default(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml_str = serde_yaml::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigBody {
    #[serde(with = "string_serde")]
    version: Version,
    #[serde(default)]
    driver: DriverKind,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    poll: PollConfig,
    #[serde(default)]
    browser: BrowserConfig,
}

impl ConfigBody {
    pub const FILE_NAME: &'static str = "cfsubmit.yaml";

    pub fn generate_to(writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            include_str!("../resources/cfsubmit.yaml.txt"),
            version = &*VERSION,
            user_agent = SessionConfig::default().user_agent(),
        )
        .context("Could not write config")
    }

    fn search(cnsl: &mut Console) -> Result<Option<AbsPathBuf>> {
        let cwd = AbsPathBuf::cwd()?;
        let found = cwd
            .search_dir_contains(Self::FILE_NAME)
            .map(|dir| dir.join(Self::FILE_NAME))
            .or_else(|| {
                CONFIG_DIR
                    .as_ref()
                    .map(|dir| dir.join(Self::FILE_NAME))
                    .filter(|path| path.as_ref().is_file())
            });
        if let Some(path) = &found {
            writeln!(cnsl, "Found config file : {}", path)?;
        }
        Ok(found)
    }

    fn load(path: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body: Self = path.load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not read config file as yaml"),
            None,
            cnsl,
        )?;
        body.validate()?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        let version_req = VersionReq::parse(&self.version.to_string())
            .context("Could not parse version requirement")?;
        if !version_req.matches(&VERSION) {
            return Err(anyhow!(
                r#"Found mismatched version in config file.
    config version   : {}
    cfsubmit version : {}
Fix the config file so that it is compatible with the current version of cfsubmit."#,
                self.version,
                &*VERSION
            ));
        }
        if self.poll.interval.as_millis() == 0 {
            return Err(anyhow!("Found zero poll interval in config file"));
        }
        Ok(())
    }
}

impl Default for ConfigBody {
    fn default() -> Self {
        Self {
            version: VERSION.clone(),
            driver: DriverKind::default(),
            session: SessionConfig::default(),
            poll: PollConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

/// Timing of the verdict polling loop.
#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct PollConfig {
    /// Pause between two reads of the submission history.
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    interval: Duration,
    /// Wall-clock budget of the whole loop, counted from its start.
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    deadline: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(2500), Duration::from_secs(90))
    }
}

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct BrowserConfig {
    #[get_copy = "pub"]
    headless: bool,
    /// Chromium binary, searched on `PATH` when unset.
    #[get = "pub"]
    executable: Option<String>,
    /// Bounded wait for the submit form. Expiry is not an error.
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    form_wait: Duration,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    navigation_timeout: Duration,
    #[get_copy = "pub"]
    window_width: u32,
    #[get_copy = "pub"]
    window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            form_wait: Duration::from_secs(15),
            navigation_timeout: Duration::from_secs(20),
            window_width: 1280,
            window_height: 720,
        }
    }
}

mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;
    use crate::console::ConsoleConfig;

    #[test]
    fn generate_and_deserialize() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        ConfigBody::generate_to(&mut buf)?;
        let body_yaml_str = String::from_utf8(buf)?;
        let body_generated: ConfigBody = serde_yaml::from_str(&body_yaml_str)?;

        assert_eq!(body_generated, ConfigBody::default());
        Ok(())
    }

    #[test]
    fn load_partial_file_fills_defaults() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let path = AbsPathBuf::try_new(test_dir.path())?.join(ConfigBody::FILE_NAME);
        std::fs::write(
            path.as_ref(),
            format!("version: {}\ndriver: http\npoll:\n  deadline: 10s\n", &*VERSION),
        )?;

        let cnsl = &mut Console::buf(ConsoleConfig::default());
        let conf = Config::load(Some(path.clone()), cnsl)?;
        assert_eq!(conf.path, Some(path));
        assert_eq!(conf.driver(), DriverKind::Http);
        assert_eq!(conf.poll().deadline(), Duration::from_secs(10));
        assert_eq!(conf.poll().interval(), Duration::from_millis(2500));
        assert_eq!(conf.session(), &SessionConfig::default());
        Ok(())
    }

    #[test]
    fn load_rejects_mismatched_version() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let path = AbsPathBuf::try_new(test_dir.path())?.join(ConfigBody::FILE_NAME);
        let mut file = File::create(path.as_ref())?;
        writeln!(file, "version: 999.0.0")?;

        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let err = Config::load(Some(path), cnsl).unwrap_err();
        assert!(format!("{:#}", err).contains("mismatched version"));
        Ok(())
    }

    #[test]
    fn overrides() {
        let mut conf = Config::default();
        conf.set_driver(DriverKind::Http);
        conf.set_deadline(Duration::from_secs(5));
        assert_eq!(conf.driver(), DriverKind::Http);
        assert_eq!(conf.poll().deadline(), Duration::from_secs(5));
    }
}
