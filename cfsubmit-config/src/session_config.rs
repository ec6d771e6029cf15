use std::time::Duration;

use getset::{CopyGetters, Getters};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};

use crate::service::RetryPolicy;

static USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) cfsubmit/",
    env!("CARGO_PKG_VERSION")
);

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
    #[get_copy = "pub"]
    retry_limit: usize,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    retry_interval: Duration,
    #[get = "pub"]
    user_agent: String,
}

impl SessionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            limit: self.retry_limit,
            interval: self.retry_interval,
        }
    }

    pub fn get_client_builder(&self) -> ClientBuilder {
        Client::builder()
            .referer(false)
            .redirect(Policy::none()) // redirects manually
            .user_agent(self.user_agent.as_str())
            .timeout(Some(self.timeout))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_limit: 4,
            retry_interval: Duration::from_secs(2),
            user_agent: USER_AGENT.to_owned(),
        }
    }
}
