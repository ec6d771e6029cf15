use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::{Client, Request, RequestBuilder, Response};
use retry::{delay, retry, OperationResult};

use crate::console::Console;
use crate::service::CookieJar;
use crate::{Error, Result};

trait ExecSession {
    fn exec_session(&self, request: Request, jar: &mut CookieJar) -> Result<Response>;
}

impl ExecSession for Client {
    fn exec_session(&self, mut request: Request, jar: &mut CookieJar) -> Result<Response> {
        jar.load_into(&mut request)
            .context("Could not load cookies into request")?;
        let response = self.execute(request)?;
        jar.store_from(&response);
        Ok(response)
    }
}

/// How often and how far apart idempotent requests are retried.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RetryPolicy {
    pub limit: usize,
    pub interval: Duration,
}

pub struct RetryRequestBuilder<'a> {
    inner: RequestBuilder,
    client: &'a Client,
    jar: &'a mut CookieJar,
    policy: RetryPolicy,
    cnsl: &'a mut Console,
}

impl<'a> RetryRequestBuilder<'a> {
    /// Sends the request exactly once, logging method, url and status.
    ///
    /// Use this for requests that must not be repeated, such as a submission.
    pub fn send_pretty(&mut self) -> Result<Response> {
        let Self {
            client, jar, cnsl, ..
        } = self;
        let req = self
            .inner
            .try_clone()
            .ok_or_else(|| Error::msg("Could not build request"))?
            .build()?;
        write!(cnsl, "{:7} {} ... ", req.method().as_str(), req.url()).unwrap_or(());
        let result = client
            .exec_session(req, jar)
            .context("Could not send request");
        match &result {
            Ok(res) => writeln!(cnsl, "{}", res.status()),
            Err(_) => writeln!(cnsl, "failed"),
        }
        .unwrap_or(());
        result
    }

    /// Sends the request, retrying on transport and server errors.
    pub fn retry_send(&mut self) -> Result<Response> {
        let retry_interval = self.policy.interval.as_millis() as u64;
        let durations = delay::Fixed::from_millis(retry_interval).take(self.policy.limit);
        retry(durations, || match self.send_pretty() {
            Ok(res) => {
                if res.status().is_server_error() {
                    OperationResult::Retry(Error::msg("Received server error"))
                } else {
                    OperationResult::Ok(res)
                }
            }
            Err(err) => OperationResult::Retry(err),
        })
        .map_err(|err| match err {
            retry::Error::Operation { error, .. } => error,
            retry::Error::Internal(msg) => Error::msg(msg),
        })
    }
}

pub trait WithRetry {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        jar: &'a mut CookieJar,
        policy: RetryPolicy,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a>;
}

impl WithRetry for RequestBuilder {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        jar: &'a mut CookieJar,
        policy: RetryPolicy,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a> {
        RetryRequestBuilder {
            inner: self,
            client,
            jar,
            policy,
            cnsl,
        }
    }
}
