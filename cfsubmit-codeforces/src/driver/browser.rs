use std::future::Future;
use std::io::Write as _;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures_util::stream::StreamExt as _;
use reqwest::Url;
use scraper::Html;
use serde::Deserialize;
use tokio::runtime::{self, Runtime};
use tokio::task::JoinHandle;

use crate::config::BrowserConfig;
use crate::driver::{FetchHtml, Submit};
use crate::model::{SessionContext, SubmissionRequest};
use crate::page::{enter_url, extract_submit_error, is_enter_url, SubmitPageBuilder, FORM_SELECTOR};
use crate::service::scrape::GetHtml as _;
use crate::{Console, EngineError, Error, Result};

static SUBMIT_BUTTON_SELECTOR: &str = "form.submit-form input[type=\"submit\"], form#submitForm input[type=\"submit\"], #singlePageSubmitButton";

static FORM_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless Chromium driver. Fills the submit form and clicks it like a user.
///
/// Chromium is driven from a private single-threaded runtime, so every
/// method blocks until the browser is done.
pub struct BrowserDriver {
    conf: BrowserConfig,
    runtime: Runtime,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
}

impl BrowserDriver {
    pub fn launch(conf: &BrowserConfig, cnsl: &mut Console) -> Result<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Could not start async runtime for browser")?;

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(conf.window_width(), conf.window_height())
            .request_timeout(conf.navigation_timeout());
        if !conf.headless() {
            builder = builder.with_head();
        }
        if let Some(executable) = conf.executable() {
            builder = builder.chrome_executable(executable);
        }
        let chrome_conf = builder.build().map_err(Error::msg)?;

        writeln!(cnsl, "Launching browser ...")?;
        let (browser, mut handler) = runtime
            .block_on(Browser::launch(chrome_conf))
            .context("Could not launch browser")?;
        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            conf: conf.clone(),
            runtime,
            browser: Some(browser),
            handler: Some(handler),
            page: None,
        })
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::msg("Browser is not primed with a session"))
    }

    fn fill_script(request: &SubmissionRequest) -> Result<String> {
        Ok(format!(
            r#"(() => {{
  const set = (selector, value) => {{
    const el = document.querySelector(selector);
    if (!el) return false;
    el.value = value;
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
  }};
  return {{
    action: set('input[name="action"]', "submitSolutionFormSubmitted"),
    contest: set('input[name="contestId"]', {contest}),
    index: set('[name="submittedProblemIndex"]', {index}),
    lang: set('select[name="programTypeId"]', {lang}),
    source: set('textarea[name="source"]', {source}),
  }};
}})()"#,
            contest = serde_json::to_string(&request.contest_id().to_string())?,
            index = serde_json::to_string(&request.problem_index().to_string())?,
            lang = serde_json::to_string(request.lang_id())?,
            source = serde_json::to_string(request.source())?,
        ))
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct FilledFields {
    action: bool,
    contest: bool,
    index: bool,
    lang: bool,
    source: bool,
}

impl FilledFields {
    // contest id is only a form field on the problemset page, and the
    // action field is added by the page script on some layouts
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.index {
            missing.push("problem");
        }
        if !self.lang {
            missing.push("language");
        }
        if !self.source {
            missing.push("source");
        }
        missing
    }
}

impl Submit for BrowserDriver {
    fn prime(&mut self, session: &SessionContext, cnsl: &mut Console) -> Result<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::msg("Browser is already released"))?;
        let scope = session.scope();
        let cookies = session
            .credentials()
            .iter()
            .map(|cred| {
                CookieParam::builder()
                    .name(cred.name().clone())
                    .value(cred.value().clone())
                    .domain(scope.domain().clone())
                    .path(scope.path().clone())
                    .secure(true)
                    .build()
                    .map_err(Error::msg)
            })
            .collect::<Result<Vec<_>>>()?;

        let url = enter_url()?;
        let nav_timeout = self.conf.navigation_timeout();
        writeln!(cnsl, "Priming browser session on {}", url)?;
        let page = self.runtime.block_on(async {
            // cookies can only be installed once a page of the domain is open
            let page = bounded(nav_timeout, "open login page", browser.new_page(url.as_str())).await?;
            bounded(nav_timeout, "load login page", page.wait_for_navigation()).await?;
            bounded(nav_timeout, "install cookies", page.set_cookies(cookies)).await?;
            Ok::<_, Error>(page)
        })?;
        self.page = Some(page);
        Ok(())
    }

    fn submit(
        &mut self,
        _session: &SessionContext,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Result<()> {
        let page = self.page()?;
        let url = SubmitPageBuilder::new(request.contest_id()).url()?;
        let script = Self::fill_script(request)?;
        let nav_timeout = self.conf.navigation_timeout();
        let form_wait = self.conf.form_wait();

        self.runtime.block_on(async {
            writeln!(cnsl, "Opening {}", url)?;
            bounded(nav_timeout, "load submit page", page.goto(url.as_str()))
                .await
                .map_err(submit_failed)?;
            if current_url(page).await?.map_or(false, |url| is_enter_url(&url)) {
                return Err(EngineError::submit_failed(
                    "Submit page redirected to login, the session was rejected",
                )
                .into());
            }
            if !wait_for_element(page, FORM_SELECTOR, form_wait).await {
                cnsl.warn("Submit form did not appear in time, filling it anyway")?;
            }

            let filled: FilledFields = page
                .evaluate(script)
                .await
                .context("Could not fill submit form")
                .map_err(submit_failed)?
                .into_value()
                .context("Could not read result of filling submit form")
                .map_err(submit_failed)?;
            let missing = filled.missing();
            if !missing.is_empty() {
                return Err(EngineError::submit_failed(format!(
                    "Could not find form fields : {}",
                    missing.join(", ")
                ))
                .into());
            }

            let button = page.find_element(SUBMIT_BUTTON_SELECTOR).await.map_err(|_| {
                EngineError::submit_failed("Could not find submit button")
            })?;
            writeln!(cnsl, "Submitting {} ...", request.label_prefix())?;
            button
                .click()
                .await
                .context("Could not click submit button")
                .map_err(submit_failed)?;
            bounded(nav_timeout, "wait for submission", page.wait_for_navigation())
                .await
                .map_err(submit_failed)?;

            if current_url(page).await?.map_or(false, |url| is_enter_url(&url)) {
                return Err(EngineError::submit_failed(
                    "Redirected to login, the session was rejected",
                )
                .into());
            }
            let content = page
                .content()
                .await
                .context("Could not read page after submit")
                .map_err(submit_failed)?;
            if let Some(message) = extract_submit_error(&Html::parse_document(&content)) {
                return Err(EngineError::submit_failed(message).into());
            }
            Ok::<_, Error>(())
        })
    }

    fn release(&mut self) -> Result<()> {
        self.page = None;
        let mut browser = match self.browser.take() {
            Some(browser) => browser,
            None => return Ok(()),
        };
        let nav_timeout = self.conf.navigation_timeout();
        let closed = self.runtime.block_on(async {
            bounded(nav_timeout, "close browser", browser.close()).await?;
            bounded(nav_timeout, "wait for browser to exit", browser.wait()).await?;
            Ok::<_, Error>(())
        });
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        closed.map_err(|err| EngineError::ResourceCleanup(format!("{:#}", err)).into())
    }
}

impl FetchHtml for BrowserDriver {
    fn fetch_html(&mut self, url: &Url, _cnsl: &mut Console) -> Result<Html> {
        let page = self.page()?;
        let nav_timeout = self.conf.navigation_timeout();
        let content = self.runtime.block_on(async {
            bounded(nav_timeout, "load page", page.goto(url.as_str())).await?;
            if current_url(page).await?.map_or(false, |url| is_enter_url(&url)) {
                return Err(Error::msg("User not logged in"));
            }
            page.content().await.context("Could not read page content")
        })?;
        Ok(Html::parse_document(&content))
    }
}

impl Drop for BrowserDriver {
    fn drop(&mut self) {
        self.release().unwrap_or(());
    }
}

/// Any failure after the submit page is requested leaves the submission
/// unconfirmed.
fn submit_failed(err: Error) -> Error {
    EngineError::submit_failed(format!("{:#}", err)).into()
}

async fn bounded<T, E>(
    limit: Duration,
    action: &str,
    fut: impl Future<Output = std::result::Result<T, E>>,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.with_context(|| format!("Could not {}", action)),
        Err(_) => Err(anyhow!("Timed out after {:?} : {}", limit, action)),
    }
}

async fn current_url(page: &Page) -> Result<Option<Url>> {
    let url = page.url().await.context("Could not read page url")?;
    Ok(url.and_then(|url| Url::parse(&url).ok()))
}

/// Waits up to `limit` for `selector` to match. Expiry is not an error.
async fn wait_for_element(page: &Page, selector: &str, limit: Duration) -> bool {
    let found = async {
        while page.find_element(selector).await.is_err() {
            tokio::time::sleep(FORM_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(limit, found).await.is_ok()
}
