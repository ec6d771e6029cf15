use std::io::Write as _;

use maplit::hashmap;
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use scraper::Html;

use crate::config::SessionConfig;
use crate::driver::{FetchHtml, Submit};
use crate::model::{SessionContext, SubmissionRequest};
use crate::page::{extract_submit_error, is_enter_url, HasHeader as _, SubmitPageBuilder, BASE_URL};
use crate::service::scrape::{ExtractCsrfToken as _, GetHtml as _};
use crate::service::session::WithRetry as _;
use crate::service::{CookieJar, ResponseExt as _, RetryPolicy};
use crate::{Console, EngineError, Error, Result};

/// Plain HTTP driver. Replays the submit form with the session cookies.
#[derive(Debug)]
pub struct HttpDriver {
    client: Client,
    jar: CookieJar,
    policy: RetryPolicy,
}

impl HttpDriver {
    pub fn new(conf: &SessionConfig) -> Result<Self> {
        let client = conf.get_client_builder().build()?;
        Ok(Self {
            client,
            jar: CookieJar::empty(),
            policy: conf.retry_policy(),
        })
    }

    fn post_form(
        &mut self,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Result<Response> {
        let page = SubmitPageBuilder::new(request.contest_id()).build(
            &self.client,
            &mut self.jar,
            self.policy,
            cnsl,
        )?;
        if !page.is_logged_in() {
            return Err(EngineError::submit_failed("Not logged in on submit page").into());
        }
        if !page.has_submit_form() {
            cnsl.warn("Could not find submit form, posting anyway")?;
        }
        let token = page
            .extract_csrf_token()
            .map_err(|err| EngineError::submit_failed(format!("{:#}", err)))?;
        let action = page.form_action(&token)?;

        let contest_id = request.contest_id().to_string();
        let problem_index = request.problem_index().to_string();
        let payload = hashmap!(
            "csrf_token" => token.as_str(),
            "action" => "submitSolutionFormSubmitted",
            "contestId" => contest_id.as_str(),
            "submittedProblemIndex" => problem_index.as_str(),
            "programTypeId" => request.lang_id().as_str(),
            "source" => request.source().as_str(),
            "tabSize" => "4",
            "sourceFile" => "",
        );
        self.client
            .post(action)
            .form(&payload)
            .with_retry(&self.client, &mut self.jar, self.policy, cnsl)
            .send_pretty()
            .map_err(|err| EngineError::submit_failed(format!("{:#}", err)).into())
    }
}

impl Submit for HttpDriver {
    fn prime(&mut self, session: &SessionContext, cnsl: &mut Console) -> Result<()> {
        self.jar = CookieJar::from_session(session)?;
        writeln!(
            cnsl,
            "Installed {} cookies for {}",
            session.credentials().len(),
            session.scope().domain()
        )?;
        Ok(())
    }

    fn submit(
        &mut self,
        _session: &SessionContext,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Result<()> {
        let res = self.post_form(request, cnsl)?;
        check_submit_response(res)
    }

    fn release(&mut self) -> Result<()> {
        self.jar = CookieJar::empty();
        Ok(())
    }
}

impl FetchHtml for HttpDriver {
    fn fetch_html(&mut self, url: &Url, cnsl: &mut Console) -> Result<Html> {
        let (status, html) = url.get_html(&self.client, &mut self.jar, self.policy, cnsl)?;
        match status {
            StatusCode::OK => Ok(html),
            status if status.is_redirection() => Err(Error::msg("User not logged in")),
            status => Err(Error::msg(format!("Received invalid response : {}", status))),
        }
    }
}

/// The judge answers an accepted submission with a redirect to the
/// contest status page, and a rejected one with the form and an error.
fn check_submit_response(res: Response) -> Result<()> {
    let status = res.status();
    if status.is_redirection() {
        let location = res.location_url(&BASE_URL)?;
        if is_enter_url(&location) {
            return Err(
                EngineError::submit_failed("Redirected to login, the session was rejected").into(),
            );
        }
        return Ok(());
    }
    if status != StatusCode::OK {
        return Err(EngineError::submit_failed(format!("Received {}", status)).into());
    }
    let html = res.text().map(|text| Html::parse_document(&text))?;
    check_rejection(html)
}

fn check_rejection(html: Html) -> Result<()> {
    match extract_submit_error(&html) {
        Some(message) => Err(EngineError::submit_failed(message).into()),
        None => Ok(()),
    }
}
