use anyhow::Context as _;
use cfsubmit_util::select;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html};

use crate::model::{normalize_text, ContestId};
use crate::page::{HasHeader, BASE_URL};
use crate::service::scrape::{ExtractCsrfToken, GetHtml, Scrape};
use crate::service::{CookieJar, RetryPolicy};
use crate::{Console, EngineError, Result};

pub static FORM_SELECTOR: &str = "form.submit-form, form#submitForm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPageBuilder<'a> {
    contest_id: &'a ContestId,
}

impl<'a> SubmitPageBuilder<'a> {
    pub fn new(contest_id: &'a ContestId) -> Self {
        Self { contest_id }
    }

    pub fn build(
        self,
        client: &Client,
        jar: &mut CookieJar,
        policy: RetryPolicy,
        cnsl: &mut Console,
    ) -> Result<SubmitPage<'a>> {
        let (status, html) = self.get_html(client, jar, policy, cnsl)?;
        match status {
            StatusCode::OK => Ok(SubmitPage::new(self, html)),
            status if status.is_redirection() => Err(EngineError::submit_failed(
                "Submit page redirected to login, the session was rejected",
            )
            .into()),
            StatusCode::NOT_FOUND => Err(EngineError::submit_failed(format!(
                "Could not find contest {}. Check if the contest id is correct.",
                self.contest_id
            ))
            .into()),
            status => Err(EngineError::submit_failed(format!(
                "Received invalid response from submit page : {}",
                status
            ))
            .into()),
        }
    }
}

impl GetHtml for SubmitPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        let path = format!("/contest/{}/submit", self.contest_id);
        BASE_URL
            .join(&path)
            .context(format!("Could not parse url path: {}", path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPage<'a> {
    builder: SubmitPageBuilder<'a>,
    content: Html,
}

impl<'a> SubmitPage<'a> {
    pub fn new(builder: SubmitPageBuilder<'a>, content: Html) -> Self {
        Self { builder, content }
    }

    fn select_form(&self) -> Option<ElementRef> {
        self.content
            .select(select!("form.submit-form, form#submitForm"))
            .next()
    }

    pub fn has_submit_form(&self) -> bool {
        self.select_form().is_some()
    }

    /// Target of the submit form, carrying the csrf token in its query.
    pub fn form_action(&self, csrf_token: &str) -> Result<Url> {
        let action = self
            .select_form()
            .and_then(|form| form.value().attr("action"))
            .filter(|action| !action.is_empty());
        match action {
            Some(action) => BASE_URL
                .join(action)
                .context(format!("Could not parse form action: {}", action)),
            None => {
                let mut url = self.builder.url()?;
                url.query_pairs_mut().append_pair("csrf_token", csrf_token);
                Ok(url)
            }
        }
    }
}

/// Error message the judge rendered next to the submit form, if any.
pub fn extract_submit_error(content: &Html) -> Option<String> {
    content
        .select(select!("span.error"))
        .map(|elem| normalize_text(&elem.inner_text()))
        .find(|text| !text.is_empty())
}

impl Scrape for SubmitPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl HasHeader for SubmitPage<'_> {}

impl ExtractCsrfToken for SubmitPage<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    static SUBMIT_HTML: &str = r#"
<html><body>
<div id="header"><div class="lang-chooser">
  <a href="/profile/tourist">tourist</a> | <a href="/0123abcd/logout">Logout</a>
</div></div>
<form class="submit-form" method="post" action="/contest/1/submit?csrf_token=0123abcd">
  <input type="hidden" name="csrf_token" value="0123abcd"/>
  <input type="hidden" name="action" value="submitSolutionFormSubmitted"/>
  <select name="submittedProblemIndex"><option value="A">A - Theatre Square</option></select>
  <select name="programTypeId"><option value="54">GNU G++17 7.3.0</option></select>
  <textarea id="sourceCodeTextarea" name="source"></textarea>
  <span class="error for__source"></span>
  <input class="submit" type="submit" value="Submit"/>
</form>
</body></html>
"#;

    #[test]
    fn extract_form_fields() -> anyhow::Result<()> {
        let contest_id = ContestId::from("1");
        let page = SubmitPage::new(
            SubmitPageBuilder::new(&contest_id),
            Html::parse_document(SUBMIT_HTML),
        );
        assert!(page.is_logged_in());
        assert!(page.has_submit_form());
        let token = page.extract_csrf_token()?;
        assert_eq!(token, "0123abcd");
        assert_eq!(
            page.form_action(&token)?.as_str(),
            "https://codeforces.com/contest/1/submit?csrf_token=0123abcd"
        );
        assert_eq!(extract_submit_error(&page.content), None);
        Ok(())
    }

    #[test]
    fn form_action_falls_back_to_page_url() -> anyhow::Result<()> {
        let contest_id = ContestId::from("1");
        let page = SubmitPage::new(
            SubmitPageBuilder::new(&contest_id),
            Html::parse_document(r#"<input name="csrf_token" value="abc"/>"#),
        );
        assert!(!page.has_submit_form());
        assert_eq!(
            page.form_action("abc")?.as_str(),
            "https://codeforces.com/contest/1/submit?csrf_token=abc"
        );
        Ok(())
    }

    #[test]
    fn extract_rejection_message() {
        let html = SUBMIT_HTML.replace(
            r#"<span class="error for__source"></span>"#,
            r#"<span class="error for__source">
                You have submitted exactly the same code before
            </span>"#,
        );
        assert_eq!(
            extract_submit_error(&Html::parse_document(&html)),
            Some("You have submitted exactly the same code before".to_owned())
        );
    }
}
