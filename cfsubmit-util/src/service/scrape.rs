use anyhow::Context as _;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html, Selector};

use crate::console::Console;
use crate::select;
use crate::service::session::{RetryPolicy, WithRetry as _};
use crate::service::CookieJar;
use crate::{Error, Result};

pub trait GetHtml {
    fn url(&self) -> Result<Url>;

    fn get_html(
        &self,
        client: &Client,
        jar: &mut CookieJar,
        policy: RetryPolicy,
        cnsl: &mut Console,
    ) -> Result<(StatusCode, Html)> {
        let res = client
            .get(self.url()?)
            .with_retry(client, jar, policy, cnsl)
            .retry_send()?;
        let status = res.status();
        let html = res.text().map(|text| Html::parse_document(&text))?;
        Ok((status, html))
    }
}

impl GetHtml for Url {
    fn url(&self) -> Result<Url> {
        Ok(self.clone())
    }
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

impl Scrape for Html {
    fn elem(&self) -> ElementRef {
        self.root_element()
    }
}

pub trait ExtractCsrfToken: Scrape {
    fn extract_csrf_token(&self) -> Result<String> {
        let token = self
            .find_first(select!("[name=\"csrf_token\"]"))
            .context("Could not extract csrf token")?
            .value()
            .attr("value")
            .context("Could not find csrf_token value attr")?
            .to_owned();
        if token.is_empty() {
            Err(Error::msg("Found empty csrf token"))
        } else {
            Ok(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page(Html);

    impl Scrape for Page {
        fn elem(&self) -> ElementRef {
            self.0.root_element()
        }
    }

    impl ExtractCsrfToken for Page {}

    #[test]
    fn test_extract_csrf_token() -> anyhow::Result<()> {
        let page = Page(Html::parse_document(
            r#"<form><input type="hidden" name="csrf_token" value="0123abcd"/></form>"#,
        ));
        assert_eq!(page.extract_csrf_token()?, "0123abcd");

        let empty = Page(Html::parse_document(
            r#"<form><input type="hidden" name="csrf_token" value=""/></form>"#,
        ));
        assert!(empty.extract_csrf_token().is_err());

        let missing = Page(Html::parse_document("<form></form>"));
        assert!(missing.extract_csrf_token().is_err());
        Ok(())
    }

    #[test]
    fn test_inner_text() {
        let html = Html::parse_fragment("<div> <a>1A</a> - Theatre Square</div>");
        assert_eq!(html.inner_text(), " 1A - Theatre Square");
    }
}
