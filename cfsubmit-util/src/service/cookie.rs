use std::convert::TryFrom as _;

use anyhow::Context as _;
use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use reqwest::Url;

use crate::model::SessionContext;
use crate::Result;

/// In-memory cookie store for one tracked submission.
///
/// Seeded from a `SessionContext` and refreshed by `Set-Cookie` headers.
/// Nothing is written to disk.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: CookieStore,
}

impl CookieJar {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_session(session: &SessionContext) -> Result<Self> {
        let scope = session.scope();
        let origin = Url::parse(&format!("https://{}{}", scope.domain(), scope.path()))
            .context("Could not parse cookie scope as url")?;
        let mut store = CookieStore::default();
        for cred in session.credentials() {
            let mut raw = RawCookie::new(cred.name().clone(), cred.value().clone());
            raw.set_domain(scope.domain().clone());
            raw.set_path(scope.path().clone());
            raw.set_secure(true);
            store
                .insert_raw(&raw, &origin)
                .with_context(|| format!("Could not store cookie : {}", cred.name()))?;
        }
        Ok(Self { store })
    }

    pub fn header_value(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .store
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    pub fn load_into(&self, request: &mut Request) -> Result<()> {
        if let Some(cookie) = self.header_value(request.url()) {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::try_from(cookie)?);
        }
        Ok(())
    }

    pub fn store_from(&mut self, response: &Response) {
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| {
                val.to_str()
                    .ok()
                    .and_then(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok())
            });
        let url = response.url().clone();
        self.store.store_response_cookies(cookies, &url);
    }
}
