use anyhow::Context as _;
use cfsubmit_util::select;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::ElementRef;

use crate::model::ContestId;
use crate::service::scrape::Scrape;
use crate::Result;

mod status;
mod submit;

pub use status::{StatusPage, StatusPageBuilder};
pub use submit::{extract_submit_error, SubmitPageBuilder, FORM_SELECTOR};

lazy_static! {
    pub static ref BASE_URL: Url = Url::parse("https://codeforces.com").unwrap();
}

/// Path the judge redirects to when a session is not authenticated.
pub static ENTER_PATH: &str = "/enter";

pub fn enter_url() -> Result<Url> {
    BASE_URL
        .join(ENTER_PATH)
        .context("Could not parse login url")
}

/// True if `url` is the login page, which is where rejected sessions end up.
pub fn is_enter_url(url: &Url) -> bool {
    url.path().starts_with(ENTER_PATH)
}

/// Link to a submission built from its id, used when the row has none.
pub fn submission_url(contest_id: &ContestId, submission_id: &str) -> Result<Url> {
    let path = format!("/contest/{}/submission/{}", contest_id, submission_id);
    BASE_URL
        .join(&path)
        .context(format!("Could not parse url path: {}", path))
}

pub trait HasHeader: Scrape {
    fn select_header(&self) -> Option<ElementRef> {
        self.find_first(select!("#header .lang-chooser"))
    }

    fn is_logged_in(&self) -> bool {
        self.select_header()
            .map(|header| header.select(select!("a[href$=\"/logout\"]")).next().is_some())
            .unwrap_or(false)
    }
}
