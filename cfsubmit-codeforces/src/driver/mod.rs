use reqwest::Url;
use scraper::Html;

use crate::config::Config;
use crate::model::{DriverKind, SessionContext, SubmissionRequest};
use crate::{Console, Result};

mod browser;
mod http;

pub use browser::BrowserDriver;
pub use http::HttpDriver;

/// Places a submission on behalf of an authenticated session.
pub trait Submit {
    /// Installs the session credentials. Must be called before `submit`.
    fn prime(&mut self, session: &SessionContext, cnsl: &mut Console) -> Result<()>;

    /// Submits `request` once. Never retried, a retry could submit twice.
    ///
    /// Fails with `EngineError::SubmitFailed` when the judge did not
    /// acknowledge the submission.
    fn submit(
        &mut self,
        session: &SessionContext,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Result<()>;

    /// Frees held resources. Calling it again is a no-op.
    fn release(&mut self) -> Result<()>;
}

/// Loads a page within the primed session.
pub trait FetchHtml {
    fn fetch_html(&mut self, url: &Url, cnsl: &mut Console) -> Result<Html>;
}

pub trait Driver: Submit + FetchHtml {}

impl<T: Submit + FetchHtml + ?Sized> Driver for T {}

/// Builds the driver variant chosen in config.
pub fn build_driver(conf: &Config, cnsl: &mut Console) -> Result<Box<dyn Driver>> {
    let driver: Box<dyn Driver> = match conf.driver() {
        DriverKind::Browser => Box::new(BrowserDriver::launch(conf.browser(), cnsl)?),
        DriverKind::Http => Box::new(HttpDriver::new(conf.session())?),
    };
    Ok(driver)
}
