use scraper::Html;

use crate::driver::FetchHtml;
use crate::model::{HandleRef, SubmissionRecord};
use crate::page::{StatusPage, StatusPageBuilder};
use crate::service::scrape::GetHtml as _;
use crate::{Console, EngineError, Result};

/// Finds the newest submission of a handle for a problem.
pub trait Locate {
    /// Returns `Ok(None)` when no row matches, and
    /// `EngineError::LocatorUnavailable` when the history could not be read.
    fn find(
        &mut self,
        handle: HandleRef,
        label_prefix: &str,
        cnsl: &mut Console,
    ) -> Result<Option<SubmissionRecord>>;
}

/// Reads the submission history page through a driver's session.
pub struct HistoryLocator<'a, F: FetchHtml + ?Sized> {
    fetcher: &'a mut F,
}

impl<'a, F: FetchHtml + ?Sized> HistoryLocator<'a, F> {
    pub fn new(fetcher: &'a mut F) -> Self {
        Self { fetcher }
    }

    fn load(&mut self, handle: HandleRef, cnsl: &mut Console) -> Result<StatusPage> {
        let url = StatusPageBuilder::new(handle).url()?;
        let html: Html = self
            .fetcher
            .fetch_html(&url, cnsl)
            .map_err(|err| EngineError::locator_unavailable(format!("{:#}", err)))?;
        let page = StatusPage::new(html);
        if !page.has_table() {
            return Err(
                EngineError::locator_unavailable("Could not find submission table").into(),
            );
        }
        if let Err(err) = page.check_header() {
            cnsl.warn(&format!("{:#}", err))?;
        }
        Ok(page)
    }
}

impl<F: FetchHtml + ?Sized> Locate for HistoryLocator<'_, F> {
    fn find(
        &mut self,
        handle: HandleRef,
        label_prefix: &str,
        cnsl: &mut Console,
    ) -> Result<Option<SubmissionRecord>> {
        let page = self.load(handle, cnsl)?;
        Ok(page.find_latest(label_prefix))
    }
}
