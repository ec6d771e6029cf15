use anyhow::Context as _;
use cfsubmit_util::select;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::model::{HandleRef, SubmissionRecord};
use crate::page::BASE_URL;
use crate::service::scrape::{GetHtml, Scrape};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPageBuilder<'a> {
    handle: HandleRef<'a>,
}

impl<'a> StatusPageBuilder<'a> {
    pub fn new(handle: HandleRef<'a>) -> Self {
        Self { handle }
    }
}

impl GetHtml for StatusPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        let path = format!("/submissions/{}", self.handle.trim());
        BASE_URL
            .join(&path)
            .context(format!("Could not parse url path: {}", path))
    }
}

/// Submission history of one handle, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPage {
    content: Html,
}

impl StatusPage {
    /// Header cells of the history table as currently laid out.
    pub const HEADER_COLUMNS: usize = 8;

    pub fn new(content: Html) -> Self {
        Self { content }
    }

    pub fn has_table(&self) -> bool {
        self.find_first(select!("table.status-frame-datatable"))
            .is_some()
    }

    /// Fails if the header row does not have the expected number of cells.
    ///
    /// Rows are read by position, so a changed layout would silently
    /// produce wrong fields.
    pub fn check_header(&self) -> Result<()> {
        let n_cells = self
            .select_rows()
            .map(|row| row.0.select(select!("th")).count())
            .find(|n_cells| *n_cells > 0)
            .context("Could not find header of submission table")?;
        if n_cells != Self::HEADER_COLUMNS {
            return Err(Error::msg(format!(
                "Found {} columns in submission table, expected {}",
                n_cells,
                Self::HEADER_COLUMNS
            )));
        }
        Ok(())
    }

    /// Newest submission whose problem label starts with `label_prefix`.
    pub fn find_latest(&self, label_prefix: &str) -> Option<SubmissionRecord> {
        self.select_rows()
            .filter_map(|row| row.parse_row())
            .find(|record| record.matches_problem(label_prefix))
    }

    fn select_rows(&self) -> impl Iterator<Item = SubmissionRowElem> {
        self.content
            .select(select!("table.status-frame-datatable tr"))
            .map(SubmissionRowElem)
    }
}

impl Scrape for StatusPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SubmissionRowElem<'a>(ElementRef<'a>);

impl SubmissionRowElem<'_> {
    fn parse_row(&self) -> Option<SubmissionRecord> {
        let cells: Vec<ElementRef> = self.0.select(select!("td")).collect();
        let texts: Vec<String> = cells.iter().map(|td| td.inner_text()).collect();
        let record = SubmissionRecord::from_columns(&texts)?;
        Some(record.with_link(extract_link(&cells)))
    }
}

// verdict cell first, the id cell links to the same page
fn extract_link(cells: &[ElementRef]) -> Option<String> {
    [SubmissionRecord::COL_VERDICT, SubmissionRecord::COL_ID]
        .iter()
        .filter_map(|i| cells.get(*i))
        .filter_map(|cell| cell.find_first(select!("a[href*=\"/submission/\"]")))
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| BASE_URL.join(href).ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{history_html, HistoryRow};

    #[test]
    fn status_url() -> anyhow::Result<()> {
        assert_eq!(
            StatusPageBuilder::new(" tourist ").url()?.as_str(),
            "https://codeforces.com/submissions/tourist"
        );
        Ok(())
    }

    #[test]
    fn parse_rows_in_page_order() -> anyhow::Result<()> {
        let page = StatusPage::new(Html::parse_document(&history_html(&[
            HistoryRow::new("1002", "1B - Spreadsheets", "Running on test 3"),
            HistoryRow::new("1001", "1A - Theatre Square", "Accepted"),
        ])));
        assert!(page.has_table());
        page.check_header()?;

        let records: Vec<_> = page.select_rows().filter_map(|row| row.parse_row()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "1002");
        assert_eq!(records[0].verdict(), "Running on test 3");
        assert_eq!(records[1].time().as_deref(), Some("15 ms"));
        assert_eq!(records[1].memory().as_deref(), Some("0 KB"));
        assert_eq!(
            records[1].link().as_deref(),
            Some("https://codeforces.com/contest/1/submission/1001")
        );
        Ok(())
    }

    #[test]
    fn find_latest_matches_prefix() {
        let page = StatusPage::new(Html::parse_document(&history_html(&[
            HistoryRow::new("1003", "2A - Winner", "Accepted"),
            HistoryRow::new("1002", "1A - Theatre Square", "Wrong answer on test 2"),
            HistoryRow::new("1001", "1A - Theatre Square", "Accepted"),
        ])));
        let latest = page.find_latest("1a").unwrap();
        assert_eq!(latest.id(), "1002");
        assert_eq!(page.find_latest("1B"), None);
    }

    #[test]
    fn missing_table() {
        let page = StatusPage::new(Html::parse_document("<div>Enter</div>"));
        assert!(!page.has_table());
        assert!(page.check_header().is_err());
        assert_eq!(page.find_latest(""), None);
    }

    #[test]
    fn check_header_detects_layout_change() {
        let html = r#"<table class="status-frame-datatable">
            <tr><th>#</th><th>When</th><th>Problem</th><th>Verdict</th></tr>
        </table>"#;
        let page = StatusPage::new(Html::parse_document(html));
        assert!(page.check_header().is_err());
    }
}
