use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use reqwest::Url;
use scraper::Html;

use crate::driver::FetchHtml;
use crate::poller::Clock;
use crate::{Console, Error, Result};

pub struct HistoryRow {
    id: String,
    problem: String,
    verdict: String,
}

impl HistoryRow {
    pub fn new(id: &str, problem: &str, verdict: &str) -> Self {
        Self {
            id: id.to_owned(),
            problem: problem.to_owned(),
            verdict: verdict.to_owned(),
        }
    }

    fn contest(&self) -> String {
        self.problem
            .chars()
            .take_while(char::is_ascii_digit)
            .collect()
    }

    fn to_html(&self) -> String {
        format!(
            r#"<tr data-submission-id="{id}">
  <td class="id-cell"><a class="view-source" href="/contest/{contest}/submission/{id}">{id}</a></td>
  <td class="status-small"><span class="format-time">Jan/01/2024 10:00</span></td>
  <td class="status-party-cell"><a href="/profile/tourist">tourist</a></td>
  <td class="status-small"><a href="/contest/{contest}/problem/A">
      {problem}
  </a></td>
  <td>GNU C++17</td>
  <td class="status-cell status-verdict-cell"><span class="submissionVerdictWrapper">{verdict}</span></td>
  <td class="time-consumed-cell">15&nbsp;ms</td>
  <td class="memory-consumed-cell">0&nbsp;KB</td>
</tr>"#,
            id = self.id,
            contest = self.contest(),
            problem = self.problem,
            verdict = self.verdict,
        )
    }
}

/// Submission history page with the given rows, newest first.
pub fn history_html(rows: &[HistoryRow]) -> String {
    let rows: Vec<String> = rows.iter().map(HistoryRow::to_html).collect();
    format!(
        r#"<html><body><div class="datatable"><table class="status-frame-datatable">
<tr><th>#</th><th>When</th><th>Who</th><th>Problem</th><th>Lang</th><th>Verdict</th><th>Time</th><th>Memory</th></tr>
{}
</table></div></body></html>"#,
        rows.join("\n")
    )
}

/// Clock that only moves when slept on or advanced.
pub struct FakeClock {
    now: Cell<Instant>,
    sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

/// Serves canned pages in order, repeating the last one when exhausted.
pub struct ScriptedFetcher<'a> {
    pages: VecDeque<std::result::Result<String, String>>,
    last: Option<std::result::Result<String, String>>,
    clock: Option<&'a FakeClock>,
    latency: Duration,
    pub fetched: Vec<Url>,
}

impl<'a> ScriptedFetcher<'a> {
    pub fn new(pages: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            pages: pages.into(),
            last: None,
            clock: None,
            latency: Duration::from_secs(0),
            fetched: Vec::new(),
        }
    }

    /// Every fetch advances `clock` by `latency`.
    pub fn with_latency(mut self, clock: &'a FakeClock, latency: Duration) -> Self {
        self.clock = Some(clock);
        self.latency = latency;
        self
    }
}

impl FetchHtml for ScriptedFetcher<'_> {
    fn fetch_html(&mut self, url: &Url, _cnsl: &mut Console) -> Result<Html> {
        self.fetched.push(url.clone());
        if let Some(clock) = self.clock {
            clock.advance(self.latency);
        }
        if let Some(page) = self.pages.pop_front() {
            self.last = Some(page);
        }
        match &self.last {
            Some(Ok(html)) => Ok(Html::parse_document(html)),
            Some(Err(msg)) => Err(Error::msg(msg.clone())),
            None => Err(Error::msg("No page scripted")),
        }
    }
}
