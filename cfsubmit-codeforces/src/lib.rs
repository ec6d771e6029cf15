#![warn(clippy::all)]

mod driver;
mod locator;
mod outcome;
mod page;
mod poller;
mod tracker;

#[cfg(test)]
mod testing;

use cfsubmit_config as config;
use cfsubmit_util::{console, model, service};

use crate::console::Console;

pub use cfsubmit_util::EngineError;
pub use driver::{build_driver, BrowserDriver, Driver, FetchHtml, HttpDriver, Submit};
pub use locator::{HistoryLocator, Locate};
pub use outcome::Outcome;
pub use poller::{Clock, PollState, SystemClock, VerdictPoller};
pub use tracker::{submit_and_track, Tracker};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
