use std::io::Write as _;

use anyhow::Context as _;

use crate::config::{Config, PollConfig};
use crate::driver::{build_driver, Driver};
use crate::locator::{HistoryLocator, Locate as _};
use crate::model::{HandleRef, SessionContext, SubmissionRequest};
use crate::outcome::Outcome;
use crate::poller::{Clock, PollState, SystemClock, VerdictPoller};
use crate::{Console, Result};

/// Submits `request` with the configured driver and waits for its verdict.
pub fn submit_and_track(
    conf: &Config,
    credentials: &str,
    handle: HandleRef,
    request: &SubmissionRequest,
    cnsl: &mut Console,
) -> Outcome {
    let session = match SessionContext::from_credential_str(credentials) {
        Ok(session) => session,
        Err(err) => return Outcome::from_error(&err),
    };
    let mut driver = match build_driver(conf, cnsl) {
        Ok(driver) => driver,
        Err(err) => return Outcome::from_error(&err.context("Could not start driver")),
    };
    Tracker::new(conf.poll(), &SystemClock).track(driver.as_mut(), &session, handle, request, cnsl)
}

/// Runs one submission through a driver and releases the driver afterwards.
pub struct Tracker<'a> {
    poll: &'a PollConfig,
    clock: &'a dyn Clock,
}

impl<'a> Tracker<'a> {
    pub fn new(poll: &'a PollConfig, clock: &'a dyn Clock) -> Self {
        Self { poll, clock }
    }

    /// Never fails. Errors become `Outcome::Error`, and `driver` is released
    /// exactly once whatever happens.
    pub fn track<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        session: &SessionContext,
        handle: HandleRef,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Outcome {
        let result = self.run(driver, session, handle, request, cnsl);
        if let Err(err) = driver.release() {
            cnsl.warn(&format!("{:#}", err)).unwrap_or(());
        }
        match result {
            Ok(state) => Outcome::assemble(state, request.contest_id()),
            Err(err) => Outcome::from_error(&err),
        }
    }

    fn run<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        session: &SessionContext,
        handle: HandleRef,
        request: &SubmissionRequest,
        cnsl: &mut Console,
    ) -> Result<PollState> {
        driver
            .prime(session, cnsl)
            .context("Could not prime session")?;

        let label_prefix = request.label_prefix();
        let stale_id = match HistoryLocator::new(&mut *driver).find(handle, &label_prefix, cnsl) {
            Ok(found) => found.map(|record| record.id().clone()),
            Err(err) => {
                cnsl.warn(&format!("{:#}", err))?;
                None
            }
        };

        driver.submit(session, request, cnsl)?;
        writeln!(cnsl, "Submitted {}, waiting for verdict", label_prefix)?;

        let poller = VerdictPoller::new(self.poll, self.clock).ignoring(stale_id);
        Ok(poller.poll(
            &mut HistoryLocator::new(&mut *driver),
            handle,
            &label_prefix,
            cnsl,
        ))
    }
}
