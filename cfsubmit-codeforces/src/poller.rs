use std::thread;
use std::time::{Duration, Instant};

use crate::config::PollConfig;
use crate::locator::Locate;
use crate::model::{HandleRef, SubmissionRecord};
use crate::Console;

/// Source of time for the polling loop.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Still waiting, with the most recent matching row if any.
    Polling(Option<SubmissionRecord>),
    Terminal(SubmissionRecord),
    TimedOut(Option<SubmissionRecord>),
}

/// Re-reads the history until a final verdict shows up or the deadline passes.
pub struct VerdictPoller<'a> {
    interval: Duration,
    deadline: Duration,
    clock: &'a dyn Clock,
    stale_id: Option<String>,
}

impl<'a> VerdictPoller<'a> {
    pub fn new(conf: &PollConfig, clock: &'a dyn Clock) -> Self {
        Self {
            interval: conf.interval(),
            deadline: conf.deadline(),
            clock,
            stale_id: None,
        }
    }

    /// Skips the row with this id, which was the newest one before submitting.
    pub fn ignoring(mut self, stale_id: Option<String>) -> Self {
        self.stale_id = stale_id;
        self
    }

    /// Polls until `Terminal` or `TimedOut`, never returning `Polling`.
    pub fn poll<L: Locate + ?Sized>(
        &self,
        locator: &mut L,
        handle: HandleRef,
        label_prefix: &str,
        cnsl: &mut Console,
    ) -> PollState {
        let started = self.clock.now();
        let pb = cnsl.build_spinner("Verdict");
        pb.set_message("Waiting ...");
        let mut state = PollState::Polling(None);
        let done = loop {
            match state {
                PollState::Polling(last_seen) => {
                    state = self.cycle(started, last_seen, locator, handle, label_prefix, cnsl);
                    if let PollState::Polling(Some(record)) = &state {
                        pb.set_message(record.verdict().clone());
                    }
                }
                done => break done,
            }
        };
        pb.finish_and_clear();
        done
    }

    fn cycle<L: Locate + ?Sized>(
        &self,
        started: Instant,
        last_seen: Option<SubmissionRecord>,
        locator: &mut L,
        handle: HandleRef,
        label_prefix: &str,
        cnsl: &mut Console,
    ) -> PollState {
        if self.elapsed(started) >= self.deadline {
            return PollState::TimedOut(last_seen);
        }
        let found = match locator.find(handle, label_prefix, cnsl) {
            Ok(found) => found.filter(|record| Some(record.id()) != self.stale_id.as_ref()),
            Err(err) => {
                cnsl.warn(&format!("{:#}", err)).unwrap_or(());
                None
            }
        };
        // a read that finished past the deadline is discarded
        let elapsed = self.elapsed(started);
        if elapsed >= self.deadline {
            return PollState::TimedOut(last_seen);
        }
        match found {
            Some(record) if record.is_terminal() => PollState::Terminal(record),
            found => {
                self.clock.sleep(self.interval.min(self.deadline - elapsed));
                PollState::Polling(found.or(last_seen))
            }
        }
    }

    fn elapsed(&self, started: Instant) -> Duration {
        self.clock.now().saturating_duration_since(started)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use ntest::timeout;

    use super::*;
    use crate::console::ConsoleConfig;
    use crate::testing::{history_html, FakeClock, HistoryRow, ScriptedFetcher};
    use crate::{EngineError, HistoryLocator, Result};

    struct ScriptedLocator {
        results: VecDeque<Result<Option<SubmissionRecord>>>,
        calls: usize,
    }

    impl ScriptedLocator {
        fn new(results: Vec<Result<Option<SubmissionRecord>>>) -> Self {
            Self {
                results: results.into(),
                calls: 0,
            }
        }
    }

    impl Locate for ScriptedLocator {
        fn find(
            &mut self,
            _handle: HandleRef,
            _label_prefix: &str,
            _cnsl: &mut Console,
        ) -> Result<Option<SubmissionRecord>> {
            self.calls += 1;
            self.results.pop_front().unwrap_or(Ok(None))
        }
    }

    fn record(id: &str, verdict: &str) -> SubmissionRecord {
        SubmissionRecord::new(id, "1A - Theatre Square", verdict)
    }

    fn conf(interval_ms: u64, deadline_ms: u64) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(deadline_ms),
        )
    }

    #[test]
    #[timeout(1000)]
    fn stops_on_first_terminal_verdict() {
        let clock = FakeClock::new();
        let mut locator = ScriptedLocator::new(vec![
            Ok(Some(record("9", "In queue"))),
            Ok(Some(record("9", "Running on test 1"))),
            Ok(Some(record("9", "Running on test 4"))),
            Ok(Some(record("9", "Accepted"))),
            Ok(Some(record("9", "Wrong answer"))),
        ]);
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(2500, 90_000), &clock).poll(
            &mut locator,
            "tourist",
            "1A",
            cnsl,
        );

        assert_eq!(state, PollState::Terminal(record("9", "Accepted")));
        assert_eq!(locator.calls, 4);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(2500); 3]);
    }

    #[test]
    #[timeout(1000)]
    fn times_out_with_last_seen_record() {
        let clock = FakeClock::new();
        let mut locator = ScriptedLocator::new(vec![
            Ok(None),
            Ok(Some(record("9", "Running on test 2"))),
            Ok(None),
        ]);
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(1000, 5000), &clock).poll(
            &mut locator,
            "tourist",
            "1A",
            cnsl,
        );

        assert_eq!(
            state,
            PollState::TimedOut(Some(record("9", "Running on test 2")))
        );
        assert_eq!(locator.calls, 5);
        let total: Duration = clock.sleeps().iter().sum();
        assert_eq!(total, Duration::from_millis(5000));
    }

    #[test]
    #[timeout(1000)]
    fn times_out_without_any_record() {
        let clock = FakeClock::new();
        let mut locator = ScriptedLocator::new(Vec::new());
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(2000, 3000), &clock).poll(
            &mut locator,
            "tourist",
            "1A",
            cnsl,
        );

        assert_eq!(state, PollState::TimedOut(None));
        // last sleep is cut down to the remaining budget
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(2000), Duration::from_millis(1000)]
        );
    }

    #[test]
    #[timeout(1000)]
    fn zero_deadline_never_reads() {
        let clock = FakeClock::new();
        let mut locator = ScriptedLocator::new(vec![Ok(Some(record("9", "Accepted")))]);
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(1000, 0), &clock).poll(
            &mut locator,
            "tourist",
            "1A",
            cnsl,
        );

        assert_eq!(state, PollState::TimedOut(None));
        assert_eq!(locator.calls, 0);
    }

    #[test]
    #[timeout(1000)]
    fn locator_errors_keep_polling() {
        let clock = FakeClock::new();
        let mut locator = ScriptedLocator::new(vec![
            Ok(Some(record("9", "Running on test 1"))),
            Err(EngineError::locator_unavailable("connection reset").into()),
            Ok(Some(record("9", "Accepted"))),
        ]);
        let cnsl = &mut Console::buf(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(1000, 10_000), &clock).poll(
            &mut locator,
            "tourist",
            "1A",
            cnsl,
        );
        assert_eq!(state, PollState::Terminal(record("9", "Accepted")));
        assert_eq!(locator.calls, 3);
    }

    #[test]
    #[timeout(1000)]
    fn late_read_is_discarded() {
        let clock = FakeClock::new();
        let accepted = history_html(&[HistoryRow::new("1002", "1A - Theatre Square", "Accepted")]);
        // a read that took longer than the whole budget
        let mut fetcher =
            ScriptedFetcher::new(vec![Ok(accepted)]).with_latency(&clock, Duration::from_secs(10));
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(1000, 5000), &clock).poll(
            &mut HistoryLocator::new(&mut fetcher),
            "tourist",
            "1A",
            cnsl,
        );
        assert_eq!(state, PollState::TimedOut(None));
        assert_eq!(fetcher.fetched.len(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    #[timeout(1000)]
    fn stale_row_is_ignored() {
        let clock = FakeClock::new();
        let older = history_html(&[HistoryRow::new("1001", "1A - Theatre Square", "Accepted")]);
        let newer = history_html(&[
            HistoryRow::new("1002", "1A - Theatre Square", "Wrong answer on test 3"),
            HistoryRow::new("1001", "1A - Theatre Square", "Accepted"),
        ]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(older.clone()), Ok(older), Ok(newer)]);
        let cnsl = &mut Console::sink(ConsoleConfig::default());
        let state = VerdictPoller::new(&conf(1000, 10_000), &clock)
            .ignoring(Some("1001".to_owned()))
            .poll(&mut HistoryLocator::new(&mut fetcher), "tourist", "1A", cnsl);

        match state {
            PollState::Terminal(record) => {
                assert_eq!(record.id(), "1002");
                assert_eq!(record.verdict(), "Wrong answer on test 3");
            }
            state => panic!("unexpected state: {:?}", state),
        }
        assert_eq!(fetcher.fetched.len(), 3);
    }
}
