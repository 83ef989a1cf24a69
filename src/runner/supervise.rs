//! Poll/timeout/terminate state machine for one launched engine.
//!
//! States: Polling -> Done, or Polling -> TimedOut -> Terminating -> Done.
//! Time, child liveness and signalling are traits so the machine can be
//! driven without a real process.

use log::{debug, info, warn};
use serde::Serialize;
use std::io;
use std::process::Child;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The child exited on its own before the timeout.
    Exited,
    /// The timeout expired and termination signals were sent.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Supervision {
    pub outcome: RunOutcome,
    /// Time since spawn when supervision ended.
    pub elapsed: Duration,
    /// Number of liveness checks made while polling.
    pub polls: u32,
}

pub trait Clock {
    /// Time since the run started.
    fn elapsed(&self) -> Duration;
    fn sleep(&self, d: Duration);
}

/// Wall clock anchored at the spawn instant.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn started_at(start: Instant) -> Self {
        Self { start }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// The spawn handle of a run.
pub trait ChildProcess {
    fn id(&self) -> u32;

    /// Non-blocking exit check.
    fn has_exited(&mut self) -> io::Result<bool>;
}

impl ChildProcess for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.try_wait()?.is_some())
    }
}

/// Sends a graceful termination request to an OS process.
pub trait Signaller {
    fn terminate(&self, pid: u32) -> io::Result<()>;
}

pub struct Supervisor<C, S> {
    poll_period: Duration,
    timeout: Duration,
    clock: C,
    signaller: S,
}

impl<C: Clock, S: Signaller> Supervisor<C, S> {
    pub fn new(poll_period: Duration, timeout: Duration, clock: C, signaller: S) -> Self {
        Self {
            poll_period,
            timeout,
            clock,
            signaller,
        }
    }

    /// Poll `child` until it exits or the timeout expires, then terminate
    /// `engine_pid` and the spawn handle if still running.
    pub fn supervise(&self, child: &mut impl ChildProcess, engine_pid: u32) -> Supervision {
        let mut polls = 0;
        let mut exited = false;
        let mut elapsed = self.clock.elapsed();

        while !exited && elapsed < self.timeout {
            let remaining = self.timeout - elapsed;
            self.clock.sleep(self.poll_period.min(remaining));
            exited = self.check_exited(child);
            polls += 1;
            elapsed = self.clock.elapsed();
            debug!("poll {}: exited={} after {:?}", polls, exited, elapsed);
        }

        if exited {
            info!("SPE done after {:.1}s", elapsed.as_secs_f64());
            return Supervision {
                outcome: RunOutcome::Exited,
                elapsed,
                polls,
            };
        }

        info!(
            "SPE timed out after {:.1}s, terminating...",
            elapsed.as_secs_f64()
        );

        if self.check_exited(child) {
            debug!("child exited before termination, nothing to signal");
        } else {
            self.terminate_all(&[engine_pid, child.id()]);
        }

        Supervision {
            outcome: RunOutcome::TimedOut,
            elapsed,
            polls,
        }
    }

    /// Errors from the exit check count as "still running"; the timeout bounds the wait.
    fn check_exited(&self, child: &mut impl ChildProcess) -> bool {
        match child.has_exited() {
            Ok(done) => done,
            Err(e) => {
                warn!("error checking child PID {}: {}", child.id(), e);
                false
            }
        }
    }

    /// Best effort: every pid gets one SIGTERM, failures are ignored.
    fn terminate_all(&self, pids: &[u32]) {
        let mut sent: Vec<u32> = Vec::with_capacity(pids.len());
        for &pid in pids {
            if sent.contains(&pid) {
                continue;
            }
            sent.push(pid);
            match self.signaller.terminate(pid) {
                Ok(()) => info!("sent SIGTERM to PID {}", pid),
                Err(e) => debug!("SIGTERM to PID {} ignored: {}", pid, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Clock that only moves when slept on.
    #[derive(Clone, Default)]
    struct FakeClock {
        now: Rc<Cell<Duration>>,
        sleeps: Rc<RefCell<Vec<Duration>>>,
    }

    impl FakeClock {
        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.borrow().clone()
        }
    }

    impl Clock for FakeClock {
        fn elapsed(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, d: Duration) {
            self.sleeps.borrow_mut().push(d);
            self.now.set(self.now.get() + d);
        }
    }

    /// Child that exits at a fixed point on the fake clock, or never.
    struct FakeChild {
        pid: u32,
        exits_at: Option<Duration>,
        clock: FakeClock,
    }

    impl ChildProcess for FakeChild {
        fn id(&self) -> u32 {
            self.pid
        }

        fn has_exited(&mut self) -> io::Result<bool> {
            Ok(self.exits_at.is_some_and(|t| self.clock.elapsed() >= t))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSignaller {
        sent: Rc<RefCell<Vec<u32>>>,
        /// Pids that behave as already gone.
        gone: Vec<u32>,
    }

    impl RecordingSignaller {
        fn sent(&self) -> Vec<u32> {
            self.sent.borrow().clone()
        }
    }

    impl Signaller for RecordingSignaller {
        fn terminate(&self, pid: u32) -> io::Result<()> {
            self.sent.borrow_mut().push(pid);
            if self.gone.contains(&pid) {
                return Err(io::Error::from_raw_os_error(3)); // ESRCH
            }
            Ok(())
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn child_exiting_early_is_seen_on_next_poll() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller::default();
        let mut child = FakeChild {
            pid: 100,
            exits_at: Some(secs(3.0)),
            clock: clock.clone(),
        };

        let sup = Supervisor::new(secs(10.0), secs(6000.0), clock.clone(), signaller.clone());
        let result = sup.supervise(&mut child, 4242);

        assert_eq!(result.outcome, RunOutcome::Exited);
        assert_eq!(result.polls, 1);
        assert_eq!(result.elapsed, secs(10.0));
        assert_eq!(clock.sleeps(), vec![secs(10.0)]);
        assert!(signaller.sent().is_empty());
    }

    #[test]
    fn timeout_terminates_discovered_pid_once() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller::default();
        let mut child = FakeChild {
            pid: 100,
            exits_at: None,
            clock: clock.clone(),
        };

        let sup = Supervisor::new(secs(1.0), secs(2.5), clock.clone(), signaller.clone());
        let result = sup.supervise(&mut child, 4242);

        assert_eq!(result.outcome, RunOutcome::TimedOut);
        assert_eq!(clock.sleeps(), vec![secs(1.0), secs(1.0), secs(0.5)]);
        assert_eq!(result.elapsed, secs(2.5));
        assert_eq!(result.polls, 3);

        let sent = signaller.sent();
        assert_eq!(sent.iter().filter(|&&p| p == 4242).count(), 1);
        assert_eq!(sent, vec![4242, 100]);
    }

    #[test]
    fn shared_pid_is_signalled_once() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller::default();
        let mut child = FakeChild {
            pid: 7,
            exits_at: None,
            clock: clock.clone(),
        };

        let sup = Supervisor::new(secs(1.0), secs(1.0), clock, signaller.clone());
        sup.supervise(&mut child, 7);

        assert_eq!(signaller.sent(), vec![7]);
    }

    #[test]
    fn already_exited_engine_is_not_an_error() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller {
            gone: vec![4242],
            ..Default::default()
        };
        let mut child = FakeChild {
            pid: 100,
            exits_at: None,
            clock: clock.clone(),
        };

        let sup = Supervisor::new(secs(2.0), secs(3.0), clock, signaller.clone());
        let result = sup.supervise(&mut child, 4242);

        assert_eq!(result.outcome, RunOutcome::TimedOut);
        // The spawn handle is still signalled after the engine pid fails.
        assert_eq!(signaller.sent(), vec![4242, 100]);
    }

    #[test]
    fn exit_on_final_poll_wins_over_timeout() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller::default();
        let mut child = FakeChild {
            pid: 100,
            exits_at: Some(secs(2.5)),
            clock: clock.clone(),
        };

        let sup = Supervisor::new(secs(1.0), secs(2.5), clock, signaller.clone());
        let result = sup.supervise(&mut child, 4242);

        assert_eq!(result.outcome, RunOutcome::Exited);
        assert!(signaller.sent().is_empty());
    }

    struct FlakyChild {
        checks: u32,
    }

    impl ChildProcess for FlakyChild {
        fn id(&self) -> u32 {
            9
        }

        fn has_exited(&mut self) -> io::Result<bool> {
            self.checks += 1;
            Err(io::Error::other("wait failed"))
        }
    }

    #[test]
    fn exit_check_errors_keep_polling_until_timeout() {
        let clock = FakeClock::default();
        let signaller = RecordingSignaller::default();
        let mut child = FlakyChild { checks: 0 };

        let sup = Supervisor::new(secs(1.0), secs(2.0), clock, signaller.clone());
        let result = sup.supervise(&mut child, 4242);

        assert_eq!(result.outcome, RunOutcome::TimedOut);
        assert_eq!(result.polls, 2);
        // Two polls plus the pre-termination recheck.
        assert_eq!(child.checks, 3);
        assert_eq!(signaller.sent(), vec![4242, 9]);
    }
}
