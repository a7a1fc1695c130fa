//! Wake monitor — the mutex + condition variable pair shared by the event
//! loop and everything that may need to interrupt its wait.
//!
//! The loop blocks in [`WakeMonitor::wait`] until the engine's next deadline
//! or until someone sets one of the two bits under the lock:
//!
//! - *wake requested*, set by [`Waker::wake`] when new work arrives;
//! - *quit*, set once by [`Waker::request_quit`] and never cleared.
//!
//! Both bits are checked by the wait predicate, so a wake that lands while
//! the loop is polling is remembered rather than lost, and spurious
//! condition-variable wakeups never end a wait early.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::ports::NextWake;

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// The deadline passed.
    Deadline,
    /// A wake or quit was requested.
    Signaled,
}

#[derive(Debug, Default)]
struct MonitorState {
    deadline: Option<Instant>,
    wake_requested: bool,
    quit: bool,
}

/// Mutex, condition variable, deadline and quit flag.
#[derive(Debug, Default)]
pub struct WakeMonitor {
    state: Mutex<MonitorState>,
    condvar: Condvar,
}

impl WakeMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `next` or until a wake/quit is requested.
    ///
    /// Consumes a pending wake request. The caller does not need to
    /// distinguish the cause; it is returned for diagnostics.
    pub fn wait(&self, next: NextWake) -> WakeCause {
        let mut state = self.lock();
        state.deadline = next.deadline();

        let cause = match next {
            NextWake::Idle => {
                state = self
                    .condvar
                    .wait_while(state, |s| !s.wake_requested)
                    .unwrap_or_else(PoisonError::into_inner);
                WakeCause::Signaled
            }
            NextWake::At(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                let (guard, result) = self
                    .condvar
                    .wait_timeout_while(state, timeout, |s| !s.wake_requested)
                    .unwrap_or_else(PoisonError::into_inner);
                state = guard;
                if state.wake_requested {
                    WakeCause::Signaled
                } else {
                    debug_assert!(result.timed_out());
                    WakeCause::Deadline
                }
            }
        };

        state.wake_requested = false;
        state.deadline = None;
        cause
    }

    /// Request an immediate wake.
    pub fn wake(&self) {
        let mut state = self.lock();
        state.wake_requested = true;
        self.condvar.notify_one();
    }

    /// Set the quit flag and wake the loop.
    ///
    /// Returns `true` only for the call that actually set the flag.
    pub fn request_quit(&self) -> bool {
        let mut state = self.lock();
        let first = !state.quit;
        state.quit = true;
        state.wake_requested = true;
        self.condvar.notify_one();
        first
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.lock().quit
    }

    /// Deadline of the wait in progress, if the loop is currently waiting on one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.lock().deadline
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle onto a [`WakeMonitor`].
///
/// Handed to the engine (new work) and to the signal bridge (quit). It only
/// ever takes the monitor lock briefly and never blocks otherwise.
#[derive(Debug, Clone)]
pub struct Waker {
    monitor: Arc<WakeMonitor>,
}

impl Waker {
    #[must_use]
    pub fn new(monitor: Arc<WakeMonitor>) -> Self {
        Self { monitor }
    }

    /// Interrupt the current or next wait so the engine gets polled.
    pub fn wake(&self) {
        self.monitor.wake();
    }

    /// Ask the loop to terminate. Returns `true` for the first request.
    pub fn request_quit(&self) -> bool {
        self.monitor.request_quit()
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.monitor.is_quit_requested()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn should_not_resume_before_deadline() {
        let monitor = WakeMonitor::new();
        let start = Instant::now();
        let deadline = start + Duration::from_millis(50);

        let cause = monitor.wait(NextWake::At(deadline));

        assert_eq!(cause, WakeCause::Deadline);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn should_return_immediately_when_deadline_already_passed() {
        let monitor = WakeMonitor::new();
        let cause = monitor.wait(NextWake::At(Instant::now()));
        assert_eq!(cause, WakeCause::Deadline);
    }

    #[test]
    fn should_remember_wake_requested_before_wait() {
        let monitor = WakeMonitor::new();
        monitor.wake();
        assert_eq!(monitor.wait(NextWake::Idle), WakeCause::Signaled);
    }

    #[test]
    fn should_consume_wake_request() {
        let monitor = WakeMonitor::new();
        monitor.wake();
        monitor.wait(NextWake::Idle);

        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(monitor.wait(NextWake::At(deadline)), WakeCause::Deadline);
    }

    #[test]
    fn should_release_idle_wait_when_woken_from_another_thread() {
        let monitor = Arc::new(WakeMonitor::new());
        let waker = Waker::new(Arc::clone(&monitor));

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            waker.wake();
        });

        assert_eq!(monitor.wait(NextWake::Idle), WakeCause::Signaled);
        handle.join().unwrap();
    }

    #[test]
    fn should_cut_timed_wait_short_on_quit() {
        let monitor = Arc::new(WakeMonitor::new());
        let waker = Waker::new(Arc::clone(&monitor));
        let deadline = Instant::now() + Duration::from_secs(30);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            waker.request_quit();
        });

        assert_eq!(monitor.wait(NextWake::At(deadline)), WakeCause::Signaled);
        assert!(Instant::now() < deadline);
        assert!(monitor.is_quit_requested());
        handle.join().unwrap();
    }

    #[test]
    fn should_set_quit_only_once() {
        let monitor = WakeMonitor::new();
        assert!(!monitor.is_quit_requested());
        assert!(monitor.request_quit());
        assert!(!monitor.request_quit());
        assert!(monitor.is_quit_requested());
    }

    #[test]
    fn should_keep_quit_after_wait_consumes_wake() {
        let monitor = WakeMonitor::new();
        monitor.request_quit();
        monitor.wait(NextWake::Idle);
        assert!(monitor.is_quit_requested());
    }

    #[test]
    fn should_expose_deadline_only_while_waiting() {
        let monitor = Arc::new(WakeMonitor::new());
        assert!(monitor.deadline().is_none());

        let deadline = Instant::now() + Duration::from_secs(30);
        let waiter = Arc::clone(&monitor);
        let handle = thread::spawn(move || waiter.wait(NextWake::At(deadline)));

        while monitor.deadline().is_none() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(monitor.deadline(), Some(deadline));

        monitor.wake();
        handle.join().unwrap();
        assert!(monitor.deadline().is_none());
    }
}
