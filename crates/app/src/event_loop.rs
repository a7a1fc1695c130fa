//! Event loop — alternates engine polls with monitor waits until quit.
//!
//! ```text
//! while !quit {
//!     next = engine.poll()      // run due work, learn the next deadline
//!     monitor.wait(next)        // sleep until the deadline or a wake
//! }
//! engine.shutdown()
//! ```
//!
//! Every wake, spurious or not, simply re-enters the poll phase. The quit
//! flag is checked once per iteration, so after a quit request the engine is
//! polled at most once more.

use std::sync::Arc;

use crate::monitor::{WakeCause, WakeMonitor, Waker};
use crate::ports::{Application, Engine, EngineError};

/// Counters collected while the loop ran.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    pub polls: u64,
    pub deadline_wakes: u64,
    pub signaled_wakes: u64,
}

/// An initialised engine bound to its wake monitor.
pub struct EventLoop<E> {
    engine: E,
    monitor: Arc<WakeMonitor>,
}

impl<E: Engine> EventLoop<E> {
    /// Initialise `engine` with `app` and return a loop ready to run.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged. The engine is not
    /// shut down in that case.
    pub fn start<A: Application>(engine: E, app: &A) -> Result<Self, EngineError> {
        Self::start_with(Arc::new(WakeMonitor::new()), engine, app)
    }

    /// Like [`start`](Self::start), on a monitor whose wakers were handed out
    /// before initialisation.
    ///
    /// A quit requested while the engine initialises is kept: the returned
    /// loop shuts the engine down without polling it.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn start_with<A: Application>(
        monitor: Arc<WakeMonitor>,
        mut engine: E,
        app: &A,
    ) -> Result<Self, EngineError> {
        engine.init(app, Waker::new(Arc::clone(&monitor)))?;
        tracing::info!("engine initialised");
        Ok(Self { engine, monitor })
    }

    /// Handle for waking or stopping the loop from elsewhere.
    #[must_use]
    pub fn waker(&self) -> Waker {
        Waker::new(Arc::clone(&self.monitor))
    }

    /// Run until quit is requested, then shut the engine down.
    pub fn run(mut self) -> LoopReport {
        let mut report = LoopReport::default();

        while !self.monitor.is_quit_requested() {
            let next = self.engine.poll();
            report.polls += 1;

            let cause = self.monitor.wait(next);
            tracing::trace!(?cause, ?next, "event loop woke");
            match cause {
                WakeCause::Deadline => report.deadline_wakes += 1,
                WakeCause::Signaled => report.signaled_wakes += 1,
            }
        }

        tracing::info!(polls = report.polls, "event loop stopped, shutting down engine");
        self.engine.shutdown();
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    use minioc_domain::error::MiniocError;

    use super::*;
    use crate::platform::Platform;
    use crate::ports::NextWake;
    use crate::registry::Registry;

    struct NoopApp;

    impl Application for NoopApp {
        fn init(&self, _platform: &mut Platform) -> Result<(), MiniocError> {
            Ok(())
        }

        fn register_resources(&self, _registry: &mut Registry) -> Result<(), MiniocError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counters {
        inits: AtomicUsize,
        polls: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    /// Engine that requests quit from inside its `quit_on`-th poll.
    struct ScriptedEngine {
        counters: Arc<Counters>,
        next: NextWake,
        quit_on: Option<usize>,
        fail_with: Option<i32>,
        waker: Option<Waker>,
    }

    impl ScriptedEngine {
        fn new(counters: Arc<Counters>, next: NextWake) -> Self {
            Self {
                counters,
                next,
                quit_on: None,
                fail_with: None,
                waker: None,
            }
        }
    }

    impl Engine for ScriptedEngine {
        fn init<A: Application>(&mut self, _app: &A, waker: Waker) -> Result<(), EngineError> {
            self.counters.inits.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.fail_with {
                return Err(EngineError::Status(status));
            }
            self.waker = Some(waker);
            Ok(())
        }

        fn poll(&mut self) -> NextWake {
            let polls = self.counters.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.quit_on == Some(polls) {
                if let Some(waker) = &self.waker {
                    waker.request_quit();
                }
            }
            self.next
        }

        fn shutdown(&mut self) {
            self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn should_propagate_init_status_without_shutdown() {
        let counters = Arc::new(Counters::default());
        let mut engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::Idle);
        engine.fail_with = Some(-3);

        let result = EventLoop::start(engine, &NoopApp);

        assert!(matches!(result, Err(EngineError::Status(-3))));
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_stop_after_at_most_one_more_poll_once_quit_is_requested() {
        let counters = Arc::new(Counters::default());
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::At(deadline));
        engine.quit_on = Some(1);

        let event_loop = EventLoop::start(engine, &NoopApp).unwrap();
        let report = event_loop.run();

        assert_eq!(report.polls, 1);
        assert_eq!(counters.polls.load(Ordering::SeqCst), 1);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_not_poll_when_quit_requested_before_run() {
        let counters = Arc::new(Counters::default());
        let engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::Idle);

        let event_loop = EventLoop::start(engine, &NoopApp).unwrap();
        event_loop.waker().request_quit();
        let report = event_loop.run();

        assert_eq!(report.polls, 0);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_keep_quit_requested_before_init() {
        let counters = Arc::new(Counters::default());
        let engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::Idle);
        let monitor = Arc::new(WakeMonitor::new());
        assert!(Waker::new(Arc::clone(&monitor)).request_quit());

        let report = EventLoop::start_with(monitor, engine, &NoopApp)
            .unwrap()
            .run();

        assert_eq!(report.polls, 0);
        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_repoll_on_each_deadline() {
        let counters = Arc::new(Counters::default());
        let mut engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::At(Instant::now()));
        engine.quit_on = Some(5);

        let report = EventLoop::start(engine, &NoopApp).unwrap().run();

        assert_eq!(report.polls, 5);
        assert_eq!(report.deadline_wakes, 4);
        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_stop_idle_loop_when_quit_from_another_thread() {
        let counters = Arc::new(Counters::default());
        let engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::Idle);

        let event_loop = EventLoop::start(engine, &NoopApp).unwrap();
        let waker = event_loop.waker();
        let handle = thread::spawn(move || event_loop.run());

        while counters.polls.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(waker.request_quit());

        let report = handle.join().unwrap();
        assert_eq!(report.polls, 1);
        assert_eq!(report.signaled_wakes, 1);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_poll_again_after_plain_wake() {
        let counters = Arc::new(Counters::default());
        let engine = ScriptedEngine::new(Arc::clone(&counters), NextWake::Idle);

        let event_loop = EventLoop::start(engine, &NoopApp).unwrap();
        let waker = event_loop.waker();
        let handle = thread::spawn(move || event_loop.run());

        while counters.polls.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        waker.wake();
        while counters.polls.load(Ordering::SeqCst) < 2 {
            thread::sleep(Duration::from_millis(1));
        }
        waker.request_quit();

        let report = handle.join().unwrap();
        assert_eq!(report.polls, 2);
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }
}
