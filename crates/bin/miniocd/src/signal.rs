//! SIGINT/SIGTERM bridge.
//!
//! The signal handlers are installed on the calling thread, so they are in
//! place as soon as [`spawn_bridge`] returns. A dedicated thread then drives
//! a current-thread tokio runtime until the first termination signal and asks
//! the event loop to quit through its [`Waker`]. The loop thread itself never
//! runs async code.

use std::io;
use std::thread::{self, JoinHandle};

use minioc_app::monitor::Waker;
use tokio::runtime::Runtime;

/// Install the signal handlers and spawn the bridge thread.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built, a handler cannot be
/// installed, or the thread cannot be spawned.
pub fn spawn_bridge(waker: Waker) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let signals = {
        let _guard = runtime.enter();
        Signals::install()?
    };

    thread::Builder::new()
        .name("signal-bridge".to_string())
        .spawn(move || bridge(&runtime, signals, &waker))
}

fn bridge(runtime: &Runtime, signals: Signals, waker: &Waker) {
    let signal = runtime.block_on(signals.recv());
    tracing::info!(signal, "shutdown requested");
    waker.request_quit();
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "ctrl-c"
    }
}
