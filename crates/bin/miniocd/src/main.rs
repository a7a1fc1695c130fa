//! # miniocd — minioc daemon
//!
//! Composition root that wires the light server into the local engine and
//! runs the event loop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Construct the engine and the application
//! - Bridge SIGINT/SIGTERM to the loop's quit flag, before engine init
//! - Map the outcome to the process exit status
//!
//! ## Exit status
//! - `0` after a clean, signal-driven shutdown
//! - `1` when the configuration is invalid or the signal handlers cannot be
//!   installed
//! - the negative engine status when initialisation fails
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod signal;

use std::error::Error;
use std::sync::Arc;

use minioc_adapter_local::LocalEngine;
use minioc_app::event_loop::EventLoop;
use minioc_app::monitor::{WakeMonitor, Waker};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("miniocd: {}", error_chain(&err));
            return 1;
        }
    };

    init_tracing(&config.logging.filter);

    let monitor = Arc::new(WakeMonitor::new());
    if let Err(err) = signal::spawn_bridge(Waker::new(Arc::clone(&monitor))) {
        tracing::error!(error = %err, "cannot install signal bridge");
        return 1;
    }

    let engine = LocalEngine::new(config.engine_config());
    let app = config.light_server();
    let event_loop = match EventLoop::start_with(monitor, engine, &app) {
        Ok(event_loop) => event_loop,
        Err(err) => {
            tracing::error!(error = %error_chain(&err), status = err.status(), "engine initialisation failed");
            return err.status();
        }
    };

    tracing::info!(device = %config.device.name, "miniocd running");
    let report = event_loop.run();
    tracing::info!(
        polls = report.polls,
        deadline_wakes = report.deadline_wakes,
        signaled_wakes = report.signaled_wakes,
        "miniocd stopped"
    );
    0
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("miniocd: invalid log filter {filter:?}: {err}");
        EnvFilter::new("info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
