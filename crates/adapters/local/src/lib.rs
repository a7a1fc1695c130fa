//! # minioc-adapter-local
//!
//! In-process engine — serves an [`Application`]'s resources to clients
//! living in the same process.
//!
//! ## How it works
//!
//! ```text
//! LocalClient ──(mpsc inbox)──▶ LocalEngine::poll ──▶ Registry::dispatch
//!      ▲                              │
//!      └──────(oneshot reply)─────────┘
//! ```
//!
//! Every send wakes the event loop through the [`Waker`] handed to
//! [`Engine::init`]. Each poll drains the inbox, runs due periodic observes
//! and reports the next observe deadline.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `minioc-app` and `minioc-domain`.

mod client;
mod config;
mod error;
mod observe;

pub use client::{LocalClient, PendingResponse};
pub use config::EngineConfig;
pub use error::LocalError;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tokio::sync::mpsc;

use minioc_app::monitor::Waker;
use minioc_app::notify::{Notification, NotificationBus};
use minioc_app::platform::Platform;
use minioc_app::ports::{Application, Engine, EngineError, NextWake};
use minioc_app::registry::{ClientRequest, Registry};
use minioc_domain::error::MiniocError;

use crate::client::Envelope;
use crate::observe::ObserveScheduler;

/// [`Engine`] serving requests from [`LocalClient`]s on the loop thread.
#[derive(Debug)]
pub struct LocalEngine {
    config: EngineConfig,
    platform: Platform,
    registry: Registry,
    scheduler: ObserveScheduler,
    inbox: mpsc::UnboundedReceiver<Envelope>,
    sender: mpsc::UnboundedSender<Envelope>,
    waker: Arc<OnceLock<Waker>>,
    notifications: NotificationBus,
}

impl LocalEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        Self {
            platform: Platform::new(),
            registry: Registry::new(config.baseline_get),
            scheduler: ObserveScheduler::default(),
            inbox,
            sender,
            waker: Arc::new(OnceLock::new()),
            notifications: NotificationBus::new(config.notification_capacity),
            config,
        }
    }

    /// A new client handle; usable before and after [`Engine::init`].
    #[must_use]
    pub fn client(&self) -> LocalClient {
        LocalClient::new(
            self.sender.clone(),
            Arc::clone(&self.waker),
            self.notifications.clone(),
        )
    }

    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn prepare_storage(&self) -> Result<(), LocalError> {
        let path = &self.config.storage_dir;
        std::fs::create_dir_all(path).map_err(|source| LocalError::StorageDir {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "credential storage ready");
        Ok(())
    }

    fn serve_inbox(&mut self) -> usize {
        let mut served = 0;
        while let Ok(Envelope { request, reply }) = self.inbox.try_recv() {
            let response = self.registry.dispatch(&request);
            if reply.send(response).is_err() {
                tracing::debug!(path = %request.path, "client went away before its response");
            }
            served += 1;
        }
        served
    }

    fn notify_observers(&mut self, now: Instant) {
        for path in self.scheduler.take_due(now) {
            if !self.notifications.has_subscribers() {
                continue;
            }
            let response = self.registry.dispatch(&ClientRequest::get(path.as_str()));
            if !response.status.is_success() {
                tracing::warn!(%path, status = %response.status, "observe read failed");
                continue;
            }
            self.notifications.publish(Notification {
                path,
                payload: response.payload,
            });
        }
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine for LocalEngine {
    fn init<A: Application>(&mut self, app: &A, waker: Waker) -> Result<(), EngineError> {
        if self.waker.get().is_some() {
            return Err(MiniocError::from(LocalError::AlreadyInitialised).into());
        }

        let mut platform = Platform::new();
        app.init(&mut platform)?;

        let mut registry = Registry::new(self.config.baseline_get);
        platform.register_core_resources(&mut registry)?;
        app.register_resources(&mut registry)?;

        if self.config.security {
            self.prepare_storage().map_err(MiniocError::from)?;
        }

        self.scheduler = ObserveScheduler::new(registry.observable(), Instant::now());
        tracing::info!(
            resources = registry.len(),
            observed = self.scheduler.len(),
            security = self.config.security,
            "local engine initialised"
        );
        self.platform = platform;
        self.registry = registry;

        if self.waker.set(waker).is_err() {
            return Err(MiniocError::from(LocalError::AlreadyInitialised).into());
        }
        Ok(())
    }

    fn poll(&mut self) -> NextWake {
        let served = self.serve_inbox();
        if served > 0 {
            tracing::trace!(served, "served queued requests");
        }
        self.notify_observers(Instant::now());
        self.scheduler.next_wake()
    }

    fn shutdown(&mut self) {
        self.inbox.close();
        let dropped = std::iter::from_fn(|| self.inbox.try_recv().ok()).count();
        tracing::info!(dropped, "local engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use minioc_app::event_loop::EventLoop;
    use minioc_app::handlers::BaselineGet;
    use minioc_app::light_server::{COLLECTION_PATH, COUNTER_PATH, LIGHT_PATH, LightServer};
    use minioc_app::monitor::WakeMonitor;
    use minioc_domain::device::{DEVICE_URI, PLATFORM_URI};
    use minioc_domain::message::Status;
    use minioc_domain::representation::Representation;
    use serde_json::json;

    use super::*;

    fn waker() -> Waker {
        Waker::new(Arc::new(WakeMonitor::new()))
    }

    fn state(value: bool) -> Representation {
        [("state", value)].into_iter().collect()
    }

    #[test]
    fn should_register_core_resources_before_application_resources() {
        let mut engine = LocalEngine::default();
        engine.init(&LightServer::default(), waker()).unwrap();

        let paths: Vec<&str> = engine.registry().resources().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![PLATFORM_URI, DEVICE_URI, LIGHT_PATH, COUNTER_PATH, COLLECTION_PATH]
        );
        assert!(engine.platform().device().is_some());
    }

    #[test]
    fn should_serve_requests_queued_before_poll() {
        let mut engine = LocalEngine::default();
        let client = engine.client();
        let early = client.get(LIGHT_PATH).unwrap();

        engine.init(&LightServer::default(), waker()).unwrap();
        let post = client.post(LIGHT_PATH, state(true)).unwrap();
        engine.poll();

        assert_eq!(early.wait().unwrap().payload.get_bool("state"), Some(false));
        let post = post.wait().unwrap();
        assert_eq!(post.status, Status::Changed);
        assert_eq!(post.payload.get_bool("state"), Some(true));
    }

    #[test]
    fn should_be_idle_without_observable_resources() {
        let mut engine = LocalEngine::default();
        engine
            .init(&LightServer::default().observe_interval(0), waker())
            .unwrap();
        assert_eq!(engine.poll(), NextWake::Idle);
    }

    #[test]
    fn should_schedule_next_observe() {
        let mut engine = LocalEngine::default();
        engine.init(&LightServer::default(), waker()).unwrap();
        assert!(matches!(engine.poll(), NextWake::At(_)));
    }

    #[test]
    fn should_reject_second_init() {
        let mut engine = LocalEngine::default();
        engine.init(&LightServer::default(), waker()).unwrap();

        let result = engine.init(&LightServer::default(), waker());
        assert!(matches!(
            result,
            Err(EngineError::Application(MiniocError::Engine(_)))
        ));
    }

    #[test]
    fn should_fail_init_when_storage_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("creds");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut engine = LocalEngine::new(EngineConfig {
            security: true,
            storage_dir: blocker.join("inner"),
            ..EngineConfig::default()
        });
        let result = engine.init(&LightServer::default().secure(true), waker());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), -1);
    }

    #[test]
    fn should_create_storage_dir_when_secure() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("creds");

        let mut engine = LocalEngine::new(EngineConfig {
            security: true,
            storage_dir: storage.clone(),
            ..EngineConfig::default()
        });
        engine
            .init(&LightServer::default().secure(true), waker())
            .unwrap();
        assert!(storage.is_dir());
    }

    #[test]
    fn should_fail_pending_requests_on_shutdown() {
        let mut engine = LocalEngine::default();
        let client = engine.client();
        engine.init(&LightServer::default(), waker()).unwrap();

        let pending = client.get(LIGHT_PATH).unwrap();
        engine.shutdown();

        assert!(matches!(pending.wait(), Err(LocalError::EngineStopped)));
        assert!(matches!(
            client.get(LIGHT_PATH),
            Err(LocalError::EngineStopped)
        ));
    }

    #[test]
    fn should_apply_exclusive_baseline_mode() {
        let mut engine = LocalEngine::new(EngineConfig {
            baseline_get: BaselineGet::Exclusive,
            ..EngineConfig::default()
        });
        let client = engine.client();
        engine.init(&LightServer::default(), waker()).unwrap();

        let pending = client
            .send(
                ClientRequest::get(COUNTER_PATH)
                    .interface(minioc_domain::interface::Interface::Baseline),
            )
            .unwrap();
        engine.poll();

        let payload = pending.wait().unwrap().payload;
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"rt": ["oic.r.counter"], "if": ["oic.if.baseline", "oic.if.r"]})
        );
    }

    #[test]
    fn should_serve_clients_from_other_threads_while_looping() {
        let engine = LocalEngine::default();
        let client = engine.client();
        let event_loop = EventLoop::start(engine, &LightServer::default()).unwrap();
        let quit = event_loop.waker();
        let handle = thread::spawn(move || event_loop.run());

        let response = client.put(LIGHT_PATH, state(true)).unwrap().wait().unwrap();
        assert_eq!(response.status, Status::Changed);
        let response = client.get(LIGHT_PATH).unwrap().wait().unwrap();
        assert_eq!(response.payload.get_bool("state"), Some(true));

        quit.request_quit();
        let report = handle.join().unwrap();
        assert!(report.polls >= 2);
    }

    #[test]
    fn should_publish_periodic_notifications_to_observers() {
        let engine = LocalEngine::default();
        let client = engine.client();
        let mut notifications = client.observe();
        let event_loop = EventLoop::start(engine, &LightServer::default()).unwrap();
        let quit = event_loop.waker();
        let handle = thread::spawn(move || event_loop.run());

        let first = notifications.blocking_recv().unwrap();
        let second = notifications.blocking_recv().unwrap();
        assert_eq!(first.path, LIGHT_PATH);
        assert_eq!(first.payload.get_bool("state"), Some(false));
        assert_eq!(second.path, COUNTER_PATH);
        assert_eq!(second.payload.get_int("count"), Some(0));

        quit.request_quit();
        handle.join().unwrap();
    }

    #[test]
    fn should_stop_waiting_client_when_loop_exits() {
        let engine = LocalEngine::default();
        let client = engine.client();
        let event_loop = EventLoop::start(engine, &LightServer::default()).unwrap();
        event_loop.waker().request_quit();
        event_loop.run();

        assert!(matches!(client.get(LIGHT_PATH), Err(LocalError::EngineStopped)));
    }
}
