//! In-process client handle.
//!
//! Requests travel to the loop thread over an unbounded channel; each one
//! carries a oneshot sender for its response. Sending wakes the loop so the
//! request is served on the next poll.

use std::sync::{Arc, OnceLock};

use tokio::sync::{broadcast, mpsc, oneshot};

use minioc_app::handlers::Response;
use minioc_app::monitor::Waker;
use minioc_app::notify::{Notification, NotificationBus};
use minioc_app::registry::ClientRequest;
use minioc_domain::representation::Representation;

use crate::error::LocalError;

/// A request waiting in the engine inbox.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) request: ClientRequest,
    pub(crate) reply: oneshot::Sender<Response>,
}

/// Cloneable handle for talking to a [`LocalEngine`](crate::LocalEngine)
/// from any thread.
#[derive(Debug, Clone)]
pub struct LocalClient {
    inbox: mpsc::UnboundedSender<Envelope>,
    waker: Arc<OnceLock<Waker>>,
    notifications: NotificationBus,
}

impl LocalClient {
    pub(crate) fn new(
        inbox: mpsc::UnboundedSender<Envelope>,
        waker: Arc<OnceLock<Waker>>,
        notifications: NotificationBus,
    ) -> Self {
        Self {
            inbox,
            waker,
            notifications,
        }
    }

    /// Queue `request` and wake the loop.
    ///
    /// A request sent before the engine is initialised is served on the
    /// first poll.
    ///
    /// # Errors
    ///
    /// Returns [`LocalError::EngineStopped`] once the engine has shut down.
    pub fn send(&self, request: ClientRequest) -> Result<PendingResponse, LocalError> {
        let (reply, receiver) = oneshot::channel();
        self.inbox
            .send(Envelope { request, reply })
            .map_err(|_| LocalError::EngineStopped)?;
        if let Some(waker) = self.waker.get() {
            waker.wake();
        }
        Ok(PendingResponse { receiver })
    }

    /// GET with the target's default interface.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn get(&self, path: &str) -> Result<PendingResponse, LocalError> {
        self.send(ClientRequest::get(path))
    }

    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn post(&self, path: &str, payload: Representation) -> Result<PendingResponse, LocalError> {
        self.send(ClientRequest::post(path, payload))
    }

    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn put(&self, path: &str, payload: Representation) -> Result<PendingResponse, LocalError> {
        self.send(ClientRequest::put(path, payload))
    }

    /// Subscribe to periodic observe notifications.
    #[must_use]
    pub fn observe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

/// Response to a request that has been queued but not necessarily served.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: oneshot::Receiver<Response>,
}

impl PendingResponse {
    /// Block the calling thread until the loop has served the request.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LocalError::EngineStopped`] when the engine shut down
    /// before serving the request.
    pub fn wait(self) -> Result<Response, LocalError> {
        self.receiver
            .blocking_recv()
            .map_err(|_| LocalError::EngineStopped)
    }
}
