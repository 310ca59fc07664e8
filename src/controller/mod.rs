//! Public chat controller.
//!
//! Provides the surface a chat UI binds to:
//! - [`ChatController::send`]: start a turn from the input buffer
//! - [`ChatController::cancel`]: stop the active turn
//! - [`ChatController::reset`]: clear timeline and costs
//! - [`ChatController::view`] / [`ChatController::watch_view`]: render projection

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ControllerConfig;
use crate::session::store::ConversationStore;
use crate::session::{ConversationSession, SessionId, SessionPhase, SessionResult, SessionStatus};
use crate::timeline::TimelineView;
use crate::transport::Transport;
use crate::types::{CostTotals, Message};

struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
}

/// Stateful object behind one chat surface.
///
/// All methods take `&self`, so `cancel()` can be called from another task
/// while `send()` is awaiting the stream. At most one session is active.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use converse::prelude::*;
/// # async fn example(transport: Arc<dyn Transport>) {
/// let config = ControllerConfig::builder()
///     .backend(BackendTarget::new("https://chat.example.com/stream"))
///     .build();
/// let controller = ChatController::new(config, transport);
/// controller.set_input("Hello");
/// let result = controller.send().await;
/// println!("{:?} {:?}", result.map(|r| r.status), controller.view().items);
/// # }
/// ```
pub struct ChatController {
    config: ControllerConfig,
    transport: Arc<dyn Transport>,
    store: ConversationStore,
    active: Mutex<Option<ActiveSession>>,
    input: Mutex<String>,
    open: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatController {
    pub fn new(config: ControllerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            store: ConversationStore::new(),
            active: Mutex::new(None),
            input: Mutex::new(String::new()),
            open: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // -- Panel state --

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Flip the open flag and return the new value.
    pub fn toggle(&self) -> bool {
        !self.open.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn input(&self) -> String {
        lock(&self.input).clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *lock(&self.input) = text.into();
    }

    // -- Derived state --

    pub fn phase(&self) -> SessionPhase {
        self.store.phase()
    }

    pub fn is_streaming(&self) -> bool {
        self.phase().is_active()
    }

    pub fn costs(&self) -> CostTotals {
        self.store.read(|c| c.costs)
    }

    /// Clone of the raw timeline.
    pub fn messages(&self) -> Vec<Message> {
        self.store.read(|c| c.timeline.messages().to_vec())
    }

    pub fn view(&self) -> TimelineView {
        self.store.view()
    }

    /// Subscribe to the projection; it is republished after every mutation.
    pub fn watch_view(&self) -> watch::Receiver<TimelineView> {
        self.store.watch_view()
    }

    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.store.watch_phase()
    }

    // -- Operations --

    /// Send the input buffer as a new user turn and stream the reply.
    ///
    /// Returns `None` without touching any state when the input is blank, no
    /// backend is configured, or a session is already active. Otherwise
    /// clears the input buffer and returns once the session is terminal.
    pub async fn send(&self) -> Option<SessionResult> {
        let input = self.input().trim().to_string();
        if input.is_empty() {
            tracing::debug!("send ignored: empty input");
            return None;
        }
        if self.config.backend.is_none() {
            tracing::debug!("send ignored: no backend configured");
            return None;
        }
        let (id, cancel) = {
            let mut active = lock(&self.active);
            if active.is_some() {
                tracing::debug!("send ignored: session already active");
                return None;
            }
            let id = Uuid::new_v4();
            let cancel = CancellationToken::new();
            *active = Some(ActiveSession {
                id,
                cancel: cancel.clone(),
            });
            self.store.set_phase(SessionPhase::Sending);
            (id, cancel)
        };
        lock(&self.input).clear();

        let result = ConversationSession::new(id, cancel, &self.store, &self.config)
            .run(self.transport.as_ref(), input)
            .await;
        self.teardown(id, result.status);
        Some(result)
    }

    /// Cancel the active session.
    ///
    /// Stops every loading entry and removes the empty ones. Returns `false`
    /// (and changes nothing) when no session is active.
    pub fn cancel(&self) -> bool {
        let mut active = lock(&self.active);
        let Some(session) = active.take() else {
            return false;
        };
        session.cancel.cancel();
        let removed = self.store.mutate(|c| c.timeline.purge_empty_loading());
        self.store.set_phase(SessionPhase::Cancelled);
        tracing::info!(session_id = %session.id, removed, "conversation session cancelled");
        true
    }

    /// Clear the timeline and costs. A no-op returning `false` while a
    /// session is active.
    pub fn reset(&self) -> bool {
        let active = lock(&self.active);
        if active.is_some() {
            tracing::debug!("reset ignored: session active");
            return false;
        }
        self.store.mutate(|c| {
            c.timeline.clear();
            c.costs.reset();
        });
        self.store.set_phase(SessionPhase::Idle);
        true
    }

    fn teardown(&self, id: SessionId, status: SessionStatus) {
        let mut active = lock(&self.active);
        if active.as_ref().is_some_and(|session| session.id == id) {
            *active = None;
            self.store.set_phase(status.into());
        }
    }
}

impl fmt::Debug for ChatController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatController")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("open", &self.is_open())
            .field("messages", &self.store.read(|c| c.timeline.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConverseError, Result};
    use crate::transport::EventStream;
    use crate::types::{BackendTarget, ConversationRequest};
    use async_trait::async_trait;

    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        async fn open(
            &self,
            _request: ConversationRequest,
            _cancel: CancellationToken,
        ) -> Result<EventStream> {
            Err(ConverseError::transport("connection refused"))
        }
    }

    fn controller(backend: Option<BackendTarget>) -> ChatController {
        let config = ControllerConfig::builder().maybe_backend(backend).build();
        ChatController::new(config, Arc::new(UnreachableTransport))
    }

    fn backend() -> Option<BackendTarget> {
        Some(BackendTarget::new("http://localhost:1"))
    }

    #[test]
    fn new_controller_is_idle_and_closed() {
        let controller = controller(backend());
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(!controller.is_streaming());
        assert!(!controller.is_open());
        assert!(controller.messages().is_empty());
        assert!(controller.costs().is_zero());
    }

    #[test]
    fn toggle_flips_open_flag() {
        let controller = controller(backend());
        assert!(controller.toggle());
        assert!(controller.is_open());
        assert!(!controller.toggle());
        controller.open();
        controller.close();
        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let controller = controller(backend());
        controller.set_input("   ");
        assert!(controller.send().await.is_none());
        assert!(controller.messages().is_empty());
        assert_eq!(controller.input(), "   ");
    }

    #[tokio::test]
    async fn missing_backend_is_ignored() {
        let controller = controller(None);
        controller.set_input("hello");
        assert!(controller.send().await.is_none());
        assert!(controller.messages().is_empty());
        assert_eq!(controller.input(), "hello");
    }

    #[tokio::test]
    async fn send_while_active_is_ignored() {
        let controller = controller(backend());
        *lock(&controller.active) = Some(ActiveSession {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        });
        controller.set_input("hello");
        assert!(controller.send().await.is_none());
        assert!(controller.messages().is_empty());
    }

    #[tokio::test]
    async fn transport_open_failure_ends_failed_and_allows_retry() {
        let controller = controller(backend());
        controller.set_input("hello");
        let result = controller.send().await.expect("session ran");
        assert_eq!(result.status, SessionStatus::Failed);
        assert!(result.error.as_deref().unwrap_or_default().contains("connection refused"));
        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert_eq!(controller.input(), "");

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Error: Transport error: connection refused");
        assert!(!messages[1].loading);

        controller.set_input("again");
        assert!(controller.send().await.is_some());
        assert_eq!(controller.messages().len(), 4);
    }

    #[test]
    fn cancel_without_session_is_noop() {
        let controller = controller(backend());
        assert!(!controller.cancel());
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }

    #[test]
    fn reset_refuses_while_active() {
        let controller = controller(backend());
        *lock(&controller.active) = Some(ActiveSession {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        });
        assert!(!controller.reset());
    }
}
