//! Shared test helpers and scripted transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use converse::config::ControllerConfig;
use converse::controller::ChatController;
use converse::error::{ConverseError, Result};
use converse::session::SessionPhase;
use converse::transport::{EventStream, Transport};
use converse::types::*;

/// One step of a scripted turn.
#[derive(Debug, Clone)]
pub enum Step {
    Event(StreamEvent),
    /// Park the stream until the gate is notified.
    Wait(Arc<Notify>),
    /// Yield a transport error.
    Fail(String),
}

impl From<StreamEvent> for Step {
    fn from(event: StreamEvent) -> Self {
        Self::Event(event)
    }
}

/// A transport that plays queued scripts, one per opened turn.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Vec<Step>>>,
    requests: Mutex<Vec<ConversationRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a script made only of events.
    pub fn queue_events(&self, events: Vec<StreamEvent>) {
        self.queue(events.into_iter().map(Step::from).collect());
    }

    pub fn queue(&self, steps: Vec<Step>) {
        self.scripts.lock().unwrap().push_back(steps);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(
        &self,
        request: ConversationRequest,
        _cancel: CancellationToken,
    ) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request);
        let steps = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        let stream = async_stream::stream! {
            for step in steps {
                match step {
                    Step::Event(event) => yield Ok(event),
                    Step::Wait(gate) => gate.notified().await,
                    Step::Fail(message) => yield Err(ConverseError::transport(message)),
                }
            }
        };
        Ok(stream.boxed())
    }
}

pub fn backend() -> BackendTarget {
    BackendTarget::new("https://chat.example.com/stream")
}

pub fn config() -> ControllerConfig {
    ControllerConfig::builder().backend(backend()).build()
}

pub fn controller(transport: &Arc<ScriptedTransport>) -> ChatController {
    ChatController::new(config(), transport.clone())
}

pub fn controller_with(config: ControllerConfig, transport: &Arc<ScriptedTransport>) -> ChatController {
    ChatController::new(config, transport.clone())
}

/// Wait until the controller reaches `phase`.
pub async fn wait_for_phase(controller: &ChatController, phase: SessionPhase) {
    let mut rx = controller.watch_phase();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|p| *p == phase))
        .await
        .expect("phase reached in time")
        .expect("phase channel open");
}

/// Wait until some timeline entry has exactly `content`.
pub async fn wait_for_content(controller: &ChatController, content: &str) {
    let mut rx = controller.watch_view();
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|view| view.items.iter().any(|item| item.content == content)),
    )
    .await
    .expect("content appeared in time")
    .expect("view channel open");
}

/// `(role, content)` pairs of the raw timeline.
pub fn transcript(controller: &ChatController) -> Vec<(Role, String)> {
    controller
        .messages()
        .into_iter()
        .map(|m| (m.role, m.content))
        .collect()
}
