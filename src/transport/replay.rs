//! Transport that plays back a recorded event script.
//!
//! Scripts are JSON Lines, one event object per line. Blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{EventStream, Transport};
use crate::error::{ConverseError, Result};
use crate::types::{ConversationRequest, StreamEvent};

/// Replays the same event script for every opened turn.
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    events: Vec<StreamEvent>,
    delay: Option<Duration>,
}

impl ReplayTransport {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events,
            delay: None,
        }
    }

    /// Parse a JSON Lines script.
    pub fn from_jsonl(raw: &str) -> Result<Self> {
        let events = raw
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .map(|(number, line)| {
                StreamEvent::from_json_line(line)
                    .map_err(|err| ConverseError::stream(format!("line {number}: {err}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(events))
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_jsonl(&std::fs::read_to_string(path)?)
    }

    /// Pause before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn open(
        &self,
        request: ConversationRequest,
        cancel: CancellationToken,
    ) -> Result<EventStream> {
        tracing::debug!(
            url = %request.backend.url,
            events = self.events.len(),
            "replaying event script"
        );
        let events = self.events.clone();
        let delay = self.delay;
        let stream = async_stream::stream! {
            for event in events {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok::<_, ConverseError>(event);
            }
        };
        Ok(stream.take_until(cancel.cancelled_owned()).boxed())
    }
}
