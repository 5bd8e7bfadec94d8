//! Progress events streamed to the caller during a research run.
//!
//! Many concurrent branches produce events; one consumer drains them. The
//! reporter is a thin handle over an unbounded `tokio::sync::mpsc` sender,
//! so emitting never blocks and never tears an event. Events from one branch
//! arrive in the order that branch emitted them; across branches they may
//! interleave.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use crate::research::Source;

/// A single progress update.
///
/// Wire form: `{"status":{"title":..,"description":..}}` or
/// `{"source":{"title":..,"url":..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressEvent {
    Status {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },

    #[serde(rename = "source")]
    SourceFound { title: String, url: String },
}

impl ProgressEvent {
    pub fn status(title: impl Into<String>) -> Self {
        Self::Status {
            title: title.into(),
            description: None,
        }
    }

    pub fn source(source: &Source) -> Self {
        Self::SourceFound {
            title: source.title.clone(),
            url: source.url.clone(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Status { title, .. } | Self::SourceFound { title, .. } => title,
        }
    }
}

/// Push-only sink for [`ProgressEvent`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Create a reporter and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    /// A reporter that drops every event.
    pub fn noop() -> Self {
        Self { sender: None }
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.sender {
            // A dropped receiver means nobody is listening anymore; that's fine.
            if sender.send(event).is_err() {
                tracing::trace!("Progress receiver dropped, discarding event");
            }
        }
    }

    pub fn status(&self, title: impl Into<String>) {
        self.emit(ProgressEvent::status(title));
    }

    pub fn source(&self, source: &Source) {
        self.emit(ProgressEvent::source(source));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}
