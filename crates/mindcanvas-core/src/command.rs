//! Host-to-canvas command channel.
//!
//! Sibling views (the report and the test-case table) ask the canvas to export or to focus
//! itself by dispatching a [`Command`]. Each subscriber gets its own unbounded queue, so no
//! command is observed by a component that did not subscribe.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Xmind,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Xmind => "xmind",
        }
    }

    /// Name used in user-facing notices.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Xmind => "XMind",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format: {0}")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "xmind" => Ok(ExportFormat::Xmind),
            _ => Err(UnknownExportFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "format", rename_all = "kebab-case")]
pub enum Command {
    /// Handled by the test-case table; the canvas ignores it.
    ExportTestCases,
    ExportMindMap(ExportFormat),
    /// Select the root and switch to the select tool.
    EditMindMap,
}

#[derive(Debug, Default)]
pub struct CommandBus {
    subscribers: Vec<UnboundedSender<Command>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> CommandReceiver {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        CommandReceiver { rx }
    }

    /// Delivers `command` to every live subscriber and returns how many received it.
    pub fn dispatch(&mut self, command: Command) -> usize {
        self.subscribers
            .retain(|tx| tx.unbounded_send(command).is_ok());
        tracing::debug!(?command, receivers = self.subscribers.len(), "dispatched command");
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[derive(Debug)]
pub struct CommandReceiver {
    rx: UnboundedReceiver<Command>,
}

impl CommandReceiver {
    /// Next queued command, without waiting.
    pub fn try_recv(&mut self) -> Option<Command> {
        self.rx.next().now_or_never().flatten()
    }

    pub fn drain(&mut self) -> Vec<Command> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Stream for CommandReceiver {
    type Item = Command;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}
