//! Outbound event and chat fan-out plus the headline ring buffer.
//!
//! The simulation never talks to a transport directly. It calls the
//! [`EventSink`] it was handed, and [`Broadcaster`] is the production sink:
//! every event and chat line is pushed onto a `tokio::sync::broadcast`
//! channel, fire-and-forget. A send with no subscribers is not an error.
//!
//! If a subscriber falls behind by more than the channel capacity it will
//! receive a `RecvError::Lagged` and skip to the newest message.

use std::collections::VecDeque;

use tokio::sync::broadcast;
use townsfolk_types::{AgentId, ChatLine, Outbound, SimEvent};

use crate::config::BroadcastConfig;

/// Errors from the broadcaster.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BroadcastError {
    /// The broadcaster has been closed.
    #[error("broadcaster is closed")]
    Closed,
}

/// Where the simulation sends everything it wants the outside world to see.
pub trait EventSink {
    /// Emit a structured event.
    fn emit_event(&mut self, event: SimEvent);

    /// Emit a line of chat attributed to an agent.
    fn emit_chat(&mut self, agent_id: AgentId, agent_name: &str, text: &str);

    /// Append a narrative headline.
    fn headline(&mut self, text: String);

    /// Headlines still held, oldest first.
    fn recent_headlines(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Production sink backed by a tokio broadcast channel.
#[derive(Debug)]
pub struct Broadcaster {
    tx: Option<broadcast::Sender<Outbound>>,
    headlines: VecDeque<String>,
    headline_capacity: usize,
    sent: u64,
}

impl Broadcaster {
    /// Create an open broadcaster.
    pub fn new(config: &BroadcastConfig) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            tx: Some(tx),
            headlines: VecDeque::with_capacity(config.headline_capacity),
            headline_capacity: config.headline_capacity.max(1),
            sent: 0,
        }
    }

    /// Subscribe to the outbound stream.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::Closed`] after [`close`](Self::close).
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Outbound>, BroadcastError> {
        self.tx
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(BroadcastError::Closed)
    }

    /// Drop the sender; subscribers see the stream end once drained.
    pub fn close(&mut self) {
        if self.tx.take().is_some() {
            tracing::info!(sent = self.sent, "broadcaster closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub const fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    /// Headlines, oldest first.
    pub fn headlines(&self) -> Vec<String> {
        self.headlines.iter().cloned().collect()
    }

    /// Messages handed to the channel since creation.
    pub const fn sent(&self) -> u64 {
        self.sent
    }

    fn send(&mut self, message: Outbound) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        // No subscribers is fine: delivery is fire-and-forget.
        let _ = tx.send(message);
        self.sent = self.sent.saturating_add(1);
    }
}

impl EventSink for Broadcaster {
    fn emit_event(&mut self, event: SimEvent) {
        tracing::debug!(event = ?event, "emit event");
        self.send(Outbound::Event(event));
    }

    fn emit_chat(&mut self, agent_id: AgentId, agent_name: &str, text: &str) {
        self.send(Outbound::Chat(ChatLine {
            agent_id,
            agent_name: agent_name.to_owned(),
            text: text.to_owned(),
        }));
    }

    fn headline(&mut self, text: String) {
        tracing::info!(headline = %text, "headline");
        if self.headlines.len() >= self.headline_capacity {
            self.headlines.pop_front();
        }
        self.headlines.push_back(text);
    }

    fn recent_headlines(&self) -> Vec<String> {
        self.headlines()
    }
}

/// Sink that records everything in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSink {
    /// Events in emission order.
    pub events: Vec<SimEvent>,
    /// Chat lines in emission order.
    pub chats: Vec<ChatLine>,
    /// Headlines in emission order.
    pub headlines: Vec<String>,
}

impl RecordingSink {
    /// Forward everything recorded to `sink`: events, then chat lines, then
    /// headlines, each in emission order.
    pub fn forward_to(self, sink: &mut dyn EventSink) {
        for event in self.events {
            sink.emit_event(event);
        }
        for chat in self.chats {
            sink.emit_chat(chat.agent_id, &chat.agent_name, &chat.text);
        }
        for text in self.headlines {
            sink.headline(text);
        }
    }
}

impl EventSink for RecordingSink {
    fn emit_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    fn emit_chat(&mut self, agent_id: AgentId, agent_name: &str, text: &str) {
        self.chats.push(ChatLine {
            agent_id,
            agent_name: agent_name.to_owned(),
            text: text.to_owned(),
        });
    }

    fn headline(&mut self, text: String) {
        self.headlines.push(text);
    }

    fn recent_headlines(&self) -> Vec<String> {
        self.headlines.clone()
    }
}
