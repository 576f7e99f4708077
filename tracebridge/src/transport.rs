//! The message queue interface the propagation helpers are written against.
//!
//! Any store-and-forward system that can send a payload to a named
//! destination and hand back received payloads fits [`Transport`]. Endpoints,
//! credentials and retry policies belong to the implementation and are given
//! to it when it is constructed.
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifier the transport assigned to an accepted message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a transport provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// A message handed back by [`Transport::receive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Transport assigned identifier.
    pub id: MessageId,
    /// The raw message body.
    pub payload: Bytes,
}

/// Errors reported by a transport. They are passed to the caller unchanged;
/// nothing in this workspace retries.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The named queue does not exist.
    #[error("queue `{0}` does not exist")]
    QueueNotFound(String),

    /// The request was rejected before reaching the queue.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure of the underlying client.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<String> for TransportError {
    fn from(err_msg: String) -> Self {
        TransportError::Other(err_msg.into())
    }
}

impl From<&'static str> for TransportError {
    fn from(err_msg: &'static str) -> Self {
        TransportError::Other(err_msg.into())
    }
}

/// Send and receive primitives of a message queue.
///
/// Order and timing of delivery are whatever the queue provides. A consumer
/// may see a message seconds, minutes, or never after it was sent.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Enqueue `payload` on `destination`.
    async fn send(&self, destination: &str, payload: Bytes) -> Result<MessageId, TransportError>;

    /// Wait up to `wait_time` for messages on `source` and return at most
    /// `max_messages` of them. An empty list means nothing arrived in time.
    async fn receive(
        &self,
        source: &str,
        max_messages: usize,
        wait_time: Duration,
    ) -> Result<Vec<ReceivedMessage>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, destination: &str, payload: Bytes) -> Result<MessageId, TransportError> {
        (**self).send(destination, payload).await
    }

    async fn receive(
        &self,
        source: &str,
        max_messages: usize,
        wait_time: Duration,
    ) -> Result<Vec<ReceivedMessage>, TransportError> {
        (**self).receive(source, max_messages, wait_time).await
    }
}
