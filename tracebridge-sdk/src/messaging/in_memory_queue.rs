use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracebridge::transport::{MessageId, ReceivedMessage, Transport, TransportError};

/// Named FIFO queues living in the current process.
///
/// Queues must be created before use; sending to or receiving from an unknown
/// name fails with [`TransportError::QueueNotFound`]. `receive` long-polls:
/// it returns as soon as at least one message is available and an empty list
/// once `wait_time` has passed without one. A `wait_time` too large to form
/// a deadline, such as [`Duration::MAX`], waits until a message arrives.
///
/// Clones share the same queues.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use tracebridge::Transport;
/// use tracebridge_sdk::messaging::InMemoryQueue;
///
/// let queue = InMemoryQueue::new().with_queue("orders");
/// let id = queue.send("orders", "hello".into()).await.unwrap();
///
/// let received = queue.receive("orders", 1, Duration::from_secs(1)).await.unwrap();
/// assert_eq!(received[0].id, id);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryQueue {
    queues: Arc<Mutex<HashMap<String, QueueState>>>,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<ReceivedMessage>,
    notify: Arc<Notify>,
}

impl QueueState {
    fn take(&mut self, max_messages: usize) -> Vec<ReceivedMessage> {
        let count = max_messages.min(self.messages.len());
        self.messages.drain(..count).collect()
    }
}

impl InMemoryQueue {
    /// Upper bound accepted for `max_messages` in a single receive.
    pub const MAX_MESSAGES_PER_RECEIVE: usize = 10;

    /// An empty set of queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [`create_queue`](InMemoryQueue::create_queue).
    pub fn with_queue(self, name: impl Into<String>) -> Self {
        self.create_queue(name);
        self
    }

    /// Creates the named queue. Creating an existing queue keeps its messages.
    pub fn create_queue(&self, name: impl Into<String>) {
        if let Ok(mut queues) = self.queues.lock() {
            queues.entry(name.into()).or_default();
        }
    }

    /// Number of messages waiting on `name`, `None` for an unknown queue.
    pub fn len(&self, name: &str) -> Option<usize> {
        self.queues
            .lock()
            .ok()
            .and_then(|queues| queues.get(name).map(|state| state.messages.len()))
    }

    fn with_state<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut QueueState) -> R,
    ) -> Result<R, TransportError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| TransportError::from("in-memory queue lock poisoned"))?;
        let state = queues
            .get_mut(name)
            .ok_or_else(|| TransportError::QueueNotFound(name.to_owned()))?;
        Ok(f(state))
    }
}

#[async_trait]
impl Transport for InMemoryQueue {
    async fn send(&self, destination: &str, payload: Bytes) -> Result<MessageId, TransportError> {
        let id = MessageId::new(uuid::Uuid::new_v4().to_string());
        let notify = self.with_state(destination, |state| {
            state.messages.push_back(ReceivedMessage {
                id: id.clone(),
                payload,
            });
            state.notify.clone()
        })?;
        notify.notify_waiters();
        Ok(id)
    }

    async fn receive(
        &self,
        source: &str,
        max_messages: usize,
        wait_time: Duration,
    ) -> Result<Vec<ReceivedMessage>, TransportError> {
        if !(1..=Self::MAX_MESSAGES_PER_RECEIVE).contains(&max_messages) {
            return Err(TransportError::InvalidRequest(format!(
                "max_messages must be between 1 and {}, got {}",
                Self::MAX_MESSAGES_PER_RECEIVE,
                max_messages
            )));
        }

        // `None` waits until a message arrives.
        let deadline = tokio::time::Instant::now().checked_add(wait_time);
        loop {
            // Register for wake-ups before looking, so a send racing with the
            // check below is not missed.
            let notify = self.with_state(source, |state| state.notify.clone())?;
            let mut notified = pin!(notify.notified());
            notified.as_mut().enable();

            let batch = self.with_state(source, |state| state.take(max_messages))?;
            if !batch.is_empty() {
                return Ok(batch);
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return Ok(Vec::new());
                    }
                }
                None => notified.await,
            }
        }
    }
}
