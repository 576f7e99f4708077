//! # Traced messaging
//!
//! [`Publisher`] and [`Subscriber`] wrap a [`Transport`] so that every send
//! is recorded as a producer span whose context rides inside the message, and
//! every received message can resume that trace on the consuming side.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::time::Duration;
//! use tracebridge::trace::SpanKind;
//! use tracebridge_sdk::messaging::{InMemoryQueue, Publisher, Subscriber};
//! use tracebridge_sdk::trace::{InMemorySpanExporter, TracerProvider};
//!
//! let exporter = InMemorySpanExporter::default();
//! let provider = TracerProvider::builder().with_simple_exporter(exporter.clone()).build();
//! let tracer = provider.tracer("orders");
//! let queue = InMemoryQueue::new().with_queue("orders");
//!
//! let publisher = Publisher::new(tracer.clone(), queue.clone(), "orders");
//! let subscriber = Subscriber::new(tracer.clone(), queue, "orders");
//!
//! let root = tracer.start_span("checkout", SpanKind::Internal, None);
//! publisher.publish(Some(root.context()), "order #1").await.unwrap();
//!
//! let deliveries = subscriber.receive(None, 1, Duration::from_secs(1)).await.unwrap();
//! let consumer = subscriber.resume(&deliveries[0], "process order").unwrap();
//! assert_eq!(consumer.context().trace_id(), root.context().trace_id());
//! # }
//! ```
use crate::propagation::PropagationBridge;
use crate::trace::{Span, Tracer};
use bytes::Bytes;
use std::borrow::Cow;
use std::time::Duration;
use tracebridge::propagation::{DecodeError, PropagationEnvelope};
use tracebridge::trace::{SpanContext, SpanKind, Status};
use tracebridge::transport::{MessageId, Transport, TransportError};
use tracebridge::{bridge_debug, bridge_warn};

#[cfg(feature = "in-memory-queue")]
mod in_memory_queue;

#[cfg(feature = "in-memory-queue")]
#[cfg_attr(docsrs, doc(cfg(feature = "in-memory-queue")))]
pub use in_memory_queue::InMemoryQueue;

/// Tag keys recorded on messaging spans.
pub mod attribute {
    /// The messaging system as identified by the client instrumentation.
    pub const MESSAGING_SYSTEM: &str = "messaging.system";

    /// The message destination name, the queue name for queues.
    pub const MESSAGING_DESTINATION_NAME: &str = "messaging.destination.name";

    /// A string identifying the type of the messaging operation, `send`,
    /// `receive` or `process`.
    pub const MESSAGING_OPERATION_TYPE: &str = "messaging.operation.type";

    /// A value used by the messaging system as an identifier for the message.
    pub const MESSAGING_MESSAGE_ID: &str = "messaging.message.id";

    /// The size of the message body in bytes.
    pub const MESSAGING_MESSAGE_BODY_SIZE: &str = "messaging.message.body.size";

    /// The application message carried by the envelope.
    pub const MESSAGING_MESSAGE_BODY: &str = "messaging.message.body";

    /// The number of messages returned by a receive operation.
    pub const MESSAGING_BATCH_MESSAGE_COUNT: &str = "messaging.batch.message_count";
}

use attribute::*;

const DEFAULT_SYSTEM: &str = "tracebridge";

/// Sends application messages wrapped in a [`PropagationEnvelope`].
#[derive(Debug)]
pub struct Publisher<T> {
    bridge: PropagationBridge,
    transport: T,
    queue: String,
    system: Cow<'static, str>,
}

impl<T: Transport> Publisher<T> {
    /// Publisher for `queue` over `transport`, recording spans with `tracer`.
    pub fn new(tracer: Tracer, transport: T, queue: impl Into<String>) -> Self {
        Publisher {
            bridge: PropagationBridge::new(tracer),
            transport,
            queue: queue.into(),
            system: Cow::Borrowed(DEFAULT_SYSTEM),
        }
    }

    /// Value recorded as `messaging.system`, for example `aws_sqs`.
    pub fn with_system(self, system: impl Into<Cow<'static, str>>) -> Self {
        Publisher {
            system: system.into(),
            ..self
        }
    }

    /// Destination queue name.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Sends `message` inside a producer span named `send {queue}`.
    ///
    /// The producer span is a child of `parent` and its context is what the
    /// envelope carries. On success the span is tagged with the message id;
    /// on failure its status is set to error. The transport result is
    /// returned unchanged either way.
    pub async fn publish(
        &self,
        parent: Option<&SpanContext>,
        message: impl Into<String>,
    ) -> Result<MessageId, TransportError> {
        let mut span = self.bridge.tracer().start_span(
            format!("send {}", self.queue),
            SpanKind::Producer,
            parent,
        );
        span.set_tag(MESSAGING_SYSTEM, self.system.clone());
        span.set_tag(MESSAGING_DESTINATION_NAME, self.queue.clone());
        span.set_tag(MESSAGING_OPERATION_TYPE, "send");

        let payload = self.bridge.attach(&span, message).to_bytes();
        span.set_tag(MESSAGING_MESSAGE_BODY_SIZE, payload.len() as i64);

        let result = self.transport.send(&self.queue, payload).await;
        match &result {
            Ok(id) => span.set_tag(MESSAGING_MESSAGE_ID, id.to_string()),
            Err(err) => {
                bridge_debug!(
                    name: "Publisher.Send.Failed",
                    queue = self.queue.as_str(),
                    error = format!("{err}")
                );
                span.set_status(Status::error(err.to_string()));
            }
        }
        span.end();
        result
    }
}

/// A received message with its envelope parsed, or the reason it could not be.
#[derive(Clone, Debug)]
pub struct Delivery {
    /// Transport assigned message id.
    pub id: MessageId,
    /// The raw message body.
    pub payload: Bytes,
    /// The parsed envelope. Its context fields are not validated until the
    /// trace is resumed.
    pub envelope: Result<PropagationEnvelope, DecodeError>,
}

impl Delivery {
    /// The application message, if the body parsed as an envelope.
    pub fn message(&self) -> Option<&str> {
        self.envelope.as_ref().ok().map(|env| env.message.as_str())
    }
}

/// Receives messages and resumes the traces they carry.
#[derive(Debug)]
pub struct Subscriber<T> {
    bridge: PropagationBridge,
    transport: T,
    queue: String,
    system: Cow<'static, str>,
}

impl<T: Transport> Subscriber<T> {
    /// Subscriber for `queue` over `transport`, recording spans with `tracer`.
    pub fn new(tracer: Tracer, transport: T, queue: impl Into<String>) -> Self {
        Subscriber {
            bridge: PropagationBridge::new(tracer),
            transport,
            queue: queue.into(),
            system: Cow::Borrowed(DEFAULT_SYSTEM),
        }
    }

    /// Value recorded as `messaging.system`.
    pub fn with_system(self, system: impl Into<Cow<'static, str>>) -> Self {
        Subscriber {
            system: system.into(),
            ..self
        }
    }

    /// Source queue name.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Waits up to `wait_time` for at most `max_messages` messages.
    ///
    /// The poll itself is recorded as a `receive {queue}` client span under
    /// `parent`, tagged with the batch size and, when exactly one message
    /// arrived, its application message. Bodies that are not envelopes are still delivered, with the
    /// parse error in [`Delivery::envelope`].
    pub async fn receive(
        &self,
        parent: Option<&SpanContext>,
        max_messages: usize,
        wait_time: Duration,
    ) -> Result<Vec<Delivery>, TransportError> {
        let mut span = self.bridge.tracer().start_span(
            format!("receive {}", self.queue),
            SpanKind::Client,
            parent,
        );
        span.set_tag(MESSAGING_SYSTEM, self.system.clone());
        span.set_tag(MESSAGING_DESTINATION_NAME, self.queue.clone());
        span.set_tag(MESSAGING_OPERATION_TYPE, "receive");

        let received = match self
            .transport
            .receive(&self.queue, max_messages, wait_time)
            .await
        {
            Ok(received) => received,
            Err(err) => {
                span.set_status(Status::error(err.to_string()));
                span.end();
                return Err(err);
            }
        };
        let deliveries: Vec<Delivery> = received
            .into_iter()
            .map(|msg| {
                let envelope = PropagationEnvelope::from_slice(&msg.payload);
                if let Err(err) = &envelope {
                    bridge_warn!(
                        name: "Subscriber.Receive.InvalidEnvelope",
                        message_id = msg.id.to_string(),
                        error = format!("{err}")
                    );
                }
                Delivery {
                    id: msg.id,
                    payload: msg.payload,
                    envelope,
                }
            })
            .collect();

        span.set_tag(MESSAGING_BATCH_MESSAGE_COUNT, deliveries.len() as i64);
        if let [delivery] = deliveries.as_slice() {
            if let Some(message) = delivery.message() {
                span.set_tag(MESSAGING_MESSAGE_BODY, message.to_owned());
            }
        }
        span.end();

        Ok(deliveries)
    }

    /// Resumes the trace carried by `delivery` in a consumer span named `name`.
    ///
    /// The span is tagged with the message id, the queue name, the body size
    /// and the application message. A delivery whose envelope did not parse or decode yields the
    /// [`DecodeError`] and no span.
    pub fn resume(
        &self,
        delivery: &Delivery,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Span, DecodeError> {
        let envelope = delivery.envelope.as_ref().map_err(Clone::clone)?;
        let mut span = self.bridge.extract_and_resume(envelope, name)?;
        span.set_tag(MESSAGING_SYSTEM, self.system.clone());
        span.set_tag(MESSAGING_DESTINATION_NAME, self.queue.clone());
        span.set_tag(MESSAGING_OPERATION_TYPE, "process");
        span.set_tag(MESSAGING_MESSAGE_ID, delivery.id.to_string());
        span.set_tag(MESSAGING_MESSAGE_BODY_SIZE, delivery.payload.len() as i64);
        span.set_tag(MESSAGING_MESSAGE_BODY, envelope.message.clone());
        Ok(span)
    }
}

#[cfg(all(test, feature = "in-memory-queue"))]
mod tests {
    use super::*;
    use crate::trace::{InMemorySpanExporter, TracerProvider};
    use async_trait::async_trait;
    use tracebridge::transport::ReceivedMessage;
    use tracebridge::Value;

    fn setup() -> (Tracer, InMemorySpanExporter, InMemoryQueue) {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let queue = InMemoryQueue::new().with_queue("jobs");
        (provider.tracer("messaging-test"), exporter, queue)
    }

    #[derive(Debug)]
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, destination: &str, _: Bytes) -> Result<MessageId, TransportError> {
            Err(TransportError::QueueNotFound(destination.to_owned()))
        }

        async fn receive(
            &self,
            _: &str,
            _: usize,
            _: Duration,
        ) -> Result<Vec<ReceivedMessage>, TransportError> {
            Err("connection reset".into())
        }
    }

    #[tokio::test]
    async fn publish_records_producer_span() {
        let (tracer, exporter, queue) = setup();
        let publisher = Publisher::new(tracer.clone(), queue.clone(), "jobs").with_system("memory");
        let root = tracer.start_span("root", SpanKind::Internal, None);

        let id = publisher.publish(Some(root.context()), "work").await.unwrap();

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        let producer = &spans[0];
        assert_eq!(producer.name, "send jobs");
        assert_eq!(producer.span_kind, SpanKind::Producer);
        assert_eq!(producer.parent_span_id, root.context().span_id());
        assert_eq!(producer.tag(MESSAGING_MESSAGE_ID), Some(&Value::from(id.to_string())));
        assert_eq!(producer.tag(MESSAGING_SYSTEM), Some(&Value::from("memory")));
        assert_eq!(producer.status, Status::Unset);

        let sent = queue.receive("jobs", 1, Duration::ZERO).await.unwrap();
        let envelope = PropagationEnvelope::from_slice(&sent[0].payload).unwrap();
        assert_eq!(envelope.context().unwrap(), producer.span_context);
        assert_eq!(envelope.message, "work");
    }

    #[tokio::test]
    async fn publish_failure_sets_error_status() {
        let (tracer, exporter, _) = setup();
        let publisher = Publisher::new(tracer, FailingTransport, "gone");

        let err = publisher.publish(None, "work").await.unwrap_err();

        assert!(matches!(err, TransportError::QueueNotFound(ref name) if name == "gone"));
        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].status, Status::error("queue `gone` does not exist"));
        assert!(spans[0].tag(MESSAGING_MESSAGE_ID).is_none());
    }

    #[tokio::test]
    async fn receive_and_resume_continue_the_trace() {
        let (tracer, exporter, queue) = setup();
        let publisher = Publisher::new(tracer.clone(), queue.clone(), "jobs");
        let subscriber = Subscriber::new(tracer.clone(), queue, "jobs");

        let id = publisher.publish(None, "work").await.unwrap();
        let deliveries = subscriber.receive(None, 1, Duration::from_secs(1)).await.unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].id, id);
        assert_eq!(deliveries[0].message(), Some("work"));

        let mut consumer = subscriber.resume(&deliveries[0], "process").unwrap();
        consumer.end();

        let spans = exporter.get_finished_spans().unwrap();
        let producer = spans.iter().find(|s| s.name == "send jobs").unwrap();
        let poll = spans.iter().find(|s| s.name == "receive jobs").unwrap();
        let process = spans.iter().find(|s| s.name == "process").unwrap();

        assert_eq!(poll.tag(MESSAGING_BATCH_MESSAGE_COUNT), Some(&Value::I64(1)));
        assert_eq!(poll.tag(MESSAGING_MESSAGE_BODY), Some(&Value::from("work")));
        assert_eq!(process.tag(MESSAGING_MESSAGE_BODY), Some(&Value::from("work")));
        assert_eq!(process.span_context.trace_id(), producer.span_context.trace_id());
        assert_eq!(process.parent_span_id, producer.span_context.span_id());
        assert!(process.parent_span_is_remote);
        assert_eq!(process.span_kind, SpanKind::Consumer);
        assert_eq!(process.tag(MESSAGING_MESSAGE_ID), Some(&Value::from(id.to_string())));
    }

    #[tokio::test]
    async fn non_envelope_body_is_surfaced() {
        let (tracer, exporter, queue) = setup();
        queue.send("jobs", Bytes::from_static(b"plain text")).await.unwrap();
        let subscriber = Subscriber::new(tracer, queue, "jobs");

        let deliveries = subscriber.receive(None, 1, Duration::ZERO).await.unwrap();
        assert!(deliveries[0].message().is_none());
        let poll = &exporter.get_finished_spans().unwrap()[0];
        assert!(poll.tag(MESSAGING_MESSAGE_BODY).is_none());

        let err = subscriber.resume(&deliveries[0], "process").unwrap_err();
        assert_eq!(err.field(), "envelope");

        let names: Vec<_> = exporter
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["receive jobs"]);
    }

    #[tokio::test]
    async fn batch_receive_leaves_body_untagged() {
        let (tracer, exporter, queue) = setup();
        let publisher = Publisher::new(tracer.clone(), queue.clone(), "jobs");
        let subscriber = Subscriber::new(tracer, queue, "jobs");
        publisher.publish(None, "first").await.unwrap();
        publisher.publish(None, "second").await.unwrap();

        let deliveries = subscriber.receive(None, 10, Duration::ZERO).await.unwrap();
        assert_eq!(deliveries.len(), 2);

        let spans = exporter.get_finished_spans().unwrap();
        let poll = spans.iter().find(|s| s.name == "receive jobs").unwrap();
        assert_eq!(poll.tag(MESSAGING_BATCH_MESSAGE_COUNT), Some(&Value::I64(2)));
        assert!(poll.tag(MESSAGING_MESSAGE_BODY).is_none());
    }

    #[tokio::test]
    async fn receive_failure_is_passed_through() {
        let (tracer, exporter, _) = setup();
        let subscriber = Subscriber::new(tracer, FailingTransport, "jobs");

        let err = subscriber.receive(None, 1, Duration::ZERO).await.unwrap_err();

        assert_eq!(err.to_string(), "connection reset");
        assert!(exporter.get_finished_spans().unwrap()[0].status.is_error());
    }
}
