use std::time::Duration;
use tracebridge::propagation::PropagationEnvelope;
use tracebridge::trace::{SpanKind, Status};
use tracebridge::Transport;
use tracebridge_sdk::messaging::{InMemoryQueue, Publisher, Subscriber};
use tracebridge_sdk::trace::{InMemorySpanExporter, Sampler, TracerProvider};

fn provider(service: &'static str, sampler: Sampler) -> (TracerProvider, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_service_name(service)
        .with_sampler(sampler)
        .with_simple_exporter(exporter.clone())
        .build();
    (provider, exporter)
}

#[tokio::test]
async fn trace_survives_the_queue() {
    let queue = InMemoryQueue::new().with_queue("orders");

    // Producer and consumer share nothing but the queue.
    let (producer_provider, producer_spans) = provider("producer", Sampler::AlwaysOn);
    let (consumer_provider, consumer_spans) =
        provider("consumer", Sampler::ParentBased(Box::new(Sampler::AlwaysOff)));

    let producer_tracer = producer_provider.tracer("producer");
    let mut root = producer_tracer.start_span("TestActivity", SpanKind::Internal, None);
    let publisher = Publisher::new(producer_tracer.clone(), queue.clone(), "orders");
    publisher
        .publish(Some(root.context()), "Test message sent to queue")
        .await
        .unwrap();
    root.end();

    let consumer_tracer = consumer_provider.tracer("consumer");
    let subscriber = Subscriber::new(consumer_tracer, queue, "orders");
    let deliveries = subscriber
        .receive(None, 1, Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].message(), Some("Test message sent to queue"));

    let mut consumer = subscriber
        .resume(&deliveries[0], "ReceiveMessageFromQueue")
        .unwrap();
    consumer.set_status(Status::Ok);
    consumer.end();

    let produced = producer_spans.get_finished_spans().unwrap();
    let consumed = consumer_spans.get_finished_spans().unwrap();

    let send = produced.iter().find(|s| s.name == "send orders").unwrap();
    let root = produced.iter().find(|s| s.name == "TestActivity").unwrap();
    assert_eq!(send.parent_span_id, root.span_context.span_id());

    // The root-level receive poll is unsampled by the consumer's sampler, the
    // resumed span follows the producer's sampled decision.
    assert_eq!(consumed.len(), 1);
    let process = &consumed[0];
    assert_eq!(process.name, "ReceiveMessageFromQueue");
    assert_eq!(process.service_name, "consumer");
    assert_eq!(process.span_context.trace_id(), root.span_context.trace_id());
    assert_eq!(process.parent_span_id, send.span_context.span_id());
    assert!(process.parent_span_is_remote);
    assert_eq!(process.status, Status::Ok);
}

#[tokio::test]
async fn corrupted_envelope_does_not_start_a_trace() {
    let queue = InMemoryQueue::new().with_queue("orders");
    let (provider, spans) = provider("consumer", Sampler::AlwaysOn);

    let envelope = PropagationEnvelope {
        trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".into(),
        span_id: "00f067aa0ba902b7".into(),
        trace_flags: "Recorded".into(),
        message: "hello".into(),
    };
    queue.send("orders", envelope.to_bytes()).await.unwrap();

    let subscriber = Subscriber::new(provider.tracer("consumer"), queue, "orders");
    let deliveries = subscriber
        .receive(None, 1, Duration::from_secs(1))
        .await
        .unwrap();

    let err = subscriber.resume(&deliveries[0], "process").unwrap_err();
    assert_eq!(err.field(), "trace_flags");
    assert!(spans
        .get_finished_spans()
        .unwrap()
        .iter()
        .all(|s| s.name != "process"));
}

#[tokio::test]
async fn nothing_to_receive() {
    let queue = InMemoryQueue::new().with_queue("orders");
    let (provider, _) = provider("consumer", Sampler::AlwaysOn);
    let subscriber = Subscriber::new(provider.tracer("consumer"), queue, "orders");

    let deliveries = subscriber
        .receive(None, 1, Duration::from_millis(20))
        .await
        .unwrap();

    assert!(deliveries.is_empty());
}
