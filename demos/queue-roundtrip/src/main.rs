//! Sends one message through an in-memory queue and continues its trace on
//! the receiving side. Spans are printed to stdout as JSON lines.
//!
//! The queue name is read from `TRACEBRIDGE_QUEUE`. Log verbosity follows
//! `RUST_LOG`, and the usual `OTEL_TRACES_SAMPLER` / `OTEL_SERVICE_NAME`
//! variables configure the provider.
use std::time::Duration;
use tracebridge::trace::{SpanKind, Status};
use tracebridge_sdk::messaging::{InMemoryQueue, Publisher, Subscriber};
use tracebridge_sdk::trace::{Config, Tracer, TracerProvider};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_QUEUE: &str = "demo-queue";

fn init_logs() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_tracer() -> TracerProvider {
    // Setup tracerprovider with stdout exporter
    // that prints the spans to stdout.
    TracerProvider::builder()
        .with_config(Config::default())
        .with_simple_exporter(tracebridge_stdout::SpanExporter::default())
        .build()
}

async fn send_and_receive(tracer: &Tracer, queue: InMemoryQueue, queue_name: &str) {
    let Some(mut activity) = tracer.start_sampled_span("TestActivity", SpanKind::Internal, None)
    else {
        warn!("TestActivity was not sampled, nothing to propagate");
        return;
    };
    info!(trace_id = %activity.context().trace_id(), "Created activity");

    let publisher = Publisher::new(tracer.clone(), queue.clone(), queue_name);
    match publisher
        .publish(Some(activity.context()), "Test message sent to queue")
        .await
    {
        Ok(id) => info!(message_id = %id, "Message sent"),
        Err(err) => {
            error!(error = %err, "Failed to send message");
            activity.set_status(Status::error(err.to_string()));
        }
    }

    let subscriber = Subscriber::new(tracer.clone(), queue, queue_name);
    let deliveries = match subscriber
        .receive(Some(activity.context()), 1, Duration::from_secs(10))
        .await
    {
        Ok(deliveries) => deliveries,
        Err(err) => {
            error!(error = %err, "Failed to receive message");
            activity.set_status(Status::error(err.to_string()));
            activity.end();
            return;
        }
    };

    for delivery in &deliveries {
        info!(
            message_id = %delivery.id,
            body = %String::from_utf8_lossy(&delivery.payload),
            "Received message"
        );
        match subscriber.resume(delivery, "ReceiveMessageFromQueue") {
            Ok(mut consumer) => {
                info!(
                    trace_id = %consumer.context().trace_id(),
                    span_id = %consumer.context().span_id(),
                    "Continuing trace"
                );
                consumer.set_status(Status::Ok);
                consumer.end();
            }
            Err(err) => warn!(error = %err, "Message carried no usable trace context"),
        }
    }
    if deliveries.is_empty() {
        info!("No message received");
    }

    activity.end();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    init_logs();
    let provider = init_tracer();
    let tracer = provider.tracer("tracebridge/queue-roundtrip");

    let queue_name = std::env::var("TRACEBRIDGE_QUEUE")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_QUEUE.to_owned());
    let queue = InMemoryQueue::new().with_queue(queue_name.clone());

    send_and_receive(&tracer, queue, &queue_name).await;

    provider.shutdown()?;
    Ok(())
}
