use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tracebridge::propagation::{codec, PropagationEnvelope};
use tracebridge::trace::{SpanContext, SpanId, TraceFlags, TraceId};

fn criterion_benchmark(c: &mut Criterion) {
    let cx = SpanContext::new(
        TraceId::from_u128(0x4bf9_2f35_77b3_4da6_a3ce_929d_0e0e_4736),
        SpanId::from_u64(0x00f0_67aa_0ba9_02b7),
        TraceFlags::SAMPLED,
        false,
    );
    let fields = codec::encode(&cx);
    let body = PropagationEnvelope::new(fields.clone(), "hello").to_json();

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode", |b| b.iter(|| codec::encode(black_box(&cx))));
    group.bench_function("decode", |b| b.iter(|| codec::decode(black_box(&fields))));
    group.bench_function("envelope-parse-and-decode", |b| {
        b.iter(|| {
            PropagationEnvelope::from_slice(black_box(body.as_bytes()))
                .and_then(|envelope| envelope.context())
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
