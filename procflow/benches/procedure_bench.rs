//! Benchmarks for procedure execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use procflow::prelude::*;

fn procedure_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let bare = ProcedureBuilder::new((), ())
        .handler(|params| async move { Ok(params.input) })
        .expect("handler")
        .build()
        .expect("build");

    c.bench_function("bare_pipeline_call", |b| {
        b.iter(|| {
            let result = runtime.block_on(bare.call(black_box(serde_json::json!({"n": 1}))));
            black_box(result)
        });
    });

    let hooked = ProcedureBuilder::new((), ())
        .on_start(|| async { Ok(()) })
        .expect("on_start")
        .handler(|params| async move { Ok(params.input) })
        .expect("handler")
        .on_success(|| async { Ok(()) })
        .expect("on_success")
        .on_complete(|_info| async { Ok(()) })
        .expect("on_complete")
        .build()
        .expect("build");

    c.bench_function("hooked_pipeline_call", |b| {
        b.iter(|| {
            let result = runtime.block_on(hooked.call(black_box(serde_json::json!({"n": 1}))));
            black_box(result)
        });
    });
}

criterion_group!(benches, procedure_benchmark);
criterion_main!(benches);
