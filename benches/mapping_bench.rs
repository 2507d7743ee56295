// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for ordered-store lookup and object mapping over wide groups.

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fieldmap::{MappingEngine, OrderedStore, Sink, Slot};
use serde_json::{Map, Value, json};

// ── Helpers ─────────────────────────────────────────────────────────────

fn store_with_n_entries(n: usize) -> OrderedStore<String, usize> {
    (0..n).map(|i| (format!("field_{i}"), i)).collect()
}

fn engine_with_n_rules(n: usize) -> MappingEngine {
    let mut engine = MappingEngine::new("type");
    engine.default_group().with_direct_mapping("id", "#id");
    let mut group = engine.new_group("wide");
    for i in 0..n {
        group = if i % 2 == 0 {
            group.with_direct_mapping(format!("field_{i}"), format!("#f{i}"))
        } else {
            group.with_validated_mapping(format!("field_{i}"), format!("#f{i}"), "-")
        };
    }
    engine
}

fn object_with_n_fields(n: usize) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), json!("wide"));
    map.insert("id".into(), json!(1));
    // Leave every third field out so validated rules hit their default.
    for i in (0..n).filter(|i| i % 3 != 0) {
        map.insert(format!("field_{i}"), json!(i));
    }
    Value::Object(map)
}

/// Overwrite-only sink, so repeated iterations do not accumulate history.
struct Inputs(BTreeMap<String, String>);

impl Sink for Inputs {
    fn resolve(&mut self, locator: &str) -> Option<&mut dyn Slot> {
        self.0.get_mut(locator).map(|s| s as &mut dyn Slot)
    }
}

fn sink_for_n_rules(n: usize) -> Inputs {
    Inputs(
        std::iter::once("#b #id".to_owned())
            .chain((0..n).map(|i| format!("#b #f{i}")))
            .map(|loc| (loc, String::new()))
            .collect(),
    )
}

// ── Store lookup ────────────────────────────────────────────────────────

fn bench_store_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_lookup");

    for n in [10, 50, 100, 500] {
        let store = store_with_n_entries(n);
        let last = format!("field_{}", n - 1);
        let absent = "nonexistent_field".to_owned();

        group.bench_with_input(BenchmarkId::new("first", n), &store, |b, s| {
            b.iter(|| s.get(black_box(&"field_0".to_owned())).copied());
        });

        group.bench_with_input(BenchmarkId::new("last", n), &store, |b, s| {
            b.iter(|| s.get(black_box(&last)).copied());
        });

        group.bench_with_input(BenchmarkId::new("miss", n), &store, |b, s| {
            b.iter(|| s.contains_key(black_box(&absent)));
        });
    }

    group.finish();
}

// ── Mapping ─────────────────────────────────────────────────────────────

fn bench_map_wide_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_wide_group");

    for n in [10, 50, 100, 500] {
        let engine = engine_with_n_rules(n);
        let object = object_with_n_fields(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("map", n), &object, |b, obj| {
            let mut sink = sink_for_n_rules(n);
            b.iter(|| engine.map(black_box(obj), "#b", &mut sink));
        });

        group.bench_with_input(BenchmarkId::new("try_map", n), &object, |b, obj| {
            let mut sink = sink_for_n_rules(n);
            b.iter(|| engine.try_map(black_box(obj), "#b", &mut sink));
        });
    }

    group.finish();
}

fn bench_unknown_group(c: &mut Criterion) {
    let engine = engine_with_n_rules(100);
    let object = json!({"type": "narrow", "id": 1});

    c.bench_function("map_unknown_group", |b| {
        let mut sink = sink_for_n_rules(100);
        b.iter(|| engine.map(black_box(&object), "#b", &mut sink));
    });
}

criterion_group!(
    benches,
    bench_store_lookup,
    bench_map_wide_group,
    bench_unknown_group,
);
criterion_main!(benches);
