use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value};
use std::hint::black_box;
use std::sync::Arc;

use textsieve::filter::{Row, RowFilterEngine};
use textsieve::matcher::PatternAutomaton;
use textsieve::parallel::WorkerCount;

/// Deterministic pseudo-words so runs are comparable
fn words(count: usize, seed: u64) -> Vec<String> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let len = 3 + (state >> 60) as usize;
            (0..len)
                .map(|i| (b'a' + (state.rotate_right(i as u32 * 5) % 26) as u8) as char)
                .collect()
        })
        .collect()
}

fn bench_scan_by_keyword_count(c: &mut Criterion) {
    let text = words(20_000, 7).join(" ");
    let mut group = c.benchmark_group("contains_any");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for keyword_count in [10, 100, 1_000, 10_000] {
        // Keywords never occurring in the text force a full scan
        let keywords: Vec<String> = words(keyword_count, 99)
            .into_iter()
            .map(|w| format!("{w}#"))
            .collect();
        let automaton = PatternAutomaton::build(&keywords, false).unwrap_or_else(|e| panic!("{e}"));

        group.bench_with_input(
            BenchmarkId::from_parameter(keyword_count),
            &automaton,
            |b, automaton| b.iter(|| automaton.contains_any(black_box(text.as_str()))),
        );
    }
    group.finish();
}

fn bench_filter_mask(c: &mut Criterion) {
    let keywords = words(200, 3);
    let automaton = PatternAutomaton::build(&keywords, false).unwrap_or_else(|e| panic!("{e}"));
    let engine = RowFilterEngine::new(Arc::new(automaton));

    let rows: Vec<Row> = (0..50_000)
        .map(|index| {
            let mut fields = Map::new();
            fields.insert("text".into(), Value::String(words(40, index as u64).join(" ")));
            Row::new(index, fields)
        })
        .collect();

    let mut group = c.benchmark_group("filter_mask");
    group.sample_size(10);
    for workers in [WorkerCount::Fixed(1), WorkerCount::All] {
        group.bench_function(format!("workers={}", workers.as_signed()), |b| {
            b.iter(|| {
                engine
                    .filter_mask(black_box(&rows), &["text"], 5_000, workers)
                    .map(|mask| mask.retained_count())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan_by_keyword_count, bench_filter_mask);
criterion_main!(benches);
