use content_engine::{Dataset, SimilarityIndex, TFIDFParams, TFIDFVectorizer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const WORDS: &[&str] = &[
    "red", "blue", "green", "black", "white", "shoes", "boots", "hat", "scarf", "jacket", "running", "walking",
    "hiking", "wool", "cotton", "leather", "waterproof", "lightweight", "winter", "summer", "classic", "slim",
    "kids", "women", "men", "sport", "casual", "formal", "vintage", "organic",
];

// 再現性のため固定シードの LCG
fn synthetic_docs(n: usize, words_per_doc: usize) -> Vec<String> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    (0..n)
        .map(|_| {
            (0..words_per_doc)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    WORDS[(state >> 33) as usize % WORDS.len()]
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn fit_transform_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_transform");
    for n in [1_000usize, 10_000] {
        let docs = synthetic_docs(n, 20);
        group.bench_with_input(BenchmarkId::from_parameter(n), &docs, |b, docs| {
            b.iter(|| {
                let mut v: TFIDFVectorizer = TFIDFVectorizer::new(TFIDFParams::default()).unwrap();
                black_box(v.fit_transform(docs).unwrap())
            })
        });
    }
    group.finish();
}

fn recommend_benchmark(c: &mut Criterion) {
    let docs = synthetic_docs(10_000, 20);
    let index = SimilarityIndex::build(Dataset::from_descriptions(docs), TFIDFParams::default()).unwrap();

    c.bench_function("recommend_top10", |b| {
        b.iter(|| black_box(index.recommend(black_box("red waterproof hiking boots for winter"), 10)))
    });
    c.bench_function("recommend_all", |b| {
        b.iter(|| black_box(index.recommend(black_box("classic leather shoes"), i64::MAX)))
    });
}

criterion_group!(benches, fit_transform_benchmark, recommend_benchmark);
criterion_main!(benches);
