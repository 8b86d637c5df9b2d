use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use perceptual::{
    calculate_similarities_with, fingerprint_corpus, make_shingles, PerceptualConfig,
    ShingleConfig,
};

fn corpus(docs: usize, words: usize) -> Vec<String> {
    (0..docs)
        .map(|d| {
            (0..words)
                .map(|w| format!("word{}", (w * 7 + d) % (words / 2 + 1)))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_shingles(c: &mut Criterion) {
    let cfg = ShingleConfig::default();
    let mut group = c.benchmark_group("shingles");

    for size in [100, 500, 2000].iter() {
        let text = corpus(1, *size).remove(0);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("tokens_{size}"), |b| {
            b.iter(|| make_shingles(black_box(&text), black_box(&cfg)))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("signatures_and_similarity");

    for docs in [50, 200].iter() {
        let texts = corpus(*docs, 300);
        for parallel in [false, true] {
            let cfg = PerceptualConfig::default()
                .with_seed(1)
                .with_parallel(parallel);
            group.throughput(Throughput::Elements(*docs as u64));
            group.bench_function(format!("docs_{docs}_parallel_{parallel}"), |b| {
                b.iter(|| {
                    let fp = fingerprint_corpus(black_box(&texts), black_box(&cfg))
                        .expect("fingerprint");
                    calculate_similarities_with(&fp.signatures, parallel).expect("similarity")
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_shingles, bench_pipeline);
criterion_main!(benches);
