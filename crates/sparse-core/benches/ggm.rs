use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sparse_core::{ggm_tree::GgmTree, Block};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ggm");

    let depth = 14;
    let ggm = GgmTree::new(depth);
    let mut tree = vec![Block::ZERO; 1 << depth];
    let mut k0 = vec![Block::ZERO; depth];
    let mut k1 = vec![Block::ZERO; depth];

    group.bench_function("gen", |b| {
        b.iter(|| {
            ggm.gen(
                black_box(Block::ZERO),
                black_box(&mut tree),
                black_box(&mut k0),
                black_box(&mut k1),
            )
        })
    });

    let alpha = vec![true; depth];
    let k = vec![Block::ZERO; depth];
    group.bench_function("reconstruct", |b| {
        b.iter(|| ggm.reconstruct(black_box(&mut tree), black_box(&k), black_box(&alpha)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
