use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sparse_core::Block;
use sparse_fields::{Gf2, Gf2_128};
use sparse_vole_core::{
    base::{BaseCorrelationReceiver, BaseCorrelationSender},
    ideal::ideal_base_pair,
    Receiver, Sender, SpcgConfig,
};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spcg");

    let batch_num = 64;
    let each_num = 1 << 10;
    let h = 10;

    group.bench_function("extend 64 x 1024", |b| {
        b.iter(|| {
            let delta = Gf2_128::new(0x1234_5678);
            let cot_delta = Gf2_128::new(0x9abc_def0);

            let (mut base_sender, mut base_receiver) = ideal_base_pair::<Gf2, Gf2_128>([0u8; 32]);
            let (mut cot_sender, mut cot_receiver) = ideal_base_pair::<Gf2, Gf2_128>([1u8; 32]);
            base_sender.init(batch_num).unwrap();
            base_receiver.init(delta, batch_num).unwrap();
            cot_sender.init(batch_num * h).unwrap();
            cot_receiver.init(cot_delta, batch_num * h).unwrap();

            let mut sender = Sender::new(SpcgConfig::default()).setup::<Gf2, Gf2_128>(Block::ZERO);
            let mut receiver = Receiver::new(SpcgConfig::default()).setup::<Gf2, Gf2_128>(
                delta,
                cot_delta,
                Block::ONES,
            );

            let alphas = sender.sample_alphas(batch_num, each_num).unwrap();
            let mask = sender
                .extend(
                    &alphas,
                    each_num,
                    base_sender.extend_non_zero(batch_num).unwrap(),
                    cot_sender.extend(batch_num * h).unwrap(),
                )
                .unwrap();
            let (keys, corrections) = receiver
                .extend(
                    batch_num,
                    each_num,
                    base_receiver.extend_non_zero(batch_num).unwrap(),
                    cot_receiver.extend(batch_num * h).unwrap(),
                    mask,
                )
                .unwrap();
            sender.receive_keys(keys, corrections).unwrap();

            black_box((sender.finalize().unwrap(), receiver.finalize().unwrap()))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
