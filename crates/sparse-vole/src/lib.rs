//! Single-point correlation generator.
//!
//! The [`Sender`] and [`Receiver`] drive the protocol of `sparse-vole-core` over a
//! message channel, drawing base correlations and random COTs from the sources they
//! are constructed with.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

mod error;
pub mod io;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::Receiver;
pub use sender::Sender;

pub use sparse_vole_core::{
    base, ideal, msgs, AbortKind, BatchOutput, ReceiverOutput, SenderOutput, SpcgConfig,
    SpcgConfigBuilder, SpcgConfigBuilderError,
};

/// Validates the size of an extension request against `config`.
pub(crate) fn check_sizes(
    config: &SpcgConfig,
    batch_num: usize,
    each_num: usize,
) -> Result<(), String> {
    if batch_num == 0 {
        return Err("a non-zero batch number".to_string());
    }

    if !each_num.is_power_of_two() || each_num > config.max_each_num() {
        return Err(format!(
            "each number a power of two no more than {}, got {each_num}",
            config.max_each_num()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ideal::{ideal_base_pair, IdealBaseReceiver, IdealBaseSender},
        io::{duplex, MemoryDuplex},
        msgs::Message,
    };
    use futures::TryFutureExt;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;
    use rstest::*;
    use sparse_fields::{ExtensionField, Field, Gf2, Gf2_128, UniformRand};
    use sparse_vole_core::is_correlated;

    type TestSender<S, F> = Sender<S, F, IdealBaseSender<S, F>, IdealBaseSender<Gf2, Gf2_128>>;
    type TestReceiver<S, F> =
        Receiver<S, F, IdealBaseReceiver<S, F>, IdealBaseReceiver<Gf2, Gf2_128>>;

    struct Session<S: Field, F: ExtensionField<S>> {
        delta: F,
        sender: TestSender<S, F>,
        receiver: TestReceiver<S, F>,
        sender_io: MemoryDuplex<Message<S, F>>,
        receiver_io: MemoryDuplex<Message<S, F>>,
    }

    fn session<S: Field, F: ExtensionField<S>>(config: SpcgConfig, seed: u64) -> Session<S, F> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let delta = F::rand(&mut rng);

        let (base_sender, base_receiver) = ideal_base_pair::<S, F>(rng.gen());
        let (cot_sender, cot_receiver) = ideal_base_pair::<Gf2, Gf2_128>(rng.gen());

        let mut sender = Sender::new(config.clone(), base_sender, cot_sender);
        let mut receiver = Receiver::new(config, base_receiver, cot_receiver);

        sender.setup_with_seed(rng.gen()).unwrap();
        receiver
            .setup_with_seed(delta, Gf2_128::rand(&mut rng), rng.gen())
            .unwrap();

        let (sender_io, receiver_io) = duplex(8);

        Session {
            delta,
            sender,
            receiver,
            sender_io,
            receiver_io,
        }
    }

    impl<S: Field, F: ExtensionField<S>> Session<S, F> {
        fn extend(
            &mut self,
            batch_num: usize,
            each_num: usize,
        ) -> Result<
            (
                BatchOutput<SenderOutput<S, F>>,
                BatchOutput<ReceiverOutput<F>>,
            ),
            AbortKind,
        > {
            futures::executor::block_on(async {
                futures::try_join!(
                    self.sender
                        .extend(&mut self.sender_io, batch_num, each_num)
                        .map_err(|e| e.kind()),
                    self.receiver
                        .extend(&mut self.receiver_io, batch_num, each_num)
                        .map_err(|e| e.kind())
                )
            })
        }
    }

    fn assert_correlated<S: Field, F: ExtensionField<S>>(
        delta: F,
        sender: &BatchOutput<SenderOutput<S, F>>,
        receiver: &BatchOutput<ReceiverOutput<F>>,
    ) {
        assert_eq!(sender.len(), receiver.len());
        for (s, r) in sender.iter().zip(receiver) {
            assert!(is_correlated(delta, s, r));
        }
    }

    #[fixture]
    fn malicious() -> SpcgConfig {
        SpcgConfig::builder().malicious().build().unwrap()
    }

    #[rstest]
    #[case::gf2(false)]
    #[case::gf2_malicious(true)]
    fn test_sparse_vole_gf2(#[case] is_malicious: bool) {
        let config = if is_malicious {
            malicious()
        } else {
            SpcgConfig::default()
        };
        let mut s = session::<Gf2, Gf2_128>(config, 0);

        let (sender_output, receiver_output) = s.extend(4, 32).unwrap();
        assert_eq!(sender_output.len(), 4);
        assert_correlated(s.delta, &sender_output, &receiver_output);
    }

    #[rstest]
    #[case::gf2_128(false)]
    #[case::gf2_128_malicious(true)]
    fn test_sparse_vole_gf2_128(#[case] is_malicious: bool) {
        let config = if is_malicious {
            malicious()
        } else {
            SpcgConfig::default()
        };
        let mut s = session::<Gf2_128, Gf2_128>(config, 1);

        let (sender_output, receiver_output) = s.extend(4, 32).unwrap();
        assert_correlated(s.delta, &sender_output, &receiver_output);
    }

    #[test]
    fn test_sparse_vole_single_instance() {
        let mut s = session::<Gf2, Gf2_128>(SpcgConfig::default(), 2);
        let (mut io_a, mut io_b) = (s.sender_io, s.receiver_io);

        let (sender_output, receiver_output) = futures::executor::block_on(async {
            futures::try_join!(
                s.sender
                    .extend_with_alphas(&mut io_a, &[3], 8)
                    .map_err(|e| e.kind()),
                s.receiver.extend(&mut io_b, 1, 8).map_err(|e| e.kind())
            )
        })
        .unwrap();

        let sender = &sender_output[0];
        let receiver = &receiver_output[0];

        let mut expected = vec![Gf2::zero(); 8];
        expected[3] = Gf2::one();
        assert_eq!(sender.point_vector(), expected);

        for i in 0..8 {
            let u = sender.point_vector()[i];
            assert_eq!(
                receiver.v[i],
                sender.w[i] + Gf2_128::mixed_mul(u, s.delta)
            );
        }
    }

    #[rstest]
    fn test_sparse_vole_malicious_large(malicious: SpcgConfig) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut s = session::<Gf2, Gf2_128>(malicious, 3);

        let (sender_output, receiver_output) = s.extend(16, 64).unwrap();
        assert_eq!(sender_output.len(), 16);
        assert_correlated(s.delta, &sender_output, &receiver_output);
    }

    #[test]
    fn test_sparse_vole_multiple_extends() {
        let mut s = session::<Gf2, Gf2_128>(malicious(), 4);

        for each_num in [1, 2, 16] {
            let (sender_output, receiver_output) = s.extend(3, each_num).unwrap();
            assert!(sender_output.iter().all(|o| o.len() == each_num));
            assert_correlated(s.delta, &sender_output, &receiver_output);
        }

        assert_eq!(s.sender.exec_counter().unwrap(), 3);
        assert_eq!(s.receiver.exec_counter().unwrap(), 3);
    }

    #[test]
    fn test_sparse_vole_splits_large_requests() {
        let config = SpcgConfig::builder()
            .malicious()
            .max_batch_num(4)
            .max_each_num(16)
            .build()
            .unwrap();
        let mut s = session::<Gf2, Gf2_128>(config, 5);

        let (sender_output, receiver_output) = s.extend(10, 16).unwrap();
        assert_eq!(sender_output.len(), 10);
        assert_correlated(s.delta, &sender_output, &receiver_output);

        // One execution per sub-batch.
        assert_eq!(s.sender.exec_counter().unwrap(), 3);
    }

    #[rstest]
    #[case::zero_batch(0, 8)]
    #[case::not_power_of_two(1, 12)]
    #[case::too_long(1, 1 << 13)]
    fn test_sparse_vole_rejects_bad_sizes(#[case] batch_num: usize, #[case] each_num: usize) {
        let mut s = session::<Gf2, Gf2_128>(SpcgConfig::default(), 6);

        let err = s.extend(batch_num, each_num).unwrap_err();
        assert_eq!(err, AbortKind::Precondition);

        // The session is still usable after a rejected request.
        let (sender_output, receiver_output) = s.extend(1, 8).unwrap();
        assert_correlated(s.delta, &sender_output, &receiver_output);
    }

    #[test]
    fn test_sparse_vole_detects_mismatched_base_correlations() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let delta = Gf2_128::rand(&mut rng);

        let (base_sender, _) = ideal_base_pair::<Gf2, Gf2_128>([1u8; 32]);
        let (_, base_receiver) = ideal_base_pair::<Gf2, Gf2_128>([2u8; 32]);
        let (cot_sender, cot_receiver) = ideal_base_pair::<Gf2, Gf2_128>([3u8; 32]);

        let mut sender = Sender::new(malicious(), base_sender, cot_sender);
        let mut receiver = Receiver::new(malicious(), base_receiver, cot_receiver);
        sender.setup_with_seed(rng.gen()).unwrap();
        receiver
            .setup_with_seed(delta, Gf2_128::rand(&mut rng), rng.gen())
            .unwrap();

        let (mut io_a, mut io_b) = duplex(8);
        let err = futures::executor::block_on(async {
            futures::try_join!(
                sender.extend(&mut io_a, 4, 16).map_err(|e| e.kind()),
                receiver.extend(&mut io_b, 4, 16).map_err(|e| e.kind())
            )
        })
        .unwrap_err();

        assert_eq!(err, AbortKind::Malicious);

        // The receiver's session is discarded after an abort.
        assert!(matches!(
            receiver.exec_counter(),
            Err(ReceiverError::StateError(_))
        ));
    }

    #[test]
    fn test_sparse_vole_sender_sees_eof_on_check_failure() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let delta = Gf2_128::rand(&mut rng);

        let (base_sender, _) = ideal_base_pair::<Gf2, Gf2_128>([4u8; 32]);
        let (_, base_receiver) = ideal_base_pair::<Gf2, Gf2_128>([5u8; 32]);
        let (cot_sender, cot_receiver) = ideal_base_pair::<Gf2, Gf2_128>([6u8; 32]);

        let mut sender = Sender::new(malicious(), base_sender, cot_sender);
        let mut receiver = Receiver::new(malicious(), base_receiver, cot_receiver);
        sender.setup_with_seed(rng.gen()).unwrap();
        receiver
            .setup_with_seed(delta, Gf2_128::rand(&mut rng), rng.gen())
            .unwrap();

        let (mut io_a, io_b) = duplex(8);
        let (sender_result, receiver_result) = futures::executor::block_on(async {
            futures::join!(sender.extend(&mut io_a, 4, 16), async {
                // The receiver closes its end once the check fails.
                let mut io_b = io_b;
                receiver.extend(&mut io_b, 4, 16).await
            })
        });

        assert_eq!(receiver_result.unwrap_err().kind(), AbortKind::Malicious);
        match sender_result.unwrap_err() {
            SenderError::IOError(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            e => panic!("expected an IO error, got {e:?}"),
        }
    }

    #[test]
    fn test_sparse_vole_receiver_output_hides_alpha() {
        let mut outputs = Vec::new();

        for alphas in [[0, 1, 2], [15, 7, 2]] {
            let mut s = session::<Gf2, Gf2_128>(SpcgConfig::default(), 8);
            let (mut io_a, mut io_b) = (s.sender_io, s.receiver_io);

            let (_, receiver_output) = futures::executor::block_on(async {
                futures::try_join!(
                    s.sender
                        .extend_with_alphas(&mut io_a, &alphas, 16)
                        .map_err(|e| e.kind()),
                    s.receiver.extend(&mut io_b, 3, 16).map_err(|e| e.kind())
                )
            })
            .unwrap();

            outputs.push(receiver_output);
        }

        assert_eq!(outputs[0], outputs[1]);
    }

    #[tokio::test]
    async fn test_sparse_vole_tokio() {
        let (base_sender, base_receiver) = ideal_base_pair::<Gf2_128, Gf2_128>([9u8; 32]);
        let (cot_sender, cot_receiver) = ideal_base_pair::<Gf2, Gf2_128>([10u8; 32]);

        let mut sender = Sender::new(malicious(), base_sender, cot_sender);
        let mut receiver = Receiver::new(malicious(), base_receiver, cot_receiver);
        sender.setup().unwrap();
        receiver.setup(None).unwrap();
        let delta = receiver.delta().unwrap();

        let (mut io_a, mut io_b) = duplex(8);
        let receiver_task = tokio::spawn(async move {
            let output = receiver.extend(&mut io_b, 8, 128).await.unwrap();
            (receiver, output)
        });

        let sender_output = sender.extend(&mut io_a, 8, 128).await.unwrap();
        let (receiver, receiver_output) = receiver_task.await.unwrap();

        assert_correlated(delta, &sender_output, &receiver_output);
        assert_eq!(receiver.exec_counter().unwrap(), 1);
        assert_eq!(sender.config().unwrap().max_batch_num(), 1 << 10);
    }
}
