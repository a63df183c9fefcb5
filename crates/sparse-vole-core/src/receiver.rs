//! Single-point correlation generator receiver.
//!
//! The receiver holds the global key `Δ` and learns the full vector `v` of every
//! instance without learning the punctured position.

use rand::SeedableRng;
use sparse_core::{commit::Decommitment, prg::Prg, serialize::CanonicalSerialize, Block};
use sparse_fields::{compose_full, ExtensionField, Field, Gf2_128};

use crate::{
    base::ReceiverBaseBatch,
    check,
    config::SpcgConfig,
    dpprf::Puncturer,
    error::ReceiverError,
    msgs::{
        CheckCommitment, CheckCorrection, CheckOpening, CheckSeed, CheckValue, Corrections,
        LevelKeys, MaskBits,
    },
    output::{BatchOutput, ReceiverOutput},
    single::receiver_correction,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Single-point correlation generator receiver.
#[derive(Debug)]
pub struct Receiver<T: state::State = state::Initialized> {
    config: SpcgConfig,
    state: T,
}

impl Receiver {
    /// Creates a new receiver.
    pub fn new(config: SpcgConfig) -> Self {
        Receiver {
            config,
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `delta` - The global key of the base correlations.
    /// * `cot_delta` - The global key of the COTs used by the puncture.
    /// * `seed` - The seed of the receiver's PRG.
    pub fn setup<S: Field, F: ExtensionField<S>>(
        self,
        delta: F,
        cot_delta: Gf2_128,
        seed: Block,
    ) -> Receiver<state::Extension<S, F>> {
        let puncturer = Puncturer::new(self.config.max_batch_num(), self.config.max_each_num());

        Receiver {
            config: self.config,
            state: state::Extension {
                delta,
                cot_delta: cot_delta.into(),
                puncturer,
                prg: Prg::from_seed(seed),
                exec_counter: 0,
                phase: state::Phase::Idle,
                _pd: std::marker::PhantomData,
            },
        }
    }
}

impl<T: state::State> Receiver<T> {
    /// Returns the receiver's configuration.
    pub fn config(&self) -> &SpcgConfig {
        &self.config
    }
}

impl<S: Field, F: ExtensionField<S>> Receiver<state::Extension<S, F>> {
    /// Returns the global key.
    pub fn delta(&self) -> F {
        self.state.delta
    }

    /// Returns the number of base correlations consumed by the consistency check
    /// of each extension, zero in semi-honest mode.
    pub fn check_base_num(&self) -> usize {
        if self.config.malicious() {
            <F as ExtensionField<S>>::DEGREE
        } else {
            0
        }
    }

    /// Returns the number of completed extensions.
    pub fn exec_counter(&self) -> u64 {
        self.state.exec_counter
    }

    /// Performs an extension of `batch_num` instances of length `each_num`.
    ///
    /// Returns the level keys and corrections for the sender.
    ///
    /// # Arguments
    ///
    /// * `batch_num` - The number of instances.
    /// * `each_num` - The length of each vector, a power of two.
    /// * `base` - One base correlation per instance, followed by
    ///   [`check_base_num`](Self::check_base_num) correlations for the check.
    /// * `cots` - The random COTs for the puncture, `log2(each_num)` per instance.
    /// * `mask` - The sender's mask bits.
    pub fn extend(
        &mut self,
        batch_num: usize,
        each_num: usize,
        mut base: ReceiverBaseBatch<F>,
        cots: ReceiverBaseBatch<Gf2_128>,
        mask: MaskBits,
    ) -> Result<(LevelKeys, Corrections<F>), ReceiverError> {
        if !matches!(self.state.phase, state::Phase::Idle) {
            return Err(ReceiverError::InvalidState(
                "no extension in progress".to_string(),
            ));
        }

        let expected = batch_num + self.check_base_num();
        if base.len() != expected {
            return Err(ReceiverError::InvalidLength(format!(
                "{expected} base correlations, got {}",
                base.len()
            )));
        }

        let check_base = self.config.malicious().then(|| base.split_off(batch_num));

        let qs: Vec<Block> = cots.qs.into_iter().map(Block::from).collect();

        let (trees, keys) = self.state.puncturer.expand(
            batch_num,
            each_num,
            self.state.cot_delta,
            &qs,
            &mask,
            &mut self.state.prg,
        )?;

        let correct = |(tree, gamma): (Vec<Block>, F)| {
            let v: Vec<F> = tree.into_iter().map(F::from).collect();
            let d = receiver_correction(gamma, &v);
            (v, d)
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let (vs, ds): (Vec<_>, Vec<_>) = trees
                    .into_par_iter()
                    .zip(base.qs)
                    .map(correct)
                    .unzip();
            } else {
                let (vs, ds): (Vec<_>, Vec<_>) = trees
                    .into_iter()
                    .zip(base.qs)
                    .map(correct)
                    .unzip();
            }
        }

        let corrections = Corrections { ds };

        let mut transcript = blake3::Hasher::new();
        transcript.update(&mask.to_bytes());
        transcript.update(&keys.to_bytes());
        transcript.update(&corrections.to_bytes());

        self.state.phase = state::Phase::Extended(state::Extended {
            vs,
            check_base,
            transcript: *transcript.finalize().as_bytes(),
        });

        tracing::trace!(batch_num, each_num, "sent level keys and corrections");

        Ok((keys, corrections))
    }

    /// Returns the outputs of the current extension without a consistency check.
    ///
    /// Only allowed in semi-honest mode.
    pub fn finalize(&mut self) -> Result<BatchOutput<ReceiverOutput<F>>, ReceiverError> {
        if self.config.malicious() {
            return Err(ReceiverError::InvalidState(
                "consistency check before output".to_string(),
            ));
        }

        let state::Extended { vs, .. } = self.take_extended()?;

        self.state.exec_counter += 1;
        self.state.phase = state::Phase::Idle;

        Ok(into_outputs(vs))
    }

    /// Receives the sender's challenge and commits to the receiver's check value.
    pub fn check_receive(
        &mut self,
        seed: CheckSeed,
        correction: CheckCorrection<S>,
    ) -> Result<CheckCommitment, ReceiverError> {
        if !self.config.malicious() {
            return Err(ReceiverError::InvalidState(
                "malicious mode for the consistency check".to_string(),
            ));
        }

        let degree = <F as ExtensionField<S>>::DEGREE;
        if correction.x_star.len() != degree {
            return Err(ReceiverError::InvalidLength(format!(
                "{degree} check corrections, got {}",
                correction.x_star.len()
            )));
        }

        let state::Extended {
            vs,
            check_base,
            transcript,
        } = self.take_extended()?;

        let check_base = check_base.ok_or_else(|| {
            ReceiverError::InvalidState("base correlations for the check".to_string())
        })?;

        let sum_v = check::receiver_combine(seed.seed, &transcript, self.state.exec_counter, &vs);

        // y'_k = y_k + x*_k·Δ
        let delta = self.state.delta;
        let ys: Vec<F> = check_base
            .qs
            .iter()
            .zip(correction.x_star)
            .map(|(&y, x)| y + F::mixed_mul(x, delta))
            .collect();

        let v_b = sum_v - compose_full::<S, F>(&ys);

        let decommitment = Decommitment::new_with_rng(v_b, &mut self.state.prg);
        let commitment = decommitment.commit();

        self.state.phase = state::Phase::Committed { vs, decommitment };

        tracing::trace!(exec = self.state.exec_counter, "committed to check value");

        Ok(CheckCommitment { commitment })
    }

    /// Compares the sender's check value with the receiver's own.
    ///
    /// Returns the outputs and the opening of the receiver's commitment.
    pub fn check_verify(
        &mut self,
        value: CheckValue<F>,
    ) -> Result<(BatchOutput<ReceiverOutput<F>>, CheckOpening<F>), ReceiverError> {
        let (vs, decommitment) =
            match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned) {
                state::Phase::Committed { vs, decommitment } => (vs, decommitment),
                phase => {
                    self.state.phase = phase;
                    return Err(ReceiverError::InvalidState(
                        "consistency check commitment sent".to_string(),
                    ));
                }
            };

        if *decommitment.data() != value.v {
            tracing::warn!("sender's check value does not match the receiver's");
            return Err(ReceiverError::ConsistencyCheckFailed);
        }

        self.state.exec_counter += 1;
        self.state.phase = state::Phase::Idle;

        Ok((into_outputs(vs), CheckOpening { decommitment }))
    }

    fn take_extended(&mut self) -> Result<state::Extended<F>, ReceiverError> {
        match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned) {
            state::Phase::Extended(extended) => Ok(extended),
            phase => {
                self.state.phase = phase;
                Err(ReceiverError::InvalidState(
                    "completed extension".to_string(),
                ))
            }
        }
    }
}

fn into_outputs<F: Field>(vs: Vec<Vec<F>>) -> BatchOutput<ReceiverOutput<F>> {
    BatchOutput::new(vs.into_iter().map(|v| ReceiverOutput { v }).collect())
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl<S: sparse_fields::Field, F: sparse_fields::Field> Sealed for super::Extension<S, F> {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state after the setup phase.
    ///
    /// In this state the receiver performs extensions, potentially multiple times.
    pub struct Extension<S: Field, F: Field> {
        /// Receiver's global key.
        pub(super) delta: F,
        /// The COT global key.
        pub(super) cot_delta: Block,
        /// The DPPRF puncturer.
        pub(super) puncturer: Puncturer,
        /// A PRG to generate tree seeds and commitment nonces.
        pub(super) prg: Prg,
        /// Current execution counter.
        pub(super) exec_counter: u64,
        /// Progress of the current extension.
        pub(super) phase: Phase<F>,

        pub(super) _pd: std::marker::PhantomData<fn() -> S>,
    }

    impl<S: Field, F: Field> State for Extension<S, F> {}

    impl<S: Field, F: Field> std::fmt::Debug for Extension<S, F> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("Extension { .. }")
        }
    }

    pub(super) struct Extended<F: Field> {
        pub(super) vs: Vec<Vec<F>>,
        pub(super) check_base: Option<ReceiverBaseBatch<F>>,
        pub(super) transcript: [u8; 32],
    }

    pub(super) enum Phase<F: Field> {
        Idle,
        Extended(Extended<F>),
        Committed {
            vs: Vec<Vec<F>>,
            decommitment: Decommitment<F>,
        },
        // A round failed, the extension cannot be resumed.
        Poisoned,
    }
}
