//! Single-point correlation generator sender.
//!
//! The sender chooses the punctured position `α` of every instance and learns the
//! pad vector `w`, while its scaling value `β` is taken from a base correlation.

use rand::{Rng, SeedableRng};
use sparse_core::{hash::Hash, prg::Prg, serialize::CanonicalSerialize, Block};
use sparse_fields::{compose_full, ExtensionField, Field, Gf2, Gf2_128};

use crate::{
    base::SenderBaseBatch,
    check,
    config::SpcgConfig,
    dpprf::{Evaluator, PendingPuncture},
    error::SenderError,
    msgs::{
        CheckCommitment, CheckCorrection, CheckOpening, CheckSeed, CheckValue, Corrections,
        LevelKeys, MaskBits,
    },
    output::{BatchOutput, SenderOutput},
    single::complete_sender_vector,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Single-point correlation generator sender.
#[derive(Debug)]
pub struct Sender<T: state::State = state::Initialized> {
    config: SpcgConfig,
    state: T,
}

impl Sender {
    /// Creates a new sender.
    pub fn new(config: SpcgConfig) -> Self {
        Sender {
            config,
            state: state::Initialized::default(),
        }
    }

    /// Completes the setup phase of the protocol.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed of the sender's PRG.
    pub fn setup<S: Field, F: ExtensionField<S>>(
        self,
        seed: Block,
    ) -> Sender<state::Extension<S, F>> {
        let evaluator = Evaluator::new(self.config.max_batch_num(), self.config.max_each_num());

        Sender {
            config: self.config,
            state: state::Extension {
                evaluator,
                prg: Prg::from_seed(seed),
                exec_counter: 0,
                phase: state::Phase::Idle,
            },
        }
    }
}

impl<T: state::State> Sender<T> {
    /// Returns the sender's configuration.
    pub fn config(&self) -> &SpcgConfig {
        &self.config
    }
}

impl<S: Field, F: ExtensionField<S>> Sender<state::Extension<S, F>> {
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

    /// Samples `batch_num` uniformly random punctured positions below `each_num`.
    pub fn sample_alphas(
        &mut self,
        batch_num: usize,
        each_num: usize,
    ) -> Result<Vec<usize>, SenderError> {
        if each_num == 0 {
            return Err(SenderError::InvalidInput(
                "a non-zero vector length".to_string(),
            ));
        }

        Ok((0..batch_num)
            .map(|_| self.state.prg.gen_range(0..each_num))
            .collect())
    }

    /// Starts an extension of one instance per entry of `alphas`.
    ///
    /// Returns the mask bits for the receiver.
    ///
    /// # Arguments
    ///
    /// * `alphas` - The punctured position of each instance.
    /// * `each_num` - The length of each vector, a power of two.
    /// * `base` - One base correlation per instance, followed by
    ///   [`check_base_num`](Self::check_base_num) correlations for the check.
    /// * `cots` - The random COTs for the puncture, `log2(each_num)` per instance.
    pub fn extend(
        &mut self,
        alphas: &[usize],
        each_num: usize,
        mut base: SenderBaseBatch<S, F>,
        cots: SenderBaseBatch<Gf2, Gf2_128>,
    ) -> Result<MaskBits, SenderError> {
        if !matches!(self.state.phase, state::Phase::Idle) {
            return Err(SenderError::InvalidState(
                "no extension in progress".to_string(),
            ));
        }

        let batch_num = alphas.len();
        let expected = batch_num + self.check_base_num();
        if base.len() != expected {
            return Err(SenderError::InvalidLength(format!(
                "{expected} base correlations, got {}",
                base.len()
            )));
        }

        if base.xs[..batch_num].iter().any(|beta| beta.is_zero()) {
            return Err(SenderError::ZeroScalingValue);
        }

        let check_base = self.config.malicious().then(|| base.split_off(batch_num));

        let choices: Vec<bool> = cots.xs.iter().map(|c| c.bit()).collect();
        let ts: Vec<Block> = cots.ts.into_iter().map(Block::from).collect();

        let (pending, mask) = self
            .state
            .evaluator
            .request(alphas, each_num, &choices, &ts)?;

        let mut transcript = blake3::Hasher::new();
        transcript.update(&mask.to_bytes());

        self.state.phase = state::Phase::Punctured(state::Punctured {
            pending,
            alphas: alphas.to_vec(),
            base,
            check_base,
            transcript,
        });

        tracing::trace!(batch_num, each_num, "sent mask bits");

        Ok(mask)
    }

    /// Completes the extension with the receiver's level keys and corrections.
    pub fn receive_keys(
        &mut self,
        keys: LevelKeys,
        corrections: Corrections<F>,
    ) -> Result<(), SenderError> {
        let state::Punctured {
            pending,
            alphas,
            base,
            check_base,
            mut transcript,
        } = match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned) {
            state::Phase::Punctured(punctured) => punctured,
            phase => {
                self.state.phase = phase;
                return Err(SenderError::InvalidState(
                    "extension in progress".to_string(),
                ))
            }
        };

        if corrections.ds.len() != alphas.len() {
            return Err(SenderError::InvalidLength(format!(
                "{} corrections, got {}",
                alphas.len(),
                corrections.ds.len()
            )));
        }

        transcript.update(&keys.to_bytes());
        transcript.update(&corrections.to_bytes());

        let trees = self.state.evaluator.finish(pending, keys)?;

        let SenderBaseBatch { xs, ts } = base;

        let complete = |((((tree, alpha), beta), t), d): ((((Vec<Block>, usize), S), F), F)| {
            let mut w: Vec<F> = tree.into_iter().map(F::from).collect();
            complete_sender_vector(&mut w, alpha, t, d);
            SenderOutput { alpha, beta, w }
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let outputs = trees
                    .into_par_iter()
                    .zip(alphas)
                    .zip(xs)
                    .zip(ts)
                    .zip(corrections.ds)
                    .map(complete)
                    .collect();
            } else {
                let outputs = trees
                    .into_iter()
                    .zip(alphas)
                    .zip(xs)
                    .zip(ts)
                    .zip(corrections.ds)
                    .map(complete)
                    .collect();
            }
        }

        self.state.phase = state::Phase::Extended(state::Extended {
            outputs,
            check_base,
            transcript: *transcript.finalize().as_bytes(),
        });

        tracing::trace!("completed sender vectors");

        Ok(())
    }

    /// Returns the outputs of the current extension without a consistency check.
    ///
    /// Only allowed in semi-honest mode.
    pub fn finalize(&mut self) -> Result<BatchOutput<SenderOutput<S, F>>, SenderError> {
        if self.config.malicious() {
            return Err(SenderError::InvalidState(
                "consistency check before output".to_string(),
            ));
        }

        let state::Extended { outputs, .. } = self.take_extended()?;

        self.state.exec_counter += 1;
        self.state.phase = state::Phase::Idle;

        Ok(BatchOutput::new(outputs))
    }

    /// Starts the consistency check.
    ///
    /// Returns the check seed and the masked decomposition `x*` of the sender's
    /// combined scaling values.
    pub fn check_challenge(&mut self) -> Result<(CheckSeed, CheckCorrection<S>), SenderError> {
        if !self.config.malicious() {
            return Err(SenderError::InvalidState(
                "malicious mode for the consistency check".to_string(),
            ));
        }

        let state::Extended {
            outputs,
            check_base,
            transcript,
        } = self.take_extended()?;

        let check_base = check_base.ok_or_else(|| {
            SenderError::InvalidState("base correlations for the check".to_string())
        })?;

        let seed = self.state.prg.random_block();

        let (sum_w, c) =
            check::sender_combine(seed, &transcript, self.state.exec_counter, &outputs);

        // x*_k = c_k - x_k
        let x_star: Vec<S> = c
            .decompose()
            .into_iter()
            .zip(&check_base.xs)
            .map(|(c, &x)| c - x)
            .collect();

        let v_a = sum_w - compose_full::<S, F>(&check_base.ts);

        self.state.phase = state::Phase::Challenged { outputs, v_a };

        tracing::trace!(exec = self.state.exec_counter, "sent check challenge");

        Ok((CheckSeed { seed }, CheckCorrection { x_star }))
    }

    /// Receives the receiver's commitment and reveals the sender's check value.
    pub fn check_respond(
        &mut self,
        commitment: CheckCommitment,
    ) -> Result<CheckValue<F>, SenderError> {
        let (outputs, v_a) = match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned)
        {
            state::Phase::Challenged { outputs, v_a } => (outputs, v_a),
            phase => {
                self.state.phase = phase;
                return Err(SenderError::InvalidState(
                    "consistency check challenge sent".to_string(),
                ))
            }
        };

        self.state.phase = state::Phase::Responded {
            outputs,
            v_a,
            commitment: commitment.commitment,
        };

        Ok(CheckValue { v: v_a })
    }

    /// Verifies the opening of the receiver's commitment and returns the outputs.
    pub fn check_verify(
        &mut self,
        opening: CheckOpening<F>,
    ) -> Result<BatchOutput<SenderOutput<S, F>>, SenderError> {
        let (outputs, v_a, commitment) =
            match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned) {
                state::Phase::Responded {
                    outputs,
                    v_a,
                    commitment,
                } => (outputs, v_a, commitment),
                phase => {
                    self.state.phase = phase;
                    return Err(SenderError::InvalidState(
                        "consistency check value sent".to_string(),
                    ))
                }
            };

        opening.decommitment.verify(&commitment)?;

        if *opening.decommitment.data() != v_a {
            tracing::warn!("receiver opened a check value different from the sender's");
            return Err(SenderError::ConsistencyCheckFailed);
        }

        self.state.exec_counter += 1;
        self.state.phase = state::Phase::Idle;

        Ok(BatchOutput::new(outputs))
    }

    fn take_extended(&mut self) -> Result<state::Extended<S, F>, SenderError> {
        match std::mem::replace(&mut self.state.phase, state::Phase::Poisoned) {
            state::Phase::Extended(extended) => Ok(extended),
            phase => {
                self.state.phase = phase;
                Err(SenderError::InvalidState("completed extension".to_string()))
            }
        }
    }

    /// Adds `error` to `w_j[i]` of the pending outputs.
    #[cfg(test)]
    pub(crate) fn tamper(&mut self, j: usize, i: usize, error: F) {
        if let state::Phase::Extended(extended) = &mut self.state.phase {
            extended.outputs[j].w[i] += error;
        }
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl<S: sparse_fields::Field, F: sparse_fields::Field> Sealed for super::Extension<S, F> {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    #[derive(Default)]
    pub struct Initialized {}

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender's state after the setup phase.
    ///
    /// In this state the sender performs extensions, potentially multiple times.
    pub struct Extension<S: Field, F: Field> {
        /// The DPPRF evaluator.
        pub(super) evaluator: Evaluator,
        /// A PRG to sample positions and check seeds.
        pub(super) prg: Prg,
        /// Current execution counter.
        pub(super) exec_counter: u64,
        /// Progress of the current extension.
        pub(super) phase: Phase<S, F>,
    }

    impl<S: Field, F: Field> State for Extension<S, F> {}

    impl<S: Field, F: Field> std::fmt::Debug for Extension<S, F> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("Extension { .. }")
        }
    }

    pub(super) struct Punctured<S: Field, F: Field> {
        pub(super) pending: PendingPuncture,
        pub(super) alphas: Vec<usize>,
        pub(super) base: SenderBaseBatch<S, F>,
        pub(super) check_base: Option<SenderBaseBatch<S, F>>,
        pub(super) transcript: blake3::Hasher,
    }

    pub(super) struct Extended<S: Field, F: Field> {
        pub(super) outputs: Vec<SenderOutput<S, F>>,
        pub(super) check_base: Option<SenderBaseBatch<S, F>>,
        pub(super) transcript: [u8; 32],
    }

    pub(super) enum Phase<S: Field, F: Field> {
        Idle,
        Punctured(Punctured<S, F>),
        Extended(Extended<S, F>),
        Challenged {
            outputs: Vec<SenderOutput<S, F>>,
            v_a: F,
        },
        Responded {
            outputs: Vec<SenderOutput<S, F>>,
            v_a: F,
            commitment: Hash,
        },
        // A round failed, the extension cannot be resumed.
        Poisoned,
    }
}
