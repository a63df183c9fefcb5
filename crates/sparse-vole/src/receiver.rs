use enum_try_as_inner::EnumTryAsInner;
use futures_util::SinkExt;
use rand::{thread_rng, Rng};
use sparse_core::Block;
use sparse_fields::{ExtensionField, Field, Gf2, Gf2_128, UniformRand};
use sparse_vole_core::{
    base::{BaseCorrelationReceiver, ReceiverBaseBatch},
    msgs::Message,
    receiver_state as state, BatchOutput, Receiver as ReceiverCore, ReceiverOutput, SpcgConfig,
};
use tracing::{debug, instrument, Level};

use crate::{
    check_sizes,
    io::{Duplex, ExpectStreamExt},
    ReceiverError,
};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State<S: Field, F: Field> {
    Initialized(ReceiverCore<state::Initialized>),
    Extension(ReceiverCore<state::Extension<S, F>>),
    Error,
}

impl<S: Field, F: Field> From<StateError<S, F>> for ReceiverError {
    fn from(err: StateError<S, F>) -> Self {
        ReceiverError::StateError(err.to_string())
    }
}

/// Single-point correlation generator receiver.
///
/// The receiver holds the global key and learns the full vector of every instance.
#[derive(Debug)]
pub struct Receiver<S: Field, F: Field, B, C> {
    state: State<S, F>,
    base: B,
    cot: C,
}

impl<S, F, B, C> Receiver<S, F, B, C>
where
    S: Field,
    F: ExtensionField<S>,
    B: BaseCorrelationReceiver<S, F>,
    C: BaseCorrelationReceiver<Gf2, Gf2_128>,
{
    /// Creates a new receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The generator configuration, shared with the sender.
    /// * `base` - The source of base correlations.
    /// * `cot` - The source of random COTs for the puncture, on the key side.
    pub fn new(config: SpcgConfig, base: B, cot: C) -> Self {
        Self {
            state: State::Initialized(ReceiverCore::new(config)),
            base,
            cot,
        }
    }

    /// Returns the receiver's configuration.
    pub fn config(&self) -> Result<&SpcgConfig, ReceiverError> {
        match &self.state {
            State::Initialized(receiver) => Ok(receiver.config()),
            State::Extension(receiver) => Ok(receiver.config()),
            State::Error => Err(ReceiverError::StateError(
                "receiver not in error state".to_string(),
            )),
        }
    }

    /// Returns the global key.
    pub fn delta(&self) -> Result<F, ReceiverError> {
        Ok(self.state.try_as_extension()?.delta())
    }

    /// Sets up the receiver and its correlation sources.
    ///
    /// # Arguments
    ///
    /// * `delta` - The global key, sampled at random if `None`.
    pub fn setup(&mut self, delta: Option<F>) -> Result<(), ReceiverError> {
        let mut rng = thread_rng();
        let delta = delta.unwrap_or_else(|| F::rand(&mut rng));
        let cot_delta = Gf2_128::rand(&mut rng);

        self.setup_with_seed(delta, cot_delta, rng.gen())
    }

    /// Sets up the receiver with the given global keys and PRG seed.
    pub fn setup_with_seed(
        &mut self,
        delta: F,
        cot_delta: Gf2_128,
        seed: Block,
    ) -> Result<(), ReceiverError> {
        let receiver =
            std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let config = receiver.config();
        let degree = <F as ExtensionField<S>>::DEGREE;
        let check_num = if config.malicious() { degree } else { 0 };

        self.base.init(delta, config.max_batch_num() + check_num)?;
        self.cot
            .init(cot_delta, config.max_batch_num() * config.max_depth())?;

        self.state = State::Extension(receiver.setup::<S, F>(delta, cot_delta, seed));

        debug!("receiver setup complete");

        Ok(())
    }

    /// Returns the number of completed extensions.
    pub fn exec_counter(&self) -> Result<u64, ReceiverError> {
        Ok(self.state.try_as_extension()?.exec_counter())
    }

    /// Produces `batch_num` single-point correlations of length `each_num`.
    ///
    /// Requests larger than the configured batch limit are split into sequential
    /// sub-batches whose outputs are concatenated in order.
    ///
    /// # Arguments
    ///
    /// * `io` - The channel to the sender.
    /// * `batch_num` - The number of instances.
    /// * `each_num` - The length of each vector, a power of two.
    pub async fn extend<Io: Duplex<Message<S, F>>>(
        &mut self,
        io: &mut Io,
        batch_num: usize,
        each_num: usize,
    ) -> Result<BatchOutput<ReceiverOutput<F>>, ReceiverError> {
        let config = self.config()?;
        check_sizes(config, batch_num, each_num).map_err(ReceiverError::InvalidInput)?;

        let max_batch_num = config.max_batch_num();
        let check_num = self.state.try_as_extension()?.check_base_num();
        let h = each_num.trailing_zeros() as usize;

        let mut output = BatchOutput::default();
        let mut remaining = batch_num;
        while remaining > 0 {
            let chunk = remaining.min(max_batch_num);
            remaining -= chunk;

            let (base, cots) = match self.draw(chunk, check_num, h) {
                Ok(batches) => batches,
                Err(e) => {
                    self.state = State::Error;
                    return Err(e);
                }
            };

            let mut chunk_output = self.extend_with_base(io, chunk, each_num, base, cots).await?;
            output.append(&mut chunk_output);
        }

        Ok(output)
    }

    /// Produces `batch_num` single-point correlations from the given base
    /// correlations and COTs.
    ///
    /// # Arguments
    ///
    /// * `io` - The channel to the sender.
    /// * `batch_num` - The number of instances.
    /// * `each_num` - The length of each vector, a power of two.
    /// * `base` - One base correlation per instance, followed by the correlations
    ///   for the consistency check in malicious mode.
    /// * `cots` - The random COTs, `log2(each_num)` per instance.
    #[instrument(
        level = Level::DEBUG,
        skip_all,
        fields(batch_num = batch_num, each_num = each_num),
        err
    )]
    pub async fn extend_with_base<Io: Duplex<Message<S, F>>>(
        &mut self,
        io: &mut Io,
        batch_num: usize,
        each_num: usize,
        base: ReceiverBaseBatch<F>,
        cots: ReceiverBaseBatch<Gf2_128>,
    ) -> Result<BatchOutput<ReceiverOutput<F>>, ReceiverError> {
        let mut receiver =
            std::mem::replace(&mut self.state, State::Error).try_into_extension()?;

        let mask = io.expect_next().await?.try_into_mask_bits()?;
        let (keys, corrections) = receiver.extend(batch_num, each_num, base, cots, mask)?;

        io.send(Message::LevelKeys(keys)).await?;
        io.send(Message::Corrections(corrections)).await?;

        debug!("extension complete");

        let output = if receiver.config().malicious() {
            let seed = io.expect_next().await?.try_into_check_seed()?;
            let correction = io.expect_next().await?.try_into_check_correction()?;

            let commitment = receiver.check_receive(seed, correction)?;
            io.send(Message::CheckCommitment(commitment)).await?;

            let value = io.expect_next().await?.try_into_check_value()?;
            let (output, opening) = receiver.check_verify(value)?;
            io.send(Message::CheckOpening(opening)).await?;

            debug!("consistency check passed");

            output
        } else {
            receiver.finalize()?
        };

        self.state = State::Extension(receiver);

        Ok(output)
    }

    fn draw(
        &mut self,
        batch_num: usize,
        check_num: usize,
        h: usize,
    ) -> Result<(ReceiverBaseBatch<F>, ReceiverBaseBatch<Gf2_128>), ReceiverError> {
        let mut base = self.base.extend_non_zero(batch_num)?;
        if check_num > 0 {
            base.append(&mut self.base.extend(check_num)?);
        }
        let cots = self.cot.extend(batch_num * h)?;

        Ok((base, cots))
    }
}
