use enum_try_as_inner::EnumTryAsInner;
use futures_util::SinkExt;
use rand::{thread_rng, Rng};
use sparse_core::Block;
use sparse_fields::{ExtensionField, Field, Gf2, Gf2_128};
use sparse_vole_core::{
    base::{BaseCorrelationSender, SenderBaseBatch},
    msgs::Message,
    sender_state as state, BatchOutput, Sender as SenderCore, SenderOutput, SpcgConfig,
};
use tracing::{debug, instrument, Level};

use crate::{
    check_sizes,
    io::{Duplex, ExpectStreamExt},
    SenderError,
};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State<S: Field, F: Field> {
    Initialized(SenderCore<state::Initialized>),
    Extension(SenderCore<state::Extension<S, F>>),
    Error,
}

impl<S: Field, F: Field> From<StateError<S, F>> for SenderError {
    fn from(err: StateError<S, F>) -> Self {
        SenderError::StateError(err.to_string())
    }
}

/// Single-point correlation generator sender.
///
/// The sender learns the punctured position, the scaling value and the pad vector
/// of every instance.
#[derive(Debug)]
pub struct Sender<S: Field, F: Field, B, C> {
    state: State<S, F>,
    base: B,
    cot: C,
}

impl<S, F, B, C> Sender<S, F, B, C>
where
    S: Field,
    F: ExtensionField<S>,
    B: BaseCorrelationSender<S, F>,
    C: BaseCorrelationSender<Gf2, Gf2_128>,
{
    /// Creates a new sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The generator configuration, shared with the receiver.
    /// * `base` - The source of base correlations.
    /// * `cot` - The source of random COTs for the puncture, on the choice side.
    pub fn new(config: SpcgConfig, base: B, cot: C) -> Self {
        Self {
            state: State::Initialized(SenderCore::new(config)),
            base,
            cot,
        }
    }

    /// Returns the sender's configuration.
    pub fn config(&self) -> Result<&SpcgConfig, SenderError> {
        match &self.state {
            State::Initialized(sender) => Ok(sender.config()),
            State::Extension(sender) => Ok(sender.config()),
            State::Error => Err(SenderError::StateError(
                "sender not in error state".to_string(),
            )),
        }
    }

    /// Sets up the sender and its correlation sources.
    pub fn setup(&mut self) -> Result<(), SenderError> {
        self.setup_with_seed(thread_rng().gen())
    }

    /// Sets up the sender with the given PRG seed.
    pub fn setup_with_seed(&mut self, seed: Block) -> Result<(), SenderError> {
        let sender = std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let config = sender.config();
        let degree = <F as ExtensionField<S>>::DEGREE;
        let check_num = if config.malicious() { degree } else { 0 };

        self.base.init(config.max_batch_num() + check_num)?;
        self.cot.init(config.max_batch_num() * config.max_depth())?;

        self.state = State::Extension(sender.setup::<S, F>(seed));

        debug!("sender setup complete");

        Ok(())
    }

    /// Returns the number of completed extensions.
    pub fn exec_counter(&self) -> Result<u64, SenderError> {
        Ok(self.state.try_as_extension()?.exec_counter())
    }

    /// Produces `batch_num` single-point correlations of length `each_num` at
    /// uniformly random positions.
    ///
    /// # Arguments
    ///
    /// * `io` - The channel to the receiver.
    /// * `batch_num` - The number of instances.
    /// * `each_num` - The length of each vector, a power of two.
    ///
    /// See [`Sender::extend_with_base`] for how aborts surface in malicious mode.
    pub async fn extend<Io: Duplex<Message<S, F>>>(
        &mut self,
        io: &mut Io,
        batch_num: usize,
        each_num: usize,
    ) -> Result<BatchOutput<SenderOutput<S, F>>, SenderError> {
        check_sizes(self.config()?, batch_num, each_num).map_err(SenderError::InvalidInput)?;

        let alphas = self
            .state
            .try_as_extension_mut()?
            .sample_alphas(batch_num, each_num)?;

        self.extend_with_alphas(io, &alphas, each_num).await
    }

    /// Produces one single-point correlation of length `each_num` per entry of
    /// `alphas`, punctured at that position.
    ///
    /// Requests larger than the configured batch limit are split into sequential
    /// sub-batches whose outputs are concatenated in order.
    pub async fn extend_with_alphas<Io: Duplex<Message<S, F>>>(
        &mut self,
        io: &mut Io,
        alphas: &[usize],
        each_num: usize,
    ) -> Result<BatchOutput<SenderOutput<S, F>>, SenderError> {
        let config = self.config()?;
        check_sizes(config, alphas.len(), each_num).map_err(SenderError::InvalidInput)?;

        if let Some(alpha) = alphas.iter().find(|&&alpha| alpha >= each_num) {
            return Err(SenderError::InvalidInput(format!(
                "punctured position below {each_num}, got {alpha}"
            )));
        }

        let max_batch_num = config.max_batch_num();
        let check_num = self.state.try_as_extension()?.check_base_num();
        let h = each_num.trailing_zeros() as usize;

        let mut output = BatchOutput::default();
        for chunk in alphas.chunks(max_batch_num) {
            let result = self.draw(chunk.len(), check_num, h);
            let (base, cots) = match result {
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

    /// Produces one single-point correlation per entry of `alphas` from the given
    /// base correlations and COTs.
    ///
    /// # Arguments
    ///
    /// * `io` - The channel to the receiver.
    /// * `alphas` - The punctured position of each instance.
    /// * `each_num` - The length of each vector, a power of two.
    /// * `base` - One non-zero base correlation per instance, followed by the
    ///   correlations for the consistency check in malicious mode.
    /// * `cots` - The random COTs, `log2(each_num)` per instance.
    ///
    /// # Aborts
    ///
    /// A receiver whose consistency check fails closes the channel without sending
    /// its opening. In malicious mode a [`SenderError::IOError`] (including
    /// [`std::io::ErrorKind::UnexpectedEof`]) raised after the challenge was sent
    /// must therefore be treated as a possible malicious abort, not a transport fault.
    #[instrument(
        level = Level::DEBUG,
        skip_all,
        fields(batch_num = alphas.len(), each_num = each_num),
        err
    )]
    pub async fn extend_with_base<Io: Duplex<Message<S, F>>>(
        &mut self,
        io: &mut Io,
        alphas: &[usize],
        each_num: usize,
        base: SenderBaseBatch<S, F>,
        cots: SenderBaseBatch<Gf2, Gf2_128>,
    ) -> Result<BatchOutput<SenderOutput<S, F>>, SenderError> {
        let mut sender = std::mem::replace(&mut self.state, State::Error).try_into_extension()?;

        let mask = sender.extend(alphas, each_num, base, cots)?;
        io.send(Message::MaskBits(mask)).await?;

        let keys = io.expect_next().await?.try_into_level_keys()?;
        let corrections = io.expect_next().await?.try_into_corrections()?;
        sender.receive_keys(keys, corrections)?;

        debug!("extension complete");

        let output = if sender.config().malicious() {
            let (seed, correction) = sender.check_challenge()?;
            io.send(Message::CheckSeed(seed)).await?;
            io.send(Message::CheckCorrection(correction)).await?;

            let commitment = io.expect_next().await?.try_into_check_commitment()?;
            let value = sender.check_respond(commitment)?;
            io.send(Message::CheckValue(value)).await?;

            let opening = io.expect_next().await?.try_into_check_opening()?;
            let output = sender.check_verify(opening)?;

            debug!("consistency check passed");

            output
        } else {
            sender.finalize()?
        };

        self.state = State::Extension(sender);

        Ok(output)
    }

    fn draw(
        &mut self,
        batch_num: usize,
        check_num: usize,
        h: usize,
    ) -> Result<(SenderBaseBatch<S, F>, SenderBaseBatch<Gf2, Gf2_128>), SenderError> {
        let mut base = self.base.extend_non_zero(batch_num)?;
        if check_num > 0 {
            base.append(&mut self.base.extend(check_num)?);
        }
        let cots = self.cot.extend(batch_num * h)?;

        Ok((base, cots))
    }
}
