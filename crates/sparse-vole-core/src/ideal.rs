//! Ideal functionalities.
//!
//! These are trusted-dealer stand-ins, useful for testing consumers of the
//! generator and as the base correlation oracle in tests.

use std::marker::PhantomData;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use sparse_fields::{ExtensionField, Field};

use crate::{
    base::{
        BaseCorrelationReceiver, BaseCorrelationSender, BaseError, ReceiverBaseBatch,
        SenderBaseBatch,
    },
    output::{is_correlated, BatchOutput, ReceiverOutput, SenderOutput},
};

/// Creates a pair of ideal base correlation oracles.
///
/// Both sides draw from the same seeded stream, so the receiver's values are
/// correlated with the sender's as long as both sides make the same sequence of
/// requests.
pub fn ideal_base_pair<S: Field, F: ExtensionField<S>>(
    seed: [u8; 32],
) -> (IdealBaseSender<S, F>, IdealBaseReceiver<S, F>) {
    (
        IdealBaseSender {
            rng: ChaCha12Rng::from_seed(seed),
            limit: None,
            _pd: PhantomData,
        },
        IdealBaseReceiver {
            rng: ChaCha12Rng::from_seed(seed),
            limit: None,
            delta: None,
            _pd: PhantomData,
        },
    )
}

fn check_limit(limit: Option<usize>, count: usize) -> Result<(), BaseError> {
    let limit = limit.ok_or(BaseError::NotInitialized)?;
    if count > limit {
        return Err(BaseError::ExceedsLimit {
            requested: count,
            limit,
        });
    }
    Ok(())
}

fn sample<S: Field, F: Field>(
    rng: &mut ChaCha12Rng,
    count: usize,
    non_zero: bool,
) -> Result<(Vec<S>, Vec<F>), BaseError> {
    let mut xs = Vec::with_capacity(count);
    let mut ts = Vec::with_capacity(count);
    for _ in 0..count {
        let x = if non_zero {
            S::rand_non_zero(rng).ok_or(BaseError::Sampling)?
        } else {
            S::rand(rng)
        };
        xs.push(x);
        ts.push(F::rand(rng));
    }
    Ok((xs, ts))
}

/// Ideal base correlation sender.
#[derive(Debug)]
pub struct IdealBaseSender<S, F> {
    rng: ChaCha12Rng,
    limit: Option<usize>,
    _pd: PhantomData<fn() -> (S, F)>,
}

impl<S: Field, F: ExtensionField<S>> IdealBaseSender<S, F> {
    fn next(&mut self, count: usize, non_zero: bool) -> Result<SenderBaseBatch<S, F>, BaseError> {
        check_limit(self.limit, count)?;
        let (xs, ts) = sample(&mut self.rng, count, non_zero)?;
        Ok(SenderBaseBatch::new(xs, ts))
    }
}

impl<S: Field, F: ExtensionField<S>> BaseCorrelationSender<S, F> for IdealBaseSender<S, F> {
    fn init(&mut self, max_batch_size: usize) -> Result<(), BaseError> {
        if self.limit.is_some() {
            return Err(BaseError::AlreadyInitialized);
        }
        self.limit = Some(max_batch_size);
        Ok(())
    }

    fn extend(&mut self, count: usize) -> Result<SenderBaseBatch<S, F>, BaseError> {
        self.next(count, false)
    }

    fn extend_non_zero(&mut self, count: usize) -> Result<SenderBaseBatch<S, F>, BaseError> {
        self.next(count, true)
    }
}

/// Ideal base correlation receiver.
#[derive(Debug)]
pub struct IdealBaseReceiver<S, F> {
    rng: ChaCha12Rng,
    limit: Option<usize>,
    delta: Option<F>,
    _pd: PhantomData<fn() -> S>,
}

impl<S: Field, F: ExtensionField<S>> IdealBaseReceiver<S, F> {
    fn next(&mut self, count: usize, non_zero: bool) -> Result<ReceiverBaseBatch<F>, BaseError> {
        check_limit(self.limit, count)?;
        let delta = self.delta.ok_or(BaseError::NotInitialized)?;
        let (xs, ts) = sample::<S, F>(&mut self.rng, count, non_zero)?;
        let qs = xs
            .into_iter()
            .zip(ts)
            .map(|(x, t)| F::mixed_mul(x, delta) + t)
            .collect();
        Ok(ReceiverBaseBatch::new(qs))
    }
}

impl<S: Field, F: ExtensionField<S>> BaseCorrelationReceiver<S, F> for IdealBaseReceiver<S, F> {
    fn init(&mut self, delta: F, max_batch_size: usize) -> Result<(), BaseError> {
        if self.limit.is_some() {
            return Err(BaseError::AlreadyInitialized);
        }
        self.limit = Some(max_batch_size);
        self.delta = Some(delta);
        Ok(())
    }

    fn delta(&self) -> Result<F, BaseError> {
        self.delta.ok_or(BaseError::NotInitialized)
    }

    fn extend(&mut self, count: usize) -> Result<ReceiverBaseBatch<F>, BaseError> {
        self.next(count, false)
    }

    fn extend_non_zero(&mut self, count: usize) -> Result<ReceiverBaseBatch<F>, BaseError> {
        self.next(count, true)
    }
}

/// Ideal single-point correlation generator.
#[derive(Debug)]
pub struct IdealSpcg<S, F> {
    delta: F,
    counter: usize,
    rng: ChaCha12Rng,
    _pd: PhantomData<fn() -> S>,
}

impl<S: Field, F: ExtensionField<S>> IdealSpcg<S, F> {
    /// Creates a new functionality with a random global key.
    pub fn new(seed: [u8; 32]) -> Self {
        let mut rng = ChaCha12Rng::from_seed(seed);
        let delta = F::rand(&mut rng);
        Self {
            delta,
            counter: 0,
            rng,
            _pd: PhantomData,
        }
    }

    /// Creates a new functionality with the given global key.
    pub fn new_with_delta(seed: [u8; 32], delta: F) -> Self {
        Self {
            delta,
            counter: 0,
            rng: ChaCha12Rng::from_seed(seed),
            _pd: PhantomData,
        }
    }

    /// Returns the global key.
    pub fn delta(&self) -> F {
        self.delta
    }

    /// Returns the number of vector entries produced so far.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Produces one correlation of length `each_num` per entry of `alphas`.
    ///
    /// # Panics
    ///
    /// Panics if any `alpha >= each_num`.
    pub fn extend(
        &mut self,
        alphas: &[usize],
        each_num: usize,
    ) -> (
        BatchOutput<SenderOutput<S, F>>,
        BatchOutput<ReceiverOutput<F>>,
    ) {
        let mut sender = Vec::with_capacity(alphas.len());
        let mut receiver = Vec::with_capacity(alphas.len());

        for &alpha in alphas {
            assert!(alpha < each_num, "alpha out of range");

            let beta = loop {
                if let Some(beta) = S::rand_non_zero(&mut self.rng) {
                    break beta;
                }
            };
            let w: Vec<F> = (0..each_num).map(|_| F::rand(&mut self.rng)).collect();
            let mut v = w.clone();
            v[alpha] += F::mixed_mul(beta, self.delta);

            sender.push(SenderOutput { alpha, beta, w });
            receiver.push(ReceiverOutput { v });
            self.counter += each_num;
        }

        (BatchOutput::new(sender), BatchOutput::new(receiver))
    }

    /// Produces `batch_num` correlations of length `each_num` at random positions.
    pub fn extend_random(
        &mut self,
        batch_num: usize,
        each_num: usize,
    ) -> (
        BatchOutput<SenderOutput<S, F>>,
        BatchOutput<ReceiverOutput<F>>,
    ) {
        let alphas: Vec<usize> = (0..batch_num)
            .map(|_| self.rng.gen_range(0..each_num))
            .collect();
        self.extend(&alphas, each_num)
    }

    /// Checks that every instance of the two batches is correlated under this
    /// functionality's global key.
    pub fn check(
        &self,
        sender: &BatchOutput<SenderOutput<S, F>>,
        receiver: &BatchOutput<ReceiverOutput<F>>,
    ) -> bool {
        sender.len() == receiver.len()
            && sender
                .iter()
                .zip(receiver)
                .all(|(s, r)| is_correlated(self.delta, s, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparse_fields::{Gf2, Gf2_128};

    #[test]
    fn ideal_spcg_test() {
        let mut ideal = IdealSpcg::<Gf2_128, Gf2_128>::new([0u8; 32]);

        let (sender, receiver) = ideal.extend(&[2, 3], 8);
        assert!(ideal.check(&sender, &receiver));
        assert_eq!(ideal.counter(), 16);

        let (sender, mut receiver) = ideal.extend_random(4, 16);
        assert!(ideal.check(&sender, &receiver));

        receiver.reduce(3);
        assert!(!ideal.check(&sender, &receiver));
    }

    #[test]
    fn ideal_base_pair_is_correlated() {
        let (mut sender, mut receiver) = ideal_base_pair::<Gf2, Gf2_128>([3u8; 32]);
        let delta = Gf2_128::new(0x1234);

        sender.init(16).unwrap();
        receiver.init(delta, 16).unwrap();

        let s = sender.extend_non_zero(16).unwrap();
        let r = receiver.extend_non_zero(16).unwrap();
        assert!(s.xs.iter().all(|x| !x.is_zero()));

        let s2 = sender.extend(8).unwrap();
        let r2 = receiver.extend(8).unwrap();

        for (s, r) in [(s, r), (s2, r2)] {
            for ((x, t), q) in s.xs.iter().zip(&s.ts).zip(&r.qs) {
                assert_eq!(*q, Gf2_128::mixed_mul(*x, delta) + *t);
            }
        }
    }

    #[test]
    fn ideal_base_enforces_limit() {
        let (mut sender, _) = ideal_base_pair::<Gf2_128, Gf2_128>([0u8; 32]);
        assert!(matches!(sender.extend(1), Err(BaseError::NotInitialized)));

        sender.init(4).unwrap();
        assert!(matches!(
            sender.extend(5),
            Err(BaseError::ExceedsLimit { .. })
        ));
        assert!(matches!(sender.init(4), Err(BaseError::AlreadyInitialized)));
    }
}
