//! Base correlation oracle interface.
//!
//! A base correlation is a pair `(x, t)` held by the sender and a value
//! `q = Δ·x + t` held by the receiver, where `Δ` is the receiver's global key.

use serde::{Deserialize, Serialize};
use sparse_fields::{ExtensionField, Field};

/// Errors that can occur when using a base correlation oracle.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum BaseError {
    #[error("base correlation oracle is not initialized")]
    NotInitialized,
    #[error("base correlation oracle is already initialized")]
    AlreadyInitialized,
    #[error("requested {requested} correlations, the limit is {limit}")]
    ExceedsLimit { requested: usize, limit: usize },
    #[error("failed to sample a non-zero value")]
    Sampling,
}

/// A batch of base correlations held by the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SenderBaseBatch<S: Field, F: Field> {
    /// The sender's scaling values.
    pub xs: Vec<S>,
    /// The sender's pads.
    pub ts: Vec<F>,
}

impl<S: Field, F: Field> SenderBaseBatch<S, F> {
    /// Creates a new batch.
    ///
    /// # Panics
    ///
    /// Panics if `xs` and `ts` differ in length.
    pub fn new(xs: Vec<S>, ts: Vec<F>) -> Self {
        assert_eq!(xs.len(), ts.len(), "xs and ts must have the same length");
        Self { xs, ts }
    }

    /// Returns the number of correlations in the batch.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Drops every correlation after the first `k`.
    pub fn reduce(&mut self, k: usize) {
        self.xs.truncate(k);
        self.ts.truncate(k);
    }

    /// Splits the batch at `at`, returning the correlations `[at, len)`.
    pub fn split_off(&mut self, at: usize) -> Self {
        Self {
            xs: self.xs.split_off(at),
            ts: self.ts.split_off(at),
        }
    }

    /// Appends the correlations of `other`, preserving order.
    pub fn append(&mut self, other: &mut Self) {
        self.xs.append(&mut other.xs);
        self.ts.append(&mut other.ts);
    }
}

/// A batch of base correlations held by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReceiverBaseBatch<F: Field> {
    /// The receiver's values `q = Δ·x + t`.
    pub qs: Vec<F>,
}

impl<F: Field> ReceiverBaseBatch<F> {
    /// Creates a new batch.
    pub fn new(qs: Vec<F>) -> Self {
        Self { qs }
    }

    /// Returns the number of correlations in the batch.
    pub fn len(&self) -> usize {
        self.qs.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.qs.is_empty()
    }

    /// Drops every correlation after the first `k`.
    pub fn reduce(&mut self, k: usize) {
        self.qs.truncate(k);
    }

    /// Splits the batch at `at`, returning the correlations `[at, len)`.
    pub fn split_off(&mut self, at: usize) -> Self {
        Self {
            qs: self.qs.split_off(at),
        }
    }

    /// Appends the correlations of `other`, preserving order.
    pub fn append(&mut self, other: &mut Self) {
        self.qs.append(&mut other.qs);
    }
}

/// The sender side of a base correlation oracle.
///
/// Correlations are produced in order and must never be handed out twice.
pub trait BaseCorrelationSender<S: Field, F: ExtensionField<S>> {
    /// Initializes the oracle, bounding the size of a single request.
    fn init(&mut self, max_batch_size: usize) -> Result<(), BaseError>;

    /// Returns `count` correlations with uniformly random `x`.
    fn extend(&mut self, count: usize) -> Result<SenderBaseBatch<S, F>, BaseError>;

    /// Returns `count` correlations with uniformly random non-zero `x`.
    fn extend_non_zero(&mut self, count: usize) -> Result<SenderBaseBatch<S, F>, BaseError>;
}

/// The receiver side of a base correlation oracle.
pub trait BaseCorrelationReceiver<S: Field, F: ExtensionField<S>> {
    /// Initializes the oracle with the global key `delta`, bounding the size of a
    /// single request.
    fn init(&mut self, delta: F, max_batch_size: usize) -> Result<(), BaseError>;

    /// Returns the global key.
    fn delta(&self) -> Result<F, BaseError>;

    /// Returns `count` correlations matching the sender's [`extend`](BaseCorrelationSender::extend).
    fn extend(&mut self, count: usize) -> Result<ReceiverBaseBatch<F>, BaseError>;

    /// Returns `count` correlations matching the sender's
    /// [`extend_non_zero`](BaseCorrelationSender::extend_non_zero).
    fn extend_non_zero(&mut self, count: usize) -> Result<ReceiverBaseBatch<F>, BaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparse_fields::{Gf2, Gf2_128};

    fn batch(n: u128) -> SenderBaseBatch<Gf2, Gf2_128> {
        SenderBaseBatch::new(
            (0..n).map(|i| Gf2::new(i % 2 == 0)).collect(),
            (0..n).map(Gf2_128::new).collect(),
        )
    }

    #[test]
    fn test_split_append_roundtrip() {
        let original = batch(10);

        let mut head = original.clone();
        let mut tail = head.split_off(4);
        assert_eq!(head.len(), 4);
        assert_eq!(tail.len(), 6);
        assert_eq!(tail.ts[0], Gf2_128::new(4));

        head.append(&mut tail);
        assert!(tail.is_empty());
        assert_eq!(head, original);
    }

    #[test]
    fn test_reduce() {
        let mut b = batch(10);
        b.reduce(3);
        assert_eq!(b, batch(3));

        let mut q = ReceiverBaseBatch::new(vec![Gf2_128::one(); 5]);
        q.reduce(8);
        assert_eq!(q.len(), 5);
        q.reduce(0);
        assert!(q.is_empty());
    }
}
