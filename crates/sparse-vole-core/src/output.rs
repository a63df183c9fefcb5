//! Outputs of the single-point correlation generator.

use serde::{Deserialize, Serialize};
use sparse_fields::{ExtensionField, Field};

/// The sender's output of one single-point correlation.
///
/// The sender's sparse vector is `u = β·e_α`. Together with the receiver's
/// output `v` and global key `Δ` it satisfies `v[i] = w[i] + Δ·u[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SenderOutput<S: Field, F: Field> {
    /// The position of the non-zero entry.
    pub alpha: usize,
    /// The non-zero entry.
    pub beta: S,
    /// The sender's pad vector.
    pub w: Vec<F>,
}

impl<S: Field, F: Field> SenderOutput<S, F> {
    /// Returns the length of the vector.
    pub fn len(&self) -> usize {
        self.w.len()
    }

    /// Returns `true` if the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }

    /// Returns the sparse vector `u`, zero everywhere except `u[alpha] = beta`.
    pub fn point_vector(&self) -> Vec<S> {
        let mut u = vec![S::zero(); self.w.len()];
        u[self.alpha] = self.beta;
        u
    }
}

/// The receiver's output of one single-point correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReceiverOutput<F: Field> {
    /// The receiver's vector.
    pub v: Vec<F>,
}

impl<F: Field> ReceiverOutput<F> {
    /// Returns the length of the vector.
    pub fn len(&self) -> usize {
        self.v.len()
    }

    /// Returns `true` if the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}

/// Returns `true` if `v[i] = w[i] + Δ·u[i]` holds at every position.
pub fn is_correlated<S: Field, F: ExtensionField<S>>(
    delta: F,
    sender: &SenderOutput<S, F>,
    receiver: &ReceiverOutput<F>,
) -> bool {
    sender.w.len() == receiver.v.len()
        && sender.alpha < sender.w.len()
        && !sender.beta.is_zero()
        && sender
            .point_vector()
            .into_iter()
            .zip(sender.w.iter().zip(&receiver.v))
            .all(|(u, (&w, &v))| v == w + F::mixed_mul(u, delta))
}

/// An ordered batch of single-point correlations sharing one global key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput<T> {
    outputs: Vec<T>,
}

impl<T> BatchOutput<T> {
    /// Creates a new batch.
    pub fn new(outputs: Vec<T>) -> Self {
        Self { outputs }
    }

    /// Returns the number of instances.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Returns an iterator over the instances.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.outputs.iter()
    }

    /// Returns the instances as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.outputs
    }

    /// Returns the instances.
    pub fn into_inner(self) -> Vec<T> {
        self.outputs
    }

    /// Splits the batch at `at`, returning the instances `[at, len)`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn split_off(&mut self, at: usize) -> Self {
        Self {
            outputs: self.outputs.split_off(at),
        }
    }

    /// Appends the instances of `other`, preserving order.
    pub fn append(&mut self, other: &mut Self) {
        self.outputs.append(&mut other.outputs);
    }

    /// Keeps only the first `k` instances.
    pub fn reduce(&mut self, k: usize) {
        self.outputs.truncate(k);
    }
}

impl<T> Default for BatchOutput<T> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
        }
    }
}

impl<T> IntoIterator for BatchOutput<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a BatchOutput<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.iter()
    }
}

impl<T> std::ops::Index<usize> for BatchOutput<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.outputs[index]
    }
}
