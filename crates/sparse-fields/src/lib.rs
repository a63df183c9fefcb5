//! This crate provides types for working with finite fields.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

pub mod gf2;
pub mod gf2_128;

use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Mul, Neg, Sub},
};

use rand::{distributions::Standard, prelude::Distribution, CryptoRng, Rng};
use serde::{de::DeserializeOwned, Serialize};
use sparse_core::Block;

pub use gf2::Gf2;
pub use gf2_128::Gf2_128;

/// Errors that can occur when decoding field elements.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum FieldError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// A trait for finite fields.
pub trait Field:
    Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + Copy
    + Clone
    + Debug
    + 'static
    + Send
    + Sync
    + UniformRand
    + PartialEq
    + Eq
    + Serialize
    + DeserializeOwned
    + Unpin
{
    /// The number of bits of a field element.
    const BIT_SIZE: u32;

    /// The number of bytes of the fixed-width encoding.
    const BYTE_LEN: usize;

    /// Return the additive identity element.
    fn zero() -> Self;

    /// Return the multiplicative identity element.
    fn one() -> Self;

    /// Returns `true` if this is the additive identity.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Return field element as little-endian bytes, exactly `BYTE_LEN` long.
    fn to_le_bytes(&self) -> Vec<u8>;

    /// Decodes a field element from exactly `BYTE_LEN` little-endian bytes.
    fn from_le_bytes(bytes: &[u8]) -> Result<Self, FieldError>;

    /// Samples a uniformly random non-zero field element.
    ///
    /// A fixed number of candidates, `1 + ceil(64 / BIT_SIZE)`, is always drawn and
    /// the first non-zero one is returned, so the running time does not depend on
    /// how many candidates were rejected. Returns `None` with probability at most `2^-64`.
    fn rand_non_zero<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Option<Self> {
        let attempts = 1 + (64 + Self::BIT_SIZE - 1) / Self::BIT_SIZE;

        let mut out = None;
        for _ in 0..attempts {
            let candidate = Self::rand(rng);
            if out.is_none() && !candidate.is_zero() {
                out = Some(candidate);
            }
        }

        out
    }
}

/// A field `Self` which is an extension of the subfield `S`.
///
/// Elements of `Self` are written in the power basis `g_k = X^(k * S::BIT_SIZE)`,
/// `k < DEGREE`, with coefficients in `S`.
pub trait ExtensionField<S: Field>: Field + From<Block> + Into<Block> {
    /// The degree of the extension, `Self::BIT_SIZE / S::BIT_SIZE`.
    const DEGREE: usize;

    /// Embeds a subfield element.
    fn embed(s: S) -> Self;

    /// Multiplies a full field element by a subfield element.
    fn mixed_mul(s: S, f: Self) -> Self;

    /// Returns the `DEGREE` coefficients of `self` in the power basis.
    fn decompose(&self) -> Vec<S>;

    /// Composes an element from its `DEGREE` coefficients.
    fn compose(coeffs: &[S]) -> Result<Self, FieldError>;

    /// Returns the `k`-th power basis element.
    ///
    /// # Panics
    ///
    /// Panics if `k >= DEGREE`.
    fn basis(k: usize) -> Self;
}

/// A trait for sampling random elements of the field.
///
/// This is helpful, because we do not need to import other traits since this is a supertrait of
/// field (which is not possible with `Standard` and `Distribution`).
pub trait UniformRand: Sized {
    /// Return a random field element.
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl<T> UniformRand for T
where
    Standard: Distribution<T>,
{
    #[inline]
    fn rand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(Standard)
    }
}

/// Computes `sum_i a[i] * b[i]`.
pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> F {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(F::zero(), |acc, (&a, &b)| acc + a * b)
}

/// Computes `sum_k basis(k) * ys[k]` for `ys` of length `DEGREE`.
pub fn compose_full<S: Field, F: ExtensionField<S>>(ys: &[F]) -> F {
    assert_eq!(ys.len(), <F as ExtensionField<S>>::DEGREE);
    ys.iter()
        .enumerate()
        .fold(F::zero(), |acc, (k, &y)| acc + <F as ExtensionField<S>>::basis(k) * y)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use sparse_core::prg::Prg;

    pub(crate) fn test_field_basic<T: Field>() {
        let mut rng = Prg::from_seed(Block::ZERO);
        let a = T::rand(&mut rng);
        let b = T::rand(&mut rng);
        let c = T::rand(&mut rng);

        let zero = T::zero();
        let one = T::one();

        assert_eq!(a + zero, a);
        assert_eq!(a * zero, zero);
        assert_eq!(a * one, a);
        assert_eq!(a + -a, zero);
        assert_eq!(a - a, zero);
        assert_eq!(a * (b + c), a * b + a * c);
        assert_eq!(a * b, b * a);
        assert!(zero.is_zero());
        assert!(!one.is_zero());
    }

    pub(crate) fn test_field_bytes<T: Field>() {
        let mut rng = Prg::from_seed(Block::ONES);
        let a = T::rand(&mut rng);

        let bytes = a.to_le_bytes();
        assert_eq!(bytes.len(), T::BYTE_LEN);
        assert_eq!(T::from_le_bytes(&bytes).unwrap(), a);

        let mut long = bytes.clone();
        long.push(0);
        assert!(matches!(
            T::from_le_bytes(&long),
            Err(FieldError::InvalidLength { .. })
        ));
    }

    pub(crate) fn test_field_non_zero<T: Field>() {
        let mut rng = Prg::from_seed(Block::ZERO);
        for _ in 0..256 {
            let a = T::rand_non_zero(&mut rng).unwrap();
            assert!(!a.is_zero());
        }
    }

    pub(crate) fn test_extension<S: Field, F: ExtensionField<S>>() {
        let mut rng = Prg::from_seed(Block::ZERO);
        let f = F::rand(&mut rng);
        let s = S::rand(&mut rng);

        assert_eq!(
            <F as ExtensionField<S>>::DEGREE,
            (F::BIT_SIZE / S::BIT_SIZE) as usize
        );

        let coeffs = <F as ExtensionField<S>>::decompose(&f);
        assert_eq!(coeffs.len(), <F as ExtensionField<S>>::DEGREE);
        assert_eq!(<F as ExtensionField<S>>::compose(&coeffs).unwrap(), f);

        let recomposed = coeffs
            .iter()
            .enumerate()
            .fold(F::zero(), |acc, (k, &c)| {
                acc + <F as ExtensionField<S>>::mixed_mul(c, <F as ExtensionField<S>>::basis(k))
            });
        assert_eq!(recomposed, f);

        assert_eq!(
            <F as ExtensionField<S>>::mixed_mul(s, f),
            <F as ExtensionField<S>>::embed(s) * f
        );
        assert_eq!(<F as ExtensionField<S>>::basis(0), F::one());

        let block: Block = f.into();
        assert_eq!(F::from(block), f);
    }

    #[test]
    fn test_inner_product() {
        let mut rng = Prg::from_seed(Block::ZERO);
        let a: Vec<Gf2_128> = (0..8).map(|_| Gf2_128::rand(&mut rng)).collect();
        let b: Vec<Gf2_128> = (0..8).map(|_| Gf2_128::rand(&mut rng)).collect();

        let expected = a
            .iter()
            .zip(&b)
            .fold(Gf2_128::zero(), |acc, (&x, &y)| acc + x * y);
        assert_eq!(inner_product(&a, &b), expected);
    }

    #[test]
    fn test_compose_full() {
        let mut rng = Prg::from_seed(Block::ZERO);
        let f = Gf2_128::rand(&mut rng);

        // With S = F the single basis element is one.
        assert_eq!(compose_full::<Gf2_128, Gf2_128>(&[f]), f);

        // With S = GF(2), composing bit-embedded values recovers the element.
        let bits: Vec<Gf2_128> = <Gf2_128 as ExtensionField<Gf2>>::decompose(&f)
            .into_iter()
            .map(<Gf2_128 as ExtensionField<Gf2>>::embed)
            .collect();
        assert_eq!(compose_full::<Gf2, Gf2_128>(&bits), f);
    }
}
