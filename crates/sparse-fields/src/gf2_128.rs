//! This module implements the extension field GF(2^128).
//!
//! Elements are polynomials over GF(2) modulo `X^128 + X^7 + X^2 + X + 1`, with
//! bit `i` of the little-endian integer holding the coefficient of `X^i`.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use itybity::{GetBit, Lsb0};
use rand::{distributions::Standard, prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};
use sparse_core::Block;

use crate::{ExtensionField, Field, FieldError, Gf2};

/// A type for holding field elements of Gf(2^128).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gf2_128(pub(crate) u128);

impl Gf2_128 {
    /// Creates a new field element from a u128.
    pub fn new(input: u128) -> Self {
        Gf2_128(input)
    }

    /// Returns the field element as a u128.
    pub fn to_inner(self) -> u128 {
        self.0
    }

    /// Returns `X^rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs >= 128`.
    pub fn two_pow(rhs: u32) -> Self {
        assert!(rhs < 128, "exponent out of range: {rhs}");
        Self(1 << rhs)
    }
}

impl From<Block> for Gf2_128 {
    fn from(block: Block) -> Self {
        Self(block.into())
    }
}

impl From<Gf2_128> for Block {
    fn from(value: Gf2_128) -> Self {
        Block::from(value.0)
    }
}

impl Distribution<Gf2_128> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Gf2_128 {
        Gf2_128(rng.gen())
    }
}

impl Add for Gf2_128 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf2_128 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Gf2_128 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf2_128 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Block::from(self).gfmul(Block::from(rhs)).into()
    }
}

impl Neg for Gf2_128 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self
    }
}

impl Field for Gf2_128 {
    const BIT_SIZE: u32 = 128;
    const BYTE_LEN: usize = 16;

    fn zero() -> Self {
        Self(0)
    }

    fn one() -> Self {
        Self(1)
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        self.0.to_le_bytes().to_vec()
    }

    fn from_le_bytes(bytes: &[u8]) -> Result<Self, FieldError> {
        let bytes: [u8; 16] = bytes.try_into().map_err(|_| FieldError::InvalidLength {
            expected: Self::BYTE_LEN,
            actual: bytes.len(),
        })?;

        Ok(Self(u128::from_le_bytes(bytes)))
    }
}

impl ExtensionField<Gf2> for Gf2_128 {
    const DEGREE: usize = 128;

    fn embed(s: Gf2) -> Self {
        Self(s.bit() as u128)
    }

    fn mixed_mul(s: Gf2, f: Self) -> Self {
        Self(f.0 & 0u128.wrapping_sub(s.bit() as u128))
    }

    fn decompose(&self) -> Vec<Gf2> {
        (0..128)
            .map(|i| Gf2::new(GetBit::<Lsb0>::get_bit(&self.0, i)))
            .collect()
    }

    fn compose(coeffs: &[Gf2]) -> Result<Self, FieldError> {
        if coeffs.len() != 128 {
            return Err(FieldError::InvalidLength {
                expected: 128,
                actual: coeffs.len(),
            });
        }

        Ok(Self(
            coeffs
                .iter()
                .enumerate()
                .fold(0u128, |acc, (i, c)| acc | ((c.bit() as u128) << i)),
        ))
    }

    fn basis(k: usize) -> Self {
        Self::two_pow(k as u32)
    }
}

impl ExtensionField<Gf2_128> for Gf2_128 {
    const DEGREE: usize = 1;

    fn embed(s: Gf2_128) -> Self {
        s
    }

    fn mixed_mul(s: Gf2_128, f: Self) -> Self {
        s * f
    }

    fn decompose(&self) -> Vec<Gf2_128> {
        vec![*self]
    }

    fn compose(coeffs: &[Gf2_128]) -> Result<Self, FieldError> {
        match coeffs {
            [c] => Ok(*c),
            _ => Err(FieldError::InvalidLength {
                expected: 1,
                actual: coeffs.len(),
            }),
        }
    }

    fn basis(k: usize) -> Self {
        assert_eq!(k, 0, "basis index out of range: {k}");
        Self::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{test_extension, test_field_basic, test_field_bytes, test_field_non_zero};

    #[test]
    fn test_gf2_128_basic() {
        test_field_basic::<Gf2_128>();
        assert_eq!(Gf2_128::new(0), Gf2_128::zero());
        assert_eq!(Gf2_128::new(1), Gf2_128::one());
    }

    #[test]
    fn test_gf2_128_reduction() {
        // X^127 * X = X^7 + X^2 + X + 1
        assert_eq!(
            Gf2_128::two_pow(127) * Gf2_128::two_pow(1),
            Gf2_128::new(0x87)
        );
    }

    #[test]
    fn test_gf2_128_bytes() {
        test_field_bytes::<Gf2_128>();
    }

    #[test]
    fn test_gf2_128_non_zero() {
        test_field_non_zero::<Gf2_128>();
    }

    #[test]
    fn test_gf2_128_over_gf2() {
        test_extension::<Gf2, Gf2_128>();
    }

    #[test]
    fn test_gf2_128_over_itself() {
        test_extension::<Gf2_128, Gf2_128>();
    }

    #[test]
    fn test_gf2_128_serde_width() {
        let a = Gf2_128::new(u128::MAX);
        assert_eq!(bcs::to_bytes(&a).unwrap().len(), 16);
    }
}
