//! The binary field GF(2).

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use rand::{distributions::Standard, prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};

use crate::{Field, FieldError};

/// An element of GF(2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gf2(bool);

impl Gf2 {
    /// Creates a new element from a bit.
    pub fn new(bit: bool) -> Self {
        Self(bit)
    }

    /// Returns the element as a bit.
    pub fn bit(&self) -> bool {
        self.0
    }
}

impl From<bool> for Gf2 {
    fn from(bit: bool) -> Self {
        Self(bit)
    }
}

impl From<Gf2> for bool {
    fn from(value: Gf2) -> Self {
        value.0
    }
}

impl Distribution<Gf2> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Gf2 {
        Gf2(rng.gen())
    }
}

impl Add for Gf2 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Gf2 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf2 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Neg for Gf2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self
    }
}

impl Field for Gf2 {
    const BIT_SIZE: u32 = 1;
    const BYTE_LEN: usize = 1;

    fn zero() -> Self {
        Self(false)
    }

    fn one() -> Self {
        Self(true)
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        vec![self.0 as u8]
    }

    fn from_le_bytes(bytes: &[u8]) -> Result<Self, FieldError> {
        match bytes {
            [0] => Ok(Self(false)),
            [1] => Ok(Self(true)),
            [b] => Err(FieldError::InvalidValue(format!(
                "GF(2) element must be 0 or 1, got {b}"
            ))),
            _ => Err(FieldError::InvalidLength {
                expected: Self::BYTE_LEN,
                actual: bytes.len(),
            }),
        }
    }
}
