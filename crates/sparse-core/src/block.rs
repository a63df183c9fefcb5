//! 128-bit blocks, the unit of every PRG, PRP and field operation.

use cipher::{consts::U16, generic_array::GenericArray};
use clmul::Clmul;
use core::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign};
use itybity::{BitIterable, BitLength, GetBit, Lsb0, Msb0};
use rand::{distributions::Standard, prelude::Distribution, CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use std::convert::From;

/// A block of 128 bits
///
/// When interpreted as an element of GF(2^128) the bytes are read as a little-endian
/// integer, so bit `i` is the coefficient of `X^i`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block([u8; 16]);

impl Block {
    /// The length of a block in bytes
    pub const LEN: usize = 16;
    /// A zero block
    pub const ZERO: Self = Self([0; 16]);
    /// A block with all bits set to 1
    pub const ONES: Self = Self([0xff; 16]);
    /// A length 2 array of zero and one blocks
    pub const SELECT_MASK: [Self; 2] = [Self::ZERO, Self::ONES];

    /// Create a new block
    #[inline]
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the byte representation of the block
    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns `true` if every bit of the block is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().fold(0u8, |acc, b| acc | b) == 0
    }

    /// Generate a random block using the provided RNG
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen())
    }

    /// Generate a random vector of blocks using the provided RNG
    #[inline]
    pub fn random_vec<R: Rng + CryptoRng + ?Sized>(rng: &mut R, n: usize) -> Vec<Self> {
        (0..n).map(|_| rng.gen::<[u8; 16]>().into()).collect()
    }

    /// Carry-less multiplication of two blocks, without the reduction step.
    ///
    /// Returns the low and high halves of the 256-bit product.
    #[inline]
    pub fn clmul(self, other: Self) -> (Self, Self) {
        let (a, b) = Clmul::new(&self.0).clmul(Clmul::new(&other.0));
        (Self::new(a.into()), Self::new(b.into()))
    }

    /// Reduces the 256-bit product `y·X^128 + x` modulo `X^128 + X^7 + X^2 + X + 1`.
    #[inline]
    pub fn reduce(x: Self, y: Self) -> Self {
        let r = Clmul::reduce_gcm(Clmul::new(&x.0), Clmul::new(&y.0));
        Self::new(r.into())
    }

    /// The multiplication of two field elements.
    #[inline]
    pub fn gfmul(self, x: Self) -> Self {
        let (a, b) = self.clmul(x);
        Block::reduce(a, b)
    }
}

impl BitLength for Block {
    const BITS: usize = 128;
}

impl GetBit<Lsb0> for Block {
    fn get_bit(&self, index: usize) -> bool {
        GetBit::<Lsb0>::get_bit(&self.0[index / 8], index % 8)
    }
}

impl GetBit<Msb0> for Block {
    fn get_bit(&self, index: usize) -> bool {
        GetBit::<Msb0>::get_bit(&self.0[15 - (index / 8)], index % 8)
    }
}

impl BitIterable for Block {}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Block::new(bytes)
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(value: u128) -> Self {
        Block::new(value.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(b: Block) -> Self {
        u128::from_le_bytes(b.0)
    }
}

impl<'a> TryFrom<&'a [u8]> for Block {
    type Error = <[u8; 16] as TryFrom<&'a [u8]>>::Error;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(value).map(Self::from)
    }
}

impl From<Block> for GenericArray<u8, U16> {
    #[inline]
    fn from(b: Block) -> Self {
        b.0.into()
    }
}

impl From<GenericArray<u8, U16>> for Block {
    #[inline]
    fn from(b: GenericArray<u8, U16>) -> Self {
        Block::new(b.into())
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(b: Block) -> Self {
        b.0
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ other.0[i]))
    }
}

impl BitXorAssign for Block {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] & other.0[i]))
    }
}

impl BitAndAssign for Block {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs
    }
}

impl Distribution<Block> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block::new(rng.gen())
    }
}

impl AsMut<[u8]> for Block {
    #[inline(always)]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_clmul_small() {
        // (X + 1) * (X + 1) = X^2 + 1
        let (lo, hi) = Block::from(3u128).clmul(Block::from(3u128));
        assert_eq!(lo, Block::from(5u128));
        assert_eq!(hi, Block::ZERO);

        // X^127 * X = X^128
        let (lo, hi) = Block::from(1u128 << 127).clmul(Block::from(2u128));
        assert_eq!(lo, Block::ZERO);
        assert_eq!(hi, Block::from(1u128));
    }

    #[test]
    fn test_gfmul_reduction() {
        // X^127 * X = X^7 + X^2 + X + 1
        let r = Block::from(1u128 << 127).gfmul(Block::from(2u128));
        assert_eq!(r, Block::from(0x87u128));

        // X^127 * X^127 = X^254 = X^126 * (X^7 + X^2 + X + 1)
        let r = Block::from(1u128 << 127).gfmul(Block::from(1u128 << 127));
        let expected = Block::from(1u128 << 126).gfmul(Block::from(0x87u128));
        assert_eq!(r, expected);
    }

    #[test]
    fn test_gfmul_field_laws() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let one = Block::from(1u128);
        for _ in 0..32 {
            let a = Block::random(&mut rng);
            let b = Block::random(&mut rng);
            let c = Block::random(&mut rng);

            assert_eq!(a.gfmul(one), a);
            assert_eq!(a.gfmul(b), b.gfmul(a));
            assert_eq!(a.gfmul(b).gfmul(c), a.gfmul(b.gfmul(c)));
            assert_eq!(a.gfmul(b ^ c), a.gfmul(b) ^ a.gfmul(c));
        }
    }

    // Shift-and-add reduction of the product, one bit of `b` at a time.
    fn reference_gfmul(a: u128, b: u128) -> u128 {
        let mut acc = 0u128;
        let mut a = a;
        for i in 0..128 {
            if (b >> i) & 1 == 1 {
                acc ^= a;
            }
            let carry = a >> 127;
            a <<= 1;
            if carry == 1 {
                a ^= 0x87;
            }
        }
        acc
    }

    #[test]
    fn test_gfmul_matches_reference() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let a: u128 = rng.gen();
            let b: u128 = rng.gen();

            assert_eq!(
                u128::from(Block::from(a).gfmul(Block::from(b))),
                reference_gfmul(a, b)
            );
        }
    }

    #[test]
    fn test_is_zero() {
        assert!(Block::ZERO.is_zero());
        assert!(!Block::from(1u128 << 100).is_zero());
    }
}
