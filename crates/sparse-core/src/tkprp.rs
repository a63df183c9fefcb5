//! Implement the two-key PRG as G(k) = PRF_seed0(k)\xor k || PRF_seed1(k)\xor k
//! Refer to (<https://www.usenix.org/system/files/conference/nsdi17/nsdi17-wang-frank.pdf>, Page 8)

use crate::{aes::AesEncryptor, Block};

/// Struct of two-key prp.
#[derive(Clone)]
pub struct TwoKeyPrp([AesEncryptor; 2]);

impl TwoKeyPrp {
    /// New an instance of TwoKeyPrp
    #[inline(always)]
    pub fn new(seeds: [Block; 2]) -> Self {
        Self([AesEncryptor::new(seeds[0]), AesEncryptor::new(seeds[1])])
    }

    /// Expands a parent node into its left and right children.
    #[inline(always)]
    pub fn expand(&self, parent: Block) -> [Block; 2] {
        [
            self.0[0].encrypt_block(parent) ^ parent,
            self.0[1].encrypt_block(parent) ^ parent,
        ]
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_is_keyed() {
        let prp = TwoKeyPrp::new([Block::ZERO, Block::from(1u128)]);
        let [l, r] = prp.expand(Block::from(5u128));
        assert_ne!(l, r);
        assert_eq!(prp.expand(Block::from(5u128)), [l, r]);

        let other = TwoKeyPrp::new([Block::from(1u128), Block::ZERO]);
        assert_eq!(other.expand(Block::from(5u128)), [r, l]);
    }
}
