//! Implement AES-based PRG.

use crate::{aes::AesEncryptor, Block};
use rand::Rng;
use rand_core::{
    block::{BlockRng, BlockRngCore},
    CryptoRng, RngCore, SeedableRng,
};

/// Struct of PRG Core
#[derive(Clone)]
struct PrgCore {
    aes: AesEncryptor,
    state: u64,
}

// AES in counter mode, the counter occupying the low 64 bits of the block.
impl BlockRngCore for PrgCore {
    type Item = u32;
    type Results = [u32; 4 * AesEncryptor::AES_BLOCK_COUNT];

    #[inline(always)]
    fn generate(&mut self, results: &mut Self::Results) {
        let mut states = [0; AesEncryptor::AES_BLOCK_COUNT].map(
            #[inline(always)]
            |_| {
                let x = self.state;
                self.state += 1;
                Block::from(bytemuck::cast::<_, [u8; 16]>([x, 0u64]))
            },
        );
        self.aes.encrypt_many_blocks(&mut states);
        *results = bytemuck::cast(states.map(<[u8; 16]>::from));
    }
}

impl SeedableRng for PrgCore {
    type Seed = Block;

    #[inline(always)]
    fn from_seed(seed: Self::Seed) -> Self {
        let aes = AesEncryptor::new(seed);
        Self { aes, state: 0u64 }
    }
}

impl CryptoRng for PrgCore {}

/// Struct of PRG
#[derive(Clone)]
pub struct Prg(BlockRng<PrgCore>);

impl std::fmt::Debug for Prg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Prg { .. }")
    }
}

impl RngCore for Prg {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline(always)]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for Prg {
    type Seed = Block;

    #[inline(always)]
    fn from_seed(seed: Self::Seed) -> Self {
        Prg(BlockRng::<PrgCore>::from_seed(seed))
    }
}

impl CryptoRng for Prg {}

impl Prg {
    /// Generate a random block.
    #[inline(always)]
    pub fn random_block(&mut self) -> Block {
        self.gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prg_test() {
        let mut prg = Prg::from_seed(Block::ZERO);
        let x = prg.random_block();
        let y = prg.random_block();
        assert_ne!(x, y);
    }

    #[test]
    fn prg_is_deterministic_in_seed() {
        let mut a = Prg::from_seed(Block::from(7u128));
        let mut b = Prg::from_seed(Block::from(7u128));
        let mut c = Prg::from_seed(Block::from(8u128));

        let xs: Vec<Block> = (0..20).map(|_| a.random_block()).collect();
        let ys: Vec<Block> = (0..20).map(|_| b.random_block()).collect();
        let zs: Vec<Block> = (0..20).map(|_| c.random_block()).collect();

        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
    }
}
