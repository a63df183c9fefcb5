use rand::{CryptoRng, Rng};
use sparse_core::{aes::FIXED_KEY_AES, ggm_tree::GgmTree, Block};

use crate::{
    dpprf::{check_request, tweak, DpprfError},
    msgs::{LevelKeys, MaskBits},
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// The puncturing party of the DPPRF, which learns every leaf.
#[derive(Debug)]
pub struct Puncturer {
    max_batch_num: usize,
    max_each_num: usize,
    counter: u64,
}

impl Puncturer {
    /// Creates a new puncturer.
    ///
    /// # Arguments
    ///
    /// * `max_batch_num` - The maximum number of trees in one batch.
    /// * `max_each_num` - The maximum number of leaves in one tree.
    pub fn new(max_batch_num: usize, max_each_num: usize) -> Self {
        Self {
            max_batch_num,
            max_each_num,
            counter: 0,
        }
    }

    /// Expands `batch_num` fresh trees with `each_num` leaves each.
    ///
    /// Returns the leaves of every tree and the level keys for the evaluator.
    ///
    /// # Arguments
    ///
    /// * `batch_num` - The number of trees.
    /// * `each_num` - The number of leaves per tree, a power of two.
    /// * `delta` - The COT global key.
    /// * `qs` - The COT values, `log2(each_num)` per tree.
    /// * `mask` - The evaluator's mask bits.
    /// * `rng` - The source of the tree seeds.
    pub fn expand<R: Rng + CryptoRng + ?Sized>(
        &mut self,
        batch_num: usize,
        each_num: usize,
        delta: Block,
        qs: &[Block],
        mask: &MaskBits,
        rng: &mut R,
    ) -> Result<(Vec<Vec<Block>>, LevelKeys), DpprfError> {
        let h = check_request(batch_num, each_num, self.max_batch_num, self.max_each_num)?;

        if qs.len() != batch_num * h {
            return Err(DpprfError::InvalidLength(format!(
                "{} COT values, got {}",
                batch_num * h,
                qs.len()
            )));
        }

        if mask.bs.len() != batch_num * h {
            return Err(DpprfError::InvalidLength(format!(
                "{} mask bits, got {}",
                batch_num * h,
                mask.bs.len()
            )));
        }

        let counter = self.counter;
        let seeds = Block::random_vec(rng, batch_num);
        let ggm = GgmTree::new(h);

        let expand_tree = |(j, seed): (usize, Block)| {
            let mut tree = vec![Block::ZERO; each_num];
            let mut k0 = vec![Block::ZERO; h];
            let mut k1 = vec![Block::ZERO; h];
            ggm.gen(seed, &mut tree, &mut k0, &mut k1);

            let ms: Vec<[Block; 2]> = (0..h)
                .map(|l| {
                    let i = j * h + l;
                    let q = qs[i];
                    let mut m = if mask.bs[i] {
                        [q ^ delta, q]
                    } else {
                        [q, q ^ delta]
                    };
                    let tweak = tweak(i, counter);
                    FIXED_KEY_AES.tccr_many(&[tweak, tweak], &mut m);
                    m[0] ^= k0[l];
                    m[1] ^= k1[l];
                    m
                })
                .collect();

            (tree, ms)
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let expanded: Vec<_> = seeds.into_par_iter().enumerate().map(expand_tree).collect();
            } else {
                let expanded: Vec<_> = seeds.into_iter().enumerate().map(expand_tree).collect();
            }
        }

        let (trees, ms): (Vec<_>, Vec<_>) = expanded.into_iter().unzip();

        self.counter += 1;

        Ok((
            trees,
            LevelKeys {
                ms: ms.into_iter().flatten().collect(),
            },
        ))
    }
}
