use sparse_core::{aes::FIXED_KEY_AES, ggm_tree::GgmTree, Block};

use crate::{
    dpprf::{check_request, path_bits, tweak, DpprfError},
    msgs::{LevelKeys, MaskBits},
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// The evaluating party of the DPPRF, which learns every leaf except one per tree.
#[derive(Debug)]
pub struct Evaluator {
    max_batch_num: usize,
    max_each_num: usize,
    counter: u64,
}

/// A puncture request awaiting the puncturer's level keys.
#[derive(Debug)]
pub struct PendingPuncture {
    alphas: Vec<usize>,
    each_num: usize,
    ts: Vec<Block>,
    counter: u64,
}

impl Evaluator {
    /// Creates a new evaluator.
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

    /// Starts a puncture of one tree per entry of `alphas`.
    ///
    /// Returns the pending request and the mask bits for the puncturer.
    ///
    /// # Arguments
    ///
    /// * `alphas` - The punctured leaf of each tree.
    /// * `each_num` - The number of leaves per tree, a power of two.
    /// * `choices` - The COT choice bits, `log2(each_num)` per tree.
    /// * `ts` - The COT values matching `choices`.
    pub fn request(
        &mut self,
        alphas: &[usize],
        each_num: usize,
        choices: &[bool],
        ts: &[Block],
    ) -> Result<(PendingPuncture, MaskBits), DpprfError> {
        let h = check_request(alphas.len(), each_num, self.max_batch_num, self.max_each_num)?;

        if let Some(alpha) = alphas.iter().find(|&&alpha| alpha >= each_num) {
            return Err(DpprfError::InvalidInput(format!(
                "punctured index below {each_num}, got {alpha}"
            )));
        }

        let count = alphas.len() * h;
        if choices.len() != count || ts.len() != count {
            return Err(DpprfError::InvalidLength(format!(
                "{count} COTs, got {} choices and {} values",
                choices.len(),
                ts.len()
            )));
        }

        // b = alpha XOR c XOR 1
        let bs = alphas
            .iter()
            .flat_map(|&alpha| path_bits(alpha, h))
            .zip(choices)
            .map(|(a, &c)| a == c)
            .collect();

        let pending = PendingPuncture {
            alphas: alphas.to_vec(),
            each_num,
            ts: ts.to_vec(),
            counter: self.counter,
        };

        self.counter += 1;

        Ok((pending, MaskBits { bs }))
    }

    /// Completes a puncture with the puncturer's level keys.
    ///
    /// Returns every tree with the punctured leaf set to zero.
    pub fn finish(
        &mut self,
        pending: PendingPuncture,
        keys: LevelKeys,
    ) -> Result<Vec<Vec<Block>>, DpprfError> {
        let PendingPuncture {
            alphas,
            each_num,
            ts,
            counter,
        } = pending;
        let LevelKeys { ms } = keys;

        if ms.len() != ts.len() {
            return Err(DpprfError::InvalidLength(format!(
                "{} level keys, got {}",
                ts.len(),
                ms.len()
            )));
        }

        let h = each_num.trailing_zeros() as usize;
        let ggm = GgmTree::new(h);

        let reconstruct_tree = |(j, &alpha): (usize, &usize)| {
            let path = path_bits(alpha, h);
            let k: Vec<Block> = path
                .iter()
                .enumerate()
                .map(|(l, &a)| {
                    let i = j * h + l;
                    let [m0, m1] = ms[i];
                    let pad = FIXED_KEY_AES.tccr(tweak(i, counter), ts[i]);
                    if a {
                        pad ^ m0
                    } else {
                        pad ^ m1
                    }
                })
                .collect();

            let mut tree = vec![Block::ZERO; each_num];
            ggm.reconstruct(&mut tree, &k, &path);
            tree
        };

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let trees = alphas.par_iter().enumerate().map(reconstruct_tree).collect();
            } else {
                let trees = alphas.iter().enumerate().map(reconstruct_tree).collect();
            }
        }

        Ok(trees)
    }
}
