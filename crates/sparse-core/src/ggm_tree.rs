//! Implement GGM tree for OT.
//! Implementation of GGM based on the procedure explained in the write-up
//! (<https://eprint.iacr.org/2020/925.pdf>, Page 14)

use crate::{tkprp::TwoKeyPrp, Block};

/// Struct of GGM
#[derive(Clone)]
pub struct GgmTree {
    tkprp: TwoKeyPrp,
    depth: usize,
}

impl GgmTree {
    ///New GgmTree instance.
    #[inline(always)]
    pub fn new(depth: usize) -> Self {
        let tkprp = TwoKeyPrp::new([Block::ZERO, Block::from(1u128)]);
        Self { tkprp, depth }
    }

    /// Returns the depth of the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Create a GGM tree in-place.
    ///
    /// # Arguments
    ///
    /// * `seed` - a seed.
    /// * `tree` - the destination to write the GGM (binary tree) `tree`, with size `2^{depth}`.
    /// * `k0` - XORs of all the left-node values in each level, with size `depth`.
    /// * `k1`- XORs of all the right-node values in each level, with size `depth`.
    pub fn gen(&self, seed: Block, tree: &mut [Block], k0: &mut [Block], k1: &mut [Block]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k0.len(), self.depth);
        assert_eq!(k1.len(), self.depth);

        tree[0] = seed;
        for h in 0..self.depth {
            k0[h] = Block::ZERO;
            k1[h] = Block::ZERO;

            // Parents are expanded from the back so children never overwrite
            // an unexpanded parent.
            for i in (0..1 << h).rev() {
                let [left, right] = self.tkprp.expand(tree[i]);
                k0[h] ^= left;
                k1[h] ^= right;
                tree[2 * i] = left;
                tree[2 * i + 1] = right;
            }
        }
    }

    /// Reconstruct the GGM tree except the value in a given position.
    ///
    /// This reconstructs the GGM tree entirely except `tree[pos] == Block::ZERO`, where
    /// `alpha` is the bit decomposition of `pos`, most significant bit first.
    ///
    /// # Arguments
    ///
    /// * `tree` - the destination to write the GGM tree.
    /// * `k` - a slice of blocks with length `depth`, holding the level sums on the side
    ///   off the path. For the i-th value, if alpha[i] == 1, k[i] = k0[i]; else k[i] = k1[i].
    /// * `alpha` - a slice of bits with length `depth`.
    pub fn reconstruct(&self, tree: &mut [Block], k: &[Block], alpha: &[bool]) {
        assert_eq!(tree.len(), 1 << self.depth);
        assert_eq!(k.len(), self.depth);
        assert_eq!(alpha.len(), self.depth);

        tree[0] = Block::ZERO;
        let mut pos = 0;
        for (h, (&k, &a)) in k.iter().zip(alpha).enumerate() {
            for i in (0..1 << h).rev() {
                if i == pos {
                    tree[2 * i] = Block::ZERO;
                    tree[2 * i + 1] = Block::ZERO;
                } else {
                    let [left, right] = self.tkprp.expand(tree[i]);
                    tree[2 * i] = left;
                    tree[2 * i + 1] = right;
                }
            }

            // The sibling of the punctured node sits on the opposite side of `a`.
            let sibling = 2 * pos + (!a as usize);
            let sum = tree
                .iter()
                .take(2 << h)
                .skip(!a as usize)
                .step_by(2)
                .fold(k, |acc, &x| acc ^ x);
            tree[sibling] = sum;

            pos = 2 * pos + a as usize;
        }
    }
}
