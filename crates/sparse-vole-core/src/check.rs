//! Random linear combination used by the consistency check.
//!
//! For every instance `j` the challenges `χ_j[i]` are expanded by the AES PRG from a
//! key bound to the check seed, the extension transcript, the execution counter and
//! `j`, so no two challenge positions share PRG output across executions or instances.

use rand::SeedableRng;
use sparse_core::{prg::Prg, Block};
use sparse_fields::{inner_product, ExtensionField, Field};

use crate::output::SenderOutput;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

const CHI_TAG: &[u8] = b"sparse-vole/chi";

/// Derives the challenges of instance `batch`.
pub(crate) fn challenges<F: Field + From<Block>>(
    seed: Block,
    transcript: &[u8; 32],
    exec: u64,
    batch: usize,
    n: usize,
) -> Vec<F> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CHI_TAG);
    hasher.update(&seed.to_bytes());
    hasher.update(transcript);
    hasher.update(&exec.to_le_bytes());
    hasher.update(&(batch as u64).to_le_bytes());

    let mut key = [0u8; 16];
    key.copy_from_slice(&hasher.finalize().as_bytes()[..16]);

    let mut prg = Prg::from_seed(Block::new(key));
    (0..n).map(|_| F::from(prg.random_block())).collect()
}

/// Computes the sender's combinations `(Σ_j Σ_i χ_j[i]·w_j[i], Σ_j χ_j[α_j]·β_j)`.
pub(crate) fn sender_combine<S: Field, F: ExtensionField<S>>(
    seed: Block,
    transcript: &[u8; 32],
    exec: u64,
    outputs: &[SenderOutput<S, F>],
) -> (F, F) {
    let combine = |(j, output): (usize, &SenderOutput<S, F>)| {
        let chis: Vec<F> = challenges(seed, transcript, exec, j, output.w.len());
        (
            inner_product(&chis, &output.w),
            F::mixed_mul(output.beta, chis[output.alpha]),
        )
    };

    let add = |(a0, b0): (F, F), (a1, b1): (F, F)| (a0 + a1, b0 + b1);

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            outputs
                .par_iter()
                .enumerate()
                .map(combine)
                .reduce(|| (F::zero(), F::zero()), add)
        } else {
            outputs
                .iter()
                .enumerate()
                .map(combine)
                .fold((F::zero(), F::zero()), add)
        }
    }
}

/// Computes the receiver's combination `Σ_j Σ_i χ_j[i]·v_j[i]`.
pub(crate) fn receiver_combine<F: Field + From<Block>>(
    seed: Block,
    transcript: &[u8; 32],
    exec: u64,
    vectors: &[Vec<F>],
) -> F {
    let combine = |(j, v): (usize, &Vec<F>)| {
        let chis: Vec<F> = challenges(seed, transcript, exec, j, v.len());
        inner_product(&chis, v)
    };

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            vectors
                .par_iter()
                .enumerate()
                .map(combine)
                .reduce(F::zero, |a, b| a + b)
        } else {
            vectors
                .iter()
                .enumerate()
                .map(combine)
                .fold(F::zero(), |a, b| a + b)
        }
    }
}
