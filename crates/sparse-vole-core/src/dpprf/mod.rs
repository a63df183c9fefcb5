//! Distributed puncturable PRF built from GGM trees and correlated OT.
//!
//! The [`Puncturer`] holds the full trees. The [`Evaluator`] chooses one punctured
//! leaf per tree and learns every other leaf without revealing its choice. Each tree
//! of depth `h` consumes `h` random correlated OTs: the puncturer holds the COT
//! global key, the evaluator holds the random choices.

mod evaluator;
mod puncturer;

pub use evaluator::{Evaluator, PendingPuncture};
pub use puncturer::Puncturer;

use itybity::ToBits;
use sparse_core::Block;

/// Errors that can occur when using the DPPRF.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum DpprfError {
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
    #[error("invalid length: expected {0}")]
    InvalidLength(String),
}

/// Validates a batch request and returns the tree depth.
pub(crate) fn check_request(
    batch_num: usize,
    each_num: usize,
    max_batch_num: usize,
    max_each_num: usize,
) -> Result<usize, DpprfError> {
    if batch_num == 0 || batch_num > max_batch_num {
        return Err(DpprfError::InvalidInput(format!(
            "batch number in 1..={max_batch_num}, got {batch_num}"
        )));
    }

    if !each_num.is_power_of_two() || each_num > max_each_num {
        return Err(DpprfError::InvalidInput(format!(
            "each number a power of two no more than {max_each_num}, got {each_num}"
        )));
    }

    Ok(each_num.trailing_zeros() as usize)
}

/// Returns the tweak used to hash the `index`-th COT of the `counter`-th puncture.
#[inline]
pub(crate) fn tweak(index: usize, counter: u64) -> Block {
    Block::new(bytemuck::cast([index as u64, counter]))
}

/// Returns the `h` path bits of `alpha`, most significant bit first.
#[inline]
pub(crate) fn path_bits(alpha: usize, h: usize) -> Vec<bool> {
    (alpha as u64).iter_msb0().skip(64 - h).collect()
}
