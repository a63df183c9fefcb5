//! Messages for the single-point correlation generator.

use enum_try_as_inner::EnumTryAsInner;
use serde::{Deserialize, Serialize};
use sparse_core::{commit::Decommitment, hash::Hash, Block};
use sparse_fields::Field;

/// A single-point correlation generator message.
#[derive(Debug, Clone, EnumTryAsInner, Serialize, Deserialize)]
#[derive_err(Debug)]
#[allow(missing_docs)]
#[serde(bound = "")]
pub enum Message<S: Field, F: Field> {
    MaskBits(MaskBits),
    LevelKeys(LevelKeys),
    Corrections(Corrections<F>),
    CheckSeed(CheckSeed),
    CheckCorrection(CheckCorrection<S>),
    CheckCommitment(CheckCommitment),
    CheckValue(CheckValue<F>),
    CheckOpening(CheckOpening<F>),
}

impl<S: Field, F: Field> From<MessageError<S, F>> for std::io::Error {
    fn from(err: MessageError<S, F>) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
    }
}

/// The mask bits sent from the sender, one per tree level per instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskBits {
    /// The mask bits.
    pub bs: Vec<bool>,
}

/// The masked level keys sent from the receiver, one pair per tree level per instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelKeys {
    /// The masks `m0` and `m1`.
    pub ms: Vec<[Block; 2]>,
}

/// The correction values sent from the receiver, one per instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Corrections<F: Field> {
    /// `d_j = γ_j - Σ_i v_j[i]`.
    pub ds: Vec<F>,
}

/// The consistency check seed sent from the sender.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckSeed {
    /// The seed.
    pub seed: Block,
}

/// The masked decomposition of the sender's combined scaling values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CheckCorrection<S: Field> {
    /// `x*`.
    pub x_star: Vec<S>,
}

/// The receiver's commitment to its check value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckCommitment {
    /// The commitment.
    pub commitment: Hash,
}

/// The sender's check value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CheckValue<F: Field> {
    /// `V_A`.
    pub v: F,
}

/// The opening of the receiver's commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CheckOpening<F: Field> {
    /// The decommitment to `V_B`.
    pub decommitment: Decommitment<F>,
}
