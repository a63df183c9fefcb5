//! Hash commitments.
//!
//! A commitment is `BLAKE3(nonce || encode(data))` with a fresh 32-byte nonce.

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::{hash::Hash, serialize::CanonicalSerialize};

/// Errors that can occur when opening a commitment.
#[derive(Debug, thiserror::Error)]
#[error("commitment opening does not match the commitment")]
pub struct CommitmentError;

/// An opening of a hash commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decommitment<T> {
    nonce: [u8; 32],
    data: T,
}

impl<T: CanonicalSerialize> Decommitment<T> {
    /// Creates a new decommitment to `data` with a nonce drawn from `rng`.
    pub fn new_with_rng<R: Rng + CryptoRng + ?Sized>(data: T, rng: &mut R) -> Self {
        Self {
            nonce: rng.gen(),
            data,
        }
    }

    /// Computes the commitment.
    pub fn commit(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.nonce);
        hasher.update(&self.data.to_bytes());
        Hash::from(*hasher.finalize().as_bytes())
    }

    /// Verifies this opening against `commitment`.
    pub fn verify(&self, commitment: &Hash) -> Result<(), CommitmentError> {
        if self.commit() == *commitment {
            Ok(())
        } else {
            Err(CommitmentError)
        }
    }

    /// Returns a reference to the committed data.
    pub fn data(&self) -> &T {
        &self.data
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_commit_opens() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let decommitment = Decommitment::new_with_rng([1u8, 2, 3], &mut rng);
        let commitment = decommitment.commit();
        decommitment.verify(&commitment).unwrap();
        assert_eq!(decommitment.data(), &[1u8, 2, 3]);
    }

    #[test]
    fn test_commit_rejects_wrong_data() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let decommitment = Decommitment::new_with_rng(7u64, &mut rng);
        let commitment = decommitment.commit();
        let forged = Decommitment {
            nonce: decommitment.nonce,
            data: 8u64,
        };
        assert!(forged.verify(&commitment).is_err());
    }

    #[test]
    fn test_commit_hides_with_nonce() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let a = Decommitment::new_with_rng(7u64, &mut rng).commit();
        let b = Decommitment::new_with_rng(7u64, &mut rng).commit();
        assert_ne!(a, b);
    }
}
