//! Canonical serialization of protocol values.

use serde::Serialize;

/// A type with a canonical byte encoding.
pub trait CanonicalSerialize: Serialize {
    /// Serializes the value into its canonical byte representation.
    fn to_bytes(&self) -> Vec<u8> {
        bcs::to_bytes(self).expect("serialization of in-memory values is infallible")
    }
}

impl<T: Serialize> CanonicalSerialize for T {}
