//! Low-level crate containing the core of the single-point correlation generator.
//!
//! A single-point correlation of length `n` gives the sender a position `α`, a
//! non-zero scaling value `β` and a pad vector `w`, and gives the receiver a vector
//! `v` such that `v = w + Δ·β·e_α`, where `Δ` is the receiver's global key. Batches
//! of many instances are produced from one base correlation and `log2(n)` random
//! correlated OTs per instance, with an optional consistency check against a
//! malicious sender.
//!
//! This crate is not intended to be used directly. Instead, use the higher-level APIs provided by
//! the `sparse-vole` crate.
//!
//! # ⚠️ Warning ⚠️
//!
//! The round functions assume that both parties feed them correlations drawn in the same order
//! from their oracles. Failing to uphold this may result in security vulnerabilities.
//!
//! USE AT YOUR OWN RISK.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod base;
mod check;
mod config;
pub mod dpprf;
mod error;
pub mod ideal;
pub mod msgs;
pub mod output;
pub mod receiver;
pub mod sender;
mod single;

pub use config::{
    SpcgConfig, SpcgConfigBuilder, SpcgConfigBuilderError, DEFAULT_MAX_BATCH_NUM,
    DEFAULT_MAX_EACH_NUM,
};
pub use error::{AbortKind, ReceiverError, SenderError};
pub use output::{is_correlated, BatchOutput, ReceiverOutput, SenderOutput};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};
