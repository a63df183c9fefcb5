//! Core types and utilities for the sparse correlation generators.
#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod aes;
pub mod block;
pub mod commit;
pub mod ggm_tree;
pub mod hash;
pub mod prg;
pub mod serialize;
pub mod tkprp;

pub use block::Block;
