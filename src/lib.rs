#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "blake2b")]
pub mod blake2b;
pub mod error;
pub mod h256;
pub mod hasher;
pub mod merge;
pub mod state;
#[cfg(test)]
mod tests;
pub mod vm;

pub use error::{Error, Result};
pub use h256::H256;
pub use hasher::Hasher;
pub use merge::MergeValue;
pub use state::{KvState, Pair};
pub use vm::{
    calculate_root, calculate_root_with_stack, verify, verify_with_stack, DEFAULT_STACK_SIZE,
};
