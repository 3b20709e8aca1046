#![cfg_attr(all(feature = "no-std", not(test)), no_std)]

extern crate alloc;

pub mod collections;

pub use collections::ordered_chain::{ChainError, ChainResult, OrderedChain};
