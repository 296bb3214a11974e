//! Offline short code generation.
//!
//! Codes are synthesized once, ahead of time, and written to a flat pool file
//! that the running service drains through [`crate::pool`].
//!
//! - [`alphabet`] - Symbol set and code shape ([`Alphabet`], [`CodeSpec`])
//! - [`bloom`] - Probabilistic duplicate rejection during generation
//! - [`generator`] - Random code synthesis with Bloom-filter deduplication
//! - [`strategies`] - Deterministic alternatives kept for comparison benchmarks
//! - [`pool_file`] - Pool and cursor file emission

pub mod alphabet;
pub mod bloom;
pub mod generator;
pub mod pool_file;
pub mod strategies;

pub use alphabet::{Alphabet, CodeSpec, DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH};
pub use bloom::BloomFilter;
pub use generator::{GenerationExhausted, Generator};
pub use pool_file::{PoolFileSummary, write_pool_file};

use thiserror::Error;

/// Errors raised while configuring or running code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("code length must be at least 1")]
    InvalidLength,

    #[error("bloom filter must have at least one bit")]
    EmptyBloomFilter,

    #[error("system random source failed: {0}")]
    Entropy(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
