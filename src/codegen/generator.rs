//! Random short code generation with Bloom-filter deduplication.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;
use tracing::debug;

use super::{BloomFilter, CodeSpec, CodegenError};

/// Raised when the attempt budget (`2 × count`) ran out before `count`
/// unique codes were produced.
///
/// Carries the codes that were produced so the caller can accept a short
/// batch.
#[derive(Debug, Error)]
#[error("only generated {} codes out of {requested} requested", .generated.len())]
pub struct GenerationExhausted {
    pub requested: usize,
    pub generated: Vec<String>,
}

/// Synthesizes batches of unique random codes.
///
/// Each candidate takes `L` bytes from a cryptographically strong generator,
/// reduces every byte into the alphabet with a modulo, and is accepted only if
/// the Bloom filter has not seen it. Rejections count against the attempt
/// budget.
pub struct Generator<R = StdRng> {
    spec: CodeSpec,
    filter: BloomFilter,
    rng: R,
}

impl Generator<StdRng> {
    /// Creates a generator seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::EmptyBloomFilter`] if `bloom_bits` is zero and
    /// [`CodegenError::Entropy`] if the system random source fails.
    pub fn new(spec: CodeSpec, bloom_bits: usize) -> Result<Self, CodegenError> {
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        getrandom::fill(&mut seed).map_err(|e| CodegenError::Entropy(e.to_string()))?;
        Self::with_rng(spec, bloom_bits, StdRng::from_seed(seed))
    }
}

impl<R: RngCore> Generator<R> {
    /// Creates a generator drawing from the given random source.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::EmptyBloomFilter`] if `bloom_bits` is zero.
    pub fn with_rng(spec: CodeSpec, bloom_bits: usize, rng: R) -> Result<Self, CodegenError> {
        Ok(Self {
            spec,
            filter: BloomFilter::new(bloom_bits)?,
            rng,
        })
    }

    pub fn spec(&self) -> &CodeSpec {
        &self.spec
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    /// Generates `count` codes not previously seen by this generator.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationExhausted`] with the partial batch if fewer than
    /// `count` codes were accepted within `2 × count` attempts.
    pub fn generate(&mut self, count: usize) -> Result<Vec<String>, GenerationExhausted> {
        let max_attempts = count.saturating_mul(2);
        let mut codes = Vec::with_capacity(count);
        let mut attempts = 0;

        while codes.len() < count && attempts < max_attempts {
            let code = self.synthesize();
            attempts += 1;

            if !self.filter.contains(&code) {
                self.filter.add(&code);
                codes.push(code);
            }
        }

        debug!(
            requested = count,
            generated = codes.len(),
            rejected = attempts - codes.len(),
            "generation finished"
        );

        if codes.len() < count {
            return Err(GenerationExhausted {
                requested: count,
                generated: codes,
            });
        }
        Ok(codes)
    }

    fn synthesize(&mut self) -> String {
        let mut bytes = vec![0u8; self.spec.length()];
        self.rng.fill_bytes(&mut bytes);

        let alphabet = self.spec.alphabet();
        bytes
            .into_iter()
            .map(|b| alphabet.symbol(b as u64) as char)
            .collect()
    }
}
