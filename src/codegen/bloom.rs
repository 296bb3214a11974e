//! Bloom filter used to reject likely-duplicate codes during generation.

use parking_lot::RwLock;

use super::CodegenError;

/// Seeds for the three independent probes.
const PROBE_SEEDS: [i64; 3] = [0, 1, 2];

/// Fixed-size Bloom filter with three polynomial-hash probes.
///
/// Each probe runs the seeded polynomial hash through a 64-bit finalizer
/// before reducing it modulo the bit count. Without the finalizer the three
/// seeds only shift the hash by a constant and the probes are correlated.
///
/// `contains` may report a false positive but never a false negative. There is
/// no removal and no resizing. Reads share the lock, writes take it
/// exclusively.
pub struct BloomFilter {
    words: RwLock<Vec<u64>>,
    bits: usize,
}

impl BloomFilter {
    /// Creates a filter holding `bits` bits, all clear.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::EmptyBloomFilter`] if `bits` is zero.
    pub fn new(bits: usize) -> Result<Self, CodegenError> {
        if bits == 0 {
            return Err(CodegenError::EmptyBloomFilter);
        }
        Ok(Self {
            words: RwLock::new(vec![0u64; bits.div_ceil(64)]),
            bits,
        })
    }

    /// Number of addressable bits.
    pub fn bit_count(&self) -> usize {
        self.bits
    }

    /// Sets every probed bit for `item`.
    pub fn add(&self, item: &str) {
        let probes = self.probes(item);
        let mut words = self.words.write();
        for idx in probes {
            words[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Returns true only if every probed bit for `item` is set.
    pub fn contains(&self, item: &str) -> bool {
        let probes = self.probes(item);
        let words = self.words.read();
        probes
            .iter()
            .all(|&idx| words[idx / 64] & (1u64 << (idx % 64)) != 0)
    }

    fn probes(&self, item: &str) -> [usize; 3] {
        PROBE_SEEDS.map(|seed| {
            (finalize(polynomial_hash(item.as_bytes(), seed)) % self.bits as u64) as usize
        })
    }
}

/// MurmurHash3 `fmix64`.
fn finalize(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// `h = seed; h = h * 31 + byte` over wrapping 64-bit arithmetic, made
/// non-negative.
pub(crate) fn polynomial_hash(bytes: &[u8], seed: i64) -> u64 {
    bytes
        .iter()
        .fold(seed, |h, &b| h.wrapping_mul(31).wrapping_add(b as i64))
        .unsigned_abs()
}
