//! Code alphabet and fixed-length code shape.

use super::CodegenError;

/// URL-safe base64 symbol set.
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of every issued short code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// A validated set of ASCII symbols that short codes are drawn from.
///
/// Symbols are unique visible ASCII characters other than `/`, so a code is
/// always a single path segment. That caps the set at 93 entries, and any
/// random byte can be reduced into it with a single modulo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Builds an alphabet from a string of symbols.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::InvalidAlphabet`] if the string is empty, holds
    /// anything but visible ASCII, contains `/`, or repeats a symbol.
    pub fn new(symbols: &str) -> Result<Self, CodegenError> {
        if symbols.is_empty() {
            return Err(CodegenError::InvalidAlphabet("alphabet is empty".into()));
        }
        if let Some(c) = symbols.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(CodegenError::InvalidAlphabet(format!(
                "symbol {c:?} is not visible ASCII"
            )));
        }

        let mut seen = [false; 128];
        for b in symbols.bytes() {
            if b == b'/' {
                return Err(CodegenError::InvalidAlphabet(
                    "symbol '/' would split the URL path".into(),
                ));
            }
            if seen[b as usize] {
                return Err(CodegenError::InvalidAlphabet(format!(
                    "duplicate symbol '{}'",
                    b as char
                )));
            }
            seen[b as usize] = true;
        }

        Ok(Self {
            symbols: symbols.as_bytes().to_vec(),
        })
    }

    /// Number of symbols (the radix of encoded codes).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index % len`.
    pub fn symbol(&self, index: u64) -> u8 {
        self.symbols[(index % self.symbols.len() as u64) as usize]
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn as_str(&self) -> &str {
        // Constructed from a validated ASCII `&str`.
        std::str::from_utf8(&self.symbols).unwrap_or_default()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.as_bytes().to_vec(),
        }
    }
}

/// Shape of the codes a pool holds: a fixed length over an [`Alphabet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpec {
    length: usize,
    alphabet: Alphabet,
}

impl CodeSpec {
    /// # Errors
    ///
    /// Returns [`CodegenError::InvalidLength`] if `length` is zero.
    pub fn new(length: usize, alphabet: Alphabet) -> Result<Self, CodegenError> {
        if length == 0 {
            return Err(CodegenError::InvalidLength);
        }
        Ok(Self { length, alphabet })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Total number of distinct codes, saturating at `u128::MAX`.
    pub fn space(&self) -> u128 {
        (self.alphabet.len() as u128)
            .checked_pow(self.length as u32)
            .unwrap_or(u128::MAX)
    }

    /// Returns true if `code` has the right length and only alphabet symbols.
    pub fn matches(&self, code: &str) -> bool {
        code.len() == self.length && code.bytes().all(|b| self.alphabet.contains(b))
    }
}

impl Default for CodeSpec {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            alphabet: Alphabet::default(),
        }
    }
}
