//! Content fingerprints for cache-busting file names
//!
//! A fingerprint is a short string derived from file bytes. The default
//! hashes with XXH64 (seed 0) and spells the 64-bit result in base 36
//! using `0-9A-Z`. Any `Fn(&[u8]) -> String` can stand in for it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Symbols of the default base-36 alphabet.
pub const BASE36: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maps file bytes to a deterministic digest string.
///
/// Implementations must be pure: the same bytes always produce the same
/// string. This is a cache key, not a security boundary.
pub trait FingerprintFunction: Send + Sync {
    fn fingerprint(&self, bytes: &[u8]) -> String;
}

impl<F> FingerprintFunction for F
where
    F: Fn(&[u8]) -> String + Send + Sync,
{
    fn fingerprint(&self, bytes: &[u8]) -> String {
        self(bytes)
    }
}

/// Ordered set of distinct ASCII symbols used as digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Validate and build an alphabet.
    ///
    /// Requires at least two symbols, all ASCII and pairwise distinct.
    pub fn new(symbols: &str) -> Result<Self> {
        if !symbols.is_ascii() {
            return Err(Error::InvalidAlphabet {
                reason: "symbols must be ASCII".into(),
            });
        }
        let bytes = symbols.as_bytes();
        if bytes.len() < 2 {
            return Err(Error::InvalidAlphabet {
                reason: format!("need at least 2 symbols, got {}", bytes.len()),
            });
        }
        for (i, symbol) in bytes.iter().enumerate() {
            if bytes[..i].contains(symbol) {
                return Err(Error::InvalidAlphabet {
                    reason: format!("duplicate symbol '{}'", *symbol as char),
                });
            }
        }
        Ok(Self {
            symbols: bytes.to_vec(),
        })
    }

    pub fn base36() -> Self {
        Self {
            symbols: BASE36.as_bytes().to_vec(),
        }
    }

    pub fn radix(&self) -> u64 {
        self.symbols.len() as u64
    }

    pub fn as_str(&self) -> &str {
        // Validated as ASCII on construction
        std::str::from_utf8(&self.symbols).unwrap_or_default()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::base36()
    }
}

/// Spell `value` in the positional system given by `alphabet`.
///
/// No padding or fixed width; zero encodes as the alphabet's first symbol.
pub fn encode_base(mut value: u64, alphabet: &Alphabet) -> String {
    let radix = alphabet.radix();
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet.symbols[(value % radix) as usize]);
        value /= radix;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// XXH64 digest encoded over an alphabet. The default fingerprint.
#[derive(Debug, Clone, Default)]
pub struct Xxh64Fingerprint {
    pub seed: u64,
    pub alphabet: Alphabet,
}

impl Xxh64Fingerprint {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { seed: 0, alphabet }
    }
}

impl FingerprintFunction for Xxh64Fingerprint {
    fn fingerprint(&self, bytes: &[u8]) -> String {
        encode_base(xxhash_rust::xxh64::xxh64(bytes, self.seed), &self.alphabet)
    }
}

/// XXH3 (64-bit) digest encoded over an alphabet.
#[derive(Debug, Clone, Default)]
pub struct Xxh3Fingerprint {
    pub alphabet: Alphabet,
}

impl FingerprintFunction for Xxh3Fingerprint {
    fn fingerprint(&self, bytes: &[u8]) -> String {
        encode_base(xxhash_rust::xxh3::xxh3_64(bytes), &self.alphabet)
    }
}

/// Built-in hash selectable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Xxh64,
    Xxh3,
}

impl HashAlgorithm {
    /// Build the fingerprint function for this algorithm.
    pub fn build(self, alphabet: Alphabet) -> Box<dyn FingerprintFunction> {
        match self {
            Self::Xxh64 => Box::new(Xxh64Fingerprint::new(alphabet)),
            Self::Xxh3 => Box::new(Xxh3Fingerprint { alphabet }),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xxh64" => Ok(Self::Xxh64),
            "xxh3" => Ok(Self::Xxh3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// The engine's default fingerprint: XXH64 in base 36.
pub fn default_fingerprint() -> Box<dyn FingerprintFunction> {
    Box::new(Xxh64Fingerprint::default())
}
