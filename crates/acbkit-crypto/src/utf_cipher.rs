//! XOR keystream used by encrypted `@UTF` tables.
//!
//! The keystream is a geometric sequence over `u8`: position `n` of a table
//! is XORed with `seed * increment^n (mod 256)`. Callers decrypt a region by
//! priming the cipher with the region's position in the table. The length
//! field sits at position 4 and the body at position 8, so the table decoder
//! runs two independent calls primed with 4 and 8 steps.
//!
//! Encryption and decryption are the same operation.
//!
//! ```rust
//! use acbkit_crypto::{UtfCipher, UtfKey};
//!
//! let cipher = UtfCipher::new(UtfKey::new(0x5f, 0x15));
//! let body = b"table body".to_vec();
//!
//! let encrypted = cipher.apply(8, &body);
//! assert_eq!(cipher.apply(8, &encrypted), body);
//! ```

use std::fmt;

/// Seed and increment defining a `@UTF` keystream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtfKey {
    /// Initial running key
    pub seed: u8,
    /// Multiplier applied to the running key once per position
    pub increment: u8,
}

impl UtfKey {
    /// Create a key from its seed and increment
    pub const fn new(seed: u8, increment: u8) -> Self {
        Self { seed, increment }
    }
}

impl fmt::Display for UtfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seed={:02x} increment={:02x}", self.seed, self.increment)
    }
}

/// Stateless XOR keystream cipher for `@UTF` tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtfCipher {
    key: UtfKey,
}

impl UtfCipher {
    /// Create a cipher for the given key
    pub const fn new(key: UtfKey) -> Self {
        Self { key }
    }

    /// Key this cipher was created with
    pub const fn key(&self) -> UtfKey {
        self.key
    }

    /// Running key after multiplying the seed by the increment `steps` times
    pub fn key_at(&self, steps: usize) -> u8 {
        let mut running = self.key.seed;
        for _ in 0..steps {
            running = running.wrapping_mul(self.key.increment);
        }
        running
    }

    /// Apply the keystream starting `prime_steps` positions into the table
    ///
    /// Returns a new buffer; see [`Self::apply_keystream`] for the in-place
    /// variant.
    pub fn apply(&self, prime_steps: usize, data: &[u8]) -> Vec<u8> {
        let mut output = data.to_vec();
        self.apply_keystream(prime_steps, &mut output);
        output
    }

    /// Apply the keystream in place, starting `prime_steps` positions in
    pub fn apply_keystream(&self, prime_steps: usize, data: &mut [u8]) {
        let mut running = self.key_at(prime_steps);
        for (position, byte) in data.iter_mut().enumerate() {
            if position > 0 {
                running = running.wrapping_mul(self.key.increment);
            }
            *byte ^= running;
        }
    }
}
