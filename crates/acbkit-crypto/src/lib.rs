//! Cipher primitives for CRI `@UTF` tables
//!
//! Encrypted `@UTF` tables are obfuscated with a byte-wise XOR keystream. The
//! keystream is defined by two bytes: a seed and a multiplicative increment.
//! Every output byte is XORed with a running key that starts at the seed and
//! is multiplied by the increment (modulo 256) once per position.
//!
//! # Components
//!
//! - **Stream cipher**: [`UtfCipher`] applies the keystream at any starting
//!   position of a table
//! - **Key recovery**: [`recover_key`] brute-forces the key from the four
//!   encrypted signature bytes, since the plaintext signature is always `@UTF`
//!
//! # Example
//!
//! ```
//! use acbkit_crypto::{recover_key, UtfCipher, UtfKey, UTF_SIGNATURE};
//!
//! let key = UtfKey::new(0x5f, 0x15);
//! let encrypted = UtfCipher::new(key).apply(0, &UTF_SIGNATURE);
//!
//! let recovered = recover_key(
//!     encrypted.as_slice().try_into().expect("four bytes"),
//!     UTF_SIGNATURE,
//! )
//! .expect("key should be recoverable");
//! assert_eq!(recovered, key);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod key_recovery;
pub mod utf_cipher;

pub use error::CryptoError;
pub use key_recovery::recover_key;
pub use utf_cipher::{UtfCipher, UtfKey};

/// Plaintext signature at the start of every `@UTF` table
pub const UTF_SIGNATURE: [u8; 4] = *b"@UTF";
