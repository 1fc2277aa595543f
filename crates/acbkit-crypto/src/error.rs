//! Error types for cipher operations

use thiserror::Error;

/// Errors that can occur during cipher operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// No increment reproduces the observed signature from the expected one
    #[error(
        "No key reproduces signature {} from {}",
        hex::encode(observed),
        hex::encode(expected)
    )]
    KeyNotRecovered {
        /// Signature bytes found in the input
        observed: [u8; 4],
        /// Plaintext signature the input was expected to carry
        expected: [u8; 4],
    },
}
