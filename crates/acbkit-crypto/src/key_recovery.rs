//! Brute-force recovery of a `@UTF` key from its encrypted signature
//!
//! The seed falls out of the first byte directly (`observed[0] ^ expected[0]`).
//! The increment is found by trying all 256 candidates against the remaining
//! three signature bytes. Several increments can produce the same four
//! keystream bytes when the seed is even; the lowest one is returned, which
//! decrypts the table identically.

use crate::error::CryptoError;
use crate::utf_cipher::UtfKey;
use tracing::{debug, trace};

/// Recover the key that turns `expected` into `observed`
///
/// # Errors
///
/// Returns [`CryptoError::KeyNotRecovered`] if no increment reproduces all
/// four bytes, meaning the input is not an encrypted table.
pub fn recover_key(observed: [u8; 4], expected: [u8; 4]) -> Result<UtfKey, CryptoError> {
    let seed = observed[0] ^ expected[0];

    let increment = (0..=u8::MAX).find(|&increment| {
        let mut running = seed;
        observed
            .iter()
            .zip(expected.iter())
            .enumerate()
            .all(|(position, (&enc, &plain))| {
                if position > 0 {
                    running = running.wrapping_mul(increment);
                }
                enc == plain ^ running
            })
    });

    match increment {
        Some(increment) => {
            let key = UtfKey::new(seed, increment);
            debug!("Recovered @UTF key: {key}");
            Ok(key)
        }
        None => {
            trace!(
                "Key search exhausted for signature {}",
                hex::encode(observed)
            );
            Err(CryptoError::KeyNotRecovered { observed, expected })
        }
    }
}
