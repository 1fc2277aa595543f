//! Caps applied while decoding untrusted input

use serde::{Deserialize, Serialize};

/// Upper bounds for counts read from `@UTF` headers
///
/// Row and field counts come straight from the input and drive allocation,
/// so they are checked before any rows are materialized. Constant columns
/// repeat in every row, so the memory taken by decoded rows is capped
/// separately while they are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeLimits {
    /// Largest declared table body in bytes
    pub max_table_size: u32,

    /// Largest row count per table
    pub max_rows: u32,

    /// Largest field count per table
    pub max_fields: u16,

    /// Largest memory taken by a table's decoded rows, in bytes
    pub max_decoded_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_table_size: 512 * 1024 * 1024, // 512 MB
            max_rows: 1 << 20,
            max_fields: 1024,
            max_decoded_bytes: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl DecodeLimits {
    /// Limits that accept anything the format can express
    pub const fn unlimited() -> Self {
        Self {
            max_table_size: u32::MAX,
            max_rows: u32::MAX,
            max_fields: u16::MAX,
            max_decoded_bytes: u64::MAX,
        }
    }

    /// Set the largest accepted table body
    #[must_use]
    pub const fn with_max_table_size(mut self, size: u32) -> Self {
        self.max_table_size = size;
        self
    }

    /// Set the largest accepted row count
    #[must_use]
    pub const fn with_max_rows(mut self, rows: u32) -> Self {
        self.max_rows = rows;
        self
    }

    /// Set the largest accepted field count
    #[must_use]
    pub const fn with_max_fields(mut self, fields: u16) -> Self {
        self.max_fields = fields;
        self
    }

    /// Set the largest accepted size of decoded rows
    #[must_use]
    pub const fn with_max_decoded_bytes(mut self, bytes: u64) -> Self {
        self.max_decoded_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let limits = DecodeLimits::default()
            .with_max_rows(10)
            .with_max_fields(4)
            .with_max_table_size(256)
            .with_max_decoded_bytes(4096);
        assert_eq!(limits.max_decoded_bytes, 4096);
        assert_eq!(limits.max_rows, 10);
        assert_eq!(limits.max_fields, 4);
        assert_eq!(limits.max_table_size, 256);
    }

    #[test]
    fn test_unlimited() {
        let limits = DecodeLimits::unlimited();
        assert_eq!(limits.max_rows, u32::MAX);
        assert_eq!(limits.max_fields, u16::MAX);
    }
}
