//! Error types for `@UTF` table parsing and building

use crate::utf::column::ColumnType;
use thiserror::Error;

/// Errors that can occur when parsing or building `@UTF` tables
#[derive(Error, Debug)]
pub enum UtfError {
    /// Signature is neither `@UTF` nor an encrypted form of it
    #[error("No @UTF header at offset {offset:#x}: found {}", hex::encode(found))]
    NoHeader {
        /// Absolute offset of the table
        offset: u64,
        /// Signature bytes found at that offset
        found: [u8; 4],
        /// Key search failure
        #[source]
        source: acbkit_crypto::CryptoError,
    },

    /// Column type nibble outside the known value types
    #[error("Unknown column type {tag:#04x} for field '{field}'")]
    UnknownColumnType {
        /// Full type tag byte
        tag: u8,
        /// Field name the tag was declared for
        field: String,
    },

    /// Read past the end of the table buffer
    #[error("Read of {length} bytes at {offset:#x} exceeds table size {available:#x}")]
    OutOfBounds {
        /// Offset of the read within the table
        offset: usize,
        /// Number of bytes requested
        length: usize,
        /// Size of the table buffer
        available: usize,
    },

    /// A header count exceeds the configured decode limits
    #[error("{what} {value} exceeds limit {limit}")]
    LimitExceeded {
        /// Name of the checked quantity
        what: &'static str,
        /// Value found in the input
        value: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Row index beyond the table's row count
    #[error("Row {row} out of range for table '{table}' with {row_count} rows")]
    RowOutOfRange {
        /// Table name
        table: String,
        /// Requested row
        row: usize,
        /// Rows in the table
        row_count: usize,
    },

    /// Field missing from a row
    #[error("Field '{field}' not found in row {row} of table '{table}'")]
    FieldNotFound {
        /// Table name
        table: String,
        /// Row index
        row: usize,
        /// Requested field name
        field: String,
    },

    /// Field holds a value of a different type than requested
    #[error("Field '{field}' in row {row} of table '{table}' is {found}, expected {expected}")]
    FieldType {
        /// Table name
        table: String,
        /// Row index
        row: usize,
        /// Field name
        field: String,
        /// Requested type
        expected: &'static str,
        /// Type actually stored
        found: &'static str,
    },

    /// Builder row does not match the per-row columns
    #[error("Field count mismatch: expected {expected}, got {actual}")]
    FieldCountMismatch {
        /// Number of per-row columns
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Builder value does not match its column type
    #[error("Value for field '{field}' is {found}, column type is {expected:?}")]
    ValueTypeMismatch {
        /// Field name
        field: String,
        /// Declared column type
        expected: ColumnType,
        /// Type of the supplied value
        found: &'static str,
    },

    /// Builder output does not fit the header's offset fields
    #[error("Table layout overflow: {0}")]
    LayoutOverflow(&'static str),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for `@UTF` operation results
pub type Result<T> = std::result::Result<T, UtfError>;
