//! Error types for AFS2 archive parsing and building

use thiserror::Error;

/// Errors that can occur when parsing or building AFS2 archives
#[derive(Error, Debug)]
pub enum Afs2Error {
    /// Signature is not `AFS2`
    #[error("No AFS2 header at offset {offset:#x}: found {}", hex::encode(found))]
    NoArchiveHeader {
        /// Absolute offset of the archive
        offset: u64,
        /// Signature bytes found at that offset
        found: [u8; 4],
    },

    /// Offset field width outside 1..=4
    #[error("Unsupported offset field width: {0}")]
    UnsupportedOffsetWidth(u8),

    /// File count does not fit 16 bits
    #[error("File count {0} exceeds max value for u16")]
    FileCountExceeds(u32),

    /// Next file starts before this file's aligned offset
    #[error("Invalid range for cue {cue_id}: start {start:#x}, end {end:#x}")]
    InvalidFileRange {
        /// Cue ID of the file
        cue_id: u16,
        /// Aligned start offset
        start: u64,
        /// End offset from the next entry
        end: u64,
    },

    /// Builder offset does not fit the offset field width
    #[error("Offset {offset:#x} does not fit in {width} bytes")]
    OffsetOverflow {
        /// Offset relative to the archive start
        offset: u64,
        /// Offset field width
        width: u8,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, Afs2Error>;
