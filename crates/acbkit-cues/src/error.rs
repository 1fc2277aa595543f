//! Error types for ACB loading and cue resolution

use acbkit_formats::afs2::Afs2Error;
use acbkit_formats::utf::UtfError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an ACB sound bank
#[derive(Error, Debug)]
pub enum AcbError {
    /// Root table lacks a required nested table
    #[error("Root table has no '{0}' table")]
    MissingTable(&'static str),

    /// Cue uses a reference type the resolver does not follow
    #[error("Unexpected reference type {reference_type} for cue row {cue_index}")]
    UnexpectedReferenceType {
        /// Row of the cue in the cue table
        cue_index: usize,
        /// Reference type found
        reference_type: u8,
    },

    /// Cue data points at a row the referenced table does not have
    #[error("Row {row} out of range for {table} with {row_count} rows")]
    RowOutOfRange {
        /// Referenced table
        table: &'static str,
        /// Requested row
        row: usize,
        /// Rows in the table
        row_count: usize,
    },

    /// Streamed bank without a matching sibling archive
    #[error("No stream AWB found next to {}", .0.display())]
    AwbFileNotFound(PathBuf),

    /// Table decoding failed
    #[error("Table error: {0}")]
    Utf(#[from] UtfError),

    /// Archive decoding failed
    #[error("Archive error: {0}")]
    Afs2(#[from] Afs2Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ACB operations
pub type Result<T> = std::result::Result<T, AcbError>;
