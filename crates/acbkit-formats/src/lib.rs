//! File format parsers and builders for CRI audio containers
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Many CRI-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate provides symmetric (parser and builder) implementations for the
//! two binary containers found in CRI ADX2 sound banks.
//!
//! # Supported Formats
//!
//! - **@UTF**: Self-describing binary tables with typed columns, optionally
//!   XOR-encrypted. ACB cue sheets are a root `@UTF` table whose blob columns
//!   hold further `@UTF` tables.
//! - **AFS2**: Packed archives (`.awb`, or embedded in an ACB) storing audio
//!   streams keyed by 16-bit cue IDs, with alignment padding between entries.
//!
//! # Offsets
//!
//! Offsets inside a decoded table are relative to the table's own start.
//! Blob fields are the exception: their offsets are absolute positions in the
//! source the table was read from, so nested tables and embedded archives can
//! be decoded straight from the parent's buffer.

#![warn(missing_docs)]

/// AFS2 packed archive format
///
/// Header, cue ID table, variable-width offset table and aligned payloads.
/// See the [`afs2`] module for layout details.
pub mod afs2;
mod limits;
/// `@UTF` table format
///
/// Schema-driven tables with constant and per-row columns, string pool and
/// blob region, plus the XOR-encrypted variant recovered by brute force.
///
/// See the [`utf`] module for layout details and usage examples.
pub mod utf;

pub use limits::DecodeLimits;
