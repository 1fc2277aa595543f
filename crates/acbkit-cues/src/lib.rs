//! Cue resolution for CRI ACB sound banks
//!
//! An ACB file is a root `@UTF` table whose blob columns hold the cue,
//! cue name, synth and waveform tables, and optionally an embedded AFS2
//! archive. Streamed banks keep some or all payloads in a sibling `.awb`
//! file instead.
//!
//! [`AcbFile`] decodes the tables, follows each cue through the synth table
//! to its waveform, attaches cue names and exposes the payloads by file
//! name.
//!
//! # Example
//!
//! ```no_run
//! use acbkit_cues::{AcbConfig, AcbFile, ReferenceStride};
//!
//! let config = AcbConfig::default().with_reference_stride(ReferenceStride::Four);
//! let acb = AcbFile::open_with_config("bgm.acb", &config)?;
//!
//! for (name, data) in acb.files() {
//!     println!("{name}: {} bytes", data.len());
//! }
//! # Ok::<(), acbkit_cues::AcbError>(())
//! ```

#![warn(missing_docs)]

mod acb_file;
pub mod config;
mod cue;
mod encode_type;
mod error;
pub mod resolver;
mod stream_awb;

pub use acb_file::AcbFile;
pub use config::{AcbConfig, DEFAULT_STREAM_AWB_SUFFIXES, ReferenceStride};
pub use cue::{CueRecord, CueWaveform};
pub use encode_type::EncodeType;
pub use error::{AcbError, Result};
pub use resolver::ReferenceCursor;
pub use stream_awb::find_stream_awb;
