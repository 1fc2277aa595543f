//! Loader configuration

use acbkit_formats::DecodeLimits;
use serde::{Deserialize, Serialize};

/// Bytes added to the reference correction for each repeated
/// sequence-type (3 or 8) cue after the first row
///
/// Banks from different tool versions disagree on this value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceStride {
    /// Advance by one 16-bit index
    #[default]
    Two,
    /// Advance by one (type, index) reference item
    Four,
}

impl ReferenceStride {
    /// Stride in bytes
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

/// Suffixes tried against the bank path, in order
pub const DEFAULT_STREAM_AWB_SUFFIXES: [&str; 3] = ["_streamfiles.awb", ".awb", "_STR.awb"];

/// Configuration for [`crate::AcbFile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcbConfig {
    /// Correction stride for repeated sequence references
    pub reference_stride: ReferenceStride,

    /// Sibling archive suffixes, appended to the bank path without its
    /// extension
    pub stream_awb_suffixes: Vec<String>,

    /// Caps for every table decoded from the bank
    pub limits: DecodeLimits,

    /// Load the sibling archive of streamed banks
    pub load_stream_awb: bool,
}

impl Default for AcbConfig {
    fn default() -> Self {
        Self {
            reference_stride: ReferenceStride::default(),
            stream_awb_suffixes: DEFAULT_STREAM_AWB_SUFFIXES
                .iter()
                .map(|suffix| (*suffix).to_string())
                .collect(),
            limits: DecodeLimits::default(),
            load_stream_awb: true,
        }
    }
}

impl AcbConfig {
    /// Set the reference stride
    #[must_use]
    pub const fn with_reference_stride(mut self, stride: ReferenceStride) -> Self {
        self.reference_stride = stride;
        self
    }

    /// Replace the sibling archive suffixes
    #[must_use]
    pub fn with_stream_awb_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stream_awb_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the table decode limits
    #[must_use]
    pub const fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable loading the sibling archive
    #[must_use]
    pub const fn with_stream_awb(mut self, enable: bool) -> Self {
        self.load_stream_awb = enable;
        self
    }
}
