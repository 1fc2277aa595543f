//! Waveform encode types and their file extensions

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Codec of a waveform, from the waveform table's `EncodeType` byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodeType {
    /// CRI ADX
    Adx,
    /// CRI HCA
    Hca,
    /// Sony VAG
    Vag,
    /// Sony ATRAC3
    Atrac3,
    /// Nintendo BCWAV
    Bcwav,
    /// Nintendo DSP ADPCM
    NintendoDsp,
    /// Any other code
    Other(u8),
}

impl EncodeType {
    /// Classify an `EncodeType` byte
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Adx,
            2 => Self::Hca,
            7 => Self::Vag,
            8 => Self::Atrac3,
            9 => Self::Bcwav,
            13 => Self::NintendoDsp,
            other => Self::Other(other),
        }
    }

    /// Raw `EncodeType` byte
    pub const fn code(self) -> u8 {
        match self {
            Self::Adx => 0,
            Self::Hca => 2,
            Self::Vag => 7,
            Self::Atrac3 => 8,
            Self::Bcwav => 9,
            Self::NintendoDsp => 13,
            Self::Other(code) => code,
        }
    }

    /// File extension including the leading dot
    pub fn extension(self) -> Cow<'static, str> {
        match self {
            Self::Adx => Cow::Borrowed(".adx"),
            Self::Hca => Cow::Borrowed(".hca"),
            Self::Vag => Cow::Borrowed(".vag"),
            Self::Atrac3 => Cow::Borrowed(".at3"),
            Self::Bcwav => Cow::Borrowed(".bcwav"),
            Self::NintendoDsp => Cow::Borrowed(".dsp"),
            Self::Other(code) => Cow::Owned(format!(".EncodeType-{code}.bin")),
        }
    }
}

impl From<u8> for EncodeType {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for EncodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adx => write!(f, "ADX"),
            Self::Hca => write!(f, "HCA"),
            Self::Vag => write!(f, "VAG"),
            Self::Atrac3 => write!(f, "ATRAC3"),
            Self::Bcwav => write!(f, "BCWAV"),
            Self::NintendoDsp => write!(f, "DSP"),
            Self::Other(code) => write!(f, "EncodeType-{code}"),
        }
    }
}
