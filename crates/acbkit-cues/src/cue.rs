//! Resolved cue records

use crate::encode_type::EncodeType;
use serde::Serialize;

/// Waveform a cue resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CueWaveform {
    /// Row in the waveform table
    pub index: u16,
    /// Waveform `Id`
    pub id: u16,
    /// Codec of the waveform
    pub encode_type: EncodeType,
    /// Stored in the sibling stream archive
    pub streaming: bool,
}

/// One row of the cue table after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueRecord {
    /// `CueId`, also the archive key
    pub cue_id: u32,
    /// `ReferenceType`
    pub reference_type: u8,
    /// `ReferenceIndex` into the synth table
    pub reference_index: u16,
    /// Resolved waveform, `None` when the reference items were empty
    pub waveform: Option<CueWaveform>,
    /// Name from the cue name table
    pub name: Option<String>,
}

impl CueRecord {
    /// Whether a waveform was found for this cue
    pub const fn is_identified(&self) -> bool {
        self.waveform.is_some()
    }

    /// Archive key for this cue's payload
    pub const fn archive_id(&self) -> u16 {
        self.cue_id as u16
    }

    /// Output file name, `name` followed by the encode type's extension
    pub fn file_name(&self) -> Option<String> {
        let waveform = self.waveform?;
        let name = self.name.as_deref()?;
        Some(format!("{name}{}", waveform.encode_type.extension()))
    }
}
