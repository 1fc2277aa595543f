//! Cross-table cue resolution
//!
//! A cue reaches its waveform through the synth table: the cue's reference
//! items blob (or a position derived from the previous cue's) holds a 16-bit
//! waveform table index. The position is tracked by a [`ReferenceCursor`]
//! threaded through the cue rows in order, since sequence-type cues reuse the
//! previous cue's reference items.

use crate::config::ReferenceStride;
use crate::cue::{CueRecord, CueWaveform};
use crate::encode_type::EncodeType;
use crate::error::{AcbError, Result};
use acbkit_formats::utf::UtfTable;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Direct reference to a synth entry
const REFERENCE_SYNTH: u8 = 2;
/// Sequence references, reusing the previous reference items
const REFERENCE_SEQUENCE: [u8; 2] = [3, 8];

/// Position of the next waveform index in the root buffer
///
/// Arithmetic wraps at 32 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceCursor {
    /// Absolute offset of the current reference items blob
    pub offset: u32,
    /// Size of the current reference items blob
    pub size: u32,
    /// Distance from `offset` to the waveform index
    pub correction: u32,
}

impl ReferenceCursor {
    /// Point the cursor at a synth row's reference items
    fn load(synth: &UtfTable, row: usize) -> Result<Self> {
        if row >= synth.row_count() {
            return Err(AcbError::RowOutOfRange {
                table: "SynthTable",
                row,
                row_count: synth.row_count(),
            });
        }
        let items = synth.blob_ref(row, "ReferenceItems")?;
        Ok(Self {
            offset: items.offset as u32,
            size: items.size,
            correction: 0,
        })
    }

    /// Cursor for cue row `cue_index`, following on from `self`
    pub fn advance(
        self,
        cue_index: usize,
        reference_type: u8,
        reference_index: u16,
        synth: &UtfTable,
        stride: ReferenceStride,
    ) -> Result<Self> {
        match reference_type {
            REFERENCE_SYNTH => {
                let cursor = Self::load(synth, reference_index as usize)?;
                Ok(Self {
                    correction: cursor.size.wrapping_add(2),
                    ..cursor
                })
            }
            t if REFERENCE_SEQUENCE.contains(&t) => {
                if cue_index == 0 {
                    let cursor = Self::load(synth, 0)?;
                    Ok(Self {
                        correction: cursor.size.wrapping_sub(2),
                        ..cursor
                    })
                } else {
                    Ok(Self {
                        correction: self.correction.wrapping_add(stride.bytes()),
                        ..self
                    })
                }
            }
            _ => Err(AcbError::UnexpectedReferenceType {
                cue_index,
                reference_type,
            }),
        }
    }

    /// Absolute offset of the waveform index
    pub const fn index_offset(&self) -> u32 {
        self.offset.wrapping_add(self.correction)
    }
}

/// Tables taking part in resolution
pub struct CueTables<'a> {
    /// Root table; its buffer holds the reference items
    pub root: &'a UtfTable,
    /// `CueTable`
    pub cue: &'a UtfTable,
    /// `SynthTable`
    pub synth: &'a UtfTable,
    /// `WaveformTable`
    pub waveform: &'a UtfTable,
}

impl CueTables<'_> {
    /// Resolve every cue row in order
    pub fn resolve(&self, stride: ReferenceStride) -> Result<Vec<CueRecord>> {
        let cue = self.cue;
        let (_, records) = (0..cue.row_count()).try_fold(
            (ReferenceCursor::default(), Vec::with_capacity(cue.row_count())),
            |(cursor, mut records), index| {
                let cue_id = cue.get_u32(index, "CueId")?;
                let reference_type = cue.get_u8(index, "ReferenceType")?;
                let reference_index = cue.get_u16(index, "ReferenceIndex")?;

                let cursor =
                    cursor.advance(index, reference_type, reference_index, self.synth, stride)?;
                let waveform = if cursor.size == 0 {
                    None
                } else {
                    Some(self.waveform_at(cursor)?)
                };

                trace!(
                    "Cue {cue_id}: type={reference_type} index={reference_index} cursor={cursor:?} waveform={waveform:?}"
                );
                records.push(CueRecord {
                    cue_id,
                    reference_type,
                    reference_index,
                    waveform,
                    name: None,
                });
                Ok::<_, AcbError>((cursor, records))
            },
        )?;
        Ok(records)
    }

    fn waveform_at(&self, cursor: ReferenceCursor) -> Result<CueWaveform> {
        let index = self.root.read_u16_at(cursor.index_offset() as usize)?;
        let row = index as usize;
        if row >= self.waveform.row_count() {
            return Err(AcbError::RowOutOfRange {
                table: "WaveformTable",
                row,
                row_count: self.waveform.row_count(),
            });
        }

        Ok(CueWaveform {
            index,
            id: self.waveform.get_u16(row, "Id")?,
            encode_type: EncodeType::from_code(self.waveform.get_u8(row, "EncodeType")?),
            streaming: self.waveform.get_u8(row, "Streaming")? != 0,
        })
    }
}

/// Attach names from the cue name table to identified cues
///
/// Returns the name to waveform ID map. Rows naming a cue index outside the
/// cue list are skipped.
pub fn apply_names(records: &mut [CueRecord], names: &UtfTable) -> Result<BTreeMap<String, u16>> {
    let mut by_name = BTreeMap::new();

    for row in 0..names.row_count() {
        let cue_index = names.get_u16(row, "CueIndex")? as usize;
        let Some(record) = records.get_mut(cue_index) else {
            warn!(
                "Cue name row {row} points at cue {cue_index}, only {} cues",
                records.len()
            );
            continue;
        };
        let Some(waveform) = record.waveform else {
            continue;
        };

        let name = names.get_str(row, "CueName")?.to_string();
        by_name.insert(name.clone(), waveform.id);
        record.name = Some(name);
    }

    Ok(by_name)
}
