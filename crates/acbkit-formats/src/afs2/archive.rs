//! AFS2 archive decoding

use crate::afs2::error::{Afs2Error, ArchiveResult};
use crate::afs2::header::{AFS2_SIGNATURE, Afs2Header};
use binrw::BinRead;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Round `value` up to a multiple of `alignment`
pub fn align_up(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

/// One stored payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Afs2File {
    /// Cue ID the payload is stored under
    pub cue_id: u16,
    /// Absolute offset from the offset table
    pub raw_offset: u64,
    /// Absolute offset rounded up to the archive alignment
    pub aligned_offset: u64,
    /// Bytes between the aligned offset and the next entry
    pub length: u64,
    /// Payload with leading zero padding stripped
    pub data: Vec<u8>,
}

/// A decoded AFS2 archive
#[derive(Debug, Clone)]
pub struct Afs2Archive {
    /// Decoded header
    pub header: Afs2Header,
    /// Absolute offset of the archive in its source
    pub base_offset: u64,
    files: BTreeMap<u16, Afs2File>,
}

impl Afs2Archive {
    /// Decode an archive at `offset` in `reader`
    pub fn read_from<R: Read + Seek>(reader: &mut R, offset: u64) -> ArchiveResult<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if signature != AFS2_SIGNATURE {
            return Err(Afs2Error::NoArchiveHeader {
                offset,
                found: signature,
            });
        }

        reader.seek(SeekFrom::Start(offset))?;
        let header = Afs2Header::read(reader)?;
        header.validate()?;

        let count = header.file_count as usize;
        let width = header.offset_width() as usize;
        let mask = header.offset_mask();
        let alignment = u64::from(header.effective_alignment());

        let mut tables = vec![0u8; header.tables_size()];
        reader.read_exact(&mut tables)?;
        let (id_table, offset_table) = tables.split_at(count * 2);

        let cue_ids: Vec<u16> = id_table
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();

        let raw_offsets: Vec<u64> = offset_table
            .chunks_exact(width)
            .map(|chunk| {
                let mut bytes = [0u8; 4];
                bytes[..width].copy_from_slice(chunk);
                offset + u64::from(u32::from_le_bytes(bytes) & mask)
            })
            .collect();

        let aligned_offsets: Vec<u64> = raw_offsets[..count]
            .iter()
            .map(|&raw| align_up(raw, alignment))
            .collect();

        let mut files = BTreeMap::new();
        for (index, &cue_id) in cue_ids.iter().enumerate() {
            let aligned_offset = aligned_offsets[index];
            let end = raw_offsets[index + 1];
            let length = end
                .checked_sub(aligned_offset)
                .ok_or(Afs2Error::InvalidFileRange {
                    cue_id,
                    start: aligned_offset,
                    end,
                })?;

            let data = read_payload(reader, aligned_offset, length)?;
            trace!(
                "AFS2 entry {cue_id}: raw={:#x} aligned={aligned_offset:#x} length={length}",
                raw_offsets[index]
            );

            files.insert(
                cue_id,
                Afs2File {
                    cue_id,
                    raw_offset: raw_offsets[index],
                    aligned_offset,
                    length,
                    data,
                },
            );
        }

        debug!(
            "Decoded AFS2 archive at {:#x}: {} entries, {} cue IDs, width {}, alignment {}",
            offset,
            count,
            files.len(),
            width,
            alignment
        );

        Ok(Self {
            header,
            base_offset: offset,
            files,
        })
    }

    /// Decode an archive at `offset` within an in-memory buffer
    pub fn parse(data: &[u8], offset: u64) -> ArchiveResult<Self> {
        Self::read_from(&mut Cursor::new(data), offset)
    }

    /// Get a file by cue ID
    pub fn get(&self, cue_id: u16) -> Option<&Afs2File> {
        self.files.get(&cue_id)
    }

    /// Get a payload by cue ID
    pub fn data(&self, cue_id: u16) -> Option<&[u8]> {
        self.files.get(&cue_id).map(|file| file.data.as_slice())
    }

    /// Iterate files in cue ID order
    pub fn iter(&self) -> impl Iterator<Item = &Afs2File> {
        self.files.values()
    }

    /// Number of distinct cue IDs
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn read_payload<R: Read + Seek>(reader: &mut R, offset: u64, length: u64) -> ArchiveResult<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut data = Vec::new();
    (&mut *reader).take(length).read_to_end(&mut data)?;
    if data.len() as u64 != length {
        return Err(Afs2Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "payload at {offset:#x} declares {length} bytes, {} available",
                data.len()
            ),
        )));
    }

    let start = data.iter().position(|&b| b != 0).unwrap_or(data.len());
    data.drain(..start);
    Ok(data)
}
