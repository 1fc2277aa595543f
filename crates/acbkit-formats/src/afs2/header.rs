//! AFS2 header parsing and building

use crate::afs2::error::{Afs2Error, ArchiveResult};
use binrw::{BinRead, BinWrite};

/// Archive signature
pub const AFS2_SIGNATURE: [u8; 4] = *b"AFS2";

/// Size of the fixed header; the cue ID table starts right after it
pub const AFS2_HEADER_SIZE: usize = 0x10;

/// AFS2 archive header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Afs2Header {
    /// Magic signature "AFS2"
    #[br(assert(magic == AFS2_SIGNATURE, "Invalid AFS2 magic: got {:?}", magic))]
    pub magic: [u8; 4],

    /// Version bytes; byte 1 is the offset field width
    pub version: [u8; 4],

    /// Number of files
    pub file_count: u32,

    /// Payload alignment in bytes, 0 meaning none
    pub alignment: u32,
}

impl Afs2Header {
    /// Create a header for `file_count` files
    pub const fn new(offset_width: u8, file_count: u32, alignment: u32) -> Self {
        Self {
            magic: AFS2_SIGNATURE,
            version: [1, offset_width, 2, 0],
            file_count,
            alignment,
        }
    }

    /// Width in bytes of each offset table entry
    pub const fn offset_width(&self) -> u8 {
        self.version[1]
    }

    /// Mask selecting the low `offset_width` bytes
    pub const fn offset_mask(&self) -> u32 {
        match self.offset_width() {
            width @ 1..=3 => (1u32 << (8 * width as u32)) - 1,
            _ => u32::MAX,
        }
    }

    /// Alignment with zero treated as one
    pub const fn effective_alignment(&self) -> u32 {
        if self.alignment == 0 { 1 } else { self.alignment }
    }

    /// Check the offset width and file count
    pub fn validate(&self) -> ArchiveResult<()> {
        if !(1..=4).contains(&self.offset_width()) {
            return Err(Afs2Error::UnsupportedOffsetWidth(self.offset_width()));
        }
        if self.file_count > u32::from(u16::MAX) {
            return Err(Afs2Error::FileCountExceeds(self.file_count));
        }
        Ok(())
    }

    /// Size of the cue ID and offset tables following the header
    pub fn tables_size(&self) -> usize {
        let count = self.file_count as usize;
        count * 2 + (count + 1) * self.offset_width() as usize
    }
}
