//! `@UTF` table header parsing and building

use crate::utf::UTF_SIGNATURE;
use binrw::{BinRead, BinWrite};

/// Size of the fixed header; the schema starts right after it
pub const UTF_HEADER_SIZE: usize = 0x20;

/// `@UTF` table header
///
/// All region offsets except `table_name_offset` are stored relative to the
/// end of the size field (byte 8). The `*_start` accessors return them
/// relative to the start of the table.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct UtfHeader {
    /// Magic signature, always "@UTF" once decrypted
    #[br(assert(magic == UTF_SIGNATURE, "Invalid @UTF magic: got {:?}", magic))]
    pub magic: [u8; 4],

    /// Number of bytes following this field
    pub table_size: u32,

    /// Format version, unused by the decoder
    pub version: u16,

    /// Row region offset (relative to byte 8)
    pub rows_offset: u16,

    /// String pool offset (relative to byte 8)
    pub string_pool_offset: u32,

    /// Blob region offset (relative to byte 8)
    pub data_offset: u32,

    /// Table name offset within the string pool
    pub table_name_offset: u32,

    /// Number of columns in the schema
    pub field_count: u16,

    /// Bytes per row in the row region
    pub row_size: u16,

    /// Number of rows
    pub row_count: u32,
}

impl UtfHeader {
    /// Start of the row region
    pub fn rows_start(&self) -> usize {
        self.rows_offset as usize + 8
    }

    /// Start of the string pool
    pub fn string_pool_start(&self) -> usize {
        self.string_pool_offset as usize + 8
    }

    /// Start of the blob region
    pub fn data_start(&self) -> usize {
        self.data_offset as usize + 8
    }

    /// Total table length including signature and size field
    pub fn total_size(&self) -> usize {
        self.table_size as usize + 8
    }
}
