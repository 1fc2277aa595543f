//! Column type tags and schema entries

use crate::utf::value::UtfField;

/// Mask selecting the storage nibble of a type tag
pub(crate) const STORAGE_MASK: u8 = 0xF0;

/// Mask selecting the value type nibble of a type tag
pub(crate) const TYPE_MASK: u8 = 0x0F;

/// Where a column's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStorage {
    /// No value stored; the field decodes as null
    Zero,
    /// Value stored once in the schema and shared by every row
    Constant,
    /// Value stored in each row
    PerRow,
}

impl ColumnStorage {
    /// Classify the storage nibble of a type tag
    pub const fn from_tag(tag: u8) -> Self {
        match tag & STORAGE_MASK {
            0x30 | 0x70 => Self::Constant,
            0x50 => Self::PerRow,
            _ => Self::Zero,
        }
    }

    /// Storage nibble written by the builder
    pub const fn code(self) -> u8 {
        match self {
            Self::Zero => 0x10,
            Self::Constant => 0x30,
            Self::PerRow => 0x50,
        }
    }
}

/// Value type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Unsigned byte
    U8,
    /// Signed byte, surfaced as its raw byte
    S8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// String pool reference
    String,
    /// Blob region reference (offset + size)
    Blob,
}

/// Type nibble dispatch table
const COLUMN_TYPES: [Option<ColumnType>; 16] = [
    Some(ColumnType::U8),     // 0x0
    Some(ColumnType::S8),     // 0x1
    Some(ColumnType::U16),    // 0x2
    Some(ColumnType::I16),    // 0x3
    Some(ColumnType::U32),    // 0x4
    Some(ColumnType::I32),    // 0x5
    Some(ColumnType::U64),    // 0x6
    None,                     // 0x7 signed 64-bit, not emitted by known writers
    Some(ColumnType::F32),    // 0x8
    None,                     // 0x9 double, not emitted by known writers
    Some(ColumnType::String), // 0xA
    Some(ColumnType::Blob),   // 0xB
    None,
    None,
    None,
    None,
];

impl ColumnType {
    /// Look up the value type nibble of a type tag
    pub const fn from_tag(tag: u8) -> Option<Self> {
        COLUMN_TYPES[(tag & TYPE_MASK) as usize]
    }

    /// Type nibble for this value type
    pub const fn code(self) -> u8 {
        match self {
            Self::U8 => 0x0,
            Self::S8 => 0x1,
            Self::U16 => 0x2,
            Self::I16 => 0x3,
            Self::U32 => 0x4,
            Self::I32 => 0x5,
            Self::U64 => 0x6,
            Self::F32 => 0x8,
            Self::String => 0xA,
            Self::Blob => 0xB,
        }
    }

    /// Bytes occupied by a stored value
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::String => 4,
            Self::U64 | Self::Blob => 8,
        }
    }
}

/// A schema entry
#[derive(Debug, Clone, PartialEq)]
pub struct UtfColumn {
    /// Raw type tag
    pub tag: u8,
    /// Column name
    pub name: String,
    /// Storage class from the tag's high nibble
    pub storage: ColumnStorage,
    /// Value type; `None` only for zero-storage columns with unknown types
    pub column_type: Option<ColumnType>,
    /// Decoded value for constant and zero-storage columns
    pub(crate) shared: Option<UtfField>,
}

impl UtfColumn {
    /// Value shared by every row, for constant and zero-storage columns
    pub fn shared_value(&self) -> Option<&UtfField> {
        self.shared.as_ref()
    }
}
