//! Decoded field values

use crate::utf::column::ColumnType;
use bytes::Bytes;
use std::fmt;

/// A decoded `@UTF` value
#[derive(Debug, Clone, PartialEq)]
pub enum UtfValue {
    /// Zero-storage column, no value stored
    Null,
    /// 1-byte value (both byte column types)
    U8(u8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// String from the string pool
    String(String),
    /// Bytes from the blob region, sharing the table buffer when decoded
    Blob(Bytes),
}

impl UtfValue {
    /// Blob value from owned or static bytes
    pub fn blob(data: impl Into<Bytes>) -> Self {
        Self::Blob(data.into())
    }

    /// Short name of the stored type, used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
        }
    }

    /// Column type that stores this value
    pub const fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Null => None,
            Self::U8(_) => Some(ColumnType::U8),
            Self::U16(_) => Some(ColumnType::U16),
            Self::I16(_) => Some(ColumnType::I16),
            Self::U32(_) => Some(ColumnType::U32),
            Self::I32(_) => Some(ColumnType::I32),
            Self::U64(_) => Some(ColumnType::U64),
            Self::F32(_) => Some(ColumnType::F32),
            Self::String(_) => Some(ColumnType::String),
            Self::Blob(_) => Some(ColumnType::Blob),
        }
    }

    /// Whether this value can be stored in a column of the given type
    pub fn fits(&self, column_type: ColumnType) -> bool {
        match (self, column_type) {
            (Self::U8(_), ColumnType::U8 | ColumnType::S8) => true,
            (value, column_type) => value.column_type() == Some(column_type),
        }
    }

    /// Byte value
    pub const fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned value of at most 16 bits, widened
    pub const fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U8(v) => Some(*v as u16),
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned value of at most 32 bits, widened
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(*v as u32),
            Self::U16(v) => Some(*v as u32),
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned value, widened
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(*v as u64),
            Self::U16(v) => Some(*v as u64),
            Self::U32(v) => Some(*v as u64),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed value, widened
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I16(v) => Some(*v as i32),
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Blob bytes
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether the value is present and non-zero
    ///
    /// Blobs and strings count as non-zero when non-empty.
    pub fn is_nonzero(&self) -> bool {
        match self {
            Self::Null => false,
            Self::U8(v) => *v != 0,
            Self::U16(v) => *v != 0,
            Self::I16(v) => *v != 0,
            Self::U32(v) => *v != 0,
            Self::I32(v) => *v != 0,
            Self::U64(v) => *v != 0,
            Self::F32(v) => *v != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Blob(bytes) => !bytes.is_empty(),
        }
    }
}

impl fmt::Display for UtfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Location of a blob in the source a table was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobRef {
    /// Absolute offset in the source
    pub offset: u64,
    /// Length in bytes
    pub size: u32,
}

/// A named, typed field of a decoded row
#[derive(Debug, Clone, PartialEq)]
pub struct UtfField {
    /// Raw type tag from the schema
    pub tag: u8,
    /// Field name
    pub name: String,
    /// Decoded value
    pub value: UtfValue,
    /// Source location, blob fields only
    pub blob: Option<BlobRef>,
}

impl UtfField {
    /// Absolute source offset of a blob field, zero otherwise
    pub fn offset(&self) -> u64 {
        self.blob.map_or(0, |blob| blob.offset)
    }

    /// Size of a blob field, zero otherwise
    pub fn size(&self) -> u32 {
        self.blob.map_or(0, |blob| blob.size)
    }
}
