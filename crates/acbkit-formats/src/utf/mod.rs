//! `@UTF` table format support
//!
//! `@UTF` tables are the self-describing binary tables CRI middleware uses for
//! cue sheets (ACB) and related metadata. A table carries its own schema, so
//! decoding needs no external type information.
//!
//! # Format Structure
//!
//! ```text
//! @UTF Table (big-endian):
//! ├── Header (32 bytes)
//! │   ├── signature "@UTF" (4)
//! │   ├── table_size (u32, bytes following this field)
//! │   ├── version (u16)
//! │   ├── rows_offset (u16, +8)
//! │   ├── string_pool_offset (u32, +8)
//! │   ├── data_offset (u32, +8)
//! │   ├── table_name_offset (u32, into string pool)
//! │   ├── field_count (u16)
//! │   ├── row_size (u16)
//! │   └── row_count (u32)
//! ├── Schema (at 0x20, field_count entries)
//! │   ├── type tag (u8: storage nibble | value type nibble)
//! │   ├── name offset (u32, into string pool)
//! │   └── [inline value, constant storage only]
//! ├── Rows (row_count × row_size, per-row values in schema order)
//! ├── String pool (NUL-terminated strings)
//! └── Blob region (variable-length byte data)
//! ```
//!
//! # Encryption
//!
//! Some tables are XORed with the keystream from [`acbkit_crypto::UtfCipher`].
//! The key is recovered from the first four bytes, which must decrypt to
//! `@UTF`. The decoded table keeps a plaintext copy of itself.
//!
//! # Example
//!
//! ```
//! use acbkit_formats::utf::{ColumnType, UtfTable, UtfTableBuilder, UtfValue};
//!
//! let mut builder = UtfTableBuilder::new("Waveform");
//! builder
//!     .per_row("Id", ColumnType::U16)
//!     .per_row("EncodeType", ColumnType::U8)
//!     .constant("Streaming", UtfValue::U8(0));
//! builder
//!     .add_row(vec![UtfValue::U16(12), UtfValue::U8(2)])
//!     .expect("row matches schema");
//!
//! let bytes = builder.build().expect("table should build");
//! let table = UtfTable::parse(&bytes, 0).expect("table should decode");
//!
//! assert_eq!(table.name, "Waveform");
//! assert_eq!(table.get_u16(0, "Id").expect("Id column"), 12);
//! assert_eq!(table.get_u8(0, "Streaming").expect("Streaming column"), 0);
//! ```

mod builder;
mod column;
mod error;
mod header;
mod table;
mod value;

pub use builder::UtfTableBuilder;
pub use column::{ColumnStorage, ColumnType, UtfColumn};
pub use error::{Result, UtfError};
pub use header::{UTF_HEADER_SIZE, UtfHeader};
pub use table::{UtfRow, UtfTable};
pub use value::{BlobRef, UtfField, UtfValue};

pub use acbkit_crypto::UTF_SIGNATURE;
