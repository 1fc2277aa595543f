//! `@UTF` table builder

use crate::utf::column::{ColumnStorage, ColumnType};
use crate::utf::error::{Result, UtfError};
use crate::utf::header::{UTF_HEADER_SIZE, UtfHeader};
use crate::utf::value::UtfValue;
use acbkit_crypto::{UTF_SIGNATURE, UtfCipher, UtfKey};
use binrw::BinWrite;
use binrw::io::Cursor;
use std::collections::HashMap;
use tracing::debug;

/// Placeholder string every pool starts with
const NULL_STRING: &str = "<NULL>";

#[derive(Debug, Clone)]
struct ColumnDef {
    name: String,
    storage: ColumnStorage,
    column_type: ColumnType,
    constant: Option<UtfValue>,
}

/// Builder for `@UTF` tables
///
/// Columns are declared first, then rows supply one value per per-row
/// column in declaration order.
#[derive(Debug, Clone)]
pub struct UtfTableBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<UtfValue>>,
    key: Option<UtfKey>,
    blob_alignment: usize,
}

impl UtfTableBuilder {
    /// Start a table with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            key: None,
            blob_alignment: 1,
        }
    }

    /// Declare a column stored in every row
    pub fn per_row(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            storage: ColumnStorage::PerRow,
            column_type,
            constant: None,
        });
        self
    }

    /// Declare a column whose value is stored once and shared by every row
    ///
    /// [`UtfValue::Null`] declares a zero-storage column instead.
    pub fn constant(&mut self, name: impl Into<String>, value: UtfValue) -> &mut Self {
        let column = match value.column_type() {
            Some(column_type) => ColumnDef {
                name: name.into(),
                storage: ColumnStorage::Constant,
                column_type,
                constant: Some(value),
            },
            None => ColumnDef {
                name: name.into(),
                storage: ColumnStorage::Zero,
                column_type: ColumnType::U8,
                constant: None,
            },
        };
        self.columns.push(column);
        self
    }

    /// Declare a zero-storage column of the given type
    pub fn zero(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            storage: ColumnStorage::Zero,
            column_type,
            constant: None,
        });
        self
    }

    /// Append a row of per-row values
    pub fn add_row(&mut self, values: Vec<UtfValue>) -> Result<&mut Self> {
        let per_row: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|column| column.storage == ColumnStorage::PerRow)
            .collect();

        if per_row.len() != values.len() {
            return Err(UtfError::FieldCountMismatch {
                expected: per_row.len(),
                actual: values.len(),
            });
        }

        for (column, value) in per_row.iter().zip(&values) {
            if !value.fits(column.column_type) {
                return Err(UtfError::ValueTypeMismatch {
                    field: column.name.clone(),
                    expected: column.column_type,
                    found: value.kind(),
                });
            }
        }

        self.rows.push(values);
        Ok(self)
    }

    /// Encrypt the finished table with the given key
    pub fn encrypt(&mut self, key: UtfKey) -> &mut Self {
        self.key = Some(key);
        self
    }

    /// Align the blob region and every blob to `alignment` bytes
    pub fn blob_alignment(&mut self, alignment: usize) -> &mut Self {
        self.blob_alignment = alignment.max(1);
        self
    }

    /// Serialize the table
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut pool = StringPool::new();
        let mut blobs = BlobRegion::new(self.blob_alignment);

        let table_name_offset = pool.intern(&self.name)?;

        let mut schema = Vec::new();
        for column in &self.columns {
            schema.push(column.storage.code() | column.column_type.code());
            schema.extend_from_slice(&pool.intern(&column.name)?.to_be_bytes());
            if let Some(value) = &column.constant {
                encode_value(value, &mut schema, &mut pool, &mut blobs)?;
            }
        }

        let row_size: usize = self
            .columns
            .iter()
            .filter(|column| column.storage == ColumnStorage::PerRow)
            .map(|column| column.column_type.width())
            .sum();

        let mut rows = Vec::with_capacity(row_size * self.rows.len());
        for row in &self.rows {
            for value in row {
                encode_value(value, &mut rows, &mut pool, &mut blobs)?;
            }
        }

        let rows_start = UTF_HEADER_SIZE + schema.len();
        let strings_start = rows_start + rows.len();
        let data_start = align_up(strings_start + pool.bytes.len(), self.blob_alignment);
        let total = data_start + blobs.bytes.len();

        let header = UtfHeader {
            magic: UTF_SIGNATURE,
            table_size: u32::try_from(total - 8)
                .map_err(|_| UtfError::LayoutOverflow("table size"))?,
            version: 1,
            rows_offset: u16::try_from(rows_start - 8)
                .map_err(|_| UtfError::LayoutOverflow("row region offset"))?,
            string_pool_offset: u32::try_from(strings_start - 8)
                .map_err(|_| UtfError::LayoutOverflow("string pool offset"))?,
            data_offset: u32::try_from(data_start - 8)
                .map_err(|_| UtfError::LayoutOverflow("blob region offset"))?,
            table_name_offset,
            field_count: u16::try_from(self.columns.len())
                .map_err(|_| UtfError::LayoutOverflow("field count"))?,
            row_size: u16::try_from(row_size).map_err(|_| UtfError::LayoutOverflow("row size"))?,
            row_count: u32::try_from(self.rows.len())
                .map_err(|_| UtfError::LayoutOverflow("row count"))?,
        };

        let mut output = Vec::with_capacity(total);
        header.write(&mut Cursor::new(&mut output))?;
        output.extend_from_slice(&schema);
        output.extend_from_slice(&rows);
        output.extend_from_slice(&pool.bytes);
        output.resize(data_start, 0);
        output.extend_from_slice(&blobs.bytes);

        if let Some(key) = self.key {
            UtfCipher::new(key).apply_keystream(0, &mut output);
        }

        debug!(
            "Built @UTF table '{}': {} fields, {} rows, {} bytes",
            self.name,
            self.columns.len(),
            self.rows.len(),
            output.len()
        );

        Ok(output)
    }
}

fn encode_value(
    value: &UtfValue,
    out: &mut Vec<u8>,
    pool: &mut StringPool,
    blobs: &mut BlobRegion,
) -> Result<()> {
    match value {
        UtfValue::Null => {}
        UtfValue::U8(v) => out.push(*v),
        UtfValue::U16(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::I16(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::I32(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::U64(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::F32(v) => out.extend_from_slice(&v.to_be_bytes()),
        UtfValue::String(s) => out.extend_from_slice(&pool.intern(s)?.to_be_bytes()),
        UtfValue::Blob(bytes) => {
            let (offset, size) = blobs.push(bytes)?;
            out.extend_from_slice(&offset.to_be_bytes());
            out.extend_from_slice(&size.to_be_bytes());
        }
    }
    Ok(())
}

/// Deduplicated NUL-terminated strings
struct StringPool {
    bytes: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringPool {
    fn new() -> Self {
        let mut pool = Self {
            bytes: Vec::new(),
            offsets: HashMap::new(),
        };
        pool.bytes.extend_from_slice(NULL_STRING.as_bytes());
        pool.bytes.push(0);
        pool.offsets.insert(NULL_STRING.to_string(), 0);
        pool
    }

    fn intern(&mut self, s: &str) -> Result<u32> {
        if let Some(&offset) = self.offsets.get(s) {
            return Ok(offset);
        }
        let offset = u32::try_from(self.bytes.len())
            .map_err(|_| UtfError::LayoutOverflow("string pool"))?;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(s.to_string(), offset);
        Ok(offset)
    }
}

/// Blob bytes with per-blob alignment
struct BlobRegion {
    bytes: Vec<u8>,
    alignment: usize,
}

impl BlobRegion {
    fn new(alignment: usize) -> Self {
        Self {
            bytes: Vec::new(),
            alignment,
        }
    }

    fn push(&mut self, data: &[u8]) -> Result<(u32, u32)> {
        if data.is_empty() {
            return Ok((0, 0));
        }
        self.bytes
            .resize(align_up(self.bytes.len(), self.alignment), 0);
        let offset = u32::try_from(self.bytes.len())
            .map_err(|_| UtfError::LayoutOverflow("blob region"))?;
        let size =
            u32::try_from(data.len()).map_err(|_| UtfError::LayoutOverflow("blob size"))?;
        self.bytes.extend_from_slice(data);
        Ok((offset, size))
    }
}

fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}
