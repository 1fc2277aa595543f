//! `@UTF` table decoding

use crate::limits::DecodeLimits;
use crate::utf::UTF_SIGNATURE;
use crate::utf::column::{ColumnStorage, ColumnType, UtfColumn};
use crate::utf::error::{Result, UtfError};
use crate::utf::header::{UTF_HEADER_SIZE, UtfHeader};
use crate::utf::value::{BlobRef, UtfField, UtfValue};
use acbkit_crypto::{UtfCipher, UtfKey, recover_key};
use binrw::BinRead;
use bytes::Bytes;
use encoding_rs::SHIFT_JIS;
use indexmap::IndexMap;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Keystream position of the size field
const SIZE_FIELD_STEPS: usize = 4;

/// Keystream position of the table body
const BODY_STEPS: usize = 8;

/// One decoded row, fields keyed by name in schema order
///
/// A name declared twice keeps its first position and the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtfRow {
    fields: IndexMap<String, UtfField>,
}

impl UtfRow {
    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&UtfField> {
        self.fields.get(name)
    }

    /// Get a field's value by name
    pub fn value(&self, name: &str) -> Option<&UtfValue> {
        self.fields.get(name).map(|field| &field.value)
    }

    /// Check if a field exists
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = &UtfField> {
        self.fields.values()
    }

    /// Number of distinct field names
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, field: UtfField) {
        self.fields.insert(field.name.clone(), field);
    }
}

/// A decoded `@UTF` table
///
/// Holds the plaintext bytes of the table alongside the decoded rows so that
/// blob offsets can be followed into nested tables and archives.
#[derive(Debug, Clone)]
pub struct UtfTable {
    /// Decoded header
    pub header: UtfHeader,
    /// Recovered key, `None` for plaintext tables
    pub key: Option<UtfKey>,
    /// Absolute offset of the table in its source
    pub base_offset: u64,
    /// Table name from the string pool
    pub name: String,
    /// Schema in declaration order
    pub columns: Vec<UtfColumn>,
    /// Materialized rows
    pub rows: Vec<UtfRow>,
    data: Bytes,
}

impl UtfTable {
    /// Decode a table at `offset` in `reader` with default limits
    pub fn read_from<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        Self::read_with_limits(reader, offset, &DecodeLimits::default())
    }

    /// Decode a table at `offset` in `reader`
    ///
    /// Encrypted tables are detected from their signature and decrypted
    /// before parsing.
    pub fn read_with_limits<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset))?;

        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;

        let key = if signature == UTF_SIGNATURE {
            None
        } else {
            let key = recover_key(signature, UTF_SIGNATURE).map_err(|source| {
                trace!("No @UTF signature at {offset:#x}");
                UtfError::NoHeader {
                    offset,
                    found: signature,
                    source,
                }
            })?;
            Some(key)
        };
        let cipher = key.map(UtfCipher::new);

        let mut size_field = [0u8; 4];
        reader.read_exact(&mut size_field)?;
        if let Some(cipher) = &cipher {
            cipher.apply_keystream(SIZE_FIELD_STEPS, &mut size_field);
        }

        let table_size = u32::from_be_bytes(size_field);
        if table_size > limits.max_table_size {
            return Err(UtfError::LimitExceeded {
                what: "Table size",
                value: u64::from(table_size),
                limit: u64::from(limits.max_table_size),
            });
        }

        let mut data = Vec::new();
        data.extend_from_slice(&UTF_SIGNATURE);
        data.extend_from_slice(&size_field);
        (&mut *reader)
            .take(u64::from(table_size))
            .read_to_end(&mut data)?;
        if data.len() != table_size as usize + 8 {
            return Err(UtfError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "@UTF table at {offset:#x} declares {table_size} bytes, {} available",
                    data.len() - 8
                ),
            )));
        }

        if let Some(cipher) = &cipher {
            cipher.apply_keystream(BODY_STEPS, &mut data[8..]);
        }

        Self::decode(data, offset, key, limits)
    }

    /// Decode a table at `offset` within an in-memory buffer
    pub fn parse(data: &[u8], offset: u64) -> Result<Self> {
        Self::read_from(&mut Cursor::new(data), offset)
    }

    /// Decode a table at `offset` within an in-memory buffer
    pub fn parse_with_limits(data: &[u8], offset: u64, limits: &DecodeLimits) -> Result<Self> {
        Self::read_with_limits(&mut Cursor::new(data), offset, limits)
    }

    fn decode(
        data: Vec<u8>,
        base_offset: u64,
        key: Option<UtfKey>,
        limits: &DecodeLimits,
    ) -> Result<Self> {
        let header = UtfHeader::read(&mut Cursor::new(&data))?;
        let data = Bytes::from(data);

        if header.field_count > limits.max_fields {
            return Err(UtfError::LimitExceeded {
                what: "Field count",
                value: u64::from(header.field_count),
                limit: u64::from(limits.max_fields),
            });
        }
        if header.row_count > limits.max_rows {
            return Err(UtfError::LimitExceeded {
                what: "Row count",
                value: u64::from(header.row_count),
                limit: u64::from(limits.max_rows),
            });
        }

        let layout = TableLayout {
            data: &data,
            strings_start: header.string_pool_start(),
            blobs_start: header.data_start(),
            base_offset,
        };

        let mut budget = DecodeBudget {
            used: 0,
            limit: limits.max_decoded_bytes,
        };
        let name = layout.string(header.table_name_offset)?;
        let columns = layout.read_schema(header.field_count)?;
        let rows = (0..header.row_count as usize)
            .map(|row| layout.read_row(&header, &columns, row, &mut budget))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Decoded @UTF table '{}' at {:#x}: {} fields, {} rows, {} bytes materialized{}",
            name,
            base_offset,
            columns.len(),
            rows.len(),
            budget.used,
            if key.is_some() { " (encrypted)" } else { "" }
        );

        Ok(Self {
            header,
            key,
            base_offset,
            name,
            columns,
            rows,
            data,
        })
    }

    /// Whether the table was stored encrypted
    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    /// Plaintext bytes of the whole table, signature included
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of schema columns
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Get a row by index
    pub fn row(&self, row: usize) -> Result<&UtfRow> {
        self.rows.get(row).ok_or_else(|| UtfError::RowOutOfRange {
            table: self.name.clone(),
            row,
            row_count: self.rows.len(),
        })
    }

    /// Get a field by row index and name
    pub fn field(&self, row: usize, name: &str) -> Result<&UtfField> {
        self.row(row)?
            .get(name)
            .ok_or_else(|| UtfError::FieldNotFound {
                table: self.name.clone(),
                row,
                field: name.to_string(),
            })
    }

    /// Byte field
    pub fn get_u8(&self, row: usize, name: &str) -> Result<u8> {
        self.typed(row, name, "u8", UtfValue::as_u8)
    }

    /// Unsigned field of at most 16 bits
    pub fn get_u16(&self, row: usize, name: &str) -> Result<u16> {
        self.typed(row, name, "u16", UtfValue::as_u16)
    }

    /// Unsigned field of at most 32 bits
    pub fn get_u32(&self, row: usize, name: &str) -> Result<u32> {
        self.typed(row, name, "u32", UtfValue::as_u32)
    }

    /// Unsigned field of any width
    pub fn get_u64(&self, row: usize, name: &str) -> Result<u64> {
        self.typed(row, name, "u64", UtfValue::as_u64)
    }

    /// String field
    pub fn get_str(&self, row: usize, name: &str) -> Result<&str> {
        self.typed(row, name, "string", UtfValue::as_str)
    }

    /// Blob field bytes
    pub fn get_blob(&self, row: usize, name: &str) -> Result<&[u8]> {
        self.typed(row, name, "blob", UtfValue::as_blob)
    }

    /// Blob field location in the source
    pub fn blob_ref(&self, row: usize, name: &str) -> Result<BlobRef> {
        let field = self.field(row, name)?;
        field.blob.ok_or_else(|| UtfError::FieldType {
            table: self.name.clone(),
            row,
            field: name.to_string(),
            expected: "blob",
            found: field.value.kind(),
        })
    }

    /// Read a big-endian `u16` at `offset` in the table's plaintext bytes
    pub fn read_u16_at(&self, offset: usize) -> Result<u16> {
        let layout = TableLayout {
            data: &self.data,
            strings_start: self.header.string_pool_start(),
            blobs_start: self.header.data_start(),
            base_offset: self.base_offset,
        };
        Ok(u16::from_be_bytes(layout.array(offset)?))
    }

    fn typed<'a, T>(
        &'a self,
        row: usize,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a UtfValue) -> Option<T>,
    ) -> Result<T> {
        let field = self.field(row, name)?;
        extract(&field.value).ok_or_else(|| UtfError::FieldType {
            table: self.name.clone(),
            row,
            field: name.to_string(),
            expected,
            found: field.value.kind(),
        })
    }
}

/// Running total of memory taken by decoded fields
struct DecodeBudget {
    used: u64,
    limit: u64,
}

impl DecodeBudget {
    /// Account for `field` before it is stored in a row
    ///
    /// Blob bytes are shared with the table buffer and cost nothing here.
    /// Names are counted twice, once for the field and once for the row key.
    fn charge(&mut self, field: &UtfField) -> Result<()> {
        let heap = 2 * field.name.len()
            + match &field.value {
                UtfValue::String(s) => s.len(),
                _ => 0,
            };
        let cost = (std::mem::size_of::<UtfField>() + heap) as u64;
        self.used = self.used.saturating_add(cost);
        if self.used > self.limit {
            return Err(UtfError::LimitExceeded {
                what: "Decoded size",
                value: self.used,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

/// Region starts of a plaintext table buffer
struct TableLayout<'a> {
    data: &'a Bytes,
    strings_start: usize,
    blobs_start: usize,
    base_offset: u64,
}

impl<'a> TableLayout<'a> {
    fn bytes(&self, offset: usize, length: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(length)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(UtfError::OutOfBounds {
                offset,
                length,
                available: self.data.len(),
            })
    }

    /// Slice of the table buffer sharing its allocation
    fn shared(&self, offset: usize, length: usize) -> Result<Bytes> {
        self.bytes(offset, length)?;
        Ok(self.data.slice(offset..offset + length))
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N)?);
        Ok(out)
    }

    fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array(offset)?))
    }

    /// NUL-terminated string at `pool_offset` in the string pool
    ///
    /// An unterminated string runs to the end of the table.
    fn string(&self, pool_offset: u32) -> Result<String> {
        let start = self.strings_start.saturating_add(pool_offset as usize);
        let tail = self.data.get(start..).ok_or(UtfError::OutOfBounds {
            offset: start,
            length: 1,
            available: self.data.len(),
        })?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(decode_string(&tail[..end]))
    }

    fn value(&self, column_type: ColumnType, at: usize) -> Result<(UtfValue, Option<BlobRef>)> {
        let value = match column_type {
            ColumnType::U8 | ColumnType::S8 => UtfValue::U8(self.array::<1>(at)?[0]),
            ColumnType::U16 => UtfValue::U16(u16::from_be_bytes(self.array(at)?)),
            ColumnType::I16 => UtfValue::I16(i16::from_be_bytes(self.array(at)?)),
            ColumnType::U32 => UtfValue::U32(self.u32_at(at)?),
            ColumnType::I32 => UtfValue::I32(i32::from_be_bytes(self.array(at)?)),
            ColumnType::U64 => UtfValue::U64(u64::from_be_bytes(self.array(at)?)),
            ColumnType::F32 => UtfValue::F32(f32::from_be_bytes(self.array(at)?)),
            ColumnType::String => UtfValue::String(self.string(self.u32_at(at)?)?),
            ColumnType::Blob => {
                let blob_offset = self.u32_at(at)?;
                let size = self.u32_at(at + 4)?;
                let start = self.blobs_start.saturating_add(blob_offset as usize);
                let bytes = if size == 0 {
                    Bytes::new()
                } else {
                    self.shared(start, size as usize)?
                };
                let blob = BlobRef {
                    offset: self.base_offset + start as u64,
                    size,
                };
                return Ok((UtfValue::Blob(bytes), Some(blob)));
            }
        };
        Ok((value, None))
    }

    fn read_schema(&self, field_count: u16) -> Result<Vec<UtfColumn>> {
        let mut columns = Vec::with_capacity(field_count as usize);
        let mut cursor = UTF_HEADER_SIZE;

        for _ in 0..field_count {
            let tag = self.array::<1>(cursor)?[0];
            let name = self.string(self.u32_at(cursor + 1)?)?;
            cursor += 5;

            let storage = ColumnStorage::from_tag(tag);
            let column_type = ColumnType::from_tag(tag);

            let shared = match storage {
                ColumnStorage::Zero => Some(UtfField {
                    tag,
                    name: name.clone(),
                    value: UtfValue::Null,
                    blob: None,
                }),
                ColumnStorage::Constant | ColumnStorage::PerRow => {
                    let Some(column_type) = column_type else {
                        return Err(UtfError::UnknownColumnType { tag, field: name });
                    };
                    if storage == ColumnStorage::Constant {
                        let (value, blob) = self.value(column_type, cursor)?;
                        cursor += column_type.width();
                        Some(UtfField {
                            tag,
                            name: name.clone(),
                            value,
                            blob,
                        })
                    } else {
                        None
                    }
                }
            };

            trace!("Column '{name}' tag={tag:#04x} storage={storage:?}");
            columns.push(UtfColumn {
                tag,
                name,
                storage,
                column_type,
                shared,
            });
        }

        Ok(columns)
    }

    fn read_row(
        &self,
        header: &UtfHeader,
        columns: &[UtfColumn],
        row: usize,
        budget: &mut DecodeBudget,
    ) -> Result<UtfRow> {
        let row_base = header
            .rows_start()
            .saturating_add(row.saturating_mul(header.row_size as usize));
        let mut row_offset = 0usize;
        let mut fields = UtfRow::default();

        for column in columns {
            let field = match (&column.shared, column.column_type) {
                (Some(shared), _) => {
                    budget.charge(shared)?;
                    shared.clone()
                }
                (None, Some(column_type)) => {
                    let (value, blob) =
                        self.value(column_type, row_base.saturating_add(row_offset))?;
                    row_offset += column_type.width();
                    let field = UtfField {
                        tag: column.tag,
                        name: column.name.clone(),
                        value,
                        blob,
                    };
                    budget.charge(&field)?;
                    field
                }
                (None, None) => {
                    return Err(UtfError::UnknownColumnType {
                        tag: column.tag,
                        field: column.name.clone(),
                    });
                }
            };
            fields.insert(field);
        }

        Ok(fields)
    }
}

/// Decode pool bytes as UTF-8, falling back to Shift_JIS
fn decode_string(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
            if had_errors {
                String::from_utf8_lossy(bytes).into_owned()
            } else {
                text.into_owned()
            }
        }
    }
}
