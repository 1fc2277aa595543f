//! AFS2 archive builder

use crate::afs2::archive::align_up;
use crate::afs2::error::{Afs2Error, ArchiveResult};
use crate::afs2::header::{AFS2_HEADER_SIZE, Afs2Header};
use binrw::BinWrite;
use binrw::io::Cursor;
use tracing::debug;

/// Builder for AFS2 archives
#[derive(Debug, Clone)]
pub struct Afs2Builder {
    offset_width: u8,
    alignment: u32,
    files: Vec<(u16, Vec<u8>)>,
}

impl Default for Afs2Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Afs2Builder {
    /// Create a builder with 4-byte offsets and 0x20 alignment
    pub fn new() -> Self {
        Self {
            offset_width: 4,
            alignment: 0x20,
            files: Vec::new(),
        }
    }

    /// Set the offset field width (1 to 4 bytes)
    pub fn offset_width(&mut self, width: u8) -> &mut Self {
        self.offset_width = width;
        self
    }

    /// Set the payload alignment
    pub fn alignment(&mut self, alignment: u32) -> &mut Self {
        self.alignment = alignment;
        self
    }

    /// Append a payload stored under `cue_id`
    pub fn add_file(&mut self, cue_id: u16, data: impl Into<Vec<u8>>) -> &mut Self {
        self.files.push((cue_id, data.into()));
        self
    }

    /// Serialize an archive that starts at offset 0 of its container
    pub fn build(&self) -> ArchiveResult<Vec<u8>> {
        self.build_at(0)
    }

    /// Serialize an archive that will sit at `base_offset` in its container
    ///
    /// Payloads are padded so their absolute offsets are aligned.
    pub fn build_at(&self, base_offset: u64) -> ArchiveResult<Vec<u8>> {
        let file_count = u32::try_from(self.files.len())
            .map_err(|_| Afs2Error::FileCountExceeds(u32::MAX))?;
        let header = Afs2Header::new(self.offset_width, file_count, self.alignment);
        header.validate()?;

        let width = self.offset_width as usize;
        let alignment = u64::from(header.effective_alignment());
        let mask = u64::from(header.offset_mask());
        let offsets_start = AFS2_HEADER_SIZE + self.files.len() * 2;

        let mut output = Vec::new();
        header.write(&mut Cursor::new(&mut output))?;
        for (cue_id, _) in &self.files {
            output.extend_from_slice(&cue_id.to_le_bytes());
        }
        output.resize(AFS2_HEADER_SIZE + header.tables_size(), 0);

        let mut raw_offsets = Vec::with_capacity(self.files.len() + 1);
        for (_, data) in &self.files {
            raw_offsets.push(output.len() as u64);
            let aligned = align_up(base_offset + output.len() as u64, alignment) - base_offset;
            output.resize(aligned as usize, 0);
            output.extend_from_slice(data);
        }
        raw_offsets.push(output.len() as u64);

        for (index, &raw) in raw_offsets.iter().enumerate() {
            if raw > mask {
                return Err(Afs2Error::OffsetOverflow {
                    offset: raw,
                    width: self.offset_width,
                });
            }
            let at = offsets_start + index * width;
            output[at..at + width].copy_from_slice(&(raw as u32).to_le_bytes()[..width]);
        }

        debug!(
            "Built AFS2 archive: {} files, width {}, alignment {}, {} bytes",
            self.files.len(),
            self.offset_width,
            alignment,
            output.len()
        );

        Ok(output)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::afs2::Afs2Archive;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_and_decode() {
        let mut builder = Afs2Builder::new();
        builder
            .offset_width(2)
            .add_file(1, vec![0x80, 0x00, 0x01])
            .add_file(7, vec![0x48, 0x43, 0x41, 0x00, 0x05]);

        let bytes = builder.build().expect("Operation should succeed");
        let archive = Afs2Archive::parse(&bytes, 0).expect("Operation should succeed");

        assert_eq!(archive.header.offset_width(), 2);
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.data(1), Some(&[0x80, 0x00, 0x01][..]));
        assert_eq!(archive.data(7), Some(&[0x48, 0x43, 0x41, 0x00, 0x05][..]));
        for file in archive.iter() {
            assert_eq!(file.aligned_offset % 0x20, 0);
        }
    }

    #[test]
    fn test_build_at_base_offset() {
        let mut builder = Afs2Builder::new();
        builder.add_file(2, vec![0x01; 6]).add_file(3, vec![0x02; 9]);

        let mut container = vec![0xEE; 0x14];
        container.extend_from_slice(&builder.build_at(0x14).expect("Operation should succeed"));

        let archive = Afs2Archive::parse(&container, 0x14).expect("Operation should succeed");
        for file in archive.iter() {
            assert_eq!(file.aligned_offset % 0x20, 0);
        }
        assert_eq!(archive.data(2), Some(&[0x01; 6][..]));
        assert_eq!(archive.data(3), Some(&[0x02; 9][..]));
    }

    #[test]
    fn test_offset_overflow() {
        let mut builder = Afs2Builder::new();
        builder.offset_width(1).add_file(0, vec![0x11; 0x200]);
        assert!(matches!(
            builder.build(),
            Err(Afs2Error::OffsetOverflow { width: 1, .. })
        ));
    }

    #[test]
    fn test_unsupported_width() {
        let mut builder = Afs2Builder::new();
        builder.offset_width(6);
        assert!(matches!(
            builder.build(),
            Err(Afs2Error::UnsupportedOffsetWidth(6))
        ));
    }

    #[test]
    fn test_empty_archive() {
        let bytes = Afs2Builder::new().build().expect("Operation should succeed");
        assert_eq!(bytes.len(), AFS2_HEADER_SIZE + 4);
        let archive = Afs2Archive::parse(&bytes, 0).expect("Operation should succeed");
        assert!(archive.is_empty());
    }
}
