//! AFS2 archive format support
//!
//! AFS2 archives (`.awb` files, or embedded in an ACB's `AwbFile` blob) pack
//! encoded audio streams end to end, keyed by 16-bit cue IDs. Each payload
//! starts at an aligned offset; the offset table only records where the
//! previous payload ended, so readers round up to the alignment themselves.
//!
//! # Format Structure
//!
//! ```text
//! AFS2 Archive (little-endian):
//! ├── Header (16 bytes)
//! │   ├── signature "AFS2" (4)
//! │   ├── version (4 bytes, byte 1 = offset field width W)
//! │   ├── file_count (u32, at most 65535)
//! │   └── alignment (u32)
//! ├── Cue IDs (file_count × u16)
//! ├── Offsets (file_count + 1 entries of W bytes, last is end of content)
//! └── Payloads (each preceded by zero padding up to the alignment)
//! ```
//!
//! # Example
//!
//! ```
//! use acbkit_formats::afs2::{Afs2Archive, Afs2Builder};
//!
//! let mut builder = Afs2Builder::new();
//! builder.add_file(3, b"HCA\x00stream".to_vec());
//! let bytes = builder.build().expect("archive should build");
//!
//! let archive = Afs2Archive::parse(&bytes, 0).expect("archive should decode");
//! assert_eq!(archive.data(3), Some(&b"HCA\x00stream"[..]));
//! ```

mod archive;
mod builder;
mod error;
mod header;

pub use archive::{Afs2Archive, Afs2File, align_up};
pub use builder::Afs2Builder;
pub use error::{Afs2Error, ArchiveResult};
pub use header::{AFS2_HEADER_SIZE, AFS2_SIGNATURE, Afs2Header};
