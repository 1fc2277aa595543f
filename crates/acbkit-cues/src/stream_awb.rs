//! Sibling stream archive lookup

use crate::error::{AcbError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Find the stream archive stored next to `acb_path`
///
/// Each suffix is appended to the bank path with its extension removed
/// (`bgm.acb` + `_STR.awb` is `bgm_STR.awb`). The first existing file wins.
pub fn find_stream_awb<S: AsRef<str>>(acb_path: &Path, suffixes: &[S]) -> Result<PathBuf> {
    let stem = acb_path.with_extension("");

    for suffix in suffixes {
        let mut candidate = OsString::from(stem.as_os_str());
        candidate.push(suffix.as_ref());
        let candidate = PathBuf::from(candidate);

        if candidate.is_file() {
            debug!("Found stream AWB {}", candidate.display());
            return Ok(candidate);
        }
        trace!("No stream AWB at {}", candidate.display());
    }

    Err(AcbError::AwbFileNotFound(acb_path.to_path_buf()))
}
