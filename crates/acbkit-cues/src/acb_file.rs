//! ACB sound bank loading

use crate::config::AcbConfig;
use crate::cue::CueRecord;
use crate::error::{AcbError, Result};
use crate::resolver::{CueTables, apply_names};
use crate::stream_awb::find_stream_awb;
use acbkit_formats::DecodeLimits;
use acbkit_formats::afs2::Afs2Archive;
use acbkit_formats::utf::{BlobRef, UtfTable, UtfValue};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded ACB sound bank with its resolved cues and archives
#[derive(Debug, Clone)]
pub struct AcbFile {
    root: UtfTable,
    cues: Vec<CueRecord>,
    cue_names: BTreeMap<String, u16>,
    internal_awb: Option<Afs2Archive>,
    external_awb: Option<Afs2Archive>,
}

impl AcbFile {
    /// Load a bank from disk with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, &AcbConfig::default())
    }

    /// Load a bank from disk
    ///
    /// Streamed banks also load their sibling archive, located with
    /// [`AcbConfig::stream_awb_suffixes`].
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &AcbConfig) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::load(&data, Some(path), config)
    }

    /// Load a bank from memory
    ///
    /// There is no path to search next to, so streamed banks fail with
    /// [`AcbError::AwbFileNotFound`] unless stream loading is disabled.
    pub fn from_bytes(data: &[u8], config: &AcbConfig) -> Result<Self> {
        Self::load(data, None, config)
    }

    fn load(data: &[u8], path: Option<&Path>, config: &AcbConfig) -> Result<Self> {
        let limits = &config.limits;
        let root = UtfTable::parse_with_limits(data, 0, limits)?;

        let cue_table = nested_table(&root, "CueTable", limits)?;
        let cue_name_table = nested_table(&root, "CueNameTable", limits)?;
        let waveform_table = nested_table(&root, "WaveformTable", limits)?;
        let synth_table = nested_table(&root, "SynthTable", limits)?;

        let tables = CueTables {
            root: &root,
            cue: &cue_table,
            synth: &synth_table,
            waveform: &waveform_table,
        };
        let mut cues = tables.resolve(config.reference_stride)?;
        let cue_names = apply_names(&mut cues, &cue_name_table)?;

        let internal_awb = match root_blob(&root, "AwbFile") {
            Some(awb) if awb.size > 0 => Some(Afs2Archive::parse(root.data(), awb.offset)?),
            _ => None,
        };

        let external_awb = if config.load_stream_awb && is_streamed(&root) {
            let Some(path) = path else {
                return Err(AcbError::AwbFileNotFound(PathBuf::new()));
            };
            let awb_path = find_stream_awb(path, &config.stream_awb_suffixes)?;
            let awb_data = std::fs::read(&awb_path)?;
            Some(Afs2Archive::parse(&awb_data, 0)?)
        } else {
            None
        };

        debug!(
            "Loaded ACB '{}': {} cues, {} named, internal AWB: {}, stream AWB: {}",
            root.name,
            cues.len(),
            cue_names.len(),
            internal_awb.as_ref().map_or(0, Afs2Archive::len),
            external_awb.as_ref().map_or(0, Afs2Archive::len)
        );

        Ok(Self {
            root,
            cues,
            cue_names,
            internal_awb,
            external_awb,
        })
    }

    /// Payloads of every named, identified cue, keyed by file name
    ///
    /// Each cue's payload is looked up by cue ID in the stream archive
    /// first, then the internal archive. Cues found in neither are left out.
    pub fn files(&self) -> BTreeMap<String, &[u8]> {
        let mut files = BTreeMap::new();

        for cue in &self.cues {
            let Some(file_name) = cue.file_name() else {
                continue;
            };
            let id = cue.archive_id();
            let payload = self
                .external_awb
                .as_ref()
                .and_then(|awb| awb.data(id))
                .or_else(|| self.internal_awb.as_ref().and_then(|awb| awb.data(id)));

            match payload {
                Some(data) => {
                    files.insert(file_name, data);
                }
                None => debug!("No payload for cue {} ({file_name})", cue.cue_id),
            }
        }

        files
    }

    /// Resolved cues in cue table order
    pub fn cues(&self) -> &[CueRecord] {
        &self.cues
    }

    /// Cue name to waveform ID
    pub fn cue_names(&self) -> &BTreeMap<String, u16> {
        &self.cue_names
    }

    /// Archive embedded in the bank
    pub fn internal_awb(&self) -> Option<&Afs2Archive> {
        self.internal_awb.as_ref()
    }

    /// Sibling stream archive
    pub fn external_awb(&self) -> Option<&Afs2Archive> {
        self.external_awb.as_ref()
    }

    /// Root table
    pub fn root(&self) -> &UtfTable {
        &self.root
    }
}

fn root_blob(root: &UtfTable, name: &str) -> Option<BlobRef> {
    root.rows.first()?.get(name)?.blob
}

fn nested_table(root: &UtfTable, name: &'static str, limits: &DecodeLimits) -> Result<UtfTable> {
    let blob = root_blob(root, name)
        .filter(|blob| blob.size > 0)
        .ok_or(AcbError::MissingTable(name))?;
    Ok(UtfTable::parse_with_limits(root.data(), blob.offset, limits)?)
}

/// Whether the root table announces a stream archive
fn is_streamed(root: &UtfTable) -> bool {
    root.rows
        .first()
        .and_then(|row| row.value("StreamAwbAfs2Header"))
        .is_some_and(UtfValue::is_nonzero)
}
