//! End-to-end cue resolution over synthetic ACB banks

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use acbkit_crypto::UtfKey;
use acbkit_cues::{AcbConfig, AcbError, AcbFile, EncodeType, ReferenceStride};
use acbkit_formats::afs2::Afs2Builder;
use acbkit_formats::utf::{ColumnType, UtfTableBuilder, UtfValue};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Inputs for a synthetic bank
///
/// Synth reference items are packed back to back, so a read past the end of
/// one row's items lands in the next row's.
struct Bank {
    /// (CueId, ReferenceType, ReferenceIndex)
    cues: Vec<(u32, u8, u16)>,
    /// ReferenceItems per synth row
    synth: Vec<Vec<u8>>,
    /// (Id, EncodeType, Streaming) per waveform row
    waveforms: Vec<(u16, u8, u8)>,
    /// (CueIndex, CueName)
    names: Vec<(u16, &'static str)>,
    /// Embedded archive contents
    internal: Vec<(u16, Vec<u8>)>,
    streamed: bool,
    omit: Option<&'static str>,
    key: Option<UtfKey>,
}

impl Bank {
    /// Direct synth references: cue `r` resolves to waveform `r + 1`
    fn direct() -> Self {
        Self {
            cues: vec![(10, 2, 0), (11, 2, 1), (12, 2, 2)],
            synth: vec![
                vec![0x00, 0x01, 0x00, 0x00],
                vec![0x00, 0x01, 0x00, 0x01],
                vec![0x00, 0x01, 0x00, 0x02],
                vec![0x00, 0x01, 0x00, 0x03],
            ],
            waveforms: vec![(100, 0, 0), (101, 2, 0), (102, 7, 1), (103, 99, 0)],
            names: vec![(0, "bgm_title"), (1, "se_click"), (2, "voice_001")],
            internal: vec![
                (10, b"\x7FHCA-title".to_vec()),
                (11, b"VAGp-click".to_vec()),
                (12, b"\x01voice".to_vec()),
            ],
            streamed: false,
            omit: None,
            key: None,
        }
    }

    /// Sequence references walking through packed reference items
    fn sequence() -> Self {
        Self {
            cues: vec![(20, 3, 0), (21, 8, 0), (22, 3, 0)],
            synth: vec![
                vec![0x00, 0x01, 0x00, 0x00],
                vec![0x00, 0x02, 0x00, 0x03],
                vec![0x00, 0x01, 0x00, 0x01],
            ],
            waveforms: vec![(200, 2, 0), (201, 2, 0), (202, 0, 0), (203, 13, 0)],
            names: vec![(0, "seq_a"), (1, "seq_b"), (2, "seq_c")],
            internal: vec![
                (20, b"\x11a".to_vec()),
                (21, b"\x22b".to_vec()),
                (22, b"\x33c".to_vec()),
            ],
            streamed: false,
            omit: None,
            key: None,
        }
    }

    fn build(&self) -> Vec<u8> {
        let mut cue = UtfTableBuilder::new("Cue");
        cue.per_row("CueId", ColumnType::U32)
            .per_row("ReferenceType", ColumnType::U8)
            .per_row("ReferenceIndex", ColumnType::U16);
        for &(id, reference_type, reference_index) in &self.cues {
            cue.add_row(vec![
                UtfValue::U32(id),
                UtfValue::U8(reference_type),
                UtfValue::U16(reference_index),
            ])
            .expect("Operation should succeed");
        }

        let mut synth = UtfTableBuilder::new("Synth");
        synth.per_row("ReferenceItems", ColumnType::Blob);
        for items in &self.synth {
            synth
                .add_row(vec![UtfValue::blob(items.clone())])
                .expect("Operation should succeed");
        }

        let mut waveform = UtfTableBuilder::new("Waveform");
        waveform
            .per_row("Id", ColumnType::U16)
            .per_row("EncodeType", ColumnType::U8)
            .per_row("Streaming", ColumnType::U8);
        for &(id, encode_type, streaming) in &self.waveforms {
            waveform
                .add_row(vec![
                    UtfValue::U16(id),
                    UtfValue::U8(encode_type),
                    UtfValue::U8(streaming),
                ])
                .expect("Operation should succeed");
        }

        let mut names = UtfTableBuilder::new("CueName");
        names
            .per_row("CueName", ColumnType::String)
            .per_row("CueIndex", ColumnType::U16);
        for &(index, name) in &self.names {
            names
                .add_row(vec![UtfValue::String(name.to_string()), UtfValue::U16(index)])
                .expect("Operation should succeed");
        }

        let awb = if self.internal.is_empty() {
            Vec::new()
        } else {
            let mut awb = Afs2Builder::new();
            for (cue_id, data) in &self.internal {
                awb.add_file(*cue_id, data.clone());
            }
            awb.build().expect("Operation should succeed")
        };

        let stream_header = if self.streamed {
            b"AFS2\x01\x04\x02\x00".to_vec()
        } else {
            Vec::new()
        };

        let tables = [
            ("CueTable", cue.build().expect("Operation should succeed")),
            ("CueNameTable", names.build().expect("Operation should succeed")),
            ("WaveformTable", waveform.build().expect("Operation should succeed")),
            ("SynthTable", synth.build().expect("Operation should succeed")),
            ("AwbFile", awb),
            ("StreamAwbAfs2Header", stream_header),
        ];

        let mut root = UtfTableBuilder::new("Header");
        root.blob_alignment(0x20)
            .constant("Name", UtfValue::String("bank".to_string()));
        let mut row = Vec::new();
        for (name, bytes) in tables {
            if self.omit == Some(name) {
                continue;
            }
            root.per_row(name, ColumnType::Blob);
            row.push(UtfValue::blob(bytes));
        }
        root.add_row(row).expect("Operation should succeed");
        if let Some(key) = self.key {
            root.encrypt(key);
        }
        root.build().expect("Operation should succeed")
    }
}

fn load(bank: &Bank, config: &AcbConfig) -> AcbFile {
    AcbFile::from_bytes(&bank.build(), config).expect("Operation should succeed")
}

fn waveform_ids(acb: &AcbFile) -> Vec<Option<u16>> {
    acb.cues()
        .iter()
        .map(|cue| cue.waveform.map(|waveform| waveform.id))
        .collect()
}

#[test]
fn direct_references_resolve_and_name_files() {
    let acb = load(&Bank::direct(), &AcbConfig::default());

    assert_eq!(waveform_ids(&acb), vec![Some(101), Some(102), Some(103)]);

    let cues = acb.cues();
    assert_eq!(cues[0].cue_id, 10);
    assert_eq!(cues[0].name.as_deref(), Some("bgm_title"));
    let vag = cues[1].waveform.expect("identified");
    assert_eq!(vag.index, 2);
    assert_eq!(vag.encode_type, EncodeType::Vag);
    assert!(vag.streaming);

    let expected_names: BTreeMap<String, u16> = [
        ("bgm_title".to_string(), 101),
        ("se_click".to_string(), 102),
        ("voice_001".to_string(), 103),
    ]
    .into_iter()
    .collect();
    assert_eq!(acb.cue_names(), &expected_names);

    let files = acb.files();
    let expected: BTreeMap<String, &[u8]> = [
        ("bgm_title.hca".to_string(), &b"\x7FHCA-title"[..]),
        ("se_click.vag".to_string(), &b"VAGp-click"[..]),
        ("voice_001.EncodeType-99.bin".to_string(), &b"\x01voice"[..]),
    ]
    .into_iter()
    .collect();
    assert_eq!(files, expected);
    assert!(acb.external_awb().is_none());
    assert_eq!(acb.internal_awb().expect("internal archive").len(), 3);
}

#[test]
fn sequence_references_with_two_byte_stride() {
    let config = AcbConfig::default().with_reference_stride(ReferenceStride::Two);
    let acb = load(&Bank::sequence(), &config);

    // row 0: last two bytes of items 0; then +2 per row
    assert_eq!(waveform_ids(&acb), vec![Some(200), Some(202), Some(203)]);
    let names: Vec<String> = acb.files().into_keys().collect();
    assert_eq!(names, vec!["seq_a.hca", "seq_b.adx", "seq_c.dsp"]);
}

#[test]
fn sequence_references_with_four_byte_stride() {
    let config = AcbConfig::default().with_reference_stride(ReferenceStride::Four);
    let acb = load(&Bank::sequence(), &config);

    assert_eq!(waveform_ids(&acb), vec![Some(200), Some(203), Some(201)]);
    let names: Vec<String> = acb.files().into_keys().collect();
    assert_eq!(names, vec!["seq_a.hca", "seq_b.dsp", "seq_c.hca"]);
}

#[test]
fn empty_reference_items_leave_cue_unidentified() {
    let mut bank = Bank::direct();
    // cue 0 now reads its index out of synth row 2
    bank.synth[1] = Vec::new();

    let acb = load(&bank, &AcbConfig::default());
    let cues = acb.cues();

    assert!(cues[0].is_identified());
    assert!(!cues[1].is_identified());
    assert_eq!(cues[1].name, None);
    assert!(!acb.cue_names().contains_key("se_click"));
    assert!(!acb.files().contains_key("se_click.vag"));
}

#[test]
fn identified_cue_without_name_is_not_exported() {
    let mut bank = Bank::direct();
    bank.names.retain(|&(index, _)| index != 2);

    let acb = load(&bank, &AcbConfig::default());
    assert!(acb.cues()[2].is_identified());
    assert_eq!(acb.cues()[2].file_name(), None);
    assert_eq!(acb.files().len(), 2);
}

#[test]
fn name_row_outside_cue_list_is_skipped() {
    let mut bank = Bank::direct();
    bank.names.push((7, "ghost"));

    let acb = load(&bank, &AcbConfig::default());
    assert_eq!(acb.cue_names().len(), 3);
    assert!(!acb.cue_names().contains_key("ghost"));
}

#[test]
fn cue_without_payload_is_left_out() {
    let mut bank = Bank::direct();
    bank.internal.retain(|(cue_id, _)| *cue_id != 11);

    let acb = load(&bank, &AcbConfig::default());
    let files = acb.files();
    assert_eq!(files.len(), 2);
    assert!(!files.contains_key("se_click.vag"));
}

#[test]
fn unexpected_reference_type_is_fatal() {
    let mut bank = Bank::direct();
    bank.cues[1].1 = 5;

    let result = AcbFile::from_bytes(&bank.build(), &AcbConfig::default());
    assert!(matches!(
        result,
        Err(AcbError::UnexpectedReferenceType {
            cue_index: 1,
            reference_type: 5
        })
    ));
}

#[test]
fn missing_synth_table_is_fatal() {
    let mut bank = Bank::direct();
    bank.omit = Some("SynthTable");

    let result = AcbFile::from_bytes(&bank.build(), &AcbConfig::default());
    assert!(matches!(result, Err(AcbError::MissingTable("SynthTable"))));
}

#[test]
fn missing_cue_name_table_is_fatal() {
    let mut bank = Bank::direct();
    bank.omit = Some("CueNameTable");

    let result = AcbFile::from_bytes(&bank.build(), &AcbConfig::default());
    assert!(matches!(result, Err(AcbError::MissingTable("CueNameTable"))));
}

#[test]
fn waveform_index_out_of_range_is_fatal() {
    let mut bank = Bank::direct();
    bank.synth[3] = vec![0x00, 0x01, 0x00, 0x40];

    let result = AcbFile::from_bytes(&bank.build(), &AcbConfig::default());
    assert!(matches!(
        result,
        Err(AcbError::RowOutOfRange {
            table: "WaveformTable",
            row: 0x40,
            ..
        })
    ));
}

#[test]
fn encrypted_root_table() {
    let mut bank = Bank::direct();
    bank.key = Some(UtfKey::new(0x5f, 0x15));

    let acb = load(&bank, &AcbConfig::default());
    assert!(acb.root().is_encrypted());
    assert_eq!(waveform_ids(&acb), vec![Some(101), Some(102), Some(103)]);
    assert_eq!(acb.files().len(), 3);
}

#[test]
fn bank_without_embedded_archive() {
    let mut bank = Bank::direct();
    bank.internal.clear();

    let acb = load(&bank, &AcbConfig::default());
    assert!(acb.internal_awb().is_none());
    assert!(acb.files().is_empty());
    assert_eq!(acb.cue_names().len(), 3);
}

#[test]
fn stream_archive_is_loaded_from_sibling_file() {
    let dir = TempDir::new().expect("Operation should succeed");
    let acb_path = dir.path().join("bank.acb");

    let mut bank = Bank::direct();
    bank.streamed = true;
    std::fs::write(&acb_path, bank.build()).expect("Operation should succeed");

    let mut stream = Afs2Builder::new();
    stream.add_file(11, b"STREAMED-click".to_vec());
    std::fs::write(
        dir.path().join("bank_STR.awb"),
        stream.build().expect("Operation should succeed"),
    )
    .expect("Operation should succeed");

    let acb = AcbFile::open(&acb_path).expect("Operation should succeed");
    assert_eq!(acb.external_awb().expect("stream archive").len(), 1);

    let files = acb.files();
    // the stream archive wins over the embedded one
    assert_eq!(files["se_click.vag"], b"STREAMED-click");
    assert_eq!(files["bgm_title.hca"], b"\x7FHCA-title");
}

#[test]
fn stream_archive_missing_on_disk() {
    let dir = TempDir::new().expect("Operation should succeed");
    let acb_path = dir.path().join("bank.acb");

    let mut bank = Bank::direct();
    bank.streamed = true;
    std::fs::write(&acb_path, bank.build()).expect("Operation should succeed");

    let result = AcbFile::open(&acb_path);
    assert!(matches!(result, Err(AcbError::AwbFileNotFound(_))));

    let config = AcbConfig::default().with_stream_awb(false);
    let acb = AcbFile::open_with_config(&acb_path, &config).expect("Operation should succeed");
    assert!(acb.external_awb().is_none());
    assert_eq!(acb.files().len(), 3);
}

#[test]
fn streamed_bank_from_memory_has_no_sibling() {
    let mut bank = Bank::direct();
    bank.streamed = true;

    let result = AcbFile::from_bytes(&bank.build(), &AcbConfig::default());
    assert!(matches!(result, Err(AcbError::AwbFileNotFound(_))));
}

#[test]
fn custom_stream_suffixes() {
    let dir = TempDir::new().expect("Operation should succeed");
    let acb_path = dir.path().join("voice.acb");

    let mut bank = Bank::direct();
    bank.streamed = true;
    std::fs::write(&acb_path, bank.build()).expect("Operation should succeed");

    let mut stream = Afs2Builder::new();
    stream.add_file(12, b"\x02custom".to_vec());
    std::fs::write(
        dir.path().join("voice.stream"),
        stream.build().expect("Operation should succeed"),
    )
    .expect("Operation should succeed");

    let config = AcbConfig::default().with_stream_awb_suffixes([".stream"]);
    let acb = AcbFile::open_with_config(&acb_path, &config).expect("Operation should succeed");
    assert_eq!(
        acb.files()["voice_001.EncodeType-99.bin"],
        b"\x02custom"
    );
}
