//! Integration tests for AFS2 archives

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use acbkit_formats::afs2::{Afs2Archive, Afs2Builder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Two files, 2-byte offsets, 0x20 alignment, cue IDs {5, 9}
///
/// The second raw offset is already aligned, so the first payload runs up to
/// it with trailing padding included.
fn fixture() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"AFS2");
    data.extend_from_slice(&[0x01, 0x02, 0x02, 0x00]);
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&0x20u32.to_le_bytes());
    data.extend_from_slice(&5u16.to_le_bytes());
    data.extend_from_slice(&9u16.to_le_bytes());
    data.extend_from_slice(&0x001Au16.to_le_bytes());
    data.extend_from_slice(&0x0040u16.to_le_bytes());
    data.extend_from_slice(&0x0050u16.to_le_bytes());
    data.resize(0x20, 0);
    data.extend_from_slice(b"\x80\x00ADX-STREAM");
    data.resize(0x40, 0);
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x7F]);
    data.extend_from_slice(b"HCA-STREAM..");
    assert_eq!(data.len(), 0x50);
    data
}

#[test]
fn fixture_lengths_cover_content() {
    let data = fixture();
    let archive = Afs2Archive::parse(&data, 0).expect("Operation should succeed");

    assert_eq!(archive.len(), 2);
    let first = archive.get(5).expect("cue 5");
    let second = archive.get(9).expect("cue 9");

    assert_eq!(first.length + second.length, 0x50 - first.aligned_offset);
    assert_eq!(first.length, 0x20);
    assert_eq!(second.length, 0x10);

    for file in archive.iter() {
        assert_ne!(file.data.first(), Some(&0));
    }
    assert_eq!(&second.data[..4], b"\x7FHCA");
    assert_eq!(second.data.len(), 13);
}

#[test]
fn embedded_archive_uses_absolute_offsets() {
    let mut container = vec![0x55; 0x40];
    container.extend_from_slice(&fixture());

    let archive = Afs2Archive::parse(&container, 0x40).expect("Operation should succeed");
    let first = archive.get(5).expect("cue 5");
    assert_eq!(first.raw_offset, 0x40 + 0x1A);
    assert_eq!(first.aligned_offset, 0x60);
    assert_eq!(&first.data[..2], b"\x80\x00");
    assert_eq!(archive.data(9).map(|data| &data[..4]), Some(&b"\x7FHCA"[..]));
}

#[test]
fn unaligned_base_pads_to_absolute_alignment() {
    let mut builder = Afs2Builder::new();
    builder.add_file(7, b"\x80\x00ADX".to_vec());
    let archive_bytes = builder.build_at(0x30).expect("Operation should succeed");

    let mut container = vec![0x55; 0x30];
    container.extend_from_slice(&archive_bytes);

    let archive = Afs2Archive::parse(&container, 0x30).expect("Operation should succeed");
    let file = archive.get(7).expect("cue 7");
    assert_eq!(file.raw_offset, 0x30 + 0x1A);
    assert_eq!(file.aligned_offset, 0x60);
    assert_eq!(file.length, 5);
    assert_eq!(file.data, b"\x80\x00ADX");
}

#[test]
fn cue_ids_iterate_in_order() {
    let mut builder = Afs2Builder::new();
    builder
        .add_file(40, vec![4])
        .add_file(10, vec![1])
        .add_file(25, vec![2]);
    let bytes = builder.build().expect("Operation should succeed");
    let archive = Afs2Archive::parse(&bytes, 0).expect("Operation should succeed");

    let ids: Vec<u16> = archive.iter().map(|file| file.cue_id).collect();
    assert_eq!(ids, vec![10, 25, 40]);
}

proptest! {
    #[test]
    fn built_archives_decode(
        width in 2u8..=4,
        alignment in prop::sample::select(vec![0u32, 1, 4, 0x20, 0x800]),
        payloads in proptest::collection::vec(
            (1u8..=255, proptest::collection::vec(any::<u8>(), 0..64)),
            0..6,
        ),
    ) {
        let mut builder = Afs2Builder::new();
        builder.offset_width(width).alignment(alignment);
        for (cue_id, (lead, tail)) in payloads.iter().enumerate() {
            let mut data = vec![*lead];
            data.extend_from_slice(tail);
            builder.add_file(cue_id as u16, data);
        }

        let bytes = builder.build().expect("Operation should succeed");
        let archive = Afs2Archive::parse(&bytes, 0).expect("Operation should succeed");

        prop_assert_eq!(archive.len(), payloads.len());
        for (cue_id, (lead, tail)) in payloads.iter().enumerate() {
            let data = archive.data(cue_id as u16).expect("payload");
            prop_assert_eq!(data[0], *lead);
            prop_assert_eq!(&data[1..], tail.as_slice());
        }
    }
}
