use std::fs;
use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use rand::{Rng, SeedableRng, XorShiftRng};
use tempfile::NamedTempFile;

use swdisk::disk::{Capture, DiskError, DEFAULT_CAPTURE_SIZE, DISKETTE, SECTOR_SIZE};
use swdisk::record::{
    self, OutputSink, ScanSettings, DOCUMENT_HEADER_TAG, DOCUMENT_TRIGGER, FILENAME_OFFSET,
    HEADER_TAG_OFFSET, LENGTH_OFFSET, MARKER_OFFSET, SIGNATURE, TRIGGER_OFFSET,
};
use swdisk::text::{self, DecodeError, PLACEHOLDER};

const ITERATIONS: usize = 500;
const MAX_BLOCKS: usize = 12;
const MAX_BLOCK_SIZE: usize = 40;
const RNG_SEED: [u8; 16] = [
    0x53, 0x57, 0x1D, 0xB7, 0x1E, 0xDC, 0x6F, 0x41, 0x74, 0x1B, 0x8C, 0xD7, 0x32, 0x58, 0x34, 0x99,
];

const ETX: u8 = 0x03;
const STYLE_PARAMETER_ESCAPES: &[u8] = b"02@BDFHJ ";

fn deterministic_rng() -> XorShiftRng {
    SeedableRng::from_seed(RNG_SEED)
}

/// Random byte avoiding every value in `excluded`.
fn random_byte_except(rng: &mut impl Rng, excluded: &[u8]) -> u8 {
    loop {
        let b: u8 = rng.gen();
        if !excluded.contains(&b) {
            return b;
        }
    }
}

fn random_parameters(rng: &mut impl Rng, stream: &mut Vec<u8>) {
    for _ in 0..3 {
        stream.push(rng.gen());
    }
}

/// Append one well-formed control block to `stream`.
fn random_block(rng: &mut impl Rng, stream: &mut Vec<u8>) {
    let control = rng.gen_range(0x10u8, 0x16u8);
    let size = rng.gen_range(0, MAX_BLOCK_SIZE);
    stream.push(control);
    for _ in 0..size {
        match control {
            0x10 => {
                if rng.gen_range(0, 8) == 0 {
                    let index = rng.gen_range(0, STYLE_PARAMETER_ESCAPES.len());
                    stream.push(STYLE_PARAMETER_ESCAPES[index]);
                    random_parameters(rng, stream);
                } else {
                    let mut excluded = STYLE_PARAMETER_ESCAPES.to_vec();
                    excluded.push(0x10);
                    stream.push(random_byte_except(rng, &excluded));
                }
            }
            0x11 => stream.push(random_byte_except(rng, &[ETX, 0x11])),
            0x12 => stream.push(random_byte_except(rng, &[0x12])),
            0x13 => {
                if rng.gen_range(0, 8) == 0 {
                    stream.push(0x04);
                    random_parameters(rng, stream);
                } else {
                    stream.push(random_byte_except(rng, &[ETX, 0x04, 0x13]));
                }
            }
            0x14 => stream.push(random_byte_except(rng, &[0x14])),
            _ => stream.push(random_byte_except(rng, &[0x15, 0x80])),
        }
    }
    if control == 0x15 && rng.gen() {
        stream.push(0x80);
    } else {
        stream.push(control);
    }
}

#[test]
fn well_formed_streams_end_at_etx() {
    let mut rng = deterministic_rng();
    for _ in 0..ITERATIONS {
        let mut stream = Vec::new();
        for _ in 0..rng.gen_range(0, MAX_BLOCKS) {
            random_block(&mut rng, &mut stream);
        }
        stream.push(ETX);
        let length = stream.len();
        // Trailing garbage must not be consumed.
        stream.extend_from_slice(b"\x13trailing");

        let run = text::parse(&mut stream, 0).unwrap();
        assert_eq!(run.consumed, length);
        assert_eq!(run.bytes.last(), Some(&ETX));
        assert_eq!(&stream[length..], b"\x13trailing");
    }
}

#[test]
fn random_bytes_never_panic() {
    let mut rng = deterministic_rng();
    for _ in 0..ITERATIONS {
        let size = rng.gen_range(1, 256);
        let mut buffer = vec![0u8; size];
        rng.fill(&mut buffer[..]);
        // Bias towards control bytes so deeper states get exercised.
        for b in buffer.iter_mut() {
            if rng.gen_range(0, 3) == 0 {
                *b = rng.gen_range(0x10u8, 0x16u8);
            }
        }
        let start = rng.gen_range(0, size);
        match text::parse(&mut buffer, start) {
            Ok(run) => {
                assert!(run.end() <= size);
                assert_eq!(run.bytes.last(), Some(&ETX));
            }
            Err(DecodeError::MalformedControl { offset, consumed, .. }) => {
                assert!(offset < size);
                assert_eq!(offset + 1, start + consumed);
            }
            Err(DecodeError::Exhausted { length, .. }) => assert_eq!(length, size),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
}

#[test]
fn parameter_escapes_hide_exactly_three_bytes() {
    for escape in STYLE_PARAMETER_ESCAPES {
        let mut stream = vec![0x10, *escape, 0x10, 0x11, 0x12, b'z', 0x10, ETX];
        let run = text::parse(&mut stream, 0).unwrap();
        assert_eq!(run.bytes, b"_____z_\x03");
    }
    let mut stream = vec![0x13, b'a', 0x04, 0x13, ETX, 0x11, b'b', 0x13, ETX];
    let run = text::parse(&mut stream, 0).unwrap();
    assert_eq!(run.bytes, b"_a____b_\x03");
    assert!(!run.bytes[2..6].iter().any(|b| *b != PLACEHOLDER));
}

/// Write a document record at `index` of a buffer.
fn write_record(buffer: &mut [u8], index: usize, filename: &[u8; 8], trigger: u16, body: &[u8]) {
    buffer[index..index + SIGNATURE.len()].copy_from_slice(SIGNATURE);
    buffer[index + HEADER_TAG_OFFSET] = DOCUMENT_HEADER_TAG;
    buffer[index + FILENAME_OFFSET..index + FILENAME_OFFSET + 8].copy_from_slice(filename);
    BigEndian::write_u16(&mut buffer[index + TRIGGER_OFFSET..], trigger);
    LittleEndian::write_u32(&mut buffer[index + LENGTH_OFFSET..], body.len() as u32);
    buffer[index + MARKER_OFFSET..index + MARKER_OFFSET + body.len()].copy_from_slice(body);
}

fn diskette_image() -> Vec<u8> {
    let mut image = vec![0u8; DISKETTE.size()];
    write_record(
        &mut image,
        SECTOR_SIZE * 3,
        b"CHANSON ",
        DOCUMENT_TRIGGER,
        b"\x12\x00\x12\x13Il \x8dtait une berg\x8dre\x13\x11\x81\x11\x13et ron ron\x13\x03",
    );
    // Same layout, but not a document.
    write_record(
        &mut image,
        SECTOR_SIZE * 10,
        b"INDEX   ",
        0x0001,
        b"\x12\x12\x13ignored\x13\x03",
    );
    // Past the default capture.
    write_record(
        &mut image,
        DEFAULT_CAPTURE_SIZE + SECTOR_SIZE,
        b"LOIN    ",
        DOCUMENT_TRIGGER,
        b"\x12\x12\x13far away\x13\x03",
    );
    image
}

#[test]
fn extract_documents_from_image_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&diskette_image()).unwrap();
    file.flush().unwrap();

    let mut capture = Capture::open(file.path(), DEFAULT_CAPTURE_SIZE).unwrap();
    assert_eq!(capture.len(), DEFAULT_CAPTURE_SIZE);
    assert_eq!(capture.geometry(), &DISKETTE);

    let mut output = Vec::new();
    let summary =
        record::scan(capture.as_mut_slice(), &ScanSettings::default(), &mut output).unwrap();
    assert_eq!(summary.matches, 2);
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.failures, 0);

    let output = String::from_utf8(output).unwrap();
    assert!(output.starts_with("\nDocHdr: 9F, File: CHANSON \nTrigger: 175B, Len: "));
    assert!(output.contains("Char: 12\nIl ètait une bergère\net ron ron_\x03"));
    assert!(!output.contains("ignored"));
    assert!(!output.contains("far away"));
}

#[test]
fn whole_image_capture_finds_every_document() {
    let mut capture = Capture::from_bytes(diskette_image());
    let mut output = Vec::new();
    let summary =
        record::scan(capture.as_mut_slice(), &ScanSettings::default(), &mut output).unwrap();
    assert_eq!(summary.matches, 3);
    assert_eq!(summary.documents, 2);
    assert!(String::from_utf8(output).unwrap().contains("far away"));
}

#[test]
fn output_sink_appends() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("out.txt");
    for _ in 0..2 {
        let mut capture = Capture::from_bytes(diskette_image());
        let mut sink = OutputSink::append(&path).unwrap();
        record::scan(capture.as_mut_slice(), &ScanSettings::default(), &mut sink).unwrap();
    }
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("File: CHANSON").count(), 2);
    assert_eq!(contents.matches("File: LOIN").count(), 2);
}

#[test]
fn empty_image_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    let error = Capture::open(file.path(), DEFAULT_CAPTURE_SIZE).err().unwrap();
    assert!(error == DiskError::EmptyImage);
}
