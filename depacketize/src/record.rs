use std::fs::File;
use std::path::Path;

use memmap::Mmap;

use crate::errors::RecordError;

/// Every record starts with these four bytes.
pub const RECORD_PREFIX: [u8; 4] = *b"RTP ";

/// Prefix followed by a big-endian `u32` packet length.
pub const RECORD_HEADER_LEN: usize = 8;

/// Fixed part of an RTP header. Shorter records cannot hold a packet.
pub const MIN_PACKET_LEN: usize = 12;

/// Largest packet a record may carry.
pub const PACKET_CAPACITY: usize = 0x10000;

/// A capture of RTP records, mapped read-only. The mapping is released when this is dropped.
#[derive(Debug)]
pub struct CaptureFile {
    // zero-length files cannot be mapped
    data: Option<Mmap>,
}

impl CaptureFile {
    pub fn from_file(file: File) -> std::io::Result<Self> {
        if file.metadata()?.len() == 0 {
            return Ok(Self { data: None });
        }

        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { data: Some(mmap) })
    }

    pub fn from_file_path(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(file_path)?;
        CaptureFile::from_file(file)
    }

    pub fn bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn records(&self) -> RecordReader<'_> {
        RecordReader::new(self.bytes())
    }
}

/// `RecordReader` walks a capture one framed RTP packet at a time.
///
/// ```text
/// +---+---+---+---+---+---+---+---+----------------------+
/// | R | T | P |   |  length (u32 BE)  |  length bytes ... |
/// +---+---+---+---+---+---+---+---+----------------------+
/// ```
///
/// The first framing error ends the stream; nothing after it is read.
#[derive(Debug)]
pub struct RecordReader<'a> {
    cursor: usize,
    data: &'a [u8],
    failed: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            failed: false,
        }
    }

    /// Bytes of the capture consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the next packet, `Ok(None)` at a clean end of the capture.
    pub fn next_record(&mut self) -> Result<Option<&'a [u8]>, RecordError> {
        let data: &'a [u8] = self.data;
        let remaining = &data[self.cursor..];
        if remaining.is_empty() {
            return Ok(None);
        }

        let Some((header, body)) = remaining.split_first_chunk::<RECORD_HEADER_LEN>() else {
            return Err(RecordError::TruncatedHeader {
                remaining: remaining.len(),
            });
        };

        let (prefix, length) = header.split_at(4);
        if prefix != RECORD_PREFIX {
            let mut found = [0u8; 4];
            found.copy_from_slice(prefix);
            return Err(RecordError::BadPrefix { found });
        }

        let length = u32::from_be_bytes([length[0], length[1], length[2], length[3]]);
        let expected = length as usize;
        if !(MIN_PACKET_LEN..=PACKET_CAPACITY).contains(&expected) {
            return Err(RecordError::BadLength {
                length,
                min: MIN_PACKET_LEN,
                max: PACKET_CAPACITY,
            });
        }

        if body.len() < expected {
            return Err(RecordError::UnexpectedEof {
                expected,
                remaining: body.len(),
            });
        }

        self.cursor += RECORD_HEADER_LEN + expected;
        Ok(Some(&body[..expected]))
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<&'a [u8], RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let record = self.next_record().transpose();
        if matches!(record, Some(Err(_))) {
            self.failed = true;
        }

        record
    }
}

/// Frames `packet` as one record. Used to build captures.
pub fn write_record(packet: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&RECORD_PREFIX);
    out.extend_from_slice(&(packet.len() as u32).to_be_bytes());
    out.extend_from_slice(packet);
}
