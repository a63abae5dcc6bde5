use std::io;

use thiserror::Error;

/// Problems with the "RTP " record framing of a capture. Any of these ends the stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Bad RTP prefix: expected \"RTP \", found {found:02x?}")]
    BadPrefix { found: [u8; 4] },

    #[error("Bad RTP len: {length} (must be between {min} and {max})")]
    BadLength { length: u32, min: usize, max: usize },

    #[error("Truncated record header: {remaining} bytes left in the capture")]
    TruncatedHeader { remaining: usize },

    #[error("Unexpected EOF: record declares {expected} bytes, {remaining} left in the capture")]
    UnexpectedEof { expected: usize, remaining: usize },
}

/// A packet whose payload cannot be located. The packet is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RtpError {
    #[error("RTP packet of {len} bytes is shorter than the fixed header")]
    TooShort { len: usize },

    #[error("Header extension at offset {offset} runs past the end of a {len} byte packet")]
    TruncatedExtension { offset: usize, len: usize },

    #[error("Bad RTP offset + padding: offset {offset}, padding {padding}, packet length {len}")]
    InvalidPayloadWindow {
        offset: usize,
        padding: usize,
        len: usize,
    },

    #[error("Empty RTP payload")]
    EmptyPayload,

    #[error("FU-A packet carries no FU header")]
    MissingFuHeader,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterSetError {
    #[error("Bad B64 string: '{input}' (len={written}, stopped at byte {cursor})")]
    Malformed {
        input: String,
        written: usize,
        cursor: usize,
    },
}

#[derive(Error, Debug)]
pub enum DepacketizeError {
    #[error("An error occurred reading or writing the stream")]
    Io(#[from] io::Error),

    #[error("Invalid out-of-band parameter set")]
    ParameterSet(#[from] ParameterSetError),
}
