//! Depacketization of RTP-encapsulated H.264 (RFC 6184) into an Annex B byte stream.
//!
//! Single NAL unit packets and FU-A fragments are supported. Aggregation packets are passed
//! through as if they were single NAL units.

pub mod depacketizer;
pub mod errors;
pub mod reassembler;
pub mod record;
pub mod rtp;

pub use depacketizer::{Depacketizer, Summary};
pub use errors::{DepacketizeError, ParameterSetError, RecordError, RtpError};
pub use record::{CaptureFile, RecordReader};
