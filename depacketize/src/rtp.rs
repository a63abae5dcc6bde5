use std::ops::Range;

use crate::errors::RtpError;

/// Size of the fixed RTP header (RFC 3550, 5.1).
pub const FIXED_HEADER_LEN: usize = 12;

const PADDING_BIT: u8 = 0x20;
const EXTENSION_BIT: u8 = 0x10;
const CSRC_COUNT_MASK: u8 = 0x0F;

/// `RtpHeader` reads header fields straight out of a captured packet. Nothing is copied.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       sequence number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                       CSRC list (CC x 32)                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RtpHeader<'a> {
    packet: &'a [u8],
}

impl<'a> RtpHeader<'a> {
    pub fn parse(packet: &'a [u8]) -> Result<Self, RtpError> {
        if packet.len() < FIXED_HEADER_LEN {
            return Err(RtpError::TooShort { len: packet.len() });
        }

        Ok(Self { packet })
    }

    pub fn version(&self) -> u8 {
        self.packet[0] >> 6
    }

    pub fn has_padding(&self) -> bool {
        self.packet[0] & PADDING_BIT != 0
    }

    pub fn has_extension(&self) -> bool {
        self.packet[0] & EXTENSION_BIT != 0
    }

    pub fn csrc_count(&self) -> usize {
        (self.packet[0] & CSRC_COUNT_MASK) as usize
    }

    pub fn sequence_number(&self) -> u16 {
        u16::from_be_bytes([self.packet[2], self.packet[3]])
    }

    /// Padding length from the last byte of the packet, 0 without the P bit.
    pub fn padding_len(&self) -> usize {
        match self.has_padding() {
            true => self.packet[self.packet.len() - 1] as usize,
            false => 0,
        }
    }

    /// Offset of the first payload byte: fixed header, CSRC list, then the header extension.
    ///
    /// The 16-bit extension length is added as a byte count, not as the 32-bit word count of
    /// RFC 3550. Existing captures are depacketized with the byte reading.
    pub fn payload_offset(&self) -> Result<usize, RtpError> {
        let offset = FIXED_HEADER_LEN + 4 * self.csrc_count();
        if !self.has_extension() {
            return Ok(offset);
        }

        let extension_len = self
            .packet
            .get(offset + 2..offset + 4)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
            .ok_or(RtpError::TruncatedExtension {
                offset,
                len: self.packet.len(),
            })?;

        Ok(offset + 4 + extension_len)
    }

    /// Byte range of the payload, `[payload_offset, len - padding_len)`. At least one payload byte
    /// must remain.
    pub fn payload_window(&self) -> Result<Range<usize>, RtpError> {
        let offset = self.payload_offset()?;
        let padding = self.padding_len();
        let len = self.packet.len();

        if len < offset + padding + 1 {
            return Err(RtpError::InvalidPayloadWindow {
                offset,
                padding,
                len,
            });
        }

        Ok(offset..len - padding)
    }

    pub fn payload(&self) -> Result<&'a [u8], RtpError> {
        let window = self.payload_window()?;
        Ok(&self.packet[window])
    }
}
