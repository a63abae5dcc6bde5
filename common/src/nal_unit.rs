use std::fmt;

use crate::rbsp::NalUnitType;

/// A four-byte start code. Every NAL unit written to an Annex B byte stream is prefixed with it.
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// A byte equal to 0x03 that may be present within a `NalUnit`.
/// The presence of this byte ensures no sequence of consecutive byte-aligned bytes in the
/// NAL unit contains a start code prefix.
pub const EMULATION_PREVENTION_BYTE: u8 = 0x03;

/// Single-time aggregation packet (RFC 6184, 5.7.1). Not unpacked; forwarded as a single NAL unit.
pub const STAP_A: u8 = 24;

/// Fragmentation unit without DON (RFC 6184, 5.8).
pub const FU_A: u8 = 28;

/// FU header bit marking the first fragment of a NAL unit.
pub const FU_START_BIT: u8 = 0x80;

/// FU header bit marking the last fragment of a NAL unit.
pub const FU_END_BIT: u8 = 0x40;

const NAL_UNIT_TYPE_MASK: u8 = 0x1F;
const HEADER_HIGH_BITS_MASK: u8 = 0xE0;

/// The one-byte header that starts every NAL unit.
///
/// ```text
/// +---------------+
/// |0|1|2|3|4|5|6|7|
/// +-+-+-+-+-+-+-+-+
/// |F|NRI|  Type   |
/// +---------------+
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NalUnitHeader {
    /// `forbidden_zero_bit` shall be equal to 0.
    pub forbidden_zero_bit: bool,

    /// `nal_ref_idc` not equal to 0 specifies that the content of the NAL unit contains:
    ///
    /// * a sequence parameter set
    /// * a sequence parameter set extension
    /// * a subset sequence parameter set
    /// * a picture parameter set
    /// * a slice of a reference picture
    /// * a slice data partition of a reference picture, or a prefix NAL unit preceding a slice of a reference picture
    ///
    /// `nal_ref_idc` shall be equal to 0 for all NAL units having nal_unit_type equal to 6, 9, 10, 11, or 12.
    pub nal_ref_idc: u8,

    /// `nal_unit_type` specifies the type of `RBSP` data structure contained in the NAL unit.
    /// Over RTP it may also name a packetization structure such as `FU_A`.
    pub nal_unit_type: u8,
}

impl NalUnitHeader {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            forbidden_zero_bit: byte & 0x80 != 0,
            nal_ref_idc: (byte >> 5) & 0b11,
            nal_unit_type: byte & NAL_UNIT_TYPE_MASK,
        }
    }

    pub fn to_byte(self) -> u8 {
        ((self.forbidden_zero_bit as u8) << 7)
            | ((self.nal_ref_idc & 0b11) << 5)
            | (self.nal_unit_type & NAL_UNIT_TYPE_MASK)
    }

    /// Rebuilds the header of a fragmented NAL unit: the F and NRI bits come from the FU indicator,
    /// the type from the FU header.
    pub fn from_fragment(fu_indicator: u8, fu_header: u8) -> Self {
        Self::from_byte((fu_indicator & HEADER_HIGH_BITS_MASK) | (fu_header & NAL_UNIT_TYPE_MASK))
    }

    pub fn is_fu_a(self) -> bool {
        self.nal_unit_type == FU_A
    }

    pub fn unit_type(self) -> NalUnitType {
        NalUnitType::from_nal_unit_type(self.nal_unit_type)
    }
}

impl fmt::Display for NalUnitHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} ({})", self.to_byte(), self.unit_type())
    }
}
