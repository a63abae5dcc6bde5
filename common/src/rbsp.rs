use std::fmt;

use crate::nal_unit::EMULATION_PREVENTION_BYTE;

/// NAL unit types, pulled from Table 7-1 plus the packetization types RFC 6184 assigns to the
/// values H.264 leaves unspecified.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NalUnitType {
    Unspecified,
    CodedSliceNonIDRPicture,
    CodedSliceDataPartitionA,
    CodedSliceDataPartitionB,
    CodedSliceDataPartitionC,
    CodedSliceIDRPicture,
    SupplementalEnhancementInformation,
    SequenceParameterSet,
    PictureParameterSet,
    AccessUnitDelimiter,
    SequenceEnd,
    StreamEnd,
    FillerData,
    SequenceParameterSetExtension,
    PrefixNALUnit,
    SubsetSequenceParameterSet,
    DepthParameterSet,
    Reserved,
    CodedSliceAuxiliaryCodedPictureNonPartitioning,
    CodedSliceExtension,
    CodedSliceExtensionDepthViewComponent,
    StapA,
    StapB,
    Mtap16,
    Mtap24,
    FuA,
    FuB,
}

impl NalUnitType {
    /// Only the low five bits of `nal_unit_type` are looked at.
    pub fn from_nal_unit_type(nal_unit_type: u8) -> Self {
        match nal_unit_type & 0x1F {
            1 => NalUnitType::CodedSliceNonIDRPicture,
            2 => NalUnitType::CodedSliceDataPartitionA,
            3 => NalUnitType::CodedSliceDataPartitionB,
            4 => NalUnitType::CodedSliceDataPartitionC,
            5 => NalUnitType::CodedSliceIDRPicture,
            6 => NalUnitType::SupplementalEnhancementInformation,
            7 => NalUnitType::SequenceParameterSet,
            8 => NalUnitType::PictureParameterSet,
            9 => NalUnitType::AccessUnitDelimiter,
            10 => NalUnitType::SequenceEnd,
            11 => NalUnitType::StreamEnd,
            12 => NalUnitType::FillerData,
            13 => NalUnitType::SequenceParameterSetExtension,
            14 => NalUnitType::PrefixNALUnit,
            15 => NalUnitType::SubsetSequenceParameterSet,
            16 => NalUnitType::DepthParameterSet,
            17 | 18 | 22 | 23 => NalUnitType::Reserved,
            19 => NalUnitType::CodedSliceAuxiliaryCodedPictureNonPartitioning,
            20 => NalUnitType::CodedSliceExtension,
            21 => NalUnitType::CodedSliceExtensionDepthViewComponent,
            24 => NalUnitType::StapA,
            25 => NalUnitType::StapB,
            26 => NalUnitType::Mtap16,
            27 => NalUnitType::Mtap24,
            28 => NalUnitType::FuA,
            29 => NalUnitType::FuB,
            _ => NalUnitType::Unspecified,
        }
    }
}

impl fmt::Display for NalUnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NalUnitType::Unspecified => "unspecified",
            NalUnitType::CodedSliceNonIDRPicture => "non-IDR slice",
            NalUnitType::CodedSliceDataPartitionA => "slice data partition A",
            NalUnitType::CodedSliceDataPartitionB => "slice data partition B",
            NalUnitType::CodedSliceDataPartitionC => "slice data partition C",
            NalUnitType::CodedSliceIDRPicture => "IDR slice",
            NalUnitType::SupplementalEnhancementInformation => "SEI",
            NalUnitType::SequenceParameterSet => "SPS",
            NalUnitType::PictureParameterSet => "PPS",
            NalUnitType::AccessUnitDelimiter => "AUD",
            NalUnitType::SequenceEnd => "end of sequence",
            NalUnitType::StreamEnd => "end of stream",
            NalUnitType::FillerData => "filler data",
            NalUnitType::SequenceParameterSetExtension => "SPS extension",
            NalUnitType::PrefixNALUnit => "prefix NAL unit",
            NalUnitType::SubsetSequenceParameterSet => "subset SPS",
            NalUnitType::DepthParameterSet => "depth parameter set",
            NalUnitType::Reserved => "reserved",
            NalUnitType::CodedSliceAuxiliaryCodedPictureNonPartitioning => "auxiliary slice",
            NalUnitType::CodedSliceExtension => "slice extension",
            NalUnitType::CodedSliceExtensionDepthViewComponent => "depth view slice extension",
            NalUnitType::StapA => "STAP-A",
            NalUnitType::StapB => "STAP-B",
            NalUnitType::Mtap16 => "MTAP16",
            NalUnitType::Mtap24 => "MTAP24",
            NalUnitType::FuA => "FU-A",
            NalUnitType::FuB => "FU-B",
        };

        f.write_str(name)
    }
}

/// Recovers the raw byte sequence payload from escaped NAL unit bytes by dropping every
/// `EMULATION_PREVENTION_BYTE` that follows two zero bytes.
pub fn to_rbsp(escaped: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(escaped.len());
    let mut zero_run = 0;

    for &b in escaped {
        if zero_run == 2 && b == EMULATION_PREVENTION_BYTE {
            zero_run = 0;
            continue;
        }

        rbsp.push(b);
        zero_run = if b == 0 { zero_run + 1 } else { 0 };
    }

    rbsp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_7_1_lookup() {
        assert_eq!(
            NalUnitType::from_nal_unit_type(5),
            NalUnitType::CodedSliceIDRPicture
        );
        assert_eq!(NalUnitType::from_nal_unit_type(0), NalUnitType::Unspecified);
        assert_eq!(NalUnitType::from_nal_unit_type(23), NalUnitType::Reserved);
        assert_eq!(NalUnitType::from_nal_unit_type(28), NalUnitType::FuA);
        assert_eq!(NalUnitType::from_nal_unit_type(30), NalUnitType::Unspecified);
        // upper header bits are ignored
        assert_eq!(
            NalUnitType::from_nal_unit_type(0x68),
            NalUnitType::PictureParameterSet
        );
    }

    #[test]
    fn test_to_rbsp_drops_emulation_prevention_bytes() {
        let escaped = [0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x00, 0x07];
        assert_eq!(to_rbsp(&escaped), vec![0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x07]);
    }

    #[test]
    fn test_to_rbsp_keeps_data_threes() {
        // 0x03 after a single zero is data
        let escaped = [0x00, 0x03, 0x00, 0x00, 0x03, 0x03];
        assert_eq!(to_rbsp(&escaped), vec![0x00, 0x03, 0x00, 0x00, 0x03]);
    }
}
