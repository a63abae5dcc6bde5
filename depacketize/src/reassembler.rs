use common::byte_stream::ByteStreamWriter;
use common::nal_unit::{NalUnitHeader, FU_END_BIT, FU_START_BIT};
use tracing::{debug, warn};

use crate::errors::RtpError;

/// Whether a fragmented NAL unit is open across packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentState {
    Idle,
    InFragmentedUnit { header: NalUnitHeader },
}

/// How one RTP payload was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// A complete NAL unit. Any packet type other than FU-A lands here, STAP-A included.
    Single(NalUnitHeader),
    /// First fragment of a NAL unit, carrying the rebuilt header.
    FragmentStart(NalUnitHeader),
    FragmentMiddle,
    FragmentEnd,
}

/// `Reassembler` turns RTP payloads into Annex B NAL units.
///
/// Single NAL unit packets and FU-A start fragments begin a new NAL unit. The remaining fragments
/// append to it without a start code, sharing one zero-run counter for emulation prevention, so
/// a NAL unit split over N packets is escaped the same as if it had arrived whole.
///
/// Output accumulates in an internal buffer until [`Reassembler::clear_output`] is called.
#[derive(Debug)]
pub struct Reassembler {
    state: FragmentState,
    writer: ByteStreamWriter,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            state: FragmentState::Idle,
            // a full packet plus its worst case escaping
            writer: ByteStreamWriter::with_capacity(0x18000),
        }
    }

    pub fn state(&self) -> FragmentState {
        self.state
    }

    pub fn zero_run(&self) -> u8 {
        self.writer.zero_run()
    }

    pub fn output(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    pub fn clear_output(&mut self) {
        self.writer.clear();
    }

    /// Appends the Annex B form of one RTP payload to the output.
    pub fn push(&mut self, payload: &[u8]) -> Result<PacketKind, RtpError> {
        let Some((&indicator, rest)) = payload.split_first() else {
            return Err(RtpError::EmptyPayload);
        };

        let indicator = NalUnitHeader::from_byte(indicator);
        if !indicator.is_fu_a() {
            if let FragmentState::InFragmentedUnit { header } = self.state {
                warn!("Fragmented block {header} interrupted by a single NAL unit");
            }

            debug!("Start block with code: {indicator}");
            self.writer.begin_nal_unit(indicator);
            self.writer.write_payload(rest);
            self.state = FragmentState::Idle;

            return Ok(PacketKind::Single(indicator));
        }

        let (&fu_header, fragment) = rest.split_first().ok_or(RtpError::MissingFuHeader)?;

        let kind = if fu_header & FU_START_BIT != 0 {
            let header = NalUnitHeader::from_fragment(indicator.to_byte(), fu_header);
            if let FragmentState::InFragmentedUnit { header: open } = self.state {
                warn!("Fragmented block {open} ended without an end fragment");
            }

            debug!("Fragmented block with code: {header}");
            self.writer.begin_nal_unit(header);
            self.state = FragmentState::InFragmentedUnit { header };

            PacketKind::FragmentStart(header)
        } else {
            if self.state == FragmentState::Idle {
                warn!("FU-A fragment without a start fragment, appending to the previous NAL unit");
            }

            match fu_header & FU_END_BIT != 0 {
                true => PacketKind::FragmentEnd,
                false => PacketKind::FragmentMiddle,
            }
        };

        self.writer.write_payload(fragment);

        if fu_header & FU_END_BIT != 0 {
            self.state = FragmentState::Idle;
        }

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::nal_unit::START_CODE;
    use common::rbsp::to_rbsp;

    fn annex_b(header: u8, payload: &[u8]) -> Vec<u8> {
        let mut unit = START_CODE.to_vec();
        unit.push(header);
        unit.extend_from_slice(payload);
        unit
    }

    #[test]
    fn test_single_nal_unit() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();
        let kind = reassembler.push(&[0x67, 0x42, 0x00, 0x1F])?;

        assert_eq!(kind, PacketKind::Single(NalUnitHeader::from_byte(0x67)));
        assert_eq!(reassembler.output(), annex_b(0x67, &[0x42, 0x00, 0x1F]));
        assert_eq!(reassembler.state(), FragmentState::Idle);

        Ok(())
    }

    #[test]
    fn test_three_fragments_make_one_nal_unit() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();

        // FU indicator NRI=3, original type 5
        let start = reassembler.push(&[0x7C, 0x85, 0xA1, 0xA2])?;
        let middle = reassembler.push(&[0x7C, 0x05, 0xA3, 0xA4])?;
        let end = reassembler.push(&[0x7C, 0x45, 0xA5, 0xA6])?;

        let header = NalUnitHeader::from_byte(0x65);
        assert_eq!(start, PacketKind::FragmentStart(header));
        assert_eq!(middle, PacketKind::FragmentMiddle);
        assert_eq!(end, PacketKind::FragmentEnd);
        assert_eq!(
            reassembler.output(),
            annex_b(0x65, &[0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6])
        );
        assert_eq!(reassembler.state(), FragmentState::Idle);

        Ok(())
    }

    #[test]
    fn test_state_tracks_open_fragmented_unit() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();
        reassembler.push(&[0x5C, 0x81, 0x10])?;

        let header = NalUnitHeader::from_byte(0x41);
        assert_eq!(
            reassembler.state(),
            FragmentState::InFragmentedUnit { header }
        );

        reassembler.push(&[0x5C, 0x01, 0x11])?;
        assert_eq!(
            reassembler.state(),
            FragmentState::InFragmentedUnit { header }
        );

        reassembler.push(&[0x5C, 0x41, 0x12])?;
        assert_eq!(reassembler.state(), FragmentState::Idle);

        Ok(())
    }

    #[test]
    fn test_zero_run_split_across_fragments_is_escaped() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();

        reassembler.push(&[0x7C, 0x85, 0x11, 0x00, 0x00])?;
        assert_eq!(reassembler.zero_run(), 2);
        reassembler.push(&[0x7C, 0x05, 0x01, 0x00])?;
        reassembler.push(&[0x7C, 0x45, 0x00, 0x02])?;

        let expected = annex_b(
            0x65,
            &[0x11, 0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x02],
        );
        assert_eq!(reassembler.output(), expected);
        assert_eq!(
            to_rbsp(&expected[5..]),
            vec![0x11, 0x00, 0x00, 0x01, 0x00, 0x00, 0x02]
        );

        Ok(())
    }

    #[test]
    fn test_new_nal_unit_resets_zero_run() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();

        reassembler.push(&[0x41, 0x00, 0x00])?;
        reassembler.push(&[0x41, 0x01])?;
        reassembler.push(&[0x7C, 0x81, 0x00, 0x00])?;
        reassembler.clear_output();
        reassembler.push(&[0x7C, 0x81, 0x01])?;

        assert_eq!(reassembler.output(), annex_b(0x61, &[0x01]));

        Ok(())
    }

    #[test]
    fn test_output_survives_clear_between_fragments() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();

        reassembler.push(&[0x7C, 0x85, 0x00, 0x00])?;
        reassembler.clear_output();
        reassembler.push(&[0x7C, 0x45, 0x03])?;

        assert_eq!(reassembler.output(), &[0x03, 0x03]);

        Ok(())
    }

    #[test]
    fn test_continuation_without_start_appends() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();

        reassembler.push(&[0x41, 0x9A])?;
        let kind = reassembler.push(&[0x7C, 0x45, 0xB0, 0xB1])?;

        assert_eq!(kind, PacketKind::FragmentEnd);
        assert_eq!(reassembler.output(), annex_b(0x41, &[0x9A, 0xB0, 0xB1]));

        Ok(())
    }

    #[test]
    fn test_start_and_end_in_one_packet() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();
        let kind = reassembler.push(&[0x7C, 0xC6, 0x05])?;

        assert_eq!(kind, PacketKind::FragmentStart(NalUnitHeader::from_byte(0x66)));
        assert_eq!(reassembler.state(), FragmentState::Idle);
        assert_eq!(reassembler.output(), annex_b(0x66, &[0x05]));

        Ok(())
    }

    #[test]
    fn test_stap_a_is_forwarded_as_a_single_unit() -> Result<(), RtpError> {
        let mut reassembler = Reassembler::new();
        let stap_a = [0x78, 0x00, 0x02, 0x09, 0xF0];

        assert!(matches!(reassembler.push(&stap_a)?, PacketKind::Single(_)));
        assert_eq!(reassembler.output(), annex_b(0x78, &stap_a[1..]));

        Ok(())
    }

    #[test]
    fn test_fu_a_without_fu_header() {
        let mut reassembler = Reassembler::new();

        assert_eq!(reassembler.push(&[0x7C]), Err(RtpError::MissingFuHeader));
        assert!(reassembler.output().is_empty());
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(Reassembler::new().push(&[]), Err(RtpError::EmptyPayload));
    }
}
