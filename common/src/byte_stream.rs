use crate::emulation::EmulationPrevention;
use crate::nal_unit::{NalUnitHeader, START_CODE};

/// `ByteStreamWriter` builds an Annex B byte stream: each NAL unit is written as `START_CODE`,
/// its header byte, then its payload with emulation prevention applied.
///
/// The buffered bytes are meant to be drained with [`ByteStreamWriter::clear`] once they have been
/// handed to a sink. Clearing keeps both the allocation and the zero-run state, so a NAL unit may
/// be written across any number of drains.
#[derive(Debug, Default)]
pub struct ByteStreamWriter {
    data: Vec<u8>,
    emulation: EmulationPrevention,
}

impl ByteStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            emulation: EmulationPrevention::new(),
        }
    }

    /// Writes the start code and header byte of a new NAL unit.
    pub fn begin_nal_unit(&mut self, header: NalUnitHeader) {
        self.data.extend_from_slice(&START_CODE);
        self.data.push(header.to_byte());
        self.emulation.reset();
    }

    /// Appends payload bytes of the NAL unit in progress.
    pub fn write_payload(&mut self, payload: &[u8]) {
        self.emulation.encode(payload, &mut self.data);
    }

    /// Writes a complete NAL unit whose bytes are already escaped, such as a parameter set taken
    /// from session description.
    pub fn write_escaped_nal_unit(&mut self, nal_unit: &[u8]) {
        self.data.extend_from_slice(&START_CODE);
        self.data.extend_from_slice(nal_unit);
        self.emulation.reset();
    }

    pub fn zero_run(&self) -> u8 {
        self.emulation.zero_run()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_nal_unit() {
        let mut writer = ByteStreamWriter::new();
        writer.begin_nal_unit(NalUnitHeader::from_byte(0x41));
        writer.write_payload(&[0x9A, 0x00, 0x00, 0x01]);

        assert_eq!(
            writer.as_bytes(),
            &[0x00, 0x00, 0x00, 0x01, 0x41, 0x9A, 0x00, 0x00, 0x03, 0x01]
        );
    }

    #[test]
    fn test_header_byte_is_not_part_of_zero_run() {
        let mut writer = ByteStreamWriter::new();
        writer.write_payload(&[0x00, 0x00]);
        writer.begin_nal_unit(NalUnitHeader::from_byte(0x06));
        writer.write_payload(&[0x00, 0x00, 0x05]);

        assert_eq!(writer.zero_run(), 0);
        assert_eq!(
            &writer.as_bytes()[2..],
            &[0x00, 0x00, 0x00, 0x01, 0x06, 0x00, 0x00, 0x05]
        );
    }

    #[test]
    fn test_clear_keeps_zero_run() {
        let mut writer = ByteStreamWriter::with_capacity(16);
        writer.begin_nal_unit(NalUnitHeader::from_byte(0x65));
        writer.write_payload(&[0x88, 0x00, 0x00]);
        writer.clear();

        assert!(writer.is_empty());
        writer.write_payload(&[0x02]);
        assert_eq!(writer.as_bytes(), &[0x03, 0x02]);
    }

    #[test]
    fn test_escaped_nal_units_are_copied_verbatim() {
        let mut writer = ByteStreamWriter::new();
        writer.write_escaped_nal_unit(&[0x68, 0xCE, 0x00, 0x00, 0x03, 0x80]);

        assert_eq!(writer.len(), 10);
        assert_eq!(&writer.as_bytes()[4..], &[0x68, 0xCE, 0x00, 0x00, 0x03, 0x80]);
    }
}
