use std::io::Write;

use common::base64;
use common::byte_stream::ByteStreamWriter;
use common::nal_unit::START_CODE;
use tracing::{debug, info, trace, warn};

use crate::errors::{DepacketizeError, ParameterSetError, RecordError};
use crate::reassembler::{PacketKind, Reassembler};
use crate::record::RecordReader;
use crate::rtp::RtpHeader;

/// Room for one decoded parameter set.
pub const PARAMETER_SET_CAPACITY: usize = 0x1000 - START_CODE.len();

const PARAMETER_SET_SEPARATOR: u8 = b',';

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub parameter_sets: usize,
    pub packets: usize,
    pub skipped_packets: usize,
    pub nal_units: usize,
    pub fragmented_units: usize,
    pub bytes_written: usize,
    /// The framing error that ended the stream, `None` if it ran to the end of the capture.
    pub stopped_by: Option<RecordError>,
}

/// `Depacketizer` converts a capture of RTP-encapsulated H.264 into an Annex B byte stream.
///
/// Out-of-band parameter sets, if any, go first through [`Depacketizer::write_parameter_sets`].
/// Packets are then pushed in capture order; each packet's output is written to the sink in one
/// call.
#[derive(Debug, Default)]
pub struct Depacketizer {
    reassembler: Reassembler,
    summary: Summary,
}

impl Depacketizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn finish(self) -> Summary {
        self.summary
    }

    /// Decodes a `,` separated list of base64 NAL units and writes each one with its own start
    /// code. Returns how many were written.
    ///
    /// Any malformed entry fails the whole list before anything is written, a partial set of
    /// parameter sets would only confuse a decoder.
    pub fn write_parameter_sets<W: Write>(
        &mut self,
        parameter_sets: &str,
        out: &mut W,
    ) -> Result<usize, DepacketizeError> {
        let input = parameter_sets.as_bytes();
        let mut writer = ByteStreamWriter::new();
        let mut dest = [0u8; PARAMETER_SET_CAPACITY];
        let mut start = 0;
        let mut count = 0;

        loop {
            let decoded = base64::decode(&input[start..], &mut dest);
            let stop = start + decoded.cursor;
            let next = input.get(stop).copied();

            if decoded.written == 0 || !matches!(next, None | Some(PARAMETER_SET_SEPARATOR)) {
                return Err(ParameterSetError::Malformed {
                    input: parameter_sets.to_string(),
                    written: decoded.written,
                    cursor: stop,
                }
                .into());
            }

            let nal_unit = &dest[..decoded.written];
            debug!(
                "Parameter set {count}: {} bytes, header {:x}",
                nal_unit.len(),
                nal_unit[0]
            );
            writer.write_escaped_nal_unit(nal_unit);
            count += 1;

            match next {
                Some(_) => start = stop + 1,
                None => break,
            }
        }

        out.write_all(writer.as_bytes())?;
        self.summary.parameter_sets += count;
        self.summary.bytes_written += writer.len();

        Ok(count)
    }

    /// Depacketizes one RTP packet. A packet whose payload cannot be located is skipped and
    /// `Ok(None)` is returned; only a failing sink is an error.
    pub fn push_packet<W: Write>(
        &mut self,
        packet: &[u8],
        out: &mut W,
    ) -> Result<Option<PacketKind>, DepacketizeError> {
        self.summary.packets += 1;

        let pushed = RtpHeader::parse(packet)
            .and_then(|rtp| {
                trace!(
                    "Packet seq {} v{}, {} bytes",
                    rtp.sequence_number(),
                    rtp.version(),
                    packet.len()
                );
                rtp.payload()
            })
            .and_then(|payload| self.reassembler.push(payload));

        let kind = match pushed {
            Ok(kind) => kind,
            Err(err) => {
                warn!("Skipping packet {}: {err}", self.summary.packets);
                self.summary.skipped_packets += 1;
                return Ok(None);
            }
        };

        match kind {
            PacketKind::Single(_) => self.summary.nal_units += 1,
            PacketKind::FragmentStart(_) => {
                self.summary.nal_units += 1;
                self.summary.fragmented_units += 1;
            }
            PacketKind::FragmentMiddle | PacketKind::FragmentEnd => {}
        }

        let output = self.reassembler.output();
        out.write_all(output)?;
        self.summary.bytes_written += output.len();
        self.reassembler.clear_output();

        Ok(Some(kind))
    }

    /// Depacketizes every record until the end of the capture or the first framing error, then
    /// flushes `out`. A framing error is recorded in the summary, output written before it stays.
    pub fn depacketize<W: Write>(
        &mut self,
        records: RecordReader<'_>,
        out: &mut W,
    ) -> Result<&Summary, DepacketizeError> {
        for record in records {
            match record {
                Ok(packet) => {
                    self.push_packet(packet, out)?;
                }
                Err(err) => {
                    warn!("{err}, stopping");
                    self.summary.stopped_by = Some(err);
                    break;
                }
            }
        }

        out.flush()?;

        let summary = &self.summary;
        info!(
            "Read {} packets ({} skipped), wrote {} NAL units ({} fragmented) in {} bytes",
            summary.packets,
            summary.skipped_packets,
            summary.nal_units + summary.parameter_sets,
            summary.fragmented_units,
            summary.bytes_written
        );

        Ok(summary)
    }
}
