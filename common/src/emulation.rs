use crate::nal_unit::EMULATION_PREVENTION_BYTE;

/// Escapes NAL unit payload bytes so that no `00 00 0x` (x <= 3) sequence appears inside a NAL unit.
///
/// The zero-run counter belongs to the NAL unit, not to any one input slice. A NAL unit split over
/// several `encode` calls is escaped exactly as if it had been passed in one piece, so the counter
/// must only be reset when a new NAL unit begins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmulationPrevention {
    zero_run: u8,
}

impl EmulationPrevention {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of a new NAL unit payload.
    pub fn reset(&mut self) {
        self.zero_run = 0;
    }

    /// Consecutive zero bytes emitted since the last non-zero byte, capped at 2 by construction.
    pub fn zero_run(&self) -> u8 {
        self.zero_run
    }

    /// Appends `input` to `out`, inserting an `EMULATION_PREVENTION_BYTE` wherever two zero bytes
    /// would otherwise be followed by a byte `<= 0x03`.
    pub fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) {
        // worst case one extra byte for every two input bytes
        out.reserve(input.len() + input.len() / 2);

        for &b in input {
            if self.zero_run == 2 && b <= 0x03 {
                out.push(EMULATION_PREVENTION_BYTE);
                self.zero_run = 0;
            }

            out.push(b);
            self.zero_run = if b == 0 { self.zero_run + 1 } else { 0 };
        }
    }
}
