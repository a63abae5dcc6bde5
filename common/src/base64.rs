//! A permissive base64 decoder for parameter sets passed on the command line.
//!
//! Both the standard (`+`, `/`) and the URL-safe (`-`, `_`) alphabets are accepted, even mixed in
//! one string. Decoding stops at the first character outside the alphabet and reports where it
//! stopped, so callers can split a `,` separated list without allocating.

/// Outcome of [`decode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Bytes written to the front of the destination.
    pub written: usize,
    /// Index of the first input byte that was not consumed.
    pub cursor: usize,
}

const PAD: u8 = b'=';

fn sextet(c: u8) -> Option<u32> {
    let value = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' | b'-' => 62,
        b'/' | b'_' => 63,
        _ => return None,
    };

    Some(value as u32)
}

/// Decodes base64 from the start of `input` into `dest`.
///
/// Decoding ends at the first `=`, at the first character outside the alphabet, at the end of
/// `input`, or when `dest` has no room for the next character. A trailing group of two
/// characters yields one byte and a group of three yields two; a single leftover character
/// carries too few bits for a byte and is dropped. A `=` closing a short group is consumed, and a
/// second `=` after a two-character group is consumed too.
pub fn decode(input: &[u8], dest: &mut [u8]) -> Decoded {
    let mut written = 0;
    let mut cursor = 0;
    let mut acc: u32 = 0;
    let mut pending = 0;

    while let Some(value) = input.get(cursor).copied().and_then(sextet) {
        // bytes fully covered once this character is in
        let consumed = cursor + 1;
        if consumed * 3 / 4 > dest.len() {
            break;
        }

        acc = (acc << 6) | value;
        pending += 1;
        cursor = consumed;

        if pending == 4 {
            dest[written] = (acc >> 16) as u8;
            dest[written + 1] = (acc >> 8) as u8;
            dest[written + 2] = acc as u8;
            written += 3;
            acc = 0;
            pending = 0;
        }
    }

    if pending >= 2 {
        acc <<= (4 - pending) * 6;
        dest[written] = (acc >> 16) as u8;
        written += 1;

        if pending == 3 {
            dest[written] = (acc >> 8) as u8;
            written += 1;
        }

        if input.get(cursor) == Some(&PAD) {
            cursor += 1;

            if pending == 2 && input.get(cursor) == Some(&PAD) {
                cursor += 1;
            }
        }
    }

    Decoded { written, cursor }
}
