//! Bit-level transport: packing codewords into bytes and walking them
//! back out.
//!
//! Bits travel most-significant-bit-first within each byte. The packer
//! zero-pads the final partial byte; padding is indistinguishable from
//! data, so the unpacker stops on the expected symbol count rather than
//! on end of input.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::tree::{DecodeTree, NodeId};

/// Accumulates '0'/'1' codeword characters into bytes, emitting each
/// completed byte to the writer immediately.
#[derive(Debug)]
pub struct BitPacker<W: Write> {
    out: W,
    acc: u8,
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitPacker<W> {
    pub fn new(out: W) -> Self {
        BitPacker {
            out,
            acc: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    /// Appends every bit of `code` (characters '0'/'1').
    pub fn push_code(&mut self, code: &str) -> Result<()> {
        for bit in code.bytes() {
            self.push_bit(bit == b'1')?;
        }
        Ok(())
    }

    /// Appends one bit.
    pub fn push_bit(&mut self, bit: bool) -> Result<()> {
        self.acc = (self.acc << 1) | bit as u8;
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.out.write_all(&[self.acc])?;
            self.acc = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Shifts any residual bits into the high-order positions of one
    /// final zero-padded byte, flushes the writer, and returns the number
    /// of payload bits written (padding excluded). Writes nothing extra
    /// when the bit count is already byte-aligned.
    pub fn finish(mut self) -> Result<u64> {
        if self.filled > 0 {
            self.out.write_all(&[self.acc << (8 - self.filled)])?;
        }
        self.out.flush()?;
        Ok(self.bits_written)
    }
}

/// Terminal state of a decode walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Every expected symbol was produced.
    Complete,
    /// Input ran out before the expected count was reached.
    Truncated,
}

/// What a decode walk produced. A `Truncated` outcome is data, not an
/// error; callers that require an exact decode go through
/// [`DecodeOutcome::ensure_complete`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeOutcome {
    pub decoded: u64,
    pub expected: u64,
    pub status: DecodeStatus,
}

impl DecodeOutcome {
    /// Converts anything short of a complete decode into an error.
    pub fn ensure_complete(&self) -> Result<()> {
        match self.status {
            DecodeStatus::Complete => Ok(()),
            DecodeStatus::Truncated => Err(Error::SymbolCountMismatch {
                decoded: self.decoded,
                expected: self.expected,
            }),
        }
    }
}

/// Walks the encoded stream bit by bit through the decode tree, writing
/// each recovered symbol to `output`.
///
/// Bit 0 steps left, bit 1 steps right; reaching a node that carries a
/// symbol emits it and resets the walk to the root. The walk stops as
/// soon as `expected` symbols have been produced, so padding bits in the
/// final byte are never examined. A step with no child is fatal: the
/// 1-based position of the offending bit is reported and no further
/// input is consumed. The output is flushed before returning on every
/// path, leaving partially decoded data intact.
pub fn unpack<R: Read, W: Write>(
    encoded: &mut R,
    output: &mut W,
    tree: &DecodeTree,
    expected: u64,
) -> Result<DecodeOutcome> {
    let mut decoded = 0u64;
    let mut bit_position = 0u64;
    let mut position: NodeId = tree.root();
    let mut byte = [0u8; 1];

    while decoded < expected {
        let n = loop {
            match encoded.read(&mut byte) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            break;
        }
        for shift in (0..8).rev() {
            if decoded == expected {
                break;
            }
            let bit = (byte[0] >> shift) & 1 == 1;
            bit_position += 1;
            position = match tree.step(position, bit) {
                Some(next) => next,
                None => {
                    output.flush()?;
                    return Err(Error::InvalidCodeword { bit_position });
                }
            };
            if let Some(symbol) = tree.symbol(position) {
                output.write_all(&[symbol])?;
                decoded += 1;
                position = tree.root();
            }
        }
    }

    output.flush()?;
    let status = if decoded == expected {
        DecodeStatus::Complete
    } else {
        DecodeStatus::Truncated
    };
    Ok(DecodeOutcome {
        decoded,
        expected,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pack_codes(codes: &[&str]) -> (Vec<u8>, u64) {
        let mut out = Vec::new();
        let mut packer = BitPacker::new(&mut out);
        for code in codes {
            packer.push_code(code).unwrap();
        }
        let bits = packer.finish().unwrap();
        (out, bits)
    }

    fn abc_tree() -> DecodeTree {
        let mut tree = DecodeTree::new();
        tree.insert("0", b'a');
        tree.insert("10", b'b');
        tree.insert("11", b'c');
        tree
    }

    #[test]
    fn test_pack_nothing() {
        let (bytes, bits) = pack_codes(&[]);
        assert!(bytes.is_empty());
        assert_eq!(bits, 0);
    }

    #[test]
    fn test_pack_partial_byte_is_zero_padded() {
        let (bytes, bits) = pack_codes(&["0", "0", "0"]);
        assert_eq!(bytes, vec![0x00]);
        assert_eq!(bits, 3);

        let (bytes, bits) = pack_codes(&["111"]);
        assert_eq!(bytes, vec![0b1110_0000]);
        assert_eq!(bits, 3);
    }

    #[test]
    fn test_pack_msb_first() {
        let (bytes, bits) = pack_codes(&["10110101"]);
        assert_eq!(bytes, vec![0b1011_0101]);
        assert_eq!(bits, 8);
    }

    #[test]
    fn test_pack_spills_across_bytes() {
        let (bytes, bits) = pack_codes(&["101101011110"]);
        assert_eq!(bytes, vec![0b1011_0101, 0b1110_0000]);
        assert_eq!(bits, 12);
    }

    #[test]
    fn test_unpack_walks_codes() {
        // "abcba": 0 10 11 10 0 fills one byte exactly.
        let (bytes, bits) = pack_codes(&["0", "10", "11", "10", "0"]);
        assert_eq!(bits, 8);
        let mut out = Vec::new();
        let outcome = unpack(&mut Cursor::new(bytes), &mut out, &abc_tree(), 5).unwrap();
        assert_eq!(out, b"abcba");
        assert_eq!(outcome.decoded, 5);
        assert_eq!(outcome.status, DecodeStatus::Complete);
    }

    #[test]
    fn test_unpack_ignores_padding() {
        let (bytes, _) = pack_codes(&["10", "10", "10"]);
        let mut out = Vec::new();
        let outcome = unpack(&mut Cursor::new(bytes), &mut out, &abc_tree(), 3).unwrap();
        assert_eq!(out, b"bbb");
        assert_eq!(outcome.status, DecodeStatus::Complete);
    }

    #[test]
    fn test_unpack_stops_at_expected_count() {
        let (bytes, _) = pack_codes(&["0", "0", "0", "0", "0", "0", "0", "0"]);
        let mut out = Vec::new();
        let outcome = unpack(&mut Cursor::new(bytes), &mut out, &abc_tree(), 2).unwrap();
        assert_eq!(out, b"aa");
        assert_eq!(outcome.decoded, 2);
        assert_eq!(outcome.status, DecodeStatus::Complete);
    }

    #[test]
    fn test_unpack_truncated_input() {
        let (bytes, _) = pack_codes(&["0", "0", "0"]);
        let mut out = Vec::new();
        let outcome = unpack(&mut Cursor::new(bytes), &mut out, &abc_tree(), 20).unwrap();
        assert_eq!(outcome.status, DecodeStatus::Truncated);
        assert_eq!(outcome.decoded, 8);
        assert!(matches!(
            outcome.ensure_complete(),
            Err(Error::SymbolCountMismatch {
                decoded: 8,
                expected: 20
            })
        ));
    }

    #[test]
    fn test_unpack_reports_invalid_codeword_position() {
        // Single-codeword tree: any 1 bit walks off it. 0b0010_0000
        // decodes two symbols, then dies on the third bit.
        let mut tree = DecodeTree::new();
        tree.insert("0", b'a');
        let mut out = Vec::new();
        let err = unpack(&mut Cursor::new(vec![0b0010_0000]), &mut out, &tree, 7).unwrap_err();
        assert!(matches!(err, Error::InvalidCodeword { bit_position: 3 }));
        assert_eq!(out, b"aa");
    }

    #[test]
    fn test_unpack_expecting_nothing_reads_nothing() {
        let mut out = Vec::new();
        let outcome = unpack(
            &mut Cursor::new(Vec::new()),
            &mut out,
            &DecodeTree::new(),
            0,
        )
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(outcome.status, DecodeStatus::Complete);
    }
}
