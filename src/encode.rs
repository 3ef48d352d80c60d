//! The encode pipeline: count, build, persist, pack, report.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use log::Level;

use crate::bits::BitPacker;
use crate::codebook::{self, CodebookEntry};
use crate::error::Result;
use crate::events::{Event, EventSink, Files, RunStatus, ENCODER, METRICS};
use crate::freq::FrequencyTable;
use crate::metrics::{self, Metrics};
use crate::tree::HuffmanTree;

/// What an encode run produced.
#[derive(Debug)]
pub struct EncodeSummary {
    /// Symbols consumed from the input.
    pub total_symbols: u64,
    /// The persisted codebook rows, in their written order.
    pub entries: Vec<CodebookEntry>,
    /// Payload bits written, padding excluded.
    pub payload_bits: u64,
    /// Derived statistics; absent for empty input.
    pub metrics: Option<Metrics>,
}

/// Runs the full encode pipeline over already-opened streams.
///
/// The input is scanned twice (count, then pack) and rewound in between,
/// hence the `Seek` bound. `files` carries the labels used in events.
/// Both writers are flushed before returning. Empty input is valid and
/// produces an empty codebook and an empty payload.
pub fn encode_stream<R, CW, PW>(
    input: &mut R,
    codebook_out: &mut CW,
    payload_out: &mut PW,
    files: Files<'_>,
    sink: &mut dyn EventSink,
) -> Result<EncodeSummary>
where
    R: Read + Seek,
    CW: Write,
    PW: Write,
{
    sink.record(
        Level::Info,
        ENCODER,
        &Event::EncodeStart { input: files.input },
    );

    let run = run_encode(input, codebook_out, payload_out, files, sink);
    match &run {
        Ok(_) => sink.record(
            Level::Info,
            ENCODER,
            &Event::Finish {
                status: RunStatus::Ok,
            },
        ),
        Err(err) => {
            sink.record(Level::Error, ENCODER, &Event::from_error(err));
            sink.record(
                Level::Info,
                ENCODER,
                &Event::Finish {
                    status: RunStatus::Error,
                },
            );
        }
    }
    run
}

fn run_encode<R, CW, PW>(
    input: &mut R,
    codebook_out: &mut CW,
    payload_out: &mut PW,
    files: Files<'_>,
    sink: &mut dyn EventSink,
) -> Result<EncodeSummary>
where
    R: Read + Seek,
    CW: Write,
    PW: Write,
{
    let freq = FrequencyTable::from_reader(input)?;

    let tree = match HuffmanTree::from_frequencies(&freq) {
        Some(tree) => tree,
        None => {
            codebook_out.flush()?;
            payload_out.flush()?;
            return Ok(EncodeSummary {
                total_symbols: 0,
                entries: Vec::new(),
                payload_bits: 0,
                metrics: None,
            });
        }
    };

    let codes = tree.assign_codes();
    let entries = codebook::build_entries(&freq, &codes);
    codebook::write_codebook(codebook_out, &entries)?;
    codebook_out.flush()?;

    // Second pass: replay the input and pack each symbol's code.
    input.seek(SeekFrom::Start(0))?;
    let mut packer = BitPacker::new(&mut *payload_out);
    let mut buf = [0u8; 8 * 1024];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            if let Some(code) = codes.get(byte) {
                packer.push_code(code)?;
            }
        }
    }
    let payload_bits = packer.finish()?;

    let metrics = metrics::compute(&entries, freq.total());
    if let Some(metrics) = &metrics {
        sink.record(
            Level::Info,
            METRICS,
            &Event::EncodeSummary { files, metrics },
        );
    }

    Ok(EncodeSummary {
        total_symbols: freq.total(),
        entries,
        payload_bits,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use std::io::Cursor;

    fn encode_bytes(input: &[u8]) -> (EncodeSummary, Vec<u8>, Vec<u8>, RecordingSink) {
        let files = Files {
            input: "in",
            codebook: "book",
            output: "payload",
        };
        let mut sink = RecordingSink::default();
        let mut cursor = Cursor::new(input.to_vec());
        let mut book = Vec::new();
        let mut payload = Vec::new();
        let summary =
            encode_stream(&mut cursor, &mut book, &mut payload, files, &mut sink).unwrap();
        (summary, book, payload, sink)
    }

    #[test]
    fn test_single_symbol_artifacts() {
        let (summary, book, payload, _) = encode_bytes(b"aaa");
        assert_eq!(
            book,
            b"\"a\",3,1.000000000000000,\"0\",0.000000000000000\n"
        );
        assert_eq!(payload, vec![0x00]);
        assert_eq!(summary.total_symbols, 3);
        assert_eq!(summary.payload_bits, 3);
    }

    #[test]
    fn test_empty_input_artifacts() {
        let (summary, book, payload, sink) = encode_bytes(b"");
        assert!(book.is_empty());
        assert!(payload.is_empty());
        assert_eq!(summary.total_symbols, 0);
        assert_eq!(summary.payload_bits, 0);
        assert!(summary.metrics.is_none());
        // Start and finish only; nothing to summarize.
        assert_eq!(sink.lines.len(), 2);
        assert_eq!(sink.lines[0].2, "start input_file=in");
        assert_eq!(sink.lines[1].2, "finish status=ok");
    }

    #[test]
    fn test_event_sequence() {
        let (_, _, _, sink) = encode_bytes(b"abracadabra");
        assert_eq!(sink.lines.len(), 3);
        assert_eq!(sink.lines[0].1, "encoder");
        assert!(sink.lines[0].2.starts_with("start "));
        assert_eq!(sink.lines[1].1, "metrics");
        assert!(sink.lines[1].2.starts_with("summary "));
        assert_eq!(sink.lines[2].2, "finish status=ok");
    }

    #[test]
    fn test_payload_bits_match_metrics() {
        let (summary, _, payload, _) = encode_bytes(b"the quick brown fox");
        let metrics = summary.metrics.unwrap();
        assert_eq!(summary.payload_bits, metrics.huffman_total_bits);
        assert_eq!(payload.len() as u64, metrics.huffman_total_bits.div_ceil(8));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let (_, book_a, payload_a, _) = encode_bytes(b"deterministic artifacts");
        let (_, book_b, payload_b, _) = encode_bytes(b"deterministic artifacts");
        assert_eq!(book_a, book_b);
        assert_eq!(payload_a, payload_b);
    }

    #[test]
    fn test_two_symbol_tie_break_artifacts() {
        let (_, book, payload, _) = encode_bytes(b"ab");
        assert_eq!(
            book,
            b"\"a\",1,0.500000000000000,\"0\",1.000000000000000\n\
              \"b\",1,0.500000000000000,\"1\",1.000000000000000\n"
        );
        // Bits 0 then 1, left-aligned: 0100_0000.
        assert_eq!(payload, vec![0b0100_0000]);
    }
}
