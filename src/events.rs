//! Structured run events and their logging adapter.
//!
//! The pipelines never format log lines themselves; they produce typed
//! events and hand them to an injected [`EventSink`]. [`LogSink`] renders
//! events as flat `key=value` lines through the `log` facade, using the
//! originating component as the log target.

use std::fmt::Write as _;

use log::Level;

use crate::bits::DecodeStatus;
use crate::error::Error;
use crate::metrics::Metrics;

/// Component names used as log targets.
pub const ENCODER: &str = "encoder";
pub const DECODER: &str = "decoder";
pub const METRICS: &str = "metrics";

/// The file paths (or stream labels) a run operates on. Purely for
/// reporting; the pipelines work on already-opened streams.
#[derive(Debug, Clone, Copy)]
pub struct Files<'a> {
    pub input: &'a str,
    pub codebook: &'a str,
    pub output: &'a str,
}

/// Overall status carried by the finish event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    Error,
}

impl RunStatus {
    fn as_str(self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::Error => "error",
        }
    }
}

/// One structured event in the life of an encode or decode run.
#[derive(Debug)]
pub enum Event<'a> {
    /// An encode run began.
    EncodeStart { input: &'a str },
    /// A decode run began.
    DecodeStart { files: Files<'a> },
    /// The run ended.
    Finish { status: RunStatus },
    /// Something failed. `reason` is a stable identifier; the fields
    /// carry its context.
    Error {
        reason: &'static str,
        fields: Vec<(&'static str, String)>,
    },
    /// Per-run statistics from the encoder.
    EncodeSummary {
        files: Files<'a>,
        metrics: &'a Metrics,
    },
    /// Per-run accounting from the decoder.
    DecodeSummary {
        files: Files<'a>,
        decoded: u64,
        expected: u64,
        status: DecodeStatus,
    },
}

impl Event<'static> {
    /// Maps a pipeline error to its reporting vocabulary.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidArguments(detail) => Event::Error {
                reason: "invalid_arguments",
                fields: vec![("detail", detail.clone())],
            },
            Error::ResourceUnavailable { role, path, .. } => Event::Error {
                reason: open_failure_reason(role),
                fields: vec![("file", path.clone())],
            },
            Error::Io(source) => Event::Error {
                reason: "stream_error",
                fields: vec![("detail", source.to_string())],
            },
            Error::MalformedCodebookRow { line, reason } => Event::Error {
                reason: "malformed_codebook_row",
                fields: vec![("line", line.to_string()), ("reason", (*reason).to_string())],
            },
            Error::InvalidCodeword { bit_position } => Event::Error {
                reason: "invalid_codeword",
                fields: vec![
                    ("bit_position", bit_position.to_string()),
                    ("reason", "unexpected_prefix".to_string()),
                ],
            },
            Error::SymbolCountMismatch { decoded, expected } => Event::Error {
                reason: "symbol_count_mismatch",
                fields: vec![
                    ("decoded", decoded.to_string()),
                    ("expected", expected.to_string()),
                ],
            },
        }
    }
}

fn open_failure_reason(role: &str) -> &'static str {
    match role {
        "input" => "cannot_open_input_file",
        "codebook" => "cannot_open_codebook",
        "encoded" => "cannot_open_encoded_file",
        "output" => "cannot_open_output_file",
        _ => "cannot_open_file",
    }
}

fn render(event: &Event<'_>) -> String {
    match event {
        Event::EncodeStart { input } => format!("start input_file={input}"),
        Event::DecodeStart { files } => format!(
            "start input_encoded={} input_codebook={} output_file={}",
            files.input, files.codebook, files.output
        ),
        Event::Finish { status } => format!("finish status={}", status.as_str()),
        Event::Error { reason, fields } => {
            let mut line = String::from(*reason);
            for (key, value) in fields {
                let _ = write!(line, " {key}={value}");
            }
            line
        }
        Event::EncodeSummary { files, metrics } => format!(
            "summary input_file={} output_codebook={} output_encoded={} \
             num_symbols={} fixed_code_bits_per_symbol={} \
             entropy_bits_per_symbol={:.3} perplexity={:.3} \
             huffman_bits_per_symbol={:.3} total_bits_fixed={} \
             total_bits_huffman={} compression_ratio={:.9} \
             saving_percentage={:.3}",
            files.input,
            files.codebook,
            files.output,
            metrics.total_symbols,
            metrics.fixed_bits_per_symbol,
            metrics.entropy,
            metrics.perplexity,
            metrics.avg_code_len,
            metrics.fixed_total_bits,
            metrics.huffman_total_bits,
            metrics.compression_ratio,
            metrics.saving_percentage
        ),
        Event::DecodeSummary {
            files,
            decoded,
            expected,
            status,
        } => format!(
            "summary input_encoded={} input_codebook={} output_file={} \
             num_decoded_symbols={} expected_symbols={} status={}",
            files.input,
            files.codebook,
            files.output,
            decoded,
            expected,
            match status {
                DecodeStatus::Complete => "ok",
                DecodeStatus::Truncated => "mismatch",
            }
        ),
    }
}

/// Capability through which the pipelines report their events.
pub trait EventSink {
    fn record(&mut self, level: Level, component: &str, event: &Event<'_>);
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _level: Level, _component: &str, _event: &Event<'_>) {}
}

/// Sink that renders events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, level: Level, component: &str, event: &Event<'_>) {
        log::log!(target: component, level, "{}", render(event));
    }
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Installs the stderr backend for the `log` facade. Later calls are
/// no-ops, so tests and binaries can both call it freely.
pub fn init_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Sink that keeps every rendered event, for asserting on sequences.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub lines: Vec<(Level, String, String)>,
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn record(&mut self, level: Level, component: &str, event: &Event<'_>) {
        self.lines
            .push((level, component.to_string(), render(event)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_render_start_events() {
        assert_eq!(
            render(&Event::EncodeStart { input: "in.txt" }),
            "start input_file=in.txt"
        );
        let files = Files {
            input: "data.huff",
            codebook: "book.csv",
            output: "out.txt",
        };
        assert_eq!(
            render(&Event::DecodeStart { files }),
            "start input_encoded=data.huff input_codebook=book.csv output_file=out.txt"
        );
    }

    #[test]
    fn test_render_finish() {
        assert_eq!(
            render(&Event::Finish {
                status: RunStatus::Ok
            }),
            "finish status=ok"
        );
        assert_eq!(
            render(&Event::Finish {
                status: RunStatus::Error
            }),
            "finish status=error"
        );
    }

    #[test]
    fn test_open_failure_vocabulary() {
        let err = Error::ResourceUnavailable {
            role: "codebook",
            path: "book.csv".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(
            render(&Event::from_error(&err)),
            "cannot_open_codebook file=book.csv"
        );
    }

    #[test]
    fn test_invalid_codeword_vocabulary() {
        let err = Error::InvalidCodeword { bit_position: 9 };
        assert_eq!(
            render(&Event::from_error(&err)),
            "invalid_codeword bit_position=9 reason=unexpected_prefix"
        );
    }

    #[test]
    fn test_render_encode_summary() {
        let metrics = Metrics {
            total_symbols: 3,
            distinct_symbols: 1,
            entropy: 0.0,
            perplexity: 1.0,
            avg_code_len: 1.0,
            fixed_bits_per_symbol: 1,
            fixed_total_bits: 3,
            huffman_total_bits: 3,
            compression_ratio: 1.0,
            saving_percentage: 0.0,
        };
        let files = Files {
            input: "in.txt",
            codebook: "book.csv",
            output: "data.huff",
        };
        assert_eq!(
            render(&Event::EncodeSummary {
                files,
                metrics: &metrics
            }),
            "summary input_file=in.txt output_codebook=book.csv output_encoded=data.huff \
             num_symbols=3 fixed_code_bits_per_symbol=1 entropy_bits_per_symbol=0.000 \
             perplexity=1.000 huffman_bits_per_symbol=1.000 total_bits_fixed=3 \
             total_bits_huffman=3 compression_ratio=1.000000000 saving_percentage=0.000"
        );
    }

    #[test]
    fn test_render_decode_summary() {
        let files = Files {
            input: "data.huff",
            codebook: "book.csv",
            output: "out.txt",
        };
        assert_eq!(
            render(&Event::DecodeSummary {
                files,
                decoded: 5,
                expected: 8,
                status: DecodeStatus::Truncated
            }),
            "summary input_encoded=data.huff input_codebook=book.csv output_file=out.txt \
             num_decoded_symbols=5 expected_symbols=8 status=mismatch"
        );
    }
}
