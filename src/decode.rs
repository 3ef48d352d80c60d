//! The decode pipeline: rebuild the tree, walk the bits, report.

use std::io::{BufRead, Read, Write};

use log::Level;

use crate::bits::{self, DecodeOutcome, DecodeStatus};
use crate::codebook::{self, ParsePolicy};
use crate::error::Result;
use crate::events::{Event, EventSink, Files, RunStatus, DECODER, METRICS};

/// Runs the full decode pipeline over already-opened streams.
///
/// The codebook is parsed under `policy`, the payload is walked through
/// the rebuilt tree, and the outcome is reported. A short read is not an
/// `Err`: the returned outcome says `Truncated` and the finish event says
/// `error`, but whatever was decoded stays in `output`. Callers that
/// require an exact decode follow up with
/// [`DecodeOutcome::ensure_complete`].
pub fn decode_stream<E, C, W>(
    encoded: &mut E,
    codebook: &mut C,
    output: &mut W,
    policy: ParsePolicy,
    files: Files<'_>,
    sink: &mut dyn EventSink,
) -> Result<DecodeOutcome>
where
    E: Read,
    C: BufRead,
    W: Write,
{
    sink.record(Level::Info, DECODER, &Event::DecodeStart { files });

    let run = run_decode(encoded, codebook, output, policy, files, sink);
    match &run {
        Ok(outcome) => {
            let status = match outcome.status {
                DecodeStatus::Complete => RunStatus::Ok,
                DecodeStatus::Truncated => RunStatus::Error,
            };
            sink.record(Level::Info, DECODER, &Event::Finish { status });
        }
        Err(err) => {
            sink.record(Level::Error, DECODER, &Event::from_error(err));
            sink.record(
                Level::Info,
                DECODER,
                &Event::Finish {
                    status: RunStatus::Error,
                },
            );
        }
    }
    run
}

fn run_decode<E, C, W>(
    encoded: &mut E,
    codebook: &mut C,
    output: &mut W,
    policy: ParsePolicy,
    files: Files<'_>,
    sink: &mut dyn EventSink,
) -> Result<DecodeOutcome>
where
    E: Read,
    C: BufRead,
    W: Write,
{
    let book = codebook::read_codebook(codebook, policy)?;
    let outcome = bits::unpack(encoded, output, &book.tree, book.expected_symbols)?;

    sink.record(
        Level::Info,
        METRICS,
        &Event::DecodeSummary {
            files,
            decoded: outcome.decoded,
            expected: outcome.expected,
            status: outcome.status,
        },
    );

    Ok(outcome)
}
