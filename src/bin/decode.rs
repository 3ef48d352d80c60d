use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use log::Level;

use huffcodec::decode_stream;
use huffcodec::error::Error;
use huffcodec::events::{self, Event, EventSink, Files, LogSink, RunStatus, DECODER};
use huffcodec::ParsePolicy;

fn main() -> ExitCode {
    events::init_logger();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: decode <encoded_file> <codebook_file> <output_file>");
        return ExitCode::FAILURE;
    }

    let files = Files {
        input: &args[1],
        codebook: &args[2],
        output: &args[3],
    };
    let mut sink = LogSink;

    let encoded = match File::open(&args[1]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "encoded", &args[1], err),
    };
    let codebook = match File::open(&args[2]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "codebook", &args[2], err),
    };
    let output = match File::create(&args[3]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "output", &args[3], err),
    };

    let mut encoded = BufReader::new(encoded);
    let mut codebook = BufReader::new(codebook);
    let mut output = BufWriter::new(output);

    let run = decode_stream(
        &mut encoded,
        &mut codebook,
        &mut output,
        ParsePolicy::Lenient,
        files,
        &mut sink,
    );
    match run {
        Ok(outcome) => match outcome.ensure_complete() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Err(_) => ExitCode::FAILURE,
    }
}

/// The run never reached the pipeline; emit the start, the failure and
/// the finish here so every invocation reports a complete sequence.
fn open_failed(
    sink: &mut LogSink,
    files: Files<'_>,
    role: &'static str,
    path: &str,
    source: io::Error,
) -> ExitCode {
    sink.record(Level::Info, DECODER, &Event::DecodeStart { files });
    let err = Error::ResourceUnavailable {
        role,
        path: path.to_string(),
        source,
    };
    sink.record(Level::Error, DECODER, &Event::from_error(&err));
    sink.record(
        Level::Info,
        DECODER,
        &Event::Finish {
            status: RunStatus::Error,
        },
    );
    ExitCode::FAILURE
}
