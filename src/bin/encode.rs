use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use log::Level;

use huffcodec::encode_stream;
use huffcodec::error::Error;
use huffcodec::events::{self, Event, EventSink, Files, LogSink, RunStatus, ENCODER};

fn main() -> ExitCode {
    events::init_logger();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: encode <input_file> <codebook_file> <encoded_file>");
        return ExitCode::FAILURE;
    }

    let files = Files {
        input: &args[1],
        codebook: &args[2],
        output: &args[3],
    };
    let mut sink = LogSink;

    let input = match File::open(&args[1]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "input", &args[1], err),
    };
    let codebook = match File::create(&args[2]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "codebook", &args[2], err),
    };
    let encoded = match File::create(&args[3]) {
        Ok(file) => file,
        Err(err) => return open_failed(&mut sink, files, "encoded", &args[3], err),
    };

    let mut input = BufReader::new(input);
    let mut codebook = BufWriter::new(codebook);
    let mut encoded = BufWriter::new(encoded);

    match encode_stream(&mut input, &mut codebook, &mut encoded, files, &mut sink) {
        Ok(_) => ExitCode::SUCCESS,
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
    sink.record(
        Level::Info,
        ENCODER,
        &Event::EncodeStart { input: files.input },
    );
    let err = Error::ResourceUnavailable {
        role,
        path: path.to_string(),
        source,
    };
    sink.record(Level::Error, ENCODER, &Event::from_error(&err));
    sink.record(
        Level::Info,
        ENCODER,
        &Event::Finish {
            status: RunStatus::Error,
        },
    );
    ExitCode::FAILURE
}
