//! Huffman entropy codec with a human-readable codebook.
//!
//! The encoder counts byte frequencies, builds a Huffman tree with a
//! min-priority-queue merge, assigns prefix-free codes, persists a
//! textual codebook, and bit-packs the input most-significant-bit-first.
//! The decoder rebuilds an equivalent tree purely from the codebook and
//! walks the packed bits back into the original bytes, using the symbol
//! count recorded in the codebook to tell payload from padding.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use huffcodec::{decode_stream, encode_stream, Files, NullSink, ParsePolicy};
//!
//! let files = Files { input: "in", codebook: "book", output: "out" };
//! let mut sink = NullSink;
//!
//! let mut input = Cursor::new(b"abracadabra".to_vec());
//! let mut codebook = Vec::new();
//! let mut payload = Vec::new();
//! encode_stream(&mut input, &mut codebook, &mut payload, files, &mut sink)?;
//!
//! let mut decoded = Vec::new();
//! let outcome = decode_stream(
//!     &mut Cursor::new(payload),
//!     &mut Cursor::new(codebook),
//!     &mut decoded,
//!     ParsePolicy::Lenient,
//!     files,
//!     &mut sink,
//! )?;
//! outcome.ensure_complete()?;
//! assert_eq!(decoded, b"abracadabra");
//! # Ok::<(), huffcodec::Error>(())
//! ```

pub mod bits;
pub mod codebook;
pub mod decode;
pub mod encode;
pub mod error;
pub mod events;
pub mod freq;
pub mod metrics;
pub mod tree;

pub use bits::{DecodeOutcome, DecodeStatus};
pub use codebook::{CodebookEntry, DecodeBook, ParsePolicy};
pub use decode::decode_stream;
pub use encode::{encode_stream, EncodeSummary};
pub use error::{Error, Result};
pub use events::{EventSink, Files, LogSink, NullSink};
pub use freq::FrequencyTable;
pub use metrics::Metrics;
pub use tree::{CodeTable, DecodeTree, HuffmanTree};
