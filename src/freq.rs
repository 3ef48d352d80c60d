//! Byte frequency analysis, the encoder's first pass over the input.

use std::io::{ErrorKind, Read};

use crate::error::Result;

const READ_BUF_LEN: usize = 8 * 1024;

/// Occurrence counts for every byte value seen in an input stream.
///
/// Built once per encode run and treated as immutable afterwards. An empty
/// input is valid and yields a table with `total() == 0`.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl FrequencyTable {
    /// Counts byte frequencies in an in-memory buffer.
    pub fn from_bytes(input: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in input {
            counts[byte as usize] += 1;
        }
        FrequencyTable {
            counts,
            total: input.len() as u64,
        }
    }

    /// Counts byte frequencies from an opened stream in a single forward
    /// pass through a fixed buffer.
    pub fn from_reader<R: Read>(input: &mut R) -> Result<Self> {
        let mut counts = [0u64; 256];
        let mut total = 0u64;
        let mut buf = [0u8; READ_BUF_LEN];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                counts[byte as usize] += 1;
            }
            total += n as u64;
        }
        Ok(FrequencyTable { counts, total })
    }

    /// Occurrence count recorded for one symbol.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// True when no symbols were counted.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterates over `(symbol, count)` pairs with nonzero count, in
    /// ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}
