//! Distribution statistics derived from a finished codebook.

use crate::codebook::CodebookEntry;

/// Observational statistics for one encode run. Reported alongside the
/// artifacts; never feeds back into codec behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Total number of input symbols.
    pub total_symbols: u64,
    /// Number of distinct symbols.
    pub distinct_symbols: usize,
    /// Shannon entropy of the distribution, bits per symbol.
    pub entropy: f64,
    /// 2 raised to the entropy.
    pub perplexity: f64,
    /// Probability-weighted mean codeword length, bits per symbol.
    pub avg_code_len: f64,
    /// Width of the fixed-size baseline code: ceil(log2(distinct)), at
    /// least 1.
    pub fixed_bits_per_symbol: u32,
    /// Baseline cost of the whole input at that fixed width.
    pub fixed_total_bits: u64,
    /// Actual Huffman cost of the whole input.
    pub huffman_total_bits: u64,
    /// fixed_total_bits over huffman_total_bits.
    pub compression_ratio: f64,
    /// Fraction of the baseline cost saved.
    pub saving_percentage: f64,
}

/// Derives all statistics from the entry list. Returns `None` when there
/// is nothing to report (empty input).
pub fn compute(entries: &[CodebookEntry], total_symbols: u64) -> Option<Metrics> {
    if entries.is_empty() || total_symbols == 0 {
        return None;
    }

    let mut entropy = 0.0;
    let mut avg_code_len = 0.0;
    let mut huffman_total_bits = 0u64;
    for entry in entries {
        entropy += entry.probability * (1.0 / entry.probability).log2();
        avg_code_len += entry.probability * entry.code.len() as f64;
        huffman_total_bits += entry.count * entry.code.len() as u64;
    }

    let fixed_bits_per_symbol = fixed_width_bits(entries.len());
    let fixed_total_bits = total_symbols * u64::from(fixed_bits_per_symbol);

    Some(Metrics {
        total_symbols,
        distinct_symbols: entries.len(),
        entropy,
        perplexity: entropy.exp2(),
        avg_code_len,
        fixed_bits_per_symbol,
        fixed_total_bits,
        huffman_total_bits,
        compression_ratio: fixed_total_bits as f64 / huffman_total_bits as f64,
        saving_percentage: 1.0 - huffman_total_bits as f64 / fixed_total_bits as f64,
    })
}

/// Bits needed to give each of `n` symbols a distinct fixed-width code;
/// a one-symbol alphabet still costs one bit per symbol.
fn fixed_width_bits(n: usize) -> u32 {
    if n <= 1 {
        1
    } else {
        (n as u64 - 1).ilog2() + 1
    }
}
