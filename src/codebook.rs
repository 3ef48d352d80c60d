//! The textual codebook shared between encoder and decoder.
//!
//! One row per distinct symbol, in ascending count order (ties broken by
//! symbol value):
//!
//! ```text
//! "<symbol>",<count>,<probability>,"<code>",<self_information>
//! ```
//!
//! The symbol field escapes newline, tab, carriage return, double quote
//! and backslash; every other byte value is written literally, so the
//! file is byte-oriented text rather than guaranteed UTF-8. Probability
//! and self-information carry fifteen decimal places.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::freq::FrequencyTable;
use crate::tree::{CodeTable, DecodeTree};

/// Longest codeword accepted when parsing.
const MAX_CODE_LEN: usize = 255;

/// One row of the codebook.
#[derive(Debug, Clone, PartialEq)]
pub struct CodebookEntry {
    pub symbol: u8,
    pub count: u64,
    pub probability: f64,
    pub code: String,
    pub self_info: f64,
}

/// How the parser treats rows it cannot understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Skip malformed rows and keep going. The historical behavior, and
    /// the one the command-line tools use.
    #[default]
    Lenient,
    /// Fail on the first malformed row, naming its line and defect.
    Strict,
}

/// Everything the decoder needs, rebuilt from a codebook stream.
#[derive(Debug)]
pub struct DecodeBook {
    /// Tree grown from the parsed (code, symbol) pairs.
    pub tree: DecodeTree,
    /// Sum of the counts of every parsed row; the number of symbols the
    /// payload is expected to decode to.
    pub expected_symbols: u64,
    /// Rows parsed successfully.
    pub rows: usize,
    /// Rows skipped under lenient parsing.
    pub skipped: usize,
}

/// Builds the ordered entry list for a finished frequency/code pair.
pub fn build_entries(freq: &FrequencyTable, codes: &CodeTable) -> Vec<CodebookEntry> {
    let total = freq.total();
    let mut entries: Vec<CodebookEntry> = freq
        .iter()
        .filter_map(|(symbol, count)| {
            codes.get(symbol).map(|code| {
                let probability = count as f64 / total as f64;
                CodebookEntry {
                    symbol,
                    count,
                    probability,
                    code: code.to_string(),
                    self_info: (1.0 / probability).log2(),
                }
            })
        })
        .collect();
    entries.sort_by(|a, b| a.count.cmp(&b.count).then(a.symbol.cmp(&b.symbol)));
    entries
}

/// Serializes entries in their given order, one row per entry.
pub fn write_codebook<W: Write>(out: &mut W, entries: &[CodebookEntry]) -> Result<()> {
    for entry in entries {
        out.write_all(b"\"")?;
        write_symbol(out, entry.symbol)?;
        let rest = format!(
            "\",{},{:.15},\"{}\",{:.15}\n",
            entry.count, entry.probability, entry.code, entry.self_info
        );
        out.write_all(rest.as_bytes())?;
    }
    Ok(())
}

fn write_symbol<W: Write>(out: &mut W, symbol: u8) -> Result<()> {
    match symbol {
        b'\n' => out.write_all(b"\\n")?,
        b'\t' => out.write_all(b"\\t")?,
        b'\r' => out.write_all(b"\\r")?,
        b'"' => out.write_all(b"\\\"")?,
        b'\\' => out.write_all(b"\\\\")?,
        other => out.write_all(&[other])?,
    }
    Ok(())
}

/// Parses a codebook stream into a decode tree plus the expected symbol
/// count. Lines are split on `\n`; a trailing `\r` is tolerated.
pub fn read_codebook<R: BufRead>(input: &mut R, policy: ParsePolicy) -> Result<DecodeBook> {
    let mut tree = DecodeTree::new();
    let mut expected_symbols = 0u64;
    let mut rows = 0usize;
    let mut skipped = 0usize;
    let mut line = Vec::new();
    let mut line_no = 0usize;

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_no += 1;
        match parse_row(&line) {
            Ok(row) => {
                tree.insert(&row.code, row.symbol);
                expected_symbols = expected_symbols.saturating_add(row.count);
                rows += 1;
            }
            Err(reason) => match policy {
                ParsePolicy::Lenient => skipped += 1,
                ParsePolicy::Strict => {
                    return Err(Error::MalformedCodebookRow {
                        line: line_no,
                        reason,
                    })
                }
            },
        }
    }

    Ok(DecodeBook {
        tree,
        expected_symbols,
        rows,
        skipped,
    })
}

struct ParsedRow {
    symbol: u8,
    count: u64,
    code: String,
}

/// Parses one raw line. The error names the first defect found; the
/// caller decides whether that skips the row or aborts the run.
fn parse_row(raw: &[u8]) -> std::result::Result<ParsedRow, &'static str> {
    let mut line = raw;
    if let Some((&b'\n', head)) = line.split_last() {
        line = head;
    }
    if let Some((&b'\r', head)) = line.split_last() {
        line = head;
    }

    if line.is_empty() {
        return Err("empty line");
    }
    if line[0] != b'"' {
        return Err("missing opening quote");
    }

    let (symbol, symbol_len) = match line.get(1) {
        None => return Err("missing symbol"),
        Some(&b'\\') => {
            let escaped = *line.get(2).ok_or("truncated symbol escape")?;
            let symbol = match escaped {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                b'0' => 0,
                other => other,
            };
            (symbol, 2)
        }
        Some(&other) => (other, 1),
    };

    // The closing quote must immediately follow the symbol form.
    if line.get(1 + symbol_len) != Some(&b'"') {
        return Err("missing closing quote");
    }

    let rest = &line[symbol_len + 2..];
    let rest = std::str::from_utf8(rest).map_err(|_| "malformed field data")?;
    let rest = rest.strip_prefix(',').ok_or("missing field separator")?;

    let (count_field, rest) = rest.split_once(',').ok_or("missing probability field")?;
    let count: u64 = count_field.parse().map_err(|_| "invalid count field")?;

    let (probability_field, rest) = rest.split_once(',').ok_or("missing code field")?;
    probability_field
        .parse::<f64>()
        .map_err(|_| "invalid probability field")?;

    let rest = rest.strip_prefix('"').ok_or("missing code field")?;
    let (code, rest) = rest.split_once('"').ok_or("unterminated code field")?;
    if code.is_empty() {
        return Err("empty code field");
    }
    if code.len() > MAX_CODE_LEN {
        return Err("oversized code field");
    }
    if !code.bytes().all(|b| b == b'0' || b == b'1') {
        return Err("invalid code character");
    }

    let info_field = rest.strip_prefix(',').ok_or("missing self-information field")?;
    info_field
        .parse::<f64>()
        .map_err(|_| "invalid self-information field")?;

    Ok(ParsedRow {
        symbol,
        count,
        code: code.to_string(),
    })
}
