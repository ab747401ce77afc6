//! Line-oriented input shared by the codecs.
//!
//! Lines are returned without their `'\n'` terminator.  A `'\r'` is an
//! ordinary character and is kept.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::io;

use crate::error::Error;

/// Separates a table from the data that follows it in an artifact.
pub const DELIMITER: &str = "--";

pub struct LineReader<R> {
    inner: BufReader<R>,
    line_no: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> LineReader<R> {
        LineReader {
            inner: BufReader::new(inner),
            line_no: 0,
        }
    }

    /// Read the next line as text, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Like `next_line`, but running out of input is an error.
    pub fn expect_line(&mut self) -> Result<String, Error> {
        self.next_line()?.ok_or(Error::UnexpectedEof)
    }

    /// Read the next line as raw bytes, terminator included.  An
    /// unterminated last line gets its `'\n'` added.
    pub fn next_raw(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.inner.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if line.last() != Some(&b'\n') {
            line.push(b'\n');
        }
        Ok(Some(line))
    }

    /// Read `<symbol><rest>` entries up to the delimiter line.  The
    /// entry for `'\n'` spans two lines: an empty one, then the rest.
    pub fn read_table(&mut self) -> Result<Vec<(char, String)>, Error> {
        let mut entries = Vec::new();
        loop {
            let line = self.expect_line()?;
            if line == DELIMITER {
                return Ok(entries);
            }
            let mut chars = line.chars();
            match chars.next() {
                Some(sym) => entries.push((sym, chars.as_str().to_string())),
                None => entries.push(('\n', self.expect_line()?)),
            }
        }
    }

    /// Number of lines read so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Read the whole input as text lines, terminators stripped.
pub fn read_lines<R: Read>(input: R) -> Result<Vec<String>, Error> {
    let mut reader = LineReader::new(input);
    let mut lines = Vec::new();
    while let Some(line) = reader.next_line()? {
        lines.push(line);
    }
    Ok(lines)
}

/// Iterate over the symbols of the line model: every character of every
/// line, followed by one `'\n'` per line.
pub fn symbols(lines: &[String]) -> impl Iterator<Item = char> + '_ {
    lines.iter().flat_map(|l| l.chars().chain(Some('\n')))
}

/// Symbol counts of one text, including one `'\n'` per line.
pub type Frequencies = BTreeMap<char, u64>;

/// Count every character of `lines`, plus the line terminators.  The
/// terminator is always present in the result, even for empty input.
pub fn frequencies(lines: &[String]) -> Frequencies {
    let mut freqs = Frequencies::new();
    freqs.insert('\n', 0);
    for sym in symbols(lines) {
        *freqs.entry(sym).or_insert(0) += 1;
    }
    freqs
}

/// Write one table entry in the format read by `read_table`.
pub fn write_entry<W: Write>(output: &mut W, sym: char, rest: &str) -> io::Result<()> {
    writeln!(output, "{}{}", sym, rest)
}
