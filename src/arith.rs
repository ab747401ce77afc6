// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Arithmetic coder with decimal precision.
//!
//! The coding interval is kept as two 18-digit decimal numbers.  Whenever
//! both bounds agree on their leading digit, that digit is written out as
//! a 4-bit BCD code and the interval is scaled up by ten.  The static
//! cumulative frequency table is stored in front of the code so that the
//! decoder can replay the same interval narrowing.

use std::collections::HashMap;
use std::io::{Read, Write};

use log::debug;

use crate::bitfile::{BitReader, BitWriter};
use crate::error::Error;
use crate::linefile::{self, Frequencies, LineReader, DELIMITER};

type Symbol = char;

/// Number of decimal digits held by the interval bounds.
const DIGITS: usize = 18;

const MAX_CODE: u64 = 999_999_999_999_999_999;

/// Weight of the leading digit.
const LEADING: u64 = 100_000_000_000_000_000;

const BCD_BITS: usize = 4;

#[derive(Debug, PartialEq)]
struct Prob {
    low:   u64,
    high:  u64,
    total: u64,
}

/// Cumulative frequencies, in the order they were built from (and are
/// stored in the artifact in).
#[derive(Debug, PartialEq)]
pub struct IntervalTable {
    symbols: Vec<Symbol>,
    lows: Vec<u64>,
    total: u64,
}

impl IntervalTable {
    pub fn from_freqs(freqs: &Frequencies) -> IntervalTable {
        let mut symbols = Vec::with_capacity(freqs.len());
        let mut lows = Vec::with_capacity(freqs.len());
        let mut total = 0;
        for (&sym, &count) in freqs {
            symbols.push(sym);
            lows.push(total);
            total += count;
        }
        IntervalTable { symbols, lows, total }
    }

    /// Rebuild a table read back from an artifact.  The lower bounds
    /// must be ascending and must not exceed the total.
    fn from_parts(symbols: Vec<Symbol>, lows: Vec<u64>, total: u64) -> Result<IntervalTable, Error> {
        if lows.windows(2).any(|w| w[0] > w[1]) || lows.last().map_or(false, |&l| l > total) {
            return Err(Error::MalformedTable("cumulative counts are not ascending".to_string()));
        }
        Ok(IntervalTable { symbols, lows, total })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All `(symbol, low, high)` sub-intervals of `[0, total)`.
    pub fn intervals(&self) -> Vec<(Symbol, u64, u64)> {
        (0..self.len()).map(|i| {
            let p = self.prob(i);
            (self.symbols[i], p.low, p.high)
        }).collect()
    }

    fn prob(&self, idx: usize) -> Prob {
        Prob {
            low: self.lows[idx],
            high: self.lows.get(idx + 1).cloned().unwrap_or(self.total),
            total: self.total,
        }
    }

    /// Find the entry whose sub-interval contains `count`.  Entries
    /// with an empty sub-interval are never returned.
    fn find(&self, count: u64) -> Result<usize, Error> {
        let upper = self.lows.partition_point(|&low| low <= count);
        if upper == 0 || count >= self.total {
            return Err(Error::IndexOutOfRange(count));
        }
        Ok(upper - 1)
    }
}

/// The current coding interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Interval {
    low: u64,
    high: u64,
}

impl Interval {
    fn new() -> Interval {
        Interval { low: 0, high: MAX_CODE }
    }

    fn range(&self) -> u128 {
        (self.high - self.low) as u128 + 1
    }

    /// Narrow the interval to the part that belongs to `p`.  Encoder
    /// and decoder both go through here, so they agree on every bound.
    fn narrow(&mut self, p: &Prob) -> Result<(), Error> {
        let range = self.range();
        let low_off = range * p.low as u128 / p.total as u128;
        let high_off = range * p.high as u128 / p.total as u128;
        if high_off <= low_off {
            return Err(Error::IntervalUnderflow);
        }
        self.high = self.low + (high_off - 1) as u64;
        self.low += low_off as u64;
        Ok(())
    }

    /// If both bounds share their leading digit, drop it and shift in a
    /// `0` at the low end and a `9` at the high end.  Returns the
    /// dropped digit.
    fn shift(&mut self) -> Option<u64> {
        let digit = self.low / LEADING;
        if digit != self.high / LEADING {
            return None;
        }
        self.low = (self.low % LEADING) * 10;
        self.high = (self.high % LEADING) * 10 + 9;
        Some(digit)
    }

    /// Any value inside the interval identifies it.
    fn midpoint(&self) -> u64 {
        self.low + (self.high - self.low) / 2
    }

    /// Map a code value inside the interval back to a cumulative count.
    fn count(&self, value: u64, total: u64) -> Result<u64, Error> {
        if value < self.low || value > self.high {
            return Err(Error::IndexOutOfRange(value));
        }
        let offset = (value - self.low) as u128 + 1;
        Ok(((offset * total as u128 - 1) / self.range()) as u64)
    }
}

/// Encode the text read from `input` and write the artifact to
/// `output`.  On success, the output is returned.
pub fn encode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let lines = linefile::read_lines(input)?;
    let table = IntervalTable::from_freqs(&linefile::frequencies(&lines));
    let index: HashMap<Symbol, usize> =
        table.symbols.iter().enumerate().map(|(i, &s)| (s, i)).collect();

    for (&sym, low) in table.symbols.iter().zip(&table.lows) {
        linefile::write_entry(&mut output, sym, &low.to_string())?;
    }
    writeln!(output, "{}", DELIMITER)?;
    writeln!(output, "{}", table.total)?;

    let mut outp = BitWriter::new(output);
    let mut interval = Interval::new();
    for sym in linefile::symbols(&lines) {
        interval.narrow(&table.prob(index[&sym]))?;
        while let Some(digit) = interval.shift() {
            outp.write_bits(digit, BCD_BITS)?;
        }
    }

    // Write out all digits of a value inside the final interval, so that
    // the decoder always has a full frame to look at.
    let mut value = interval.midpoint();
    let mut divisor = LEADING;
    while divisor > 0 {
        outp.write_bits(value / divisor, BCD_BITS)?;
        value %= divisor;
        divisor /= 10;
    }
    debug!("arith: {} symbols, {} distinct, {} digits",
           table.total, table.len(), outp.written() / BCD_BITS);

    let mut output = outp.flush()?;
    writeln!(output)?;
    Ok(output)
}

fn read_table<R: Read>(inp: &mut LineReader<R>) -> Result<IntervalTable, Error> {
    let mut symbols = Vec::new();
    let mut lows = Vec::new();
    for (sym, low) in inp.read_table()? {
        let low: u64 = low.parse().map_err(|_| Error::MalformedTable(format!("{}{}", sym, low)))?;
        symbols.push(sym);
        lows.push(low);
    }
    let total = inp.expect_line()?;
    let total: u64 = total.parse().map_err(|_| Error::MalformedTable(total))?;
    IntervalTable::from_parts(symbols, lows, total)
}

fn read_digits(line: &str) -> Result<Vec<u8>, Error> {
    if line.len() % BCD_BITS != 0 {
        return Err(Error::MalformedCode(format!("{} bits do not form whole digits", line.len())));
    }
    let mut bits = BitReader::new(line);
    let mut digits = Vec::with_capacity(line.len() / BCD_BITS);
    while !bits.is_empty() {
        let digit = bits.read_bits(BCD_BITS)?;
        if digit > 9 {
            return Err(Error::MalformedCode(format!("{:04b} is not a decimal digit", digit)));
        }
        digits.push(digit as u8);
    }
    Ok(digits)
}

/// The `DIGITS` digits starting at `pos`, as a number.
fn frame(digits: &[u8], pos: usize) -> Result<u64, Error> {
    let window = digits.get(pos..pos + DIGITS).ok_or(Error::UnexpectedEof)?;
    Ok(window.iter().fold(0, |acc, &d| acc * 10 + d as u64))
}

/// Decode an artifact read from `input` and write the text to
/// `output`.  On success, the output is returned.
pub fn decode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);
    let table = read_table(&mut inp)?;
    let digits = read_digits(&inp.next_line()?.unwrap_or_default())?;
    debug!("arith: {} symbols, {} distinct, {} digits", table.total, table.len(), digits.len());

    let mut interval = Interval::new();
    let mut pos = 0;
    let mut buf = [0u8; 4];
    for _ in 0..table.total {
        let value = frame(&digits, pos)?;
        let idx = table.find(interval.count(value, table.total)?)?;
        output.write_all(table.symbols[idx].encode_utf8(&mut buf).as_bytes())?;

        interval.narrow(&table.prob(idx))?;
        while interval.shift().is_some() {
            pos += 1;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use ::std::io::Cursor;
    use super::{decode, encode, Interval, IntervalTable, Prob, MAX_CODE};
    use crate::error::Error;
    use crate::linefile::{frequencies, read_lines};

    // Digits 5703124 followed by twelve nines.
    const AAB: &[u8] = b"\n0\na1\nb3\n--\n4\n\
        0101011100000011000100100100\
        100110011001100110011001100110011001100110011001\n";

    fn roundtrip(input: &[u8]) {
        let encoded = encode(Cursor::new(input), vec![]).unwrap();
        let decoded = decode(Cursor::new(&encoded[..]), vec![]).unwrap();
        assert_eq!(input, &decoded[..]);
    }

    #[test]
    fn narrow() {
        let mut iv = Interval::new();
        iv.narrow(&Prob { low: 1, high: 3, total: 4 }).unwrap();
        assert_eq!(Interval { low: 250_000_000_000_000_000, high: 749_999_999_999_999_999 }, iv);
        assert_eq!(None, iv.shift());
    }

    #[test]
    fn shift() {
        let mut iv = Interval { low: 562_500_000_000_000_000, high: 578_124_999_999_999_999 };
        assert_eq!(Some(5), iv.shift());
        assert_eq!(Interval { low: 625_000_000_000_000_000, high: 781_249_999_999_999_999 }, iv);
        assert_eq!(None, iv.shift());
    }

    #[test]
    fn narrow_to_nothing() {
        let mut iv = Interval { low: 10, high: 11 };
        match iv.narrow(&Prob { low: 0, high: 1, total: 3 }) {
            Err(Error::IntervalUnderflow) => {},
            other => panic!("expected underflow, got {:?}", other),
        }
    }

    #[test]
    fn count_maps_back() {
        let iv = Interval::new();
        assert_eq!(0, iv.count(0, 4).unwrap());
        assert_eq!(1, iv.count(250_000_000_000_000_000, 4).unwrap());
        assert_eq!(0, iv.count(249_999_999_999_999_999, 4).unwrap());
        assert_eq!(3, iv.count(MAX_CODE, 4).unwrap());
    }

    #[test]
    fn encode_aab() {
        let encoded = encode(Cursor::new(&b"aab\n"[..]), vec![]).unwrap();
        assert_eq!(AAB, &encoded[..]);
    }

    #[test]
    fn decode_aab() {
        let decoded = decode(Cursor::new(AAB), vec![]).unwrap();
        assert_eq!(&b"aab\n"[..], &decoded[..]);
    }

    #[test]
    fn encode_empty() {
        let encoded = encode(Cursor::new(&b""[..]), vec![]).unwrap();
        let mut expected = b"\n0\n--\n0\n".to_vec();
        // 499999999999999999
        expected.extend_from_slice(b"0100");
        for _ in 0..17 {
            expected.extend_from_slice(b"1001");
        }
        expected.push(b'\n');
        assert_eq!(expected, encoded);
        let decoded = decode(Cursor::new(&encoded[..]), vec![]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn compress_decompress() {
        roundtrip(b"\n");
        roundtrip(b"q\n");
        roundtrip(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\n");
        roundtrip(b"The banana goat in the banana boat can hand bananas to the banana man.\n");
        roundtrip("Мама мыла раму.\n\n--\n-\n0123456789\n".as_bytes());
        roundtrip(include_bytes!("arith.rs"));
    }

    #[test]
    fn partition() {
        let lines = read_lines(Cursor::new(&include_bytes!("huff.rs")[..])).unwrap();
        let table = IntervalTable::from_freqs(&frequencies(&lines));
        let intervals = table.intervals();
        assert_eq!(0, intervals[0].1);
        for w in intervals.windows(2) {
            assert!(w[0].1 < w[0].2);
            assert_eq!(w[0].2, w[1].1);
        }
        assert_eq!(table.total(), intervals[intervals.len() - 1].2);
    }

    #[test]
    fn bad_digit() {
        let artifact = b"a0\n--\n1\n1010\n";
        match decode(Cursor::new(&artifact[..]), vec![]) {
            Err(Error::MalformedCode(_)) => {},
            other => panic!("expected malformed code, got {:?}", other),
        }
    }

    #[test]
    fn truncated_code() {
        let artifact = b"a0\n--\n1\n00010001\n";
        match decode(Cursor::new(&artifact[..]), vec![]) {
            Err(Error::UnexpectedEof) => {},
            other => panic!("expected eof, got {:?}", other),
        }
    }

    #[test]
    fn count_below_first_interval() {
        let mut artifact = b"a5\nb7\n--\n10\n".to_vec();
        for _ in 0..18 {
            artifact.extend_from_slice(b"0000");
        }
        artifact.push(b'\n');
        match decode(Cursor::new(&artifact[..]), vec![]) {
            Err(Error::IndexOutOfRange(0)) => {},
            other => panic!("expected index error, got {:?}", other),
        }
    }

    #[test]
    fn bad_total() {
        let artifact = b"a0\nb5\n--\n3\n";
        match decode(Cursor::new(&artifact[..]), vec![]) {
            Err(Error::MalformedTable(_)) => {},
            other => panic!("expected malformed table, got {:?}", other),
        }
    }
}
