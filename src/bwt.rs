// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Blockwise Burrows-Wheeler transform followed by move-to-front coding.
//!
//! The text is cut into blocks of `BLOCK_SIZE` characters.  Each block
//! is written as its sorted alphabet (one symbol per line, the line
//! terminator as an empty line), a `--` line, the key index and the
//! move-to-front codes of the transformed block as one bit string.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use log::debug;

use crate::bitfile::{BitReader, BitWriter};
use crate::error::Error;
use crate::linefile::{LineReader, DELIMITER};
use crate::mtf;

pub const BLOCK_SIZE: usize = 1000;

/// Result of transforming one block.
#[derive(Debug, PartialEq)]
pub struct Transformed {
    /// Distinct symbols of the block, sorted.
    pub alphabet: Vec<char>,
    /// Position of the unrotated block among the sorted rotations.
    pub key_index: usize,
    /// Last symbol of every sorted rotation.
    pub row: Vec<char>,
}

fn rotation(block: &[char], start: usize) -> impl Iterator<Item = &char> {
    block[start..].iter().chain(&block[..start])
}

/// Sort all rotations of `block` and read off their last symbols.
pub fn transform(block: &[char]) -> Transformed {
    let n = block.len();
    let mut rotations: Vec<usize> = (0..n).collect();
    // Stable, so that equal rotations of a periodic block keep the
    // unrotated one first.
    rotations.sort_by(|&a, &b| rotation(block, a).cmp(rotation(block, b)));

    let key_index = rotations.iter().position(|&r| r == 0).unwrap_or(0);
    let row = rotations.iter().map(|&r| block[(r + n - 1) % n]).collect();

    let mut alphabet = block.to_vec();
    alphabet.sort();
    alphabet.dedup();

    Transformed { alphabet, key_index, row }
}

/// For every position of the sorted rotations, the position holding the
/// rotation that starts one symbol later.
///
/// This is the counting-sort inverse: each symbol's first slot is the
/// number of strictly smaller symbols in `row`.
pub fn next_pointers(row: &[char]) -> Vec<usize> {
    let mut first: BTreeMap<char, usize> = BTreeMap::new();
    for &c in row {
        *first.entry(c).or_insert(0) += 1;
    }
    let mut sum = 0;
    for slot in first.values_mut() {
        let count = *slot;
        *slot = sum;
        sum += count;
    }

    let mut next = vec![0; row.len()];
    for (i, c) in row.iter().enumerate() {
        if let Some(slot) = first.get_mut(c) {
            next[*slot] = i;
            *slot += 1;
        }
    }
    next
}

/// Rebuild the block from its transformed row and key index.
pub fn inverse(row: &[char], key_index: usize) -> Result<Vec<char>, Error> {
    if row.is_empty() {
        return Ok(Vec::new());
    }
    if key_index >= row.len() {
        return Err(Error::IndexOutOfRange(key_index as u64));
    }
    let next = next_pointers(row);
    let mut block = Vec::with_capacity(row.len());
    let mut idx = next[key_index];
    for _ in 0..row.len() {
        block.push(row[idx]);
        idx = next[idx];
    }
    Ok(block)
}

fn write_block<W: Write>(output: &mut W, block: &[char]) -> Result<(), Error> {
    let t = transform(block);
    for &sym in &t.alphabet {
        // The terminator is spelled as a single empty line.
        if sym == '\n' {
            writeln!(output)?;
        } else {
            writeln!(output, "{}", sym)?;
        }
    }
    writeln!(output, "{}", DELIMITER)?;
    writeln!(output, "{}", t.key_index)?;

    let width = mtf::code_width(t.alphabet.len());
    let mut outp = BitWriter::new(&mut *output);
    for idx in mtf::encode(&t.row, &t.alphabet)? {
        outp.write_bits(idx as u64, width)?;
    }
    let output = outp.flush()?;
    writeln!(output)?;
    Ok(())
}

/// Encode the text read from `input` and write the artifact to
/// `output`.  On success, the output is returned.
pub fn encode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);
    let mut block = Vec::with_capacity(BLOCK_SIZE);
    let mut blocks = 0;

    while let Some(line) = inp.next_line()? {
        for c in line.chars().chain(Some('\n')) {
            block.push(c);
            if block.len() == BLOCK_SIZE {
                write_block(&mut output, &block)?;
                block.clear();
                blocks += 1;
            }
        }
    }
    // The last block may be shorter.
    if !block.is_empty() {
        write_block(&mut output, &block)?;
        blocks += 1;
    }
    debug!("bwt: wrote {} blocks from {} lines", blocks, inp.line_no());

    Ok(output)
}

fn read_row(bits: &str, alphabet: &[char]) -> Result<Vec<char>, Error> {
    let width = mtf::code_width(alphabet.len());
    if bits.len() % width != 0 {
        return Err(Error::MalformedCode(format!("{} bits do not form {}-bit codes", bits.len(), width)));
    }
    let mut reader = BitReader::new(bits);
    let mut indices = Vec::with_capacity(bits.len() / width);
    while !reader.is_empty() {
        indices.push(reader.read_bits(width)? as usize);
    }
    mtf::decode(&indices, alphabet)
}

/// Decode an artifact read from `input` and write the text to
/// `output`.  On success, the output is returned.
pub fn decode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);
    let mut alphabet = Vec::new();
    let mut blocks = 0;
    let mut buf = [0u8; 4];

    while let Some(line) = inp.next_line()? {
        if line != DELIMITER {
            let mut chars = line.chars();
            match (chars.next(), chars.next()) {
                (None, _) => alphabet.push('\n'),
                (Some(c), None) => alphabet.push(c),
                _ => return Err(Error::MalformedTable(line)),
            }
            continue;
        }

        let key = inp.expect_line()?;
        let key_index: usize = key.parse().map_err(|_| Error::MalformedTable(key))?;
        alphabet.sort();
        alphabet.dedup();
        let row = read_row(&inp.expect_line()?, &alphabet)?;
        for c in inverse(&row, key_index)? {
            output.write_all(c.encode_utf8(&mut buf).as_bytes())?;
        }
        alphabet.clear();
        blocks += 1;
    }
    if !alphabet.is_empty() {
        return Err(Error::UnexpectedEof);
    }
    debug!("bwt: read {} blocks", blocks);

    Ok(output)
}
