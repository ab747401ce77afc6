// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Hamming (7,4) code.
//!
//! Every byte is split into two nibbles, and every nibble `b1 b2 b3 b4`
//! becomes the frame `p1 p2 b1 p3 b2 b3 b4`, with the parity bits at
//! positions 1, 2 and 4.  One flipped bit per frame is corrected on
//! decoding; two flipped bits are miscorrected without notice.
//!
//! Each input line (including its terminator) becomes one line of
//! `'0'`/`'1'` characters, 14 per byte.  The decoder also accepts
//! artifact lines ending in `"\r\n"`.

use std::io::{Read, Write};

use log::{debug, info};

use crate::bitfile::{BitReader, BitWriter};
use crate::error::Error;
use crate::linefile::LineReader;

/// Bits per frame.
pub const FRAME_BITS: usize = 7;

/// Bits per encoded byte.
pub const BYTE_BITS: usize = 2 * FRAME_BITS;

// Frame bits, counted from the most significant of the seven.
const P1: usize = 0;
const P2: usize = 1;
const B1: usize = 2;
const P3: usize = 3;
const B2: usize = 4;
const B3: usize = 5;
const B4: usize = 6;

fn bit(frame: u8, pos: usize) -> u8 {
    (frame >> (FRAME_BITS - 1 - pos)) & 1
}

/// Encode the low four bits of `nibble` into a frame.
pub fn encode_nibble(nibble: u8) -> u8 {
    let b1 = (nibble >> 3) & 1;
    let b2 = (nibble >> 2) & 1;
    let b3 = (nibble >> 1) & 1;
    let b4 = nibble & 1;
    let p1 = b1 ^ b2 ^ b4;
    let p2 = b1 ^ b3 ^ b4;
    let p3 = b2 ^ b3 ^ b4;
    p1 << 6 | p2 << 5 | b1 << 4 | p3 << 3 | b2 << 2 | b3 << 1 | b4
}

/// Check the parity bits of `frame`, flip the bit they point at (if
/// any) and return the data nibble together with the corrected
/// position.
pub fn correct_frame(frame: u8) -> (u8, Option<usize>) {
    let mut frame = frame;
    let mut syndrome = 0;
    if bit(frame, P1) != bit(frame, B1) ^ bit(frame, B2) ^ bit(frame, B4) {
        syndrome |= 1;
    }
    if bit(frame, P2) != bit(frame, B1) ^ bit(frame, B3) ^ bit(frame, B4) {
        syndrome |= 2;
    }
    if bit(frame, P3) != bit(frame, B2) ^ bit(frame, B3) ^ bit(frame, B4) {
        syndrome |= 4;
    }
    let corrected = if syndrome != 0 {
        let pos = syndrome - 1;
        frame ^= 1 << (FRAME_BITS - 1 - pos);
        Some(pos)
    } else {
        None
    };
    let nibble = bit(frame, B1) << 3 | bit(frame, B2) << 2 | bit(frame, B3) << 1 | bit(frame, B4);
    (nibble, corrected)
}

/// Encode all lines read from `input` and write the artifact to
/// `output`.  On success, the output is returned.
pub fn encode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);
    let mut bytes = 0;

    while let Some(line) = inp.next_raw()? {
        let mut outp = BitWriter::new(&mut output);
        for &byte in &line {
            outp.write_bits(encode_nibble(byte >> 4) as u64, FRAME_BITS)?;
            outp.write_bits(encode_nibble(byte & 0xf) as u64, FRAME_BITS)?;
        }
        outp.flush()?;
        output.write_all(b"\n")?;
        bytes += line.len();
    }
    debug!("hamming: encoded {} bytes in {} lines", bytes, inp.line_no());

    Ok(output)
}

/// Decode an artifact read from `input`, correcting single-bit errors,
/// and write the bytes to `output`.  On success, the output is
/// returned.
pub fn decode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);
    let mut corrections = 0;

    while let Some(mut line) = inp.next_line()? {
        if line.ends_with('\r') {
            line.pop();
        }
        if line.len() % BYTE_BITS != 0 {
            return Err(Error::InvalidFrameLength(line.len()));
        }
        let mut bits = BitReader::new(&line);
        let mut bytes = Vec::with_capacity(line.len() / BYTE_BITS);
        while !bits.is_empty() {
            let (high, fixed_high) = correct_frame(bits.read_bits(FRAME_BITS)? as u8);
            let (low, fixed_low) = correct_frame(bits.read_bits(FRAME_BITS)? as u8);
            for pos in fixed_high.iter().chain(fixed_low.iter()) {
                debug!("hamming: line {}, byte {}: corrected bit {}",
                       inp.line_no(), bytes.len(), pos + 1);
                corrections += 1;
            }
            bytes.push(high << 4 | low);
        }
        output.write_all(&bytes)?;
    }
    if corrections > 0 {
        info!("hamming: corrected {} bit errors", corrections);
    }

    Ok(output)
}
