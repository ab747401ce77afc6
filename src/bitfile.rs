//! Routines for bitwise input/output.
//!
//! All artifacts of this crate spell their bits out as the ASCII
//! characters `'0'` and `'1'`, so a bit file is just text.

use std::io::Write;
use std::io;

use crate::error::Error;

const BUF_SIZE: usize = 4096;

pub struct BitWriter<W> {
    inner: W,
    buf: Vec<u8>,
    written: usize,
}

impl<W: Write> BitWriter<W> {
    /// Create a bit writer from a `Write` instance.
    pub fn new(inner: W) -> BitWriter<W> {
        BitWriter {
            inner,
            buf: Vec::with_capacity(BUF_SIZE),
            written: 0,
        }
    }

    /// Write a bit to the underlying `Write` instance.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.buf.push(if bit { b'1' } else { b'0' });
        self.written += 1;
        if self.buf.len() >= BUF_SIZE {
            self.inner.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Write the `count` least significant bits from `value`, most
    /// significant first.  Note that the maximum number of bits to
    /// write in one call is 64.
    pub fn write_bits(&mut self, value: u64, mut count: usize) -> io::Result<()> {
        while count > 0 {
            self.write_bit((value >> (count - 1)) & 1 != 0)?;
            count -= 1;
        }
        Ok(())
    }

    /// Write a code that is already spelled out as `'0'`/`'1'`.
    pub fn write_code(&mut self, code: &str) -> io::Result<()> {
        for c in code.bytes() {
            self.write_bit(c == b'1')?;
        }
        Ok(())
    }

    /// Number of bits written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush any unwritten bits to the underlying `Write` instance
    /// and return it.
    pub fn flush(mut self) -> io::Result<W> {
        if !self.buf.is_empty() {
            self.inner.write_all(&self.buf)?;
        }
        Ok(self.inner)
    }
}

/// Reads bits from a string of `'0'`/`'1'` characters.
pub struct BitReader<'a> {
    bits: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a str) -> BitReader<'a> {
        BitReader {
            bits: bits.as_bytes(),
            pos: 0,
        }
    }

    /// Read the next bit.
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        match self.bits.get(self.pos) {
            Some(&b'0') => {
                self.pos += 1;
                Ok(false)
            },
            Some(&b'1') => {
                self.pos += 1;
                Ok(true)
            },
            Some(&c) => Err(Error::MalformedCode(format!("unexpected character {:?} at bit {}",
                                                         c as char, self.pos))),
            None => Err(Error::UnexpectedEof),
        }
    }

    /// Read the next `count` bits, as the least significant bits of
    /// the returned 64-bit value.
    pub fn read_bits(&mut self, mut count: usize) -> Result<u64, Error> {
        let mut result = 0;
        while count > 0 {
            result <<= 1;
            if self.read_bit()? {
                result |= 1;
            }
            count -= 1;
        }
        Ok(result)
    }

    /// Number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
