// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Text codecs: static Huffman coding, decimal arithmetic coding,
//! blockwise Burrows-Wheeler transform with move-to-front coding and the
//! Hamming (7,4) error-correcting code.
//!
//! Every codec module exposes `encode` and `decode`, taking a reader and
//! a writer and returning the writer on success.

pub mod error;
pub mod bitfile;
pub mod linefile;

pub mod huff;
pub mod arith;
pub mod mtf;
pub mod bwt;
pub mod hamming;
