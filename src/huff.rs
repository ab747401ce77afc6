// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Static Huffman coder over the characters of a text.
//!
//! The artifact starts with the code table, one `<symbol><code>` line
//! per symbol, followed by a `--` line and a single line holding the
//! concatenated codes of the whole text.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::io::{Read, Write};

use log::debug;

use crate::bitfile::{BitReader, BitWriter};
use crate::error::Error;
use crate::linefile::{self, Frequencies, LineReader, DELIMITER};

type Symbol = char;

#[derive(Debug)]
struct Node {
    weight: u64,
    entry: Entry,
}

#[derive(Debug)]
enum Entry {
    Leaf(Symbol),
    // Only the root of a single-symbol tree lacks a right child.
    Inner(usize, Option<usize>),
}

/// Huffman tree, stored as an arena of nodes.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

/// Mapping from symbols to their codes, spelled out as `'0'`/`'1'`.
#[derive(Debug, PartialEq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, String>,
}

impl Tree {
    /// Build the tree by repeatedly merging the two lightest nodes.
    /// Ties are broken by creation order, so the result is
    /// deterministic for a given table.
    pub fn build(freqs: &Frequencies) -> Tree {
        let mut nodes = Vec::with_capacity(freqs.len() * 2);
        let mut heap = BinaryHeap::new();
        for (&sym, &freq) in freqs {
            heap.push(Reverse((freq, nodes.len())));
            nodes.push(Node { weight: freq, entry: Entry::Leaf(sym) });
        }

        let mut root = None;
        while let Some(Reverse((w1, n1))) = heap.pop() {
            match heap.pop() {
                Some(Reverse((w2, n2))) => {
                    heap.push(Reverse((w1 + w2, nodes.len())));
                    nodes.push(Node { weight: w1 + w2, entry: Entry::Inner(n1, Some(n2)) });
                },
                None => {
                    let is_leaf = matches!(nodes[n1].entry, Entry::Leaf(_));
                    if is_leaf {
                        nodes.push(Node { weight: w1, entry: Entry::Inner(n1, None) });
                        root = Some(nodes.len() - 1);
                    } else {
                        root = Some(n1);
                    }
                },
            }
        }
        Tree { nodes, root }
    }

    /// Total weight of the tree, i.e. the number of symbols it codes.
    pub fn weight(&self) -> u64 {
        self.root.map_or(0, |r| self.nodes[r].weight)
    }

    /// Assign codes by walking the tree in pre-order: left edges append
    /// a `'0'`, right edges a `'1'`.
    pub fn codes(&self) -> CodeTable {
        let mut codes = BTreeMap::new();
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push((root, String::new()));
        }
        while let Some((idx, code)) = stack.pop() {
            match self.nodes[idx].entry {
                Entry::Leaf(sym) => {
                    codes.insert(sym, code);
                },
                Entry::Inner(left, right) => {
                    if let Some(right) = right {
                        stack.push((right, format!("{}1", code)));
                    }
                    stack.push((left, code + "0"));
                },
            }
        }
        CodeTable { codes }
    }
}

impl CodeTable {
    pub fn codes(&self) -> &BTreeMap<Symbol, String> {
        &self.codes
    }

    pub fn code(&self, sym: Symbol) -> Option<&str> {
        self.codes.get(&sym).map(|c| &c[..])
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check that no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        let mut sorted: Vec<&str> = self.codes.values().map(|c| &c[..]).collect();
        sorted.sort();
        // After sorting, a prefix sorts directly before some code it
        // prefixes.
        sorted.windows(2).all(|w| !w[1].starts_with(w[0]))
    }
}

/// Encode the text read from `input` and write the artifact to
/// `output`.  On success, the output is returned.
pub fn encode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let lines = linefile::read_lines(input)?;
    let freqs = linefile::frequencies(&lines);
    let tree = Tree::build(&freqs);
    let table = tree.codes();
    debug!("huffman: {} symbols, {} distinct", tree.weight(), table.len());

    for (&sym, code) in table.codes() {
        linefile::write_entry(&mut output, sym, code)?;
    }
    writeln!(output, "{}", DELIMITER)?;

    let mut outp = BitWriter::new(output);
    for sym in linefile::symbols(&lines) {
        // Every symbol of the text was counted, so it has a code.
        outp.write_code(&table.codes[&sym])?;
    }
    debug!("huffman: wrote {} code bits", outp.written());
    let mut output = outp.flush()?;
    writeln!(output)?;
    Ok(output)
}

/// Decode an artifact read from `input` and write the text to
/// `output`.  On success, the output is returned.
pub fn decode<R: Read, W: Write>(input: R, mut output: W) -> Result<W, Error> {
    let mut inp = LineReader::new(input);

    let mut codes = BTreeMap::new();
    let mut lookup = HashMap::new();
    for (sym, code) in inp.read_table()? {
        if code.is_empty() || !code.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::MalformedTable(format!("{}{}", sym, code)));
        }
        lookup.insert(code.clone(), sym);
        codes.insert(sym, code);
    }
    let table = CodeTable { codes };
    if !table.is_prefix_free() {
        return Err(Error::MalformedTable("codes are not prefix-free".to_string()));
    }
    debug!("huffman: read {} codes", table.len());

    let line = inp.next_line()?.unwrap_or_default();
    let mut bits = BitReader::new(&line);
    let mut code = String::new();
    let mut buf = [0u8; 4];
    while !bits.is_empty() {
        code.push(if bits.read_bit()? { '1' } else { '0' });
        if let Some(&sym) = lookup.get(&code) {
            output.write_all(sym.encode_utf8(&mut buf).as_bytes())?;
            code.clear();
        }
    }
    if !code.is_empty() {
        return Err(Error::UnmatchedCode(code));
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use ::std::io::Cursor;
    use super::{decode, encode, Tree};
    use crate::error::Error;
    use crate::linefile::{frequencies, read_lines};

    fn roundtrip(input: &[u8]) {
        let encoded = encode(Cursor::new(input), vec![]).unwrap();
        let decoded = decode(Cursor::new(&encoded[..]), vec![]).unwrap();
        assert_eq!(input, &decoded[..]);
    }

    #[test]
    fn encode_aab() {
        let encoded = encode(Cursor::new(&b"aab\n"[..]), vec![]).unwrap();
        assert_eq!(&b"\n10\na0\nb11\n--\n001110\n"[..], &encoded[..]);
    }

    #[test]
    fn decode_aab() {
        let decoded = decode(Cursor::new(&b"\n10\na0\nb11\n--\n001110\n"[..]), vec![]).unwrap();
        assert_eq!(&b"aab\n"[..], &decoded[..]);
    }

    #[test]
    fn encode_empty() {
        let encoded = encode(Cursor::new(&b""[..]), vec![]).unwrap();
        assert_eq!(&b"\n0\n--\n\n"[..], &encoded[..]);
        let decoded = decode(Cursor::new(&encoded[..]), vec![]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let encoded = encode(Cursor::new(&b"\n\n\n"[..]), vec![]).unwrap();
        assert_eq!(&b"\n0\n--\n000\n"[..], &encoded[..]);
        roundtrip(b"\n\n\n");
    }

    #[test]
    fn compress_decompress() {
        roundtrip(b"\n");
        roundtrip(b"x\n");
        roundtrip(b"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzz\n");
        roundtrip("Съешь же ещё этих мягких французских булок\n\tи выпей чаю.\n".as_bytes());
        roundtrip(b"--\n-\n\n0\n1\n01 10\n");
        roundtrip(include_bytes!("huff.rs"));
    }

    #[test]
    fn unterminated_last_line() {
        let encoded = encode(Cursor::new(&b"abc"[..]), vec![]).unwrap();
        let decoded = decode(Cursor::new(&encoded[..]), vec![]).unwrap();
        assert_eq!(&b"abc\n"[..], &decoded[..]);
    }

    #[test]
    fn prefix_free() {
        let lines = read_lines(Cursor::new(&include_bytes!("arith.rs")[..])).unwrap();
        let freqs = frequencies(&lines);
        let tree = Tree::build(&freqs);
        let table = tree.codes();
        assert_eq!(freqs.len(), table.len());
        assert!(table.is_prefix_free());
        assert_eq!(freqs.values().sum::<u64>(), tree.weight());
    }

    #[test]
    fn unmatched_code() {
        match decode(Cursor::new(&b"a0\nb10\n--\n01\n"[..]), vec![]) {
            Err(Error::UnmatchedCode(ref bits)) => assert_eq!("1", bits),
            other => panic!("expected unmatched code, got {:?}", other),
        }
    }

    #[test]
    fn ambiguous_table() {
        match decode(Cursor::new(&b"a0\nb01\n--\n0\n"[..]), vec![]) {
            Err(Error::MalformedTable(_)) => {},
            other => panic!("expected malformed table, got {:?}", other),
        }
    }

    #[test]
    fn missing_delimiter() {
        match decode(Cursor::new(&b"a0\nb1\n"[..]), vec![]) {
            Err(Error::UnexpectedEof) => {},
            other => panic!("expected eof, got {:?}", other),
        }
    }
}
