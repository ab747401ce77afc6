// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! Move-to-front coding over the sorted alphabet of one block.
//!
//! See https://en.wikipedia.org/wiki/Move-to-front_transform

use crate::error::Error;

/// Number of bits needed to write any index into an alphabet of
/// `len` symbols.  Never less than one.
pub fn code_width(len: usize) -> usize {
    let max_index = len.saturating_sub(1);
    ((usize::BITS - max_index.leading_zeros()) as usize).max(1)
}

/// Replace every symbol of `row` by its position in the recency list,
/// which starts out as `alphabet`.
pub fn encode(row: &[char], alphabet: &[char]) -> Result<Vec<usize>, Error> {
    let mut symbols = alphabet.to_vec();
    let mut output = Vec::with_capacity(row.len());

    for &sym in row {
        let index = symbols.iter().position(|&s| s == sym)
            .ok_or_else(|| Error::MalformedCode(format!("symbol {:?} is not in the alphabet", sym)))?;
        output.push(index);
        let value = symbols.remove(index);
        symbols.insert(0, value);
    }

    Ok(output)
}

/// Inverse of `encode`.
pub fn decode(indices: &[usize], alphabet: &[char]) -> Result<Vec<char>, Error> {
    let mut symbols = alphabet.to_vec();
    let mut output = Vec::with_capacity(indices.len());

    for &index in indices {
        if index >= symbols.len() {
            return Err(Error::IndexOutOfRange(index as u64));
        }
        let value = symbols.remove(index);
        output.push(value);
        symbols.insert(0, value);
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use super::{code_width, decode, encode};
    use crate::error::Error;

    #[test]
    fn widths() {
        assert_eq!(1, code_width(1));
        assert_eq!(1, code_width(2));
        assert_eq!(2, code_width(3));
        assert_eq!(2, code_width(4));
        assert_eq!(3, code_width(5));
        assert_eq!(7, code_width(100));
        assert_eq!(8, code_width(256));
    }

    #[test]
    fn banana() {
        let alphabet = ['a', 'b', 'n'];
        let row: Vec<char> = "nnbaaa".chars().collect();
        let encoded = encode(&row, &alphabet).unwrap();
        assert_eq!(vec![2, 0, 2, 2, 0, 0], encoded);
        assert_eq!(row, decode(&encoded, &alphabet).unwrap());
    }

    #[test]
    fn index_past_alphabet() {
        match decode(&[0, 3], &['a', 'b', 'c']) {
            Err(Error::IndexOutOfRange(3)) => {},
            other => panic!("expected index error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_symbol() {
        assert!(encode(&['x'], &['a']).is_err());
    }
}
