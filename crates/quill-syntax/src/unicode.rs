//! On-demand UTF-8 decoding.
//!
//! The parser works on bytes and only decodes a code point when it needs to
//! classify a character that is not ASCII (directive names may contain
//! non-ASCII letters). Decoding is strict: overlong forms, surrogates and
//! values above `U+10FFFF` are rejected.

/// Reason a byte sequence could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input was empty.
    #[error("no data to decode")]
    NoData,
    /// The lead byte announced more units than the input holds.
    #[error("UTF-8 sequence is missing code units")]
    MissingUnits,
    /// The bytes do not form a legal UTF-8 sequence.
    #[error("illegal bits in UTF-8 sequence")]
    IllegalBits,
}

/// Number of bytes in the sequence introduced by `lead`.
///
/// Returns 0 for continuation bytes and bytes that can never start a sequence.
#[must_use]
pub const fn sequence_length(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

const fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Decodes the code point at the start of `bytes`.
///
/// Returns the character and the number of bytes it occupies.
///
/// # Example
///
/// ```
/// use quill_syntax::unicode::{decode, DecodeError};
///
/// assert_eq!(decode("é!".as_bytes()), Ok(('é', 2)));
/// assert_eq!(decode(&[0xe2, 0x82]), Err(DecodeError::MissingUnits));
/// assert_eq!(decode(&[]), Err(DecodeError::NoData));
/// ```
pub fn decode(bytes: &[u8]) -> Result<(char, usize), DecodeError> {
    let &lead = bytes.first().ok_or(DecodeError::NoData)?;
    let length = sequence_length(lead);
    if length == 0 {
        return Err(DecodeError::IllegalBits);
    }
    if bytes.len() < length {
        return Err(DecodeError::MissingUnits);
    }
    let units = &bytes[..length];
    if !units[1..].iter().all(|&b| is_continuation(b)) {
        return Err(DecodeError::IllegalBits);
    }

    let code_point = match length {
        1 => u32::from(lead),
        2 => (u32::from(lead & 0x1f) << 6) | u32::from(units[1] & 0x3f),
        3 => {
            (u32::from(lead & 0x0f) << 12)
                | (u32::from(units[1] & 0x3f) << 6)
                | u32::from(units[2] & 0x3f)
        }
        _ => {
            (u32::from(lead & 0x07) << 18)
                | (u32::from(units[1] & 0x3f) << 12)
                | (u32::from(units[2] & 0x3f) << 6)
                | u32::from(units[3] & 0x3f)
        }
    };

    // Overlong encodings decode to a value that a shorter sequence could hold.
    let minimum = match length {
        1 => 0,
        2 => 0x80,
        3 => 0x800,
        _ => 0x1_0000,
    };
    if code_point < minimum {
        return Err(DecodeError::IllegalBits);
    }

    char::from_u32(code_point)
        .map(|c| (c, length))
        .ok_or(DecodeError::IllegalBits)
}

/// Returns `true` if `bytes` is entirely valid UTF-8.
#[must_use]
pub fn is_valid(bytes: &[u8]) -> bool {
    CodePoints::new(bytes).all(|r| r.is_ok())
}

/// Iterator over the code points of a byte slice.
///
/// Yields an error once and then stops when malformed input is found.
#[derive(Debug, Clone)]
pub struct CodePoints<'a> {
    bytes: &'a [u8],
    failed: bool,
}

impl<'a> CodePoints<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            failed: false,
        }
    }

    /// The bytes not yet consumed.
    #[must_use]
    pub fn remainder(&self) -> &'a [u8] {
        self.bytes
    }
}

impl Iterator for CodePoints<'_> {
    type Item = Result<char, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.bytes.is_empty() {
            return None;
        }
        match decode(self.bytes) {
            Ok((c, length)) => {
                self.bytes = &self.bytes[length..];
                Some(Ok(c))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
