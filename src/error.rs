use crate::core::base64::DecodeError;
use std::io;
use thiserror::Error;

/// The error type for consent string decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TcfDecodeError {
    /// The input string is empty.
    #[error("consent string is too short")]
    TooShort,
    /// The leading character designates neither a v1.1 (`B`) nor a v2.0 (`C`) string.
    #[error("unsupported version (leading character {found:?})")]
    UnsupportedVersion { found: char },
    /// A segment is not valid URL-safe Base64.
    #[error("unable to decode segment")]
    DecodeSegment(#[from] DecodeError),
    /// The bit stream ran out before a field could be fully read.
    ///
    /// This usually occurs if the input string is truncated.
    #[error("unexpected end of bit stream (needed {needed} bits, {remaining} remaining)")]
    UnexpectedEof { needed: u32, remaining: u64 },
    /// A read was requested with a bit count the target type cannot hold.
    #[error("invalid bit count {bits}")]
    InvalidBitCount { bits: u32 },
    /// A letter code outside of `A..=Z`, only reported in strict mode.
    #[error("invalid letter code {code}")]
    InvalidCharacter { code: u8 },
    /// The underlying bit reader failed.
    ///
    /// Bit counts are checked before every read, so this is not expected in practice.
    #[error("unable to read bit stream: {source}")]
    Read {
        #[from]
        source: io::Error,
    },
}
