//! # lzomega
//!
//! Lossless compression of ASCII text using LZSS back references, with literals
//! Huffman coded and all integers (offsets, lengths, counts) Elias omega coded.
//! The coding is done in memory, see `lzss_omega` for the format.

pub mod tools;
pub mod lzss_omega;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("cannot compress empty input")]
    EmptyInput,
    #[error("byte {byte:#04x} at position {position} is not 7-bit ASCII")]
    NonAscii { position: usize, byte: u8 },
    #[error("bitstream ended unexpectedly")]
    UnexpectedEnd,
    #[error("integer code exceeds 64 bits")]
    Overflow,
    #[error("character table is not a valid prefix code")]
    BadCodeTable,
    #[error("copy reaches back {offset} with only {available} characters decoded")]
    BadOffset { offset: usize, available: usize },
    #[error("file too large")]
    FileTooLarge
}
