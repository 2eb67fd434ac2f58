//! Building blocks shared by the LZSS codec.

pub mod bits;
pub mod elias;
pub mod huffman;
pub mod z_match;
