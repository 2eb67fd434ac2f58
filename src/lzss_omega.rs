//! LZSS Compression with Huffman Literals and Elias Omega Integers
//!
//! The input must be 7-bit ASCII text, and is coded as a whole in memory.
//! The output is a bit stream, MSB first, padded with zeros to a byte boundary:
//!
//! ```text
//! <E(number of distinct characters)>
//! for each distinct character, ascending: <7 bit character> <E(code length)> <Huffman code>
//! <E(number of tokens)>
//! for each token: 0 <E(offset)> <E(length)>  (copy)
//!             or: 1 <Huffman code>           (literal)
//! ```
//!
//! Here `E` is the Elias omega code.  There is no length field for the text itself,
//! the decoder stops after the announced number of tokens, so the padding is ignored.

use bit_vec::BitVec;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::io::{Cursor,Read,Write,Seek,SeekFrom};
use crate::tools::bits::{BitReader,push_uint};
use crate::tools::elias;
use crate::tools::huffman::{CodeTable,DecodeTree,FreqTable,NUM_SYMBOLS};
use crate::tools::z_match::find_longest_match;
use crate::{DYNERR,Error};

/// bits used to store a character in the header
const CHAR_BITS: usize = 7;

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// how far back a copy may reach
    pub window: usize,
    /// longest possible copy
    pub lookahead: usize,
    /// return error if file is larger, also bounds the expanded size
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    window: 1024,
    lookahead: 64,
    max_file_size: 1 << 24
};

/// Leading bit of each token
#[derive(FromPrimitive)]
enum TokenTag {
    Copy = 0,
    Literal = 1
}

/// Element of the LZSS token stream
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Token {
    /// copy `length` characters starting `offset` characters back, may overlap the output
    Copy { offset: usize, length: usize },
    Literal(u8)
}

fn to_usize(n: u64) -> Result<usize,Error> {
    usize::try_from(n).map_err(|_| Error::Overflow)
}

/// Split `text` into copies and literals, scanning left to right and always
/// taking the longest match available at the current position.
pub fn tokenize(text: &[u8],window: usize,lookahead: usize) -> Vec<Token> {
    let mut ans = Vec::new();
    let mut i = 0;
    while i < text.len() {
        match find_longest_match(text,i,window,lookahead) {
            Some(m) => {
                ans.push(Token::Copy { offset: m.offset(i), length: m.length });
                i += m.length;
            },
            None => {
                ans.push(Token::Literal(text[i]));
                i += 1;
            }
        }
    }
    ans
}

/// Compress `text` into an unpadded bit vector.
pub fn compress_bits(text: &[u8],opt: &Options) -> Result<BitVec,Error> {
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }
    if let Some(position) = text.iter().position(|c| *c as usize >= NUM_SYMBOLS) {
        return Err(Error::NonAscii { position, byte: text[position] });
    }
    let freq = FreqTable::from_text(text);
    let codes = CodeTable::build(&freq);
    let mut ans = BitVec::new();
    elias::encode_into(codes.len() as u64,&mut ans);
    for (c,code) in codes.iter() {
        push_uint(&mut ans,c,CHAR_BITS);
        elias::encode_into(code.len() as u64,&mut ans);
        ans.extend(code.iter());
    }
    log::debug!("header has {} characters in {} bits",codes.len(),ans.len());

    let tokens = tokenize(text,opt.window,opt.lookahead);
    log::debug!("{} characters coded as {} tokens",text.len(),tokens.len());
    elias::encode_into(tokens.len() as u64,&mut ans);
    for tok in &tokens {
        put_token(tok,&codes,&mut ans)?;
    }
    log::debug!("compressed to {} bits",ans.len());
    Ok(ans)
}

/// Append one token, a literal without a code is an error
fn put_token(tok: &Token,codes: &CodeTable,bits: &mut BitVec) -> Result<(),Error> {
    log::trace!("{:?}",tok);
    match tok {
        Token::Copy { offset, length } => {
            push_uint(bits,TokenTag::Copy as u8,1);
            elias::encode_into(*offset as u64,bits);
            elias::encode_into(*length as u64,bits);
        },
        Token::Literal(c) => {
            let code = codes.get(*c).ok_or(Error::BadCodeTable)?;
            push_uint(bits,TokenTag::Literal as u8,1);
            bits.extend(code.iter());
        }
    }
    Ok(())
}

/// Rebuild the literal decoding tree from the header
fn read_header(reader: &mut BitReader) -> Result<DecodeTree,Error> {
    let count = to_usize(elias::read(reader)?)?;
    if count == 0 || count > NUM_SYMBOLS {
        log::error!("header announces {} characters",count);
        return Err(Error::BadCodeTable);
    }
    let mut tree = DecodeTree::new();
    for _i in 0..count {
        let c = reader.get_code(CHAR_BITS)? as u8;
        let code_len = to_usize(elias::read(reader)?)?;
        if code_len == 0 || code_len >= NUM_SYMBOLS {
            log::error!("character {} has code length {}",c,code_len);
            return Err(Error::BadCodeTable);
        }
        let mut code = BitVec::with_capacity(code_len);
        for _j in 0..code_len {
            code.push(reader.get_bit()?);
        }
        tree.insert(&code,c)?;
    }
    Ok(tree)
}

/// Parse the header and token stream, the padding is never read.
pub fn decode_tokens(bits: &BitVec) -> Result<Vec<Token>,Error> {
    let mut reader = BitReader::new(bits);
    let tree = read_header(&mut reader)?;
    let count = elias::read(&mut reader)?;
    log::debug!("header ends at bit {}, expecting {} tokens",reader.position(),count);
    let mut ans = Vec::new();
    for _i in 0..count {
        let tok = match TokenTag::from_u64(reader.get_code(1)?) {
            Some(TokenTag::Copy) => {
                let offset = to_usize(elias::read(&mut reader)?)?;
                let length = to_usize(elias::read(&mut reader)?)?;
                Token::Copy { offset, length }
            },
            Some(TokenTag::Literal) => Token::Literal(tree.decode_symbol(&mut reader)?),
            None => return Err(Error::UnexpectedEnd)
        };
        log::trace!("{:?}",tok);
        ans.push(tok);
    }
    Ok(ans)
}

/// Play back the tokens, copies read from the output as it grows.
/// Fails if the output would exceed `limit` characters.
pub fn replay(tokens: &[Token],limit: usize) -> Result<Vec<u8>,Error> {
    let mut ans: Vec<u8> = Vec::new();
    for tok in tokens {
        match *tok {
            Token::Literal(c) => {
                if ans.len() >= limit {
                    return Err(Error::FileTooLarge);
                }
                ans.push(c);
            },
            Token::Copy { offset, length } => {
                if offset == 0 || offset > ans.len() {
                    log::error!("bad copy at output position {}",ans.len());
                    return Err(Error::BadOffset { offset, available: ans.len() });
                }
                if length > limit - usize::min(limit,ans.len()) {
                    return Err(Error::FileTooLarge);
                }
                // one at a time, the source can run into what is being written
                for _k in 0..length {
                    let c = ans[ans.len() - offset];
                    ans.push(c);
                }
            }
        }
    }
    Ok(ans)
}

fn size_limit(opt: &Options) -> usize {
    usize::try_from(opt.max_file_size).unwrap_or(usize::MAX)
}

/// Decompress a bit vector produced by `compress_bits`, trailing bits are ignored.
/// Output longer than `opt.max_file_size` is an error.
pub fn decompress_bits(bits: &BitVec,opt: &Options) -> Result<Vec<u8>,Error> {
    replay(&decode_tokens(bits)?,size_limit(opt))
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with the `Write` trait.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write {
    let expanded_length = expanded_in.seek(SeekFrom::End(0))?;
    if expanded_length > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    expanded_in.seek(SeekFrom::Start(0))?;
    let mut text = Vec::new();
    expanded_in.read_to_end(&mut text)?;
    let compressed = compress_bits(&text,opt)?.to_bytes();
    compressed_out.write_all(&compressed)?;
    compressed_out.flush()?;
    Ok((expanded_length,compressed.len() as u64))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with the `Write` trait.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write {
    let compressed_length = compressed_in.seek(SeekFrom::End(0))?;
    if compressed_length > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    compressed_in.seek(SeekFrom::Start(0))?;
    let mut dat = Vec::new();
    compressed_in.read_to_end(&mut dat)?;
    let expanded = decompress_bits(&BitVec::from_bytes(&dat),opt)?;
    expanded_out.write_all(&expanded)?;
    expanded_out.flush()?;
    Ok((compressed_length,expanded.len() as u64))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    compress(&mut src,&mut ans,opt)?;
    Ok(ans)
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    expand(&mut src,&mut ans,opt)?;
    Ok(ans)
}

// *************** TESTS *****************

#[cfg(test)]
const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

#[cfg(test)]
fn opts(window: usize,lookahead: usize) -> Options {
    let mut opt = STD_OPTIONS;
    opt.window = window;
    opt.lookahead = lookahead;
    opt
}

#[test]
fn compression_works() {
    // 1 1100001 1 0 | 010 | 1 0 | 0 1 011
    let compressed = compress_slice("aaaa".as_bytes(),&opts(4,4)).expect("compression failed");
    assert_eq!(compressed,hex::decode("E194B0").unwrap());
    let bits = BitVec::from_bytes(&compressed);
    assert_eq!(decode_tokens(&bits).unwrap(),vec![
        Token::Literal(b'a'),
        Token::Copy { offset: 1, length: 3 }
    ]);
}

#[test]
fn invertibility() {
    let compressed = compress_slice(SAM.as_bytes(),&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(SAM.as_bytes().to_vec(),expanded);
}

#[test]
fn invertibility_all_windows() {
    let samples = [
        "a",
        "ab",
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "abababababababababababababababbbbbbbbbaaaaaab",
        SAM,
        "\t\n !~\x00\x7f mixed \x00\x00\x00\x7f\x7f\x7f mixed"
    ];
    for txt in samples {
        for window in 0..31 {
            for lookahead in 0..31 {
                let bits = compress_bits(txt.as_bytes(),&opts(window,lookahead)).expect("compression failed");
                let expanded = decompress_bits(&bits,&STD_OPTIONS).expect("expansion failed");
                assert_eq!(txt.as_bytes().to_vec(),expanded,"window {} lookahead {}",window,lookahead);
            }
        }
    }
}

#[test]
fn singleton_alphabet() {
    let txt = "qqqqqqqqqqqqqqqqqqqqqqqq";
    let bits = compress_bits(txt.as_bytes(),&opts(8,8)).expect("compression failed");
    let mut reader = BitReader::new(&bits);
    assert_eq!(elias::read(&mut reader).unwrap(),1);
    assert_eq!(reader.get_code(CHAR_BITS).unwrap(),b'q' as u64);
    assert_eq!(elias::read(&mut reader).unwrap(),1);
    assert!(!reader.get_bit().unwrap());
    assert_eq!(decompress_bits(&bits,&STD_OPTIONS).unwrap(),txt.as_bytes().to_vec());
}

#[test]
fn minimum_match() {
    let txt = "ab ab ab abc abc abcd abcd xyxyxyxy".as_bytes();
    for window in [2,5,20] {
        for lookahead in [2,3,4,16] {
            for tok in tokenize(txt,window,lookahead) {
                if let Token::Copy { offset, length } = tok {
                    assert!(length >= 3);
                    assert!(length <= lookahead);
                    assert!(offset >= 1 && offset <= window);
                }
            }
        }
    }
    // lookahead too short for any copy
    assert!(tokenize(txt,20,2).iter().all(|t| matches!(t,Token::Literal(_))));
}

#[test]
fn deterministic() {
    let a = compress_slice(SAM.as_bytes(),&opts(16,8)).expect("compression failed");
    let b = compress_slice(SAM.as_bytes(),&opts(16,8)).expect("compression failed");
    assert_eq!(a,b);
}

#[test]
fn bad_input() {
    assert!(matches!(compress_bits(&[],&STD_OPTIONS),Err(Error::EmptyInput)));
    assert!(compress_slice(&[],&STD_OPTIONS).is_err());
    assert!(matches!(compress_bits("abc\u{e9}".as_bytes(),&STD_OPTIONS),Err(Error::NonAscii { position: 3, byte: 0xc3 })));
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 4;
    assert!(compress_slice(SAM.as_bytes(),&opt).is_err());
}

#[test]
fn bad_bitstream() {
    // last token loses its final bit
    let mut bits = compress_bits(SAM.as_bytes(),&STD_OPTIONS).expect("compression failed");
    bits.truncate(bits.len() - 1);
    assert!(matches!(decompress_bits(&bits,&STD_OPTIONS),Err(Error::UnexpectedEnd)));
    // nothing at all
    assert!(matches!(decompress_bits(&BitVec::new(),&STD_OPTIONS),Err(Error::UnexpectedEnd)));
    // copy before anything was decoded
    assert!(matches!(replay(&[Token::Copy { offset: 1, length: 3 }],usize::MAX),Err(Error::BadOffset { offset: 1, available: 0 })));
    assert!(matches!(replay(&[Token::Literal(b'x'),Token::Copy { offset: 0, length: 3 }],usize::MAX),Err(Error::BadOffset { .. })));
    // expansion limit
    assert!(matches!(replay(&[Token::Literal(b'x'),Token::Copy { offset: 1, length: 30 }],10),Err(Error::FileTooLarge)));
}

#[test]
fn self_referential_copy() {
    let tokens = [Token::Literal(b'a'),Token::Literal(b'b'),Token::Copy { offset: 2, length: 7 }];
    assert_eq!(replay(&tokens,usize::MAX).unwrap(),"ababababa".as_bytes().to_vec());
}

#[cfg(test)]
fn single_a_stream(copy_length: u64) -> BitVec {
    // header with 'a' coded as 0, then a literal 'a' and one copy
    let mut bits = BitVec::new();
    elias::encode_into(1,&mut bits);
    push_uint(&mut bits,b'a',CHAR_BITS);
    elias::encode_into(1,&mut bits);
    bits.push(false);
    elias::encode_into(2,&mut bits);
    bits.push(true);
    bits.push(false);
    bits.push(false);
    elias::encode_into(1,&mut bits);
    elias::encode_into(copy_length,&mut bits);
    bits
}

#[test]
fn expansion_is_bounded() {
    let bits = single_a_stream(1 << 20);
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 1000;
    assert!(matches!(decompress_bits(&bits,&opt),Err(Error::FileTooLarge)));
    assert!(expand_slice(&bits.to_bytes(),&opt).is_err());
    assert!(matches!(decompress_bits(&single_a_stream(1 << 60),&STD_OPTIONS),Err(Error::FileTooLarge)));
    assert_eq!(decompress_bits(&single_a_stream(999),&opt).unwrap(),vec![b'a';1000]);
}

#[test]
fn literal_without_code() {
    let codes = CodeTable::build(&FreqTable::from_text("ab".as_bytes()));
    let mut bits = BitVec::new();
    assert!(matches!(put_token(&Token::Literal(b'z'),&codes,&mut bits),Err(Error::BadCodeTable)));
    assert!(bits.is_empty());
    put_token(&Token::Literal(b'b'),&codes,&mut bits).expect("literal failed");
    assert_eq!(bits.len(),2);
}
