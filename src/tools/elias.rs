//! Elias omega coding of unsigned integers.
//!
//! The code is a chain of components, each giving the bit length (minus one) of the
//! component after it.  Length components have their leading bit cleared, the final
//! data component keeps its leading 1, so the code delimits itself.
//!
//! Example, 17 is `0 00 000 10001`: lengths 2, 3 and 5 precede the data.
//! Zero is written as a lone `0`, which the format never needs, see `read`.

use bit_vec::BitVec;
use crate::tools::bits::{BitReader,push_uint,uint_bits};
use crate::Error;

/// Append the code for `n` to `bits`
pub fn encode_into(n: u64,bits: &mut BitVec) {
    if n == 0 {
        bits.push(false);
        return;
    }
    // components are collected data-first, then written in reverse
    let mut components: Vec<(u64,usize)> = vec![(n,uint_bits(n))];
    let mut val = (uint_bits(n) - 1) as u64;
    while val > 0 {
        let width = uint_bits(val);
        components.push((val & !(1 << (width - 1)),width));
        val = (width - 1) as u64;
    }
    for (code,width) in components.iter().rev() {
        push_uint(bits,*code,*width);
    }
}

/// Code for `n` as a fresh bit vector
pub fn encode(n: u64) -> BitVec {
    let mut ans = BitVec::new();
    encode_into(n,&mut ans);
    ans
}

/// Read one integer at the cursor, leaving the cursor just past it.
/// A `0` that is the very last bit available decodes as zero, anywhere else
/// it is the first length component of a larger number.
pub fn read(reader: &mut BitReader) -> Result<u64,Error> {
    if reader.remaining() == 1 && !reader.peek_bit()? {
        reader.get_bit()?;
        return Ok(0);
    }
    let mut length: usize = 1;
    while !reader.peek_bit()? {
        // the cleared leading bit stands for a 1
        reader.get_bit()?;
        let val = (1u64 << (length - 1)) | reader.get_code(length - 1)?;
        if val >= 64 {
            return Err(Error::Overflow);
        }
        length = val as usize + 1;
    }
    reader.get_code(length)
}

/// Decode the integer starting at bit `start`, returns the integer and the index
/// immediately after it.
pub fn decode(bits: &BitVec,start: usize) -> Result<(u64,usize),Error> {
    let mut reader = BitReader::at(bits,start);
    let n = read(&mut reader)?;
    Ok((n,reader.position()))
}

#[cfg(test)]
fn bit_string(bits: &BitVec) -> String {
    bits.iter().map(|b| if b { '1' } else { '0' }).collect()
}

#[test]
fn known_codes() {
    assert_eq!(bit_string(&encode(0)),"0");
    assert_eq!(bit_string(&encode(1)),"1");
    assert_eq!(bit_string(&encode(2)),"010");
    assert_eq!(bit_string(&encode(3)),"011");
    assert_eq!(bit_string(&encode(4)),"000100");
    assert_eq!(bit_string(&encode(7)),"000111");
    assert_eq!(bit_string(&encode(8)),"0011000");
    assert_eq!(bit_string(&encode(17)),"00000010001");
}

#[test]
fn invertibility() {
    for n in (0..100_000u64).chain([1<<32,(1<<40)+12345,u64::MAX-1,u64::MAX]) {
        let bits = encode(n);
        assert_eq!(decode(&bits,0).unwrap(),(n,bits.len()),"failed on {}",n);
    }
}

#[test]
fn consecutive_codes() {
    let vals = [5u64,1,300,2,1,70000,3];
    let mut bits = BitVec::new();
    bits.push(true); // junk ahead of the first code
    for v in vals {
        encode_into(v,&mut bits);
    }
    let mut reader = BitReader::at(&bits,1);
    for v in vals {
        assert_eq!(read(&mut reader).unwrap(),v);
    }
    assert_eq!(reader.remaining(),0);
}

#[test]
fn truncated_code() {
    let bits = encode(1000);
    let mut short = bits.clone();
    short.truncate(bits.len() - 1);
    assert!(matches!(decode(&short,0),Err(Error::UnexpectedEnd)));
    // a run of zeros announces ever longer components
    let zeros = BitVec::from_elem(200,false);
    assert!(decode(&zeros,0).is_err());
}
