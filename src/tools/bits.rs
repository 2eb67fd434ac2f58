//! Bit level helpers on top of `bit_vec::BitVec`.
//! All multi-bit fields are written and read MSB first.

use bit_vec::BitVec;
use num_traits::PrimInt;
use crate::Error;

/// Number of bits in the minimal binary representation of `val`.
/// Zero is taken to need one bit.
pub fn uint_bits<T: PrimInt>(val: T) -> usize {
    let total = T::zero().count_zeros() as usize;
    usize::max(1, total - val.leading_zeros() as usize)
}

/// output the low `num_bits` of `code` starting from the MSB
pub fn push_uint<T: PrimInt>(bits: &mut BitVec,code: T,num_bits: usize) {
    for i in (0..num_bits).rev() {
        bits.push((code >> i) & T::one() == T::one());
    }
}

/// Cursor over a borrowed bit vector.  The underlying bits are never modified.
pub struct BitReader<'a> {
    bits: &'a BitVec,
    ptr: usize
}

impl <'a> BitReader<'a> {
    pub fn new(bits: &'a BitVec) -> Self {
        Self {
            bits,
            ptr: 0
        }
    }
    /// start reading at an arbitrary bit position
    pub fn at(bits: &'a BitVec,ptr: usize) -> Self {
        Self {
            bits,
            ptr
        }
    }
    pub fn position(&self) -> usize {
        self.ptr
    }
    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.ptr)
    }
    /// look at the bit under the cursor without advancing
    pub fn peek_bit(&self) -> Result<bool,Error> {
        self.bits.get(self.ptr).ok_or(Error::UnexpectedEnd)
    }
    /// get the next bit and advance the cursor
    pub fn get_bit(&mut self) -> Result<bool,Error> {
        let bit = self.peek_bit()?;
        self.ptr += 1;
        Ok(bit)
    }
    /// get the next `num_bits` as an unsigned integer, MSB first
    pub fn get_code(&mut self,num_bits: usize) -> Result<u64,Error> {
        if num_bits > 64 {
            return Err(Error::Overflow);
        }
        if num_bits > self.remaining() {
            return Err(Error::UnexpectedEnd);
        }
        let mut ans: u64 = 0;
        for _i in 0..num_bits {
            ans <<= 1;
            ans |= self.get_bit()? as u64;
        }
        Ok(ans)
    }
}

#[test]
fn widths() {
    assert_eq!(uint_bits(0u8),1);
    assert_eq!(uint_bits(1u32),1);
    assert_eq!(uint_bits(2u32),2);
    assert_eq!(uint_bits(127u8),7);
    assert_eq!(uint_bits(128u8),8);
    assert_eq!(uint_bits(u64::MAX),64);
}

#[test]
fn write_then_read() {
    let mut bits = BitVec::new();
    push_uint(&mut bits,b'a',7);
    push_uint(&mut bits,5u64,3);
    assert_eq!(bits.len(),10);
    // 1100001 101, padded with zeros
    assert_eq!(bits.to_bytes(),vec![0xc3,0x40]);
    let mut reader = BitReader::new(&bits);
    assert_eq!(reader.get_code(7).unwrap(),97);
    assert_eq!(reader.get_code(3).unwrap(),5);
    assert_eq!(reader.remaining(),0);
}

#[test]
fn reading_past_end() {
    let bits = BitVec::from_elem(3,true);
    let mut reader = BitReader::at(&bits,1);
    assert!(matches!(reader.get_code(3),Err(Error::UnexpectedEnd)));
    assert_eq!(reader.position(),1);
    assert!(matches!(reader.get_code(65),Err(Error::Overflow)));
    assert_eq!(reader.get_code(2).unwrap(),3);
    assert!(matches!(reader.get_bit(),Err(Error::UnexpectedEnd)));
}
