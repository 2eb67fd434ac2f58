//! Static Huffman coding of the literal characters.
//!
//! The encoder builds the code table from character frequencies, the decoder never
//! sees the frequencies, it rebuilds an equivalent tree from the codes that are
//! stored in the header.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use bit_vec::BitVec;
use crate::tools::bits::BitReader;
use crate::Error;

/// number of distinct 7-bit characters
pub const NUM_SYMBOLS: usize = 128;

/// Occurrence counts of the characters that appear in a text, in ascending
/// character order.  Only characters with a nonzero count are kept.
pub struct FreqTable {
    counts: Vec<(u8,usize)>
}

impl FreqTable {
    /// Count the characters of `text`, bytes outside 7-bit ASCII are not counted.
    pub fn from_text(text: &[u8]) -> Self {
        let mut all = [0usize;NUM_SYMBOLS];
        for c in text {
            if let Some(n) = all.get_mut(*c as usize) {
                *n += 1;
            }
        }
        Self {
            counts: all.iter().enumerate()
                .filter(|(_,n)| **n > 0)
                .map(|(c,n)| (c as u8,*n))
                .collect()
        }
    }
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &(u8,usize)> {
        self.counts.iter()
    }
}

/// Huffman code for each character, indexed by character value.
pub struct CodeTable {
    codes: Vec<Option<BitVec>>
}

impl CodeTable {
    /// Build the codes by repeatedly merging the two least frequent nodes.
    /// Ordering key is (frequency, number of characters in the node, creation order),
    /// so a leaf goes before a merged node of equal frequency, and the result is
    /// fully determined by the table.
    pub fn build(freq: &FreqTable) -> Self {
        let mut codes: Vec<Option<BitVec>> = vec![None;NUM_SYMBOLS];
        if freq.len() == 1 {
            for (c,_) in freq.iter() {
                codes[*c as usize] = Some(BitVec::from_elem(1,false));
            }
            return Self { codes };
        }
        // codes are grown at the front, keep them reversed until the end
        let mut reversed: Vec<BitVec> = vec![BitVec::new();NUM_SYMBOLS];
        let mut members: Vec<Vec<u8>> = Vec::new();
        let mut heap = BinaryHeap::new();
        for (c,n) in freq.iter() {
            heap.push(Reverse((*n,1usize,members.len())));
            members.push(vec![*c]);
        }
        while heap.len() > 1 {
            let (Some(Reverse((f0,n0,id0))),Some(Reverse((f1,n1,id1)))) = (heap.pop(),heap.pop()) else {
                break;
            };
            for c in &members[id0] {
                reversed[*c as usize].push(false);
            }
            for c in &members[id1] {
                reversed[*c as usize].push(true);
            }
            let merged = [members[id0].as_slice(),members[id1].as_slice()].concat();
            log::trace!("merge nodes {} and {} with frequency {}",id0,id1,f0+f1);
            heap.push(Reverse((f0+f1,n0+n1,members.len())));
            members.push(merged);
        }
        for (c,_) in freq.iter() {
            let rev = &reversed[*c as usize];
            codes[*c as usize] = Some(rev.iter().rev().collect());
        }
        Self { codes }
    }
    pub fn get(&self,c: u8) -> Option<&BitVec> {
        self.codes.get(c as usize).and_then(|x| x.as_ref())
    }
    /// characters that have codes, in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u8,&BitVec)> {
        self.codes.iter().enumerate()
            .filter_map(|(c,code)| code.as_ref().map(|bits| (c as u8,bits)))
    }
    pub fn len(&self) -> usize {
        self.iter().count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum Node {
    Internal { children: [Option<usize>;2] },
    Leaf { symbol: u8 }
}

/// Binary trie used to decode literals, nodes are kept in an arena with the root at 0.
pub struct DecodeTree {
    nodes: Vec<Node>
}

impl DecodeTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Internal { children: [None,None] }]
        }
    }
    /// Attach `symbol` at the end of the path spelled by `code`.
    /// Fails if the code is empty or is not prefix-free with respect to the codes already present.
    pub fn insert(&mut self,code: &BitVec,symbol: u8) -> Result<(),Error> {
        if code.is_empty() {
            return Err(Error::BadCodeTable);
        }
        let mut curs = 0;
        for (i,bit) in code.iter().enumerate() {
            let last = i + 1 == code.len();
            let next = self.nodes.len();
            let children = match &mut self.nodes[curs] {
                Node::Internal { children } => children,
                Node::Leaf { .. } => return Err(Error::BadCodeTable)
            };
            curs = match (children[bit as usize],last) {
                (Some(_),true) => return Err(Error::BadCodeTable),
                (Some(child),false) => child,
                (None,_) => {
                    children[bit as usize] = Some(next);
                    self.nodes.push(match last {
                        true => Node::Leaf { symbol },
                        false => Node::Internal { children: [None,None] }
                    });
                    next
                }
            };
        }
        Ok(())
    }
    /// Walk from the root one bit at a time until a leaf is reached.
    pub fn decode_symbol(&self,reader: &mut BitReader) -> Result<u8,Error> {
        let mut curs = 0;
        loop {
            match &self.nodes[curs] {
                Node::Leaf { symbol } => return Ok(*symbol),
                Node::Internal { children } => {
                    curs = children[reader.get_bit()? as usize].ok_or(Error::BadCodeTable)?;
                }
            }
        }
    }
}

impl Default for DecodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn is_prefix(short: &BitVec,long: &BitVec) -> bool {
    short.len() <= long.len() && short.iter().zip(long.iter()).all(|(a,b)| a==b)
}

#[test]
fn frequency_table() {
    let freq = FreqTable::from_text("abracadabra".as_bytes());
    let counts: Vec<(u8,usize)> = freq.iter().cloned().collect();
    assert_eq!(counts,vec![(b'a',5),(b'b',2),(b'c',1),(b'd',1),(b'r',2)]);
}

#[test]
fn frequency_table_ignores_high_bytes() {
    // 0xe1 would land on 'a' if wrapped
    let freq = FreqTable::from_text(&[b'a',0xe1,0x80,b'b',0xff]);
    let counts: Vec<(u8,usize)> = freq.iter().cloned().collect();
    assert_eq!(counts,vec![(b'a',1),(b'b',1)]);
    assert!(FreqTable::from_text(&[0x80,0x90]).is_empty());
}

#[test]
fn merge_order() {
    let freq = FreqTable::from_text("abracadabra".as_bytes());
    let table = CodeTable::build(&freq);
    let code = |c: u8| -> String {
        table.get(c).unwrap().iter().map(|b| if b { '1' } else { '0' }).collect()
    };
    // heap: a5 b2 c1 d1 r2
    // pop c1,d1 -> cd2 ; pop b2,r2 (leaves before cd2) -> br4 ; pop cd2,br4 -> cdbr6 ; pop a5,cdbr6
    assert_eq!(code(b'a'),"0");
    assert_eq!(code(b'c'),"100");
    assert_eq!(code(b'd'),"101");
    assert_eq!(code(b'b'),"110");
    assert_eq!(code(b'r'),"111");
    assert_eq!(table.len(),5);
    assert!(table.get(b'z').is_none());
}

#[test]
fn singleton_alphabet() {
    let table = CodeTable::build(&FreqTable::from_text("zzzzzz".as_bytes()));
    assert_eq!(table.len(),1);
    assert_eq!(table.get(b'z').unwrap(),&BitVec::from_elem(1,false));
}

#[test]
fn prefix_free() {
    let samples = [
        "I am Sam. Sam I am. I do not like this Sam I am.\n",
        "ab",
        "aaaaaaaabbbbccd",
        "The quick brown fox jumps over the lazy dog 0123456789 !?\t\n"
    ];
    for txt in samples {
        let table = CodeTable::build(&FreqTable::from_text(txt.as_bytes()));
        let codes: Vec<(u8,&BitVec)> = table.iter().collect();
        for (c1,code1) in &codes {
            for (c2,code2) in &codes {
                if c1 != c2 {
                    assert!(!is_prefix(code1,code2),"{} is a prefix of {}",c1,c2);
                }
            }
        }
    }
}

#[test]
fn tree_decodes_table() {
    let txt = "I am Sam. Sam I am.";
    let table = CodeTable::build(&FreqTable::from_text(txt.as_bytes()));
    let mut tree = DecodeTree::new();
    let mut stream = BitVec::new();
    for (c,code) in table.iter() {
        tree.insert(code,c).expect("insert failed");
    }
    for c in txt.bytes() {
        stream.extend(table.get(c).unwrap().iter());
    }
    let mut reader = BitReader::new(&stream);
    for c in txt.bytes() {
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(),c);
    }
    assert_eq!(reader.remaining(),0);
}

#[test]
fn tree_rejects_collisions() {
    let mut tree = DecodeTree::new();
    tree.insert(&BitVec::from_elem(2,false),b'a').unwrap();
    assert!(matches!(tree.insert(&BitVec::from_elem(1,false),b'b'),Err(Error::BadCodeTable)));
    assert!(matches!(tree.insert(&BitVec::from_elem(3,false),b'c'),Err(Error::BadCodeTable)));
    assert!(matches!(tree.insert(&BitVec::new(),b'd'),Err(Error::BadCodeTable)));
    // path 1 was never populated
    let bits = BitVec::from_elem(1,true);
    assert!(matches!(tree.decode_symbol(&mut BitReader::new(&bits)),Err(Error::BadCodeTable)));
}
