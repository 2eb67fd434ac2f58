//! Longest match search for the LZSS stage.
//!
//! For an anchor position we want, for every position in the window behind it, the
//! length of the common prefix with the text starting at the anchor.  This is a Z-array
//! restricted to `[anchor-window, anchor+lookahead)`, computed in two passes:
//! first the ordinary Z-algorithm over the lookahead (the pattern), then a scan
//! of the window that keeps its own Z-box and reuses the pattern's values.
//! Matches may run from the window into the lookahead, which is what lets the
//! decoder reproduce runs with a copy whose offset is shorter than its length.

/// shortest match that is worth a copy token
pub const MIN_MATCH: usize = 3;

/// A match found in the window, `source` is the absolute index where it starts.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Match {
    pub length: usize,
    pub source: usize
}

impl Match {
    /// distance back from `pos` to the start of the match
    pub fn offset(&self,pos: usize) -> usize {
        pos - self.source
    }
}

/// Z-array over a bounded window around an anchor.
pub struct ZArray {
    start: usize,
    anchor: usize,
    z: Vec<usize>
}

impl ZArray {
    /// Compute the Z-array for `anchor` over `[anchor-window, anchor+lookahead)`,
    /// both ends clamped to the text.  No comparison reads at or beyond the upper bound.
    pub fn compute(text: &[u8],anchor: usize,window: usize,lookahead: usize) -> Self {
        let anchor = usize::min(anchor,text.len());
        let start = anchor.saturating_sub(window);
        let end = usize::min(text.len(),anchor.saturating_add(lookahead));
        let pat = &text[anchor..end];
        let m = pat.len();
        let mut z = vec![0;end - start];

        // pass 1: positions from the anchor onward, Z-box is [l,r) in pattern coordinates
        let zp = &mut z[anchor - start..];
        if m > 0 {
            zp[0] = m;
        }
        let (mut l,mut r) = (0,0);
        for k in 1..m {
            let mut len = 0;
            if k < r {
                len = usize::min(zp[k - l],r - k);
            }
            while k + len < m && pat[len] == pat[k + len] {
                len += 1;
            }
            if k + len > r {
                l = k;
                r = k + len;
            }
            zp[k] = len;
        }

        // pass 2: positions behind the anchor, Z-box is [l,r) in text coordinates
        // with text[l..r] equal to pat[0..r-l]
        let (mut l,mut r) = (start,start);
        for i in start..anchor {
            let mut len = 0;
            if i < r {
                len = usize::min(z[anchor - start + i - l],r - i);
            }
            while len < m && text[i + len] == pat[len] {
                len += 1;
            }
            if i + len > r {
                l = i;
                r = i + len;
            }
            z[i - start] = len;
        }
        Self {
            start,
            anchor,
            z
        }
    }
    /// Z value at absolute text index `i`, zero outside the computed range
    pub fn get(&self,i: usize) -> usize {
        match i.checked_sub(self.start) {
            Some(idx) => self.z.get(idx).copied().unwrap_or(0),
            None => 0
        }
    }
    /// the part of the array that lies behind the anchor
    pub fn lookbehind(&self) -> &[usize] {
        &self.z[0..self.anchor - self.start]
    }
    /// Longest value behind the anchor as `(length,source)`.
    /// On ties the right-most position wins, i.e., the smallest offset.
    pub fn longest(&self) -> (usize,usize) {
        let mut best = (0,self.start);
        for (idx,len) in self.lookbehind().iter().enumerate() {
            if *len >= best.0 {
                best = (*len,self.start + idx);
            }
        }
        best
    }
}

/// Find the longest prior substring within `window` that is a prefix of the upcoming
/// `lookahead` characters at `pos`.  Returns `None` if it is shorter than `MIN_MATCH`.
pub fn find_longest_match(text: &[u8],pos: usize,window: usize,lookahead: usize) -> Option<Match> {
    let (length,source) = ZArray::compute(text,pos,window,lookahead).longest();
    match length >= MIN_MATCH {
        true => Some(Match { length, source }),
        false => None
    }
}

#[cfg(test)]
fn naive_lcp(text: &[u8],i: usize,anchor: usize,end: usize) -> usize {
    let mut n = 0;
    while i + n < end && anchor + n < end && text[i + n] == text[anchor + n] {
        n += 1;
    }
    n
}

#[test]
fn agrees_with_naive() {
    let samples = [
        "abracadabra abracadabra",
        "aaaaaaaaaaaaaaaaaaaaaaaa",
        "abababababbababaabababab",
        "I am Sam. Sam I am. I do not like this Sam I am.\n"
    ];
    for txt in samples {
        let text = txt.as_bytes();
        for window in [0,1,3,7,16,40] {
            for lookahead in [0,1,2,5,9,31] {
                for anchor in 0..text.len() {
                    let za = ZArray::compute(text,anchor,window,lookahead);
                    let start = anchor.saturating_sub(window);
                    let end = usize::min(text.len(),anchor + lookahead);
                    for i in start..end {
                        let expected = match i == anchor {
                            true => end - anchor,
                            false => naive_lcp(text,i,anchor,end)
                        };
                        assert_eq!(za.get(i),expected,"{:?} anchor {} index {} w {} l {}",txt,anchor,i,window,lookahead);
                    }
                    assert_eq!(za.lookbehind().len(),anchor - start);
                }
            }
        }
    }
}

#[test]
fn run_overlaps_lookahead() {
    let text = "aaaa".as_bytes();
    assert_eq!(find_longest_match(text,0,4,4),None);
    let m = find_longest_match(text,1,4,4).unwrap();
    assert_eq!(m,Match { length: 3, source: 0 });
    assert_eq!(m.offset(1),1);
}

#[test]
fn right_most_wins() {
    // "abc" occurs at 0 and 4, the later one has the smaller offset
    let text = "abc.abc.abc".as_bytes();
    let m = find_longest_match(text,8,8,3).unwrap();
    assert_eq!(m,Match { length: 3, source: 4 });
    assert_eq!(m.offset(8),4);
}

#[test]
fn short_matches_rejected() {
    let text = "ab.ab.ab".as_bytes();
    assert_eq!(ZArray::compute(text,3,3,2).longest(),(2,0));
    assert_eq!(find_longest_match(text,3,3,2),None);
    assert_eq!(find_longest_match(text,3,3,5).unwrap(),Match { length: 5, source: 0 });
}

#[test]
fn window_limits_search() {
    let text = "xyzw....xyzw".as_bytes();
    assert_eq!(find_longest_match(text,8,8,4).unwrap().source,0);
    assert_eq!(find_longest_match(text,8,7,4),None);
    assert_eq!(find_longest_match(text,8,0,4),None);
}
