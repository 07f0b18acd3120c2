use std::fmt;

/// An LSB-ordered bitmap.
///
/// Used for both validity masks and filter selections. Bits past `len`
/// are always zero.
#[derive(Clone, Default)]
pub struct Bitmap {
    len: usize,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn new() -> Self {
        Bitmap::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Bitmap {
            len: 0,
            data: Vec::with_capacity(bits.div_ceil(8)),
        }
    }

    /// Create a bitmap of the given length with every bit set to `val`.
    pub fn new_with_val(val: bool, len: usize) -> Self {
        let fill = if val { 0xFF } else { 0x00 };
        let mut data = vec![fill; len.div_ceil(8)];
        if val {
            // Keep trailing bits zeroed.
            if let Some(last) = data.last_mut() {
                let rem = len % 8;
                if rem != 0 {
                    *last = (1u8 << rem) - 1;
                }
            }
        }
        Bitmap { len, data }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, val: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        if val {
            self.data[self.len / 8] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Get the bit at `idx`.
    ///
    /// Panics if `idx` is out of bounds.
    pub fn value(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bit index out of bounds");
        (self.data[idx / 8] >> (idx % 8)) & 1 != 0
    }

    pub fn set(&mut self, idx: usize, val: bool) {
        assert!(idx < self.len, "bit index out of bounds");
        if val {
            self.data[idx / 8] |= 1 << (idx % 8);
        } else {
            self.data[idx / 8] &= !(1 << (idx % 8));
        }
    }

    /// Number of set bits.
    pub fn count_trues(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            idx: 0,
            bitmap: self,
        }
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.data == other.data
    }
}

impl Eq for Bitmap {}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut bm = Bitmap::with_capacity(iter.size_hint().0);
        for val in iter {
            bm.push(val);
        }
        bm
    }
}

#[derive(Debug)]
pub struct BitmapIter<'a> {
    idx: usize,
    bitmap: &'a Bitmap,
}

impl Iterator for BitmapIter<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.bitmap.len() {
            return None;
        }
        let val = self.bitmap.value(self.idx);
        self.idx += 1;
        Some(val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.bitmap.len() - self.idx;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for BitmapIter<'_> {}
