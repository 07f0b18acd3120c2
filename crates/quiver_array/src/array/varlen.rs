use crate::bitmap::Bitmap;

/// Array storing variable-length utf8 strings in a single contiguous
/// buffer with offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Utf8Array {
    validity: Option<Bitmap>,
    /// Byte offsets into `data`, length is `len + 1`.
    offsets: Vec<usize>,
    /// Contiguous string data.
    data: String,
}

impl Utf8Array {
    pub fn new_nulls(len: usize) -> Self {
        Utf8Array {
            validity: Some(Bitmap::new_with_val(false, len)),
            offsets: vec![0; len + 1],
            data: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, idx: usize) -> Option<&str> {
        if idx >= self.len() {
            return None;
        }
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        Some(&self.data[start..end])
    }

    pub fn is_valid(&self, idx: usize) -> Option<bool> {
        if idx >= self.len() {
            return None;
        }
        Some(super::is_valid(self.validity.as_ref(), idx))
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn values_iter(&self) -> Utf8ValuesIter<'_> {
        Utf8ValuesIter { idx: 0, arr: self }
    }
}

impl<'a> FromIterator<&'a str> for Utf8Array {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut offsets = vec![0];
        let mut data = String::new();
        for val in iter {
            data.push_str(val);
            offsets.push(data.len());
        }
        Utf8Array {
            validity: None,
            offsets,
            data,
        }
    }
}

impl<'a> FromIterator<Option<&'a str>> for Utf8Array {
    fn from_iter<T: IntoIterator<Item = Option<&'a str>>>(iter: T) -> Self {
        let mut validity = Bitmap::new();
        let mut offsets = vec![0];
        let mut data = String::new();
        for val in iter {
            match val {
                Some(val) => {
                    validity.push(true);
                    data.push_str(val);
                }
                None => validity.push(false),
            }
            offsets.push(data.len());
        }
        Utf8Array {
            validity: Some(validity),
            offsets,
            data,
        }
    }
}

#[derive(Debug)]
pub struct Utf8ValuesIter<'a> {
    idx: usize,
    arr: &'a Utf8Array,
}

impl<'a> Iterator for Utf8ValuesIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let val = self.arr.value(self.idx)?;
        self.idx += 1;
        Some(val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.arr.len() - self.idx;
        (rem, Some(rem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip() {
        let arr = Utf8Array::from_iter(["a", "bb", "ccc"]);
        assert_eq!(3, arr.len());
        assert_eq!(Some("bb"), arr.value(1));
        let collected: Vec<_> = arr.values_iter().collect();
        assert_eq!(vec!["a", "bb", "ccc"], collected);
    }

    #[test]
    fn nulls_have_empty_values() {
        let arr = Utf8Array::from_iter([Some("a"), None, Some("c")]);
        assert_eq!(Some(false), arr.is_valid(1));
        assert_eq!(Some(""), arr.value(1));
    }
}
