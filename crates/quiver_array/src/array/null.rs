/// Array where every value is null.
#[derive(Debug, Clone, PartialEq)]
pub struct NullArray {
    len: usize,
}

impl NullArray {
    pub fn new(len: usize) -> Self {
        NullArray { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
