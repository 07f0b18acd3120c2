use crate::bitmap::Bitmap;

/// Array storing boolean values as a bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanArray {
    validity: Option<Bitmap>,
    values: Bitmap,
}

impl BooleanArray {
    pub fn new(values: Bitmap, validity: Option<Bitmap>) -> Self {
        if let Some(validity) = &validity {
            assert_eq!(values.len(), validity.len());
        }
        BooleanArray { validity, values }
    }

    pub fn new_nulls(len: usize) -> Self {
        BooleanArray {
            validity: Some(Bitmap::new_with_val(false, len)),
            values: Bitmap::new_with_val(false, len),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, idx: usize) -> Option<bool> {
        if idx >= self.len() {
            return None;
        }
        Some(self.values.value(idx))
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

    pub fn values(&self) -> &Bitmap {
        &self.values
    }

    /// Number of "true" values, counting nulls as false.
    pub fn true_count(&self) -> usize {
        match &self.validity {
            Some(validity) => self
                .values
                .iter()
                .zip(validity.iter())
                .filter(|(v, valid)| *v && *valid)
                .count(),
            None => self.values.count_trues(),
        }
    }
}

impl FromIterator<bool> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        BooleanArray {
            validity: None,
            values: Bitmap::from_iter(iter),
        }
    }
}

impl FromIterator<Option<bool>> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = Option<bool>>>(iter: T) -> Self {
        let mut validity = Bitmap::new();
        let mut values = Bitmap::new();

        for item in iter {
            match item {
                Some(value) => {
                    validity.push(true);
                    values.push(value);
                }
                None => {
                    validity.push(false);
                    values.push(false);
                }
            }
        }

        BooleanArray {
            validity: Some(validity),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_count_ignores_nulls() {
        let arr = BooleanArray::from_iter([Some(true), None, Some(true), Some(false)]);
        assert_eq!(2, arr.true_count());
    }
}
