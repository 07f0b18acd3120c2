use std::fmt::Debug;

use crate::bitmap::Bitmap;

/// Array storing primitive fixed-width values.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArray<T> {
    /// Validity bitmap.
    ///
    /// "True" values indicate the value at that index is valid,
    /// "false" indicates null. `None` means all values are valid.
    validity: Option<Bitmap>,

    /// Underlying primitive values.
    values: Vec<T>,
}

pub type Int32Array = PrimitiveArray<i32>;
pub type Int64Array = PrimitiveArray<i64>;
pub type Float64Array = PrimitiveArray<f64>;

impl<T> PrimitiveArray<T> {
    pub fn new(values: Vec<T>, validity: Option<Bitmap>) -> Self {
        if let Some(validity) = &validity {
            assert_eq!(values.len(), validity.len());
        }
        PrimitiveArray { validity, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the value at the given index.
    ///
    /// This does not take validity into account.
    pub fn value(&self, idx: usize) -> Option<&T> {
        self.values.get(idx)
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

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Copy + Default> PrimitiveArray<T> {
    /// Create an all-null array of the given length.
    pub fn new_nulls(len: usize) -> Self {
        PrimitiveArray {
            validity: Some(Bitmap::new_with_val(false, len)),
            values: vec![T::default(); len],
        }
    }
}

impl<A> FromIterator<A> for PrimitiveArray<A> {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        PrimitiveArray {
            validity: None,
            values: iter.into_iter().collect(),
        }
    }
}

impl<A: Default> FromIterator<Option<A>> for PrimitiveArray<A> {
    fn from_iter<T: IntoIterator<Item = Option<A>>>(iter: T) -> Self {
        let mut validity = Bitmap::new();
        let mut values = Vec::new();

        for item in iter {
            match item {
                Some(value) => {
                    validity.push(true);
                    values.push(value);
                }
                None => {
                    validity.push(false);
                    values.push(A::default());
                }
            }
        }

        PrimitiveArray {
            validity: Some(validity),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_iter_with_nulls() {
        let arr = Int32Array::from_iter([Some(1), None, Some(3)]);
        assert_eq!(3, arr.len());
        assert_eq!(Some(true), arr.is_valid(0));
        assert_eq!(Some(false), arr.is_valid(1));
        assert_eq!(Some(&3), arr.value(2));
    }
}
