use core::marker::PhantomData;

use crate::options::Endian;
use crate::reflection::Value;
use crate::wire::{Scalar, ScalarKind};

/// A run of fixed-width scalars aliasing the backing buffer.
///
/// `dim` groups consecutive scalars, e.g. `dim == 3` for a vector of `[f32; 3]`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ScalarView<'a> {
    bytes: &'a [u8],
    kind: ScalarKind,
    dim: usize,
    endian: Endian,
}

impl<'a> ScalarView<'a> {
    /// `bytes.len()` must be a multiple of `kind.width() * dim`.
    pub(crate) fn new(bytes: &'a [u8], kind: ScalarKind, dim: usize, endian: Endian) -> Self {
        debug_assert!(dim > 0);
        debug_assert_eq!(bytes.len() % (kind.width() * dim), 0);
        ScalarView {
            bytes,
            kind,
            dim,
            endian,
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of scalars.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.width()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of `dim`-sized groups.
    pub fn groups(&self) -> usize {
        self.len() / self.dim
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn get(&self, index: usize) -> Option<Value<'a>> {
        if index >= self.len() {
            return None;
        }
        let width = self.kind.width();
        let bytes = &self.bytes[index * width..(index + 1) * width];
        Some(Value::from_scalar_bytes(self.kind, bytes, self.endian))
    }

    pub fn group(&self, index: usize) -> Option<ScalarView<'a>> {
        if index >= self.groups() {
            return None;
        }
        let stride = self.kind.width() * self.dim;
        Some(ScalarView {
            bytes: &self.bytes[index * stride..(index + 1) * stride],
            kind: self.kind,
            dim: self.dim,
            endian: self.endian,
        })
    }

    pub fn iter(&self) -> ScalarViewIter<'a> {
        ScalarViewIter {
            view: *self,
            index: 0,
        }
    }

    /// Reinterprets the view with its element type, if `T` matches `kind`.
    pub fn typed<T: Scalar>(&self) -> Option<TypedView<'a, T>> {
        if T::KIND != self.kind {
            return None;
        }
        Some(TypedView {
            bytes: self.bytes,
            endian: self.endian,
            _marker: PhantomData,
        })
    }
}

impl core::fmt::Debug for ScalarView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct ScalarViewIter<'a> {
    view: ScalarView<'a>,
    index: usize,
}

impl<'a> Iterator for ScalarViewIter<'a> {
    type Item = Value<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.view.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for ScalarViewIter<'a> {}

impl<'a> IntoIterator for &ScalarView<'a> {
    type Item = Value<'a>;
    type IntoIter = ScalarViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A [`ScalarView`] whose element type is known statically.
#[derive(Clone, Copy)]
pub struct TypedView<'a, T: Scalar> {
    bytes: &'a [u8],
    endian: Endian,
    _marker: PhantomData<T>,
}

impl<'a, T: Scalar> TypedView<'a, T> {
    pub fn len(&self) -> usize {
        self.bytes.len() / T::WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        Some(T::decode(&self.bytes[index * T::WIDTH..], self.endian))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + 'a {
        let endian = self.endian;
        self.bytes
            .chunks_exact(T::WIDTH)
            .map(move |chunk| T::decode(chunk, endian))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Scalar> core::fmt::Debug for TypedView<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
