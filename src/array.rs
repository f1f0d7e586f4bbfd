// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use num_traits::Zero;

use crate::buffer::Buffer;
use crate::class::ArrayType;
use crate::dimension::{self, strides_for_order, Ix, Ixs, IntoShape, Order};
use crate::dtype::{DType, Element};
use crate::error::{Error, ErrorKind};
use crate::indexes::Indices;
use crate::value::Value;

/// An n-dimensional array header over a shared [`Buffer`].
///
/// The header holds shape, byte strides, the element type, the array's
/// [`ArrayType`] and a map of auxiliary attributes that subclasses may use.
/// Cloning copies only the header; every header created from an existing
/// array borrows that array's buffer and keeps it alive.
///
/// Element reads are bounds checked against the buffer, so a header built
/// from inconsistent strides (see [`as_strided`](crate::as_strided)) can
/// return `None` but never reads outside the buffer.
#[derive(Clone)]
pub struct ArrayView
{
    data: Arc<Buffer>,
    /// Byte offset of the first element in `data`.
    offset: isize,
    shape: Vec<Ix>,
    strides: Vec<Ixs>,
    dtype: DType,
    class: Arc<ArrayType>,
    attrs: BTreeMap<String, Value>,
    owns_data: bool,
}

impl ArrayView
{
    /// Create an array with the given shape from a vector laid out in row
    /// major order.
    ///
    /// **Errors** if the vector length does not match the shape.
    pub fn from_shape_vec<A, Sh>(shape: Sh, v: Vec<A>) -> Result<Self, Error>
    where
        A: Element,
        Sh: IntoShape,
    {
        Self::from_shape_vec_with_order(shape, Order::C, v)
    }

    /// Create an array with the given shape from a vector laid out in memory
    /// `order`.
    ///
    /// **Errors** if the vector length does not match the shape.
    pub fn from_shape_vec_with_order<A, Sh>(shape: Sh, order: Order, v: Vec<A>) -> Result<Self, Error>
    where
        A: Element,
        Sh: IntoShape,
    {
        let shape = shape.into_shape();
        if dimension::size_of_shape_checked(&shape) != Some(v.len()) {
            return Err(Error::with_message(
                ErrorKind::IncompatibleShape,
                format!("cannot lay out {} elements in shape {:?}", v.len(), shape),
            ));
        }
        let dtype = DType::of::<A>();
        let strides = strides_for_order(&shape, dtype.itemsize(), order).ok_or_else(|| {
            Error::with_message(
                ErrorKind::IncompatibleShape,
                format!("shape {:?} is too large for its strides to fit in isize", shape),
            )
        })?;
        let data = Arc::new(Buffer::from_elements(&v));
        Ok(Self::owning(data, dtype, shape, strides))
    }

    /// Create a one-dimensional array from a vector.
    pub fn from_vec<A: Element>(v: Vec<A>) -> Self
    {
        let dtype = DType::of::<A>();
        let shape = vec![v.len()];
        let strides = vec![dtype.itemsize() as Ixs];
        let data = Arc::new(Buffer::from_elements(&v));
        Self::owning(data, dtype, shape, strides)
    }

    /// Create a zero-dimensional array holding `elt`.
    pub fn scalar<A: Element>(elt: A) -> Self
    {
        let data = Arc::new(Buffer::from_elements(&[elt]));
        Self::owning(data, DType::of::<A>(), Vec::new(), Vec::new())
    }

    /// Create an array of zeros with the given shape.
    ///
    /// **Panics** if the product of non-zero axis lengths, in bytes,
    /// overflows `isize`.
    pub fn zeros<A, Sh>(shape: Sh) -> Self
    where
        A: Element + Zero,
        Sh: IntoShape,
    {
        let shape = shape.into_shape();
        let dtype = DType::of::<A>();
        let (size, strides) = match (
            dimension::size_of_shape_checked(&shape),
            strides_for_order(&shape, dtype.itemsize(), Order::C),
        ) {
            (Some(size), Some(strides)) => (size, strides),
            _ => panic!("ndarray-dispatch: Shape too large, product of non-zero axis lengths overflows isize"),
        };
        let data = Arc::new(Buffer::from_elements(&vec![A::zero(); size]));
        Self::owning(data, dtype, shape, strides)
    }

    /// Create a header over an existing buffer.
    ///
    /// `offset` is the byte offset of the first element; `strides` are in
    /// bytes and may be zero or negative.
    ///
    /// **Errors** if the shape and strides differ in length or if any
    /// element lies outside the buffer.
    pub fn from_buffer(
        data: Arc<Buffer>, dtype: DType, shape: Vec<Ix>, strides: Vec<Ixs>, offset: isize,
    ) -> Result<Self, Error>
    {
        dimension::can_index_buffer(data.len(), offset, &shape, &strides, dtype.itemsize())?;
        Ok(ArrayView {
            data,
            offset,
            shape,
            strides,
            dtype,
            class: ArrayType::base().clone(),
            attrs: BTreeMap::new(),
            owns_data: false,
        })
    }

    fn owning(data: Arc<Buffer>, dtype: DType, shape: Vec<Ix>, strides: Vec<Ixs>) -> Self
    {
        ArrayView {
            data,
            offset: 0,
            shape,
            strides,
            dtype,
            class: ArrayType::base().clone(),
            attrs: BTreeMap::new(),
            owns_data: true,
        }
    }

    /// Create an unchecked base-class header that borrows `source`'s buffer.
    pub(crate) fn derived(source: &ArrayView, dtype: DType, shape: Vec<Ix>, strides: Vec<Ixs>, offset: isize) -> Self
    {
        ArrayView {
            data: source.data.clone(),
            offset,
            shape,
            strides,
            dtype,
            class: ArrayType::base().clone(),
            attrs: BTreeMap::new(),
            owns_data: false,
        }
    }

    /// Return the shape of the array.
    pub fn shape(&self) -> &[Ix]
    {
        &self.shape
    }

    /// Return the byte strides of the array.
    pub fn strides(&self) -> &[Ixs]
    {
        &self.strides
    }

    /// Return the number of dimensions (axes) in the array.
    pub fn ndim(&self) -> usize
    {
        self.shape.len()
    }

    /// Return the total number of elements in the array.
    ///
    /// Saturates at `usize::MAX` for views whose shape overflows.
    pub fn len(&self) -> usize
    {
        dimension::size_of_shape_saturating(&self.shape)
    }

    /// Return whether the array has any elements.
    pub fn is_empty(&self) -> bool
    {
        self.shape.contains(&0)
    }

    pub fn dtype(&self) -> &DType
    {
        &self.dtype
    }

    pub(crate) fn set_dtype(&mut self, dtype: DType)
    {
        self.dtype = dtype;
    }

    /// Byte offset of the first element in the buffer.
    pub fn offset(&self) -> isize
    {
        self.offset
    }

    /// The base buffer this array reads from.
    pub fn buffer(&self) -> &Arc<Buffer>
    {
        &self.data
    }

    /// Return true if `self` and `other` read from the same buffer.
    pub fn shares_buffer(&self, other: &ArrayView) -> bool
    {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Return true if this array created its buffer, false for any header
    /// derived from another array.
    pub fn owns_data(&self) -> bool
    {
        self.owns_data
    }

    /// The runtime type of the array.
    pub fn class(&self) -> &Arc<ArrayType>
    {
        &self.class
    }

    pub fn attrs(&self) -> &BTreeMap<String, Value>
    {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&Value>
    {
        self.attrs.get(name)
    }

    /// Set an auxiliary attribute on this header.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>)
    {
        self.attrs.insert(name.into(), value.into());
    }

    /// Return true if `self` and `other` are the same header over the same
    /// buffer: equal shape, strides, offset, element type and class.
    pub fn same_view(&self, other: &ArrayView) -> bool
    {
        self.shares_buffer(other)
            && self.offset == other.offset
            && self.shape == other.shape
            && self.strides == other.strides
            && self.dtype == other.dtype
            && self.class.is(&other.class)
    }

    /// Return a view of the same data as the base array type.
    ///
    /// No finalize hook runs and no attributes are carried over.
    pub fn base_view(&self) -> ArrayView
    {
        let mut view = self.derive_header();
        view.class = ArrayType::base().clone();
        view.attrs.clear();
        view
    }

    /// Return a view of the same data as `class`.
    ///
    /// If `class` has a finalize hook, it runs with `self` as the source.
    pub fn view_as(&self, class: &Arc<ArrayType>) -> ArrayView
    {
        let mut view = self.derive_header().with_class(class.clone());
        if let Some(finalize) = class.finalize() {
            finalize.finalize(&mut view, self);
        }
        view
    }

    /// Re-tag the header as `class`, without running any hook.
    pub(crate) fn with_class(mut self, class: Arc<ArrayType>) -> Self
    {
        self.class = class;
        self
    }

    fn derive_header(&self) -> ArrayView
    {
        let mut view = self.clone();
        view.owns_data = false;
        view
    }

    /// Return the element at `index`.
    ///
    /// Return `None` if `A` is not the array's element type, if the index is
    /// out of bounds, or if the element lies outside the buffer.
    pub fn get<A: Element>(&self, index: &[Ix]) -> Option<A>
    {
        if self.dtype != DType::of::<A>() {
            return None;
        }
        let offset = dimension::offset_of_index(&self.shape, &self.strides, index)?;
        self.data.read(self.offset.checked_add(offset)?)
    }

    /// Return an iterator over the indices of the array, in row major order.
    pub fn indices(&self) -> Indices
    {
        Indices::new(&self.shape)
    }

    /// Return the elements in logical row major order.
    ///
    /// Return `None` under the same conditions as [`.get()`](Self::get).
    pub fn to_vec<A: Element>(&self) -> Option<Vec<A>>
    {
        self.indices().map(|index| self.get(&index)).collect()
    }
}

impl fmt::Debug for ArrayView
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ArrayView")
            .field("class", &self.class)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("dtype", &self.dtype)
            .field("offset", &self.offset)
            .field("owns_data", &self.owns_data)
            .finish()
    }
}
