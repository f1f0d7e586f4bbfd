// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shape and stride integer arithmetic.
//!
//! Shapes are plain `[Ix]` slices (empty for a scalar) and strides are byte
//! offsets in `[Ixs]`, one per axis. A stride of 0 repeats the same element
//! along its axis.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// Array index type
pub type Ix = usize;
/// Array index type (signed)
pub type Ixs = isize;

/// Array order
///
/// - `RowMajor` ("C" order): the index along the last axis varies fastest
/// - `ColumnMajor` ("F" order): the index along the first axis varies fastest
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Order
{
    /// Row major or "C" order
    RowMajor,
    /// Column major or "F" order
    ColumnMajor,
}

impl Order
{
    /// "C" is an alias for row major ordering
    pub const C: Order = Order::RowMajor;

    /// "F" (for Fortran) is an alias for column major ordering
    pub const F: Order = Order::ColumnMajor;

    /// Return true if input is Order::RowMajor, false otherwise
    #[inline]
    pub fn is_row_major(self) -> bool
    {
        matches!(self, Order::RowMajor)
    }
}

/// Argument conversion into a shape.
///
/// Implemented for `Ix` (one axis), `()` (a scalar), tuples of up to six
/// lengths, fixed size arrays, `Vec<Ix>` and `&[Ix]`.
pub trait IntoShape
{
    fn into_shape(self) -> Vec<Ix>;
}

impl IntoShape for Ix
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        vec![self]
    }
}

impl IntoShape for ()
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        Vec::new()
    }
}

impl<const N: usize> IntoShape for [Ix; N]
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        self.to_vec()
    }
}

impl IntoShape for Vec<Ix>
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        self
    }
}

impl IntoShape for &[Ix]
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        self.to_vec()
    }
}

impl IntoShape for &Vec<Ix>
{
    #[inline]
    fn into_shape(self) -> Vec<Ix>
    {
        self.clone()
    }
}

macro_rules! tuple_into_shape {
    ($($name:ident)+) => {
        impl IntoShape for ($(tuple_into_shape!(@ix $name),)+)
        {
            #[inline]
            #[allow(non_snake_case)]
            fn into_shape(self) -> Vec<Ix>
            {
                let ($($name,)+) = self;
                vec![$($name),+]
            }
        }
    };
    (@ix $name:ident) => { Ix };
}

tuple_into_shape!(A);
tuple_into_shape!(A B);
tuple_into_shape!(A B C);
tuple_into_shape!(A B C D);
tuple_into_shape!(A B C D E);
tuple_into_shape!(A B C D E F);

/// Compute the number of elements of `shape`.
///
/// The empty product is 1, so a scalar has one element.
#[inline]
pub fn size_of_shape(shape: &[Ix]) -> usize
{
    shape.iter().product()
}

/// Compute the number of elements of `shape`, checking for overflow.
///
/// Return `None` if the product of the non-zero axis lengths exceeds
/// `isize::MAX`, even when a zero length axis makes the array empty.
pub fn size_of_shape_checked(shape: &[Ix]) -> Option<usize>
{
    let size_nonzero = shape
        .iter()
        .filter(|&&len| len != 0)
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))?;
    if size_nonzero > isize::MAX as usize {
        None
    } else {
        Some(size_of_shape(shape))
    }
}

/// Compute the number of elements of `shape`, saturating at `usize::MAX`.
///
/// Views built by [`as_strided`](crate::as_strided) are not size checked.
pub(crate) fn size_of_shape_saturating(shape: &[Ix]) -> usize
{
    if shape.contains(&0) {
        0
    } else {
        shape.iter().fold(1usize, |acc, &len| acc.saturating_mul(len))
    }
}

/// Return contiguous byte strides for `shape` with elements of `itemsize`
/// bytes, laid out in `order`.
///
/// Zero length axes count as length one, so every stride stays meaningful.
/// Return `None` if a stride does not fit in `Ixs`.
pub fn strides_for_order(shape: &[Ix], itemsize: usize, order: Order) -> Option<Vec<Ixs>>
{
    let mut strides = vec![0; shape.len()];
    let mut cum_prod = Ixs::try_from(itemsize).ok()?;
    let mut fill = |axis: usize| -> Option<()> {
        strides[axis] = cum_prod;
        cum_prod = cum_prod.checked_mul(Ixs::try_from(shape[axis].max(1)).ok()?)?;
        Some(())
    };
    if order.is_row_major() {
        (0..shape.len()).rev().try_for_each(&mut fill)?;
    } else {
        (0..shape.len()).try_for_each(&mut fill)?;
    }
    Some(strides)
}

/// Return the byte offset of `index`, relative to the first element.
///
/// Return `None` if the index is out of bounds or the calculation overflows.
pub(crate) fn offset_of_index(shape: &[Ix], strides: &[Ixs], index: &[Ix]) -> Option<isize>
{
    if index.len() != shape.len() || strides.len() != shape.len() {
        return None;
    }
    let mut offset = 0isize;
    for ((&len, &stride), &i) in shape.iter().zip(strides).zip(index) {
        if i >= len {
            return None;
        }
        if stride == 0 {
            continue;
        }
        offset = isize::try_from(i)
            .ok()?
            .checked_mul(stride)
            .and_then(|x| x.checked_add(offset))?;
    }
    Some(offset)
}

/// Return the lowest and highest byte offsets (relative to the first
/// element) that indexing `shape` with `strides` can reach.
///
/// Return `Ok(None)` for an empty shape and an error on overflow.
pub(crate) fn offset_extent(shape: &[Ix], strides: &[Ixs]) -> Result<Option<(isize, isize)>, Error>
{
    let overflow = || Error::from_kind(ErrorKind::OutOfBounds);
    if size_of_shape_checked(shape).ok_or_else(overflow)? == 0 {
        return Ok(None);
    }
    let (mut low, mut high) = (0isize, 0isize);
    for (&len, &stride) in shape.iter().zip(strides) {
        // len >= 1 here, the shape is not empty
        let reach = isize::try_from(len - 1)
            .ok()
            .and_then(|last| last.checked_mul(stride))
            .ok_or_else(overflow)?;
        if reach < 0 {
            low = low.checked_add(reach).ok_or_else(overflow)?;
        } else {
            high = high.checked_add(reach).ok_or_else(overflow)?;
        }
    }
    Ok(Some((low, high)))
}

/// Check that every element reachable through `shape` and `strides`, starting
/// at byte `offset`, lies inside a buffer of `buffer_len` bytes.
///
/// Zero and negative strides are accepted; several indices may refer to the
/// same element.
pub(crate) fn can_index_buffer(
    buffer_len: usize, offset: isize, shape: &[Ix], strides: &[Ixs], itemsize: usize,
) -> Result<(), Error>
{
    if shape.len() != strides.len() {
        return Err(Error::from_kind(ErrorKind::IncompatibleShape));
    }
    let (low, high) = match offset_extent(shape, strides)? {
        Some(extent) => extent,
        None => return Ok(()),
    };
    let first = offset.checked_add(low);
    let last = offset
        .checked_add(high)
        .and_then(|x| x.checked_add(itemsize as isize));
    match (first, last) {
        (Some(first), Some(last)) if first >= 0 && last as usize <= buffer_len => Ok(()),
        _ => Err(Error::from_kind(ErrorKind::OutOfBounds)),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn into_shape()
    {
        assert_eq!(().into_shape(), Vec::<Ix>::new());
        assert_eq!(3usize.into_shape(), vec![3]);
        assert_eq!((2usize, 3usize, 4usize).into_shape(), vec![2, 3, 4]);
        assert_eq!([1usize, 0].into_shape(), vec![1, 0]);
    }

    #[test]
    fn default_strides()
    {
        assert_eq!(strides_for_order(&[2, 3, 4], 8, Order::C), Some(vec![96, 32, 8]));
        assert_eq!(strides_for_order(&[2, 3, 4], 8, Order::F), Some(vec![8, 16, 48]));
        assert_eq!(strides_for_order(&[0, 3], 8, Order::C), Some(vec![24, 8]));
        assert_eq!(strides_for_order(&[], 8, Order::C), Some(vec![]));
    }

    #[test]
    fn strides_overflow()
    {
        assert_eq!(strides_for_order(&[0, usize::MAX, 2], 8, Order::C), None);
        // 2^62 bytes in total fits, 2^63 does not
        assert_eq!(strides_for_order(&[1 << 58, 2], 8, Order::C), Some(vec![16, 8]));
        assert_eq!(strides_for_order(&[1 << 59, 2], 8, Order::C), None);
    }

    #[test]
    fn size()
    {
        assert_eq!(size_of_shape(&[]), 1);
        assert_eq!(size_of_shape(&[3, 0]), 0);
        assert_eq!(size_of_shape_checked(&[usize::MAX, 2]), None);
        assert_eq!(size_of_shape_checked(&[0, usize::MAX, 2]), None);
        assert_eq!(size_of_shape_checked(&[isize::MAX as usize]), Some(isize::MAX as usize));
        assert_eq!(size_of_shape_checked(&[isize::MAX as usize + 1, 0]), None);
        assert_eq!(size_of_shape_checked(&[0, 7]), Some(0));
        assert_eq!(size_of_shape_saturating(&[usize::MAX, 4]), usize::MAX);
        assert_eq!(size_of_shape_saturating(&[usize::MAX, 4, 0]), 0);
    }

    #[test]
    fn index_offsets()
    {
        assert_eq!(offset_of_index(&[3, 4], &[32, 8], &[2, 1]), Some(72));
        assert_eq!(offset_of_index(&[3, 4], &[0, 8], &[2, 1]), Some(8));
        assert_eq!(offset_of_index(&[3, 4], &[32, 8], &[3, 0]), None);
        assert_eq!(offset_of_index(&[3], &[-8], &[2]), Some(-16));
        assert_eq!(offset_of_index(&[usize::MAX], &[-8], &[usize::MAX - 1]), None);
        assert_eq!(offset_of_index(&[usize::MAX, 2], &[0, 8], &[usize::MAX - 1, 1]), Some(8));
    }

    #[test]
    fn buffer_bounds()
    {
        assert!(can_index_buffer(96, 0, &[3, 4], &[32, 8], 8).is_ok());
        assert!(can_index_buffer(95, 0, &[3, 4], &[32, 8], 8).is_err());
        assert!(can_index_buffer(8, 0, &[100, 100], &[0, 0], 8).is_ok());
        assert!(can_index_buffer(24, 16, &[3], &[-8], 8).is_ok());
        assert!(can_index_buffer(24, 8, &[3], &[-8], 8).is_err());
        assert!(can_index_buffer(0, 0, &[0, 5], &[40, 8], 8).is_ok());
        assert!(can_index_buffer(24, 16, &[usize::MAX], &[-8], 8).is_err());
        assert!(can_index_buffer(8, 0, &[usize::MAX], &[0], 8).is_err());
    }
}
