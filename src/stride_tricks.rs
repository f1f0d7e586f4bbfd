// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Views with arbitrary shape and strides over an existing buffer.

use tracing::trace;

use crate::array::ArrayView;
use crate::class::ArrayType;
use crate::dimension::{self, Ix, Ixs};
use crate::dtype::Kind;
use crate::error::{Error, ErrorKind};
use crate::value::{as_array, Value};

/// Create a view of `source` with the given `shape` and `strides`.
///
/// `source` is interpreted as an array without copying. A missing `shape` or
/// `strides` keeps the source's own. Strides are in bytes and may be zero or
/// negative.
///
/// With `subok == true` a source of a subclass gives a view of the same
/// subclass, and the subclass's finalize hook runs with the source as
/// context. Otherwise the view is of the base array type.
///
/// The new shape and strides are **not** checked against the extent of the
/// buffer; element reads through a view that reaches outside of it return
/// `None`. Use [`as_strided_checked`] to validate the view up front.
///
/// **Errors** with [`ErrorKind::TypeCoercion`] if `source` is not array-like,
/// or [`ErrorKind::IncompatibleShape`] if shape and strides differ in length.
pub fn as_strided(source: &Value, shape: Option<&[Ix]>, strides: Option<&[Ixs]>, subok: bool)
    -> Result<ArrayView, Error>
{
    let x = as_array(source, subok)?;
    strided_view(&x, shape, strides)
}

/// Like [`as_strided`], but check that every element the view can reach lies
/// inside the source's buffer.
///
/// Several indices may still refer to the same element.
///
/// **Errors** in addition with [`ErrorKind::OutOfBounds`] if the view would
/// reach outside of the buffer.
pub fn as_strided_checked(source: &Value, shape: Option<&[Ix]>, strides: Option<&[Ixs]>, subok: bool)
    -> Result<ArrayView, Error>
{
    let view = as_strided(source, shape, strides, subok)?;
    dimension::can_index_buffer(
        view.buffer().len(),
        view.offset(),
        view.shape(),
        view.strides(),
        view.dtype().itemsize(),
    )?;
    Ok(view)
}

/// Return a view of `a` with a rolling window over its last axis.
///
/// The result has the leading axes of `a`, then `len - window + 1` window
/// positions, then a new last axis of length `window`. For `a = [0, 1, 2, 3]`
/// and `window = 2` the view reads `[[0, 1], [1, 2], [2, 3]]`.
///
/// **Errors** with [`ErrorKind::InvalidWindow`] if `window` is zero, longer
/// than the last axis, or `a` is zero-dimensional.
pub fn rolling_window(a: &Value, window: usize) -> Result<ArrayView, Error>
{
    let x = as_array(a, false)?;
    if window < 1 {
        return Err(Error::with_message(ErrorKind::InvalidWindow, "`window` must be at least 1"));
    }
    let (&len, outer) = match x.shape().split_last() {
        Some(split) => split,
        None => {
            return Err(Error::with_message(
                ErrorKind::InvalidWindow,
                "cannot add a rolling window to a zero-dimensional array",
            ))
        }
    };
    if window > len {
        return Err(Error::with_message(ErrorKind::InvalidWindow, "`window` is too long"));
    }

    let mut shape = outer.to_vec();
    shape.extend([len - window + 1, window]);
    let mut strides = x.strides().to_vec();
    strides.push(*x.strides().last().unwrap_or(&0));
    strided_view(&x, Some(&shape[..]), Some(&strides[..]))
}

/// Build a new header over the buffer of `x` through its array interface.
///
/// The result keeps the class of `x`, running its finalize hook if `x` is not
/// of the base array type.
pub(crate) fn strided_view(x: &ArrayView, shape: Option<&[Ix]>, strides: Option<&[Ixs]>)
    -> Result<ArrayView, Error>
{
    let mut interface = x.interface();
    if let Some(shape) = shape {
        interface.shape = shape.to_vec();
    }
    if let Some(strides) = strides {
        interface.strides = strides.to_vec();
    }
    let mut array = ArrayView::from_interface(&interface, x)?;
    // the interface only carries a type string, which loses record fields
    if array.dtype().kind() == Kind::Void {
        array.set_dtype(x.dtype().clone());
    }
    trace!(shape = ?array.shape(), strides = ?array.strides(), class = %x.class(), "strided view");

    if x.class().is(ArrayType::base()) {
        return Ok(array);
    }
    let mut array = array.with_class(x.class().clone());
    if let Some(finalize) = x.class().finalize() {
        finalize.finalize(&mut array, x);
    }
    Ok(array)
}
