// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Broadcasting several arrays to one common shape.

use itertools::izip;
use tracing::debug;

use crate::array::ArrayView;
use crate::dimension::{Ix, Ixs};
use crate::error::Error;
use crate::stride_tricks::strided_view;
use crate::value::{as_array, Value};

/// Broadcast any number of arrays against each other.
///
/// Each operand is interpreted as an array without copying; with
/// `subok == true` subclasses are kept (and their finalize hook runs for the
/// new views). If all operands already have the same shape they are returned
/// as they are. Otherwise shapes are aligned at their last axis and, on each
/// axis, every operand must have either length 1 or the one common length.
/// Operands are stretched along their length 1 axes by giving those axes a
/// stride of zero.
///
/// The results are views of the operands' buffers. An element of a stretched
/// operand appears at several positions of its view, so the views are meant
/// for reading: anything written through one position would show up at all
/// positions sharing the element. Copy a result before modifying it.
///
/// No operands give an empty list.
///
/// **Errors** with [`ErrorKind::TypeCoercion`](crate::ErrorKind::TypeCoercion)
/// if an operand is not array-like, or
/// [`ErrorKind::ShapeMismatch`](crate::ErrorKind::ShapeMismatch) naming the
/// first axis where two operands have different lengths other than 1.
///
/// ```
/// use ndarray_dispatch::{broadcast_arrays, ArrayView, Value};
///
/// let row = ArrayView::from_shape_vec((1, 3), vec![1i64, 2, 3]).unwrap();
/// let col = ArrayView::from_shape_vec((3, 1), vec![10i64, 20, 30]).unwrap();
/// let out = broadcast_arrays(&[Value::from(row), Value::from(col)], false).unwrap();
/// assert_eq!(out[0].shape(), &[3, 3]);
/// assert_eq!(out[1].to_vec::<i64>().unwrap(), vec![10, 10, 10, 20, 20, 20, 30, 30, 30]);
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(operands = operands.len()))]
pub fn broadcast_arrays(operands: &[Value], subok: bool) -> Result<Vec<ArrayView>, Error>
{
    let arrays = operands
        .iter()
        .map(|operand| as_array(operand, subok))
        .collect::<Result<Vec<_>, _>>()?;

    let same_shape = match arrays.split_first() {
        Some((first, rest)) => rest.iter().all(|a| a.shape() == first.shape()),
        None => true,
    };
    if same_shape {
        debug!("operands already share one shape");
        return Ok(arrays);
    }

    let shape = broadcast_shape(&arrays.iter().map(ArrayView::shape).collect::<Vec<_>>())?;
    debug!(shape = ?shape, "broadcast shape");
    arrays
        .iter()
        .map(|a| {
            let strides = broadcast_strides(a.shape(), a.strides(), &shape);
            strided_view(a, Some(&shape[..]), Some(&strides[..]))
        })
        .collect()
}

/// Compute the common shape that all of `shapes` broadcast to.
///
/// A length 0 axis is treated like any other length other than 1: it only
/// broadcasts with length 1 and itself.
///
/// **Errors** with [`ErrorKind::ShapeMismatch`](crate::ErrorKind::ShapeMismatch)
/// if the shapes are not compatible.
pub fn broadcast_shape<S: AsRef<[Ix]>>(shapes: &[S]) -> Result<Vec<Ix>, Error>
{
    let ndim = shapes.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);
    (0..ndim)
        .map(|axis| {
            shapes.iter().try_fold(1, |common, shape| {
                let len = axis_length(shape.as_ref(), ndim, axis);
                if len == 1 || len == common {
                    Ok(common)
                } else if common == 1 {
                    Ok(len)
                } else {
                    Err(Error::shape_mismatch(axis))
                }
            })
        })
        .collect()
}

/// Length of `axis` of `shape` left-padded with ones to `ndim` axes.
#[inline]
fn axis_length(shape: &[Ix], ndim: usize, axis: usize) -> Ix
{
    let pad = ndim - shape.len();
    if axis < pad {
        1
    } else {
        shape[axis - pad]
    }
}

/// Strides that stretch an array of `shape` and `strides` to `common`.
///
/// New leading axes and stretched length 1 axes get stride 0.
fn broadcast_strides(shape: &[Ix], strides: &[Ixs], common: &[Ix]) -> Vec<Ixs>
{
    let pad = common.len() - shape.len();
    let mut out = vec![0; common.len()];
    for (out, &len, &stride, &common_len) in izip!(&mut out[pad..], shape, strides, &common[pad..]) {
        if len == common_len {
            *out = stride;
        }
    }
    out
}
