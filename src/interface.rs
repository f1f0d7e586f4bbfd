// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The array interface: a plain metadata record describing how to read an
//! array out of a buffer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::array::ArrayView;
use crate::dimension::{Ix, Ixs};
use crate::dtype::DType;
use crate::error::{Error, ErrorKind};

/// Interface protocol version written by [`ArrayView::interface`].
pub const INTERFACE_VERSION: u32 = 3;

/// Shape, strides, element type string and buffer offset of an array.
///
/// Record field layouts are not part of the record; see
/// [`DType::typestr`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayInterface
{
    pub shape: Vec<Ix>,
    pub strides: Vec<Ixs>,
    pub typestr: String,
    /// Byte offset of the first element in the buffer.
    pub offset: isize,
    pub version: u32,
}

impl ArrayView
{
    /// Describe this array as an [`ArrayInterface`] record.
    pub fn interface(&self) -> ArrayInterface
    {
        ArrayInterface {
            shape: self.shape().to_vec(),
            strides: self.strides().to_vec(),
            typestr: self.dtype().typestr(),
            offset: self.offset(),
            version: INTERFACE_VERSION,
        }
    }

    /// Build a base-class header from `interface` that reads from, and keeps
    /// alive, the buffer of `base`.
    ///
    /// The extent of the described array is not checked against the buffer.
    pub(crate) fn from_interface(interface: &ArrayInterface, base: &ArrayView) -> Result<ArrayView, Error>
    {
        if interface.shape.len() != interface.strides.len() {
            return Err(Error::with_message(
                ErrorKind::IncompatibleShape,
                format!(
                    "mismatch in length of strides and shape: {} != {}",
                    interface.strides.len(),
                    interface.shape.len()
                ),
            ));
        }
        let dtype = DType::from_typestr(&interface.typestr)
            .ok_or_else(|| Error::type_coercion(&format!("interface with type string {:?}", interface.typestr)))?;
        Ok(ArrayView::derived(
            base,
            dtype,
            interface.shape.clone(),
            interface.strides.clone(),
            interface.offset,
        ))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dtype::Kind;

    #[test]
    fn interface_describes_header()
    {
        let a = ArrayView::from_shape_vec((2, 2), vec![1.0f64, 2., 3., 4.]).unwrap();
        let iface = a.interface();
        assert_eq!(iface.shape, vec![2, 2]);
        assert_eq!(iface.strides, vec![16, 8]);
        assert_eq!(iface.offset, 0);

        let b = ArrayView::from_interface(&iface, &a).unwrap();
        assert!(b.shares_buffer(&a));
        assert!(!b.owns_data());
        assert_eq!(b.to_vec::<f64>(), a.to_vec::<f64>());
    }

    #[test]
    fn record_comes_back_as_void()
    {
        let rec = DType::record(vec![("a", DType::of::<u8>()), ("b", DType::of::<u8>())]);
        let a = ArrayView::from_vec(vec![0u16; 3]);
        let mut iface = a.interface();
        iface.typestr = rec.typestr();
        let b = ArrayView::from_interface(&iface, &a).unwrap();
        assert_eq!(b.dtype().kind(), Kind::Void);
        assert!(b.dtype().fields().is_none());
    }

    #[test]
    fn mismatched_lengths()
    {
        let a = ArrayView::from_vec(vec![1u8, 2]);
        let mut iface = a.interface();
        iface.shape = vec![1, 2];
        let e = ArrayView::from_interface(&iface, &a).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::IncompatibleShape);
    }
}
