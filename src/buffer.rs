// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::mem::size_of;

use crate::dtype::Element;

/// Base buffer: the memory region that array headers borrow from.
///
/// A buffer is shared through `Arc` by every [`ArrayView`](crate::ArrayView)
/// created over it and is freed when the last of them is dropped. Its
/// contents are fixed once constructed.
pub struct Buffer
{
    bytes: Box<[u8]>,
}

impl Buffer
{
    /// Create a buffer holding `elements` in native byte order.
    pub fn from_elements<A: Element>(elements: &[A]) -> Self
    {
        let width = size_of::<A>();
        let mut bytes = vec![0u8; elements.len() * width];
        for (elt, out) in elements.iter().zip(bytes.chunks_exact_mut(width)) {
            elt.write_ne(out);
        }
        Buffer::from_bytes(bytes)
    }

    /// Create a buffer from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self
    {
        Buffer {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// Read the element starting at byte `offset`.
    ///
    /// Return `None` if the element does not lie entirely inside the buffer.
    #[inline]
    pub(crate) fn read<A: Element>(&self, offset: isize) -> Option<A>
    {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(size_of::<A>())?;
        self.bytes.get(start..end).map(A::read_ne)
    }
}

impl fmt::Debug for Buffer
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "Buffer({} bytes @ {:p})", self.len(), self.bytes.as_ptr())
    }
}
