// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::dimension::Ix;

/// An iterator over the indices of an array shape, in row major order.
///
/// Iterator element type is `Vec<Ix>`. A scalar shape yields one empty index;
/// a shape with a zero length axis yields nothing.
#[derive(Clone, Debug)]
pub struct Indices
{
    shape: Vec<Ix>,
    index: Option<Vec<Ix>>,
}

impl Indices
{
    /// Create an iterator over the indices of `shape`.
    pub fn new(shape: &[Ix]) -> Self
    {
        let index = if shape.contains(&0) {
            None
        } else {
            Some(vec![0; shape.len()])
        };
        Indices {
            shape: shape.to_vec(),
            index,
        }
    }
}

/// Return the index following `index`, or `None` after the last one.
fn next_for(shape: &[Ix], mut index: Vec<Ix>) -> Option<Vec<Ix>>
{
    let mut done = false;
    for (&len, ix) in shape.iter().zip(index.iter_mut()).rev() {
        *ix += 1;
        if *ix == len {
            *ix = 0;
        } else {
            done = true;
            break;
        }
    }
    if done {
        Some(index)
    } else {
        None
    }
}

impl Iterator for Indices
{
    type Item = Vec<Ix>;

    #[inline]
    fn next(&mut self) -> Option<Vec<Ix>>
    {
        let index = self.index.take()?;
        self.index = next_for(&self.shape, index.clone());
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let ix = match self.index {
            None => return (0, Some(0)),
            Some(ref ix) => ix,
        };
        let size = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len));
        let remaining = size.and_then(|size| {
            // row major rank of the current index
            self.shape
                .iter()
                .zip(ix)
                .try_fold(0usize, |rank, (&len, &i)| rank.checked_mul(len)?.checked_add(i))
                .map(|gone| size - gone)
        });
        match remaining {
            Some(len) => (len, Some(len)),
            None => (0, None),
        }
    }
}
