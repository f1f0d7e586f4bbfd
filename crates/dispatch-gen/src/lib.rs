// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Test fixtures: arrays with predictable contents, layout and class.

use std::sync::Arc;

use ndarray_dispatch::{ArrayType, ArrayView, Element, IntoShape, Ix, Order};

use num_traits::Num;

#[derive(Clone, Debug)]
pub struct ArrayBuilder
{
    shape: Vec<Ix>,
    memory_order: Order,
    generator: ElementGenerator,
    class: Option<Arc<ArrayType>>,
}

/// How to generate elements
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementGenerator
{
    Sequential,
    Zero,
}

impl Default for ArrayBuilder
{
    fn default() -> Self
    {
        Self::new(0usize)
    }
}

impl ArrayBuilder
{
    pub fn new(shape: impl IntoShape) -> Self
    {
        ArrayBuilder {
            shape: shape.into_shape(),
            memory_order: Order::C,
            generator: ElementGenerator::Sequential,
            class: None,
        }
    }

    pub fn memory_order(mut self, order: Order) -> Self
    {
        self.memory_order = order;
        self
    }

    pub fn generator(mut self, generator: ElementGenerator) -> Self
    {
        self.generator = generator;
        self
    }

    /// Return the array as a view of `class`, running its finalize hook.
    pub fn class(mut self, class: &Arc<ArrayType>) -> Self
    {
        self.class = Some(class.clone());
        self
    }

    /// Build the array. Sequential elements count up from zero in logical
    /// order of `memory_order`.
    pub fn build<T>(self) -> ArrayView
    where T: Element + Num
    {
        let mut current = T::zero();
        let size = self.shape.iter().product::<usize>();
        let use_zeros = self.generator == ElementGenerator::Zero;
        let elements = (0..size)
            .map(|_| {
                let ret = current;
                if !use_zeros {
                    current = ret + T::one();
                }
                ret
            })
            .collect();
        let array = ArrayView::from_shape_vec_with_order(self.shape, self.memory_order, elements).unwrap();
        match self.class {
            Some(class) => array.view_as(&class),
            None => array,
        }
    }
}

#[test]
fn test_order()
{
    let (m, n) = (12usize, 13usize);
    let c = ArrayBuilder::new((m, n))
        .memory_order(Order::C)
        .build::<i32>();
    let f = ArrayBuilder::new((m, n))
        .memory_order(Order::F)
        .build::<i32>();

    assert_eq!(c.shape(), &[m, n]);
    assert_eq!(f.shape(), &[m, n]);
    assert_eq!(c.strides(), &[4 * n as isize, 4]);
    assert_eq!(f.strides(), &[4, 4 * m as isize]);
    assert_eq!(c.get::<i32>(&[1, 0]), Some(n as i32));
    assert_eq!(f.get::<i32>(&[1, 0]), Some(1));
}

#[test]
fn test_zeros_and_class()
{
    let sub = ArrayType::subclass("Tagged").build();
    let a = ArrayBuilder::new([2usize, 2])
        .generator(ElementGenerator::Zero)
        .class(&sub)
        .build::<f64>();
    assert!(a.class().is(&sub));
    assert_eq!(a.to_vec::<f64>(), Some(vec![0.; 4]));
}
