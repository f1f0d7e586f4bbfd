// Copyright 2014-2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
#![doc(html_root_url = "https://docs.rs/ndarray-dispatch/0.1/")]
#![allow(
    clippy::many_single_char_names,
    clippy::manual_map, // is not an error
)]
#![doc(test(attr(deny(warnings))))]
#![doc(test(attr(allow(unused_variables))))]
#![doc(test(attr(allow(deprecated))))]

//! The `ndarray-dispatch` crate provides the dispatch and broadcasting core
//! of an n-dimensional array library: zero-copy strided views, broadcasting
//! of several operands to one shape, and an override protocol that lets
//! array subclasses and third-party array-like types take over public
//! operations.
//!
//! - [`ArrayView`]: an array header (shape, byte strides, element type,
//!   class and attributes) over a shared, immutable [`Buffer`]
//! - [`as_strided`], [`as_strided_checked`] and [`rolling_window`]: new
//!   headers over an existing buffer
//! - [`broadcast_arrays`] and [`broadcast_shape`]: the broadcasting rules
//! - [`ArrayType`]: runtime types with an explicit supertype, an
//!   [`ArrayFunction`] override hook and a [`Finalize`] hook
//! - [`implementing_args`] and [`DispatchGate`]: candidate resolution and the
//!   dispatch protocol, with dispatchable versions of the operations in
//!   [`functions`]
//!
//! ## Crate Feature Flags
//!
//! - `std`: Rust standard library-using functionality (enabled by default);
//!   provides [`DispatchConfig::from_env`]
//! - `serde`: serialization support for the metadata types
//!   ([`ArrayInterface`], [`DType`], [`Order`])
//!
//! ## Overriding an operation
//!
//! ```
//! use ndarray_dispatch::{functions, Arguments, ArrayType, ArrayView, DispatchGate, Outcome, Value};
//!
//! // A subclass that answers `broadcast_arrays` itself.
//! let logged = ArrayType::subclass("Logged")
//!     .array_function(|_this, func, _types, args| {
//!         if func.name() == "broadcast_arrays" {
//!             Ok(Outcome::Claimed(Value::Int(args.args().len() as i64)))
//!         } else {
//!             Ok(Outcome::Declined)
//!         }
//!     })
//!     .build();
//!
//! let a = ArrayView::from_vec(vec![1.0f64, 2.]);
//! let b = a.view_as(&logged);
//! let gate = DispatchGate::default();
//! let result = gate.call(functions::broadcast_arrays(), Arguments::positional(vec![a, b]));
//! assert_eq!(result, Ok(Value::Int(2)));
//! ```

mod array;
mod broadcast;
mod buffer;
mod class;
mod dimension;
mod dtype;
mod error;
pub mod functions;
mod indexes;
mod interface;
pub mod overrides;
mod stride_tricks;
mod value;

pub use crate::array::ArrayView;
pub use crate::broadcast::{broadcast_arrays, broadcast_shape};
pub use crate::buffer::Buffer;
pub use crate::class::{ArrayType, ArrayTypeBuilder, Finalize};
pub use crate::dimension::{size_of_shape, size_of_shape_checked, strides_for_order, IntoShape, Ix, Ixs, Order};
pub use crate::dtype::{DType, Element, Field, Kind};
pub use crate::error::{Error, ErrorKind};
pub use crate::indexes::Indices;
pub use crate::interface::{ArrayInterface, INTERFACE_VERSION};
pub use crate::overrides::{
    implementing_args,
    ArrayFunction,
    Candidate,
    CandidateOrdering,
    DispatchConfig,
    DispatchGate,
    Function,
    Outcome,
    MAX_ARRAY_FUNCTION_TYPES,
};
pub use crate::stride_tricks::{as_strided, as_strided_checked, rolling_window};
pub use crate::value::{as_array, Arguments, DuckArray, Value};
