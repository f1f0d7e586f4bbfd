// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dispatchable versions of the public operations.
//!
//! Each function here returns a shared [`Function`] handle to be called
//! through a [`DispatchGate`](crate::DispatchGate), so that array types with
//! an override hook can take over the call.
//!
//! | function           | positional arguments | keyword arguments          | result                |
//! |--------------------|----------------------|----------------------------|-----------------------|
//! | `broadcast_arrays` | the operands         | `subok`                    | list of arrays        |
//! | `as_strided`       | `x`                  | `shape`, `strides`, `subok`| array                 |
//! | `rolling_window`   | `a`, `window`        | `window`                   | array                 |
//!
//! ```
//! use ndarray_dispatch::{functions, Arguments, ArrayView, DispatchGate};
//!
//! let gate = DispatchGate::default();
//! let a = ArrayView::from_vec(vec![1.0f64, 2., 3.]);
//! let windows = gate
//!     .call(functions::rolling_window(), Arguments::new().arg(a).kwarg("window", 2i64))
//!     .unwrap();
//! assert_eq!(windows.as_array().unwrap().shape(), &[2, 2]);
//! ```

use std::sync::OnceLock;

use crate::broadcast;
use crate::error::{Error, ErrorKind};
use crate::overrides::Function;
use crate::stride_tricks;
use crate::value::{Arguments, Value};

const MODULE: &str = "ndarray";

/// `broadcast_arrays(*operands, subok=False)`
pub fn broadcast_arrays() -> &'static Function
{
    static FUNCTION: OnceLock<Function> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Function::new(
            MODULE,
            "broadcast_arrays",
            |args: &Arguments| args.args().to_vec(),
            |args: &Arguments| {
                args.expect_keywords("broadcast_arrays", &["subok"])?;
                let subok = args.keyword_bool("broadcast_arrays", "subok", false)?;
                broadcast::broadcast_arrays(args.args(), subok).map(Value::from)
            },
        )
    })
}

/// `as_strided(x, shape=None, strides=None, subok=False)`
pub fn as_strided() -> &'static Function
{
    static FUNCTION: OnceLock<Function> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Function::new(
            MODULE,
            "as_strided",
            |args: &Arguments| args.get(0).cloned().into_iter().collect(),
            |args: &Arguments| {
                const NAME: &str = "as_strided";
                args.expect_keywords(NAME, &["shape", "strides", "subok"])?;
                let x = positional(args, NAME, 0, "x", 1)?;
                let shape = optional_keyword(args, NAME, "shape", Value::to_shape)?;
                let strides = optional_keyword(args, NAME, "strides", Value::to_strides)?;
                let subok = args.keyword_bool(NAME, "subok", false)?;
                stride_tricks::as_strided(x, shape.as_deref(), strides.as_deref(), subok).map(Value::from)
            },
        )
    })
}

/// `rolling_window(a, window)`
pub fn rolling_window() -> &'static Function
{
    static FUNCTION: OnceLock<Function> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Function::new(
            MODULE,
            "rolling_window",
            |args: &Arguments| args.get(0).cloned().into_iter().collect(),
            |args: &Arguments| {
                const NAME: &str = "rolling_window";
                args.expect_keywords(NAME, &["window"])?;
                let a = positional(args, NAME, 0, "a", 2)?;
                let window = match (args.get(1), args.keyword("window")) {
                    (Some(_), Some(_)) => {
                        return Err(Error::with_message(
                            ErrorKind::InvalidArgument,
                            format!("{}() got multiple values for argument 'window'", NAME),
                        ))
                    }
                    (Some(w), None) | (None, Some(w)) => w,
                    (None, None) => return Err(missing(NAME, "window")),
                };
                let window = window
                    .as_int()
                    .and_then(|w| usize::try_from(w).ok())
                    .ok_or_else(|| invalid(NAME, "window", "a non-negative int"))?;
                stride_tricks::rolling_window(a, window).map(Value::from)
            },
        )
    })
}

/// Return positional argument `index`, checking the positional count.
fn positional<'a>(args: &'a Arguments, function: &str, index: usize, name: &str, max: usize)
    -> Result<&'a Value, Error>
{
    if args.args().len() > max {
        return Err(Error::with_message(
            ErrorKind::InvalidArgument,
            format!(
                "{}() takes at most {} positional arguments but {} were given",
                function,
                max,
                args.args().len()
            ),
        ));
    }
    args.get(index).ok_or_else(|| missing(function, name))
}

/// Read keyword `name` with `convert`; absent or `None` give `Ok(None)`.
fn optional_keyword<T>(args: &Arguments, function: &str, name: &str, convert: fn(&Value) -> Option<T>)
    -> Result<Option<T>, Error>
{
    match args.keyword(name) {
        None | Some(Value::None) => Ok(None),
        Some(value) => convert(value)
            .map(Some)
            .ok_or_else(|| invalid(function, name, "an int or a list of ints")),
    }
}

fn missing(function: &str, name: &str) -> Error
{
    Error::with_message(
        ErrorKind::InvalidArgument,
        format!("{}() missing required argument '{}'", function, name),
    )
}

fn invalid(function: &str, name: &str, expected: &str) -> Error
{
    Error::with_message(
        ErrorKind::InvalidArgument,
        format!("{}(): '{}' must be {}", function, name, expected),
    )
}
