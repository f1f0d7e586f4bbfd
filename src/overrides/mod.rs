// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The override protocol.
//!
//! A public operation is described by a [`Function`]: its name, a dispatcher
//! that picks the arguments relevant for override resolution, and the
//! default implementation. Calling it through a [`DispatchGate`]
//!
//! 1. collects the candidate types among the relevant arguments
//!    ([`implementing_args`]), most derived types first;
//! 2. offers the call to each candidate's [`ArrayFunction`] hook in order,
//!    until one returns [`Outcome::Claimed`];
//! 3. fails with [`ErrorKind::NoImplementationFound`] if every candidate
//!    returned [`Outcome::Declined`].
//!
//! Calls where no argument declares a hook other than the base array type's
//! default one go straight to the default implementation.
//!
//! [`ErrorKind::NoImplementationFound`]: crate::ErrorKind::NoImplementationFound

use std::fmt;
use std::sync::Arc;

use crate::class::ArrayType;
use crate::error::Error;
use crate::value::{Arguments, Value};

mod gate;
mod resolve;

pub use self::gate::{DispatchConfig, DispatchGate, ARRAY_FUNCTION_ENV};
pub use self::resolve::{implementing_args, Candidate, CandidateOrdering};

/// Maximum number of distinct override capable types in one call.
pub const MAX_ARRAY_FUNCTION_TYPES: usize = 32;

/// Result of offering a call to an override hook.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome
{
    /// The hook handled the call and produced this value.
    Claimed(Value),
    /// The hook does not handle this call; try the next candidate.
    Declined,
}

/// Override hook of an array type.
///
/// `this` is the argument that represents the hook's type in this call,
/// `types` are the distinct candidate types in priority order and `args` are
/// the call's original arguments. Errors are returned to the caller of the
/// dispatched function unmodified.
///
/// Implemented for closures and functions of the same signature.
pub trait ArrayFunction: Send + Sync
{
    fn array_function(
        &self, this: &Value, func: &Function, types: &[Arc<ArrayType>], args: &Arguments,
    ) -> Result<Outcome, Error>;

    /// Return true only for the base array type's default hook.
    #[doc(hidden)]
    fn is_default(&self) -> bool
    {
        false
    }
}

impl<F> ArrayFunction for F
where F: Fn(&Value, &Function, &[Arc<ArrayType>], &Arguments) -> Result<Outcome, Error> + Send + Sync
{
    fn array_function(
        &self, this: &Value, func: &Function, types: &[Arc<ArrayType>], args: &Arguments,
    ) -> Result<Outcome, Error>
    {
        self(this, func, types, args)
    }
}

/// The base array type's hook: run the default implementation if every
/// candidate type is an array type, decline otherwise.
pub(crate) struct DefaultArrayFunction;

impl ArrayFunction for DefaultArrayFunction
{
    fn array_function(
        &self, _this: &Value, func: &Function, types: &[Arc<ArrayType>], args: &Arguments,
    ) -> Result<Outcome, Error>
    {
        if types.iter().all(|ty| ty.is_array_type()) {
            func.implementation(args).map(Outcome::Claimed)
        } else {
            Ok(Outcome::Declined)
        }
    }

    fn is_default(&self) -> bool
    {
        true
    }
}

type Dispatcher = dyn Fn(&Arguments) -> Vec<Value> + Send + Sync;
type Implementation = dyn Fn(&Arguments) -> Result<Value, Error> + Send + Sync;

/// A dispatchable public operation.
///
/// Functions are compared by identity.
pub struct Function
{
    module: String,
    name: String,
    dispatcher: Box<Dispatcher>,
    implementation: Box<Implementation>,
}

impl Function
{
    /// Create a function named `module.name`.
    ///
    /// `dispatcher` maps the call's arguments to the ones relevant for
    /// override resolution; `implementation` is the default computation.
    pub fn new<D, I>(module: impl Into<String>, name: impl Into<String>, dispatcher: D, implementation: I) -> Self
    where
        D: Fn(&Arguments) -> Vec<Value> + Send + Sync + 'static,
        I: Fn(&Arguments) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Function {
            module: module.into(),
            name: name.into(),
            dispatcher: Box::new(dispatcher),
            implementation: Box::new(implementation),
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn module(&self) -> &str
    {
        &self.module
    }

    /// Return `module.name`.
    pub fn qualified_name(&self) -> String
    {
        format!("{}.{}", self.module, self.name)
    }

    /// Return the arguments relevant for override resolution.
    pub fn relevant_args(&self, args: &Arguments) -> Vec<Value>
    {
        (self.dispatcher)(args)
    }

    /// Run the default implementation, without any dispatch.
    pub fn implementation(&self, args: &Arguments) -> Result<Value, Error>
    {
        (self.implementation)(args)
    }
}

impl PartialEq for Function
{
    fn eq(&self, other: &Self) -> bool
    {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for Function
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "<function {}>", self.qualified_name())
    }
}
