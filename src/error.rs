// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::overrides::MAX_ARRAY_FUNCTION_TYPES;

/// An error from coercion, broadcasting, view construction or override dispatch.
///
/// Errors raised by override hooks or default implementations are carried
/// unmodified as [`ErrorKind::Implementation`]; see [`Error::custom`].
#[derive(Clone)]
pub struct Error
{
    // we want to be able to change this representation later
    kind: ErrorKind,
    detail: Detail,
}

#[derive(Clone)]
enum Detail
{
    None,
    Axis(usize),
    TypeCount(usize),
    Message(String),
    NoImplementation
    {
        function: String,
        types: Vec<String>,
    },
    Source(Arc<dyn StdError + Send + Sync>),
}

/// Error code for an [`Error`].
///
/// This enumeration is not exhaustive. The representation of the enum
/// is not guaranteed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind
{
    /// value cannot be interpreted as an array
    TypeCoercion,
    /// two or more operands disagree on a non-broadcastable axis
    ShapeMismatch,
    /// shape and strides (or shape and element count) do not fit together
    IncompatibleShape,
    /// too many distinct override capable types in one call
    TooManyCandidateTypes,
    /// every override candidate declined the call
    NoImplementationFound,
    /// rolling window length out of range
    InvalidWindow,
    /// strides lead to out of bounds indexing
    OutOfBounds,
    /// unexpected or malformed call argument
    InvalidArgument,
    /// error raised by an override hook or a default implementation
    Implementation,
}

impl Error
{
    /// Create an error of the given kind, without further detail.
    pub fn from_kind(kind: ErrorKind) -> Self
    {
        Error {
            kind,
            detail: Detail::None,
        }
    }

    /// Wrap an arbitrary error raised by an override hook or a default
    /// implementation.
    ///
    /// Dispatch and broadcasting never inspect or rewrite these; they reach
    /// the caller as they were returned.
    pub fn custom<E>(error: E) -> Self
    where E: Into<Box<dyn StdError + Send + Sync>>
    {
        Error {
            kind: ErrorKind::Implementation,
            detail: Detail::Source(Arc::from(error.into())),
        }
    }

    /// Return the `ErrorKind` of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind
    {
        self.kind
    }

    /// The offending axis of a [`ErrorKind::ShapeMismatch`].
    pub fn axis(&self) -> Option<usize>
    {
        match self.detail {
            Detail::Axis(axis) => Some(axis),
            _ => None,
        }
    }

    /// The number of distinct types of a [`ErrorKind::TooManyCandidateTypes`].
    pub fn type_count(&self) -> Option<usize>
    {
        match self.detail {
            Detail::TypeCount(count) => Some(count),
            _ => None,
        }
    }

    /// The qualified function name of a [`ErrorKind::NoImplementationFound`].
    pub fn function_name(&self) -> Option<&str>
    {
        match self.detail {
            Detail::NoImplementation { ref function, .. } => Some(function),
            _ => None,
        }
    }

    pub(crate) fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self
    {
        Error {
            kind,
            detail: Detail::Message(message.into()),
        }
    }

    pub(crate) fn type_coercion(what: &str) -> Self
    {
        Self::with_message(ErrorKind::TypeCoercion, format!("cannot interpret {} as an array", what))
    }

    pub(crate) fn shape_mismatch(axis: usize) -> Self
    {
        Error {
            kind: ErrorKind::ShapeMismatch,
            detail: Detail::Axis(axis),
        }
    }

    pub(crate) fn too_many_candidate_types(count: usize) -> Self
    {
        Error {
            kind: ErrorKind::TooManyCandidateTypes,
            detail: Detail::TypeCount(count),
        }
    }

    pub(crate) fn no_implementation_found(function: String, types: Vec<String>) -> Self
    {
        Error {
            kind: ErrorKind::NoImplementationFound,
            detail: Detail::NoImplementation { function, types },
        }
    }

    pub(crate) fn unexpected_keyword(function: &str, keyword: &str) -> Self
    {
        Self::with_message(
            ErrorKind::InvalidArgument,
            format!("{}() got an unexpected keyword argument '{}'", function, keyword),
        )
    }

    fn description(&self) -> &'static str
    {
        match self.kind {
            ErrorKind::TypeCoercion => "cannot interpret value as an array",
            ErrorKind::ShapeMismatch => "shape mismatch",
            ErrorKind::IncompatibleShape => "incompatible shapes",
            ErrorKind::TooManyCandidateTypes => "too many distinct argument types implementing array_function",
            ErrorKind::NoImplementationFound => "no implementation found",
            ErrorKind::InvalidWindow => "invalid rolling window",
            ErrorKind::OutOfBounds => "strides lead to out of bounds indexing",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Implementation => "error in array function implementation",
        }
    }
}

impl PartialEq for Error
{
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool
    {
        self.kind == rhs.kind
    }
}

impl StdError for Error
{
    fn source(&self) -> Option<&(dyn StdError + 'static)>
    {
        match self.detail {
            Detail::Source(ref source) => Some(&**source),
            _ => None,
        }
    }
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.detail {
            Detail::None => f.write_str(self.description()),
            Detail::Axis(axis) => write!(
                f,
                "shape mismatch: two or more arrays have incompatible dimensions on axis {}",
                axis
            ),
            Detail::TypeCount(count) => write!(
                f,
                "maximum number ({}) of distinct argument types implementing array_function exceeded: found {}",
                MAX_ARRAY_FUNCTION_TYPES, count
            ),
            Detail::Message(ref message) => f.write_str(message),
            Detail::NoImplementation {
                ref function,
                ref types,
            } => write!(
                f,
                "no implementation found for '{}' on types that implement array_function: [{}]",
                function,
                types.iter().join(", ")
            ),
            Detail::Source(ref source) => fmt::Display::fmt(&**source, f),
        }
    }
}

impl fmt::Debug for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "Error({:?}): {}", self.kind, self)
    }
}
