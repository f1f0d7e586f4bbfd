// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Call argument values and coercion to arrays.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::array::ArrayView;
use crate::class::ArrayType;
use crate::dimension::{Ix, Ixs};
use crate::error::{Error, ErrorKind};

/// A third-party array-like object.
///
/// Implementors declare their runtime type, which decides whether and how
/// they take part in override dispatch, and may offer a zero-copy array view
/// of themselves.
pub trait DuckArray: fmt::Debug + Send + Sync + 'static
{
    /// The runtime type of the object.
    fn array_type(&self) -> &Arc<ArrayType>;

    /// Return an array view of the object's data, if it has one.
    fn to_array(&self) -> Option<ArrayView>
    {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn DuckArray
{
    /// Downcast to the concrete object type.
    pub fn downcast_ref<T: DuckArray>(&self) -> Option<&T>
    {
        self.as_any().downcast_ref()
    }
}

/// A call argument or result.
#[derive(Clone, Debug)]
pub enum Value
{
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Array(ArrayView),
    Object(Arc<dyn DuckArray>),
}

impl Value
{
    /// Wrap a third-party array-like object.
    pub fn object<T: DuckArray>(object: T) -> Self
    {
        Value::Object(Arc::new(object))
    }

    /// The runtime type of the value, for arrays and array-like objects.
    pub fn array_type(&self) -> Option<&Arc<ArrayType>>
    {
        match *self {
            Value::Array(ref a) => Some(a.class()),
            Value::Object(ref o) => Some(o.array_type()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView>
    {
        match *self {
            Value::Array(ref a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn DuckArray>>
    {
        match *self {
            Value::Object(ref o) => Some(o),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool>
    {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64>
    {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str>
    {
        match *self {
            Value::Str(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]>
    {
        match *self {
            Value::List(ref l) => Some(l),
            _ => None,
        }
    }

    /// Interpret an integer or a list of integers as a shape.
    pub fn to_shape(&self) -> Option<Vec<Ix>>
    {
        match *self {
            Value::Int(i) => Some(vec![Ix::try_from(i).ok()?]),
            Value::List(ref items) => items
                .iter()
                .map(|item| Ix::try_from(item.as_int()?).ok())
                .collect(),
            _ => None,
        }
    }

    /// Interpret an integer or a list of integers as byte strides.
    pub fn to_strides(&self) -> Option<Vec<Ixs>>
    {
        match *self {
            Value::Int(i) => Some(vec![Ixs::try_from(i).ok()?]),
            Value::List(ref items) => items
                .iter()
                .map(|item| Ixs::try_from(item.as_int()?).ok())
                .collect(),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str
    {
        match *self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// Arrays compare as the same header over the same buffer, objects by
/// identity, everything else by value.
impl PartialEq for Value
{
    fn eq(&self, other: &Self) -> bool
    {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.same_view(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<ArrayView> for Value
{
    fn from(a: ArrayView) -> Self
    {
        Value::Array(a)
    }
}

impl From<bool> for Value
{
    fn from(b: bool) -> Self
    {
        Value::Bool(b)
    }
}

impl From<i64> for Value
{
    fn from(i: i64) -> Self
    {
        Value::Int(i)
    }
}

impl From<f64> for Value
{
    fn from(x: f64) -> Self
    {
        Value::Float(x)
    }
}

impl From<&str> for Value
{
    fn from(s: &str) -> Self
    {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value
{
    fn from(s: String) -> Self
    {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value
{
    fn from(items: Vec<Value>) -> Self
    {
        Value::List(items)
    }
}

impl From<Vec<ArrayView>> for Value
{
    fn from(arrays: Vec<ArrayView>) -> Self
    {
        Value::List(arrays.into_iter().map(Value::Array).collect())
    }
}

/// Positional and keyword arguments of a dispatched call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments
{
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl Arguments
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create arguments from positional values only.
    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Arguments {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self
    {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self
    {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn args(&self) -> &[Value]
    {
        &self.positional
    }

    pub fn get(&self, index: usize) -> Option<&Value>
    {
        self.positional.get(index)
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Value>
    {
        &self.keyword
    }

    pub fn keyword(&self, name: &str) -> Option<&Value>
    {
        self.keyword.get(name)
    }

    /// Return an error naming the first keyword not in `allowed`.
    pub fn expect_keywords(&self, function: &str, allowed: &[&str]) -> Result<(), Error>
    {
        match self.keyword.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unexpected) => Err(Error::unexpected_keyword(function, unexpected)),
            None => Ok(()),
        }
    }

    /// Read the boolean keyword `name`, or `default` if it is absent.
    pub fn keyword_bool(&self, function: &str, name: &str, default: bool) -> Result<bool, Error>
    {
        match self.keyword(name) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| {
                Error::with_message(
                    ErrorKind::InvalidArgument,
                    format!("{}(): '{}' must be a bool, got {}", function, name, value.type_name()),
                )
            }),
        }
    }
}

/// Interpret `value` as an array without copying its data.
///
/// - arrays pass through; with `subok == false` a subclass instance is
///   returned as a base-class view of the same buffer
/// - array-like objects are asked for [`DuckArray::to_array`]
/// - `bool`, `int` and `float` become zero-dimensional arrays
/// - nested lists of numbers become new arrays (`bool`, `i64` or `f64`
///   elements)
///
/// **Errors** with [`ErrorKind::TypeCoercion`] for anything else.
pub fn as_array(value: &Value, subok: bool) -> Result<ArrayView, Error>
{
    let array = match *value {
        Value::Array(ref a) => a.clone(),
        Value::Object(ref o) => o
            .to_array()
            .ok_or_else(|| Error::type_coercion(&format!("object of type {}", o.array_type())))?,
        Value::Bool(b) => ArrayView::scalar(b),
        Value::Int(i) => ArrayView::scalar(i),
        Value::Float(x) => ArrayView::scalar(x),
        Value::List(_) => nested::from_nested(value)?,
        Value::None | Value::Str(_) => return Err(Error::type_coercion(value.type_name())),
    };
    if subok || array.class().is(ArrayType::base()) {
        Ok(array)
    } else {
        Ok(array.base_view())
    }
}

mod nested
{
    use super::*;

    #[derive(Copy, Clone, PartialEq, PartialOrd)]
    enum Widest
    {
        Bool,
        Int,
        Float,
    }

    fn ragged() -> Error
    {
        Error::type_coercion("a ragged or non-numeric nested list")
    }

    /// Guess the shape of a nested list by following its first items.
    fn first_shape(mut value: &Value) -> Vec<Ix>
    {
        let mut shape = Vec::new();
        while let Value::List(ref items) = *value {
            shape.push(items.len());
            match items.first() {
                Some(first) => value = first,
                None => break,
            }
        }
        shape
    }

    /// Check that `value` is a rectangular nested list of numbers of `shape`.
    fn check_shape(value: &Value, shape: &[Ix]) -> Result<(), Error>
    {
        match (value, shape.split_first()) {
            (Value::Bool(_) | Value::Int(_) | Value::Float(_), None) => Ok(()),
            (Value::List(items), Some((&len, rest))) if items.len() == len => {
                items.iter().try_for_each(|item| check_shape(item, rest))
            }
            _ => Err(ragged()),
        }
    }

    fn flatten<'a>(value: &'a Value, out: &mut Vec<&'a Value>)
    {
        match *value {
            Value::List(ref items) => items.iter().for_each(|item| flatten(item, out)),
            ref scalar => out.push(scalar),
        }
    }

    pub(super) fn from_nested(value: &Value) -> Result<ArrayView, Error>
    {
        let shape = first_shape(value);
        check_shape(value, &shape)?;
        let mut scalars = Vec::new();
        flatten(value, &mut scalars);
        let widest = scalars
            .iter()
            .map(|v| match **v {
                Value::Bool(_) => Widest::Bool,
                Value::Int(_) => Widest::Int,
                _ => Widest::Float,
            })
            .fold(Widest::Bool, |a, b| if b > a { b } else { a });
        match widest {
            Widest::Bool if !scalars.is_empty() => {
                let v = scalars.iter().map(|v| v.as_bool() == Some(true)).collect();
                ArrayView::from_shape_vec(shape, v)
            }
            Widest::Int => {
                let v = scalars.iter().map(|v| as_i64(v)).collect();
                ArrayView::from_shape_vec(shape, v)
            }
            Widest::Bool | Widest::Float => {
                let v = scalars.iter().map(|v| as_f64(v)).collect();
                ArrayView::from_shape_vec(shape, v)
            }
        }
    }

    fn as_i64(value: &Value) -> i64
    {
        match *value {
            Value::Bool(b) => b as i64,
            Value::Int(i) => i,
            _ => 0,
        }
    }

    fn as_f64(value: &Value) -> f64
    {
        match *value {
            Value::Bool(b) => b as u8 as f64,
            Value::Int(i) => i as f64,
            Value::Float(x) => x,
            _ => 0.,
        }
    }
}
