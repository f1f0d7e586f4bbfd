// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Registered array types.
//!
//! Every array and every third-party array-like object carries an
//! [`ArrayType`]. A type optionally declares
//!
//! - its direct supertype, which is how subclass relations are known,
//! - an override hook ([`ArrayFunction`]) for the dispatch protocol,
//! - a finalize hook ([`Finalize`]) run when a view of the type is created
//!   from another array.
//!
//! Hooks are inherited along the supertype chain. The base array type,
//! [`ArrayType::base`], carries the default override hook, so subclasses of it
//! that declare no hook of their own take part in dispatch with the default
//! behaviour.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::array::ArrayView;
use crate::error::Error;
use crate::overrides::{ArrayFunction, DefaultArrayFunction, Function, Outcome};
use crate::value::{Arguments, Value};

/// Post-construction hook of an array type.
///
/// Called with the freshly created view and the array it was derived from,
/// so that a subclass can carry over its auxiliary attributes. Only the new
/// view may be modified.
pub trait Finalize: Send + Sync
{
    fn finalize(&self, array: &mut ArrayView, source: &ArrayView);
}

impl<F> Finalize for F
where F: Fn(&mut ArrayView, &ArrayView) + Send + Sync
{
    fn finalize(&self, array: &mut ArrayView, source: &ArrayView)
    {
        self(array, source)
    }
}

/// Runtime identity of an array or array-like type.
///
/// Types are compared by identity: two types built separately are distinct
/// even if they share a name.
pub struct ArrayType
{
    id: u64,
    name: Cow<'static, str>,
    supertype: Option<Arc<ArrayType>>,
    array_function: Option<Arc<dyn ArrayFunction>>,
    finalize: Option<Arc<dyn Finalize>>,
}

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(0);

impl ArrayType
{
    /// The library's own base array type.
    pub fn base() -> &'static Arc<ArrayType>
    {
        static BASE: OnceLock<Arc<ArrayType>> = OnceLock::new();
        BASE.get_or_init(|| {
            ArrayType::builder("ndarray")
                .array_function_impl(DefaultArrayFunction)
                .build()
        })
    }

    /// Start declaring a new type named `name`.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ArrayTypeBuilder
    {
        ArrayTypeBuilder {
            name: name.into(),
            supertype: None,
            array_function: None,
            finalize: None,
        }
    }

    /// Start declaring a subclass of the base array type.
    pub fn subclass(name: impl Into<Cow<'static, str>>) -> ArrayTypeBuilder
    {
        ArrayType::builder(name).supertype(ArrayType::base())
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// The declared direct supertype, if any.
    pub fn supertype(&self) -> Option<&Arc<ArrayType>>
    {
        self.supertype.as_ref()
    }

    /// Return true if `self` and `other` are the same type.
    #[inline]
    pub fn is(&self, other: &ArrayType) -> bool
    {
        self.id == other.id
    }

    /// Return true if `self` is `other` or declares it as a (transitive)
    /// supertype.
    pub fn is_subtype_of(&self, other: &ArrayType) -> bool
    {
        self.ancestors().any(|ty| ty.is(other))
    }

    /// Return true if `self` is a subtype of `other` and not `other` itself.
    pub fn is_strict_subtype_of(&self, other: &ArrayType) -> bool
    {
        !self.is(other) && self.is_subtype_of(other)
    }

    /// Return true for the base array type and its subclasses.
    pub fn is_array_type(&self) -> bool
    {
        self.is_subtype_of(ArrayType::base())
    }

    /// The override hook, declared or inherited.
    ///
    /// `None` means the type does not take part in override dispatch.
    pub fn array_function(&self) -> Option<&Arc<dyn ArrayFunction>>
    {
        self.ancestors().find_map(|ty| ty.array_function.as_ref())
    }

    /// Return true if the effective override hook is the base array type's
    /// default one.
    pub fn has_default_array_function(&self) -> bool
    {
        self.array_function()
            .map_or(false, |hook| hook.is_default())
    }

    /// The finalize hook, declared or inherited.
    pub fn finalize(&self) -> Option<&Arc<dyn Finalize>>
    {
        self.ancestors().find_map(|ty| ty.finalize.as_ref())
    }

    /// Iterate over `self` followed by its supertypes, nearest first.
    fn ancestors(&self) -> impl Iterator<Item = &ArrayType>
    {
        std::iter::successors(Some(self), |&ty| ty.supertype.as_deref())
    }
}

impl PartialEq for ArrayType
{
    fn eq(&self, other: &Self) -> bool
    {
        self.is(other)
    }
}

impl Eq for ArrayType {}

impl fmt::Debug for ArrayType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.name)
    }
}

impl fmt::Display for ArrayType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.name)
    }
}

/// Builder for [`ArrayType`].
#[must_use = "call .build() to create the type"]
pub struct ArrayTypeBuilder
{
    name: Cow<'static, str>,
    supertype: Option<Arc<ArrayType>>,
    array_function: Option<Arc<dyn ArrayFunction>>,
    finalize: Option<Arc<dyn Finalize>>,
}

impl ArrayTypeBuilder
{
    /// Declare the direct supertype.
    pub fn supertype(mut self, supertype: &Arc<ArrayType>) -> Self
    {
        self.supertype = Some(supertype.clone());
        self
    }

    /// Declare an override hook given as a closure.
    pub fn array_function<F>(self, hook: F) -> Self
    where F: Fn(&Value, &Function, &[Arc<ArrayType>], &Arguments) -> Result<Outcome, Error> + Send + Sync + 'static
    {
        self.array_function_impl(hook)
    }

    /// Declare an override hook implemented by a type.
    pub fn array_function_impl<H>(mut self, hook: H) -> Self
    where H: ArrayFunction + 'static
    {
        self.array_function = Some(Arc::new(hook));
        self
    }

    /// Declare a finalize hook.
    pub fn finalize<F>(mut self, hook: F) -> Self
    where F: Fn(&mut ArrayView, &ArrayView) + Send + Sync + 'static
    {
        self.finalize = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<ArrayType>
    {
        Arc::new(ArrayType {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            supertype: self.supertype,
            array_function: self.array_function,
            finalize: self.finalize,
        })
    }
}
