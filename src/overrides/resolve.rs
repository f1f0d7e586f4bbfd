// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::slice;
use std::sync::Arc;

use crate::class::ArrayType;
use crate::error::Error;
use crate::value::Value;

use super::{ArrayFunction, MAX_ARRAY_FUNCTION_TYPES};

/// One distinct override capable type in a call, with the first argument of
/// that type.
#[derive(Clone, Debug)]
pub struct Candidate
{
    ty: Arc<ArrayType>,
    value: Value,
}

impl Candidate
{
    pub fn ty(&self) -> &Arc<ArrayType>
    {
        &self.ty
    }

    /// The argument representing this candidate's type.
    pub fn value(&self) -> &Value
    {
        &self.value
    }

    /// Return true if the candidate's hook is the base array type's default
    /// one, so it does not override anything.
    pub fn is_default(&self) -> bool
    {
        self.ty.has_default_array_function()
    }

    pub(crate) fn hook(&self) -> Option<&Arc<dyn ArrayFunction>>
    {
        self.ty.array_function()
    }
}

/// The candidates of one call, highest priority first.
#[derive(Clone, Debug, Default)]
pub struct CandidateOrdering
{
    candidates: Vec<Candidate>,
}

impl CandidateOrdering
{
    pub fn len(&self) -> usize
    {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Candidate>
    {
        self.candidates.iter()
    }

    /// The distinct candidate types, in priority order.
    pub fn types(&self) -> Vec<Arc<ArrayType>>
    {
        self.candidates.iter().map(|c| c.ty.clone()).collect()
    }

    /// Return true if any candidate declares a hook other than the default.
    pub fn has_overrides(&self) -> bool
    {
        self.candidates.iter().any(|c| !c.is_default())
    }
}

impl<'a> IntoIterator for &'a CandidateOrdering
{
    type Item = &'a Candidate;
    type IntoIter = slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}

/// Collect the override candidates among `relevant`.
///
/// Arguments whose type has no override hook are skipped. Only the first
/// argument of each distinct type is kept. A type is placed right before the
/// first already placed type it is a subtype of, so subclasses are tried
/// before their ancestors; unrelated types keep their argument order.
///
/// **Errors** with [`TooManyCandidateTypes`](crate::ErrorKind::TooManyCandidateTypes)
/// if there are more than [`MAX_ARRAY_FUNCTION_TYPES`] distinct types.
pub fn implementing_args<'a, I>(relevant: I) -> Result<CandidateOrdering, Error>
where I: IntoIterator<Item = &'a Value>
{
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut overflow: Vec<&Arc<ArrayType>> = Vec::new();

    for value in relevant {
        let ty = match value.array_type() {
            Some(ty) if ty.array_function().is_some() => ty,
            _ => continue,
        };
        if candidates.iter().any(|c| c.ty.is(ty)) || overflow.iter().any(|seen| seen.is(ty)) {
            continue;
        }
        if candidates.len() == MAX_ARRAY_FUNCTION_TYPES {
            // keep counting so the error reports the real number
            overflow.push(ty);
            continue;
        }
        let position = candidates
            .iter()
            .position(|placed| ty.is_subtype_of(&placed.ty))
            .unwrap_or(candidates.len());
        candidates.insert(position, Candidate {
            ty: ty.clone(),
            value: value.clone(),
        });
    }

    if !overflow.is_empty() {
        return Err(Error::too_many_candidate_types(candidates.len() + overflow.len()));
    }
    Ok(CandidateOrdering { candidates })
}
