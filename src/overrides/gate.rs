// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use itertools::Itertools;
use tracing::{debug, trace};

use crate::error::Error;
use crate::value::{Arguments, Value};

use super::{implementing_args, Function, Outcome};

/// Environment variable read by [`DispatchConfig::from_env`].
pub const ARRAY_FUNCTION_ENV: &str = "NDARRAY_ARRAY_FUNCTION";

/// Process-wide settings of the override protocol.
///
/// Read once at startup and hand it to [`DispatchGate::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig
{
    enabled: bool,
}

impl Default for DispatchConfig
{
    fn default() -> Self
    {
        DispatchConfig { enabled: true }
    }
}

impl DispatchConfig
{
    pub fn new(enabled: bool) -> Self
    {
        DispatchConfig { enabled }
    }

    /// A configuration where every call runs the default implementation.
    pub fn disabled() -> Self
    {
        DispatchConfig::new(false)
    }

    pub fn is_enabled(&self) -> bool
    {
        self.enabled
    }

    /// Read the configuration from the `NDARRAY_ARRAY_FUNCTION` environment
    /// variable: `0`, `false` or `off` disable the override protocol, anything
    /// else (or no variable) leaves it enabled.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self
    {
        Self::from_env_value(std::env::var(ARRAY_FUNCTION_ENV).ok().as_deref())
    }

    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    fn from_env_value(value: Option<&str>) -> Self
    {
        let disabled = value.map_or(false, |v| {
            let v = v.trim();
            v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("off")
        });
        DispatchConfig::new(!disabled)
    }
}

/// Runs dispatchable functions through the override protocol.
///
/// The gate holds only its configuration; every call resolves its own
/// candidates, so one gate can be shared freely between threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct DispatchGate
{
    config: DispatchConfig,
}

impl DispatchGate
{
    pub fn new(config: DispatchConfig) -> Self
    {
        DispatchGate { config }
    }

    pub fn config(&self) -> &DispatchConfig
    {
        &self.config
    }

    /// Call `func` with `args`.
    ///
    /// The function's dispatcher selects the relevant arguments. If none of
    /// them has a type with a non-default override hook, the default
    /// implementation runs. Otherwise each candidate's hook is offered the
    /// call in priority order and the first claimed result is returned.
    ///
    /// **Errors** if candidate resolution fails, if a hook or the default
    /// implementation returns an error (passed on unmodified), or with
    /// [`NoImplementationFound`](crate::ErrorKind::NoImplementationFound) if
    /// every candidate declined.
    pub fn call(&self, func: &Function, args: Arguments) -> Result<Value, Error>
    {
        if !self.config.enabled {
            trace!(function = %func.qualified_name(), "override protocol disabled");
            return func.implementation(&args);
        }
        let relevant = func.relevant_args(&args);
        self.dispatch(func, &relevant, &args)
    }

    /// Call an array creation function on behalf of the reference object
    /// `like`.
    ///
    /// Only `like` takes part in override resolution; without it the default
    /// implementation runs.
    pub fn call_like(&self, func: &Function, like: Option<&Value>, args: Arguments) -> Result<Value, Error>
    {
        match like {
            Some(like) if self.config.enabled => self.dispatch(func, std::slice::from_ref(like), &args),
            _ => func.implementation(&args),
        }
    }

    fn dispatch(&self, func: &Function, relevant: &[Value], args: &Arguments) -> Result<Value, Error>
    {
        let ordering = implementing_args(relevant)?;
        let types = ordering.types();
        debug!(
            function = %func.qualified_name(),
            candidates = %types.iter().map(|ty| ty.name()).join(", "),
            "resolved override candidates"
        );
        if !ordering.has_overrides() {
            return func.implementation(args);
        }

        for candidate in &ordering {
            let hook = match candidate.hook() {
                Some(hook) => hook,
                None => continue,
            };
            match hook.array_function(candidate.value(), func, &types, args)? {
                Outcome::Claimed(result) => {
                    debug!(function = %func.qualified_name(), claimed_by = %candidate.ty(), "override claimed call");
                    return Ok(result);
                }
                Outcome::Declined => {
                    trace!(function = %func.qualified_name(), declined_by = %candidate.ty(), "override declined call");
                }
            }
        }

        Err(Error::no_implementation_found(
            func.qualified_name(),
            types.iter().map(|ty| ty.name().to_owned()).collect(),
        ))
    }
}
