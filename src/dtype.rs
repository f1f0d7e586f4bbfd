// Copyright 2024 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Element type descriptors.

use std::fmt;
use std::mem;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of an element type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kind
{
    Bool,
    Int,
    UInt,
    Float,
    /// Opaque fixed size record; may carry named fields.
    Void,
}

impl Kind
{
    fn code(self) -> char
    {
        match self {
            Kind::Bool => 'b',
            Kind::Int => 'i',
            Kind::UInt => 'u',
            Kind::Float => 'f',
            Kind::Void => 'V',
        }
    }

    fn from_code(code: char) -> Option<Kind>
    {
        Some(match code {
            'b' => Kind::Bool,
            'i' => Kind::Int,
            'u' => Kind::UInt,
            'f' => Kind::Float,
            'V' => Kind::Void,
            _ => return None,
        })
    }
}

/// A named field of a record element type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field
{
    pub name: String,
    pub dtype: DType,
    /// Byte offset of the field inside the record.
    pub offset: usize,
}

/// Element type descriptor: kind, size in bytes and, for records, the field
/// layout.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DType
{
    kind: Kind,
    itemsize: usize,
    fields: Option<Arc<[Field]>>,
}

impl DType
{
    /// Create a descriptor for a plain (non record) element type.
    pub fn new(kind: Kind, itemsize: usize) -> Self
    {
        DType {
            kind,
            itemsize,
            fields: None,
        }
    }

    /// Create a packed record type from `(name, dtype)` pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, DType)>,
        S: Into<String>,
    {
        let mut offset = 0;
        let fields = fields
            .into_iter()
            .map(|(name, dtype)| {
                let field = Field {
                    name: name.into(),
                    offset,
                    dtype,
                };
                offset += field.dtype.itemsize;
                field
            })
            .collect::<Vec<_>>();
        DType {
            kind: Kind::Void,
            itemsize: offset,
            fields: Some(fields.into()),
        }
    }

    /// Return the descriptor of the element type `A`.
    pub fn of<A: Element>() -> Self
    {
        DType::new(A::KIND, mem::size_of::<A>())
    }

    pub fn kind(&self) -> Kind
    {
        self.kind
    }

    /// Size of one element in bytes.
    pub fn itemsize(&self) -> usize
    {
        self.itemsize
    }

    /// The record fields, if this is a structured type.
    pub fn fields(&self) -> Option<&[Field]>
    {
        self.fields.as_deref()
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Field>
    {
        self.fields()?.iter().find(|field| field.name == name)
    }

    /// Return the type string used in array interfaces, like `"<f8"`.
    ///
    /// Record layouts are not part of the type string; a record type comes
    /// back from [`DType::from_typestr`] as a bare `Void` of the same size.
    pub fn typestr(&self) -> String
    {
        let order = match self.kind {
            Kind::Bool | Kind::Void => '|',
            _ if self.itemsize == 1 => '|',
            _ if cfg!(target_endian = "little") => '<',
            _ => '>',
        };
        format!("{}{}{}", order, self.kind.code(), self.itemsize)
    }

    /// Parse a native-endian type string produced by [`DType::typestr`].
    pub fn from_typestr(typestr: &str) -> Option<Self>
    {
        let mut chars = typestr.chars();
        let native = if cfg!(target_endian = "little") { '<' } else { '>' };
        match chars.next()? {
            '|' | '=' => {}
            order if order == native => {}
            _ => return None,
        }
        let kind = Kind::from_code(chars.next()?)?;
        let itemsize = chars.as_str().parse().ok()?;
        Some(DType::new(kind, itemsize))
    }
}

impl fmt::Debug for DType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.fields() {
            None => write!(f, "dtype({})", self.typestr()),
            Some(fields) => {
                f.write_str("dtype([")?;
                for (i, field) in fields.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({:?}, {})", field.name, field.dtype.typestr())?;
                }
                f.write_str("])")
            }
        }
    }
}

/// Element types that can be stored in and read back from a [`Buffer`](crate::Buffer).
///
/// Elements are stored in native byte order.
pub trait Element: Copy + Send + Sync + fmt::Debug + 'static
{
    /// The kind of the element type.
    const KIND: Kind;

    /// Decode one element from exactly `size_of::<Self>()` bytes.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Encode one element into exactly `size_of::<Self>()` bytes.
    fn write_ne(self, out: &mut [u8]);
}

macro_rules! impl_element {
    ($kind:ident => $($t:ty),*) => {
        $(
        impl Element for $t
        {
            const KIND: Kind = Kind::$kind;

            #[inline]
            fn read_ne(bytes: &[u8]) -> Self
            {
                let mut raw = [0u8; mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_ne_bytes(raw)
            }

            #[inline]
            fn write_ne(self, out: &mut [u8])
            {
                out.copy_from_slice(&self.to_ne_bytes());
            }
        }
        )*
    };
}

impl_element!(Int => i8, i16, i32, i64);
impl_element!(UInt => u8, u16, u32, u64);
impl_element!(Float => f32, f64);

impl Element for bool
{
    const KIND: Kind = Kind::Bool;

    #[inline]
    fn read_ne(bytes: &[u8]) -> Self
    {
        bytes[0] != 0
    }

    #[inline]
    fn write_ne(self, out: &mut [u8])
    {
        out[0] = self as u8;
    }
}
