// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CIM primitive types.
//!
//! - [`CimType`]: the wire type tags (`uint8`, `boolean`, `datetime`, ...)
//! - [`Scalar`]: a typed scalar, which always knows its own tag
//! - [`Value`]: null, scalar or array, as carried by properties and qualifiers
//!
//! The tag table is static; nothing in here holds mutable state.

mod datetime;

pub use datetime::CimDateTime;

use crate::config::boolean_token;
use crate::error::{CimError, Result};
use std::fmt;
use std::str::FromStr;

/// CIM wire type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CimType {
    Boolean,
    String,
    Char16,
    DateTime,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Sint8,
    Sint16,
    Sint32,
    Sint64,
    Real32,
    Real64,
    Reference,
}

impl CimType {
    /// All tags, in declaration order.
    pub const ALL: [CimType; 15] = [
        Self::Boolean,
        Self::String,
        Self::Char16,
        Self::DateTime,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Sint8,
        Self::Sint16,
        Self::Sint32,
        Self::Sint64,
        Self::Real32,
        Self::Real64,
        Self::Reference,
    ];

    /// Wire spelling of the tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Char16 => "char16",
            Self::DateTime => "datetime",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint8 => "sint8",
            Self::Sint16 => "sint16",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Real32 => "real32",
            Self::Real64 => "real64",
            Self::Reference => "reference",
        }
    }

    /// Look up a tag by its wire spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Sint8
                | Self::Sint16
                | Self::Sint32
                | Self::Sint64
        )
    }

    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real32 | Self::Real64)
    }

    /// Integer or real.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_real()
    }
}

impl fmt::Display for CimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CimType {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| CimError::value(format!("invalid CIM type tag {:?}", s)))
    }
}

/// A typed CIM scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    String(String),
    Char16(char),
    DateTime(CimDateTime),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Sint8(i8),
    Sint16(i16),
    Sint32(i32),
    Sint64(i64),
    Real32(f32),
    Real64(f64),
}

macro_rules! parse_number {
    ($variant:ident, $ty:ty, $tag:expr, $text:expr) => {
        $text
            .trim()
            .parse::<$ty>()
            .map(Scalar::$variant)
            .map_err(|e| CimError::value(format!("invalid {} value {:?}: {}", $tag, $text, e)))
    };
}

impl Scalar {
    /// Type tag of this scalar.
    pub const fn cim_type(&self) -> CimType {
        match self {
            Self::Boolean(_) => CimType::Boolean,
            Self::String(_) => CimType::String,
            Self::Char16(_) => CimType::Char16,
            Self::DateTime(_) => CimType::DateTime,
            Self::Uint8(_) => CimType::Uint8,
            Self::Uint16(_) => CimType::Uint16,
            Self::Uint32(_) => CimType::Uint32,
            Self::Uint64(_) => CimType::Uint64,
            Self::Sint8(_) => CimType::Sint8,
            Self::Sint16(_) => CimType::Sint16,
            Self::Sint32(_) => CimType::Sint32,
            Self::Sint64(_) => CimType::Sint64,
            Self::Real32(_) => CimType::Real32,
            Self::Real64(_) => CimType::Real64,
        }
    }

    /// Build a scalar of type `tag` from its canonical string.
    ///
    /// Integers must fit the tag's range. `reference` has no scalar form.
    pub fn construct(tag: CimType, text: &str) -> Result<Self> {
        match tag {
            CimType::Boolean => parse_boolean(text).map(Self::Boolean),
            CimType::String => Ok(Self::String(text.to_string())),
            CimType::Char16 => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char16(c)),
                    _ => Err(CimError::value(format!(
                        "invalid char16 value {:?}: expected exactly one character",
                        text
                    ))),
                }
            }
            CimType::DateTime => CimDateTime::parse(text).map(Self::DateTime),
            CimType::Uint8 => parse_number!(Uint8, u8, tag, text),
            CimType::Uint16 => parse_number!(Uint16, u16, tag, text),
            CimType::Uint32 => parse_number!(Uint32, u32, tag, text),
            CimType::Uint64 => parse_number!(Uint64, u64, tag, text),
            CimType::Sint8 => parse_number!(Sint8, i8, tag, text),
            CimType::Sint16 => parse_number!(Sint16, i16, tag, text),
            CimType::Sint32 => parse_number!(Sint32, i32, tag, text),
            CimType::Sint64 => parse_number!(Sint64, i64, tag, text),
            CimType::Real32 => parse_number!(Real32, f32, tag, text),
            CimType::Real64 => parse_number!(Real64, f64, tag, text),
            CimType::Reference => Err(CimError::value(
                "type 'reference' has no scalar representation",
            )),
        }
    }

    /// Canonical wire string.
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value widened to `i128`, for any integer tag.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Uint8(v) => Some(v.into()),
            Self::Uint16(v) => Some(v.into()),
            Self::Uint32(v) => Some(v.into()),
            Self::Uint64(v) => Some(v.into()),
            Self::Sint8(v) => Some(v.into()),
            Self::Sint16(v) => Some(v.into()),
            Self::Sint32(v) => Some(v.into()),
            Self::Sint64(v) => Some(v.into()),
            _ => None,
        }
    }
}

/// Case-insensitive `true`/`false`, surrounding whitespace ignored.
pub(crate) fn parse_boolean(text: &str) -> Result<bool> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if t.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CimError::value(format!("invalid boolean value {:?}", text)))
    }
}

fn write_real(f: &mut fmt::Formatter<'_>, v: f64, display: impl fmt::Display) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "INF" } else { "-INF" })
    } else {
        write!(f, "{}", display)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => f.write_str(boolean_token(*b)),
            Self::String(s) => f.write_str(s),
            Self::Char16(c) => write!(f, "{}", c),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::Uint8(v) => write!(f, "{}", v),
            Self::Uint16(v) => write!(f, "{}", v),
            Self::Uint32(v) => write!(f, "{}", v),
            Self::Uint64(v) => write!(f, "{}", v),
            Self::Sint8(v) => write!(f, "{}", v),
            Self::Sint16(v) => write!(f, "{}", v),
            Self::Sint32(v) => write!(f, "{}", v),
            Self::Sint64(v) => write!(f, "{}", v),
            Self::Real32(v) => write_real(f, f64::from(*v), v),
            Self::Real64(v) => write_real(f, *v, v),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

scalar_from! {
    bool => Boolean,
    String => String,
    char => Char16,
    CimDateTime => DateTime,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    i8 => Sint8,
    i16 => Sint16,
    i32 => Sint32,
    i64 => Sint64,
    f32 => Real32,
    f64 => Real64,
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// A property or qualifier value: null, a scalar, or an array of scalars.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Scalar]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Tag derived from the value; `None` for null and empty arrays.
    pub fn cim_type(&self) -> Option<CimType> {
        match self {
            Self::Null => None,
            Self::Scalar(s) => Some(s.cim_type()),
            Self::Array(items) => items.first().map(Scalar::cim_type),
        }
    }

    /// Check that every scalar in the value carries `tag`.
    pub(crate) fn check_type(&self, tag: CimType) -> Result<()> {
        let mismatch = match self {
            Self::Null => None,
            Self::Scalar(s) => (s.cim_type() != tag).then(|| s.cim_type()),
            Self::Array(items) => items
                .iter()
                .map(Scalar::cim_type)
                .find(|t| *t != tag),
        };
        match mismatch {
            Some(found) => Err(CimError::construction(format!(
                "value of type {} does not match declared type {}",
                found, tag
            ))),
            None => Ok(()),
        }
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Scalar(v.into())
                }
            }
        )*
    };
}

value_from_scalar!(
    Scalar, bool, String, &str, char, CimDateTime, u8, u16, u32, u64, i8, i16, i32, i64, f32, f64,
);

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Self::Array(items)
    }
}

impl From<Option<Scalar>> for Value {
    fn from(v: Option<Scalar>) -> Self {
        v.map_or(Self::Null, Self::Scalar)
    }
}
