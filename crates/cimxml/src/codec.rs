// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic encode/decode entry points.
//!
//! [`encode`] turns any [`CimObject`] into its CIM-XML element, and
//! [`decode`] turns the raw text of a `VALUE` into a typed value given its
//! type tag. Both are stateless.

use crate::class::{Class, Method};
use crate::config::boolean_token;
use crate::error::{CimError, Result};
use crate::instance::{Instance, NamedInstance};
use crate::path::{
    ClassName, ClassPath, InstanceName, InstancePath, LocalClassPath, LocalInstancePath,
    LocalNamespacePath, NamespacePath, ObjectPath,
};
use crate::property::{Property, PropertyReference};
use crate::types::{parse_boolean, CimDateTime, CimType, Scalar, Value};
use crate::xml::{tag, Element};

/// Types with a CIM-XML element form.
pub trait ToXml {
    /// Build the element tree for this value.
    fn to_xml(&self) -> Result<Element>;
}

/// Anything the encoder accepts, plus the untyped host values callers
/// hand to the collection setters.
///
/// `Int`, `Bool`, `Float` and `Str` are untyped: they carry no CIM type
/// tag. `Sequence` is an ordered list of any of the above.
#[derive(Debug, Clone, PartialEq)]
pub enum CimObject {
    Path(ObjectPath),
    Property(Property),
    PropertyReference(PropertyReference),
    Instance(Instance),
    NamedInstance(NamedInstance),
    Class(Class),
    Method(Method),
    Scalar(Scalar),
    Str(String),
    Int(i128),
    Bool(bool),
    Float(f64),
    Null,
    Sequence(Vec<CimObject>),
}

impl CimObject {
    /// Short kind label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(p) => p.kind(),
            Self::Property(_) => "Property",
            Self::PropertyReference(_) => "PropertyReference",
            Self::Instance(_) => "Instance",
            Self::NamedInstance(_) => "NamedInstance",
            Self::Class(_) => "Class",
            Self::Method(_) => "Method",
            Self::Scalar(_) => "Scalar",
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Float(_) => "float",
            Self::Null => "null",
            Self::Sequence(_) => "sequence",
        }
    }
}

macro_rules! cim_object_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for CimObject {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

cim_object_from! {
    ObjectPath => Path,
    Property => Property,
    PropertyReference => PropertyReference,
    Instance => Instance,
    NamedInstance => NamedInstance,
    Class => Class,
    Method => Method,
    Scalar => Scalar,
    String => Str,
    i128 => Int,
    bool => Bool,
    f64 => Float,
    Vec<CimObject> => Sequence,
}

macro_rules! cim_object_from_path {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CimObject {
                fn from(p: $ty) -> Self {
                    Self::Path(p.into())
                }
            }
        )*
    };
}

cim_object_from_path!(
    ClassName,
    LocalNamespacePath,
    NamespacePath,
    LocalClassPath,
    ClassPath,
    InstanceName,
    LocalInstancePath,
    InstancePath,
);

impl From<&str> for CimObject {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

macro_rules! cim_object_from_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CimObject {
                fn from(v: $ty) -> Self {
                    Self::Int(i128::from(v))
                }
            }
        )*
    };
}

cim_object_from_int!(i32, i64, u32, u64);

impl From<CimDateTime> for CimObject {
    fn from(v: CimDateTime) -> Self {
        Self::Scalar(Scalar::DateTime(v))
    }
}

impl From<Value> for CimObject {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Scalar(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::Scalar).collect()),
        }
    }
}

/// `VALUE` element carrying the canonical text of a scalar.
pub(crate) fn scalar_xml(scalar: &Scalar) -> Element {
    Element::new(tag::VALUE).text(scalar.to_canonical())
}

/// `VALUE` or `VALUE.ARRAY` for a value; `None` when the value is null.
pub(crate) fn value_xml(value: &Value) -> Option<Element> {
    match value {
        Value::Null => None,
        Value::Scalar(s) => Some(scalar_xml(s)),
        Value::Array(items) => {
            Some(Element::new(tag::VALUE_ARRAY).children(items.iter().map(scalar_xml)))
        }
    }
}

/// Encode any supported value as a CIM-XML element.
///
/// Model types use their own encoding. Typed scalars, untyped strings and
/// integers become a `VALUE` with canonical text, booleans become
/// `VALUE` with `TRUE`/`FALSE`, and sequences become `VALUE.ARRAY` with
/// each member encoded in order. Floats and null have no encoding and
/// fail with [`CimError::Type`], as does any string holding a character
/// XML 1.0 cannot carry.
pub fn encode(value: &CimObject) -> Result<Element> {
    let element = encode_element(value)?;
    if let Err(e) = element.validate() {
        log::debug!("[codec] rejecting {}: {}", value.kind(), e);
        return Err(e);
    }
    Ok(element)
}

fn encode_element(value: &CimObject) -> Result<Element> {
    match value {
        CimObject::Path(p) => p.to_xml(),
        CimObject::Property(p) => p.to_xml(),
        CimObject::PropertyReference(r) => r.to_xml(),
        CimObject::Instance(i) => i.to_xml(),
        CimObject::NamedInstance(n) => n.to_xml(),
        CimObject::Class(c) => c.to_xml(),
        CimObject::Method(m) => m.to_xml(),
        CimObject::Scalar(s) => Ok(scalar_xml(s)),
        CimObject::Str(s) => Ok(Element::new(tag::VALUE).text(s.as_str())),
        CimObject::Int(i) => Ok(Element::new(tag::VALUE).text(i.to_string())),
        CimObject::Bool(b) => Ok(Element::new(tag::VALUE).text(boolean_token(*b))),
        CimObject::Sequence(items) => {
            let members = items
                .iter()
                .map(encode_element)
                .collect::<Result<Vec<_>>>()?;
            Ok(Element::new(tag::VALUE_ARRAY).children(members))
        }
        CimObject::Float(_) | CimObject::Null => {
            log::debug!("[codec] refusing to encode {}", value.kind());
            Err(CimError::type_error(format!(
                "cannot encode value of kind {}",
                value.kind()
            )))
        }
    }
}

/// Encode and serialize in one step.
pub fn encode_to_string(value: &CimObject) -> Result<String> {
    encode(value).map(|e| e.to_string())
}

/// Raw wire text as handed to [`decode`]: absent, a string, or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Null,
    Text(String),
    List(Vec<RawValue>),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Result of [`decode`], mirroring the shape of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    Scalar(Scalar),
    List(Vec<Decoded>),
}

impl Decoded {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten into a [`Value`]; list members must be scalars.
    pub fn into_value(self) -> Result<Value> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Scalar(s) => Ok(Value::Scalar(s)),
            Self::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Self::Scalar(s) => Ok(s),
                    Self::Null => Err(CimError::value("null member in array value")),
                    Self::List(_) => Err(CimError::value("nested list in array value")),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }
}

/// Decode raw wire text into a typed value according to `type_tag`.
///
/// Lists decode member by member. Booleans accept any case of
/// `true`/`false`, strings pass through, and numeric tags are range-checked.
/// `char16` is never decodable and `datetime` must match the absolute
/// timestamp form. Null stays null for every decodable tag. Anything else
/// fails with [`CimError::Value`].
pub fn decode(type_tag: &str, raw: impl Into<RawValue>) -> Result<Decoded> {
    decode_raw(type_tag, &raw.into()).map_err(|e| {
        log::debug!("[codec] decode as {:?} failed: {}", type_tag, e);
        e
    })
}

fn decode_raw(type_tag: &str, raw: &RawValue) -> Result<Decoded> {
    if let RawValue::List(items) = raw {
        return items
            .iter()
            .map(|item| decode_raw(type_tag, item))
            .collect::<Result<Vec<_>>>()
            .map(Decoded::List);
    }

    let tag = CimType::from_name(type_tag)
        .filter(|t| *t != CimType::Reference)
        .ok_or_else(|| CimError::value(format!("Invalid type for value: {}", type_tag)))?;
    if tag == CimType::Char16 {
        return Err(CimError::value("char16 values cannot be decoded"));
    }

    let text = match raw {
        RawValue::Text(t) => t,
        _ => return Ok(Decoded::Null),
    };
    let scalar = match tag {
        CimType::Boolean => Scalar::Boolean(parse_boolean(text)?),
        CimType::String => Scalar::String(text.clone()),
        CimType::DateTime => Scalar::DateTime(CimDateTime::parse(text)?),
        _ => Scalar::construct(tag, text)?,
    };
    Ok(Decoded::Scalar(scalar))
}
