// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Properties and property references.
//!
//! A [`Property`] carries a typed value (scalar, array or null). A
//! [`PropertyReference`] carries an object path instead. Both live in
//! instances and classes behind [`PropertyEntry`].

use crate::codec::{value_xml, CimObject, ToXml};
use crate::error::{CimError, Result};
use crate::path::ObjectPath;
use crate::qualifier::{insert_qualifier, qualifiers_xml, Qualifier, QualifierMap};
use crate::types::{CimType, Value};
use crate::xml::{attr, tag, Element};
use indexmap::IndexMap;

/// A named, typed property value.
///
/// Comparing a property with itself is always true, even when it holds a
/// NaN real.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    cim_type: CimType,
    value: Value,
    is_array: bool,
    array_size: Option<u32>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: QualifierMap,
}

impl Property {
    /// Property whose type and shape are taken from `value`.
    ///
    /// Fails when the value is null or an empty array, since no type can
    /// be derived from it.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::builder(name).value(value).build()
    }

    pub fn builder(name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            name: name.into(),
            value: Value::Null,
            cim_type: None,
            is_array: None,
            array_size: None,
            class_origin: None,
            propagated: None,
            qualifiers: QualifierMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    pub fn class_origin(&self) -> Option<&str> {
        self.class_origin.as_deref()
    }

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    /// Replace the value, keeping the declared type and shape.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        value.check_type(self.cim_type)?;
        check_shape(&self.name, self.is_array, &value)?;
        self.value = value;
        Ok(())
    }

    pub fn add_qualifier(&mut self, qualifier: Qualifier) -> Option<Qualifier> {
        insert_qualifier(&mut self.qualifiers, qualifier)
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.name == other.name
                && self.cim_type == other.cim_type
                && self.value == other.value
                && self.is_array == other.is_array
                && self.array_size == other.array_size
                && self.class_origin == other.class_origin
                && self.propagated == other.propagated
                && self.qualifiers == other.qualifiers)
    }
}

impl ToXml for Property {
    fn to_xml(&self) -> Result<Element> {
        let mut e = if self.is_array {
            Element::new(tag::PROPERTY_ARRAY)
                .attr(attr::NAME, self.name.as_str())
                .attr(attr::TYPE, self.cim_type.as_str())
                .opt_attr(attr::ARRAYSIZE, self.array_size.map(|n| n.to_string()))
        } else {
            Element::new(tag::PROPERTY)
                .attr(attr::NAME, self.name.as_str())
                .attr(attr::TYPE, self.cim_type.as_str())
        };
        e = e
            .opt_attr(attr::CLASSORIGIN, self.class_origin.as_deref())
            .flag_attr(attr::PROPAGATED, self.propagated)
            .children(qualifiers_xml(&self.qualifiers)?);
        if let Some(v) = value_xml(&self.value) {
            e = e.child(v);
        }
        Ok(e)
    }
}

fn check_shape(name: &str, is_array: bool, value: &Value) -> Result<()> {
    match value {
        Value::Array(_) if !is_array => Err(CimError::construction(format!(
            "property {}: array value for a scalar property",
            name
        ))),
        Value::Scalar(_) if is_array => Err(CimError::construction(format!(
            "property {}: scalar value for an array property",
            name
        ))),
        _ => Ok(()),
    }
}

/// Builder for [`Property`].
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    name: String,
    value: Value,
    cim_type: Option<CimType>,
    is_array: Option<bool>,
    array_size: Option<u32>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: QualifierMap,
}

impl PropertyBuilder {
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Declare the type; the value, if any, must carry the same tag.
    pub fn cim_type(mut self, cim_type: CimType) -> Self {
        self.cim_type = Some(cim_type);
        self
    }

    /// Declare the shape; otherwise it follows the value.
    pub fn array(mut self, is_array: bool) -> Self {
        self.is_array = Some(is_array);
        self
    }

    pub fn array_size(mut self, size: u32) -> Self {
        self.array_size = Some(size);
        self
    }

    pub fn class_origin(mut self, origin: impl Into<String>) -> Self {
        self.class_origin = Some(origin.into());
        self
    }

    pub fn propagated(mut self, flag: bool) -> Self {
        self.propagated = Some(flag);
        self
    }

    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        insert_qualifier(&mut self.qualifiers, qualifier);
        self
    }

    pub fn build(self) -> Result<Property> {
        let cim_type = match (self.cim_type, self.value.cim_type()) {
            (Some(declared), _) => {
                self.value.check_type(declared)?;
                declared
            }
            (None, Some(inferred)) => inferred,
            (None, None) => {
                return Err(CimError::construction(format!(
                    "property {}: value required when type is omitted",
                    self.name
                )))
            }
        };
        if cim_type == CimType::Reference {
            return Err(CimError::construction(format!(
                "property {}: use PropertyReference for reference values",
                self.name
            )));
        }
        let is_array = self
            .is_array
            .unwrap_or(self.array_size.is_some() || self.value.is_array());
        check_shape(&self.name, is_array, &self.value)?;
        Ok(Property {
            name: self.name,
            cim_type,
            value: self.value,
            is_array,
            array_size: self.array_size,
            class_origin: self.class_origin,
            propagated: self.propagated,
            qualifiers: self.qualifiers,
        })
    }
}

/// A property whose value is an object path.
///
/// The value is an [`ObjectPath::InstanceName`], [`ObjectPath::ClassName`],
/// [`ObjectPath::InstancePath`] or absent.
#[derive(Debug, Clone)]
pub struct PropertyReference {
    name: String,
    value: Option<ObjectPath>,
    reference_class: Option<String>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: QualifierMap,
}

impl PropertyReference {
    pub fn new(name: impl Into<String>, value: impl Into<ObjectPath>) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        check_target(&name, &value)?;
        Ok(Self {
            value: Some(value),
            ..Self::null(name)
        })
    }

    /// Reference property with no value.
    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            reference_class: None,
            class_origin: None,
            propagated: None,
            qualifiers: QualifierMap::new(),
        }
    }

    /// Build from an arbitrary value: a path or null.
    pub fn from_object(name: impl Into<String>, value: CimObject) -> Result<Self> {
        match value {
            CimObject::Path(p) => Self::new(name, p),
            CimObject::Null => Ok(Self::null(name)),
            other => Err(CimError::construction(format!(
                "reference property {}: value must be an object path or null, got {}",
                name.into(),
                other.kind()
            ))),
        }
    }

    pub fn with_reference_class(mut self, classname: impl Into<String>) -> Self {
        self.reference_class = Some(classname.into());
        self
    }

    pub fn with_class_origin(mut self, origin: impl Into<String>) -> Self {
        self.class_origin = Some(origin.into());
        self
    }

    pub fn with_propagated(mut self, flag: bool) -> Self {
        self.propagated = Some(flag);
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        insert_qualifier(&mut self.qualifiers, qualifier);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&ObjectPath> {
        self.value.as_ref()
    }

    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    pub fn class_origin(&self) -> Option<&str> {
        self.class_origin.as_deref()
    }

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    pub fn set_value(&mut self, value: Option<ObjectPath>) -> Result<()> {
        if let Some(p) = &value {
            check_target(&self.name, p)?;
        }
        self.value = value;
        Ok(())
    }

    pub fn add_qualifier(&mut self, qualifier: Qualifier) -> Option<Qualifier> {
        insert_qualifier(&mut self.qualifiers, qualifier)
    }
}

fn check_target(name: &str, path: &ObjectPath) -> Result<()> {
    match path {
        ObjectPath::InstanceName(_) | ObjectPath::ClassName(_) | ObjectPath::InstancePath(_) => {
            Ok(())
        }
        other => Err(CimError::construction(format!(
            "reference property {}: {} is not a valid reference value",
            name,
            other.kind()
        ))),
    }
}

impl PartialEq for PropertyReference {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.name == other.name
                && self.value == other.value
                && self.reference_class == other.reference_class
                && self.class_origin == other.class_origin
                && self.propagated == other.propagated
                && self.qualifiers == other.qualifiers)
    }
}

impl ToXml for PropertyReference {
    fn to_xml(&self) -> Result<Element> {
        let mut e = Element::new(tag::PROPERTY_REFERENCE)
            .attr(attr::NAME, self.name.as_str())
            .opt_attr(attr::REFERENCECLASS, self.reference_class.as_deref())
            .opt_attr(attr::CLASSORIGIN, self.class_origin.as_deref())
            .flag_attr(attr::PROPAGATED, self.propagated)
            .children(qualifiers_xml(&self.qualifiers)?);
        if let Some(path) = &self.value {
            e = e.child(Element::new(tag::VALUE_REFERENCE).child(path.to_xml()?));
        }
        Ok(e)
    }
}

/// A member of an instance or class property map.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEntry {
    Value(Property),
    Reference(PropertyReference),
}

/// Borrowed, unwrapped view of a property's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    Value(&'a Value),
    Reference(Option<&'a ObjectPath>),
}

impl<'a> PropertyValue<'a> {
    pub fn as_value(&self) -> Option<&'a Value> {
        match *self {
            Self::Value(v) => Some(v),
            Self::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&'a ObjectPath> {
        match *self {
            Self::Reference(p) => p,
            Self::Value(_) => None,
        }
    }
}

impl PropertyEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Value(p) => p.name(),
            Self::Reference(r) => r.name(),
        }
    }

    pub fn value(&self) -> PropertyValue<'_> {
        match self {
            Self::Value(p) => PropertyValue::Value(p.value()),
            Self::Reference(r) => PropertyValue::Reference(r.value()),
        }
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        match self {
            Self::Value(p) => p.qualifiers(),
            Self::Reference(r) => r.qualifiers(),
        }
    }
}

impl ToXml for PropertyEntry {
    fn to_xml(&self) -> Result<Element> {
        match self {
            Self::Value(p) => p.to_xml(),
            Self::Reference(r) => r.to_xml(),
        }
    }
}

impl From<Property> for PropertyEntry {
    fn from(p: Property) -> Self {
        Self::Value(p)
    }
}

impl From<PropertyReference> for PropertyEntry {
    fn from(r: PropertyReference) -> Self {
        Self::Reference(r)
    }
}

/// Properties keyed by name, in insertion order.
pub type PropertyMap = IndexMap<String, PropertyEntry>;

/// Encode a property map in insertion order.
pub(crate) fn properties_xml(properties: &PropertyMap) -> Result<Vec<Element>> {
    properties.values().map(ToXml::to_xml).collect()
}
