// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Qualifiers: named, typed metadata attached to classes, instances,
//! properties, methods and parameters.

use crate::codec::{value_xml, ToXml};
use crate::error::{CimError, Result};
use crate::types::{CimType, Value};
use crate::xml::{attr, tag, Element};
use indexmap::IndexMap;

/// Qualifiers keyed by name, in insertion order.
pub type QualifierMap = IndexMap<String, Qualifier>;

/// A named qualifier value with its propagation flags.
///
/// Unset flags are left out of the encoding.
#[derive(Debug, Clone)]
pub struct Qualifier {
    name: String,
    cim_type: CimType,
    value: Value,
    propagated: Option<bool>,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
}

impl Qualifier {
    /// Qualifier whose type is taken from its value.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::builder(name).value(value).build()
    }

    pub fn builder(name: impl Into<String>) -> QualifierBuilder {
        QualifierBuilder {
            name: name.into(),
            cim_type: None,
            value: Value::Null,
            propagated: None,
            overridable: None,
            tosubclass: None,
            toinstance: None,
            translatable: None,
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

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
    }

    pub fn overridable(&self) -> Option<bool> {
        self.overridable
    }

    pub fn tosubclass(&self) -> Option<bool> {
        self.tosubclass
    }

    pub fn toinstance(&self) -> Option<bool> {
        self.toinstance
    }

    pub fn translatable(&self) -> Option<bool> {
        self.translatable
    }
}

impl PartialEq for Qualifier {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.name == other.name
                && self.cim_type == other.cim_type
                && self.value == other.value
                && self.propagated == other.propagated
                && self.overridable == other.overridable
                && self.tosubclass == other.tosubclass
                && self.toinstance == other.toinstance
                && self.translatable == other.translatable)
    }
}

impl ToXml for Qualifier {
    fn to_xml(&self) -> Result<Element> {
        let mut e = Element::new(tag::QUALIFIER)
            .attr(attr::NAME, self.name.as_str())
            .attr(attr::TYPE, self.cim_type.as_str())
            .flag_attr(attr::PROPAGATED, self.propagated)
            .flag_attr(attr::OVERRIDABLE, self.overridable)
            .flag_attr(attr::TOSUBCLASS, self.tosubclass)
            .flag_attr(attr::TOINSTANCE, self.toinstance)
            .flag_attr(attr::TRANSLATABLE, self.translatable);
        if let Some(v) = value_xml(&self.value) {
            e = e.child(v);
        }
        Ok(e)
    }
}

/// Builder for [`Qualifier`].
#[derive(Debug, Clone)]
pub struct QualifierBuilder {
    name: String,
    cim_type: Option<CimType>,
    value: Value,
    propagated: Option<bool>,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
}

impl QualifierBuilder {
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Declare the type explicitly; required when the value is null.
    pub fn cim_type(mut self, cim_type: CimType) -> Self {
        self.cim_type = Some(cim_type);
        self
    }

    pub fn propagated(mut self, flag: bool) -> Self {
        self.propagated = Some(flag);
        self
    }

    pub fn overridable(mut self, flag: bool) -> Self {
        self.overridable = Some(flag);
        self
    }

    pub fn tosubclass(mut self, flag: bool) -> Self {
        self.tosubclass = Some(flag);
        self
    }

    pub fn toinstance(mut self, flag: bool) -> Self {
        self.toinstance = Some(flag);
        self
    }

    pub fn translatable(mut self, flag: bool) -> Self {
        self.translatable = Some(flag);
        self
    }

    pub fn build(self) -> Result<Qualifier> {
        let cim_type = match (self.cim_type, self.value.cim_type()) {
            (Some(declared), _) => {
                self.value.check_type(declared)?;
                declared
            }
            (None, Some(inferred)) => inferred,
            (None, None) => {
                return Err(CimError::construction(format!(
                    "qualifier {}: type is required when the value is null or empty",
                    self.name
                )))
            }
        };
        if cim_type == CimType::Reference {
            return Err(CimError::construction(format!(
                "qualifier {}: reference is not a qualifier type",
                self.name
            )));
        }
        Ok(Qualifier {
            name: self.name,
            cim_type,
            value: self.value,
            propagated: self.propagated,
            overridable: self.overridable,
            tosubclass: self.tosubclass,
            toinstance: self.toinstance,
            translatable: self.translatable,
        })
    }
}

/// Encode a qualifier map in insertion order.
pub(crate) fn qualifiers_xml(qualifiers: &QualifierMap) -> Result<Vec<Element>> {
    qualifiers.values().map(ToXml::to_xml).collect()
}

/// Insert a qualifier under its own name.
pub(crate) fn insert_qualifier(qualifiers: &mut QualifierMap, qualifier: Qualifier) -> Option<Qualifier> {
    qualifiers.insert(qualifier.name().to_string(), qualifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    #[test]
    fn test_nan_qualifier_equals_itself() {
        let q = Qualifier::new("Scale", f32::NAN).expect("qualifier");
        let same = &q;
        assert_eq!(&q, same);
        assert_ne!(q, q.clone());
    }

    #[test]
    fn test_type_inferred_from_value() {
        let q = Qualifier::new("Key", true).expect("qualifier");
        assert_eq!(q.cim_type(), CimType::Boolean);
        let e = q.to_xml().expect("encode");
        assert_eq!(
            e.to_string(),
            r#"<QUALIFIER NAME="Key" TYPE="boolean"><VALUE>TRUE</VALUE></QUALIFIER>"#
        );
    }

    #[test]
    fn test_flags_rendered_when_set() {
        let q = Qualifier::builder("Description")
            .value("A thing")
            .overridable(true)
            .translatable(true)
            .tosubclass(false)
            .build()
            .expect("qualifier");
        let e = q.to_xml().expect("encode");
        assert_eq!(e.attribute(attr::OVERRIDABLE), Some("true"));
        assert_eq!(e.attribute(attr::TRANSLATABLE), Some("true"));
        assert_eq!(e.attribute(attr::TOSUBCLASS), Some("false"));
        assert_eq!(e.attribute(attr::PROPAGATED), None);
        assert_eq!(e.attribute(attr::TOINSTANCE), None);
    }

    #[test]
    fn test_array_value() {
        let q = Qualifier::new(
            "ValueMap",
            vec![Scalar::from("0"), Scalar::from("1")],
        )
        .expect("qualifier");
        let e = q.to_xml().expect("encode");
        let kids: Vec<_> = e.child_elements().collect();
        assert_eq!(kids[0].name(), tag::VALUE_ARRAY);
        assert_eq!(kids[0].child_elements().count(), 2);
    }

    #[test]
    fn test_null_value_needs_type() {
        assert!(matches!(
            Qualifier::new("Units", Value::Null),
            Err(CimError::Construction(_))
        ));
        let q = Qualifier::builder("Units")
            .cim_type(CimType::String)
            .build()
            .expect("typed null");
        assert_eq!(q.to_xml().expect("encode").child_elements().count(), 0);
    }

    #[test]
    fn test_declared_type_must_match() {
        let r = Qualifier::builder("MaxLen")
            .cim_type(CimType::Uint32)
            .value(5u8)
            .build();
        assert!(matches!(r, Err(CimError::Construction(_))));
    }
}
