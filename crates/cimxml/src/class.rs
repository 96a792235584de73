// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class declarations: properties, methods and their parameters.
//!
//! Encoding nests children in a fixed order: qualifiers first, then
//! properties (or parameters), then methods. Each map keeps insertion
//! order.

use crate::codec::ToXml;
use crate::error::{CimError, Result};
use crate::property::{properties_xml, PropertyEntry, PropertyMap};
use crate::qualifier::{insert_qualifier, qualifiers_xml, Qualifier, QualifierMap};
use crate::types::CimType;
use crate::xml::{attr, tag, Element};
use indexmap::IndexMap;

/// A class declaration.
#[derive(Debug, Clone)]
pub struct Class {
    classname: String,
    superclass: Option<String>,
    properties: PropertyMap,
    qualifiers: QualifierMap,
    methods: IndexMap<String, Method>,
}

impl Class {
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            superclass: None,
            properties: PropertyMap::new(),
            qualifiers: QualifierMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn builder(classname: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            class: Self::new(classname),
        }
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn set_superclass(&mut self, superclass: Option<String>) {
        self.superclass = superclass;
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.get(name)
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    pub fn methods(&self) -> &IndexMap<String, Method> {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn add_property(&mut self, entry: impl Into<PropertyEntry>) -> Option<PropertyEntry> {
        let entry = entry.into();
        self.properties.insert(entry.name().to_string(), entry)
    }

    pub fn add_qualifier(&mut self, qualifier: Qualifier) -> Option<Qualifier> {
        insert_qualifier(&mut self.qualifiers, qualifier)
    }

    pub fn add_method(&mut self, method: Method) -> Option<Method> {
        self.methods.insert(method.name.clone(), method)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.classname == other.classname
                && self.superclass == other.superclass
                && self.properties == other.properties
                && self.qualifiers == other.qualifiers
                && self.methods == other.methods)
    }
}

impl ToXml for Class {
    fn to_xml(&self) -> Result<Element> {
        let methods = self
            .methods
            .values()
            .map(ToXml::to_xml)
            .collect::<Result<Vec<_>>>()?;
        Ok(Element::new(tag::CLASS)
            .attr(attr::NAME, self.classname.as_str())
            .opt_attr(attr::SUPERCLASS, self.superclass.as_deref())
            .children(qualifiers_xml(&self.qualifiers)?)
            .children(properties_xml(&self.properties)?)
            .children(methods))
    }
}

/// Builder for [`Class`].
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    class: Class,
}

impl ClassBuilder {
    pub fn superclass(mut self, superclass: impl Into<String>) -> Self {
        self.class.superclass = Some(superclass.into());
        self
    }

    pub fn property(mut self, entry: impl Into<PropertyEntry>) -> Self {
        self.class.add_property(entry);
        self
    }

    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        self.class.add_qualifier(qualifier);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.class.add_method(method);
        self
    }

    pub fn build(self) -> Class {
        self.class
    }
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    return_type: Option<CimType>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    parameters: IndexMap<String, Parameter>,
    qualifiers: QualifierMap,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            class_origin: None,
            propagated: None,
            parameters: IndexMap::new(),
            qualifiers: QualifierMap::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            method: Self::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<CimType> {
        self.return_type
    }

    pub fn class_origin(&self) -> Option<&str> {
        self.class_origin.as_deref()
    }

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
    }

    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> Option<Parameter> {
        self.parameters.insert(parameter.name.clone(), parameter)
    }

    pub fn add_qualifier(&mut self, qualifier: Qualifier) -> Option<Qualifier> {
        insert_qualifier(&mut self.qualifiers, qualifier)
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.name == other.name
                && self.return_type == other.return_type
                && self.class_origin == other.class_origin
                && self.propagated == other.propagated
                && self.parameters == other.parameters
                && self.qualifiers == other.qualifiers)
    }
}

impl ToXml for Method {
    fn to_xml(&self) -> Result<Element> {
        let parameters = self
            .parameters
            .values()
            .map(ToXml::to_xml)
            .collect::<Result<Vec<_>>>()?;
        Ok(Element::new(tag::METHOD)
            .attr(attr::NAME, self.name.as_str())
            .opt_attr(attr::TYPE, self.return_type.map(CimType::as_str))
            .opt_attr(attr::CLASSORIGIN, self.class_origin.as_deref())
            .flag_attr(attr::PROPAGATED, self.propagated)
            .children(qualifiers_xml(&self.qualifiers)?)
            .children(parameters))
    }
}

/// Builder for [`Method`].
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    method: Method,
}

impl MethodBuilder {
    pub fn return_type(mut self, cim_type: CimType) -> Self {
        self.method.return_type = Some(cim_type);
        self
    }

    pub fn class_origin(mut self, origin: impl Into<String>) -> Self {
        self.method.class_origin = Some(origin.into());
        self
    }

    pub fn propagated(mut self, flag: bool) -> Self {
        self.method.propagated = Some(flag);
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.method.add_parameter(parameter);
        self
    }

    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        self.method.add_qualifier(qualifier);
        self
    }

    pub fn build(self) -> Method {
        self.method
    }
}

/// A method parameter declaration.
///
/// Reference parameters carry an optional `reference_class` instead of a
/// primitive type.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    cim_type: CimType,
    is_array: bool,
    array_size: Option<u32>,
    reference_class: Option<String>,
    qualifiers: QualifierMap,
}

impl Parameter {
    /// Scalar parameter of a primitive type.
    pub fn new(name: impl Into<String>, cim_type: CimType) -> Result<Self> {
        let name = name.into();
        if cim_type == CimType::Reference {
            return Err(CimError::construction(format!(
                "parameter {}: use Parameter::reference for reference parameters",
                name
            )));
        }
        Ok(Self {
            name,
            cim_type,
            is_array: false,
            array_size: None,
            reference_class: None,
            qualifiers: QualifierMap::new(),
        })
    }

    /// Reference parameter, optionally restricted to `reference_class`.
    pub fn reference(name: impl Into<String>, reference_class: Option<String>) -> Self {
        Self {
            name: name.into(),
            cim_type: CimType::Reference,
            is_array: false,
            array_size: None,
            reference_class,
            qualifiers: QualifierMap::new(),
        }
    }

    /// Turn into an array parameter with an optional fixed size.
    pub fn into_array(mut self, array_size: Option<u32>) -> Self {
        self.is_array = true;
        self.array_size = array_size;
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        insert_qualifier(&mut self.qualifiers, qualifier);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_reference(&self) -> bool {
        self.cim_type == CimType::Reference
    }

    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }
}

impl ToXml for Parameter {
    fn to_xml(&self) -> Result<Element> {
        let array_size = self.array_size.map(|n| n.to_string());
        let e = match (self.is_array, self.is_reference()) {
            (false, false) => Element::new(tag::PARAMETER)
                .attr(attr::NAME, self.name.as_str())
                .attr(attr::TYPE, self.cim_type.as_str()),
            (true, false) => Element::new(tag::PARAMETER_ARRAY)
                .attr(attr::NAME, self.name.as_str())
                .attr(attr::TYPE, self.cim_type.as_str())
                .opt_attr(attr::ARRAYSIZE, array_size),
            (false, true) => Element::new(tag::PARAMETER_REFERENCE)
                .attr(attr::NAME, self.name.as_str())
                .opt_attr(attr::REFERENCECLASS, self.reference_class.as_deref()),
            (true, true) => Element::new(tag::PARAMETER_REFARRAY)
                .attr(attr::NAME, self.name.as_str())
                .opt_attr(attr::REFERENCECLASS, self.reference_class.as_deref())
                .opt_attr(attr::ARRAYSIZE, array_size),
        };
        Ok(e.children(qualifiers_xml(&self.qualifiers)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Property, PropertyReference};

    fn sample_class() -> Class {
        let method = Method::builder("Reset")
            .return_type(CimType::Uint32)
            .qualifier(Qualifier::new("Description", "Reset the device").expect("qualifier"))
            .parameter(Parameter::new("Force", CimType::Boolean).expect("param"))
            .parameter(Parameter::reference("Target", Some("CIM_Device".into())))
            .build();
        Class::builder("CIM_Device")
            .superclass("CIM_LogicalElement")
            .qualifier(Qualifier::new("Abstract", true).expect("qualifier"))
            .property(Property::new("DeviceID", "dev").expect("property"))
            .property(PropertyReference::null("Owner").with_reference_class("CIM_System"))
            .method(method)
            .build()
    }

    #[test]
    fn test_class_nests_children_in_order() {
        let e = sample_class().to_xml().expect("encode");
        assert_eq!(e.name(), tag::CLASS);
        assert_eq!(e.attribute(attr::NAME), Some("CIM_Device"));
        assert_eq!(e.attribute(attr::SUPERCLASS), Some("CIM_LogicalElement"));
        let kinds: Vec<_> = e.child_elements().map(|c| c.name()).collect();
        assert_eq!(
            kinds,
            [tag::QUALIFIER, tag::PROPERTY, tag::PROPERTY_REFERENCE, tag::METHOD]
        );
    }

    #[test]
    fn test_method_encoding() {
        let class = sample_class();
        let e = class.method("Reset").expect("method").to_xml().expect("encode");
        assert_eq!(e.attribute(attr::TYPE), Some("uint32"));
        let kinds: Vec<_> = e.child_elements().map(|c| c.name()).collect();
        assert_eq!(kinds, [tag::QUALIFIER, tag::PARAMETER, tag::PARAMETER_REFERENCE]);
    }

    #[test]
    fn test_parameter_element_selection() {
        let scalar = Parameter::new("A", CimType::String).expect("a");
        let array = Parameter::new("B", CimType::Uint8).expect("b").into_array(Some(4));
        let reference = Parameter::reference("C", None);
        let refarray = Parameter::reference("D", Some("CIM_X".into())).into_array(None);

        assert_eq!(
            scalar.to_xml().expect("a").to_string(),
            r#"<PARAMETER NAME="A" TYPE="string"/>"#
        );
        assert_eq!(
            array.to_xml().expect("b").to_string(),
            r#"<PARAMETER.ARRAY NAME="B" TYPE="uint8" ARRAYSIZE="4"/>"#
        );
        assert_eq!(
            reference.to_xml().expect("c").to_string(),
            r#"<PARAMETER.REFERENCE NAME="C"/>"#
        );
        assert_eq!(
            refarray.to_xml().expect("d").to_string(),
            r#"<PARAMETER.REFARRAY NAME="D" REFERENCECLASS="CIM_X"/>"#
        );
        assert!(Parameter::new("E", CimType::Reference).is_err());
    }

    #[test]
    fn test_nan_class_equals_itself() {
        let class = Class::builder("CIM_Gauge")
            .property(Property::new("Reading", f64::NAN).expect("property"))
            .method(
                Method::builder("Calibrate")
                    .qualifier(Qualifier::new("Offset", f64::NAN).expect("qualifier"))
                    .build(),
            )
            .build();
        let same = &class;
        assert_eq!(&class, same);
        let method = class.method("Calibrate").expect("method");
        assert_eq!(method, class.method("Calibrate").expect("method"));
        assert_ne!(class, class.clone());
    }

    #[test]
    fn test_empty_class() {
        assert_eq!(
            Class::new("CIM_Empty").to_xml().expect("encode").to_string(),
            r#"<CLASS NAME="CIM_Empty"/>"#
        );
    }
}
