// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instances: an ordered, name-keyed collection of properties.

use crate::codec::{CimObject, ToXml};
use crate::error::{CimError, Result};
use crate::path::InstanceName;
use crate::property::{properties_xml, Property, PropertyEntry, PropertyMap, PropertyReference, PropertyValue};
use crate::qualifier::{insert_qualifier, qualifiers_xml, Qualifier, QualifierMap};
use crate::types::Scalar;
use crate::xml::{attr, tag, Element};

/// One object instance.
///
/// Properties keep insertion order, which is also their order on the wire.
/// Reads through [`Instance::get`] unwrap to the stored value; writes
/// through [`Instance::set`] require typed values, so untyped integers,
/// floats and booleans are rejected.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    classname: String,
    properties: PropertyMap,
    qualifiers: QualifierMap,
}

impl Instance {
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            properties: PropertyMap::new(),
            qualifiers: QualifierMap::new(),
        }
    }

    /// Instance built from plain name/value pairs, each wrapped as a property.
    pub fn from_values<I, K, V>(classname: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CimObject>,
    {
        let mut inst = Self::new(classname);
        for (k, v) in values {
            inst.set(k, v)?;
        }
        Ok(inst)
    }

    pub fn builder(classname: impl Into<String>) -> InstanceBuilder {
        InstanceBuilder {
            classname: classname.into(),
            properties: Vec::new(),
            values: Vec::new(),
            qualifiers: QualifierMap::new(),
        }
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    /// Value of a property, unwrapped from its [`Property`] or
    /// [`PropertyReference`].
    pub fn get(&self, name: &str) -> Option<PropertyValue<'_>> {
        self.properties.get(name).map(PropertyEntry::value)
    }

    /// The stored property itself.
    pub fn property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.get(name)
    }

    /// Assign a property.
    ///
    /// Typed scalars, strings and sequences of those become a
    /// [`Property`] and object paths become a [`PropertyReference`], both
    /// named `name`. A ready-made [`Property`] or [`PropertyReference`] is
    /// stored under `name` as-is: it keeps its own name, which is the
    /// `NAME` it encodes with. Use [`Instance::insert`] to key an entry by
    /// its own name. Untyped numbers and booleans fail with
    /// [`CimError::Type`].
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<CimObject>) -> Result<()> {
        let name = name.into();
        let entry = entry_from_object(&name, value.into())?;
        self.properties.insert(name, entry);
        Ok(())
    }

    /// Insert a ready-made property under its own name.
    pub fn insert(&mut self, entry: impl Into<PropertyEntry>) -> Option<PropertyEntry> {
        let entry = entry.into();
        self.properties.insert(entry.name().to_string(), entry)
    }

    /// Remove a property, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<PropertyEntry> {
        self.properties.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Property names and unwrapped values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PropertyValue<'_>)> {
        self.properties
            .iter()
            .map(|(k, entry)| (k.as_str(), entry.value()))
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    pub fn add_qualifier(&mut self, qualifier: Qualifier) -> Option<Qualifier> {
        insert_qualifier(&mut self.qualifiers, qualifier)
    }
}

fn entry_from_object(name: &str, value: CimObject) -> Result<PropertyEntry> {
    match value {
        CimObject::Property(p) => Ok(PropertyEntry::Value(p)),
        CimObject::PropertyReference(r) => Ok(PropertyEntry::Reference(r)),
        CimObject::Scalar(s) => Property::new(name, s).map(PropertyEntry::Value),
        CimObject::Str(s) => Property::new(name, s).map(PropertyEntry::Value),
        CimObject::Path(p) => PropertyReference::new(name, p).map(PropertyEntry::Reference),
        CimObject::Sequence(items) => {
            let scalars = items
                .into_iter()
                .map(|item| match item {
                    CimObject::Scalar(s) => Ok(s),
                    CimObject::Str(s) => Ok(Scalar::String(s)),
                    other => Err(untyped(name, &other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Property::new(name, scalars).map(PropertyEntry::Value)
        }
        CimObject::Null => Err(CimError::construction(format!(
            "property {}: value required when type is omitted",
            name
        ))),
        other => Err(untyped(name, &other)),
    }
}

fn untyped(name: &str, value: &CimObject) -> CimError {
    log::debug!("[instance] rejecting {} value for property {}", value.kind(), name);
    CimError::type_error(format!(
        "property {}: {} value needs a typed scalar wrapper",
        name,
        value.kind()
    ))
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.classname == other.classname
                && self.properties == other.properties
                && self.qualifiers == other.qualifiers)
    }
}

impl ToXml for Instance {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::INSTANCE)
            .attr(attr::CLASSNAME, self.classname.as_str())
            .children(qualifiers_xml(&self.qualifiers)?)
            .children(properties_xml(&self.properties)?))
    }
}

/// An instance paired with the name that addresses it, as returned by
/// enumeration. Encodes to `VALUE.NAMEDINSTANCE`: the `INSTANCENAME`
/// followed by the `INSTANCE`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedInstance {
    name: InstanceName,
    instance: Instance,
}

impl NamedInstance {
    pub fn new(name: InstanceName, instance: Instance) -> Self {
        Self { name, instance }
    }

    pub fn name(&self) -> &InstanceName {
        &self.name
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_parts(self) -> (InstanceName, Instance) {
        (self.name, self.instance)
    }
}

impl ToXml for NamedInstance {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::VALUE_NAMEDINSTANCE)
            .child(self.name.to_xml()?)
            .child(self.instance.to_xml()?))
    }
}

/// Builder for [`Instance`].
///
/// Explicit properties are applied first; name/value pairs are applied
/// after them and may add or overwrite entries.
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    classname: String,
    properties: Vec<PropertyEntry>,
    values: Vec<(String, CimObject)>,
    qualifiers: QualifierMap,
}

impl InstanceBuilder {
    pub fn property(mut self, entry: impl Into<PropertyEntry>) -> Self {
        self.properties.push(entry.into());
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<CimObject>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        insert_qualifier(&mut self.qualifiers, qualifier);
        self
    }

    pub fn build(self) -> Result<Instance> {
        let mut inst = Instance::new(self.classname);
        inst.qualifiers = self.qualifiers;
        for entry in self.properties {
            inst.insert(entry);
        }
        for (name, value) in self.values {
            inst.set(name, value)?;
        }
        Ok(inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{LocalNamespacePath, ObjectPath};
    use crate::types::Value;

    #[test]
    fn test_raw_numbers_are_rejected() {
        let mut inst = Instance::new("CIM_Foo");
        assert!(matches!(inst.set("Count", 5), Err(CimError::Type(_))));
        assert!(matches!(inst.set("Ratio", 0.5), Err(CimError::Type(_))));
        assert!(matches!(inst.set("Flag", true), Err(CimError::Type(_))));
        assert!(inst.is_empty());

        inst.set("Count", Scalar::Uint32(5)).expect("typed");
        assert_eq!(
            inst.get("Count").and_then(|v| v.as_value()),
            Some(&Value::from(5u32))
        );
        let e = inst.to_xml().expect("encode");
        assert_eq!(
            e.to_string(),
            r#"<INSTANCE CLASSNAME="CIM_Foo"><PROPERTY NAME="Count" TYPE="uint32"><VALUE>5</VALUE></PROPERTY></INSTANCE>"#
        );
    }

    #[test]
    fn test_encoding_keeps_insertion_order() {
        let inst = Instance::from_values(
            "CIM_Foo",
            [
                ("Zeta", CimObject::from("z")),
                ("Alpha", Scalar::Boolean(false).into()),
                ("Mid", Scalar::Sint8(-1).into()),
            ],
        )
        .expect("instance");
        let names: Vec<_> = inst
            .to_xml()
            .expect("encode")
            .child_elements()
            .map(|e| e.attribute(attr::NAME).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_paths_become_references() {
        let mut inst = Instance::new("CIM_Assoc");
        let target = InstanceName::with_keybindings("CIM_Disk", [("Id", "d0")]);
        inst.set("Antecedent", target.clone()).expect("reference");
        match inst.property("Antecedent") {
            Some(PropertyEntry::Reference(r)) => {
                assert_eq!(r.value(), Some(&ObjectPath::from(target.clone())));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            inst.set("Bad", LocalNamespacePath::new("root")),
            Err(CimError::Construction(_))
        ));
    }

    #[test]
    fn test_ready_made_entries_are_stored_as_is() {
        let mut inst = Instance::new("CIM_Assoc");
        let owner = PropertyReference::null("Owner").with_reference_class("CIM_System");
        inst.set("Antecedent", owner.clone()).expect("reference");
        inst.set("Label", Property::new("Caption", "disk").expect("property"))
            .expect("property");

        assert_eq!(inst.property("Antecedent"), Some(&PropertyEntry::Reference(owner)));
        assert_eq!(inst.property("Label").map(PropertyEntry::name), Some("Caption"));
        let names: Vec<_> = inst
            .to_xml()
            .expect("encode")
            .child_elements()
            .map(|e| e.attribute(attr::NAME).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, ["Owner", "Caption"]);
    }

    #[test]
    fn test_sequences_become_arrays() {
        let mut inst = Instance::new("CIM_Foo");
        inst.set(
            "Names",
            vec![CimObject::from("a"), CimObject::from("b")],
        )
        .expect("array");
        let e = inst.to_xml().expect("encode");
        let prop = e.child_elements().next().expect("property");
        assert_eq!(prop.name(), tag::PROPERTY_ARRAY);
        assert!(matches!(
            inst.set("Mixed", vec![CimObject::from("a"), CimObject::Int(1)]),
            Err(CimError::Type(_))
        ));
    }

    #[test]
    fn test_builder_applies_list_then_values() {
        let inst = Instance::builder("CIM_Foo")
            .property(Property::new("A", 1u8).expect("a"))
            .property(Property::new("B", 2u8).expect("b"))
            .value("A", Scalar::Uint8(10))
            .value("C", "c")
            .build()
            .expect("instance");
        assert_eq!(inst.keys().collect::<Vec<_>>(), ["A", "B", "C"]);
        assert_eq!(
            inst.get("A").and_then(|v| v.as_value()),
            Some(&Value::from(10u8))
        );
    }

    #[test]
    fn test_equality_and_removal() {
        let mut a = Instance::from_values("CIM_Foo", [("x", "1"), ("y", "2")]).expect("a");
        let b = Instance::from_values("CIM_Foo", [("y", "2"), ("x", "1")]).expect("b");
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert!(a.remove("x").is_some());
        assert_ne!(a, b);
        assert!(!a.contains_key("x"));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_named_instance_nests_name_then_instance() {
        let name = InstanceName::with_keybindings("CIM_Foo", [("Id", "a")]);
        let inst = Instance::from_values("CIM_Foo", [("Id", "a"), ("Label", "first")])
            .expect("instance");
        let named = NamedInstance::new(name.clone(), inst.clone());
        let e = named.to_xml().expect("encode");
        assert_eq!(e.name(), tag::VALUE_NAMEDINSTANCE);
        let kinds: Vec<_> = e.child_elements().map(|c| c.name()).collect();
        assert_eq!(kinds, [tag::INSTANCENAME, tag::INSTANCE]);
        assert_eq!(named.into_parts(), (name, inst));
    }

    #[test]
    fn test_qualifiers_precede_properties() {
        let mut inst = Instance::from_values("CIM_Foo", [("x", "1")]).expect("instance");
        inst.add_qualifier(Qualifier::new("Description", "thing").expect("qualifier"));
        let kinds: Vec<_> = inst.to_xml().expect("encode").child_elements().map(|e| e.name()).collect();
        assert_eq!(kinds, [tag::QUALIFIER, tag::PROPERTY]);
    }
}
