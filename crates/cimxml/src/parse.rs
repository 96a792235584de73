// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CIM-XML reader.
//!
//! Reads the elements produced by the encoder back into model values.
//! Each element is checked against its content model before it is
//! interpreted:
//!
//! - required attributes must be present;
//! - with [`CodecConfig::strict_attributes`], no other attributes may appear;
//! - child elements must come from the allowed set;
//! - non-blank text is only accepted where character data is expected.
//!
//! Violations are reported as [`CimError::Parse`] naming the element.
//! Values inside `VALUE`/`VALUE.ARRAY` are typed through [`decode`] using
//! the owning element's `TYPE` attribute.

use crate::class::{Class, Method, Parameter};
use crate::codec::{decode, CimObject, RawValue};
use crate::config::CodecConfig;
use crate::error::{CimError, Result};
use crate::instance::{Instance, NamedInstance};
use crate::path::{
    ClassName, ClassPath, InstanceName, InstancePath, KeyValue, LocalClassPath,
    LocalInstancePath, LocalNamespacePath, NamespacePath, ObjectPath,
};
use crate::property::{Property, PropertyEntry, PropertyReference};
use crate::qualifier::Qualifier;
use crate::types::{parse_boolean, CimType, Value};
use crate::xml::{attr, tag};
use roxmltree::{Document, Node};

/// Parse one CIM-XML element into the matching model value.
///
/// `VALUE` and `VALUE.ARRAY` outside of a typed owner come back as untyped
/// strings, `KEYVALUE` as an untyped integer, boolean or string.
pub fn parse_object(xml: &str, config: &CodecConfig) -> Result<CimObject> {
    let doc = Document::parse(xml)?;
    Reader { config }.object(doc.root_element())
}

/// Parse an `INSTANCE` element.
pub fn parse_instance(xml: &str, config: &CodecConfig) -> Result<Instance> {
    match parse_object(xml, config)? {
        CimObject::Instance(i) => Ok(i),
        other => Err(unexpected_kind("Instance", &other)),
    }
}

/// Parse a `VALUE.NAMEDINSTANCE` element.
pub fn parse_named_instance(xml: &str, config: &CodecConfig) -> Result<NamedInstance> {
    match parse_object(xml, config)? {
        CimObject::NamedInstance(n) => Ok(n),
        other => Err(unexpected_kind("NamedInstance", &other)),
    }
}

/// Parse a `CLASS` element.
pub fn parse_class(xml: &str, config: &CodecConfig) -> Result<Class> {
    match parse_object(xml, config)? {
        CimObject::Class(c) => Ok(c),
        other => Err(unexpected_kind("Class", &other)),
    }
}

/// Parse any path element, or a `VALUE.REFERENCE` wrapping one.
pub fn parse_path(xml: &str, config: &CodecConfig) -> Result<ObjectPath> {
    match parse_object(xml, config)? {
        CimObject::Path(p) => Ok(p),
        other => Err(unexpected_kind("object path", &other)),
    }
}

fn unexpected_kind(expected: &str, got: &CimObject) -> CimError {
    CimError::parse(format!("expected {}, found {}", expected, got.kind()))
}

const PROPERTY_ELEMENTS: &[&str] = &[tag::PROPERTY, tag::PROPERTY_ARRAY, tag::PROPERTY_REFERENCE];

const PATH_ELEMENTS: &[&str] = &[
    tag::CLASSPATH,
    tag::LOCALCLASSPATH,
    tag::CLASSNAME,
    tag::INSTANCEPATH,
    tag::LOCALINSTANCEPATH,
    tag::INSTANCENAME,
];

const EMBEDDED_OBJECT_ATTRS: &[&str] = &["EmbeddedObject", "EMBEDDEDOBJECT"];

fn name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

fn kids<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// Concatenated character data of the direct text children.
fn pcdata(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        CimError::parse(format!(
            "Element {:?} misses required attribute {:?}",
            name(node),
            attribute
        ))
    })
}

fn one_child<'a, 'input>(node: Node<'a, 'input>, acceptable: &[&str]) -> Result<Node<'a, 'input>> {
    let mut it = kids(node);
    match (it.next(), it.next()) {
        (Some(child), None) if acceptable.contains(&name(child)) => Ok(child),
        (Some(child), None) => Err(CimError::parse(format!(
            "Element {:?} has invalid child element {:?} (allowed is one of {:?})",
            name(node),
            name(child),
            acceptable
        ))),
        (None, _) => Err(CimError::parse(format!(
            "Element {:?} misses required child element {:?}",
            name(node),
            acceptable
        ))),
        (Some(_), Some(_)) => Err(CimError::parse(format!(
            "Element {:?} has too many child elements (allowed is one of {:?})",
            name(node),
            acceptable
        ))),
    }
}

/// `true`/`false` flag attribute, any case.
fn flag(node: Node<'_, '_>, attribute: &str) -> Result<Option<bool>> {
    node.attribute(attribute)
        .map(|v| {
            parse_boolean(v).map_err(|_| {
                CimError::parse(format!(
                    "Invalid value {:?} for {} on {:?}",
                    v,
                    attribute,
                    name(node)
                ))
            })
        })
        .transpose()
}

fn array_size(node: Node<'_, '_>) -> Result<Option<u32>> {
    node.attribute(attr::ARRAYSIZE)
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| {
                CimError::parse(format!(
                    "Element {:?} has invalid ARRAYSIZE {:?}",
                    name(node),
                    v
                ))
            })
        })
        .transpose()
}

fn cim_type(node: Node<'_, '_>) -> Result<CimType> {
    let text = required(node, attr::TYPE)?;
    CimType::from_name(text).ok_or_else(|| {
        CimError::parse(format!(
            "Element {:?} has invalid TYPE {:?}",
            name(node),
            text
        ))
    })
}

struct Reader<'c> {
    config: &'c CodecConfig,
}

impl Reader<'_> {
    /// Check attributes, children and text of `node` against its content
    /// model. `children: None` leaves child validation to the caller.
    fn check(
        &self,
        node: Node<'_, '_>,
        required_attrs: &[&str],
        optional_attrs: &[&str],
        children: Option<&[&str]>,
        allow_pcdata: bool,
    ) -> Result<()> {
        let element = name(node);
        for a in required_attrs {
            required(node, a)?;
        }
        for a in node.attributes() {
            if required_attrs.contains(&a.name()) || optional_attrs.contains(&a.name()) {
                continue;
            }
            if self.config.strict_attributes {
                return Err(CimError::parse(format!(
                    "Element {:?} has invalid attribute {:?}",
                    element,
                    a.name()
                )));
            }
            log::debug!("[parse] ignoring attribute {} on {}", a.name(), element);
        }
        if let Some(allowed) = children {
            if let Some(child) = kids(node).find(|c| !allowed.contains(&name(*c))) {
                return Err(CimError::parse(format!(
                    "Element {:?} has invalid child element {:?} (allowed are {:?})",
                    element,
                    name(child),
                    allowed
                )));
            }
        }
        if !allow_pcdata {
            let stray = node
                .children()
                .filter(Node::is_text)
                .filter_map(|n| n.text())
                .find(|t| !t.trim().is_empty());
            if let Some(text) = stray {
                return Err(CimError::parse(format!(
                    "Element {:?} has unexpected non-blank text content {:?}",
                    element, text
                )));
            }
        }
        Ok(())
    }

    fn object(&self, node: Node<'_, '_>) -> Result<CimObject> {
        log::trace!("[parse] <{}>", name(node));
        match name(node) {
            tag::INSTANCE => self.instance(node).map(CimObject::Instance),
            tag::VALUE_NAMEDINSTANCE => self
                .named_instance(node)
                .map(CimObject::NamedInstance),
            tag::CLASS => self.class(node).map(CimObject::Class),
            tag::METHOD => self.method(node).map(CimObject::Method),
            tag::PROPERTY => self.property(node).map(CimObject::Property),
            tag::PROPERTY_ARRAY => self.property_array(node).map(CimObject::Property),
            tag::PROPERTY_REFERENCE => self
                .property_reference(node)
                .map(CimObject::PropertyReference),
            tag::VALUE_REFERENCE => self.value_reference(node).map(CimObject::Path),
            tag::LOCALNAMESPACEPATH => self
                .local_namespace_path(node)
                .map(|p| CimObject::Path(p.into())),
            tag::NAMESPACEPATH => self.namespace_path(node).map(|p| CimObject::Path(p.into())),
            tag::KEYVALUE => self.key_value(node).map(|kv| match kv {
                KeyValue::Int(i) => CimObject::Int(i),
                KeyValue::Bool(b) => CimObject::Bool(b),
                KeyValue::Str(s) => CimObject::Str(s),
                KeyValue::Reference(p) => CimObject::Path(*p),
            }),
            tag::VALUE => self.value_text(node).map(CimObject::Str),
            tag::VALUE_ARRAY => self
                .value_array_texts(node)
                .map(|items| CimObject::Sequence(items.into_iter().map(CimObject::Str).collect())),
            other if PATH_ELEMENTS.contains(&other) => self.path(node).map(CimObject::Path),
            other => Err(CimError::parse(format!(
                "Element {:?} is not a supported top-level element",
                other
            ))),
        }
    }

    fn path(&self, node: Node<'_, '_>) -> Result<ObjectPath> {
        match name(node) {
            tag::CLASSNAME => self.classname(node).map(Into::into),
            tag::LOCALCLASSPATH => self.local_class_path(node).map(Into::into),
            tag::CLASSPATH => self.class_path(node).map(Into::into),
            tag::INSTANCENAME => self.instance_name(node).map(Into::into),
            tag::LOCALINSTANCEPATH => self.local_instance_path(node).map(Into::into),
            tag::INSTANCEPATH => self.instance_path(node).map(Into::into),
            other => Err(CimError::parse(format!(
                "Element {:?} is not a path element",
                other
            ))),
        }
    }

    fn classname(&self, node: Node<'_, '_>) -> Result<ClassName> {
        self.check(node, &[attr::NAME], &[], Some(&[]), false)?;
        Ok(ClassName::new(required(node, attr::NAME)?))
    }

    fn local_namespace_path(&self, node: Node<'_, '_>) -> Result<LocalNamespacePath> {
        self.check(node, &[], &[], Some(&[tag::NAMESPACE]), false)?;
        let segments = kids(node)
            .map(|ns| {
                self.check(ns, &[attr::NAME], &[], Some(&[]), false)?;
                required(ns, attr::NAME)
            })
            .collect::<Result<Vec<_>>>()?;
        if segments.is_empty() && !self.config.allow_empty_namespace {
            return Err(CimError::parse(format!(
                "Element {:?} misses required child element {:?}",
                tag::LOCALNAMESPACEPATH,
                tag::NAMESPACE
            )));
        }
        Ok(LocalNamespacePath::from_segments(segments))
    }

    fn host(&self, node: Node<'_, '_>) -> Result<String> {
        self.check(node, &[], &[], Some(&[]), true)?;
        let host = pcdata(node).trim().to_string();
        if host.is_empty() {
            return Err(CimError::parse("Element \"HOST\" has no content"));
        }
        Ok(host)
    }

    fn namespace_path(&self, node: Node<'_, '_>) -> Result<NamespacePath> {
        self.check(node, &[], &[], Some(&[tag::HOST, tag::LOCALNAMESPACEPATH]), false)?;
        let (host, namespace) = self.host_and_namespace(node)?;
        let path = NamespacePath::new(namespace);
        Ok(match host {
            Some(h) => path.with_host(h)?,
            None => path,
        })
    }

    /// Children of `NAMESPACEPATH`: an optional `HOST`, then `LOCALNAMESPACEPATH`.
    fn host_and_namespace(&self, node: Node<'_, '_>) -> Result<(Option<String>, LocalNamespacePath)> {
        let children: Vec<_> = kids(node).collect();
        match children.as_slice() {
            [ns] if name(*ns) == tag::LOCALNAMESPACEPATH => {
                Ok((None, self.local_namespace_path(*ns)?))
            }
            [host, ns] if name(*host) == tag::HOST && name(*ns) == tag::LOCALNAMESPACEPATH => {
                Ok((Some(self.host(*host)?), self.local_namespace_path(*ns)?))
            }
            _ => Err(CimError::parse(format!(
                "Element {:?} expects child elements (HOST?, LOCALNAMESPACEPATH)",
                name(node)
            ))),
        }
    }

    /// Two children in fixed order; returns them for the caller to parse.
    fn pair<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        first: &str,
        second: &str,
    ) -> Result<(Node<'a, 'input>, Node<'a, 'input>)> {
        self.check(node, &[], &[], Some(&[first, second]), false)?;
        let children: Vec<_> = kids(node).collect();
        match children.as_slice() {
            [a, b] if name(*a) == first && name(*b) == second => Ok((*a, *b)),
            _ => Err(CimError::parse(format!(
                "Element {:?} expects child elements ({}, {})",
                name(node),
                first,
                second
            ))),
        }
    }

    fn local_class_path(&self, node: Node<'_, '_>) -> Result<LocalClassPath> {
        let (ns, cn) = self.pair(node, tag::LOCALNAMESPACEPATH, tag::CLASSNAME)?;
        Ok(LocalClassPath::new(
            self.local_namespace_path(ns)?,
            self.classname(cn)?,
        ))
    }

    fn class_path(&self, node: Node<'_, '_>) -> Result<ClassPath> {
        let (nsp, cn) = self.pair(node, tag::NAMESPACEPATH, tag::CLASSNAME)?;
        self.check(nsp, &[], &[], Some(&[tag::HOST, tag::LOCALNAMESPACEPATH]), false)?;
        let (host, namespace) = self.host_and_namespace(nsp)?;
        let path = ClassPath::new(namespace, self.classname(cn)?);
        Ok(match host {
            Some(h) => path.with_host(h)?,
            None => path,
        })
    }

    fn local_instance_path(&self, node: Node<'_, '_>) -> Result<LocalInstancePath> {
        let (ns, iname) = self.pair(node, tag::LOCALNAMESPACEPATH, tag::INSTANCENAME)?;
        Ok(LocalInstancePath::new(
            self.local_namespace_path(ns)?,
            self.instance_name(iname)?,
        ))
    }

    fn instance_path(&self, node: Node<'_, '_>) -> Result<InstancePath> {
        let (nsp, iname) = self.pair(node, tag::NAMESPACEPATH, tag::INSTANCENAME)?;
        self.check(nsp, &[], &[], Some(&[tag::HOST, tag::LOCALNAMESPACEPATH]), false)?;
        let (host, namespace) = self.host_and_namespace(nsp)?;
        let path = InstancePath::new(namespace, self.instance_name(iname)?);
        Ok(match host {
            Some(h) => path.with_host(h)?,
            None => path,
        })
    }

    /// `INSTANCENAME (KEYBINDING* | KEYVALUE? | VALUE.REFERENCE?)`
    fn instance_name(&self, node: Node<'_, '_>) -> Result<InstanceName> {
        self.check(
            node,
            &[attr::CLASSNAME],
            &[],
            Some(&[tag::KEYBINDING, tag::KEYVALUE, tag::VALUE_REFERENCE]),
            false,
        )?;
        let classname = required(node, attr::CLASSNAME)?;
        let children: Vec<_> = kids(node).collect();
        match children.first().map(|c| name(*c)) {
            None => Ok(InstanceName::new(classname)),
            Some(tag::KEYBINDING) => {
                let mut iname = InstanceName::new(classname);
                for kb in children {
                    if name(kb) != tag::KEYBINDING {
                        return Err(CimError::parse(format!(
                            "Element {:?} mixes KEYBINDING with {:?}",
                            tag::INSTANCENAME,
                            name(kb)
                        )));
                    }
                    let (key, value) = self.key_binding(kb)?;
                    iname.set(key, value);
                }
                Ok(iname)
            }
            Some(tag::KEYVALUE) if children.len() == 1 => {
                let value = self.key_value(children[0])?;
                InstanceName::single(classname, value)
                    .map_err(|e| CimError::parse(format!("Element {:?}: {}", tag::INSTANCENAME, e)))
            }
            Some(other) => Err(CimError::parse(format!(
                "Element {:?} has unsupported child elements starting with {:?}",
                tag::INSTANCENAME,
                other
            ))),
        }
    }

    fn key_binding(&self, node: Node<'_, '_>) -> Result<(String, KeyValue)> {
        self.check(
            node,
            &[attr::NAME],
            &[],
            Some(&[tag::KEYVALUE, tag::VALUE_REFERENCE]),
            false,
        )?;
        let key = required(node, attr::NAME)?.to_string();
        let child = one_child(node, &[tag::KEYVALUE, tag::VALUE_REFERENCE])?;
        let value = if name(child) == tag::KEYVALUE {
            self.key_value(child)?
        } else {
            KeyValue::Reference(Box::new(self.value_reference(child)?))
        };
        Ok((key, value))
    }

    /// `KEYVALUE` typed by `VALUETYPE`, which defaults to `string`.
    fn key_value(&self, node: Node<'_, '_>) -> Result<KeyValue> {
        self.check(node, &[], &[attr::VALUETYPE, attr::TYPE], Some(&[]), true)?;
        let text = pcdata(node);
        match node.attribute(attr::VALUETYPE).unwrap_or("string") {
            "string" => Ok(KeyValue::Str(text)),
            "boolean" => parse_boolean(&text).map(KeyValue::Bool).map_err(|_| {
                CimError::parse(format!(
                    "Element {:?} has invalid boolean content {:?}",
                    tag::KEYVALUE,
                    text
                ))
            }),
            "numeric" => text.trim().parse::<i128>().map(KeyValue::Int).map_err(|_| {
                CimError::parse(format!(
                    "Element {:?} has invalid numeric content {:?}",
                    tag::KEYVALUE,
                    text
                ))
            }),
            other => Err(CimError::parse(format!(
                "Element {:?} has invalid VALUETYPE {:?}",
                tag::KEYVALUE,
                other
            ))),
        }
    }

    fn value_reference(&self, node: Node<'_, '_>) -> Result<ObjectPath> {
        self.check(node, &[], &[], Some(PATH_ELEMENTS), false)?;
        self.path(one_child(node, PATH_ELEMENTS)?)
    }

    fn value_text(&self, node: Node<'_, '_>) -> Result<String> {
        self.check(node, &[], &[], Some(&[]), true)?;
        Ok(pcdata(node))
    }

    fn value_array_texts(&self, node: Node<'_, '_>) -> Result<Vec<String>> {
        self.check(node, &[], &[], Some(&[tag::VALUE]), false)?;
        kids(node).map(|v| self.value_text(v)).collect()
    }

    /// The optional `VALUE` or `VALUE.ARRAY` child of a typed element.
    fn typed_value(&self, node: Node<'_, '_>, cim_type: CimType) -> Result<Value> {
        let mut values = kids(node).filter(|c| matches!(name(*c), tag::VALUE | tag::VALUE_ARRAY));
        let child = match (values.next(), values.next()) {
            (None, _) => return Ok(Value::Null),
            (Some(child), None) => child,
            (Some(_), Some(_)) => {
                return Err(CimError::parse(format!(
                    "Element {:?} has more than one VALUE or VALUE.ARRAY child",
                    name(node)
                )))
            }
        };
        let raw = if name(child) == tag::VALUE_ARRAY {
            RawValue::List(
                self.value_array_texts(child)?
                    .into_iter()
                    .map(RawValue::Text)
                    .collect(),
            )
        } else {
            let text = self.value_text(child)?;
            if text.is_empty() && cim_type != CimType::String {
                return Ok(Value::Null);
            }
            RawValue::Text(text)
        };
        decode(cim_type.as_str(), raw)
            .and_then(|d| d.into_value())
            .map_err(|e| {
                CimError::parse(format!(
                    "Cannot parse VALUE content of {:?} element with name {:?}: {}",
                    name(node),
                    node.attribute(attr::NAME).unwrap_or_default(),
                    e
                ))
            })
    }

    fn qualifiers<'a, 'input: 'a>(
        &self,
        nodes: impl Iterator<Item = Node<'a, 'input>>,
    ) -> Result<Vec<Qualifier>> {
        nodes
            .filter(|c| name(*c) == tag::QUALIFIER)
            .map(|c| self.qualifier(c))
            .collect()
    }

    fn qualifier(&self, node: Node<'_, '_>) -> Result<Qualifier> {
        self.check(
            node,
            &[attr::NAME, attr::TYPE],
            &[
                attr::OVERRIDABLE,
                attr::TOSUBCLASS,
                attr::TOINSTANCE,
                attr::TRANSLATABLE,
                attr::PROPAGATED,
            ],
            Some(&[tag::VALUE, tag::VALUE_ARRAY]),
            false,
        )?;
        let cim_type = cim_type(node)?;
        let mut b = Qualifier::builder(required(node, attr::NAME)?)
            .cim_type(cim_type)
            .value(self.typed_value(node, cim_type)?);
        if let Some(f) = flag(node, attr::PROPAGATED)? {
            b = b.propagated(f);
        }
        if let Some(f) = flag(node, attr::OVERRIDABLE)? {
            b = b.overridable(f);
        }
        if let Some(f) = flag(node, attr::TOSUBCLASS)? {
            b = b.tosubclass(f);
        }
        if let Some(f) = flag(node, attr::TOINSTANCE)? {
            b = b.toinstance(f);
        }
        if let Some(f) = flag(node, attr::TRANSLATABLE)? {
            b = b.translatable(f);
        }
        b.build()
    }

    fn property(&self, node: Node<'_, '_>) -> Result<Property> {
        let optional = [&[attr::CLASSORIGIN, attr::PROPAGATED][..], EMBEDDED_OBJECT_ATTRS].concat();
        self.check(
            node,
            &[attr::NAME, attr::TYPE],
            &optional,
            Some(&[tag::QUALIFIER, tag::VALUE]),
            false,
        )?;
        self.property_common(node, false)
    }

    fn property_array(&self, node: Node<'_, '_>) -> Result<Property> {
        let optional = [
            &[attr::ARRAYSIZE, attr::CLASSORIGIN, attr::PROPAGATED][..],
            EMBEDDED_OBJECT_ATTRS,
        ]
        .concat();
        self.check(
            node,
            &[attr::NAME, attr::TYPE],
            &optional,
            Some(&[tag::QUALIFIER, tag::VALUE_ARRAY]),
            false,
        )?;
        self.property_common(node, true)
    }

    fn property_common(&self, node: Node<'_, '_>, is_array: bool) -> Result<Property> {
        if EMBEDDED_OBJECT_ATTRS.iter().any(|a| node.attribute(*a).is_some()) {
            log::debug!(
                "[parse] embedded object marker on {:?} kept as plain string",
                node.attribute(attr::NAME).unwrap_or_default()
            );
        }
        let cim_type = cim_type(node)?;
        let mut b = Property::builder(required(node, attr::NAME)?)
            .cim_type(cim_type)
            .array(is_array)
            .value(self.typed_value(node, cim_type)?);
        if let Some(size) = array_size(node)? {
            b = b.array_size(size);
        }
        if let Some(origin) = node.attribute(attr::CLASSORIGIN) {
            b = b.class_origin(origin);
        }
        if let Some(f) = flag(node, attr::PROPAGATED)? {
            b = b.propagated(f);
        }
        for q in self.qualifiers(kids(node))? {
            b = b.qualifier(q);
        }
        b.build()
    }

    fn property_reference(&self, node: Node<'_, '_>) -> Result<PropertyReference> {
        self.check(
            node,
            &[attr::NAME],
            &[attr::REFERENCECLASS, attr::CLASSORIGIN, attr::PROPAGATED],
            Some(&[tag::QUALIFIER, tag::VALUE_REFERENCE]),
            false,
        )?;
        let prop_name = required(node, attr::NAME)?;
        let mut refs = kids(node).filter(|c| name(*c) == tag::VALUE_REFERENCE);
        let mut r = match (refs.next(), refs.next()) {
            (None, _) => PropertyReference::null(prop_name),
            (Some(v), None) => PropertyReference::new(prop_name, self.value_reference(v)?)?,
            (Some(_), Some(_)) => {
                return Err(CimError::parse(format!(
                    "Element {:?} has more than one VALUE.REFERENCE child",
                    tag::PROPERTY_REFERENCE
                )))
            }
        };
        if let Some(rc) = node.attribute(attr::REFERENCECLASS) {
            r = r.with_reference_class(rc);
        }
        if let Some(origin) = node.attribute(attr::CLASSORIGIN) {
            r = r.with_class_origin(origin);
        }
        if let Some(f) = flag(node, attr::PROPAGATED)? {
            r = r.with_propagated(f);
        }
        for q in self.qualifiers(kids(node))? {
            r = r.with_qualifier(q);
        }
        Ok(r)
    }

    fn property_entry(&self, node: Node<'_, '_>) -> Result<PropertyEntry> {
        match name(node) {
            tag::PROPERTY => self.property(node).map(Into::into),
            tag::PROPERTY_ARRAY => self.property_array(node).map(Into::into),
            _ => self.property_reference(node).map(Into::into),
        }
    }

    fn instance(&self, node: Node<'_, '_>) -> Result<Instance> {
        let allowed = [&[tag::QUALIFIER][..], PROPERTY_ELEMENTS].concat();
        self.check(node, &[attr::CLASSNAME], &[], Some(allowed.as_slice()), false)?;
        let mut inst = Instance::new(required(node, attr::CLASSNAME)?);
        for q in self.qualifiers(kids(node))? {
            inst.add_qualifier(q);
        }
        for child in kids(node).filter(|c| PROPERTY_ELEMENTS.contains(&name(*c))) {
            inst.insert(self.property_entry(child)?);
        }
        Ok(inst)
    }

    /// `VALUE.NAMEDINSTANCE (INSTANCENAME, INSTANCE)`
    fn named_instance(&self, node: Node<'_, '_>) -> Result<NamedInstance> {
        let (iname, inst) = self.pair(node, tag::INSTANCENAME, tag::INSTANCE)?;
        Ok(NamedInstance::new(
            self.instance_name(iname)?,
            self.instance(inst)?,
        ))
    }

    fn class(&self, node: Node<'_, '_>) -> Result<Class> {
        let allowed = [&[tag::QUALIFIER, tag::METHOD][..], PROPERTY_ELEMENTS].concat();
        self.check(node, &[attr::NAME], &[attr::SUPERCLASS], Some(allowed.as_slice()), false)?;
        let mut class = Class::new(required(node, attr::NAME)?);
        class.set_superclass(node.attribute(attr::SUPERCLASS).map(str::to_string));
        for q in self.qualifiers(kids(node))? {
            class.add_qualifier(q);
        }
        for child in kids(node) {
            match name(child) {
                tag::METHOD => {
                    class.add_method(self.method(child)?);
                }
                n if PROPERTY_ELEMENTS.contains(&n) => {
                    class.add_property(self.property_entry(child)?);
                }
                _ => {}
            }
        }
        Ok(class)
    }

    fn method(&self, node: Node<'_, '_>) -> Result<Method> {
        self.check(
            node,
            &[attr::NAME],
            &[attr::TYPE, attr::CLASSORIGIN, attr::PROPAGATED],
            Some(&[
                tag::QUALIFIER,
                tag::PARAMETER,
                tag::PARAMETER_REFERENCE,
                tag::PARAMETER_ARRAY,
                tag::PARAMETER_REFARRAY,
            ]),
            false,
        )?;
        let mut b = Method::builder(required(node, attr::NAME)?);
        if node.attribute(attr::TYPE).is_some() {
            b = b.return_type(cim_type(node)?);
        }
        if let Some(origin) = node.attribute(attr::CLASSORIGIN) {
            b = b.class_origin(origin);
        }
        if let Some(f) = flag(node, attr::PROPAGATED)? {
            b = b.propagated(f);
        }
        for q in self.qualifiers(kids(node))? {
            b = b.qualifier(q);
        }
        for child in kids(node).filter(|c| name(*c) != tag::QUALIFIER) {
            b = b.parameter(self.parameter(child)?);
        }
        Ok(b.build())
    }

    fn parameter(&self, node: Node<'_, '_>) -> Result<Parameter> {
        let quals = Some(&[tag::QUALIFIER][..]);
        let param_name = required(node, attr::NAME)?;
        let param = match name(node) {
            tag::PARAMETER => {
                self.check(node, &[attr::NAME, attr::TYPE], &[], quals, false)?;
                Parameter::new(param_name, cim_type(node)?)?
            }
            tag::PARAMETER_ARRAY => {
                self.check(node, &[attr::NAME, attr::TYPE], &[attr::ARRAYSIZE], quals, false)?;
                Parameter::new(param_name, cim_type(node)?)?.into_array(array_size(node)?)
            }
            tag::PARAMETER_REFERENCE => {
                self.check(node, &[attr::NAME], &[attr::REFERENCECLASS], quals, false)?;
                Parameter::reference(
                    param_name,
                    node.attribute(attr::REFERENCECLASS).map(str::to_string),
                )
            }
            _ => {
                self.check(
                    node,
                    &[attr::NAME],
                    &[attr::REFERENCECLASS, attr::ARRAYSIZE],
                    quals,
                    false,
                )?;
                Parameter::reference(
                    param_name,
                    node.attribute(attr::REFERENCECLASS).map(str::to_string),
                )
                .into_array(array_size(node)?)
            }
        };
        Ok(self
            .qualifiers(kids(node))?
            .into_iter()
            .fold(param, Parameter::with_qualifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, ToXml};
    use crate::types::Scalar;

    fn cfg() -> CodecConfig {
        CodecConfig::default()
    }

    #[test]
    fn test_parse_instance_name() {
        let xml = r#"<INSTANCENAME CLASSNAME="CIM_Foo">
            <KEYBINDING NAME="Count"><KEYVALUE VALUETYPE="numeric"> 42 </KEYVALUE></KEYBINDING>
            <KEYBINDING NAME="On"><KEYVALUE VALUETYPE="boolean">true</KEYVALUE></KEYBINDING>
            <KEYBINDING NAME="Foo"><KEYVALUE VALUETYPE="string">Bar</KEYVALUE></KEYBINDING>
        </INSTANCENAME>"#;
        let path = parse_path(xml, &cfg()).expect("parse");
        let expected = InstanceName::with_keybindings(
            "CIM_Foo",
            [
                ("Count", KeyValue::Int(42)),
                ("On", KeyValue::Bool(true)),
                ("Foo", KeyValue::Str("Bar".into())),
            ],
        );
        assert_eq!(path, ObjectPath::InstanceName(expected));
    }

    #[test]
    fn test_numeric_keys_cover_uint64_and_sint64() {
        let xml = r#"<INSTANCENAME CLASSNAME="CIM_Big">
            <KEYBINDING NAME="Max"><KEYVALUE VALUETYPE="numeric">18446744073709551615</KEYVALUE></KEYBINDING>
            <KEYBINDING NAME="Min"><KEYVALUE VALUETYPE="numeric">-9223372036854775808</KEYVALUE></KEYBINDING>
        </INSTANCENAME>"#;
        let expected = InstanceName::with_keybindings(
            "CIM_Big",
            [("Max", KeyValue::from(u64::MAX)), ("Min", KeyValue::from(i64::MIN))],
        );
        assert_eq!(
            parse_path(xml, &cfg()).expect("parse"),
            ObjectPath::InstanceName(expected)
        );
        let bad = r#"<KEYVALUE VALUETYPE="numeric">12x</KEYVALUE>"#;
        assert!(matches!(parse_object(bad, &cfg()), Err(CimError::Parse(_))));
    }

    #[test]
    fn test_named_instance_requires_name_then_instance() {
        let xml = concat!(
            r#"<VALUE.NAMEDINSTANCE><INSTANCENAME CLASSNAME="CIM_Foo">"#,
            r#"<KEYBINDING NAME="Id"><KEYVALUE VALUETYPE="string">a</KEYVALUE></KEYBINDING>"#,
            r#"</INSTANCENAME><INSTANCE CLASSNAME="CIM_Foo">"#,
            r#"<PROPERTY NAME="Id" TYPE="string"><VALUE>a</VALUE></PROPERTY>"#,
            r#"</INSTANCE></VALUE.NAMEDINSTANCE>"#
        );
        let named = parse_named_instance(xml, &cfg()).expect("named instance");
        assert_eq!(named.name().classname(), "CIM_Foo");
        assert_eq!(named.name().get("Id"), Some(&KeyValue::from("a")));
        assert_eq!(named.instance().keys().collect::<Vec<_>>(), ["Id"]);

        let swapped = concat!(
            r#"<VALUE.NAMEDINSTANCE><INSTANCE CLASSNAME="CIM_Foo"/>"#,
            r#"<INSTANCENAME CLASSNAME="CIM_Foo"/></VALUE.NAMEDINSTANCE>"#
        );
        assert!(matches!(parse_named_instance(swapped, &cfg()), Err(CimError::Parse(_))));
        let missing = r#"<VALUE.NAMEDINSTANCE><INSTANCE CLASSNAME="CIM_Foo"/></VALUE.NAMEDINSTANCE>"#;
        assert!(matches!(parse_object(missing, &cfg()), Err(CimError::Parse(_))));
        assert!(parse_named_instance(r#"<INSTANCE CLASSNAME="CIM_Foo"/>"#, &cfg()).is_err());
    }

    #[test]
    fn test_instance_round_trip() {
        let mut inst = Instance::new("CIM_Disk");
        inst.set("Name", "disk<0>").expect("name");
        inst.set("Size", Scalar::Uint64(1 << 40)).expect("size");
        inst.set("Ratio", Scalar::Real32(0.25)).expect("ratio");
        inst.set("Tags", vec![CimObject::from("a"), CimObject::from("")]).expect("tags");
        inst.set("Empty", "").expect("empty");
        inst.insert(Property::builder("Missing").cim_type(CimType::Uint8).build().expect("null"));
        let xml = inst.to_xml().expect("encode").to_string();
        assert_eq!(parse_instance(&xml, &cfg()).expect("parse"), inst);
    }

    #[test]
    fn test_strict_attributes() {
        let xml = r#"<CLASSNAME NAME="CIM_Foo" EXTRA="1"/>"#;
        assert!(matches!(parse_object(xml, &cfg()), Err(CimError::Parse(_))));
        let lenient = parse_object(xml, &CodecConfig::lenient()).expect("lenient");
        assert_eq!(lenient, CimObject::from(ClassName::new("CIM_Foo")));
    }

    #[test]
    fn test_missing_attribute_and_bad_children() {
        match parse_object("<CLASSNAME/>", &cfg()) {
            Err(CimError::Parse(msg)) => assert!(msg.contains("NAME")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_object(r#"<CLASSNAME NAME="A"><HOST/></CLASSNAME>"#, &cfg()).is_err());
        assert!(parse_object(r#"<CLASSNAME NAME="A">text</CLASSNAME>"#, &cfg()).is_err());
    }

    #[test]
    fn test_empty_namespace_policy() {
        let xml = "<LOCALNAMESPACEPATH/>";
        let ns = parse_path(xml, &cfg()).expect("empty ok");
        assert_eq!(ns, ObjectPath::from(LocalNamespacePath::default()));
        let strict = cfg().with_allow_empty_namespace(false);
        assert!(parse_path(xml, &strict).is_err());
    }

    #[test]
    fn test_invalid_property_value_is_parse_error() {
        let xml = r#"<PROPERTY NAME="X" TYPE="uint8"><VALUE>300</VALUE></PROPERTY>"#;
        match parse_object(xml, &cfg()) {
            Err(CimError::Parse(msg)) => assert!(msg.contains("\"X\"")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_untyped_values() {
        assert_eq!(
            parse_object("<VALUE> x </VALUE>", &cfg()).expect("value"),
            CimObject::Str(" x ".into())
        );
        let seq = encode(&CimObject::Sequence(vec!["a".into(), "b".into()])).expect("encode");
        assert_eq!(
            parse_object(&seq.to_string(), &cfg()).expect("array"),
            CimObject::Sequence(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(parse_object("<CLASSNAME", &cfg()), Err(CimError::Xml(_))));
        assert!(parse_object("<QUALIFIER NAME=\"A\" TYPE=\"string\"/>", &cfg()).is_err());
    }
}
