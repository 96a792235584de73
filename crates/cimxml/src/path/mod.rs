// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object location model.
//!
//! Every path kind encodes to exactly one CIM-XML element and renders a
//! canonical string for logs:
//!
//! | Kind | Canonical form | Element |
//! |------|----------------|---------|
//! | [`ClassName`] | `CIM_Foo` | `CLASSNAME` |
//! | [`LocalNamespacePath`] | `root/cimv2` | `LOCALNAMESPACEPATH` |
//! | [`NamespacePath`] | `//host/root/cimv2` | `NAMESPACEPATH` |
//! | [`LocalClassPath`] | `root/cimv2:CIM_Foo` | `LOCALCLASSPATH` |
//! | [`ClassPath`] | `//host/root/cimv2:CIM_Foo` | `CLASSPATH` |
//! | [`InstanceName`] | `CIM_Foo.k1=1,k2="v"` | `INSTANCENAME` |
//! | [`LocalInstancePath`] | `root/cimv2:CIM_Foo.k=1` | `LOCALINSTANCEPATH` |
//! | [`InstancePath`] | `//host/root/cimv2:CIM_Foo.k=1` | `INSTANCEPATH` |
//!
//! Absent components are left out of the canonical string. Names compare
//! as exact strings.

mod instance_name;

pub use instance_name::{InstanceName, InstancePath, KeyValue, LocalInstancePath};

use crate::codec::ToXml;
use crate::error::{CimError, Result};
use crate::xml::{attr, tag, Element};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Name of a class within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName {
    name: String,
}

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ToXml for ClassName {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::CLASSNAME).attr(attr::NAME, self.name.as_str()))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Namespace without host, e.g. `root/cimv2`.
///
/// The empty namespace has no segments and encodes to a
/// `LOCALNAMESPACEPATH` element with no children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LocalNamespacePath {
    segments: Vec<String>,
}

impl LocalNamespacePath {
    /// Split a slash-separated namespace.
    ///
    /// Empty segments are dropped, so `"root//cimv2"` and `"/root/cimv2/"`
    /// both give the two segments `root` and `cimv2`, and `""` gives the
    /// empty namespace. [`LocalNamespacePath::from_segments`] keeps its
    /// input verbatim.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl ToXml for LocalNamespacePath {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::LOCALNAMESPACEPATH).children(
            self.segments
                .iter()
                .map(|s| Element::new(tag::NAMESPACE).attr(attr::NAME, s.as_str())),
        ))
    }
}

impl fmt::Display for LocalNamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for LocalNamespacePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl FromStr for LocalNamespacePath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s))
    }
}

/// Namespace qualified by an optional host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NamespacePath {
    host: Option<String>,
    namespace: LocalNamespacePath,
}

impl NamespacePath {
    pub fn new(namespace: impl Into<LocalNamespacePath>) -> Self {
        Self {
            host: None,
            namespace: namespace.into(),
        }
    }

    /// Attach a host; blank or whitespace-padded names fail with
    /// [`CimError::Construction`].
    pub fn with_host(mut self, host: impl Into<String>) -> Result<Self> {
        self.host = Some(check_host(host.into())?);
        Ok(self)
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn namespace(&self) -> &LocalNamespacePath {
        &self.namespace
    }
}

/// `NAMESPACEPATH` element; `HOST` is left out when no host is set.
pub(crate) fn namespace_path_xml(
    host: Option<&str>,
    namespace: &LocalNamespacePath,
) -> Result<Element> {
    let mut e = Element::new(tag::NAMESPACEPATH);
    if let Some(h) = host {
        e = e.child(Element::new(tag::HOST).text(h));
    }
    Ok(e.child(namespace.to_xml()?))
}

/// Write `//host/` and `ns:` as applicable.
pub(crate) fn write_location_prefix(
    f: &mut fmt::Formatter<'_>,
    host: Option<&str>,
    namespace: &LocalNamespacePath,
) -> fmt::Result {
    if let Some(h) = host {
        write!(f, "//{}/", h)?;
    }
    if !namespace.is_empty() {
        write!(f, "{}:", namespace)?;
    }
    Ok(())
}

/// Host names are non-empty and free of surrounding whitespace.
pub(crate) fn check_host(host: String) -> Result<String> {
    if host.is_empty() || host.trim() != host {
        log::debug!("[path] rejecting host {:?}", host);
        return Err(CimError::construction(format!(
            "host name {:?} must be non-empty without surrounding whitespace",
            host
        )));
    }
    Ok(host)
}

/// Split a leading `//host/` off a canonical string.
pub(crate) fn split_host(s: &str) -> Result<(Option<String>, &str)> {
    let Some(rest) = s.strip_prefix("//") else {
        return Ok((None, s));
    };
    let (host, rest) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    };
    Ok((Some(check_host(host.to_string())?), rest))
}

/// Split `ns:rest` at the first colon that precedes any keybinding syntax.
pub(crate) fn split_namespace(s: &str) -> (LocalNamespacePath, &str) {
    for (i, c) in s.char_indices() {
        match c {
            ':' => return (LocalNamespacePath::new(&s[..i]), &s[i + 1..]),
            '.' | '=' | '"' => break,
            _ => {}
        }
    }
    (LocalNamespacePath::default(), s)
}

impl ToXml for NamespacePath {
    fn to_xml(&self) -> Result<Element> {
        namespace_path_xml(self.host(), &self.namespace)
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = &self.host {
            write!(f, "//{}/", h)?;
        }
        write!(f, "{}", self.namespace)
    }
}

impl FromStr for NamespacePath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, rest) = split_host(s)?;
        Ok(Self {
            host,
            namespace: LocalNamespacePath::new(rest),
        })
    }
}

/// Class within a namespace, no host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalClassPath {
    namespace: LocalNamespacePath,
    classname: ClassName,
}

impl LocalClassPath {
    pub fn new(namespace: impl Into<LocalNamespacePath>, classname: impl Into<ClassName>) -> Self {
        Self {
            namespace: namespace.into(),
            classname: classname.into(),
        }
    }

    pub fn namespace(&self) -> &LocalNamespacePath {
        &self.namespace
    }

    pub fn classname(&self) -> &ClassName {
        &self.classname
    }
}

impl ToXml for LocalClassPath {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::LOCALCLASSPATH)
            .child(self.namespace.to_xml()?)
            .child(self.classname.to_xml()?))
    }
}

impl fmt::Display for LocalClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location_prefix(f, None, &self.namespace)?;
        write!(f, "{}", self.classname)
    }
}

impl FromStr for LocalClassPath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, classname) = split_namespace(s);
        Ok(Self::new(namespace, parse_classname(classname)?))
    }
}

/// Fully qualified class path: host, namespace and class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassPath {
    host: Option<String>,
    namespace: LocalNamespacePath,
    classname: ClassName,
}

impl ClassPath {
    pub fn new(namespace: impl Into<LocalNamespacePath>, classname: impl Into<ClassName>) -> Self {
        Self {
            host: None,
            namespace: namespace.into(),
            classname: classname.into(),
        }
    }

    /// Attach a host; blank or whitespace-padded names fail with
    /// [`CimError::Construction`].
    pub fn with_host(mut self, host: impl Into<String>) -> Result<Self> {
        self.host = Some(check_host(host.into())?);
        Ok(self)
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn namespace(&self) -> &LocalNamespacePath {
        &self.namespace
    }

    pub fn classname(&self) -> &ClassName {
        &self.classname
    }
}

impl ToXml for ClassPath {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::CLASSPATH)
            .child(namespace_path_xml(self.host(), &self.namespace)?)
            .child(self.classname.to_xml()?))
    }
}

impl fmt::Display for ClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location_prefix(f, self.host(), &self.namespace)?;
        write!(f, "{}", self.classname)
    }
}

impl FromStr for ClassPath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, rest) = split_host(s)?;
        let (namespace, classname) = split_namespace(rest);
        Ok(Self {
            host,
            namespace,
            classname: parse_classname(classname)?,
        })
    }
}

fn parse_classname(s: &str) -> Result<ClassName> {
    if s.is_empty() || !s.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(CimError::value(format!("invalid class name {:?}", s)));
    }
    Ok(ClassName::new(s))
}

/// Any location kind.
///
/// Values of different kinds are never equal and have no relative order.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPath {
    ClassName(ClassName),
    LocalNamespacePath(LocalNamespacePath),
    NamespacePath(NamespacePath),
    LocalClassPath(LocalClassPath),
    ClassPath(ClassPath),
    InstanceName(InstanceName),
    LocalInstancePath(LocalInstancePath),
    InstancePath(InstancePath),
}

impl ObjectPath {
    /// Short kind label used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClassName(_) => "ClassName",
            Self::LocalNamespacePath(_) => "LocalNamespacePath",
            Self::NamespacePath(_) => "NamespacePath",
            Self::LocalClassPath(_) => "LocalClassPath",
            Self::ClassPath(_) => "ClassPath",
            Self::InstanceName(_) => "InstanceName",
            Self::LocalInstancePath(_) => "LocalInstancePath",
            Self::InstancePath(_) => "InstancePath",
        }
    }

    /// Whether this kind may appear inside `VALUE.REFERENCE`.
    pub const fn is_reference(&self) -> bool {
        !matches!(self, Self::LocalNamespacePath(_) | Self::NamespacePath(_))
    }
}

impl ToXml for ObjectPath {
    fn to_xml(&self) -> Result<Element> {
        match self {
            Self::ClassName(p) => p.to_xml(),
            Self::LocalNamespacePath(p) => p.to_xml(),
            Self::NamespacePath(p) => p.to_xml(),
            Self::LocalClassPath(p) => p.to_xml(),
            Self::ClassPath(p) => p.to_xml(),
            Self::InstanceName(p) => p.to_xml(),
            Self::LocalInstancePath(p) => p.to_xml(),
            Self::InstancePath(p) => p.to_xml(),
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassName(p) => p.fmt(f),
            Self::LocalNamespacePath(p) => p.fmt(f),
            Self::NamespacePath(p) => p.fmt(f),
            Self::LocalClassPath(p) => p.fmt(f),
            Self::ClassPath(p) => p.fmt(f),
            Self::InstanceName(p) => p.fmt(f),
            Self::LocalInstancePath(p) => p.fmt(f),
            Self::InstancePath(p) => p.fmt(f),
        }
    }
}

impl PartialOrd for ObjectPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::ClassName(a), Self::ClassName(b)) => a.partial_cmp(b),
            (Self::LocalNamespacePath(a), Self::LocalNamespacePath(b)) => a.partial_cmp(b),
            (Self::NamespacePath(a), Self::NamespacePath(b)) => a.partial_cmp(b),
            (Self::LocalClassPath(a), Self::LocalClassPath(b)) => a.partial_cmp(b),
            (Self::ClassPath(a), Self::ClassPath(b)) => a.partial_cmp(b),
            (Self::InstanceName(a), Self::InstanceName(b)) => a.partial_cmp(b),
            (Self::LocalInstancePath(a), Self::LocalInstancePath(b)) => a.partial_cmp(b),
            (Self::InstancePath(a), Self::InstancePath(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

macro_rules! object_path_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ObjectPath {
                fn from(p: $variant) -> Self {
                    Self::$variant(p)
                }
            }
        )*
    };
}

object_path_from!(
    ClassName,
    LocalNamespacePath,
    NamespacePath,
    LocalClassPath,
    ClassPath,
    InstanceName,
    LocalInstancePath,
    InstancePath,
);
