// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance names and instance paths.

use super::{
    check_host, namespace_path_xml, parse_classname, split_host, split_namespace, write_location_prefix,
    ClassName, ClassPath, LocalNamespacePath, ObjectPath,
};
use crate::codec::{CimObject, ToXml};
use crate::config::boolean_token;
use crate::error::{CimError, Result};
use crate::xml::{attr, tag, Element};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Value of a single keybinding.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    /// Numeric key, wide enough for every `uint64` and `sint64` value.
    Int(i128),
    Bool(bool),
    Str(String),
    Reference(Box<ObjectPath>),
}

impl KeyValue {
    /// `VALUETYPE` of the `KEYVALUE` element, `None` for references.
    pub const fn value_type(&self) -> Option<&'static str> {
        match self {
            Self::Int(_) => Some("numeric"),
            Self::Bool(_) => Some("boolean"),
            Self::Str(_) => Some("string"),
            Self::Reference(_) => None,
        }
    }

    fn to_xml(&self, key: &str) -> Result<Element> {
        let keyvalue = |valuetype: &str, text: String| {
            Element::new(tag::KEYVALUE)
                .attr(attr::VALUETYPE, valuetype)
                .text(text)
        };
        match self {
            Self::Int(i) => Ok(keyvalue("numeric", i.to_string())),
            Self::Bool(b) => Ok(keyvalue("boolean", boolean_token(*b).to_string())),
            Self::Str(s) => Ok(keyvalue("string", s.clone())),
            Self::Reference(path) if path.is_reference() => {
                Ok(Element::new(tag::VALUE_REFERENCE).child(path.to_xml()?))
            }
            Self::Reference(path) => Err(CimError::Encoding {
                key: key.to_string(),
                reason: format!("{} cannot be used as a reference value", path.kind()),
            }),
        }
    }

    /// Ordering key: variant rank, then canonical rendering.
    fn sort_key(&self) -> (u8, String) {
        let rank = match self {
            Self::Int(_) => 0,
            Self::Bool(_) => 1,
            Self::Str(_) => 2,
            Self::Reference(_) => 3,
        };
        (rank, self.to_string())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => f.write_str(boolean_token(*b)),
            Self::Str(s) => write_quoted(f, s),
            Self::Reference(p) => write_quoted(f, &p.to_string()),
        }
    }
}

macro_rules! key_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(v: $ty) -> Self {
                    Self::Int(i128::from(v))
                }
            }
        )*
    };
}

key_value_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<bool> for KeyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ObjectPath> for KeyValue {
    fn from(p: ObjectPath) -> Self {
        Self::Reference(Box::new(p))
    }
}

impl From<ClassName> for KeyValue {
    fn from(p: ClassName) -> Self {
        ObjectPath::from(p).into()
    }
}

impl From<ClassPath> for KeyValue {
    fn from(p: ClassPath) -> Self {
        ObjectPath::from(p).into()
    }
}

impl From<InstanceName> for KeyValue {
    fn from(p: InstanceName) -> Self {
        ObjectPath::from(p).into()
    }
}

impl From<InstancePath> for KeyValue {
    fn from(p: InstancePath) -> Self {
        ObjectPath::from(p).into()
    }
}

impl TryFrom<CimObject> for KeyValue {
    type Error = CimError;

    /// Keybindings accept integers, booleans, strings and object paths only.
    fn try_from(obj: CimObject) -> Result<Self> {
        match obj {
            CimObject::Int(i) => Ok(Self::Int(i)),
            CimObject::Bool(b) => Ok(Self::Bool(b)),
            CimObject::Str(s) => Ok(Self::Str(s)),
            CimObject::Path(p) => Ok(Self::Reference(Box::new(p))),
            other => Err(CimError::construction(format!(
                "keybinding value must be an integer, boolean, string or object path, got {}",
                other.kind()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Keys {
    Bindings(IndexMap<String, KeyValue>),
    Single(KeyValue),
}

/// Class name plus the keybindings identifying one instance.
///
/// Keybindings iterate in insertion order. Equality compares them as a
/// mapping, so two names with the same bindings inserted in a different
/// order are equal even though their canonical strings differ.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceName {
    classname: String,
    keys: Keys,
}

impl InstanceName {
    /// Instance name without keybindings.
    pub fn new(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            keys: Keys::Bindings(IndexMap::new()),
        }
    }

    /// Instance name with the given keybindings, in iteration order.
    pub fn with_keybindings<I, K, V>(classname: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<KeyValue>,
    {
        Self {
            classname: classname.into(),
            keys: Keys::Bindings(
                bindings
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Single unnamed key shorthand; only strings and integers qualify.
    pub fn single(classname: impl Into<String>, value: impl Into<KeyValue>) -> Result<Self> {
        let value = value.into();
        if !matches!(value, KeyValue::Int(_) | KeyValue::Str(_)) {
            return Err(CimError::construction(format!(
                "single-key instance name requires a string or integer, got {}",
                value
            )));
        }
        Ok(Self {
            classname: classname.into(),
            keys: Keys::Single(value),
        })
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    /// The unnamed key of a single-key instance name.
    pub fn single_value(&self) -> Option<&KeyValue> {
        match &self.keys {
            Keys::Single(v) => Some(v),
            Keys::Bindings(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        match &self.keys {
            Keys::Bindings(map) => map.get(key),
            Keys::Single(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a named keybinding, returning the previous value.
    ///
    /// A single-key name becomes a regular keybinding map.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<KeyValue>) -> Option<KeyValue> {
        if let Keys::Single(_) = self.keys {
            self.keys = Keys::Bindings(IndexMap::new());
        }
        match &mut self.keys {
            Keys::Bindings(map) => map.insert(key.into(), value.into()),
            Keys::Single(_) => None,
        }
    }

    /// Set a keybinding from a dynamically typed value.
    pub fn try_set(&mut self, key: impl Into<String>, value: CimObject) -> Result<()> {
        let value = KeyValue::try_from(value)?;
        self.set(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<KeyValue> {
        match &mut self.keys {
            Keys::Bindings(map) => map.shift_remove(key),
            Keys::Single(_) => None,
        }
    }

    /// Named keybindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyValue)> {
        let map = match &self.keys {
            Keys::Bindings(map) => Some(map),
            Keys::Single(_) => None,
        };
        map.into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        match &self.keys {
            Keys::Bindings(map) => map.len(),
            Keys::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_keys(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.classname)?;
        match &self.keys {
            Keys::Single(v) => write!(f, "={}", v),
            Keys::Bindings(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    let sep = if i == 0 { '.' } else { ',' };
                    write!(f, "{}{}={}", sep, k, v)?;
                }
                Ok(())
            }
        }
    }

    fn sorted_keys(&self) -> Vec<(String, (u8, String))> {
        let mut keys: Vec<_> = match &self.keys {
            Keys::Single(v) => vec![(String::new(), v.sort_key())],
            Keys::Bindings(map) => map.iter().map(|(k, v)| (k.clone(), v.sort_key())).collect(),
        };
        keys.sort();
        keys
    }
}

impl ToXml for InstanceName {
    fn to_xml(&self) -> Result<Element> {
        let e = Element::new(tag::INSTANCENAME).attr(attr::CLASSNAME, self.classname.as_str());
        match &self.keys {
            Keys::Single(v) => Ok(e.child(v.to_xml("")?)),
            Keys::Bindings(map) => {
                let bindings = map
                    .iter()
                    .map(|(k, v)| {
                        Ok(Element::new(tag::KEYBINDING)
                            .attr(attr::NAME, k.as_str())
                            .child(v.to_xml(k)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(e.children(bindings))
            }
        }
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_keys(f)
    }
}

impl PartialOrd for InstanceName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        Some(
            self.classname
                .cmp(&other.classname)
                .then_with(|| self.sorted_keys().cmp(&other.sorted_keys())),
        )
    }
}

impl FromStr for InstanceName {
    type Err = CimError;

    /// Parse `Class.k1=1,k2="v"` or `Class="v"`.
    ///
    /// Quoted values always come back as strings; references are not
    /// recovered from the canonical form.
    fn from_str(s: &str) -> Result<Self> {
        let end = s.find(['.', '=']).unwrap_or(s.len());
        let classname = parse_classname(&s[..end])?.name().to_string();
        let rest = &s[end..];
        if rest.is_empty() {
            return Ok(Self::new(classname));
        }
        if let Some(single) = rest.strip_prefix('=') {
            let (value, tail) = parse_key_value(single)?;
            if !tail.is_empty() {
                return Err(trailing(s));
            }
            return Self::single(classname, value);
        }

        let mut name = Self::new(classname);
        let mut rest = &rest[1..];
        loop {
            let eq = rest
                .find('=')
                .ok_or_else(|| CimError::value(format!("missing '=' in keybinding of {:?}", s)))?;
            let key = &rest[..eq];
            if key.is_empty() {
                return Err(CimError::value(format!("empty keybinding name in {:?}", s)));
            }
            let (value, tail) = parse_key_value(&rest[eq + 1..])?;
            name.set(key, value);
            match tail.strip_prefix(',') {
                Some(next) => rest = next,
                None if tail.is_empty() => return Ok(name),
                None => return Err(trailing(s)),
            }
        }
    }
}

fn trailing(s: &str) -> CimError {
    CimError::value(format!("unexpected trailing text in instance name {:?}", s))
}

/// Parse one keybinding value, returning it with the unparsed tail.
fn parse_key_value(s: &str) -> Result<(KeyValue, &str)> {
    if let Some(body) = s.strip_prefix('"') {
        let mut out = String::new();
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                '"' => return Ok((KeyValue::Str(out), &body[i + 1..])),
                _ => out.push(c),
            }
        }
        return Err(CimError::value(format!("unterminated string in {:?}", s)));
    }
    let end = s.find(',').unwrap_or(s.len());
    let token = &s[..end];
    let value = if token.eq_ignore_ascii_case("true") {
        KeyValue::Bool(true)
    } else if token.eq_ignore_ascii_case("false") {
        KeyValue::Bool(false)
    } else {
        token
            .parse::<i128>()
            .map(KeyValue::Int)
            .map_err(|_| CimError::value(format!("invalid keybinding value {:?}", token)))?
    };
    Ok((value, &s[end..]))
}

/// Instance name within a namespace, no host.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalInstancePath {
    namespace: LocalNamespacePath,
    name: InstanceName,
}

impl LocalInstancePath {
    pub fn new(namespace: impl Into<LocalNamespacePath>, name: InstanceName) -> Self {
        Self {
            namespace: namespace.into(),
            name,
        }
    }

    pub fn namespace(&self) -> &LocalNamespacePath {
        &self.namespace
    }

    pub fn instance_name(&self) -> &InstanceName {
        &self.name
    }
}

impl ToXml for LocalInstancePath {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::LOCALINSTANCEPATH)
            .child(self.namespace.to_xml()?)
            .child(self.name.to_xml()?))
    }
}

impl fmt::Display for LocalInstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location_prefix(f, None, &self.namespace)?;
        write!(f, "{}", self.name)
    }
}

impl PartialOrd for LocalInstancePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.namespace.cmp(&other.namespace) {
            Ordering::Equal => self.name.partial_cmp(&other.name),
            ord => Some(ord),
        }
    }
}

impl FromStr for LocalInstancePath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, rest) = split_namespace(s);
        Ok(Self::new(namespace, rest.parse()?))
    }
}

/// Fully qualified instance path: host, namespace and instance name.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancePath {
    host: Option<String>,
    namespace: LocalNamespacePath,
    name: InstanceName,
}

impl InstancePath {
    pub fn new(namespace: impl Into<LocalNamespacePath>, name: InstanceName) -> Self {
        Self {
            host: None,
            namespace: namespace.into(),
            name,
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

    pub fn instance_name(&self) -> &InstanceName {
        &self.name
    }
}

impl ToXml for InstancePath {
    fn to_xml(&self) -> Result<Element> {
        Ok(Element::new(tag::INSTANCEPATH)
            .child(namespace_path_xml(self.host(), &self.namespace)?)
            .child(self.name.to_xml()?))
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_location_prefix(f, self.host(), &self.namespace)?;
        write!(f, "{}", self.name)
    }
}

impl PartialOrd for InstancePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.host, &self.namespace).cmp(&(&other.host, &other.namespace)) {
            Ordering::Equal => self.name.partial_cmp(&other.name),
            ord => Some(ord),
        }
    }
}

impl FromStr for InstancePath {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, rest) = split_host(s)?;
        let (namespace, rest) = split_namespace(rest);
        Ok(Self {
            host,
            namespace,
            name: rest.parse()?,
        })
    }
}
