// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Minimal XML element builder used by the encoder.
//!
//! Elements are built as a small owned tree and serialized with [`Display`].
//! Attribute order is preserved as inserted, text and attribute values are
//! escaped on output. Whitespace that a reader would normalize away (`\r` in
//! text, `\t`, `\n` and `\r` in attributes) is written as a character
//! reference so it survives a round trip. The tree can also be inspected
//! directly, which keeps encoder tests independent of the serialized
//! spelling.
//!
//! [`Display`]: std::fmt::Display

use std::fmt::{self, Write};

use crate::error::{CimError, Result};

/// CIM-XML element names (DSP0201).
pub mod tag {
    pub const CLASS: &str = "CLASS";
    pub const CLASSNAME: &str = "CLASSNAME";
    pub const CLASSPATH: &str = "CLASSPATH";
    pub const HOST: &str = "HOST";
    pub const INSTANCE: &str = "INSTANCE";
    pub const INSTANCENAME: &str = "INSTANCENAME";
    pub const INSTANCEPATH: &str = "INSTANCEPATH";
    pub const KEYBINDING: &str = "KEYBINDING";
    pub const KEYVALUE: &str = "KEYVALUE";
    pub const LOCALCLASSPATH: &str = "LOCALCLASSPATH";
    pub const LOCALINSTANCEPATH: &str = "LOCALINSTANCEPATH";
    pub const LOCALNAMESPACEPATH: &str = "LOCALNAMESPACEPATH";
    pub const METHOD: &str = "METHOD";
    pub const NAMESPACE: &str = "NAMESPACE";
    pub const NAMESPACEPATH: &str = "NAMESPACEPATH";
    pub const PARAMETER: &str = "PARAMETER";
    pub const PARAMETER_ARRAY: &str = "PARAMETER.ARRAY";
    pub const PARAMETER_REFARRAY: &str = "PARAMETER.REFARRAY";
    pub const PARAMETER_REFERENCE: &str = "PARAMETER.REFERENCE";
    pub const PROPERTY: &str = "PROPERTY";
    pub const PROPERTY_ARRAY: &str = "PROPERTY.ARRAY";
    pub const PROPERTY_REFERENCE: &str = "PROPERTY.REFERENCE";
    pub const QUALIFIER: &str = "QUALIFIER";
    pub const VALUE: &str = "VALUE";
    pub const VALUE_ARRAY: &str = "VALUE.ARRAY";
    pub const VALUE_NAMEDINSTANCE: &str = "VALUE.NAMEDINSTANCE";
    pub const VALUE_REFERENCE: &str = "VALUE.REFERENCE";
}

/// CIM-XML attribute names.
pub mod attr {
    pub const ARRAYSIZE: &str = "ARRAYSIZE";
    pub const CLASSNAME: &str = "CLASSNAME";
    pub const CLASSORIGIN: &str = "CLASSORIGIN";
    pub const NAME: &str = "NAME";
    pub const OVERRIDABLE: &str = "OVERRIDABLE";
    pub const PROPAGATED: &str = "PROPAGATED";
    pub const REFERENCECLASS: &str = "REFERENCECLASS";
    pub const SUPERCLASS: &str = "SUPERCLASS";
    pub const TOINSTANCE: &str = "TOINSTANCE";
    pub const TOSUBCLASS: &str = "TOSUBCLASS";
    pub const TRANSLATABLE: &str = "TRANSLATABLE";
    pub const TYPE: &str = "TYPE";
    pub const VALUETYPE: &str = "VALUETYPE";
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Append an attribute only when a value is present.
    pub fn opt_attr<V: Into<String>>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    /// Append a `true`/`false` attribute only when the flag is set.
    pub fn flag_attr(self, name: &'static str, flag: Option<bool>) -> Self {
        self.opt_attr(name, flag.map(|f| if f { "true" } else { "false" }))
    }

    /// Append a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append several child elements, keeping their order.
    pub fn children<I: IntoIterator<Item = Element>>(mut self, children: I) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    /// Append character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attrs
    }

    /// Iterate child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated character data of direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Check that every attribute value and text node holds only
    /// characters XML 1.0 can carry.
    ///
    /// Control characters other than tab, newline and carriage return have
    /// no representation, not even as a character reference, so the tree is
    /// rejected with [`CimError::Type`].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.attrs {
            check_chars(value)
                .map_err(|c| forbidden(c, format_args!("attribute {} of {}", name, self.name)))?;
        }
        for child in &self.children {
            match child {
                Node::Element(e) => e.validate()?,
                Node::Text(t) => check_chars(t)
                    .map_err(|c| forbidden(c, format_args!("text of {}", self.name)))?,
            }
        }
        Ok(())
    }

    fn write_xml<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (name, value) in &self.attrs {
            write!(out, " {}=\"", name)?;
            write_escaped(out, value, true)?;
            out.write_char('"')?;
        }
        if self.children.is_empty() {
            return out.write_str("/>");
        }
        out.write_char('>')?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_xml(out)?,
                Node::Text(t) => write_escaped(out, t, false)?,
            }
        }
        write!(out, "</{}>", self.name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_xml(f)
    }
}

const fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_chars(s: &str) -> std::result::Result<(), char> {
    match s.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(c),
        None => Ok(()),
    }
}

fn forbidden(c: char, place: fmt::Arguments<'_>) -> CimError {
    CimError::type_error(format!(
        "character U+{:04X} in {} is not allowed in XML",
        u32::from(c),
        place
    ))
}

fn write_escaped<W: Write>(out: &mut W, s: &str, in_attribute: bool) -> fmt::Result {
    for c in s.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            '\'' => out.write_str("&apos;")?,
            '\r' => out.write_str("&#13;")?,
            '\t' if in_attribute => out.write_str("&#9;")?,
            '\n' if in_attribute => out.write_str("&#10;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_element_self_closes() {
        let e = Element::new(tag::CLASSNAME).attr(attr::NAME, "CIM_Foo");
        assert_eq!(e.to_string(), r#"<CLASSNAME NAME="CIM_Foo"/>"#);
    }

    #[test]
    fn test_nested_with_text() {
        let e = Element::new(tag::VALUE_ARRAY)
            .child(Element::new(tag::VALUE).text("1"))
            .child(Element::new(tag::VALUE).text("2"));
        assert_eq!(
            e.to_string(),
            "<VALUE.ARRAY><VALUE>1</VALUE><VALUE>2</VALUE></VALUE.ARRAY>"
        );
        assert_eq!(e.child_elements().count(), 2);
    }

    #[test]
    fn test_escaping() {
        let e = Element::new(tag::VALUE)
            .attr(attr::NAME, "a\"b")
            .text("x < y & z");
        assert_eq!(
            e.to_string(),
            r#"<VALUE NAME="a&quot;b">x &lt; y &amp; z</VALUE>"#
        );
    }

    #[test]
    fn test_whitespace_is_escaped_where_readers_normalize_it() {
        let e = Element::new(tag::PROPERTY)
            .attr(attr::CLASSORIGIN, "A\tB\nC\rD")
            .child(Element::new(tag::VALUE).text("x\r\ny\tz\n"));
        assert_eq!(
            e.to_string(),
            "<PROPERTY CLASSORIGIN=\"A&#9;B&#10;C&#13;D\"><VALUE>x&#13;\ny\tz\n</VALUE></PROPERTY>"
        );
        e.validate().expect("valid");
    }

    #[test]
    fn test_validate_rejects_forbidden_characters() {
        let text = Element::new(tag::VALUE_ARRAY).child(Element::new(tag::VALUE).text("a\u{1}b"));
        assert!(matches!(text.validate(), Err(CimError::Type(_))));

        let attribute = Element::new(tag::CLASSNAME).attr(attr::NAME, "CIM_\u{FFFE}");
        assert!(matches!(attribute.validate(), Err(CimError::Type(_))));

        let wide = Element::new(tag::VALUE).text("\u{10348} \u{E000} \u{D7FF}");
        wide.validate().expect("valid");
    }

    #[test]
    fn test_optional_attributes() {
        let e = Element::new(tag::PROPERTY)
            .opt_attr(attr::CLASSORIGIN, None::<String>)
            .flag_attr(attr::PROPAGATED, Some(false));
        assert_eq!(e.attribute(attr::CLASSORIGIN), None);
        assert_eq!(e.attribute(attr::PROPAGATED), Some("false"));
    }
}
