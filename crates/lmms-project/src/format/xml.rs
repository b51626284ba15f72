//! Minimal element tree for generated XML, serialized with `quick-xml`.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::error::EncodeError;

/// Indentation unit used by LMMS when it saves projects.
pub(crate) const INDENT: &str = " ";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Display) -> Self {
        self.set(key, value);
        self
    }

    /// Set an attribute, replacing an existing one with the same key.
    pub fn set(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(escape_attr(value).into_bytes()),
            });
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }
        Ok(())
    }

    /// Serialize this element with one-space indentation, without a trailing newline.
    pub fn to_xml_string(&self) -> Result<String, EncodeError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT.len());
        self.write(&mut writer)?;
        into_string(writer.into_inner())
    }
}

/// Serialize a full LMMS document: XML declaration, doctype, then `root`.
pub(crate) fn write_document(root: &Element) -> Result<String, EncodeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT.len());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("lmms-project")))?;
    root.write(&mut writer)?;
    let mut text = into_string(writer.into_inner())?;
    text.push('\n');
    Ok(text)
}

fn into_string(bytes: Vec<u8>) -> Result<String, EncodeError> {
    String::from_utf8(bytes).map_err(|e| EncodeError::Source(e.to_string()))
}

/// Escape an attribute value. Line breaks and tabs become character
/// references so they survive attribute-value normalization.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

/// Render a start tag (`<name a="b">` or `<name a="b"/>`) from raw attribute pairs.
pub(crate) fn start_tag(name: &str, attrs: &[(String, String)], self_closing: bool) -> String {
    let mut tag = format!("<{name}");
    for (key, value) in attrs {
        tag.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
    }
    tag.push_str(if self_closing { "/>" } else { ">" });
    tag
}

/// Format a boolean the way LMMS stores it.
pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
