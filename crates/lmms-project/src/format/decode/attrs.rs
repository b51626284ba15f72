//! Attribute access with defaults and lenient numeric parsing.

use roxmltree::Node;

use crate::error::DecodeError;

/// First element child named `name`.
pub(super) fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(name))
}

/// Element children named `name`, in document order.
pub(super) fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(name))
}

/// First element child of any name.
pub(super) fn first_element<'a, 'i>(node: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    node.children().find(Node::is_element)
}

pub(super) fn text<'a>(node: Node<'a, '_>, name: &str, default: &'a str) -> &'a str {
    node.attribute(name).unwrap_or(default)
}

/// Integer attribute. Float text is accepted and truncated toward zero.
pub(super) fn int(node: Node<'_, '_>, name: &str, default: i64) -> Result<i64, DecodeError> {
    match node.attribute(name) {
        None => Ok(default),
        Some(raw) => parse_int(raw)
            .ok_or_else(|| DecodeError::invalid_attribute(node.tag_name().name(), name, raw)),
    }
}

pub(super) fn float(node: Node<'_, '_>, name: &str, default: f64) -> Result<f64, DecodeError> {
    match node.attribute(name) {
        None => Ok(default),
        Some(raw) => parse_float(raw)
            .ok_or_else(|| DecodeError::invalid_attribute(node.tag_name().name(), name, raw)),
    }
}

/// Optional float attribute; absent and empty both read as `None`.
pub(super) fn opt_float(node: Node<'_, '_>, name: &str) -> Result<Option<f64>, DecodeError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_float(raw)
            .map(Some)
            .ok_or_else(|| DecodeError::invalid_attribute(node.tag_name().name(), name, raw)),
    }
}

/// Boolean stored as an integer; any non-zero value is true.
pub(super) fn flag(node: Node<'_, '_>, name: &str) -> Result<bool, DecodeError> {
    Ok(int(node, name, 0)? != 0)
}

fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    })
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
