//! Namespace-tolerant lookups over parsed responses

use xmltree::{Element, XMLNode};

/// Local part of a possibly prefixed tag name
pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Depth-first, document-order walk over `root` and all of its descendants
pub(crate) fn descendants(root: &Element) -> impl Iterator<Item = &Element> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let element = stack.pop()?;
        stack.extend(element.children.iter().rev().filter_map(|node| match node {
            XMLNode::Element(child) => Some(child),
            _ => None,
        }));
        Some(element)
    })
}

/// Text of the first element whose local name equals `tag`
///
/// Returns `None` when no element matches, and an empty string when the
/// first match has no text.
pub(crate) fn find_text(root: &Element, tag: &str) -> Option<String> {
    descendants(root)
        .find(|element| local_name(&element.name) == tag)
        .map(|element| element.get_text().map(|t| t.into_owned()).unwrap_or_default())
}

/// Parse a response body into an element tree
pub(crate) fn parse(raw: &str) -> Result<Element, xmltree::ParseError> {
    Element::parse(raw.as_bytes())
}
