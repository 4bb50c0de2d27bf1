//! Attribute and child lookups over `roxmltree` nodes.

use std::str::FromStr;

use roxmltree::Node;

use crate::error::ParseError;

pub(crate) fn tag<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// First element child named `name`.
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && tag(*c) == name)
}

/// All element children named `name`, in document order.
pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.is_element() && tag(*c) == name)
}

/// The `property` nodes of every `properties` child of `node`.
pub(crate) fn property_nodes<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    children(node, "properties").flat_map(|p| children(p, "property"))
}

pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

pub(crate) fn required<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, ParseError> {
    attr(node, name).ok_or_else(|| ParseError::MissingAttribute {
        tag: tag(node).to_string(),
        attribute: name.to_string(),
    })
}

pub(crate) fn parse_value<T: FromStr>(node: Node<'_, '_>, name: &str, text: &str) -> Result<T, ParseError> {
    text.trim().parse().map_err(|_| ParseError::InvalidNumberFormat {
        what: format!("<{}> attribute '{}'", tag(node), name),
        value: text.to_string(),
    })
}

pub(crate) fn parse_required<T: FromStr>(node: Node<'_, '_>, name: &str) -> Result<T, ParseError> {
    let text = required(node, name)?;
    parse_value(node, name, text)
}

pub(crate) fn parse_optional<T: FromStr>(node: Node<'_, '_>, name: &str) -> Result<Option<T>, ParseError> {
    attr(node, name)
        .map(|text| parse_value(node, name, text))
        .transpose()
}

pub(crate) fn parse_or_default<T: FromStr + Default>(node: Node<'_, '_>, name: &str) -> Result<T, ParseError> {
    Ok(parse_optional(node, name)?.unwrap_or_default())
}

/// Tiled writes boolean flags as `0`/`1`; only `1` counts as set.
pub(crate) fn flag(node: Node<'_, '_>, name: &str) -> Option<bool> {
    attr(node, name).map(|v| v == "1")
}

pub(crate) fn owned(node: Node<'_, '_>, name: &str) -> Option<String> {
    attr(node, name).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn reports_missing_and_invalid_attributes() {
        let doc = Document::parse(r#"<layer width="x"/>"#).unwrap();
        let node = doc.root_element();

        let err = parse_required::<u32>(node, "height").unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { ref tag, ref attribute } if tag == "layer" && attribute == "height"));

        let err = parse_required::<u32>(node, "width").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumberFormat { ref value, .. } if value == "x"));

        assert_eq!(parse_or_default::<i32>(node, "offsetx").unwrap(), 0);
    }

    #[test]
    fn finds_nested_property_nodes() {
        let doc = Document::parse(
            r#"<map><properties><property name="a"/><property name="b"/></properties><layer/></map>"#,
        )
        .unwrap();
        let names: Vec<_> = property_nodes(doc.root_element())
            .filter_map(|p| attr(p, "name"))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}
