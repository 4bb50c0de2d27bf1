//! Custom properties attached to maps, tilesets, tiles, layers, groups and objects.

use std::collections::HashMap;

use roxmltree::Node;
use serde::Serialize;

use crate::error::ParseError;
use crate::xml;

/// A typed property value.
///
/// `color`, `file` and `object` properties are kept as their raw string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// `type="bool"`
    Bool(bool),
    /// `type="float"`
    Float(f32),
    /// `type="int"`
    Int(i32),
    /// Anything else, stored verbatim.
    String(String),
}

/// Property name to value. A repeated name overwrites the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `property` nodes.
    pub fn from_nodes<'a, 'input: 'a>(
        nodes: impl IntoIterator<Item = Node<'a, 'input>>,
    ) -> Result<Self, ParseError> {
        let mut out = Properties::new();
        for node in nodes {
            let (name, value) = property_from_node(node)?;
            out.insert(name, value);
        }
        Ok(out)
    }

    /// Builds a table from the `properties/property` children of `node`.
    pub(crate) fn from_owner(node: Node<'_, '_>) -> Result<Self, ParseError> {
        Self::from_nodes(xml::property_nodes(node))
    }

    /// Inserts or overwrites a value.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Value of a `bool` property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of an `int` property.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of a `float` property.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of a string-stored property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no property was declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn property_from_node(node: Node<'_, '_>) -> Result<(String, PropertyValue), ParseError> {
    let name = xml::required(node, "name")
        .map_err(|e| ParseError::property("property without a name", Some(e)))?
        .to_owned();
    let kind = xml::attr(node, "type");
    let value = xml::attr(node, "value");

    let typed = |parsed: Result<PropertyValue, ParseError>| {
        parsed.map_err(|e| ParseError::property(format!("property '{name}'"), Some(e)))
    };

    let parsed = match kind {
        Some("bool") => typed(parse_typed(node, value).map(PropertyValue::Bool))?,
        Some("float") => typed(parse_typed(node, value).map(PropertyValue::Float))?,
        Some("int") => typed(parse_typed(node, value).map(PropertyValue::Int))?,
        // color, file, object and untyped values are stored verbatim
        _ => {
            let text = value
                .or_else(|| node.text())
                .unwrap_or_default()
                .to_owned();
            PropertyValue::String(text)
        }
    };

    Ok((name, parsed))
}

fn parse_typed<T: std::str::FromStr>(node: Node<'_, '_>, value: Option<&str>) -> Result<T, ParseError> {
    let text = value.ok_or_else(|| ParseError::MissingAttribute {
        tag: "property".into(),
        attribute: "value".into(),
    })?;
    // bool parsing is case-sensitive: only "true" and "false" are accepted
    text.parse().map_err(|_| ParseError::InvalidNumberFormat {
        what: format!("property '{}'", xml::attr(node, "name").unwrap_or_default()),
        value: text.to_owned(),
    })
}
