//! Group layers and the recursive layer hierarchy.

use log::debug;
use roxmltree::Node;
use serde::Serialize;

use crate::error::ParseError;
use crate::layer::Layer;
use crate::object::{objects_from_nodes, Object};
use crate::properties::Properties;
use crate::xml;

/// Deepest group nesting accepted before the document is rejected.
pub const MAX_GROUP_DEPTH: usize = 64;

/// A group layer. Owns its layers, objects and nested groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    /// Unique layer id.
    pub id: u32,
    #[allow(missing_docs)]
    pub name: String,
    /// Defaults to `true`.
    pub visible: bool,
    /// Defaults to `false`.
    pub locked: bool,
    #[allow(missing_docs)]
    pub properties: Properties,
    /// Tile layers, then object layers, then image layers.
    pub layers: Vec<Layer>,
    /// Objects placed directly in the group.
    pub objects: Vec<Object>,
    /// Nested groups.
    pub groups: Vec<Group>,
}

/// Layers and groups found directly under a container node.
#[derive(Debug, Default)]
pub(crate) struct Hierarchy {
    pub layers: Vec<Layer>,
    pub groups: Vec<Group>,
}

/// Builds the layers and groups under `container` (the `map` root or a `group`).
///
/// Layers come out grouped by kind: every `layer`, then every `objectgroup`,
/// then every `imagelayer`. Document interleaving between kinds is not kept.
pub(crate) fn build_hierarchy(container: Node<'_, '_>, depth: usize) -> Result<Hierarchy, ParseError> {
    let mut layers = Vec::new();
    for node in xml::children(container, "layer") {
        layers.push(Layer::tile_layer(node)?);
    }
    for node in xml::children(container, "objectgroup") {
        layers.push(Layer::object_layer(node)?);
    }
    for node in xml::children(container, "imagelayer") {
        layers.push(Layer::image_layer(node)?);
    }

    let groups = xml::children(container, "group")
        .map(|node| Group::from_node(node, depth + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Hierarchy { layers, groups })
}

impl Group {
    fn from_node(node: Node<'_, '_>, depth: usize) -> Result<Self, ParseError> {
        if depth > MAX_GROUP_DEPTH {
            return Err(ParseError::layer(
                format!("groups nested deeper than {MAX_GROUP_DEPTH} levels"),
                None,
            ));
        }

        let id: u32 = xml::parse_required(node, "id")
            .map_err(|e| ParseError::layer("group has no valid 'id'", Some(e)))?;
        let name = xml::required(node, "name")
            .map_err(|e| ParseError::layer(format!("group {id} has no 'name'"), Some(e)))?
            .to_owned();

        let Hierarchy { layers, groups } = build_hierarchy(node, depth)?;
        debug!(
            "built group {id} '{name}' at depth {depth}: {} layers, {} groups",
            layers.len(),
            groups.len()
        );

        Ok(Group {
            id,
            visible: xml::flag(node, "visible").unwrap_or(true),
            locked: xml::flag(node, "locked").unwrap_or(false),
            properties: Properties::from_owner(node)
                .map_err(|e| ParseError::layer(format!("group '{name}'"), Some(e)))?,
            layers,
            objects: objects_from_nodes(xml::children(node, "object"))?,
            groups,
            name,
        })
    }

    /// This group's layers followed by those of every nested group, depth first.
    pub fn all_layers(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.iter().collect();
        for group in &self.groups {
            out.extend(group.all_layers());
        }
        out
    }
}
