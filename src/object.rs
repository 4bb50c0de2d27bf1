//! Objects placed on object layers, groups and tile collision shapes.

use roxmltree::Node;
use serde::Serialize;

use crate::error::ParseError;
use crate::properties::Properties;
use crate::xml;

/// Geometry of an [`Object`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectShape {
    /// A single point at the object's position.
    Point,
    /// Axis-aligned box. Missing sizes read as 0.
    Rectangle {
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
    },
    /// Ellipse inscribed in the object's box.
    Ellipse {
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
    },
    /// Closed outline as flat `x, y` pairs relative to the object's position.
    Polygon {
        /// `[x0, y0, x1, y1, ...]`
        points: Vec<f32>,
    },
    /// Open outline as flat `x, y` pairs relative to the object's position.
    Polyline {
        /// `[x0, y0, x1, y1, ...]`
        points: Vec<f32>,
    },
    /// A tile placed as an object; its gid is [`Object::gid`].
    Tile {
        /// Width in pixels.
        width: f32,
        /// Height in pixels.
        height: f32,
    },
}

/// A single object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    /// Unique object id.
    pub id: u32,
    #[allow(missing_docs)]
    pub name: Option<String>,
    /// The object's `type` attribute.
    pub kind: Option<String>,
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels.
    pub y: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: i32,
    /// Raw gid, flip bits included. `0` when the object is not a tile.
    pub gid: u32,
    #[allow(missing_docs)]
    pub properties: Properties,
    #[allow(missing_docs)]
    pub shape: ObjectShape,
}

impl Object {
    /// Decodes one `object` node.
    pub fn from_node(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let id: u32 = xml::parse_required(node, "id")
            .map_err(|e| ParseError::object("object has no valid 'id'", Some(e)))?;
        let malformed = |e: ParseError| ParseError::object(format!("object {id}"), Some(e));

        let x: f32 = xml::parse_required(node, "x").map_err(malformed)?;
        let y: f32 = xml::parse_required(node, "y").map_err(malformed)?;

        Ok(Object {
            id,
            name: xml::owned(node, "name"),
            kind: xml::owned(node, "type"),
            x,
            y,
            rotation: xml::parse_or_default(node, "rotation").map_err(malformed)?,
            gid: match xml::attr(node, "gid") {
                Some(gid) if !gid.trim().is_empty() => xml::parse_value(node, "gid", gid).map_err(malformed)?,
                // an empty gid is no gid
                _ => 0,
            },
            properties: Properties::from_owner(node).map_err(malformed)?,
            shape: ObjectShape::from_node(node).map_err(malformed)?,
        })
    }

    /// True for [`ObjectShape::Tile`] objects.
    pub fn is_tile(&self) -> bool {
        matches!(self.shape, ObjectShape::Tile { .. })
    }
}

impl ObjectShape {
    /// Picks the shape: polygon, polyline, ellipse, point, tile, then rectangle.
    fn from_node(node: Node<'_, '_>) -> Result<Self, ParseError> {
        if let Some(poly) = xml::child(node, "polygon") {
            return Ok(ObjectShape::Polygon { points: points(poly)? });
        }
        if let Some(poly) = xml::child(node, "polyline") {
            return Ok(ObjectShape::Polyline { points: points(poly)? });
        }

        let width = xml::parse_or_default(node, "width")?;
        let height = xml::parse_or_default(node, "height")?;

        let shape = if xml::child(node, "ellipse").is_some() {
            ObjectShape::Ellipse { width, height }
        } else if xml::child(node, "point").is_some() {
            ObjectShape::Point
        } else if xml::attr(node, "gid").is_some_and(|gid| !gid.trim().is_empty()) {
            ObjectShape::Tile { width, height }
        } else {
            ObjectShape::Rectangle { width, height }
        };
        Ok(shape)
    }
}

/// Parses `points="x,y x,y ..."` into a flat list.
fn points(node: Node<'_, '_>) -> Result<Vec<f32>, ParseError> {
    let text = xml::required(node, "points")?;
    let mut out = Vec::new();
    for pair in text.split_ascii_whitespace() {
        let mut coords = pair.split(',');
        match (coords.next(), coords.next(), coords.next()) {
            (Some(x), Some(y), None) => {
                out.push(xml::parse_value(node, "points", x)?);
                out.push(xml::parse_value(node, "points", y)?);
            }
            _ => {
                return Err(ParseError::InvalidNumberFormat {
                    what: format!("<{}> point", xml::tag(node)),
                    value: pair.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Decodes `object` nodes, flattening any `objectgroup` found among them.
pub(crate) fn objects_from_nodes<'a, 'input: 'a>(
    nodes: impl IntoIterator<Item = Node<'a, 'input>>,
) -> Result<Vec<Object>, ParseError> {
    let mut out = Vec::new();
    for node in nodes {
        collect_object(node, &mut out)?;
    }
    Ok(out)
}

fn collect_object(node: Node<'_, '_>, out: &mut Vec<Object>) -> Result<(), ParseError> {
    match xml::tag(node) {
        "object" => out.push(Object::from_node(node)?),
        "objectgroup" => {
            for child in node.children().filter(|c| c.is_element()) {
                collect_object(child, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}
