//! Tile, object and image layers.

use log::{debug, trace, warn};
use roxmltree::Node;
use serde::Serialize;

use crate::data;
use crate::error::ParseError;
use crate::gid::{FLAG_D, FLAG_H, FLAG_V};
use crate::object::{objects_from_nodes, Object};
use crate::properties::Properties;
use crate::tileset::Image;
use crate::xml;

/// Grid of tiles. `data` and `flip_flags` are row-major and always `width * height` long.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Gid per cell with flip bits cleared; `0` is an empty cell.
    pub data: Vec<u32>,
    /// Flip flags per cell, `0b HVD`.
    pub flip_flags: Vec<u8>,
}

impl TileLayer {
    /// Index of cell `(x, y)` into `data`/`flip_flags`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Gid at `(x, y)`, `None` outside the layer.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.index(x, y)).copied()
    }

    fn flag(&self, index: usize, bit: u8) -> bool {
        self.flip_flags.get(index).is_some_and(|f| f & bit != 0)
    }

    /// Whether the cell at `index` is flipped horizontally.
    pub fn is_flipped_horizontal(&self, index: usize) -> bool {
        self.flag(index, FLAG_H)
    }

    /// Whether the cell at `index` is flipped vertically.
    pub fn is_flipped_vertical(&self, index: usize) -> bool {
        self.flag(index, FLAG_V)
    }

    /// Whether the cell at `index` is flipped along its anti-diagonal.
    pub fn is_flipped_diagonal(&self, index: usize) -> bool {
        self.flag(index, FLAG_D)
    }

    #[allow(missing_docs)]
    pub fn is_flipped_horizontal_at(&self, x: u32, y: u32) -> bool {
        self.is_flipped_horizontal(self.index(x, y))
    }

    #[allow(missing_docs)]
    pub fn is_flipped_vertical_at(&self, x: u32, y: u32) -> bool {
        self.is_flipped_vertical(self.index(x, y))
    }

    #[allow(missing_docs)]
    pub fn is_flipped_diagonal_at(&self, x: u32, y: u32) -> bool {
        self.is_flipped_diagonal(self.index(x, y))
    }
}

/// What a [`Layer`] holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerKind {
    /// `layer` node
    Tiles(TileLayer),
    /// `objectgroup` node
    Objects {
        /// Objects in document order, nested object groups flattened.
        objects: Vec<Object>,
    },
    /// `imagelayer` node
    Image {
        /// The layer's image, if one is set.
        image: Option<Image>,
    },
}

/// A layer with the attributes every layer kind shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Unique layer id.
    pub id: u32,
    #[allow(missing_docs)]
    pub name: String,
    /// Hex color as written, e.g. `#ff8080`.
    pub tint_color: Option<String>,
    /// Defaults to `true`.
    pub visible: bool,
    /// Defaults to `false`.
    pub locked: bool,
    /// Horizontal rendering offset in pixels.
    pub offset_x: f32,
    /// Vertical rendering offset in pixels.
    pub offset_y: f32,
    #[allow(missing_docs)]
    pub properties: Properties,
    #[allow(missing_docs)]
    pub kind: LayerKind,
}

impl Layer {
    /// `"tilelayer"`, `"objectgroup"` or `"imagelayer"`.
    pub fn layer_type(&self) -> &'static str {
        match self.kind {
            LayerKind::Tiles(_) => "tilelayer",
            LayerKind::Objects { .. } => "objectgroup",
            LayerKind::Image { .. } => "imagelayer",
        }
    }

    /// Tile grid, if this is a tile layer.
    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tiles(tiles) => Some(tiles),
            _ => None,
        }
    }

    /// Objects, if this is an object layer.
    pub fn objects(&self) -> Option<&[Object]> {
        match &self.kind {
            LayerKind::Objects { objects } => Some(objects),
            _ => None,
        }
    }

    /// Builds a tile layer from a `layer` node.
    pub(crate) fn tile_layer(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let mut layer = shared_attributes(node, LayerKind::Tiles(TileLayer {
            width: 0,
            height: 0,
            data: Vec::new(),
            flip_flags: Vec::new(),
        }))?;
        let malformed = |e: ParseError| ParseError::layer(format!("tile layer '{}'", layer.name), Some(e));

        let width: u32 = xml::parse_required(node, "width").map_err(malformed)?;
        let height: u32 = xml::parse_required(node, "height").map_err(malformed)?;
        let data_node = xml::child(node, "data")
            .ok_or_else(|| ParseError::layer(format!("tile layer '{}' has no <data>", layer.name), None))?;

        let encoding = xml::attr(data_node, "encoding").ok_or_else(|| {
            ParseError::UnsupportedEncoding("XML <tile> elements (no encoding attribute)".into())
        })?;
        let compression = xml::attr(data_node, "compression");
        trace!("layer '{}': encoding={encoding} compression={compression:?}", layer.name);

        let decoded = data::decode(encoding, compression, data_node.text().unwrap_or_default())?;

        let expected = width as usize * height as usize;
        if decoded.len() != expected {
            return Err(ParseError::layer(
                format!(
                    "tile layer '{}' has {} cells, expected {width}x{height} = {expected}",
                    layer.name,
                    decoded.len()
                ),
                None,
            ));
        }

        layer.kind = LayerKind::Tiles(TileLayer {
            width,
            height,
            data: decoded.ids,
            flip_flags: decoded.flip_flags,
        });
        debug!("built tile layer {} '{}' ({width}x{height})", layer.id, layer.name);
        Ok(layer)
    }

    /// Builds an object layer from an `objectgroup` node.
    pub(crate) fn object_layer(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let objects = objects_from_nodes(node.children().filter(|c| c.is_element()))?;
        let layer = shared_attributes(node, LayerKind::Objects { objects })?;
        debug!("built object layer {} '{}'", layer.id, layer.name);
        Ok(layer)
    }

    /// Builds an image layer from an `imagelayer` node.
    pub(crate) fn image_layer(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let image = xml::child(node, "image")
            .map(Image::from_node)
            .transpose()
            .map_err(|e| ParseError::layer("image layer has an invalid <image>", Some(e)))?;
        let layer = shared_attributes(node, LayerKind::Image { image })?;
        debug!("built image layer {} '{}'", layer.id, layer.name);
        Ok(layer)
    }
}

fn shared_attributes(node: Node<'_, '_>, kind: LayerKind) -> Result<Layer, ParseError> {
    let tag = xml::tag(node);
    let id: u32 = xml::parse_required(node, "id")
        .map_err(|e| ParseError::layer(format!("<{tag}> has no valid 'id'"), Some(e)))?;
    let name = xml::required(node, "name")
        .map_err(|e| ParseError::layer(format!("<{tag}> {id} has no 'name'"), Some(e)))?
        .to_owned();

    Ok(Layer {
        id,
        tint_color: xml::owned(node, "tintcolor"),
        visible: xml::flag(node, "visible").unwrap_or(true),
        locked: xml::flag(node, "locked").unwrap_or(false),
        offset_x: offset(node, "offsetx", &name),
        offset_y: offset(node, "offsety", &name),
        properties: Properties::from_owner(node)
            .map_err(|e| ParseError::layer(format!("layer '{name}'"), Some(e)))?,
        name,
        kind,
    })
}

/// Offsets only override the default when well-formed.
fn offset(node: Node<'_, '_>, attribute: &str, layer: &str) -> f32 {
    match xml::parse_optional(node, attribute) {
        Ok(value) => value.unwrap_or(0.0),
        Err(e) => {
            warn!("layer '{layer}': ignoring {e}");
            0.0
        }
    }
}
