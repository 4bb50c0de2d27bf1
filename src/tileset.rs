//! Tileset definitions and the map's references to them.

use log::debug;
use roxmltree::Node;
use serde::Serialize;

use crate::error::ParseError;
use crate::object::{objects_from_nodes, Object};
use crate::properties::Properties;
use crate::xml;

/// An image referenced by a tileset, tile or image layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Path as written in the document, relative to it.
    pub source: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Image {
    pub(crate) fn from_node(node: Node<'_, '_>) -> Result<Self, ParseError> {
        Ok(Image {
            source: xml::required(node, "source")?.to_owned(),
            width: xml::parse_required(node, "width")?,
            height: xml::parse_required(node, "height")?,
        })
    }
}

/// A terrain type declared by a tileset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Terrain {
    /// Terrain name.
    pub name: String,
    /// Local id of the tile used as the terrain's icon.
    pub tile: i32,
}

/// One frame of a tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Local id of the tile shown during this frame.
    pub tile_id: u32,
    /// Milliseconds.
    pub duration: u32,
}

/// Metadata for a single tile. Only tiles carrying metadata have one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileDefinition {
    /// Local index within the tileset, not a gid.
    pub id: u32,
    /// The tile's `type` attribute.
    pub kind: Option<String>,
    /// Terrain corner indices; `-1` where a corner has none.
    pub terrain: Option<Vec<i32>>,
    /// Custom properties.
    pub properties: Properties,
    /// Animation frames, empty when the tile is static.
    pub animation: Vec<Frame>,
    /// Per-tile image for image collection tilesets.
    pub image: Option<Image>,
    /// Collision shapes.
    pub objects: Vec<Object>,
}

/// A full tileset definition, inline or loaded from a `.tsx` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tileset {
    /// Tiled version that saved the tileset.
    pub tiled_version: Option<String>,
    #[allow(missing_docs)]
    pub name: Option<String>,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// Tiles per row as declared by the document.
    pub columns: u32,
    /// Pixels around the tiles in the image.
    pub margin: u32,
    /// Pixels between tiles in the image.
    pub spacing: u32,
    /// Atlas image; `None` for image collection tilesets.
    pub image: Option<Image>,
    /// Sparse per-tile metadata.
    pub tiles: Vec<TileDefinition>,
    #[allow(missing_docs)]
    pub terrains: Vec<Terrain>,
    #[allow(missing_docs)]
    pub properties: Properties,
}

/// Builds a [`Tileset`] from a `tileset` node.
///
/// Used for both inline tilesets inside a map and the root of a `.tsx` document.
pub fn build_tileset(node: Node<'_, '_>) -> Result<Tileset, ParseError> {
    let tileset = Tileset {
        tiled_version: xml::owned(node, "tiledversion"),
        name: xml::owned(node, "name"),
        tile_width: xml::parse_required(node, "tilewidth")?,
        tile_height: xml::parse_required(node, "tileheight")?,
        tile_count: xml::parse_required(node, "tilecount")?,
        columns: xml::parse_required(node, "columns")?,
        margin: xml::parse_or_default(node, "margin")?,
        spacing: xml::parse_or_default(node, "spacing")?,
        image: xml::child(node, "image").map(Image::from_node).transpose()?,
        tiles: xml::children(node, "tile")
            .map(tile_from_node)
            .collect::<Result<Vec<_>, _>>()?,
        terrains: xml::children(node, "terraintypes")
            .flat_map(|t| xml::children(t, "terrain"))
            .map(|t| {
                Ok(Terrain {
                    name: xml::required(t, "name")?.to_owned(),
                    tile: xml::parse_required(t, "tile")?,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?,
        properties: Properties::from_owner(node)?,
    };

    debug!(
        "built tileset {:?}: {} tiles, {} with metadata",
        tileset.name,
        tileset.tile_count,
        tileset.tiles.len()
    );
    Ok(tileset)
}

fn tile_from_node(node: Node<'_, '_>) -> Result<TileDefinition, ParseError> {
    let terrain = xml::attr(node, "terrain")
        .map(|list| {
            list.split(',')
                .map(|corner| match corner.trim() {
                    "" => Ok(-1),
                    value => xml::parse_value(node, "terrain", value),
                })
                .collect::<Result<Vec<i32>, _>>()
        })
        .transpose()?;

    let animation = xml::children(node, "animation")
        .flat_map(|a| xml::children(a, "frame"))
        .map(|f| {
            Ok(Frame {
                tile_id: xml::parse_required(f, "tileid")?,
                duration: xml::parse_required(f, "duration")?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(TileDefinition {
        id: xml::parse_required(node, "id")?,
        kind: xml::owned(node, "type"),
        terrain,
        properties: Properties::from_owner(node)?,
        animation,
        image: xml::child(node, "image").map(Image::from_node).transpose()?,
        objects: objects_from_nodes(xml::children(node, "objectgroup"))?,
    })
}

/// A map's reference to a tileset, keyed by the first gid it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapTileset {
    /// Smallest gid owned by the tileset.
    pub first_gid: u32,
    /// Path of the external `.tsx`, relative to the map. `None` for inline tilesets.
    pub source: Option<String>,
    /// The definition itself when it is embedded in the map.
    pub inline: Option<Tileset>,
}

impl MapTileset {
    pub(crate) fn from_node(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let first_gid = xml::parse_required(node, "firstgid")?;
        let source = xml::owned(node, "source");
        let inline = match source {
            Some(_) => None,
            None => Some(build_tileset(node)?),
        };
        Ok(MapTileset {
            first_gid,
            source,
            inline,
        })
    }
}
