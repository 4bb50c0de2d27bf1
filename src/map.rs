//! The map document root.

use log::debug;
use roxmltree::Node;
use serde::Serialize;

use crate::error::{Document, MapError, ParseError};
use crate::group::{build_hierarchy, Group, Hierarchy};
use crate::layer::Layer;
use crate::properties::Properties;
use crate::resolve::{resolve_source_rect, resolve_tile, resolve_tileset, SourceRect};
use crate::tileset::{MapTileset, TileDefinition, Tileset};
use crate::xml;

/// A parsed `.tmx` map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Map {
    /// Tiled version that saved the map.
    pub tiled_version: Option<String>,
    /// `orthogonal`, `isometric`, `staggered` or `hexagonal`.
    pub orientation: String,
    /// Tile draw order, e.g. `right-down`.
    pub render_order: Option<String>,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Chunked infinite map.
    pub infinite: bool,
    /// Hex color as written.
    pub background_color: Option<String>,
    #[allow(missing_docs)]
    pub properties: Properties,
    /// Tileset references in document order, expected sorted by `first_gid`.
    pub tilesets: Vec<MapTileset>,
    /// Top-level layers: tile layers, then object layers, then image layers.
    pub layers: Vec<Layer>,
    /// Top-level groups.
    pub groups: Vec<Group>,
}

impl Map {
    /// Parses a map from TMX text.
    pub fn parse_str(text: &str) -> Result<Self, MapError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        if xml::tag(root) != "map" {
            return Err(MapError::UnexpectedRoot {
                expected: "map",
                found: xml::tag(root).to_string(),
            });
        }
        Self::from_node(root).map_err(|source| MapError::Parse {
            document: Document::Map,
            source,
        })
    }

    fn from_node(node: Node<'_, '_>) -> Result<Self, ParseError> {
        let tilesets = xml::children(node, "tileset")
            .map(MapTileset::from_node)
            .collect::<Result<Vec<_>, _>>()?;
        let Hierarchy { layers, groups } = build_hierarchy(node, 0)?;

        let map = Map {
            tiled_version: xml::owned(node, "tiledversion"),
            orientation: xml::required(node, "orientation")?.to_owned(),
            render_order: xml::owned(node, "renderorder"),
            width: xml::parse_required(node, "width")?,
            height: xml::parse_required(node, "height")?,
            tile_width: xml::parse_required(node, "tilewidth")?,
            tile_height: xml::parse_required(node, "tileheight")?,
            infinite: xml::flag(node, "infinite").unwrap_or(false),
            background_color: xml::owned(node, "backgroundcolor"),
            properties: Properties::from_owner(node)?,
            tilesets,
            layers,
            groups,
        };

        debug!(
            "parsed {}x{} {} map: {} tilesets, {} layers, {} groups",
            map.width,
            map.height,
            map.orientation,
            map.tilesets.len(),
            map.layers.len(),
            map.groups.len()
        );
        Ok(map)
    }

    /// First layer with the given name, searching groups depth first.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.all_layers()))
            .find(|l| l.name == name)
    }

    /// Tileset reference owning `gid`. Flip bits must already be cleared.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<&MapTileset> {
        resolve_tileset(&self.tilesets, gid)
    }

    /// Metadata of `gid` within `tileset`, if any.
    pub fn tile<'a>(&self, entry: &MapTileset, tileset: &'a Tileset, gid: u32) -> Option<&'a TileDefinition> {
        resolve_tile(entry, tileset, gid)
    }

    /// Pixel rectangle of `gid` in `tileset`'s image.
    pub fn source_rect(&self, entry: &MapTileset, tileset: &Tileset, gid: u32) -> Option<SourceRect> {
        resolve_source_rect(tileset, entry, gid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;

    const TMX: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" tiledversion="1.10.2" orientation="orthogonal" renderorder="right-down" width="2" height="2" tilewidth="16" tileheight="16" infinite="0" backgroundcolor="#202020" nextlayerid="5" nextobjectid="2">
 <properties>
  <property name="title" value="cave"/>
  <property name="gravity" type="float" value="9.5"/>
 </properties>
 <tileset firstgid="1" name="inline" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="inline.png" width="32" height="32"/>
 </tileset>
 <tileset firstgid="5" source="other.tsx"/>
 <objectgroup id="2" name="things">
  <object id="1" x="8" y="8"><point/></object>
 </objectgroup>
 <layer id="1" name="ground" width="2" height="2">
  <data encoding="csv">1,2,3,2147483654</data>
 </layer>
 <group id="3" name="decor">
  <imagelayer id="4" name="sky"><image source="sky.png" width="64" height="64"/></imagelayer>
 </group>
</map>"##;

    #[test]
    fn parses_map_attributes_and_children() {
        let map = Map::parse_str(TMX).unwrap();

        assert_eq!(map.tiled_version.as_deref(), Some("1.10.2"));
        assert_eq!(map.orientation, "orthogonal");
        assert_eq!(map.render_order.as_deref(), Some("right-down"));
        assert_eq!((map.width, map.height, map.tile_width, map.tile_height), (2, 2, 16, 16));
        assert!(!map.infinite);
        assert_eq!(map.background_color.as_deref(), Some("#202020"));
        assert_eq!(map.properties.get_string("title"), Some("cave"));
        assert_eq!(map.properties.get_f32("gravity"), Some(9.5));

        assert_eq!(map.tilesets.len(), 2);
        assert!(map.tilesets[0].inline.is_some());
        assert_eq!(map.tilesets[1].source.as_deref(), Some("other.tsx"));

        let types: Vec<_> = map.layers.iter().map(Layer::layer_type).collect();
        assert_eq!(types, ["tilelayer", "objectgroup"]);
        let ground = map.layers[0].as_tiles().unwrap();
        assert_eq!(ground.data, [1, 2, 3, 6]);
        assert!(ground.is_flipped_horizontal_at(1, 1));

        assert_eq!(map.groups[0].layers.len(), 1);
        assert!(matches!(map.layer_by_name("sky").map(|l| &l.kind), Some(LayerKind::Image { .. })));
    }

    #[test]
    fn resolves_gids_through_map() {
        let map = Map::parse_str(TMX).unwrap();
        let entry = map.tileset_for_gid(4).unwrap();
        let tileset = entry.inline.as_ref().unwrap();
        assert_eq!(
            map.source_rect(entry, tileset, 4),
            Some(SourceRect { x: 16, y: 16, width: 16, height: 16 })
        );
        assert!(map.tile(entry, tileset, 4).is_none());
        assert_eq!(map.tileset_for_gid(6).and_then(|t| t.source.as_deref()), Some("other.tsx"));
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(Map::parse_str(TMX).unwrap(), Map::parse_str(TMX).unwrap());
    }

    #[test]
    fn rejects_other_roots_and_bad_xml() {
        let err = Map::parse_str(r#"<tileset tilewidth="1"/>"#).unwrap_err();
        assert!(matches!(err, MapError::UnexpectedRoot { expected: "map", ref found } if found == "tileset"));

        assert!(matches!(Map::parse_str("<map"), Err(MapError::Xml(_))));
    }

    #[test]
    fn failures_are_wrapped_with_their_cause() {
        let err = Map::parse_str(r#"<map width="1" height="1" tilewidth="1" tileheight="1"/>"#).unwrap_err();
        match err {
            MapError::Parse { document: Document::Map, source: ParseError::MissingAttribute { attribute, .. } } => {
                assert_eq!(attribute, "orientation")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Map::parse_str(
            r#"<map orientation="orthogonal" width="1" height="1" tilewidth="1" tileheight="1">
                 <layer id="1" name="l" width="1" height="1"><data encoding="base64" compression="zstd">AAAA</data></layer>
               </map>"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::Parse { source: ParseError::UnsupportedEncoding(_), .. }));
    }
}
