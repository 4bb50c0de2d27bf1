#![warn(missing_docs)]

//! Loader for Tiled TMX maps and TSX tilesets.
//!
//! Parses map and tileset documents into an owned, immutable model: layers,
//! groups, objects, tilesets and tile metadata. Tile layer data is decoded
//! from any of the csv, base64, base64+zlib and base64+gzip encodings into
//! parallel gid and flip-flag arrays. Gids can then be resolved to their
//! tileset and to a pixel rectangle in the tileset image.
//!
//! ```no_run
//! use tiled_tmx::Map;
//!
//! let map = Map::from_file("assets/level.tmx")?;
//! let tilesets = map.load_tilesets("assets/level.tmx")?;
//! for layer in &map.layers {
//!     let Some(tiles) = layer.as_tiles() else { continue };
//!     for &gid in tiles.data.iter().filter(|&&gid| gid != 0) {
//!         let entry = map.tileset_for_gid(gid).expect("gid has a tileset");
//!         if let Some(rect) = tilesets.get(&entry.first_gid).and_then(|ts| map.source_rect(entry, ts, gid)) {
//!             println!("{gid} -> {rect:?}");
//!         }
//!     }
//! }
//! # Ok::<(), tiled_tmx::MapError>(())
//! ```

mod data;
mod error;
mod gid;
mod group;
mod layer;
mod loader {
    pub mod tmx_loader;
}
mod map;
mod object;
mod properties;
mod resolve;
mod tileset;
mod xml;

pub use data::{decode as decode_tile_data, TileData};
pub use error::{Document, MapError, ParseError};
pub use gid::{TileId, FLAG_D, FLAG_H, FLAG_V, FLIP_D, FLIP_FLAGS_SHIFT, FLIP_H, FLIP_MASK, FLIP_V};
pub use group::{Group, MAX_GROUP_DEPTH};
pub use layer::{Layer, LayerKind, TileLayer};
pub use map::Map;
pub use object::{Object, ObjectShape};
pub use properties::{Properties, PropertyValue};
pub use resolve::{resolve_source_rect, resolve_tile, resolve_tileset, SourceRect};
pub use tileset::{build_tileset, Frame, Image, MapTileset, Terrain, TileDefinition, Tileset};
