//! Gid to tileset resolution.

use serde::Serialize;

use crate::tileset::{MapTileset, TileDefinition, Tileset};

/// Pixel rectangle of a tile inside its tileset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceRect {
    #[allow(missing_docs)]
    pub x: u32,
    #[allow(missing_docs)]
    pub y: u32,
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
}

/// Finds the tileset owning `gid`.
///
/// `offsets` must be sorted by ascending `first_gid`. Each entry owns
/// `[first_gid, next.first_gid)`; any gid no earlier range claims falls to the
/// last entry. Gid 0 and empty tables resolve to `None`.
pub fn resolve_tileset(offsets: &[MapTileset], gid: u32) -> Option<&MapTileset> {
    if gid == 0 {
        return None;
    }
    offsets
        .windows(2)
        .find(|pair| (pair[0].first_gid..pair[1].first_gid).contains(&gid))
        .map(|pair| &pair[0])
        .or_else(|| offsets.last())
}

/// Source rectangle of `gid` in `tileset`'s image.
///
/// Tiles are laid out row by row with `image.width / tile_width` per row.
/// An image narrower than one tile never wraps, keeping every tile on row 0.
/// Margin and spacing are not applied. `None` when the tileset has no image,
/// a zero tile size, or the local index falls outside `0..tile_count`.
pub fn resolve_source_rect(tileset: &Tileset, entry: &MapTileset, gid: u32) -> Option<SourceRect> {
    let image = tileset.image.as_ref()?;
    if tileset.tile_width == 0 || tileset.tile_height == 0 {
        return None;
    }
    let local = gid.checked_sub(entry.first_gid)?;
    let per_row = image.width / tileset.tile_width;

    let (mut col, mut row) = (0, 0);
    for index in 0..tileset.tile_count {
        if index == local {
            return Some(SourceRect {
                x: col * tileset.tile_width,
                y: row * tileset.tile_height,
                width: tileset.tile_width,
                height: tileset.tile_height,
            });
        }
        col += 1;
        if col == per_row {
            col = 0;
            row += 1;
        }
    }
    None
}

/// Per-tile metadata for `gid`, if the tileset carries any for it.
pub fn resolve_tile<'a>(entry: &MapTileset, tileset: &'a Tileset, gid: u32) -> Option<&'a TileDefinition> {
    let local = gid.checked_sub(entry.first_gid)?;
    tileset.tiles.iter().find(|t| t.id == local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;
    use crate::tileset::Image;

    fn entry(first_gid: u32, source: &str) -> MapTileset {
        MapTileset {
            first_gid,
            source: Some(source.to_string()),
            inline: None,
        }
    }

    fn atlas(image_width: u32) -> Tileset {
        Tileset {
            tiled_version: None,
            name: Some("atlas".into()),
            tile_width: 16,
            tile_height: 8,
            tile_count: 64,
            columns: 4,
            margin: 0,
            spacing: 0,
            image: Some(Image {
                source: "atlas.png".into(),
                width: image_width,
                height: 64,
            }),
            tiles: vec![TileDefinition {
                id: 5,
                kind: Some("lava".into()),
                terrain: None,
                properties: Properties::new(),
                animation: Vec::new(),
                image: None,
                objects: Vec::new(),
            }],
            terrains: Vec::new(),
            properties: Properties::new(),
        }
    }

    #[test]
    fn ranges_are_half_open_and_last_is_open_ended() {
        let offsets = [entry(1, "a"), entry(50, "b"), entry(200, "c")];
        let owner = |gid| resolve_tileset(&offsets, gid).and_then(|t| t.source.as_deref());

        assert_eq!(owner(1), Some("a"));
        assert_eq!(owner(49), Some("a"));
        assert_eq!(owner(50), Some("b"));
        assert_eq!(owner(199), Some("b"));
        assert_eq!(owner(200), Some("c"));
        assert_eq!(owner(10_000), Some("c"));
        assert_eq!(owner(0), None);
    }

    #[test]
    fn gids_below_the_first_range_fall_to_the_last_entry() {
        let offsets = [entry(5, "a"), entry(50, "b")];
        let owner = |gid| resolve_tileset(&offsets, gid).map(|t| t.first_gid);

        assert_eq!(owner(3), Some(50));
        assert_eq!(owner(5), Some(5));
        assert_eq!(owner(0), None);
    }

    #[test]
    fn empty_table_resolves_nothing() {
        assert!(resolve_tileset(&[], 1).is_none());
    }

    #[test]
    fn source_rect_wraps_rows() {
        let ts = atlas(64);
        let e = entry(10, "atlas");

        assert_eq!(resolve_source_rect(&ts, &e, 10), Some(SourceRect { x: 0, y: 0, width: 16, height: 8 }));
        assert_eq!(resolve_source_rect(&ts, &e, 13), Some(SourceRect { x: 48, y: 0, width: 16, height: 8 }));
        assert_eq!(resolve_source_rect(&ts, &e, 14), Some(SourceRect { x: 0, y: 8, width: 16, height: 8 }));
        assert_eq!(resolve_source_rect(&ts, &e, 19), Some(SourceRect { x: 16, y: 16, width: 16, height: 8 }));
        assert_eq!(resolve_source_rect(&ts, &e, 9), None);
    }

    #[test]
    fn source_rect_stops_at_tile_count() {
        let ts = atlas(64);
        let e = entry(1, "atlas");
        assert!(resolve_source_rect(&ts, &e, 64).is_some());
        assert_eq!(resolve_source_rect(&ts, &e, 65), None);
    }

    #[test]
    fn narrow_image_keeps_tiles_on_first_row() {
        let ts = atlas(8);
        let e = entry(1, "atlas");
        assert_eq!(resolve_source_rect(&ts, &e, 3), Some(SourceRect { x: 32, y: 0, width: 16, height: 8 }));
    }

    #[test]
    fn source_rect_needs_an_image() {
        let mut ts = atlas(64);
        ts.image = None;
        assert_eq!(resolve_source_rect(&ts, &entry(1, "atlas"), 1), None);
    }

    #[test]
    fn tile_metadata_by_local_id() {
        let ts = atlas(64);
        let e = entry(100, "atlas");
        assert_eq!(resolve_tile(&e, &ts, 105).and_then(|t| t.kind.as_deref()), Some("lava"));
        assert!(resolve_tile(&e, &ts, 104).is_none());
        assert!(resolve_tile(&e, &ts, 5).is_none());
    }
}
