// src/loader/tmx_loader.rs
use crate::error::{Document, MapError};
use crate::map::Map;
use crate::tileset::{build_tileset, Tileset};
use crate::xml;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn read_document(path: &Path, extension: &str) -> Result<String, MapError> {
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(MapError::UnsupportedFormat(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Map {
    /// Reads and parses a `.tmx` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = read_document(path, "tmx")?;
        debug!("loading map {}", path.display());
        Self::parse_str(&text)
    }

    /// Collects every tileset the map references, keyed by first gid.
    ///
    /// Inline tilesets are cloned; external ones are read relative to the
    /// directory of `map_path`. Files that do not exist are skipped.
    pub fn load_tilesets(&self, map_path: impl AsRef<Path>) -> Result<BTreeMap<u32, Tileset>, MapError> {
        let map_dir = map_path
            .as_ref()
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./"));

        let mut tilesets = BTreeMap::new();
        for entry in &self.tilesets {
            if let Some(inline) = &entry.inline {
                tilesets.insert(entry.first_gid, inline.clone());
                continue;
            }
            let Some(source) = &entry.source else {
                continue;
            };

            let ts_path = map_dir.join(source);
            if !ts_path.exists() {
                warn!(
                    "tileset {} (firstgid {}) not found, skipping",
                    ts_path.display(),
                    entry.first_gid
                );
                continue;
            }
            tilesets.insert(entry.first_gid, Tileset::from_file(&ts_path)?);
        }
        Ok(tilesets)
    }
}

impl Tileset {
    /// Parses a tileset from TSX text.
    pub fn parse_str(text: &str) -> Result<Self, MapError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        if xml::tag(root) != "tileset" {
            return Err(MapError::UnexpectedRoot {
                expected: "tileset",
                found: xml::tag(root).to_string(),
            });
        }
        build_tileset(root).map_err(|source| MapError::Parse {
            document: Document::Tileset,
            source,
        })
    }

    /// Reads and parses a `.tsx` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = read_document(path, "tsx")?;
        debug!("loading tileset {}", path.display());
        Self::parse_str(&text)
    }
}
