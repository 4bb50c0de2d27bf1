//! Tile layer `<data>` payload decoding.
//!
//! Every cell is a little-endian `u32` gid whose top three bits carry flip
//! flags. Decoding yields two index-aligned arrays: the gids with those bits
//! cleared, and one flag byte per cell (`0b HVD`).

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::{DeflateDecoder, GzDecoder};
use log::trace;
use serde::Serialize;

use crate::error::ParseError;
use crate::gid::TileId;

const CELL_SIZE: usize = std::mem::size_of::<u32>();

/// Length of the zlib header skipped before raw inflate.
const ZLIB_HEADER_LEN: usize = 2;

/// Decoded cells of a tile layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TileData {
    /// Tile gids, flip bits cleared. `0` means empty.
    pub ids: Vec<u32>,
    /// Flip flags per cell, co-indexed with `ids`.
    pub flip_flags: Vec<u8>,
}

impl TileData {
    fn with_capacity(n: usize) -> Self {
        TileData {
            ids: Vec::with_capacity(n),
            flip_flags: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, raw: u32) {
        let (id, flags) = TileId(raw).split();
        self.ids.push(id);
        self.flip_flags.push(flags);
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no cell was decoded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decodes a `<data>` payload given its `encoding` and optional `compression` attributes.
pub fn decode(encoding: &str, compression: Option<&str>, payload: &str) -> Result<TileData, ParseError> {
    match (encoding, compression) {
        ("csv", _) => decode_csv(payload),
        ("base64", None) => Ok(cells_from_bytes(&decode_base64(payload)?)),
        ("base64", Some("zlib")) => {
            let bytes = decode_base64(payload)?;
            let deflate = bytes.get(ZLIB_HEADER_LEN..).ok_or_else(|| {
                ParseError::layer("zlib tile data is shorter than its header", None)
            })?;
            Ok(cells_from_bytes(&inflate(DeflateDecoder::new(deflate))?))
        }
        ("base64", Some("gzip")) => {
            let bytes = decode_base64(payload)?;
            Ok(cells_from_bytes(&inflate(GzDecoder::new(&bytes[..]))?))
        }
        ("base64", Some(other)) => Err(ParseError::UnsupportedEncoding(format!(
            "base64 with '{other}' compression"
        ))),
        (other, _) => Err(ParseError::UnsupportedEncoding(other.to_string())),
    }
}

fn decode_csv(payload: &str) -> Result<TileData, ParseError> {
    let tokens: Vec<&str> = payload.split(',').collect();
    let mut out = TileData::with_capacity(tokens.len());
    for token in tokens {
        let token = token.trim();
        let raw: u32 = token.parse().map_err(|_| ParseError::InvalidNumberFormat {
            what: "csv tile data".into(),
            value: token.to_string(),
        })?;
        out.push(raw);
    }
    trace!("decoded {} csv cells", out.len());
    Ok(out)
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, ParseError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

fn inflate(mut decoder: impl Read) -> Result<Vec<u8>, ParseError> {
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Reads little-endian cells; a trailing partial cell is dropped.
fn cells_from_bytes(bytes: &[u8]) -> TileData {
    let chunks = bytes.chunks_exact(CELL_SIZE);
    if !chunks.remainder().is_empty() {
        trace!("dropping {} trailing tile data bytes", chunks.remainder().len());
    }
    let mut out = TileData::with_capacity(bytes.len() / CELL_SIZE);
    for chunk in chunks {
        out.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    trace!("decoded {} binary cells", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::{FLIP_D, FLIP_H, FLIP_V};
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    const CELLS: [u32; 6] = [1, 0, FLIP_H | 3, FLIP_V | 4, FLIP_D | 5, FLIP_H | FLIP_V | FLIP_D | 6];

    fn le_bytes(cells: &[u32]) -> Vec<u8> {
        cells.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    fn zlib(bytes: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn csv_splits_ids_and_flags() {
        let payload = CELLS.map(|c| c.to_string()).join(",\n  ");
        let data = decode("csv", None, &format!("\n  {payload}\n")).unwrap();

        assert_eq!(data.ids, [1, 0, 3, 4, 5, 6]);
        assert_eq!(data.flip_flags, [0, 0, 0b100, 0b010, 0b001, 0b111]);
        for (i, raw) in CELLS.iter().enumerate() {
            let rebuilt = data.ids[i] | (u32::from(data.flip_flags[i]) << 29);
            assert_eq!(rebuilt, *raw);
        }
    }

    #[test]
    fn csv_rejects_garbage_tokens() {
        let err = decode("csv", None, "1,two,3").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumberFormat { ref value, .. } if value == "two"));
    }

    #[test]
    fn all_base64_variants_agree() {
        let raw = le_bytes(&CELLS);
        let plain = decode("base64", None, &STANDARD.encode(&raw)).unwrap();
        let zlibbed = decode("base64", Some("zlib"), &STANDARD.encode(zlib(&raw))).unwrap();
        let gzipped = decode("base64", Some("gzip"), &STANDARD.encode(gzip(&raw))).unwrap();
        let csv = decode("csv", None, &CELLS.map(|c| c.to_string()).join(",")).unwrap();

        assert_eq!(plain, csv);
        assert_eq!(zlibbed, csv);
        assert_eq!(gzipped, csv);
    }

    #[test]
    fn base64_payload_may_be_surrounded_by_whitespace() {
        let encoded = format!("\n   {}\n  ", STANDARD.encode(le_bytes(&[9, 10])));
        assert_eq!(decode("base64", None, &encoded).unwrap().ids, [9, 10]);
    }

    #[test]
    fn trailing_partial_cell_is_dropped() {
        let mut raw = le_bytes(&[7, 8]);
        raw.extend_from_slice(&[1, 2]);
        let data = decode("base64", Some("gzip"), &STANDARD.encode(gzip(&raw))).unwrap();
        assert_eq!(data.ids, [7, 8]);
        assert_eq!(data.flip_flags.len(), 2);
    }

    #[test]
    fn unsupported_encodings_fail() {
        let err = decode("base64", Some("zstd"), "AAAA").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedEncoding(_)));

        let err = decode("xml", None, "").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedEncoding(_)));
    }

    #[test]
    fn bad_base64_and_truncated_zlib_fail() {
        assert!(matches!(decode("base64", None, "***"), Err(ParseError::Base64(_))));
        assert!(matches!(
            decode("base64", Some("zlib"), &STANDARD.encode([0x78u8])),
            Err(ParseError::MalformedLayer { .. })
        ));
    }
}
