//! Flip bits packed into the high end of a gid.

use serde::Serialize;

/// Horizontal flip, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// All three flip bits.
pub const FLIP_MASK: u32 = FLIP_H | FLIP_V | FLIP_D;

/// Moves the three flip bits down so they occupy the low end of a byte.
pub const FLIP_FLAGS_SHIFT: u32 = 29;

/// Horizontal flip in a decoded flag byte.
pub const FLAG_H: u8 = (FLIP_H >> FLIP_FLAGS_SHIFT) as u8; // 0b100
/// Vertical flip in a decoded flag byte.
pub const FLAG_V: u8 = (FLIP_V >> FLIP_FLAGS_SHIFT) as u8; // 0b010
/// Diagonal flip in a decoded flag byte.
pub const FLAG_D: u8 = (FLIP_D >> FLIP_FLAGS_SHIFT) as u8; // 0b001

/// A raw 32-bit cell value as stored in tile data or an object's `gid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileId(pub u32);

impl TileId {
    /// Value as read, flip bits included.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Tile id with the flip bits cleared.
    #[inline] pub fn clean(self) -> u32 { self.0 & !FLIP_MASK }
    /// Flip bits shifted into a byte (`0b HVD`).
    #[inline] pub fn flip_flags(self) -> u8 { ((self.0 & FLIP_MASK) >> FLIP_FLAGS_SHIFT) as u8 }
    #[allow(missing_docs)]
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    #[allow(missing_docs)]
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    #[allow(missing_docs)]
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }

    /// Splits the cell into its tile id and flag byte.
    #[inline]
    pub fn split(self) -> (u32, u8) {
        (self.clean(), self.flip_flags())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flip_bits_land_in_low_byte() {
        assert_eq!(TileId(FLIP_H | 7).split(), (7, 0b100));
        assert_eq!(TileId(FLIP_V | 7).split(), (7, 0b010));
        assert_eq!(TileId(FLIP_D | 7).split(), (7, 0b001));
        assert_eq!(TileId(7).split(), (7, 0));
    }

    #[test]
    fn combined_flip_bits_or_together() {
        let id = TileId(FLIP_H | FLIP_D | 42);
        assert_eq!(id.flip_flags(), FLAG_H | FLAG_D);
        assert!(id.flip_h() && id.flip_d() && !id.flip_v());
        assert_eq!(id.clean(), 42);
        assert_eq!(TileId(FLIP_MASK).split(), (0, 0b111));
    }
}
