//! Semantic anchor labels.

use bitflags::bitflags;

bitflags! {
    /// Semantic categories an anchor can carry. Several bits may be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AnchorLabel: u32 {
        const FLOOR = 1 << 0;
        const CEILING = 1 << 1;
        const WALL_FACE = 1 << 2;
        const TABLE = 1 << 3;
        const COUCH = 1 << 4;
        const DOOR_FRAME = 1 << 5;
        const WINDOW_FRAME = 1 << 6;
        const OTHER = 1 << 7;
        const STORAGE = 1 << 8;
        const BED = 1 << 9;
        const SCREEN = 1 << 10;
        const LAMP = 1 << 11;
        const PLANT = 1 << 12;
        const WALL_ART = 1 << 13;
        const INVISIBLE_WALL_FACE = 1 << 14;
        const GLOBAL_MESH = 1 << 15;
    }
}

impl AnchorLabel {
    /// Labels that make an anchor part of the wall loop.
    pub const WALLS: Self = Self::WALL_FACE.union(Self::INVISIBLE_WALL_FACE);

    /// Labels whose functional surface sits at the middle of the volume.
    pub const SEATING: Self = Self::COUCH;

    pub fn is_wall(&self) -> bool {
        self.intersects(Self::WALLS)
    }

    pub fn is_seating(&self) -> bool {
        self.intersects(Self::SEATING)
    }

    /// Parse an authored node name such as `"WALL_FACE"`, `"Couch (2)"` or
    /// `"TABLE.001"` into a label. The suffix after the first space, `(` or
    /// `.` is ignored and matching is case-insensitive.
    pub fn parse_node_name(name: &str) -> Option<Self> {
        let stem = name
            .split(|c: char| c == ' ' || c == '(' || c == '.')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        Self::from_name(&stem).filter(|label| !label.is_empty())
    }
}

impl std::fmt::Display for AnchorLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}
