//! Axial hex-grid coordinates.
//!
//! All spatial math in the core is exact integer math over axial
//! coordinates `(q, r)` with the implicit cube coordinate `s = -q - r`.
//! Determinism requires a total order on coordinates; [`HexCoord`]
//! derives `Ord` over `(q, r)` and that order is used as the tie-breaker
//! throughout pathfinding and encounter resolution.

use serde::{Deserialize, Serialize};

/// One of the six hex directions, in fixed enumeration order.
///
/// The enumeration order is part of the deterministic contract: neighbor
/// iteration, facing recomputation and spawn-tile probing all walk
/// directions in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// +q
    East,
    /// +q, -r
    NorthEast,
    /// -r
    NorthWest,
    /// -q
    West,
    /// -q, +r
    SouthWest,
    /// +r
    SouthEast,
}

impl Direction {
    /// All six directions in enumeration order.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Axial offset for this direction.
    #[must_use]
    pub const fn offset(self) -> HexCoord {
        match self {
            Direction::East => HexCoord { q: 1, r: 0 },
            Direction::NorthEast => HexCoord { q: 1, r: -1 },
            Direction::NorthWest => HexCoord { q: 0, r: -1 },
            Direction::West => HexCoord { q: -1, r: 0 },
            Direction::SouthWest => HexCoord { q: -1, r: 1 },
            Direction::SouthEast => HexCoord { q: 0, r: 1 },
        }
    }

    /// The direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::West => Direction::East,
            Direction::SouthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::NorthWest,
        }
    }

    /// Index of this direction in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::East => 0,
            Direction::NorthEast => 1,
            Direction::NorthWest => 2,
            Direction::West => 3,
            Direction::SouthWest => 4,
            Direction::SouthEast => 5,
        }
    }
}

/// Axial coordinates for a hex grid `(q, r)`.
///
/// The implicit cube coordinate is `s = -q - r`. Equality and hashing are
/// by `(q, r)`; the derived `Ord` (q first, then r) is the canonical
/// deterministic tie-break order for the whole core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HexCoord {
    /// Axial column.
    pub q: i32,
    /// Axial row.
    pub r: i32,
}

impl HexCoord {
    /// Create a coordinate from axial components.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The origin coordinate `(0, 0)`.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Derived cube coordinate `s = -q - r`.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// The adjacent coordinate in the given direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let d = direction.offset();
        Self {
            q: self.q + d.q,
            r: self.r + d.r,
        }
    }

    /// All six adjacent coordinates, in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> [HexCoord; 6] {
        let mut out = [HexCoord::ORIGIN; 6];
        let mut i = 0;
        while i < 6 {
            out[i] = self.neighbor(Direction::ALL[i]);
            i += 1;
        }
        out
    }

    /// Hex distance: `(|dq| + |dr| + |ds|) / 2`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// The direction from `self` to an adjacent coordinate.
    ///
    /// Returns `None` if `other` is not at hex distance exactly 1.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.neighbor(d) == other)
    }
}

impl std::ops::Add for HexCoord {
    type Output = HexCoord;

    fn add(self, rhs: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q + rhs.q,
            r: self.r + rhs.r,
        }
    }
}

impl std::ops::Sub for HexCoord {
    type Output = HexCoord;

    fn sub(self, rhs: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q - rhs.q,
            r: self.r - rhs.r,
        }
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
