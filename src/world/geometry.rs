use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the offset hex board.
///
/// `x` grows to the right and `y` grows downwards. Odd columns sit half a
/// cell lower than even columns ("odd-q" layout), so the neighbour offsets
/// depend on the parity of `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Neighbor offsets for odd columns (x % 2 == 1) in odd-q offset layout.
const ODD_COLUMN_NEIGHBORS: [(i32, i32); 6] = [
    (0, -1),  // North
    (-1, 0),  // Northwest
    (1, 0),   // Northeast
    (-1, 1),  // Southwest
    (0, 1),   // South
    (1, 1),   // Southeast
];

/// Neighbor offsets for even columns (x % 2 == 0) in odd-q offset layout.
const EVEN_COLUMN_NEIGHBORS: [(i32, i32); 6] = [
    (-1, -1), // Northwest
    (0, -1),  // North
    (1, -1),  // Northeast
    (-1, 0),  // Southwest
    (1, 0),   // Southeast
    (0, 1),   // South
];

/// Board dimensions. Every cell satisfies `0 <= x < size_x` and `0 <= y < size_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub size_x: i32,
    pub size_y: i32,
}

impl Bounds {
    pub fn contains(&self, loc: Location) -> bool {
        (0..self.size_x).contains(&loc.x) && (0..self.size_y).contains(&loc.y)
    }

    /// Every cell of the board, row by row.
    pub fn locations(&self) -> impl Iterator<Item = Location> + use<> {
        let Bounds { size_x, size_y } = *self;
        (0..size_y).flat_map(move |y| (0..size_x).map(move |x| Location::new(x, y)))
    }
}

/// The up-to-six cells adjacent to `loc`, clipped to the board.
///
/// Order is fixed (north first, clockwise-ish per column parity) so that any
/// search built on top of it is deterministic.
pub fn neighbours(bounds: Bounds, loc: Location) -> Vec<Location> {
    let offsets = if loc.x.rem_euclid(2) == 1 {
        &ODD_COLUMN_NEIGHBORS
    } else {
        &EVEN_COLUMN_NEIGHBORS
    };

    offsets
        .iter()
        .map(|&(dx, dy)| Location::new(loc.x + dx, loc.y + dy))
        .filter(|n| bounds.contains(*n))
        .collect()
}

/// Number of single steps between two cells on an unobstructed board.
pub fn hex_distance(a: Location, b: Location) -> u32 {
    let (aq, ar) = to_axial(a);
    let (bq, br) = to_axial(b);
    let dq = aq - bq;
    let dr = ar - br;
    let ds = -dq - dr;
    ((dq.abs() + dr.abs() + ds.abs()) / 2) as u32
}

fn to_axial(loc: Location) -> (i32, i32) {
    let q = loc.x;
    let r = loc.y - (loc.x - (loc.x & 1)) / 2;
    (q, r)
}
