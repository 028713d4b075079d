//! Read-only projections of the board for presentation layers.

use serde::Serialize;

use crate::world::entity::Player;
use crate::world::geometry::Location;
use crate::world::World;

const EMPTY_GLYPH: &str = "　";
const CELL_GAP: &str = "|.....|";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitMarker {
    pub owner: Player,
    pub hp: u32,
}

/// What is visible on a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexView {
    pub location: Location,
    pub building: Option<&'static str>,
    pub unit: Option<UnitMarker>,
}

impl HexView {
    /// Fixed-width text for the cell: building glyph then unit marker.
    pub fn label(&self) -> String {
        let background = self.building.unwrap_or(EMPTY_GLYPH);
        match &self.unit {
            Some(u) => format!("{}{}{}", background, u.owner.emoji(), u.hp),
            None => format!("{}{} ", background, EMPTY_GLYPH),
        }
    }
}

/// One row per `y`, one entry per `x`.
pub fn hexes_view(world: &World) -> Vec<Vec<HexView>> {
    (0..world.size_y())
        .map(|y| {
            (0..world.size_x())
                .map(|x| {
                    let location = Location::new(x, y);
                    HexView {
                        location,
                        building: world.building_at(location).map(|b| b.symbol()),
                        unit: world.unit_at(location).map(|u| UnitMarker {
                            owner: u.owner,
                            hp: u.hp,
                        }),
                    }
                })
                .collect()
        })
        .collect()
}

/// Draw the board as text. Each board row takes two lines: even columns on
/// the first, the lower-slung odd columns on the second.
pub fn render_board(world: &World) -> String {
    let rows = hexes_view(world);
    let mut out = String::new();

    for row in &rows {
        out.push('|');
        for (i, cell) in row.iter().step_by(2).enumerate() {
            if i > 0 {
                out.push_str(CELL_GAP);
            }
            out.push_str(&cell.label());
        }
        out.push_str("|\n");

        for cell in row.iter().skip(1).step_by(2) {
            out.push_str(CELL_GAP);
            out.push_str(&cell.label());
        }
        out.push_str(CELL_GAP);
        out.push('\n');
    }
    out.push_str(&"=".repeat(world.size_x() as usize * 6 + 1));
    out.push('\n');
    out
}
