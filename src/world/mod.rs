pub mod entity;
pub mod generation;
pub mod geometry;
pub mod pathing;
pub mod view;

use std::collections::BTreeMap;

pub use entity::{Building, BuildingKind, Owner, Player, Unit, UnitId};
pub use geometry::{Bounds, Location};

/// Default number of cells a single move may cover by chaining friendly trails.
pub const DEFAULT_TRAIL_CHAIN_LIMIT: u32 = 3;
/// Default unit hit point cap when standing on the home base.
pub const DEFAULT_BASE_HP_CAP: u32 = 8;

/// The board: dimensions, both factions' units and the building index.
///
/// Units live in one arena per faction and are addressed by [`UnitId`].
/// Buildings are keyed by location, which enforces at most one building
/// per cell. A unit may share a cell with a building (its own base included)
/// but never with another unit.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub bounds: Bounds,
    pub trail_chain_limit: u32,
    pub base_hp_cap: u32,
    units: [Vec<Unit>; 2],
    buildings: BTreeMap<Location, Building>,
    next_unit_id: u32,
}

impl World {
    /// An empty board with default movement rules.
    pub fn new(size_x: i32, size_y: i32) -> Self {
        assert!(size_x > 0 && size_y > 0, "Board must have at least one cell");
        World {
            bounds: Bounds { size_x, size_y },
            trail_chain_limit: DEFAULT_TRAIL_CHAIN_LIMIT,
            base_hp_cap: DEFAULT_BASE_HP_CAP,
            units: [Vec::new(), Vec::new()],
            buildings: BTreeMap::new(),
            next_unit_id: 0,
        }
    }

    pub fn size_x(&self) -> i32 {
        self.bounds.size_x
    }

    pub fn size_y(&self) -> i32 {
        self.bounds.size_y
    }

    pub fn neighbours(&self, loc: Location) -> Vec<Location> {
        geometry::neighbours(self.bounds, loc)
    }

    // --- Units ---

    pub fn units(&self, player: Player) -> &[Unit] {
        &self.units[player.index()]
    }

    pub fn all_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().flatten()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.all_units().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().flatten().find(|u| u.id == id)
    }

    pub fn unit_at(&self, loc: Location) -> Option<&Unit> {
        self.all_units().find(|u| u.location == loc)
    }

    pub fn is_occupied(&self, loc: Location) -> bool {
        self.unit_at(loc).is_some()
    }

    /// Place a new unit and return its handle.
    ///
    /// # Panics
    /// Panics if `loc` is off the board or already holds a unit.
    pub fn add_unit(&mut self, owner: Player, loc: Location, hp: u32) -> UnitId {
        assert!(self.bounds.contains(loc), "Unit location {} is off the board", loc);
        assert!(!self.is_occupied(loc), "Cell {} already holds a unit", loc);
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units[owner.index()].push(Unit {
            id,
            owner,
            location: loc,
            hp,
        });
        id
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        for units in &mut self.units {
            if let Some(pos) = units.iter().position(|u| u.id == id) {
                return Some(units.remove(pos));
            }
        }
        None
    }

    /// Remove every unit whose hit points reached zero, in arena order.
    pub fn remove_dead_units(&mut self) -> Vec<Unit> {
        let mut dead = Vec::new();
        for units in &mut self.units {
            let (gone, alive): (Vec<Unit>, Vec<Unit>) =
                std::mem::take(units).into_iter().partition(Unit::is_dead);
            *units = alive;
            dead.extend(gone);
        }
        dead
    }

    // --- Buildings ---

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn buildings_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.buildings.values_mut()
    }

    pub fn building_at(&self, loc: Location) -> Option<&Building> {
        self.buildings.get(&loc)
    }

    pub fn building_at_mut(&mut self, loc: Location) -> Option<&mut Building> {
        self.buildings.get_mut(&loc)
    }

    pub fn delete_building_at(&mut self, loc: Location) -> Option<Building> {
        self.buildings.remove(&loc)
    }

    /// Insert a building, returning whatever it replaced.
    pub fn place_building(&mut self, building: Building) -> Option<Building> {
        assert!(
            self.bounds.contains(building.location),
            "Building location {} is off the board",
            building.location
        );
        self.buildings.insert(building.location, building)
    }

    /// First building of `kind` owned by `player`, in location order.
    pub fn building_of(&self, player: Player, kind: BuildingKind) -> Option<&Building> {
        self.buildings
            .values()
            .find(|b| b.owner.is(player) && b.kind == kind)
    }

    pub fn buildings_of(&self, player: Player, kind: BuildingKind) -> Vec<&Building> {
        self.buildings
            .values()
            .filter(|b| b.owner.is(player) && b.kind == kind)
            .collect()
    }

    pub fn base_location(&self, player: Player) -> Option<Location> {
        self.building_of(player, BuildingKind::Base)
            .map(|b| b.location)
    }

    /// True if a building on `loc` stops `player` from entering.
    ///
    /// Units are deliberately not considered here; occupancy is checked
    /// separately by [`Unit::moveable`].
    pub fn not_passable(&self, player: Player, loc: Location) -> bool {
        self.buildings
            .get(&loc)
            .is_some_and(|b| b.blocks(player))
    }
}
