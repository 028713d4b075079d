//! The closed set of things a faction or a unit can do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::resources::{Cost, ResourceKind};
use crate::game::GameState;
use crate::world::{BuildingKind, Location, Player, Unit};

/// Which cells a menu action may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    /// Cells holding one of the faction's units, except its base.
    Unit,
    /// The faction's base, while no unit stands on it.
    BaseWithoutUnit,
    /// The faction's primed bombs.
    Bomb,
}

/// Faction-level actions bought from the build menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    BuildFarm,
    BuildTrail,
    BuildBarricade,
    SpawnUnit,
    PlaceBomb,
    TriggerBomb,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::BuildFarm,
        MenuAction::BuildTrail,
        MenuAction::BuildBarricade,
        MenuAction::SpawnUnit,
        MenuAction::PlaceBomb,
        MenuAction::TriggerBomb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::BuildFarm => "Build farm",
            MenuAction::BuildTrail => "Build trail",
            MenuAction::BuildBarricade => "Build barricade",
            MenuAction::SpawnUnit => "Spawn unit",
            MenuAction::PlaceBomb => "Place bomb",
            MenuAction::TriggerBomb => "Trigger bomb",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MenuAction::BuildFarm => "Plant seeds. They bear fruit three rounds later.",
            MenuAction::BuildTrail => {
                "Lay a trail. Chained trails let a unit cover more ground in one move and keep its hit point cap high."
            }
            MenuAction::BuildBarricade => {
                "Raise a barricade your units can pass but the enemy cannot. Three hits knock it down."
            }
            MenuAction::SpawnUnit => {
                "Field a new unit at your base. It can act immediately. Each spawn costs more than the last."
            }
            MenuAction::PlaceBomb => "Plant a bomb. It needs at least one round to prime.",
            MenuAction::TriggerBomb => {
                "Detonate a primed bomb, wiping out everything within one cell, friend or foe."
            }
        }
    }

    pub fn location_type(self) -> LocationType {
        match self {
            MenuAction::SpawnUnit => LocationType::BaseWithoutUnit,
            MenuAction::TriggerBomb => LocationType::Bomb,
            _ => LocationType::Unit,
        }
    }

    /// The building this action puts on its target cell.
    pub fn builds(self) -> Option<BuildingKind> {
        match self {
            MenuAction::BuildFarm => Some(BuildingKind::Seeds0),
            MenuAction::BuildTrail => Some(BuildingKind::Trail),
            MenuAction::BuildBarricade => Some(BuildingKind::Barricade),
            MenuAction::PlaceBomb => Some(BuildingKind::Bomb0),
            MenuAction::SpawnUnit | MenuAction::TriggerBomb => None,
        }
    }

    /// Current price for `player`. Spawning gets dearer with every unit fielded.
    pub fn cost(self, game: &GameState, player: Player) -> Cost {
        match self {
            MenuAction::BuildFarm => Cost::new(ResourceKind::Seed, 1),
            MenuAction::BuildTrail => Cost::new(ResourceKind::Wood, 1),
            MenuAction::BuildBarricade => Cost::new(ResourceKind::Wood, 2),
            MenuAction::SpawnUnit => game.cost_to_spawn_unit(player),
            MenuAction::PlaceBomb => Cost::new(ResourceKind::Ore, 3),
            MenuAction::TriggerBomb => Cost::FREE,
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Actions a single unit takes against a target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitAction {
    Move,
    HarvestWoods,
    MineOre,
    AttackBarricade,
}

impl UnitAction {
    pub const ALL: [UnitAction; 4] = [
        UnitAction::Move,
        UnitAction::HarvestWoods,
        UnitAction::MineOre,
        UnitAction::AttackBarricade,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnitAction::Move => "move",
            UnitAction::HarvestWoods => "harvest woods",
            UnitAction::MineOre => "mine ore",
            UnitAction::AttackBarricade => "attack barricade",
        }
    }

    /// Resource gained per hit, for actions that wear down a building.
    pub fn gathers(self) -> Option<ResourceKind> {
        match self {
            UnitAction::HarvestWoods => Some(ResourceKind::Wood),
            UnitAction::MineOre => Some(ResourceKind::Ore),
            UnitAction::Move | UnitAction::AttackBarricade => None,
        }
    }

    /// The action `unit` would take by targeting `loc`, if any.
    ///
    /// Moving wins over everything else; otherwise an adjacent tree, rock or
    /// barricade that the unit's faction does not own can be worked on.
    pub fn reason(game: &GameState, unit: &Unit, loc: Location) -> Option<UnitAction> {
        if game.winner().is_some() {
            return None;
        }
        let world = &game.world;
        if unit.moveable(world).contains(&loc) {
            return Some(UnitAction::Move);
        }
        if !world.neighbours(unit.location).contains(&loc) {
            return None;
        }

        let building = world.building_at(loc)?;
        if building.owner.is(unit.owner) {
            return None;
        }
        match building.kind {
            BuildingKind::Tree => Some(UnitAction::HarvestWoods),
            BuildingKind::Rock => Some(UnitAction::MineOre),
            BuildingKind::Barricade => Some(UnitAction::AttackBarricade),
            _ => None,
        }
    }
}

impl fmt::Display for UnitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rules::RulesConfig;
    use crate::world::{Building, Owner, World};

    fn game_with(buildings: &[(Owner, BuildingKind, Location)]) -> GameState {
        let mut world = World::new(5, 8);
        for (player, y) in [(Player::Human, 0), (Player::Pest, 7)] {
            world.place_building(Building::with_hp(
                Owner::Faction(player),
                BuildingKind::Base,
                Location::new(2, y),
                None,
            ));
        }
        for &(owner, kind, loc) in buildings {
            world.place_building(Building::with_hp(owner, kind, loc, Some(3)));
        }
        GameState::new(world, RulesConfig::default())
    }

    #[test]
    fn costs() {
        let game = game_with(&[]);
        let cost = |a: MenuAction| a.cost(&game, Player::Human);
        assert_eq!(cost(MenuAction::BuildFarm), Cost::new(ResourceKind::Seed, 1));
        assert_eq!(cost(MenuAction::BuildBarricade), Cost::new(ResourceKind::Wood, 2));
        assert_eq!(cost(MenuAction::SpawnUnit), Cost::new(ResourceKind::Money, 2));
        assert_eq!(cost(MenuAction::TriggerBomb).amount, 0);
    }

    #[test]
    fn only_build_actions_place_buildings() {
        for action in MenuAction::ALL {
            let builds = action.builds().is_some();
            assert_eq!(builds, action.location_type() == LocationType::Unit, "{}", action);
        }
    }

    #[test]
    fn reason_picks_the_action_implied_by_the_target() {
        let tree = Location::new(1, 1);
        let rock = Location::new(2, 1);
        let own_barricade = Location::new(0, 1);
        let enemy_barricade = Location::new(1, 2);
        let mut game = game_with(&[
            (Owner::Neutral, BuildingKind::Tree, tree),
            (Owner::Neutral, BuildingKind::Rock, rock),
            (Owner::Faction(Player::Human), BuildingKind::Barricade, own_barricade),
            (Owner::Faction(Player::Pest), BuildingKind::Barricade, enemy_barricade),
        ]);
        // (1, 1) is a tree, so put the unit next door at (0, 2).
        let id = game.world.add_unit(Player::Human, Location::new(0, 2), 8);
        let unit = game.world.unit(id).unwrap().clone();

        assert_eq!(UnitAction::reason(&game, &unit, tree), Some(UnitAction::HarvestWoods));
        assert_eq!(UnitAction::reason(&game, &unit, own_barricade), Some(UnitAction::Move));
        assert_eq!(
            UnitAction::reason(&game, &unit, enemy_barricade),
            Some(UnitAction::AttackBarricade)
        );
        assert_eq!(UnitAction::reason(&game, &unit, Location::new(0, 3)), Some(UnitAction::Move));
        // Not adjacent.
        assert_eq!(UnitAction::reason(&game, &unit, rock), None);
        assert_eq!(UnitAction::reason(&game, &unit, Location::new(4, 6)), None);
    }

    #[test]
    fn no_reasons_after_the_match_is_decided() {
        let mut game = game_with(&[]);
        let id = game.world.add_unit(Player::Human, Location::new(1, 1), 8);
        let unit = game.world.unit(id).unwrap().clone();
        assert_eq!(UnitAction::reason(&game, &unit, Location::new(1, 2)), Some(UnitAction::Move));
        game.world.delete_building_at(Location::new(2, 7));
        assert_eq!(UnitAction::reason(&game, &unit, Location::new(1, 2)), None);
    }

    #[test]
    fn gathering_yields() {
        assert_eq!(UnitAction::HarvestWoods.gathers(), Some(ResourceKind::Wood));
        assert_eq!(UnitAction::MineOre.gathers(), Some(ResourceKind::Ore));
        assert_eq!(UnitAction::AttackBarricade.gathers(), None);
    }
}
