//! One round of play and the transition to the next.
//!
//! A `Turn` tracks which units may still act, applies menu and unit actions,
//! and on [`Turn::next`] resolves the round boundary: growth, healing,
//! simultaneous melee and passive effects, in that order.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::game::actions::{LocationType, MenuAction, UnitAction};
use crate::game::resources::{Cost, ResourceKind};
use crate::game::GameState;
use crate::world::{Building, BuildingKind, Location, Owner, Player, UnitId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// The match already has a winner.
    GameFinished,
    UnitNotActionable(UnitId),
    IllegalUnitTarget {
        unit: UnitId,
        action: UnitAction,
        target: Location,
    },
    IllegalMenuTarget {
        action: MenuAction,
        target: Location,
    },
    Unaffordable {
        action: MenuAction,
        cost: Cost,
    },
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::GameFinished => write!(f, "The match is already finished"),
            TurnError::UnitNotActionable(id) => {
                write!(f, "Unit {} cannot act this round", id.0)
            }
            TurnError::IllegalUnitTarget {
                unit,
                action,
                target,
            } => write!(f, "Unit {} cannot {} at {}", unit.0, action, target),
            TurnError::IllegalMenuTarget { action, target } => {
                write!(f, "{} is not available at {}", action, target)
            }
            TurnError::Unaffordable { action, cost } => {
                write!(f, "Cannot afford {} ({})", action, cost)
            }
        }
    }
}

impl std::error::Error for TurnError {}

/// Event log of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundLog {
    pub num: u32,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Turn {
    num: u32,
    game: GameState,
    actionable: [Vec<UnitId>; 2],
    messages: Vec<String>,
    completed: [bool; 2],
}

impl Turn {
    /// Open round `num`. Every living unit may act once.
    pub fn new(num: u32, game: GameState) -> Self {
        let mut turn = Turn {
            num,
            game,
            actionable: [Vec::new(), Vec::new()],
            messages: Vec::new(),
            completed: [false; 2],
        };
        turn.reset_actionable();
        turn
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn into_game(self) -> GameState {
        self.game
    }

    /// Events of the round so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn actionable_units(&self, player: Player) -> &[UnitId] {
        &self.actionable[player.index()]
    }

    pub fn is_finished(&self) -> bool {
        self.game.winner().is_some()
    }

    fn reset_actionable(&mut self) {
        for player in Player::ALL {
            self.actionable[player.index()] =
                self.game.world.units(player).iter().map(|u| u.id).collect();
        }
    }

    fn log(&mut self, player: Player, message: String) {
        self.messages.push(format!("{}: {}", player.name(), message));
    }

    // --- Menu actions ---

    /// Every menu action `player` can afford right now, with the cells it
    /// may target. Actions without any target are left out.
    pub fn menu_actionable_actions(&self, player: Player) -> BTreeMap<MenuAction, Vec<Location>> {
        if self.is_finished() {
            return BTreeMap::new();
        }
        let ledger = self.game.ledger(player);
        MenuAction::ALL
            .iter()
            .filter(|action| ledger.can_pay(action.cost(&self.game, player)))
            .map(|&action| (action, self.menu_targets(player, action)))
            .filter(|(_, locs)| !locs.is_empty())
            .collect()
    }

    fn menu_targets(&self, player: Player, action: MenuAction) -> Vec<Location> {
        let world = &self.game.world;
        let base = world.base_location(player);
        match action.location_type() {
            LocationType::Unit => world
                .units(player)
                .iter()
                .map(|u| u.location)
                .filter(|&loc| Some(loc) != base)
                .collect(),
            LocationType::BaseWithoutUnit => {
                base.filter(|&loc| !world.is_occupied(loc)).into_iter().collect()
            }
            LocationType::Bomb => world
                .buildings_of(player, BuildingKind::Bomb)
                .iter()
                .map(|b| b.location)
                .collect(),
        }
    }

    /// Buy and carry out a menu action at `loc`.
    pub fn menu_action(
        &mut self,
        player: Player,
        action: MenuAction,
        loc: Location,
    ) -> Result<(), TurnError> {
        if self.is_finished() {
            return Err(TurnError::GameFinished);
        }
        if !self.menu_targets(player, action).contains(&loc) {
            return Err(TurnError::IllegalMenuTarget {
                action,
                target: loc,
            });
        }
        let cost = action.cost(&self.game, player);
        if !self.game.ledger_mut(player).pay(cost) {
            return Err(TurnError::Unaffordable { action, cost });
        }

        match action.builds() {
            Some(kind) => self.build(player, kind, loc),
            None if action == MenuAction::SpawnUnit => self.spawn_unit(player, loc),
            None => self.detonate(player, loc),
        }
        debug!(player = player.name(), action = %action, location = %loc, "Menu action applied");

        self.check_winner();
        Ok(())
    }

    fn build(&mut self, player: Player, kind: BuildingKind, loc: Location) {
        let replaced = self
            .game
            .world
            .place_building(Building::built(player, kind, loc));
        if let Some(old) = replaced {
            self.log(player, format!("cleared the {} at {} to make room", old.kind.name(), loc));
        }
        self.log(player, format!("built a {} at {}", kind.name(), loc));
    }

    fn spawn_unit(&mut self, player: Player, loc: Location) {
        let hp = self.game.rules.base_hp_cap;
        let id = self.game.world.add_unit(player, loc, hp);
        self.game.record_spawn(player);
        self.actionable[player.index()].push(id);
        self.log(player, format!("spawned a unit at {}; it can act right away", loc));
    }

    /// Wipe out the bomb cell and its neighbours. Ponds survive.
    fn detonate(&mut self, player: Player, loc: Location) {
        self.log(player, format!("detonated the bomb at {}", loc));
        let mut area = vec![loc];
        area.extend(self.game.world.neighbours(loc));

        for cell in area {
            let world = &mut self.game.world;
            let is_pond = world
                .building_at(cell)
                .is_some_and(|b| b.kind == BuildingKind::Pond);
            let destroyed = if is_pond {
                None
            } else {
                world.delete_building_at(cell)
            };
            let killed = world.unit_at(cell).map(|u| u.id);
            if let Some(id) = killed {
                world.remove_unit(id);
            }
            if let Some(b) = destroyed {
                if b.kind != BuildingKind::Bomb || cell != loc {
                    self.log(player, format!("the blast destroyed the {} at {}", b.kind.name(), cell));
                }
            }
            if killed.is_some() {
                self.log(player, format!("the blast killed the unit at {}", cell));
            }
        }
    }

    // --- Unit actions ---

    /// Cells `unit` can target this round, each implying exactly one action.
    pub fn unit_actionable_locs(&self, player: Player, unit: UnitId) -> Vec<Location> {
        if self.is_finished() || !self.actionable_units(player).contains(&unit) {
            return Vec::new();
        }
        let world = &self.game.world;
        let Some(u) = world.unit(unit) else {
            return Vec::new();
        };

        let mut locs = world.neighbours(u.location);
        for loc in u.moveable(world) {
            if !locs.contains(&loc) {
                locs.push(loc);
            }
        }
        locs.retain(|&loc| UnitAction::reason(&self.game, u, loc).is_some());
        locs
    }

    /// Have `unit` perform `action` against `loc`. The unit is spent afterwards.
    pub fn unit_action(
        &mut self,
        player: Player,
        unit: UnitId,
        loc: Location,
        action: UnitAction,
    ) -> Result<(), TurnError> {
        if self.is_finished() {
            return Err(TurnError::GameFinished);
        }
        if !self.actionable_units(player).contains(&unit) {
            return Err(TurnError::UnitNotActionable(unit));
        }
        let Some(u) = self.game.world.unit(unit).cloned() else {
            return Err(TurnError::UnitNotActionable(unit));
        };
        if UnitAction::reason(&self.game, &u, loc) != Some(action) {
            return Err(TurnError::IllegalUnitTarget {
                unit,
                action,
                target: loc,
            });
        }

        self.log(player, format!("unit at {} chose to {} at {}", u.location, action, loc));
        match action {
            UnitAction::Move => self.move_unit(unit, loc),
            UnitAction::HarvestWoods | UnitAction::MineOre | UnitAction::AttackBarricade => {
                self.wear_down(player, loc, action.gathers())
            }
        }
        debug!(player = player.name(), unit = unit.0, action = %action, location = %loc, "Unit action applied");

        self.actionable[player.index()].retain(|&id| id != unit);
        self.check_winner();
        Ok(())
    }

    fn move_unit(&mut self, id: UnitId, loc: Location) {
        let world = &mut self.game.world;
        let Some(unit) = world.unit_mut(id) else {
            return;
        };
        unit.location = loc;
        let moved = unit.clone();
        let cap = moved.max_hp(world);
        if let Some(unit) = world.unit_mut(id) {
            unit.hp = unit.hp.min(cap);
        }
        self.unit_passive_action(id);
    }

    fn wear_down(&mut self, player: Player, loc: Location, gathered: Option<ResourceKind>) {
        if let Some(kind) = gathered {
            self.game.ledger_mut(player).add(kind, 1);
        }
        let Some(building) = self.game.world.building_at_mut(loc) else {
            return;
        };
        let left = building.hp.map(|hp| hp.saturating_sub(1));
        building.hp = left;
        let kind = building.kind;
        if left == Some(0) {
            self.game.world.delete_building_at(loc);
            self.log(player, format!("the {} at {} is gone", kind.name(), loc));
        }
    }

    /// Effects of standing on a cell: harvest own fruit, raid enemy buildings.
    fn unit_passive_action(&mut self, id: UnitId) {
        let Some(unit) = self.game.world.unit(id) else {
            return;
        };
        let (player, loc) = (unit.owner, unit.location);
        let Some(building) = self.game.world.building_at(loc) else {
            return;
        };
        let (owner, kind) = (building.owner, building.kind);
        let rules = &self.game.rules;
        let (fruit_money, fruit_seed, raid_money) =
            (rules.fruit_money, rules.fruit_seed, rules.raid_money);

        if owner.is(player) && kind == BuildingKind::Fruits {
            if let Some(b) = self.game.world.building_at_mut(loc) {
                b.kind = BuildingKind::Seeds0;
            }
            let ledger = self.game.ledger_mut(player);
            ledger.add(ResourceKind::Money, fruit_money);
            ledger.add(ResourceKind::Seed, fruit_seed);
            self.log(player, format!("harvested the fruits at {}", loc));
        } else if owner == Owner::Faction(player.opponent()) {
            self.game.world.delete_building_at(loc);
            self.game
                .ledger_mut(player)
                .add(ResourceKind::Money, raid_money);
            self.log(player, format!("raided the enemy {} at {}", kind.name(), loc));
        }
    }

    fn check_winner(&mut self) {
        if let Some(winner) = self.game.winner() {
            self.actionable = [Vec::new(), Vec::new()];
            self.messages.push(format!("{} {} wins!", winner.emoji(), winner.name()));
            info!(winner = winner.name(), turn = self.num, "Match decided");
        }
    }

    // --- Round boundary ---

    fn heal_at_base(&mut self) {
        let heal = self.game.rules.heal_per_round;
        let world = &self.game.world;
        let healed: Vec<(UnitId, u32)> = world
            .all_units()
            .filter(|u| world.base_location(u.owner) == Some(u.location))
            .filter_map(|u| {
                let hp = (u.hp + heal).min(u.max_hp(world));
                (hp > u.hp).then_some((u.id, hp))
            })
            .collect();

        for (id, hp) in healed {
            if let Some(unit) = self.game.world.unit_mut(id) {
                unit.hp = hp;
                let (owner, loc) = (unit.owner, unit.location);
                self.log(owner, format!("unit at {} recovered to {} hp", loc, hp));
            }
        }
    }

    /// Every adjacent Human/Pest pair trades `min(hp_a, hp_b)` damage, using
    /// hit points from before any blow lands.
    fn resolve_melee(&mut self) {
        let world = &self.game.world;
        let mut damage: HashMap<UnitId, u32> = HashMap::new();
        let mut clashes = Vec::new();

        for human in world.units(Player::Human) {
            let around = world.neighbours(human.location);
            for pest in world.units(Player::Pest) {
                if !around.contains(&pest.location) {
                    continue;
                }
                let blow = human.hp.min(pest.hp);
                *damage.entry(human.id).or_default() += blow;
                *damage.entry(pest.id).or_default() += blow;
                clashes.push((human.location, pest.location, blow));
            }
        }

        for (human_loc, pest_loc, blow) in clashes {
            self.messages.push(format!(
                "Melee: Human unit at {} and Pest unit at {} trade {} damage",
                human_loc, pest_loc, blow
            ));
        }
        for (id, blow) in damage {
            if let Some(unit) = self.game.world.unit_mut(id) {
                unit.hp = unit.hp.saturating_sub(blow);
            }
        }
        for dead in self.game.world.remove_dead_units() {
            self.log(dead.owner, format!("unit at {} died", dead.location));
        }
    }

    /// Close this round and open the next one in place.
    ///
    /// Returns the log of the round that just ended. Only its messages are
    /// kept: the finished round's actionable units and completion flags are
    /// reset for the new round.
    pub fn next(&mut self) -> Result<RoundLog, TurnError> {
        if self.is_finished() {
            return Err(TurnError::GameFinished);
        }

        self.game.tick();
        let finished = RoundLog {
            num: self.num,
            messages: std::mem::take(&mut self.messages),
        };
        self.num += 1;

        self.heal_at_base();
        self.resolve_melee();

        let ids: Vec<UnitId> = self.game.world.all_units().map(|u| u.id).collect();
        for id in ids {
            if self.is_finished() {
                break;
            }
            self.unit_passive_action(id);
        }

        self.reset_actionable();
        self.completed = [false; 2];
        self.check_winner();
        info!(turn = self.num, "Round advanced");
        Ok(finished)
    }

    /// Mark `player` as done for this round.
    pub fn complete(&mut self, player: Player) {
        self.completed[player.index()] = true;
    }

    pub fn is_completed(&self, player: Player) -> bool {
        self.completed[player.index()]
    }

    pub fn all_completed(&self) -> bool {
        self.completed.iter().all(|&done| done)
    }

    /// Run [`Turn::next`] once both factions have completed the round.
    pub fn advance_if_completed(&mut self) -> Result<Option<RoundLog>, TurnError> {
        if self.all_completed() {
            self.next().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rules::RulesConfig;
    use crate::game::resources::ResourceLedger;
    use crate::world::World;

    const HUMAN_BASE: Location = Location::new(2, 0);
    const PEST_BASE: Location = Location::new(2, 7);

    fn empty_board() -> World {
        let mut world = World::new(5, 8);
        world.place_building(Building::built(Player::Human, BuildingKind::Base, HUMAN_BASE));
        world.place_building(Building::built(Player::Pest, BuildingKind::Base, PEST_BASE));
        world
    }

    fn place(world: &mut World, owner: Owner, kind: BuildingKind, x: i32, y: i32) {
        let hp = kind.fixed_hp();
        world.place_building(Building::with_hp(owner, kind, Location::new(x, y), hp));
    }

    fn turn_with(world: World) -> Turn {
        Turn::new(1, GameState::new(world, RulesConfig::default()))
    }

    fn hp_of(turn: &Turn, id: UnitId) -> Option<u32> {
        turn.game().world.unit(id).map(|u| u.hp)
    }

    #[test]
    fn opening_menu_is_empty() {
        let mut world = empty_board();
        world.add_unit(Player::Human, HUMAN_BASE, 8);
        world.add_unit(Player::Pest, PEST_BASE, 8);
        let turn = turn_with(world);
        assert!(turn.menu_actionable_actions(Player::Human).is_empty());
        assert!(turn.menu_actionable_actions(Player::Pest).is_empty());
        assert_eq!(turn.actionable_units(Player::Human).len(), 1);
    }

    #[test]
    fn farming_targets_units_off_base() {
        let mut world = empty_board();
        world.add_unit(Player::Human, HUMAN_BASE, 8);
        world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);

        let menu = turn.menu_actionable_actions(Player::Human);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[&MenuAction::BuildFarm], vec![Location::new(1, 1)]);

        turn.menu_action(Player::Human, MenuAction::BuildFarm, Location::new(1, 1))
            .unwrap();
        let b = turn.game().world.building_at(Location::new(1, 1)).unwrap();
        assert_eq!(b.kind, BuildingKind::Seeds0);
        assert!(b.owner.is(Player::Human));
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Seed), 0);
        assert!(turn.menu_actionable_actions(Player::Human).is_empty());

        let err = turn
            .menu_action(Player::Human, MenuAction::BuildFarm, Location::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, TurnError::Unaffordable { .. }), "{}", err);
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Seed), 0);
    }

    #[test]
    fn building_over_a_cell_replaces_what_was_there() {
        let mut world = empty_board();
        let loc = Location::new(1, 1);
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Trail, 1, 1);
        world.add_unit(Player::Human, loc, 6);
        let mut turn = turn_with(world);

        turn.menu_action(Player::Human, MenuAction::BuildFarm, loc).unwrap();
        assert_eq!(
            turn.game().world.building_at(loc).map(|b| b.kind),
            Some(BuildingKind::Seeds0)
        );
        assert!(turn.messages().iter().any(|m| m.contains("cleared the trail")));
    }

    #[test]
    fn menu_rejects_cells_outside_the_target_set() {
        let mut world = empty_board();
        world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);
        let err = turn
            .menu_action(Player::Human, MenuAction::BuildFarm, Location::new(3, 3))
            .unwrap_err();
        assert_eq!(
            err,
            TurnError::IllegalMenuTarget {
                action: MenuAction::BuildFarm,
                target: Location::new(3, 3)
            }
        );
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Seed), 1);
    }

    #[test]
    fn spawned_units_act_the_same_round() {
        let mut world = empty_board();
        world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut game = GameState::new(world, RulesConfig::default());
        *game.ledger_mut(Player::Human) = ResourceLedger::new(0, 0, 0, 2);
        let mut turn = Turn::new(1, game);

        let menu = turn.menu_actionable_actions(Player::Human);
        assert_eq!(menu[&MenuAction::SpawnUnit], vec![HUMAN_BASE]);
        turn.menu_action(Player::Human, MenuAction::SpawnUnit, HUMAN_BASE)
            .unwrap();

        let spawned = turn.game().world.unit_at(HUMAN_BASE).unwrap().clone();
        assert_eq!(spawned.hp, 8);
        assert_eq!(turn.game().spawned(Player::Human), 2);
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Money), 0);
        assert_eq!(turn.game().cost_to_spawn_unit(Player::Human).amount, 4);
        assert!(turn.actionable_units(Player::Human).contains(&spawned.id));
        assert!(!turn.unit_actionable_locs(Player::Human, spawned.id).is_empty());
        // The base is occupied now.
        assert!(!turn
            .menu_actionable_actions(Player::Human)
            .contains_key(&MenuAction::SpawnUnit));
    }

    #[test]
    fn detonation_clears_the_blast_area_except_ponds() {
        let mut world = empty_board();
        let bomb = Location::new(2, 3);
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Bomb, 2, 3);
        place(&mut world, Owner::Neutral, BuildingKind::Pond, 2, 2);
        place(&mut world, Owner::Neutral, BuildingKind::Tree, 1, 3);
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Trail, 2, 4);
        place(&mut world, Owner::Neutral, BuildingKind::Rock, 0, 5);
        let pest = world.add_unit(Player::Pest, Location::new(3, 3), 8);
        let far = world.add_unit(Player::Pest, Location::new(4, 6), 8);
        let mut turn = turn_with(world);

        let menu = turn.menu_actionable_actions(Player::Human);
        assert_eq!(menu[&MenuAction::TriggerBomb], vec![bomb]);
        turn.menu_action(Player::Human, MenuAction::TriggerBomb, bomb)
            .unwrap();

        let world = &turn.game().world;
        assert!(world.building_at(bomb).is_none());
        assert!(world.building_at(Location::new(1, 3)).is_none());
        assert!(world.building_at(Location::new(2, 4)).is_none());
        assert_eq!(
            world.building_at(Location::new(2, 2)).map(|b| b.kind),
            Some(BuildingKind::Pond)
        );
        assert!(world.building_at(Location::new(0, 5)).is_some());
        assert!(world.unit(pest).is_none());
        assert!(world.unit(far).is_some());
    }

    #[test]
    fn detonating_next_to_the_enemy_base_wins() {
        let mut world = empty_board();
        let bomb = Location::new(2, 6);
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Bomb, 2, 6);
        world.add_unit(Player::Human, Location::new(0, 0), 8);
        let pest = world.add_unit(Player::Pest, Location::new(4, 7), 8);
        let mut turn = turn_with(world);
        assert!(turn.game().world.neighbours(bomb).contains(&PEST_BASE));
        assert_eq!(turn.actionable_units(Player::Pest), &[pest]);

        turn.menu_action(Player::Human, MenuAction::TriggerBomb, bomb)
            .unwrap();

        assert!(turn.game().world.building_at(PEST_BASE).is_none());
        assert_eq!(turn.game().winner(), Some(Player::Human));
        assert!(turn.actionable_units(Player::Human).is_empty());
        assert!(turn.actionable_units(Player::Pest).is_empty());
        assert!(turn.messages().last().unwrap().contains("Human wins"));
        assert!(turn.game().world.unit(pest).is_some());
        assert_eq!(
            turn.menu_action(Player::Human, MenuAction::TriggerBomb, bomb),
            Err(TurnError::GameFinished)
        );
    }

    #[test]
    fn unprimed_bombs_cannot_be_triggered() {
        let mut world = empty_board();
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Bomb0, 2, 3);
        let mut turn = turn_with(world);
        assert!(turn.menu_actionable_actions(Player::Human).is_empty());
        assert!(turn
            .menu_action(Player::Human, MenuAction::TriggerBomb, Location::new(2, 3))
            .is_err());

        turn.next().unwrap();
        assert_eq!(
            turn.menu_actionable_actions(Player::Human)[&MenuAction::TriggerBomb],
            vec![Location::new(2, 3)]
        );
    }

    #[test]
    fn melee_is_simultaneous_and_lethal() {
        let mut world = empty_board();
        let human = world.add_unit(Player::Human, Location::new(1, 1), 5);
        let pest = world.add_unit(Player::Pest, Location::new(1, 2), 3);
        let lone = world.add_unit(Player::Pest, Location::new(4, 5), 4);
        let mut turn = turn_with(world);

        turn.next().unwrap();
        assert_eq!(hp_of(&turn, human), Some(2));
        assert_eq!(hp_of(&turn, pest), None);
        assert_eq!(hp_of(&turn, lone), Some(4));
        assert!(turn.messages().iter().any(|m| m.contains("died")));
    }

    #[test]
    fn equal_melee_kills_both() {
        let mut world = empty_board();
        let human = world.add_unit(Player::Human, Location::new(1, 1), 4);
        let pest = world.add_unit(Player::Pest, Location::new(1, 2), 4);
        let mut turn = turn_with(world);
        turn.next().unwrap();
        assert_eq!(hp_of(&turn, human), None);
        assert_eq!(hp_of(&turn, pest), None);
        assert!(turn.actionable_units(Player::Human).is_empty());
    }

    #[test]
    fn melee_uses_hit_points_from_before_the_clash() {
        // One Human between two Pests takes both blows.
        let mut world = empty_board();
        let human = world.add_unit(Player::Human, Location::new(2, 3), 6);
        let left = world.add_unit(Player::Pest, Location::new(1, 3), 2);
        let right = world.add_unit(Player::Pest, Location::new(3, 3), 3);
        let mut turn = turn_with(world);
        turn.next().unwrap();
        assert_eq!(hp_of(&turn, human), Some(1));
        assert_eq!(hp_of(&turn, left), None);
        assert_eq!(hp_of(&turn, right), None);
    }

    #[test]
    fn units_heal_on_their_own_base() {
        let mut world = empty_board();
        let id = world.add_unit(Player::Human, HUMAN_BASE, 2);
        let mut turn = turn_with(world);
        turn.next().unwrap();
        assert_eq!(hp_of(&turn, id), Some(5));
        turn.next().unwrap();
        assert_eq!(hp_of(&turn, id), Some(8));
        turn.next().unwrap();
        assert_eq!(hp_of(&turn, id), Some(8));
    }

    #[test]
    fn moving_onto_own_fruit_harvests_it() {
        let mut world = empty_board();
        place(&mut world, Owner::Faction(Player::Human), BuildingKind::Fruits, 1, 2);
        let id = world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);

        let target = Location::new(1, 2);
        assert!(turn.unit_actionable_locs(Player::Human, id).contains(&target));
        turn.unit_action(Player::Human, id, target, UnitAction::Move)
            .unwrap();

        let ledger = turn.game().ledger(Player::Human);
        assert_eq!(ledger.amount(ResourceKind::Money), 3);
        assert_eq!(ledger.amount(ResourceKind::Seed), 2);
        assert_eq!(
            turn.game().world.building_at(target).map(|b| b.kind),
            Some(BuildingKind::Seeds0)
        );
        assert!(turn.actionable_units(Player::Human).is_empty());
        assert!(turn.unit_actionable_locs(Player::Human, id).is_empty());
        assert_eq!(
            turn.unit_action(Player::Human, id, Location::new(1, 3), UnitAction::Move),
            Err(TurnError::UnitNotActionable(id))
        );
    }

    #[test]
    fn moving_caps_hit_points_to_the_new_cell() {
        let mut world = empty_board();
        let id = world.add_unit(Player::Human, HUMAN_BASE, 8);
        let mut turn = turn_with(world);
        turn.unit_action(Player::Human, id, Location::new(2, 1), UnitAction::Move)
            .unwrap();
        assert_eq!(hp_of(&turn, id), Some(7));
    }

    #[test]
    fn raiding_the_enemy_base_wins() {
        let mut world = empty_board();
        let raider = world.add_unit(Player::Human, Location::new(2, 6), 8);
        let other = world.add_unit(Player::Human, Location::new(0, 0), 8);
        world.add_unit(Player::Pest, Location::new(0, 7), 8);
        let mut turn = turn_with(world);

        turn.unit_action(Player::Human, raider, PEST_BASE, UnitAction::Move)
            .unwrap();
        assert_eq!(turn.game().winner(), Some(Player::Human));
        assert!(turn.is_finished());
        assert!(turn.actionable_units(Player::Human).is_empty());
        assert!(turn.actionable_units(Player::Pest).is_empty());
        assert!(turn.messages().last().unwrap().contains("Human wins"));
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Money), 1);

        assert_eq!(turn.next(), Err(TurnError::GameFinished));
        assert_eq!(
            turn.unit_action(Player::Human, other, Location::new(0, 1), UnitAction::Move),
            Err(TurnError::GameFinished)
        );
        assert!(turn.menu_actionable_actions(Player::Human).is_empty());
        assert_eq!(
            turn.menu_action(Player::Human, MenuAction::BuildTrail, Location::new(0, 0)),
            Err(TurnError::GameFinished)
        );
    }

    #[test]
    fn standing_on_enemy_crops_raids_them_at_round_start() {
        let mut world = empty_board();
        place(&mut world, Owner::Faction(Player::Pest), BuildingKind::Seeds, 3, 4);
        world.add_unit(Player::Human, Location::new(3, 4), 5);
        let mut turn = turn_with(world);
        turn.next().unwrap();
        assert!(turn.game().world.building_at(Location::new(3, 4)).is_none());
        assert_eq!(turn.game().ledger(Player::Human).amount(ResourceKind::Money), 1);
    }

    #[test]
    fn harvesting_wears_down_the_tree() {
        let mut world = empty_board();
        place(&mut world, Owner::Neutral, BuildingKind::Tree, 1, 2);
        let id = world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);
        let tree = Location::new(1, 2);

        for round in 1..=3 {
            assert!(turn.unit_actionable_locs(Player::Human, id).contains(&tree));
            turn.unit_action(Player::Human, id, tree, UnitAction::HarvestWoods)
                .unwrap();
            assert_eq!(
                turn.game().ledger(Player::Human).amount(ResourceKind::Wood),
                round
            );
            turn.next().unwrap();
        }
        assert!(turn.game().world.building_at(tree).is_none());
        assert_eq!(
            UnitAction::reason(turn.game(), turn.game().world.unit(id).unwrap(), tree),
            Some(UnitAction::Move)
        );
    }

    #[test]
    fn wrong_action_for_target_is_rejected() {
        let mut world = empty_board();
        place(&mut world, Owner::Neutral, BuildingKind::Tree, 1, 2);
        let id = world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);
        let err = turn
            .unit_action(Player::Human, id, Location::new(1, 2), UnitAction::Move)
            .unwrap_err();
        assert!(matches!(err, TurnError::IllegalUnitTarget { .. }));
        assert!(turn
            .unit_action(Player::Human, id, Location::new(4, 7), UnitAction::Move)
            .is_err());
        assert_eq!(turn.actionable_units(Player::Human), &[id]);
    }

    #[test]
    fn next_returns_the_closed_round_log() {
        let mut world = empty_board();
        let id = world.add_unit(Player::Human, Location::new(1, 1), 6);
        let mut turn = turn_with(world);
        turn.unit_action(Player::Human, id, Location::new(1, 2), UnitAction::Move)
            .unwrap();
        let log = turn.next().unwrap();
        assert_eq!(log.num, 1);
        assert_eq!(log.messages.len(), 1);
        assert_eq!(turn.num(), 2);
        assert!(turn.messages().is_empty());
        assert_eq!(turn.actionable_units(Player::Human), &[id]);
    }

    #[test]
    fn round_advances_once_both_factions_complete() {
        let mut turn = turn_with(empty_board());
        turn.complete(Player::Human);
        assert!(turn.is_completed(Player::Human));
        assert_eq!(turn.advance_if_completed(), Ok(None));
        turn.complete(Player::Pest);
        let log = turn.advance_if_completed().unwrap();
        assert_eq!(log.map(|l| l.num), Some(1));
        assert_eq!(turn.num(), 2);
        assert!(!turn.all_completed());
    }
}
