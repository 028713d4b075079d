pub mod actions;
pub mod ai;
pub mod resources;
pub mod statistics;
pub mod turn;

use crate::config::rules::RulesConfig;
use crate::world::{BuildingKind, Player, World};
use resources::{Cost, ResourceKind, ResourceLedger};

/// Per-match state: the board plus each faction's economy.
///
/// The winner is derived from the board rather than stored, so it can never
/// disagree with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub world: World,
    pub rules: RulesConfig,
    ledgers: [ResourceLedger; 2],
    spawned: [u32; 2],
}

impl GameState {
    /// Start a match on `world`. The rule constants also govern the board's
    /// movement and hit point caps.
    pub fn new(mut world: World, rules: RulesConfig) -> Self {
        world.trail_chain_limit = rules.trail_chain_limit;
        world.base_hp_cap = rules.base_hp_cap;
        let ledger = ResourceLedger::new(
            rules.starting_seed,
            rules.starting_wood,
            rules.starting_ore,
            rules.starting_money,
        );
        GameState {
            world,
            rules,
            ledgers: [ledger; 2],
            // The opening unit counts as the first spawn.
            spawned: [1; 2],
        }
    }

    pub fn ledger(&self, player: Player) -> &ResourceLedger {
        &self.ledgers[player.index()]
    }

    pub fn ledger_mut(&mut self, player: Player) -> &mut ResourceLedger {
        &mut self.ledgers[player.index()]
    }

    pub fn spawned(&self, player: Player) -> u32 {
        self.spawned[player.index()]
    }

    pub fn record_spawn(&mut self, player: Player) {
        self.spawned[player.index()] += 1;
    }

    /// The faction whose opponent has lost its base, if any.
    pub fn winner(&self) -> Option<Player> {
        if self.world.base_location(Player::Human).is_none() {
            Some(Player::Pest)
        } else if self.world.base_location(Player::Pest).is_none() {
            Some(Player::Human)
        } else {
            None
        }
    }

    /// 2, 4, 8, ... money, doubling with every unit the faction has fielded.
    pub fn cost_to_spawn_unit(&self, player: Player) -> Cost {
        Cost::new(ResourceKind::Money, 2_u32.saturating_pow(self.spawned(player)))
    }

    /// Advance every growing building one stage.
    pub fn tick(&mut self) {
        for building in self.world.buildings_mut() {
            building.kind = building.kind.grown();
        }
    }

    /// Number of buildings of `kind` a faction owns.
    pub fn count_buildings(&self, player: Player, kind: BuildingKind) -> usize {
        self.world.buildings_of(player, kind).len()
    }
}
