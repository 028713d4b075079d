//! Movement rules shared by the turn engine and the AI.
//!
//! A move covers one step, plus up to `trail_chain_limit - 1` further steps
//! while the unit keeps landing on its own trails. Destructible obstacles can
//! be "fought through" by [`World::move_distance`] at a cost of their hit
//! points; ponds cannot be crossed at all.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::world::entity::{BuildingKind, Player, Unit};
use crate::world::geometry::{hex_distance, Location};
use crate::world::World;

/// How entering a cell is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Open,
    /// Blocking building that has to be worn down first.
    Obstacle(u32),
}

impl World {
    pub fn is_own_trail(&self, player: Player, loc: Location) -> bool {
        self.building_at(loc)
            .is_some_and(|b| b.kind == BuildingKind::Trail && b.owner.is(player))
    }

    fn chain_limit(&self) -> u32 {
        self.trail_chain_limit.max(1)
    }

    fn entry(&self, player: Player, loc: Location) -> Option<Entry> {
        match self.building_at(loc) {
            Some(b) if b.blocks(player) => b.hp.map(Entry::Obstacle),
            _ => Some(Entry::Open),
        }
    }

    /// Fewest turns `player` needs to walk from `from` to `to`.
    ///
    /// Units are ignored. Returns `None` when `to` cannot be reached at all,
    /// e.g. when it is walled off by ponds.
    pub fn move_distance(&self, player: Player, from: Location, to: Location) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let limit = self.chain_limit();
        let hops_after_entering = |loc: Location| {
            if self.is_own_trail(player, loc) {
                limit - 1
            } else {
                0
            }
        };
        // Each turn advances at most `limit` cells, and pending free hops are
        // worth at most one cell each, so this never overestimates.
        let estimate = |loc: Location, hops: u32| {
            hex_distance(loc, to).saturating_sub(hops).div_ceil(limit)
        };

        let mut best: HashMap<(Location, u32), u32> = HashMap::new();
        let mut open = BinaryHeap::new();
        best.insert((from, 0), 0);
        open.push(Reverse((estimate(from, 0), 0_u32, from, 0_u32)));

        while let Some(Reverse((_, cost, loc, hops))) = open.pop() {
            if loc == to {
                return Some(cost);
            }
            if best.get(&(loc, hops)).is_some_and(|&known| known < cost) {
                continue;
            }

            for next in self.neighbours(loc) {
                let Some(entry) = self.entry(player, next) else {
                    continue;
                };
                let mut steps = Vec::with_capacity(2);
                match entry {
                    Entry::Open => {
                        steps.push((cost + 1, hops_after_entering(next)));
                        if hops > 0 {
                            let left = if self.is_own_trail(player, next) {
                                hops - 1
                            } else {
                                0
                            };
                            steps.push((cost, left));
                        }
                    }
                    Entry::Obstacle(hp) => steps.push((cost + 1 + hp, 0)),
                }

                for (next_cost, next_hops) in steps {
                    let key = (next, next_hops);
                    if best.get(&key).is_none_or(|&known| next_cost < known) {
                        best.insert(key, next_cost);
                        open.push(Reverse((
                            next_cost + estimate(next, next_hops),
                            next_cost,
                            next,
                            next_hops,
                        )));
                    }
                }
            }
        }

        None
    }
}

impl Unit {
    /// Hit point cap at the unit's current position: the further from home,
    /// the frailer. Never below 1.
    pub fn max_hp(&self, world: &World) -> u32 {
        world
            .base_location(self.owner)
            .and_then(|base| world.move_distance(self.owner, base, self.location))
            .map_or(1, |d| world.base_hp_cap.saturating_sub(d).max(1))
    }

    /// Cells this unit can reach with a single move action.
    ///
    /// Follows the same trail chaining as [`World::move_distance`]. Cells
    /// holding any unit are never destinations, although a chain may pass
    /// over them. Order is breadth-first and deterministic.
    pub fn moveable(&self, world: &World) -> Vec<Location> {
        let limit = world.chain_limit();
        let mut reached = Vec::new();
        let mut seen: HashSet<Location> = HashSet::from([self.location]);
        let mut queue: VecDeque<(Location, u32)> = VecDeque::from([(self.location, 0)]);

        while let Some((loc, steps)) = queue.pop_front() {
            let expands = steps == 0 || (steps < limit && world.is_own_trail(self.owner, loc));
            if !expands {
                continue;
            }
            for next in world.neighbours(loc) {
                if world.not_passable(self.owner, next) || !seen.insert(next) {
                    continue;
                }
                reached.push(next);
                queue.push_back((next, steps + 1));
            }
        }

        reached.retain(|loc| !world.is_occupied(*loc));
        reached
    }
}
