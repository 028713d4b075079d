//! Rule-driven opponent.
//!
//! Pure decision functions over a [`Turn`]: they never mutate the match and
//! draw all randomness from the injected `rng`. [`play_round`] strings them
//! together for one faction.

use rand::prelude::*;

use crate::config::rules::AiConfig;
use crate::game::actions::{MenuAction, UnitAction};
use crate::game::turn::{Turn, TurnError};
use crate::world::geometry::hex_distance;
use crate::world::{Location, Player, Unit, UnitId, World};

/// Pick one menu action to buy, or `None` to stop shopping.
pub fn menu_action_for(
    turn: &Turn,
    player: Player,
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Option<(MenuAction, Location)> {
    let mut candidates: Vec<(MenuAction, Vec<Location>)> =
        turn.menu_actionable_actions(player).into_iter().collect();
    candidates.shuffle(rng);

    for (action, locs) in candidates {
        let viable = viable_locations(turn, player, action, locs, config, rng);
        if let Some(&loc) = viable.choose(rng) {
            return Some((action, loc));
        }
    }
    None
}

fn viable_locations(
    turn: &Turn,
    player: Player,
    action: MenuAction,
    locs: Vec<Location>,
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Vec<Location> {
    let world = &turn.game().world;
    let own_base = world.base_location(player);
    let enemy_base = world.base_location(player.opponent());
    let near = |loc: Location, target: Option<Location>| {
        target.is_some_and(|t| t == loc || world.neighbours(loc).contains(&t))
    };
    // Building over our own structures only wastes what was there.
    let free_of_own = |loc: &Location| {
        world
            .building_at(*loc)
            .is_none_or(|b| !b.owner.is(player))
    };

    match action {
        MenuAction::BuildFarm | MenuAction::BuildTrail => {
            locs.into_iter().filter(free_of_own).collect()
        }
        MenuAction::BuildBarricade => {
            let sites: Vec<Location> = locs
                .into_iter()
                .filter(free_of_own)
                .filter(|&loc| is_chokepoint(world, player, loc))
                .collect();
            if !sites.is_empty() && rng.gen_bool(config.barricade_probability) {
                sites
            } else {
                Vec::new()
            }
        }
        MenuAction::PlaceBomb => locs
            .into_iter()
            .filter(free_of_own)
            .filter(|&loc| !near(loc, own_base))
            .collect(),
        MenuAction::TriggerBomb => locs
            .into_iter()
            .filter(|&loc| near(loc, enemy_base) && !near(loc, own_base))
            .collect(),
        MenuAction::SpawnUnit => locs,
    }
}

/// Near the middle row, with the cells either side already closed to the enemy.
fn is_chokepoint(world: &World, player: Player, loc: Location) -> bool {
    let mid = world.size_y() / 2;
    if (loc.y - mid).abs() > 1 {
        return false;
    }
    let enemy = player.opponent();
    [loc.x - 1, loc.x + 1].into_iter().all(|x| {
        let side = Location::new(x, loc.y);
        !world.bounds.contains(side) || world.not_passable(enemy, side)
    })
}

/// Pick the target and action for one unit, or `None` to hold position.
pub fn unit_action_for(
    turn: &Turn,
    player: Player,
    unit: UnitId,
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Option<(Location, UnitAction)> {
    let game = turn.game();
    let world = &game.world;
    let u = world.unit(unit)?;
    let options: Vec<(Location, UnitAction)> = turn
        .unit_actionable_locs(player, unit)
        .into_iter()
        .filter_map(|loc| UnitAction::reason(game, u, loc).map(|a| (loc, a)))
        .collect();
    if options.is_empty() {
        return None;
    }
    let moves: Vec<Location> = options
        .iter()
        .filter(|(_, a)| *a == UnitAction::Move)
        .map(|(loc, _)| *loc)
        .collect();
    let own_base = world.base_location(player);
    let enemy_base = world.base_location(player.opponent());

    // Wounded: get home, or stay put.
    if u.hp <= u.max_hp(world) / 2 {
        let base = own_base?;
        if u.location == base {
            return None;
        }
        let here = distance(world, player, u.location, base);
        return moves
            .iter()
            .copied()
            .min_by_key(|&loc| distance(world, player, loc, base))
            .filter(|&loc| distance(world, player, loc, base) < here)
            .map(|loc| (loc, UnitAction::Move));
    }

    if let Some(loc) = melee_opening(world, u, &moves, config, rng) {
        return Some((loc, UnitAction::Move));
    }

    if let Some(base) = own_base {
        let threatened = world
            .units(player.opponent())
            .iter()
            .any(|e| hex_distance(e.location, base) < config.threat_radius);
        if threatened {
            // Guard the base from on top of it.
            if u.location == base {
                return None;
            }
            let here = distance(world, player, u.location, base);
            let back = moves
                .iter()
                .copied()
                .min_by_key(|&loc| distance(world, player, loc, base))
                .filter(|&loc| distance(world, player, loc, base) < here);
            if let Some(loc) = back {
                return Some((loc, UnitAction::Move));
            }
        }
    }

    let rage = game.spawned(player) >= config.rage_spawn_threshold
        || world.units(player.opponent()).is_empty();
    if let (true, Some(target)) = (rage, enemy_base) {
        let charge = options
            .iter()
            .copied()
            .min_by_key(|&(loc, _)| distance(world, player, loc, target));
        if charge.is_some() {
            return charge;
        }
    }

    let work: Vec<(Location, UnitAction)> = options
        .iter()
        .copied()
        .filter(|(_, a)| *a != UnitAction::Move)
        .collect();
    work.choose(rng).or_else(|| options.choose(rng)).copied()
}

/// A move that ends next to an enemy, aimed at the weakest one in reach.
fn melee_opening(
    world: &World,
    unit: &Unit,
    moves: &[Location],
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Option<Location> {
    let enemies = world.units(unit.owner.opponent());
    let (loc, weakest) = moves
        .iter()
        .filter_map(|&loc| {
            let around = world.neighbours(loc);
            enemies
                .iter()
                .filter(|e| around.contains(&e.location))
                .map(|e| e.hp)
                .min()
                .map(|hp| (loc, hp))
        })
        .min_by_key(|&(_, hp)| hp)?;

    if weakest > unit.hp && rng.gen_bool(config.melee_decline_chance) {
        return None;
    }
    Some(loc)
}

fn distance(world: &World, player: Player, from: Location, to: Location) -> u32 {
    world.move_distance(player, from, to).unwrap_or(u32::MAX)
}

/// Let the AI spend `player`'s whole round: shop, act with every unit, then
/// mark the faction as done.
pub fn play_round(
    turn: &mut Turn,
    player: Player,
    config: &AiConfig,
    rng: &mut impl Rng,
) -> Result<(), TurnError> {
    while let Some((action, loc)) = menu_action_for(turn, player, config, rng) {
        turn.menu_action(player, action, loc)?;
    }

    let units: Vec<UnitId> = turn.actionable_units(player).to_vec();
    for unit in units {
        if turn.is_finished() {
            break;
        }
        if let Some((loc, action)) = unit_action_for(turn, player, unit, config, rng) {
            turn.unit_action(player, unit, loc, action)?;
        }
    }

    turn.complete(player);
    Ok(())
}
