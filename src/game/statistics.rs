use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::GameConfig;
use crate::game::ai;
use crate::game::resources::ResourceLedger;
use crate::game::turn::{Turn, TurnError};
use crate::game::GameState;
use crate::world::generation::create_world;
use crate::world::{BuildingKind, Player};

/// One faction's standing at a point in the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactionStatistics {
    pub player: Player,
    pub units: u32,
    pub total_hp: u32,
    pub spawned: u32,
    pub resources: ResourceLedger,
    pub buildings: HashMap<BuildingKind, u32>,
}

/// Aggregate metrics for a round, for logs and match summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStatistics {
    pub turn: u32,
    pub factions: Vec<FactionStatistics>,
    pub neutral_buildings: u32,
}

pub fn compute_statistics(turn: &Turn) -> RoundStatistics {
    let game = turn.game();
    let world = &game.world;

    let factions = Player::ALL
        .iter()
        .map(|&player| {
            let units = world.units(player);
            let mut buildings: HashMap<BuildingKind, u32> = HashMap::new();
            for b in world.buildings().filter(|b| b.owner.is(player)) {
                *buildings.entry(b.kind).or_insert(0) += 1;
            }
            FactionStatistics {
                player,
                units: units.len() as u32,
                total_hp: units.iter().map(|u| u.hp).sum(),
                spawned: game.spawned(player),
                resources: *game.ledger(player),
                buildings,
            }
        })
        .collect();

    RoundStatistics {
        turn: turn.num(),
        factions,
        neutral_buildings: world
            .buildings()
            .filter(|b| !Player::ALL.iter().any(|&p| b.owner.is(p)))
            .count() as u32,
    }
}

/// Outcome of one headless AI-vs-AI match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    /// `None` when the turn limit ran out first.
    pub winner: Option<Player>,
    pub turns: u32,
    pub final_round: RoundStatistics,
}

/// Play a full AI-vs-AI match from `seed` until someone wins or `max_turns`
/// rounds have passed.
pub fn run_match(config: &GameConfig, seed: u64) -> Result<MatchSummary, TurnError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let world = create_world(&config.world, &config.rules, &mut rng);
    let mut turn = Turn::new(1, GameState::new(world, config.rules.clone()));

    while !turn.is_finished() && turn.num() <= config.max_turns {
        for player in Player::ALL {
            ai::play_round(&mut turn, player, &config.ai, &mut rng)?;
        }
        if turn.is_finished() {
            break;
        }
        turn.advance_if_completed()?;
    }

    let summary = MatchSummary {
        seed,
        winner: turn.game().winner(),
        turns: turn.num(),
        final_round: compute_statistics(&turn),
    };
    debug!(seed, turns = summary.turns, winner = ?summary.winner, "Match finished");
    Ok(summary)
}

/// Win counts across many matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub matches: u32,
    pub human_wins: u32,
    pub pest_wins: u32,
    pub undecided: u32,
    pub avg_turns: f32,
}

pub fn summarize(summaries: &[MatchSummary]) -> SimulationReport {
    if summaries.is_empty() {
        return SimulationReport::default();
    }
    let count = |winner: Option<Player>| summaries.iter().filter(|s| s.winner == winner).count() as u32;
    let total_turns: u64 = summaries.iter().map(|s| s.turns as u64).sum();

    SimulationReport {
        matches: summaries.len() as u32,
        human_wins: count(Some(Player::Human)),
        pest_wins: count(Some(Player::Pest)),
        undecided: count(None),
        avg_turns: (total_turns as f64 / summaries.len() as f64) as f32,
    }
}
