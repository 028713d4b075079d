use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tokio::sync::broadcast;

use crate::config::GameConfig;
use crate::game::ai;
use crate::game::statistics::{self, MatchSummary, SimulationReport};
use crate::game::turn::Turn;
use crate::game::GameState;
use crate::session::MatchStore;
use crate::world::generation::{create_world, resolve_seed};
use crate::world::view::render_board;
use crate::world::Player;

/// Play one computer-vs-computer match, printing the board after every round.
pub fn play(config: &GameConfig, seed: u64) -> Result<(), String> {
    let seed = resolve_seed(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let world = create_world(&config.world, &config.rules, &mut rng);
    let mut turn = Turn::new(1, GameState::new(world, config.rules.clone()));

    println!("Seed {}", seed);
    print!("{}", render_board(&turn.game().world));

    while !turn.is_finished() && turn.num() <= config.max_turns {
        for player in Player::ALL {
            ai::play_round(&mut turn, player, &config.ai, &mut rng)
                .map_err(|e| format!("{} AI failed on turn {}: {}", player.name(), turn.num(), e))?;
        }
        if turn.is_finished() {
            break;
        }
        let log = turn
            .advance_if_completed()
            .map_err(|e| format!("Cannot advance turn {}: {}", turn.num(), e))?;
        if let Some(log) = log {
            println!("--- Turn {} ---", log.num);
            for message in &log.messages {
                println!("  {}", message);
            }
            print_ledgers(&turn);
            print!("{}", render_board(&turn.game().world));
        }
    }

    // Whatever happened in the deciding round has not been rolled into a log.
    for message in turn.messages() {
        println!("  {}", message);
    }
    match turn.game().winner() {
        Some(winner) => println!("{} {} wins on turn {}", winner.emoji(), winner.name(), turn.num()),
        None => println!("No winner after {} turns", config.max_turns),
    }
    Ok(())
}

fn print_ledgers(turn: &Turn) {
    for player in Player::ALL {
        println!(
            "  {} {}: {}",
            player.emoji(),
            player.name(),
            turn.game().ledger(player).view()
        );
    }
}

/// Run `matches` seeded matches in parallel and print the tally.
pub fn simulate(config: &GameConfig, matches: u32, seed: u64) -> Result<SimulationReport, String> {
    let base = resolve_seed(seed);
    eprintln!("Simulating {} matches from seed {}...", matches, base);

    let summaries: Vec<MatchSummary> = (0..matches)
        .into_par_iter()
        .map(|i| {
            let seed = base.wrapping_add(i as u64);
            statistics::run_match(config, seed).map_err(|e| format!("Match with seed {} failed: {}", seed, e))
        })
        .collect::<Result<_, _>>()?;

    let report = statistics::summarize(&summaries);
    println!("Matches:     {}", report.matches);
    println!("{} Human wins: {}", Player::Human.emoji(), report.human_wins);
    println!("{} Pest wins:  {}", Player::Pest.emoji(), report.pest_wins);
    println!("Undecided:   {}", report.undecided);
    println!("Avg turns:   {:.1}", report.avg_turns);
    Ok(report)
}

/// Follow a computer-vs-computer match driven by a live session, printing
/// each round as its snapshot arrives.
pub async fn watch(config: &GameConfig, seed: u64) -> Result<(), String> {
    let store = MatchStore::new(config.clone());
    let (handle, mut updates) = store.create_match(Player::ALL.to_vec(), seed).await;
    eprintln!("Watching match {} (seed {})", handle.id(), handle.seed());

    loop {
        let json = match updates.recv().await {
            Ok(json) => json,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                eprintln!("Missed {} updates", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let snapshot: serde_json::Value =
            serde_json::from_str(&json).map_err(|e| format!("Bad snapshot: {}", e))?;

        let turn = snapshot["turn"].as_u64().unwrap_or(0);
        if let Some(messages) = snapshot["last_round"]["messages"].as_array() {
            println!("--- Turn {} ---", turn.saturating_sub(1));
            for message in messages.iter().filter_map(|m| m.as_str()) {
                println!("  {}", message);
            }
        }
        if let Some(winner) = snapshot["winner"].as_str() {
            println!("{} wins on turn {}", winner, turn);
            break;
        }
        if turn > config.max_turns as u64 {
            println!("No winner after {} turns", config.max_turns);
            break;
        }
    }

    store.close(handle.id()).await.map_err(|e| e.to_string())
}
