//! Live matches. Each match is owned by one actor task; every intent, AI step
//! and round advance for that match goes through its command queue.

pub mod protocol;

use std::collections::HashMap;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::rules::AiConfig;
use crate::config::GameConfig;
use crate::game::ai;
use crate::game::turn::{RoundLog, Turn, TurnError};
use crate::game::GameState;
use crate::world::generation::{create_world, resolve_seed};
use crate::world::Player;
use protocol::{Intent, MatchSnapshot};

const COMMAND_QUEUE: usize = 32;
const SNAPSHOT_BACKLOG: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MatchNotFound(Uuid),
    /// The match actor has shut down.
    ChannelClosed,
    /// The faction is played by the computer and takes no outside intents.
    ComputerControlled(Player),
    Rejected(TurnError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::MatchNotFound(id) => write!(f, "No match with id {}", id),
            SessionError::ChannelClosed => write!(f, "Match is no longer running"),
            SessionError::ComputerControlled(player) => {
                write!(f, "{} is played by the computer", player.name())
            }
            SessionError::Rejected(e) => write!(f, "Rejected: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<TurnError> for SessionError {
    fn from(e: TurnError) -> Self {
        SessionError::Rejected(e)
    }
}

enum Command {
    Apply {
        intent: Intent,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<MatchSnapshot>,
    },
    Shutdown,
}

/// Cheap, cloneable access to a running match.
#[derive(Clone)]
pub struct MatchHandle {
    id: Uuid,
    seed: u64,
    commands: mpsc::Sender<Command>,
    snapshots: broadcast::Sender<String>,
}

impl MatchHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The resolved world seed, for replaying the match.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub async fn submit(&self, intent: Intent) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Apply { intent, reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        response.await.map_err(|_| SessionError::ChannelClosed)??;
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<MatchSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        response.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// JSON snapshots, one per applied change.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.snapshots.subscribe()
    }
}

/// Registry of running matches.
pub struct MatchStore {
    config: GameConfig,
    matches: RwLock<HashMap<Uuid, MatchHandle>>,
}

impl MatchStore {
    pub fn new(config: GameConfig) -> Self {
        MatchStore {
            config,
            matches: RwLock::new(HashMap::new()),
        }
    }

    /// Start a match. Factions in `ai_players` are played by the computer.
    /// A `seed` of 0 picks a random one.
    ///
    /// The returned receiver is subscribed before the actor starts, so it
    /// sees every snapshot the match publishes.
    pub async fn create_match(
        &self,
        ai_players: Vec<Player>,
        seed: u64,
    ) -> (MatchHandle, broadcast::Receiver<String>) {
        let id = Uuid::new_v4();
        let seed = resolve_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = create_world(&self.config.world, &self.config.rules, &mut rng);
        let turn = Turn::new(1, GameState::new(world, self.config.rules.clone()));

        let (commands, queue) = mpsc::channel(COMMAND_QUEUE);
        let (snapshots, updates) = broadcast::channel(SNAPSHOT_BACKLOG);
        let actor = MatchActor {
            id,
            turn,
            rng,
            ai_players,
            ai: self.config.ai.clone(),
            think_delay: Duration::from_millis(self.config.think_delay_ms),
            max_turns: self.config.max_turns,
            snapshots: snapshots.clone(),
            last_round: None,
        };
        tokio::spawn(actor.run(queue));

        let handle = MatchHandle {
            id,
            seed,
            commands,
            snapshots,
        };
        self.matches.write().await.insert(id, handle.clone());
        info!(match_id = %id, seed, "Match created");
        (handle, updates)
    }

    pub async fn get(&self, id: Uuid) -> Result<MatchHandle, SessionError> {
        self.matches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::MatchNotFound(id))
    }

    pub async fn submit(&self, id: Uuid, intent: Intent) -> Result<(), SessionError> {
        self.get(id).await?.submit(intent).await
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<MatchSnapshot, SessionError> {
        self.get(id).await?.snapshot().await
    }

    pub async fn subscribe(&self, id: Uuid) -> Result<broadcast::Receiver<String>, SessionError> {
        Ok(self.get(id).await?.subscribe())
    }

    /// Stop a match and forget it.
    pub async fn close(&self, id: Uuid) -> Result<(), SessionError> {
        let handle = self
            .matches
            .write()
            .await
            .remove(&id)
            .ok_or(SessionError::MatchNotFound(id))?;
        // The actor may already be gone; either way the match is closed.
        let _ = handle.commands.send(Command::Shutdown).await;
        info!(match_id = %id, "Match closed");
        Ok(())
    }

    pub async fn match_ids(&self) -> Vec<Uuid> {
        self.matches.read().await.keys().copied().collect()
    }
}

struct MatchActor {
    id: Uuid,
    turn: Turn,
    rng: ChaCha8Rng,
    ai_players: Vec<Player>,
    ai: AiConfig,
    think_delay: Duration,
    max_turns: u32,
    snapshots: broadcast::Sender<String>,
    last_round: Option<RoundLog>,
}

impl MatchActor {
    async fn run(mut self, mut queue: mpsc::Receiver<Command>) {
        self.drive_ai().await;
        self.publish();

        while let Some(command) = queue.recv().await {
            match command {
                Command::Apply { intent, reply } => {
                    let player = intent.player();
                    let result = self.apply(intent);
                    let applied = result.is_ok();
                    if let Err(e) = &result {
                        warn!(match_id = %self.id, player = player.name(), "Rejected command: {}", e);
                    }
                    let _ = reply.send(result);
                    if applied {
                        self.drive_ai().await;
                        self.publish();
                    }
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                Command::Shutdown => break,
            }
        }
        debug!(match_id = %self.id, "Match actor stopped");
    }

    fn is_over(&self) -> bool {
        self.turn.is_finished() || self.turn.num() > self.max_turns
    }

    fn apply(&mut self, intent: Intent) -> Result<(), SessionError> {
        let player = intent.player();
        if self.ai_players.contains(&player) {
            return Err(SessionError::ComputerControlled(player));
        }
        if self.is_over() {
            return Err(TurnError::GameFinished.into());
        }
        let result = match intent {
            Intent::Menu {
                player,
                action,
                location,
            } => self.turn.menu_action(player, action, location),
            Intent::Unit {
                player,
                unit,
                location,
                action,
            } => self.turn.unit_action(player, unit, location, action),
            Intent::EndRound { player } => {
                self.turn.complete(player);
                Ok(())
            }
        };
        result.map_err(SessionError::from)
    }

    /// Let the computer finish its rounds, advancing whenever every faction
    /// has completed. Returns once a human has to act or the match is over.
    async fn drive_ai(&mut self) {
        loop {
            if self.is_over() {
                return;
            }
            let pending: Vec<Player> = self
                .ai_players
                .iter()
                .copied()
                .filter(|&p| !self.turn.is_completed(p))
                .collect();
            for player in pending {
                if !self.think_delay.is_zero() {
                    tokio::time::sleep(self.think_delay).await;
                }
                if let Err(e) = ai::play_round(&mut self.turn, player, &self.ai, &mut self.rng) {
                    warn!(match_id = %self.id, player = player.name(), "AI move rejected: {}", e);
                    self.turn.complete(player);
                }
            }
            if let Some(winner) = self.turn.game().winner() {
                info!(match_id = %self.id, turn = self.turn.num(), winner = winner.name(), "Match won");
                return;
            }

            match self.turn.advance_if_completed() {
                Ok(Some(log)) => {
                    self.last_round = Some(log);
                    if let Some(winner) = self.turn.game().winner() {
                        info!(match_id = %self.id, turn = self.turn.num(), winner = winner.name(), "Match won");
                    }
                    self.publish();
                    tokio::task::yield_now().await;
                }
                Ok(None) => return,
                Err(e) => {
                    warn!(match_id = %self.id, "Round did not advance: {}", e);
                    return;
                }
            }
        }
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::from_turn(self.id, &self.turn, &self.ai_players, self.last_round.as_ref())
    }

    fn publish(&self) {
        // No subscribers is fine.
        let _ = self.snapshots.send(self.snapshot().to_json());
    }
}
