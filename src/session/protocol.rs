use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::actions::{MenuAction, UnitAction};
use crate::game::resources::ResourceLedger;
use crate::game::turn::{RoundLog, Turn};
use crate::world::view::{hexes_view, HexView};
use crate::world::{Location, Player, UnitId};

/// A pre-parsed player intent. Presentation layers translate clicks and menu
/// picks into one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Menu {
        player: Player,
        action: MenuAction,
        location: Location,
    },
    Unit {
        player: Player,
        unit: UnitId,
        location: Location,
        action: UnitAction,
    },
    /// The player is done for this round.
    EndRound { player: Player },
}

impl Intent {
    pub fn player(&self) -> Player {
        match self {
            Intent::Menu { player, .. }
            | Intent::Unit { player, .. }
            | Intent::EndRound { player } => *player,
        }
    }
}

/// Complete match state pushed to subscribers after every change.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub message_type: &'static str,
    pub match_id: String,
    pub turn: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    pub hexes: Vec<Vec<HexView>>,
    pub factions: Vec<FactionSnapshot>,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_round: Option<RoundLog>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactionSnapshot {
    pub player: Player,
    pub name: &'static str,
    pub emoji: &'static str,
    pub ai: bool,
    pub resources: ResourceLedger,
    pub resources_view: String,
    pub actionable_units: Vec<UnitId>,
    pub completed: bool,
}

impl MatchSnapshot {
    pub fn from_turn(
        match_id: Uuid,
        turn: &Turn,
        ai_players: &[Player],
        last_round: Option<&RoundLog>,
    ) -> Self {
        let game = turn.game();
        MatchSnapshot {
            message_type: "MatchSnapshot",
            match_id: match_id.to_string(),
            turn: turn.num(),
            winner: game.winner(),
            hexes: hexes_view(&game.world),
            factions: Player::ALL
                .iter()
                .map(|&player| {
                    let ledger = game.ledger(player);
                    FactionSnapshot {
                        player,
                        name: player.name(),
                        emoji: player.emoji(),
                        ai: ai_players.contains(&player),
                        resources: *ledger,
                        resources_view: ledger.view(),
                        actionable_units: turn.actionable_units(player).to_vec(),
                        completed: turn.is_completed(player),
                    }
                })
                .collect(),
            messages: turn.messages().to_vec(),
            last_round: last_round.cloned(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
