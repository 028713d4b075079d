use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::geometry::Location;

// === Factions ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Human,
    Pest,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Human, Player::Pest];

    pub fn opponent(self) -> Player {
        match self {
            Player::Human => Player::Pest,
            Player::Pest => Player::Human,
        }
    }

    /// Stable index for per-faction arrays.
    pub fn index(self) -> usize {
        match self {
            Player::Human => 0,
            Player::Pest => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Human => "Human",
            Player::Pest => "Pest",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Player::Human => "🧍",
            Player::Pest => "🐛",
        }
    }
}

/// Who a building belongs to. Neutral buildings are terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Faction(Player),
    Neutral,
}

impl Owner {
    pub fn is(self, player: Player) -> bool {
        self == Owner::Faction(player)
    }
}

// === Buildings ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    Base,
    Tree,
    Rock,
    Pond,
    Barricade,
    Fruits,
    Flowers,
    Seeds,
    Seeds0,
    Trail,
    Bomb0,
    Bomb,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 12] = [
        BuildingKind::Base,
        BuildingKind::Tree,
        BuildingKind::Rock,
        BuildingKind::Pond,
        BuildingKind::Barricade,
        BuildingKind::Fruits,
        BuildingKind::Flowers,
        BuildingKind::Seeds,
        BuildingKind::Seeds0,
        BuildingKind::Trail,
        BuildingKind::Bomb0,
        BuildingKind::Bomb,
    ];

    /// Whether a non-owner may walk onto the cell. Owners can always pass.
    pub fn passable(self) -> bool {
        !matches!(
            self,
            BuildingKind::Tree | BuildingKind::Pond | BuildingKind::Rock | BuildingKind::Barricade
        )
    }

    /// Hit points for kinds that always start with the same amount.
    /// `None` means the building cannot be worn down.
    pub fn fixed_hp(self) -> Option<u32> {
        match self {
            BuildingKind::Tree | BuildingKind::Barricade => Some(3),
            _ => None,
        }
    }

    /// Starting hit points; rock seams vary in size.
    pub fn initial_hp(self, rng: &mut impl Rng) -> Option<u32> {
        match self {
            BuildingKind::Rock => Some(rng.gen_range(2..=4)),
            other => other.fixed_hp(),
        }
    }

    /// The next stage of a growth chain; `self` for anything that does not grow.
    pub fn grown(self) -> BuildingKind {
        match self {
            BuildingKind::Seeds0 => BuildingKind::Seeds,
            BuildingKind::Seeds => BuildingKind::Flowers,
            BuildingKind::Flowers => BuildingKind::Fruits,
            BuildingKind::Bomb0 => BuildingKind::Bomb,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Base => "base",
            BuildingKind::Tree => "tree",
            BuildingKind::Rock => "rock",
            BuildingKind::Pond => "pond",
            BuildingKind::Barricade => "barricade",
            BuildingKind::Fruits => "fruits",
            BuildingKind::Flowers => "flowers",
            BuildingKind::Seeds => "seeds",
            BuildingKind::Seeds0 => "seeds0",
            BuildingKind::Trail => "trail",
            BuildingKind::Bomb0 => "bomb0",
            BuildingKind::Bomb => "bomb",
        }
    }

    /// Display symbol as seen by everyone; factions draw their crops differently.
    pub fn symbol(self, owner: Owner) -> &'static str {
        match (owner, self) {
            (Owner::Faction(Player::Human), BuildingKind::Base) => "🏠",
            (Owner::Faction(Player::Human), BuildingKind::Fruits) => "🍓",
            (Owner::Faction(Player::Human), BuildingKind::Flowers) => "🌷",
            (Owner::Faction(Player::Human), BuildingKind::Seeds | BuildingKind::Seeds0) => "🌱",
            (Owner::Faction(Player::Pest), BuildingKind::Base) => "🕳",
            (Owner::Faction(Player::Pest), BuildingKind::Fruits) => "🍄",
            (Owner::Faction(Player::Pest), BuildingKind::Flowers) => "🦠",
            (Owner::Faction(Player::Pest), BuildingKind::Seeds | BuildingKind::Seeds0) => "🧬",
            (_, BuildingKind::Trail) => "🛤",
            (_, BuildingKind::Barricade) => "🚧",
            (_, BuildingKind::Bomb0) => "🧨",
            (_, BuildingKind::Bomb) => "💣",
            (_, BuildingKind::Tree) => "🌲",
            (_, BuildingKind::Rock) => "🪨",
            (_, BuildingKind::Pond) => "🌊",
            // Neutral crops and bases do not occur in play.
            (Owner::Neutral, _) => "？",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: Owner,
    pub kind: BuildingKind,
    pub location: Location,
    pub hp: Option<u32>,
}

impl Building {
    pub fn new(owner: Owner, kind: BuildingKind, location: Location, rng: &mut impl Rng) -> Self {
        Building {
            owner,
            kind,
            location,
            hp: kind.initial_hp(rng),
        }
    }

    /// A building put up by a faction. Built kinds never roll their hit points.
    pub fn built(player: Player, kind: BuildingKind, location: Location) -> Self {
        Building {
            owner: Owner::Faction(player),
            kind,
            location,
            hp: kind.fixed_hp(),
        }
    }

    /// Build with an explicit hit point value (used by tests and fixed scenarios).
    pub fn with_hp(owner: Owner, kind: BuildingKind, location: Location, hp: Option<u32>) -> Self {
        Building {
            owner,
            kind,
            location,
            hp,
        }
    }

    /// Whether `player` can walk onto this building's cell.
    pub fn blocks(&self, player: Player) -> bool {
        !self.owner.is(player) && !self.kind.passable()
    }

    pub fn symbol(&self) -> &'static str {
        self.kind.symbol(self.owner)
    }
}

// === Units ===

/// Arena handle for a unit. Stable for the unit's lifetime, never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: Player,
    pub location: Location,
    pub hp: u32,
}

impl Unit {
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }
}
