use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Seed,
    Wood,
    Ore,
    Money,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Seed,
        ResourceKind::Wood,
        ResourceKind::Ore,
        ResourceKind::Money,
    ];

    fn index(self) -> usize {
        match self {
            ResourceKind::Seed => 0,
            ResourceKind::Wood => 1,
            ResourceKind::Ore => 2,
            ResourceKind::Money => 3,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ResourceKind::Seed => "🌱",
            ResourceKind::Wood => "🪵",
            ResourceKind::Ore => "🪨",
            ResourceKind::Money => "💰",
        }
    }
}

/// A price in a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl Cost {
    pub const FREE: Cost = Cost {
        kind: ResourceKind::Money,
        amount: 0,
    };

    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Cost { kind, amount }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount == 0 {
            write!(f, "free")
        } else {
            write!(f, "{}x{}", self.kind.emoji(), self.amount)
        }
    }
}

/// One faction's stockpile. Amounts never go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: [u32; 4],
}

impl ResourceLedger {
    pub fn new(seed: u32, wood: u32, ore: u32, money: u32) -> Self {
        ResourceLedger {
            amounts: [seed, wood, ore, money],
        }
    }

    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.amounts[kind.index()]
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let slot = &mut self.amounts[kind.index()];
        *slot = slot.saturating_add(amount);
    }

    pub fn can_pay(&self, cost: Cost) -> bool {
        self.amount(cost.kind) >= cost.amount
    }

    /// Deduct `cost`, or leave the ledger untouched and return `false`.
    pub fn pay(&mut self, cost: Cost) -> bool {
        if !self.can_pay(cost) {
            return false;
        }
        self.amounts[cost.kind.index()] -= cost.amount;
        true
    }

    /// Compact display, e.g. `🌱 🪵🪵 💰x12`.
    pub fn view(&self) -> String {
        ResourceKind::ALL
            .iter()
            .map(|&kind| {
                let amount = self.amount(kind);
                if amount > 5 {
                    format!("{}x{}", kind.emoji(), amount)
                } else {
                    kind.emoji().repeat(amount as usize)
                }
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
