use serde::{Deserialize, Serialize};

use crate::world::{DEFAULT_BASE_HP_CAP, DEFAULT_TRAIL_CHAIN_LIMIT};

/// Rule constants shared by both factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_base_hp_cap")]
    pub base_hp_cap: u32,
    #[serde(default = "default_trail_chain_limit")]
    pub trail_chain_limit: u32,
    #[serde(default = "default_heal_per_round")]
    pub heal_per_round: u32,
    #[serde(default = "default_fruit_money")]
    pub fruit_money: u32,
    #[serde(default = "default_one")]
    pub fruit_seed: u32,
    #[serde(default = "default_one")]
    pub raid_money: u32,
    #[serde(default = "default_one")]
    pub starting_seed: u32,
    #[serde(default)]
    pub starting_wood: u32,
    #[serde(default)]
    pub starting_ore: u32,
    #[serde(default)]
    pub starting_money: u32,
}

fn default_base_hp_cap() -> u32 {
    DEFAULT_BASE_HP_CAP
}
fn default_trail_chain_limit() -> u32 {
    DEFAULT_TRAIL_CHAIN_LIMIT
}
fn default_heal_per_round() -> u32 {
    3
}
fn default_fruit_money() -> u32 {
    3
}
fn default_one() -> u32 {
    1
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            base_hp_cap: default_base_hp_cap(),
            trail_chain_limit: default_trail_chain_limit(),
            heal_per_round: default_heal_per_round(),
            fruit_money: default_fruit_money(),
            fruit_seed: 1,
            raid_money: 1,
            starting_seed: 1,
            starting_wood: 0,
            starting_ore: 0,
            starting_money: 0,
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.base_hp_cap == 0 {
            errors.push(format!(
                "rules.base_hp_cap must be > 0, got {}. Example: base_hp_cap = 8",
                self.base_hp_cap
            ));
        }
        if self.trail_chain_limit == 0 {
            errors.push(format!(
                "rules.trail_chain_limit must be > 0, got {}. Example: trail_chain_limit = 3",
                self.trail_chain_limit
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

/// Tuning knobs for the rule-driven opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Chance to accept a barricade site once it passes the chokepoint test.
    #[serde(default = "default_barricade_probability")]
    pub barricade_probability: f64,
    /// Chance to pass on a melee opening against a stronger enemy.
    #[serde(default = "default_melee_decline_chance")]
    pub melee_decline_chance: f64,
    /// Hex distance from the own base at which an enemy counts as a threat.
    #[serde(default = "default_threat_radius")]
    pub threat_radius: u32,
    /// Units spawned before the AI stops farming and marches on the enemy base.
    #[serde(default = "default_rage_spawn_threshold")]
    pub rage_spawn_threshold: u32,
}

fn default_barricade_probability() -> f64 {
    0.9
}
fn default_melee_decline_chance() -> f64 {
    0.05
}
fn default_threat_radius() -> u32 {
    4
}
fn default_rage_spawn_threshold() -> u32 {
    4
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            barricade_probability: default_barricade_probability(),
            melee_decline_chance: default_melee_decline_chance(),
            threat_radius: default_threat_radius(),
            rage_spawn_threshold: default_rage_spawn_threshold(),
        }
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        for (name, value, example) in [
            ("barricade_probability", self.barricade_probability, 0.9),
            ("melee_decline_chance", self.melee_decline_chance, 0.05),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!(
                    "ai.{} must be 0.0-1.0, got {}. Example: {} = {}",
                    name, value, name, example
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
