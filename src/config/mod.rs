pub mod generation;
pub mod rules;

use serde::Deserialize;
use std::path::Path;

use generation::GenerationParams;
use rules::{AiConfig, RulesConfig};

/// Everything needed to start and run a match.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Pause between AI steps inside a live session.
    #[serde(default)]
    pub think_delay_ms: u64,
    #[serde(default)]
    pub world: GenerationParams,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_turns() -> u32 {
    200
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            log_level: default_log_level(),
            max_turns: default_max_turns(),
            think_delay_ms: 0,
            world: GenerationParams::default(),
            rules: RulesConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.max_turns == 0 {
            errors.push(format!(
                "max_turns must be > 0, got {}. Example: max_turns = 200",
                self.max_turns
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        for section in [self.world.validate(), self.rules.validate(), self.ai.validate()] {
            if let Err(e) = section {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
