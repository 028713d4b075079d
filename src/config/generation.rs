use serde::{Deserialize, Serialize};

/// Parameters used to scatter terrain on a fresh board.
/// Stored with the match for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_size_x")]
    pub size_x: i32,
    #[serde(default = "default_size_y")]
    pub size_y: i32,
    #[serde(default = "default_tree_ratio")]
    pub tree_ratio: f32,
    #[serde(default = "default_pond_ratio")]
    pub pond_ratio: f32,
    #[serde(default = "default_rock_ratio")]
    pub rock_ratio: f32,
}

fn default_size_x() -> i32 {
    5
}
fn default_size_y() -> i32 {
    8
}
fn default_tree_ratio() -> f32 {
    0.2
}
fn default_pond_ratio() -> f32 {
    0.1
}
fn default_rock_ratio() -> f32 {
    0.05
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            seed: 0,
            size_x: default_size_x(),
            size_y: default_size_y(),
            tree_ratio: default_tree_ratio(),
            pond_ratio: default_pond_ratio(),
            rock_ratio: default_rock_ratio(),
        }
    }
}

impl GenerationParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.size_x < 3 {
            errors.push(format!(
                "world.size_x must be >= 3, got {}. Example: size_x = 5",
                self.size_x
            ));
        }
        if self.size_y < 4 {
            errors.push(format!(
                "world.size_y must be >= 4, got {}. Example: size_y = 8",
                self.size_y
            ));
        }
        for (name, value, example) in [
            ("tree_ratio", self.tree_ratio, 0.2),
            ("pond_ratio", self.pond_ratio, 0.1),
            ("rock_ratio", self.rock_ratio, 0.05),
        ] {
            if !(0.0..=0.5).contains(&value) {
                errors.push(format!(
                    "world.{} must be 0.0-0.5, got {}. Example: {} = {}",
                    name, value, name, example
                ));
            }
        }
        let total = self.tree_ratio + self.pond_ratio + self.rock_ratio;
        if total > 0.6 {
            errors.push(format!(
                "world.tree_ratio + pond_ratio + rock_ratio must be <= 0.6, got {:.2}",
                total
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
