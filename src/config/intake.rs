//! Intake (registration) configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Durable registration store and multi-turn behavior
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// CSV file receiving completed registrations
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Keep partial name/age between intake turns of a session
    #[serde(default = "default_carry_forward")]
    pub carry_forward: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            carry_forward: default_carry_forward(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("files/cadastros.csv")
}

fn default_carry_forward() -> bool {
    true
}
