//! Tunable constants for the widget economy.
//!
//! Everything the balancing of a run depends on lives here so the engine
//! itself carries no magic numbers for the tech ladder.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Growth factors a generator may draw on game start or reset.
pub const GROWTH_CHOICES: [f64; 5] = [1.07, 1.075, 1.08, 1.085, 1.09];

/// Default tech ladder. Index 0 is the manual click generator.
pub const DEFAULT_ITEMS: [&str; 18] = [
    "Click",
    "Pencil",
    "Pen",
    "Tape",
    "Stapler",
    "Ruler",
    "Square",
    "Divider",
    "Knife",
    "Slide Rule",
    "Hammer",
    "Screwdriver",
    "Caliper",
    "Clamp",
    "Drill",
    "Nailgun",
    "Grinder",
    "Drill Press",
];

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ladder names in display order; the first entry is the manual generator.
    pub items: Vec<String>,
    /// Cost of the cheapest purchasable generator.
    pub cost_base: f64,
    /// Factor between the base costs of consecutive ladder items.
    pub cost_growth: f64,
    /// Production rate of the cheapest purchasable generator.
    pub rate_base: f64,
    /// Factor between the base rates of consecutive ladder items.
    pub rate_growth: f64,
    pub growth_choices: Vec<f64>,
    /// Where `FileStore` keeps the snapshot.
    pub save_path: String,
    /// Nominal live tick cadence.
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS.iter().map(|s| s.to_string()).collect(),
            cost_base: 11.8,
            cost_growth: 18.2,
            rate_base: 3.57,
            rate_growth: 4.88,
            growth_choices: GROWTH_CHOICES.to_vec(),
            save_path: "clickersave.json".into(),
            tick_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Base cost of the ladder item at `index`. The manual generator is free.
    pub fn cost_for(&self, index: usize) -> f64 {
        if index == 0 {
            return 0.0;
        }
        self.cost_base * self.cost_growth.powi((index - 1) as i32)
    }

    /// Base production rate of the ladder item at `index`.
    pub fn rate_for(&self, index: usize) -> f64 {
        if index == 0 {
            return 0.0;
        }
        self.rate_base * self.rate_growth.powi((index - 1) as i32)
    }

    /// Growth used when no choice list is configured.
    pub fn fallback_growth(&self) -> f64 {
        GROWTH_CHOICES[0]
    }
}
