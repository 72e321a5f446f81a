//! Widget Clicker state definitions.

use super::roster::Roster;
use crate::config::Config;

/// Process-wide widget totals.
#[derive(Clone, Debug, PartialEq)]
pub struct Economy {
    /// Spendable widgets.
    pub(crate) current_resource: f64,
    /// Widgets per tick across the roster, prestige included.
    pub(crate) current_rate: f64,
    /// Widgets granted for the time away at the last load.
    pub(crate) idle_resource_granted: f64,
    pub(crate) prestige: f64,
    pub(crate) spent_total: f64,
    /// Every widget ever produced. Survives prestige resets.
    pub(crate) lifetime_resource: f64,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            current_resource: 0.0,
            current_rate: 0.0,
            idle_resource_granted: 0.0,
            prestige: 1.0,
            spent_total: 0.0,
            lifetime_resource: 0.0,
        }
    }
}

impl Economy {
    pub fn current_resource(&self) -> f64 {
        self.current_resource
    }

    pub fn current_rate(&self) -> f64 {
        self.current_rate
    }

    pub fn idle_resource_granted(&self) -> f64 {
        self.idle_resource_granted
    }

    pub fn prestige(&self) -> f64 {
        self.prestige
    }

    pub fn spent_total(&self) -> f64 {
        self.spent_total
    }

    pub fn lifetime_resource(&self) -> f64 {
        self.lifetime_resource
    }

    /// Credit freshly produced widgets to both pools.
    pub(crate) fn earn(&mut self, amount: f64) {
        self.current_resource += amount;
        self.lifetime_resource += amount;
    }

    /// Debit a purchase. Callers check affordability first.
    pub(crate) fn spend(&mut self, cost: f64) {
        self.current_resource = (self.current_resource - cost).max(0.0);
        self.spent_total += cost;
    }
}

/// Full state of a Widget Clicker game.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickerState {
    pub roster: Roster,
    pub economy: Economy,
}

impl ClickerState {
    pub fn new(config: &Config, growth: f64) -> Self {
        Self {
            roster: Roster::from_config(config, growth),
            economy: Economy::default(),
        }
    }
}
