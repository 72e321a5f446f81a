//! Widget Clicker game logic: pure functions over `ClickerState`, fully testable.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use tracing::{debug, info};

use super::roster::{Roster, MANUAL_ID};
use super::state::{ClickerState, Economy};
use crate::config::Config;

/// Lifetime widgets at or below which a reset grants no bonus.
pub const PRESTIGE_THRESHOLD: f64 = 1_000.0;
const PRESTIGE_SCALE: f64 = 150.0;
const PRESTIGE_DIVISOR: f64 = 1.0e14;

/// How many units a buy request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuyQuantity {
    One,
    Ten,
    TwentyFive,
    Hundred,
    Max,
}

impl BuyQuantity {
    /// All selectable quantities in display order.
    pub fn all() -> &'static [BuyQuantity] {
        &[
            BuyQuantity::One,
            BuyQuantity::Ten,
            BuyQuantity::TwentyFive,
            BuyQuantity::Hundred,
            BuyQuantity::Max,
        ]
    }

    /// Fixed count, or `None` for `Max`.
    pub fn count(&self) -> Option<u64> {
        match self {
            BuyQuantity::One => Some(1),
            BuyQuantity::Ten => Some(10),
            BuyQuantity::TwentyFive => Some(25),
            BuyQuantity::Hundred => Some(100),
            BuyQuantity::Max => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuyQuantity::One => "x1",
            BuyQuantity::Ten => "x10",
            BuyQuantity::TwentyFive => "x25",
            BuyQuantity::Hundred => "x100",
            BuyQuantity::Max => "max",
        }
    }
}

impl fmt::Display for BuyQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownQuantity(pub String);

impl fmt::Display for UnknownQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown buy quantity `{}` (expected 1, 10, 25, 100 or max)", self.0)
    }
}

impl FromStr for BuyQuantity {
    type Err = UnknownQuantity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('x').to_ascii_lowercase().as_str() {
            "1" => Ok(BuyQuantity::One),
            "10" => Ok(BuyQuantity::Ten),
            "25" => Ok(BuyQuantity::TwentyFive),
            "100" => Ok(BuyQuantity::Hundred),
            "max" => Ok(BuyQuantity::Max),
            _ => Err(UnknownQuantity(s.to_string())),
        }
    }
}

/// Outcome of a buy request. A rejected purchase changed nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Purchase {
    pub accepted: bool,
    pub quantity: u64,
    pub cost: f64,
}

impl Purchase {
    fn rejected(quantity: u64, cost: f64) -> Self {
        Self {
            accepted: false,
            quantity,
            cost,
        }
    }
}

/// Advance production by `units` ticks and return the widgets made.
pub fn tick(state: &mut ClickerState, units: f64) -> f64 {
    if !(units > 0.0) || !units.is_finite() {
        return 0.0;
    }
    let prestige = state.economy.prestige;
    let mut rate = 0.0;
    let mut total = 0.0;
    for g in state.roster.iter_mut() {
        let per_unit = g.rate() * prestige;
        let production = per_unit * units;
        g.accrue(production, units);
        rate += per_unit;
        total += production;
    }
    state.economy.current_rate = rate;
    state.economy.earn(total);
    total
}

/// Resolve a requested quantity against the current budget. `Max` falls
/// back to a single unit so a cost can still be quoted.
pub fn resolve_quantity(state: &ClickerState, id: usize, quantity: BuyQuantity) -> u64 {
    match quantity.count() {
        Some(n) => n,
        None => match max_affordable(state, id) {
            0 => 1,
            n => n,
        },
    }
}

/// Largest quantity of generator `id` the spendable pool covers.
pub fn max_affordable(state: &ClickerState, id: usize) -> u64 {
    state
        .roster
        .get(id)
        .map_or(0, |g| g.max_affordable(state.economy.current_resource))
}

/// Try to buy generator `id`.
pub fn buy(state: &mut ClickerState, id: usize, quantity: BuyQuantity) -> Purchase {
    if Roster::is_manual(id) {
        return click(state);
    }

    let resolved = resolve_quantity(state, id, quantity);
    let budget = state.economy.current_resource;
    let Some(g) = state.roster.get_mut(id) else {
        return Purchase::rejected(0, 0.0);
    };
    let cost = g.bulk_cost(resolved);
    if !(budget > 0.0 && cost <= budget) {
        debug!(generator = %g.name, quantity = resolved, cost, budget, "purchase rejected");
        return Purchase::rejected(resolved, cost);
    }

    g.add_owned(resolved);
    debug!(generator = %g.name, quantity = resolved, cost, owned = g.owned(), "purchase accepted");
    state.economy.spend(cost);
    Purchase {
        accepted: true,
        quantity: resolved,
        cost,
    }
}

/// Manual click: one free unit of the click generator and one widget.
pub fn click(state: &mut ClickerState) -> Purchase {
    if let Some(g) = state.roster.get_mut(MANUAL_ID) {
        g.add_owned(1);
    }
    state.economy.earn(1.0);
    Purchase {
        accepted: true,
        quantity: 1,
        cost: 0.0,
    }
}

/// Prestige multiplier a reset would grant now. Touches nothing.
pub fn compute_new_prestige(economy: &Economy) -> f64 {
    let lifetime = economy.lifetime_resource;
    if lifetime <= PRESTIGE_THRESHOLD {
        return 1.0;
    }
    let candidate = (PRESTIGE_SCALE * (lifetime / PRESTIGE_DIVISOR).sqrt()).max(1.0);
    if !candidate.is_finite() {
        return economy.prestige.max(1.0);
    }
    round2(candidate)
}

/// Start a new run with the prestige earned so far. Returns the new
/// multiplier. Lifetime, spent and idle totals carry over.
pub fn reset_game<R: Rng + ?Sized>(state: &mut ClickerState, config: &Config, rng: &mut R) -> f64 {
    let new_prestige = compute_new_prestige(&state.economy);
    state
        .roster
        .reset_all(&config.growth_choices, config.fallback_growth(), rng);
    state.economy.current_resource = 0.0;
    state.economy.current_rate = 0.0;
    state.economy.prestige = new_prestige;
    info!(
        prestige = new_prestige,
        lifetime = state.economy.lifetime_resource,
        "run reset"
    );
    new_prestige
}

/// Grant production for the time the game was closed, using the rate in
/// force when it was saved for the whole interval.
pub fn apply_idle_catch_up(economy: &mut Economy, elapsed_secs: f64) -> f64 {
    let elapsed = if elapsed_secs.is_finite() { elapsed_secs.max(0.0) } else { 0.0 };
    let granted = round2(elapsed * economy.current_rate);
    let granted = if granted.is_finite() { granted } else { 0.0 };
    economy.idle_resource_granted = granted;
    economy.earn(granted);
    granted
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Format a number with commas (e.g. 1234567 → "1,234,567").
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    if !n.is_finite() || n >= 1e18 {
        return format!("{:.3e}", n);
    }
    let int_part = n.floor() as u64;
    let frac = n - int_part as f64;

    let s = int_part.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let result: String = result.chars().rev().collect();

    let tenths = (frac * 10.0).round() as u8;
    if frac > 0.05 && tenths < 10 {
        format!("{}.{}", result, tenths)
    } else {
        result
    }
}
