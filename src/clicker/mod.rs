//! Widget Clicker: an incremental widget factory with prestige resets.
//!
//! `Clicker` owns the game state together with its collaborators (RNG,
//! snapshot store and clock) and is the surface a front end drives:
//! `tick`, `buy`, `max_affordable`, `compute_new_prestige`, `reset_game`,
//! `save` and `load`, plus read-only views for display.

pub mod generator;
pub mod logic;
pub mod roster;
pub mod save;
pub mod state;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::config::Config;
use crate::error::SaveError;
use crate::time::Clock;

use generator::Generator;
use logic::{BuyQuantity, Purchase};
use roster::{Roster, MANUAL_ID};
use save::{LoadOutcome, SnapshotStore};
use state::{ClickerState, Economy};

/// What a buy button shows for one generator.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorView {
    pub name: String,
    pub owned: u64,
    pub growth: f64,
    /// Rounded cost of the selected quantity (`Max` quotes what it would buy,
    /// or one unit when nothing is affordable).
    pub cost: f64,
    /// Widgets per tick including prestige.
    pub rate: f64,
    pub max_affordable: u64,
    pub affordable: bool,
    pub manual: bool,
}

pub struct Clicker {
    state: ClickerState,
    config: Config,
    rng: StdRng,
    store: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
}

impl Clicker {
    pub fn new(config: Config, store: Box<dyn SnapshotStore>, clock: Box<dyn Clock>) -> Self {
        Self::with_rng(config, store, clock, StdRng::from_entropy())
    }

    /// Like `new` with a caller-supplied RNG, for reproducible runs.
    pub fn with_rng(
        config: Config,
        store: Box<dyn SnapshotStore>,
        clock: Box<dyn Clock>,
        mut rng: StdRng,
    ) -> Self {
        // One growth factor for the whole ladder at the start of a game.
        let growth = roster::pick_growth(&config.growth_choices, config.fallback_growth(), &mut rng);
        Self {
            state: ClickerState::new(&config, growth),
            config,
            rng,
            store,
            clock,
        }
    }

    /// Create a game and restore the last snapshot if there is one.
    pub fn start(
        config: Config,
        store: Box<dyn SnapshotStore>,
        clock: Box<dyn Clock>,
    ) -> (Self, LoadOutcome) {
        let mut clicker = Self::new(config, store, clock);
        let outcome = clicker.load();
        (clicker, outcome)
    }

    pub fn state(&self) -> &ClickerState {
        &self.state
    }

    pub fn economy(&self) -> &Economy {
        &self.state.economy
    }

    pub fn generators(&self) -> &Roster {
        &self.state.roster
    }

    pub fn generator(&self, id: usize) -> Option<&Generator> {
        self.state.roster.get(id)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One live tick: a nominal second of production.
    pub fn tick(&mut self) -> f64 {
        logic::tick(&mut self.state, 1.0)
    }

    /// Run `ticks` live ticks at once (as reported by a `TickClock`).
    pub fn advance(&mut self, ticks: u32) -> f64 {
        if ticks == 0 {
            return 0.0;
        }
        logic::tick(&mut self.state, ticks as f64)
    }

    pub fn buy(&mut self, id: usize, quantity: BuyQuantity) -> Purchase {
        logic::buy(&mut self.state, id, quantity)
    }

    pub fn click(&mut self) -> Purchase {
        logic::click(&mut self.state)
    }

    pub fn max_affordable(&self, id: usize) -> u64 {
        logic::max_affordable(&self.state, id)
    }

    /// Take what generator `id` has produced since its last collection.
    pub fn collect(&mut self, id: usize) -> Option<f64> {
        self.state.roster.get_mut(id).map(Generator::collect)
    }

    /// Preview of the multiplier `reset_game` would grant.
    pub fn compute_new_prestige(&self) -> f64 {
        logic::compute_new_prestige(&self.state.economy)
    }

    pub fn reset_game(&mut self) -> f64 {
        logic::reset_game(&mut self.state, &self.config, &mut self.rng)
    }

    /// Write the snapshot. One retry on failure, then the error is returned.
    pub fn save(&self) -> Result<(), SaveError> {
        let now = self.clock.now_epoch_secs();
        match save::save_game(&self.state, self.store.as_ref(), now) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "save failed, retrying once");
                save::save_game(&self.state, self.store.as_ref(), now).map_err(|e| {
                    warn!(error = %e, "save failed");
                    e
                })
            }
        }
    }

    /// Restore the snapshot, granting idle production. On any failure the
    /// current game is kept and `loaded` is false.
    pub fn load(&mut self) -> LoadOutcome {
        let now = self.clock.now_epoch_secs();
        save::load_game(&mut self.state, self.store.as_ref(), now)
    }

    pub fn generator_view(&self, id: usize, quantity: BuyQuantity) -> Option<GeneratorView> {
        let g = self.state.roster.get(id)?;
        let manual = Roster::is_manual(id);
        let max = g.max_affordable(self.state.economy.current_resource);
        let resolved = match quantity.count() {
            Some(n) => n,
            None if max > 0 => max,
            None => 1,
        };
        let affordable = manual
            || match quantity.count() {
                Some(n) => max >= n,
                None => max >= 1,
            };
        Some(GeneratorView {
            name: g.name.clone(),
            owned: g.owned(),
            growth: g.growth,
            cost: if manual { 0.0 } else { g.bulk_cost(resolved).round() },
            rate: logic::round2(g.rate() * self.state.economy.prestige),
            max_affordable: max,
            affordable,
            manual,
        })
    }

    /// Views for the whole ladder in display order.
    pub fn views(&self, quantity: BuyQuantity) -> Vec<GeneratorView> {
        (0..self.state.roster.len())
            .filter_map(|id| self.generator_view(id, quantity))
            .collect()
    }

    pub fn title(&self) -> String {
        format!("Widget Clicker (x{})", self.state.economy.prestige)
    }

    pub fn status_text(&self) -> String {
        let e = &self.state.economy;
        format!(
            "Widgets: {}\nRate: {} /s",
            logic::format_number(e.current_resource.trunc()),
            logic::format_number(logic::round2(e.current_rate))
        )
    }

    pub fn reset_label(&self) -> String {
        format!(
            "Leverage Investment and Restart (x{})\nLifetime Widgets: {}",
            self.compute_new_prestige(),
            logic::format_number(self.state.economy.lifetime_resource.trunc())
        )
    }

    /// Notice shown after a load that granted idle production.
    pub fn idle_notice(&self) -> Option<String> {
        let granted = self.state.economy.idle_resource_granted;
        (granted > 0.0).then(|| {
            format!(
                "While you were away: {} widgets created!",
                logic::format_number(granted.trunc())
            )
        })
    }

    /// Widgets the manual generator has been clicked for.
    pub fn clicks(&self) -> u64 {
        self.state.roster.get(MANUAL_ID).map_or(0, Generator::owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use super::save::MemoryStore;

    fn game() -> Clicker {
        Clicker::with_rng(
            Config::default(),
            Box::new(MemoryStore::default()),
            Box::new(FixedClock(1_000.0)),
            StdRng::seed_from_u64(11),
        )
    }

    #[test]
    fn new_game_shares_one_growth() {
        let g = game();
        let first = g.generators().get(0).unwrap().growth;
        assert!(Config::default().growth_choices.contains(&first));
        assert!(g.generators().iter().all(|x| x.growth == first));
    }

    #[test]
    fn click_then_buy_then_tick() {
        let mut g = game();
        for _ in 0..12 {
            assert!(g.click().accepted);
        }
        assert_eq!(g.clicks(), 12);
        let p = g.buy(1, BuyQuantity::One);
        assert!(p.accepted);
        let made = g.tick();
        assert!((made - 3.57).abs() < 1e-9);
        assert!((g.economy().current_rate() - 3.57).abs() < 1e-9);
    }

    #[test]
    fn advance_runs_multiple_ticks() {
        let mut g = game();
        g.state.economy.current_resource = 100.0;
        g.buy(1, BuyQuantity::One);
        let before = g.economy().current_resource();
        g.advance(3);
        assert!((g.economy().current_resource() - before - 3.0 * 3.57).abs() < 1e-9);
        assert_eq!(g.advance(0), 0.0);
    }

    #[test]
    fn collect_drains_generator() {
        let mut g = game();
        g.state.economy.current_resource = 100.0;
        g.buy(1, BuyQuantity::One);
        g.tick();
        g.tick();
        assert!((g.collect(1).unwrap() - 7.14).abs() < 1e-9);
        assert_eq!(g.collect(1), Some(0.0));
        assert_eq!(g.collect(99), None);
    }

    #[test]
    fn views_flag_affordability() {
        let mut g = game();
        g.state.economy.current_resource = 100.0;
        let views = g.views(BuyQuantity::One);
        assert_eq!(views.len(), 18);
        assert!(views[0].manual && views[0].affordable);
        assert!(views[1].affordable);
        assert_eq!(views[1].cost, 12.0);
        assert!(!views[2].affordable);

        let ten = g.generator_view(1, BuyQuantity::Ten).unwrap();
        assert!(!ten.affordable);

        let max = g.generator_view(2, BuyQuantity::Max).unwrap();
        assert_eq!(max.max_affordable, 0);
        assert!(!max.affordable);
        assert_eq!(max.cost, g.generator(2).unwrap().bulk_cost(1).round());
    }

    #[test]
    fn prestige_preview_then_reset() {
        let mut g = game();
        g.state.economy.lifetime_resource = 1e14;
        g.state.economy.current_resource = 1e13;
        assert_eq!(g.compute_new_prestige(), 150.0);
        assert_eq!(g.economy().prestige(), 1.0);
        assert!(g.reset_label().starts_with("Leverage Investment and Restart (x150)"));

        assert_eq!(g.reset_game(), 150.0);
        assert_eq!(g.economy().prestige(), 150.0);
        assert_eq!(g.economy().current_resource(), 0.0);
        assert_eq!(g.title(), "Widget Clicker (x150)");
    }

    #[test]
    fn save_then_load_restores_game() {
        let mut g = game();
        for _ in 0..30 {
            g.click();
        }
        g.buy(1, BuyQuantity::Max);
        g.tick();
        g.save().unwrap();
        let saved = g.state().clone();

        g.reset_game();
        let outcome = g.load();
        assert!(outcome.loaded);
        assert_eq!(g.state().roster, saved.roster);
        assert_eq!(g.economy().current_resource(), saved.economy.current_resource());
        assert!(g.idle_notice().is_none());
    }

    #[test]
    fn save_failure_is_returned() {
        let g = Clicker::with_rng(
            Config::default(),
            Box::new(MemoryStore {
                fail_writes: true,
                ..MemoryStore::default()
            }),
            Box::new(FixedClock(0.0)),
            StdRng::seed_from_u64(1),
        );
        assert!(g.save().is_err());
    }

    #[test]
    fn start_without_snapshot_is_fresh() {
        let (g, outcome) = Clicker::start(
            Config::default(),
            Box::new(MemoryStore::default()),
            Box::new(FixedClock(0.0)),
        );
        assert!(!outcome.loaded);
        assert_eq!(g.economy(), &Economy::default());
    }

    #[test]
    fn status_text_truncates_widgets() {
        let mut g = game();
        g.state.economy.current_resource = 1234.9;
        assert!(g.status_text().starts_with("Widgets: 1,234\n"));
    }
}
