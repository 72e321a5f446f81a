//! A single widget producer: geometric cost curve, step-doubling output.

/// Every this many owned units doubles a generator's output.
pub const DOUBLING_STEP: u64 = 25;

#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    pub name: String,
    pub cost_base: f64,
    pub rate_base: f64,
    pub growth: f64,
    owned: u64,
    /// `2^(owned / 25)`, kept in step with `owned`.
    multiplier: u64,
    /// `rate_base * owned * multiplier`, kept in step with `owned`.
    rate: f64,
    accumulated: f64,
    lifetime_accumulated: f64,
}

impl Generator {
    pub fn new(name: impl Into<String>, cost_base: f64, rate_base: f64, growth: f64) -> Self {
        Self {
            name: name.into(),
            cost_base,
            rate_base,
            growth,
            owned: 0,
            multiplier: 1,
            rate: 0.0,
            accumulated: 0.0,
            lifetime_accumulated: 0.0,
        }
    }

    /// Rebuild a generator from persisted parts. Derived fields are
    /// recomputed from `owned`, a negative count restores as zero.
    pub(crate) fn restore(
        name: String,
        cost_base: f64,
        rate_base: f64,
        growth: f64,
        owned: i64,
        accumulated: f64,
        lifetime_accumulated: f64,
    ) -> Self {
        let mut g = Self::new(name, cost_base, rate_base, growth);
        g.set_owned(owned.max(0) as u64);
        g.accumulated = accumulated.max(0.0);
        g.lifetime_accumulated = lifetime_accumulated.max(0.0);
        g
    }

    pub fn owned(&self) -> u64 {
        self.owned
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Widgets per tick before the prestige bonus.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    pub fn lifetime_accumulated(&self) -> f64 {
        self.lifetime_accumulated
    }

    /// The only way `owned` changes; multiplier and rate follow it.
    pub(crate) fn set_owned(&mut self, owned: u64) {
        self.owned = owned;
        self.multiplier = step_multiplier(owned);
        self.rate = self.rate_base * owned as f64 * self.multiplier as f64;
    }

    pub(crate) fn add_owned(&mut self, quantity: u64) {
        self.set_owned(self.owned.saturating_add(quantity));
    }

    /// Credit `production` widgets made over `units` ticks. Lifetime output
    /// grows by the unscaled rate per tick, matching how the ladder has
    /// always counted it.
    pub(crate) fn accrue(&mut self, production: f64, units: f64) {
        if production > 0.0 {
            self.accumulated += production;
            self.lifetime_accumulated += self.rate * units;
        }
    }

    /// Take the widgets produced since the last collection.
    pub fn collect(&mut self) -> f64 {
        std::mem::take(&mut self.accumulated)
    }

    /// Cost of buying `quantity` more units from the current level.
    pub fn bulk_cost(&self, quantity: u64) -> f64 {
        if quantity == 0 {
            return 0.0;
        }
        if self.is_flat() {
            return self.cost_base * quantity as f64;
        }
        let r = self.growth;
        self.cost_base * r.powf(self.owned as f64) * (r.powf(quantity as f64) - 1.0) / (r - 1.0)
    }

    /// Largest quantity whose `bulk_cost` fits in `budget`. Never panics;
    /// every undefined case answers 0.
    pub fn max_affordable(&self, budget: f64) -> u64 {
        if !(budget > 0.0) || !(self.cost_base > 0.0) {
            return 0;
        }

        let estimate = if self.is_flat() {
            (budget / self.cost_base).floor()
        } else {
            let r = self.growth;
            let arg = budget * (r - 1.0) / (self.cost_base * r.powf(self.owned as f64)) + 1.0;
            if !arg.is_finite() || arg <= 0.0 {
                return 0;
            }
            (arg.ln() / r.ln()).floor()
        };
        if !estimate.is_finite() || estimate < 0.0 {
            return 0;
        }

        // The log estimate can land one off either way after rounding.
        let mut n = estimate as u64;
        if self.bulk_cost(n.saturating_add(1)) <= budget {
            n = n.saturating_add(1);
        }
        for _ in 0..2 {
            if n > 0 && self.bulk_cost(n) > budget {
                n -= 1;
            }
        }
        n
    }

    /// Back to a fresh run with a new growth factor. Lifetime output stays.
    pub fn reset(&mut self, growth: f64) {
        self.growth = growth;
        self.accumulated = 0.0;
        self.set_owned(0);
    }

    fn is_flat(&self) -> bool {
        (self.growth - 1.0).abs() < f64::EPSILON
    }
}

fn step_multiplier(owned: u64) -> u64 {
    u32::try_from(owned / DOUBLING_STEP)
        .ok()
        .and_then(|shift| 1u64.checked_shl(shift))
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pencil() -> Generator {
        Generator::new("Pencil", 11.8, 3.57, 18.2)
    }

    #[test]
    fn bulk_cost_of_nothing_is_zero() {
        assert_eq!(pencil().bulk_cost(0), 0.0);
    }

    #[test]
    fn bulk_cost_first_units() {
        let g = pencil();
        assert!((g.bulk_cost(1) - 11.8).abs() < 1e-9);
        // 11.8 * (18.2^2 - 1) / 17.2 = 11.8 * 19.2
        assert!((g.bulk_cost(2) - 226.56).abs() < 1e-9);
    }

    #[test]
    fn bulk_cost_starts_from_owned_level() {
        let mut g = pencil();
        g.set_owned(1);
        assert!((g.bulk_cost(1) - 11.8 * 18.2).abs() < 1e-9);
    }

    #[test]
    fn flat_growth_falls_back_to_linear() {
        let g = Generator::new("Flat", 5.0, 1.0, 1.0);
        assert_eq!(g.bulk_cost(4), 20.0);
        assert_eq!(g.max_affordable(21.0), 4);
    }

    #[test]
    fn max_affordable_scenario() {
        let g = pencil();
        assert_eq!(g.max_affordable(100.0), 1);
        assert_eq!(g.max_affordable(11.79), 0);
        assert_eq!(g.max_affordable(226.56), 2);
    }

    #[test]
    fn max_affordable_degenerate_inputs() {
        let g = pencil();
        assert_eq!(g.max_affordable(0.0), 0);
        assert_eq!(g.max_affordable(-5.0), 0);
        assert_eq!(g.max_affordable(f64::NAN), 0);
        assert_eq!(g.max_affordable(f64::INFINITY), 0);

        let click = Generator::new("Click", 0.0, 0.0, 1.07);
        assert_eq!(click.max_affordable(1e9), 0);
    }

    #[test]
    fn multiplier_doubles_every_25() {
        let mut g = Generator::new("Pen", 1.0, 2.0, 1.07);
        g.set_owned(24);
        assert_eq!(g.multiplier(), 1);
        assert!((g.rate() - 48.0).abs() < 1e-9);
        g.set_owned(25);
        assert_eq!(g.multiplier(), 2);
        assert!((g.rate() - 100.0).abs() < 1e-9);
        g.set_owned(75);
        assert_eq!(g.multiplier(), 8);
    }

    #[test]
    fn multiplier_saturates_instead_of_overflowing() {
        let mut g = Generator::new("Pen", 1.0, 2.0, 1.07);
        g.set_owned(25 * 64);
        assert_eq!(g.multiplier(), u64::MAX);
        g.add_owned(u64::MAX);
        assert_eq!(g.owned(), u64::MAX);
    }

    #[test]
    fn restore_clamps_negative_owned() {
        let g = Generator::restore("Pen".into(), 1.0, 2.0, 1.07, -3, 0.0, 0.0);
        assert_eq!(g.owned(), 0);
        assert_eq!(g.rate(), 0.0);
        assert_eq!(g.multiplier(), 1);
    }

    #[test]
    fn accrue_counts_one_rate_per_tick() {
        let mut g = Generator::new("Pen", 1.0, 2.0, 1.07);
        g.set_owned(3);
        g.accrue(6.0 * 1.5, 1.0); // prestige 1.5
        assert!((g.accumulated() - 9.0).abs() < 1e-9);
        assert!((g.lifetime_accumulated() - 6.0).abs() < 1e-9);

        g.accrue(0.0, 1.0);
        assert!((g.lifetime_accumulated() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn collect_drains_without_touching_lifetime() {
        let mut g = Generator::new("Pen", 1.0, 2.0, 1.07);
        g.set_owned(1);
        g.accrue(2.0, 1.0);
        assert!((g.collect() - 2.0).abs() < 1e-9);
        assert_eq!(g.accumulated(), 0.0);
        assert!((g.lifetime_accumulated() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reset_keeps_lifetime() {
        let mut g = Generator::new("Pen", 1.0, 2.0, 1.07);
        g.set_owned(30);
        g.accrue(10.0, 1.0);
        let lifetime = g.lifetime_accumulated();
        g.reset(1.09);
        assert_eq!(g.owned(), 0);
        assert_eq!(g.rate(), 0.0);
        assert_eq!(g.multiplier(), 1);
        assert_eq!(g.accumulated(), 0.0);
        assert_eq!(g.growth, 1.09);
        assert_eq!(g.lifetime_accumulated(), lifetime);
    }
}
