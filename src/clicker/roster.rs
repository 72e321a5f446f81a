//! The tech ladder: an ordered list of generators with the manual click
//! generator in slot 0.

use rand::seq::SliceRandom;
use rand::Rng;

use super::generator::Generator;
use crate::config::Config;

/// Slot of the generator the player clicks directly.
pub const MANUAL_ID: usize = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    generators: Vec<Generator>,
}

impl Roster {
    /// Build the ladder from `config`, every generator sharing `growth`.
    pub fn from_config(config: &Config, growth: f64) -> Self {
        let generators = config
            .items
            .iter()
            .enumerate()
            .map(|(i, name)| Generator::new(name.clone(), config.cost_for(i), config.rate_for(i), growth))
            .collect();
        Self { generators }
    }

    pub(crate) fn from_generators(generators: Vec<Generator>) -> Self {
        Self { generators }
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Generator> {
        self.generators.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Generator> {
        self.generators.get_mut(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Generator> {
        self.generators.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Generator> {
        self.generators.iter_mut()
    }

    pub fn is_manual(id: usize) -> bool {
        id == MANUAL_ID
    }

    /// Reset every generator, each drawing its own growth factor.
    pub(crate) fn reset_all<R: Rng + ?Sized>(&mut self, choices: &[f64], fallback: f64, rng: &mut R) {
        for g in &mut self.generators {
            g.reset(pick_growth(choices, fallback, rng));
        }
    }
}

/// Draw one growth factor from `choices`.
pub fn pick_growth<R: Rng + ?Sized>(choices: &[f64], fallback: f64, rng: &mut R) -> f64 {
    choices.choose(rng).copied().unwrap_or(fallback)
}
