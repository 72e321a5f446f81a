//! Widget Clicker save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current snapshot format. Bump it when a field is added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format that still loads. Adding fields
//!   leaves it alone; bump it only when a field changes meaning or goes away.
//!
//! The snapshot is written wholesale: the roster, the economy and the epoch
//! second it was taken. Loading replaces the roster as saved (names, bases
//! and growth included) and then grants idle production for the time away.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::generator::Generator;
use super::logic::apply_idle_catch_up;
use super::roster::{Roster, MANUAL_ID};
use super::state::{ClickerState, Economy};
use crate::error::SaveError;

/// Snapshot format version.
const SAVE_VERSION: u32 = 1;

/// Oldest snapshot version that still loads.
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Durable home of the single snapshot.
pub trait SnapshotStore {
    /// Replace the stored snapshot.
    fn write(&self, data: &str) -> Result<(), SaveError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>, SaveError>;
}

/// Snapshot kept in one JSON file. Writes go to a sibling temp file that is
/// renamed over the target, so a crash mid-write leaves the old save intact.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn write(&self, data: &str) -> Result<(), SaveError> {
        let tmp = self.temp_path();
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// What `load_game` did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadOutcome {
    pub loaded: bool,
    /// Widgets granted for the time away (0 when nothing loaded).
    pub idle_granted: f64,
}

impl LoadOutcome {
    fn fresh() -> Self {
        Self {
            loaded: false,
            idle_granted: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    game: GameSave,
}

/// All fields are required; a missing `saved_at` must not load as 0.
#[derive(Serialize, Deserialize)]
struct GameSave {
    /// Ladder order; slot 0 is the manual generator.
    roster: Vec<GeneratorSave>,
    economy: EconomySave,
    saved_at: f64,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct GeneratorSave {
    name: String,
    cost_base: f64,
    rate_base: f64,
    growth: f64,
    /// Signed so that a hand-edited negative count restores as zero
    /// instead of failing the whole load.
    owned: i64,
    multiplier: u64,
    rate: f64,
    accumulated: f64,
    lifetime_accumulated: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct EconomySave {
    current_resource: f64,
    current_rate: f64,
    idle_resource_granted: f64,
    prestige: f64,
    spent_total: f64,
    lifetime_resource: f64,
}

impl Default for EconomySave {
    fn default() -> Self {
        Self::from(&Economy::default())
    }
}

impl From<&Economy> for EconomySave {
    fn from(e: &Economy) -> Self {
        Self {
            current_resource: e.current_resource,
            current_rate: e.current_rate,
            idle_resource_granted: e.idle_resource_granted,
            prestige: e.prestige,
            spent_total: e.spent_total,
            lifetime_resource: e.lifetime_resource,
        }
    }
}

/// Build the snapshot for `state`.
fn extract_save(state: &ClickerState, saved_at: f64) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: GameSave {
            roster: state
                .roster
                .iter()
                .map(|g| GeneratorSave {
                    name: g.name.clone(),
                    cost_base: g.cost_base,
                    rate_base: g.rate_base,
                    growth: g.growth,
                    owned: i64::try_from(g.owned()).unwrap_or(i64::MAX),
                    multiplier: g.multiplier(),
                    rate: g.rate(),
                    accumulated: g.accumulated(),
                    lifetime_accumulated: g.lifetime_accumulated(),
                })
                .collect(),
            economy: EconomySave::from(&state.economy),
            saved_at,
        },
    }
}

/// Rebuild a state from a snapshot.
/// Stored multiplier and rate are ignored; they are recomputed from `owned`.
fn apply_save(save: &GameSave) -> Result<ClickerState, SaveError> {
    if save.roster.is_empty() {
        return Err(SaveError::Invalid("empty roster".into()));
    }

    let mut generators: Vec<Generator> = Vec::with_capacity(save.roster.len());
    for (i, g) in save.roster.iter().enumerate() {
        if generators.iter().any(|seen| seen.name == g.name) {
            return Err(SaveError::Invalid(format!("duplicate generator `{}`", g.name)));
        }
        let numbers = [g.cost_base, g.rate_base, g.growth, g.accumulated, g.lifetime_accumulated];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(SaveError::Invalid(format!("non-finite value in generator `{}`", g.name)));
        }
        if g.growth < 1.0 || g.cost_base < 0.0 || g.rate_base < 0.0 {
            return Err(SaveError::Invalid(format!("out-of-range curve in generator `{}`", g.name)));
        }
        if i == MANUAL_ID && (g.cost_base != 0.0 || g.rate_base != 0.0) {
            return Err(SaveError::Invalid("manual slot has a cost or rate".into()));
        }
        generators.push(Generator::restore(
            g.name.clone(),
            g.cost_base,
            g.rate_base,
            g.growth,
            g.owned,
            g.accumulated,
            g.lifetime_accumulated,
        ));
    }

    if !save.saved_at.is_finite() {
        return Err(SaveError::Invalid("non-finite timestamp".into()));
    }

    let e = &save.economy;
    let numbers = [
        e.current_resource,
        e.current_rate,
        e.idle_resource_granted,
        e.prestige,
        e.spent_total,
        e.lifetime_resource,
    ];
    if numbers.iter().any(|n| !n.is_finite()) {
        return Err(SaveError::Invalid("non-finite value in economy".into()));
    }

    Ok(ClickerState {
        roster: Roster::from_generators(generators),
        economy: Economy {
            current_resource: e.current_resource.max(0.0),
            current_rate: e.current_rate.max(0.0),
            idle_resource_granted: e.idle_resource_granted.max(0.0),
            prestige: e.prestige.max(1.0),
            spent_total: e.spent_total.max(0.0),
            lifetime_resource: e.lifetime_resource.max(0.0),
        },
    })
}

/// Serialize `state` stamped with `saved_at` (epoch seconds).
pub fn encode(state: &ClickerState, saved_at: f64) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(state, saved_at))?)
}

/// Parse a snapshot back into a state and its timestamp.
pub fn decode(json: &str) -> Result<(ClickerState, f64), SaveError> {
    let save_data: SaveData = serde_json::from_str(json)?;
    if save_data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            saved: save_data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if save_data.version < SAVE_VERSION {
        info!(
            saved = save_data.version,
            current = SAVE_VERSION,
            "migrating older snapshot"
        );
    }
    let state = apply_save(&save_data.game)?;
    Ok((state, save_data.game.saved_at))
}

/// Write the snapshot. Failures go back to the caller.
pub fn save_game<S: SnapshotStore + ?Sized>(
    state: &ClickerState,
    store: &S,
    now: f64,
) -> Result<(), SaveError> {
    let json = encode(state, now)?;
    store.write(&json)
}

/// Restore the saved game into `state` and grant idle production.
/// Any failure leaves `state` untouched and reports `loaded = false`.
pub fn load_game<S: SnapshotStore + ?Sized>(
    state: &mut ClickerState,
    store: &S,
    now: f64,
) -> LoadOutcome {
    let json = match store.read() {
        Ok(Some(j)) => j,
        Ok(None) => {
            info!("no snapshot found, starting a new game");
            return LoadOutcome::fresh();
        }
        Err(e) => {
            warn!(error = %e, "could not read snapshot, starting a new game");
            return LoadOutcome::fresh();
        }
    };

    let (mut restored, saved_at) = match decode(&json) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "discarding unreadable snapshot");
            return LoadOutcome::fresh();
        }
    };

    let idle_granted = apply_idle_catch_up(&mut restored.economy, now - saved_at);
    info!(
        elapsed = now - saved_at,
        idle_granted,
        prestige = restored.economy.prestige,
        "snapshot loaded"
    );
    *state = restored;
    LoadOutcome {
        loaded: true,
        idle_granted,
    }
}

/// In-memory store for exercising the codec without a filesystem.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) data: std::cell::RefCell<Option<String>>,
    pub(crate) fail_writes: bool,
}

#[cfg(test)]
impl SnapshotStore for MemoryStore {
    fn write(&self, data: &str) -> Result<(), SaveError> {
        if self.fail_writes {
            return Err(std::io::Error::new(ErrorKind::PermissionDenied, "read-only").into());
        }
        *self.data.borrow_mut() = Some(data.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, SaveError> {
        Ok(self.data.borrow().clone())
    }
}
