//! Economic simulation engine for an incremental widget clicker.

pub mod clicker;
pub mod config;
pub mod error;
pub mod time;

pub use clicker::logic::{BuyQuantity, Purchase};
pub use clicker::save::{FileStore, LoadOutcome, SnapshotStore};
pub use clicker::{Clicker, GeneratorView};
pub use config::Config;
pub use error::{ConfigError, SaveError};
pub use time::{Clock, SystemClock, TickClock};
