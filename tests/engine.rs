//! End-to-end runs of the engine against a real snapshot file.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use widget_clicker::{BuyQuantity, Clicker, Clock, Config, FileStore, SnapshotStore};

/// Clock the test can move forward.
#[derive(Clone)]
struct ManualClock(Rc<Cell<f64>>);

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> f64 {
        self.0.get()
    }
}

fn game(path: &std::path::Path, clock: &ManualClock, seed: u64) -> Clicker {
    Clicker::with_rng(
        Config::default(),
        Box::new(FileStore::new(path)),
        Box::new(clock.clone()),
        StdRng::seed_from_u64(seed),
    )
}

#[test]
fn quit_and_return_grants_idle_widgets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickersave.json");
    let clock = ManualClock(Rc::new(Cell::new(1_000_000.0)));

    let mut first = game(&path, &clock, 1);
    for _ in 0..50 {
        first.click();
    }
    assert!(first.buy(1, BuyQuantity::Max).accepted);
    first.tick();
    let rate = first.economy().current_rate();
    assert!(rate > 0.0);
    first.save().unwrap();
    let resource = first.economy().current_resource();
    let lifetime = first.economy().lifetime_resource();

    clock.0.set(1_000_010.0);
    let mut second = game(&path, &clock, 2);
    let outcome = second.load();
    assert!(outcome.loaded);

    let expected = (10.0 * rate * 100.0).round() / 100.0;
    assert_eq!(outcome.idle_granted, expected);
    assert_eq!(second.economy().idle_resource_granted(), expected);
    assert!((second.economy().current_resource() - (resource + expected)).abs() < 1e-9);
    assert!((second.economy().lifetime_resource() - (lifetime + expected)).abs() < 1e-9);
    assert_eq!(second.generators(), first.generators());
    assert!(second.idle_notice().is_some());
}

#[test]
fn start_with_corrupt_file_begins_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickersave.json");
    std::fs::write(&path, b"\x00\x01 definitely not a snapshot").unwrap();
    let clock = ManualClock(Rc::new(Cell::new(0.0)));

    let (g, outcome) = Clicker::start(
        Config::default(),
        Box::new(FileStore::new(&path)),
        Box::new(clock),
    );
    assert!(!outcome.loaded);
    assert_eq!(g.economy().current_resource(), 0.0);
    assert_eq!(g.generators().len(), 18);
    // The unreadable file is left for the next save to replace.
    assert!(path.exists());
}

#[test]
fn prestige_cycle_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickersave.json");
    let clock = ManualClock(Rc::new(Cell::new(50.0)));

    let mut g = game(&path, &clock, 9);
    for _ in 0..2_000 {
        g.click();
    }
    let spent_before = g.economy().spent_total();
    assert!(g.buy(1, BuyQuantity::Max).accepted);
    let spent = g.economy().spent_total();
    assert!(spent > spent_before);

    let preview = g.compute_new_prestige();
    assert_eq!(preview, g.compute_new_prestige());
    let lifetime = g.economy().lifetime_resource();
    assert_eq!(g.reset_game(), preview);
    assert!(g.generators().iter().all(|x| x.owned() == 0));
    assert_eq!(g.economy().current_resource(), 0.0);
    assert_eq!(g.economy().lifetime_resource(), lifetime);
    assert_eq!(g.economy().spent_total(), spent);

    g.save().unwrap();
    let mut back = game(&path, &clock, 10);
    assert!(back.load().loaded);
    assert_eq!(back.economy().prestige(), preview);
    assert_eq!(back.economy().spent_total(), spent);
    assert_eq!(back.economy().idle_resource_granted(), 0.0);
}

#[test]
fn save_into_missing_directory_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("clickersave.json");
    let clock = ManualClock(Rc::new(Cell::new(0.0)));
    let g = game(&path, &clock, 3);
    assert!(g.save().is_err());
    assert_eq!(FileStore::new(&path).read().unwrap(), None);
}
