//! Line-oriented terminal front end for the widget clicker.
//!
//! The main thread owns the engine and is the only caller into it. A helper
//! thread forwards stdin lines over a channel; the main loop waits on that
//! channel with a timeout equal to the time left until the next tick.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use widget_clicker::clicker::logic::format_number;
use widget_clicker::{BuyQuantity, Clicker, Config, FileStore, SystemClock, TickClock};

/// Optional JSON file overriding `Config` defaults.
const CONFIG_ENV: &str = "WIDGET_CLICKER_CONFIG";

const HELP: &str = "\
commands:
  c                 click (+1 widget)
  b <id> [qty]      buy generator <id>; qty is 1, 10, 25, 100 or max
  q <qty>           select the default buy quantity
  l                 list generators
  s                 show status
  reset             preview the prestige reset (then yes/no)
  save              save now
  quit              save and exit (then yes/no)";

#[derive(Debug, PartialEq)]
enum Command {
    Click,
    Buy(usize, Option<BuyQuantity>),
    Select(BuyQuantity),
    List,
    Status,
    Reset,
    Save,
    Quit,
    Yes,
    No,
    Help,
}

/// Action waiting for a yes/no answer.
enum Pending {
    Reset(f64),
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");
    let cmd = match head {
        "c" | "click" => Command::Click,
        "b" | "buy" => {
            let id = parts
                .next()
                .ok_or("buy needs a generator id")?
                .parse::<usize>()
                .map_err(|e| format!("bad generator id: {e}"))?;
            let qty = parts
                .next()
                .map(|q| q.parse::<BuyQuantity>())
                .transpose()
                .map_err(|e| e.to_string())?;
            Command::Buy(id, qty)
        }
        "q" | "qty" => {
            let q = parts.next().ok_or("qty needs a value")?;
            Command::Select(q.parse::<BuyQuantity>().map_err(|e| e.to_string())?)
        }
        "l" | "list" => Command::List,
        "s" | "status" => Command::Status,
        "reset" => Command::Reset,
        "save" => Command::Save,
        "quit" | "exit" => Command::Quit,
        "y" | "yes" => Command::Yes,
        "n" | "no" => Command::No,
        "" | "h" | "help" => Command::Help,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(cmd)
}

fn print_list(clicker: &Clicker, selected: BuyQuantity) {
    for (id, v) in clicker.views(selected).iter().enumerate() {
        let mark = if v.affordable { '*' } else { ' ' };
        if v.manual {
            println!("{mark}{id:>3} +{} ({})", v.name, v.owned);
        } else {
            println!(
                "{mark}{id:>3} +{} ({}) (^{}) ({}, +{}/s) (+{})",
                v.name,
                format_number(v.cost),
                v.growth,
                v.owned,
                format_number(v.rate),
                v.max_affordable
            );
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => match Config::from_file(&path) {
            Ok(c) => {
                info!(path = ?path, "config loaded");
                c
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "could not load config, using defaults");
                Config::default()
            }
        },
        None => Config::default(),
    };
    let store = FileStore::new(&config.save_path);
    let (mut clicker, outcome) =
        Clicker::start(config.clone(), Box::new(store), Box::new(SystemClock));
    info!(loaded = outcome.loaded, "game started");

    println!("{}", clicker.title());
    if let Some(notice) = clicker.idle_notice() {
        println!("{notice}");
    }
    println!("{}", clicker.status_text());
    println!("{HELP}");

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let started = Instant::now();
    let now_ms = || started.elapsed().as_secs_f64() * 1000.0;
    let mut ticks = TickClock::new(config.tick_interval_ms);
    ticks.update(now_ms());

    let mut selected = BuyQuantity::One;
    let mut pending: Option<Pending> = None;

    loop {
        let wait = Duration::from_millis(ticks.until_next_tick_ms().ceil() as u64);
        match rx.recv_timeout(wait) {
            Ok(line) => {
                let cmd = match parse_command(&line) {
                    Ok(c) => c,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match (cmd, pending.take()) {
                    (Command::Yes, Some(Pending::Quit)) => break,
                    (Command::Yes, Some(Pending::Reset(preview))) => {
                        let p = clicker.reset_game();
                        ticks.restart(now_ms());
                        info!(preview, prestige = p, "prestige reset confirmed");
                        println!("Reset with bonus x{p}");
                        println!("{}", clicker.title());
                    }
                    (Command::No, Some(_)) => println!("cancelled"),
                    (Command::Yes | Command::No, None) => println!("nothing to confirm"),
                    (Command::Click, _) => {
                        clicker.click();
                        println!("{}", clicker.status_text());
                    }
                    (Command::Buy(id, qty), _) => {
                        let p = clicker.buy(id, qty.unwrap_or(selected));
                        if p.accepted {
                            println!("bought {} for {}", p.quantity, format_number(p.cost));
                        } else {
                            println!(
                                "cannot afford {} (cost {})",
                                p.quantity,
                                format_number(p.cost)
                            );
                        }
                        println!("{}", clicker.status_text());
                    }
                    (Command::Select(q), _) => {
                        selected = q;
                        println!("buying {q}");
                    }
                    (Command::List, _) => print_list(&clicker, selected),
                    (Command::Status, _) => {
                        println!("{}", clicker.status_text());
                        println!("{}", clicker.reset_label());
                    }
                    (Command::Reset, _) => {
                        let preview = clicker.compute_new_prestige();
                        println!("Reset with new bonus {preview}? yes or no");
                        pending = Some(Pending::Reset(preview));
                    }
                    (Command::Save, _) => match clicker.save() {
                        Ok(()) => println!("saved"),
                        Err(e) => println!("save failed: {e}"),
                    },
                    (Command::Quit, _) => {
                        println!("Do you really want to quit? Progress is saved and widgets are made in your absence. yes or no");
                        pending = Some(Pending::Quit);
                    }
                    (Command::Help, _) => println!("{HELP}"),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let due = ticks.update(now_ms());
        clicker.advance(due);
    }

    // Any partial tick is dropped here; nothing runs between the last
    // advance and the save.
    match clicker.save() {
        Ok(()) => info!("progress saved"),
        Err(e) => error!(error = %e, "could not save progress"),
    }
}
