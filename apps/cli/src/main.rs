#![deny(warnings)]

//! Headless CLI: runs the simulation kernel without a UI, fast-forwarding
//! a scripted session and printing KPI lines. Useful for smoke-testing the
//! economy and for save-file inspection.

use anyhow::Result;
use sim_core::{BusinessId, Catalog, Clock, ManualClock, NullNotices, SeededRandom, SimConfig};
use sim_runtime::{Scheduler, Session};
use std::rc::Rc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    seconds: u64,
    seed: u64,
    save_dir: Option<String>,
    as_json: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        seconds: 300,
        seed: 42,
        save_dir: None,
        as_json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seconds" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seconds = v;
                }
            }
            "--seed" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = v;
                }
            }
            "--save-dir" => args.save_dir = it.next(),
            "--json" => args.as_json = true,
            _ => {}
        }
    }
    args
}

/// Greedy demo strategy: keep cheap businesses growing and hire managers
/// as soon as they pay for themselves.
fn spend(session: &mut Session) {
    let ids: Vec<BusinessId> = session
        .catalog()
        .businesses
        .iter()
        .map(|b| b.id.clone())
        .collect();
    let managers: Vec<String> = session
        .catalog()
        .managers
        .iter()
        .map(|m| m.id.clone())
        .collect();
    for manager_id in &managers {
        let _ = session.hire_manager(manager_id);
    }
    for id in &ids {
        let _ = session.buy_max(id);
        // Unmanaged businesses need a manual push.
        let Some((owned, has_manager, progress)) = session
            .business_state(id)
            .map(|s| (s.owned, s.has_manager, s.progress))
        else {
            continue;
        };
        if owned > 0 && !has_manager {
            if progress >= 100.0 {
                let _ = session.collect(id);
            }
            let _ = session.start_business(id);
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        seconds = args.seconds,
        seed = args.seed,
        git_sha = env!("GIT_SHA"),
        "starting headless session"
    );

    let catalog = Catalog::standard();
    sim_core::validate_catalog(&catalog)?;

    // Simulated time starts on a quiet calendar day (2024-03-01) so KPI
    // output is not skewed by a seasonal multiplier.
    let clock = Rc::new(ManualClock::new(1_709_283_600_000));
    let mut session = Session::new(
        catalog,
        SimConfig {
            rng_seed: args.seed,
            ..SimConfig::default()
        },
        Box::new(clock.clone()),
        Box::new(SeededRandom::new(args.seed)),
        Box::new(NullNotices),
    )?;

    // Resume a previous save when a directory is given.
    let mut store = args
        .save_dir
        .as_ref()
        .map(persistence::FileStore::new);
    if let Some(store) = &store {
        let last_online = session.load_from(store);
        if last_online > 0 {
            let report = session.reconcile_offline(last_online);
            if report.total_earned > 0.0 {
                let earned = session.collect_offline(&report)?;
                info!(earned, time_away_ms = report.time_away_ms, "offline earnings collected");
            }
        }
    }

    let mut scheduler = Scheduler::new(&session, clock.now_ms());
    for _ in 0..args.seconds {
        clock.advance(1_000);
        scheduler.pump(&mut session, clock.now_ms());
        spend(&mut session);
    }

    if let Some(store) = &mut store {
        session.save_to(store);
        info!("session saved");
    }

    if args.as_json {
        println!("{}", serde_json::to_string_pretty(&session.to_save_record())?);
        return Ok(());
    }

    let owned: u32 = session
        .catalog()
        .businesses
        .iter()
        .filter_map(|b| session.business_state(&b.id))
        .map(|s| s.owned)
        .sum();
    let managed = session
        .catalog()
        .businesses
        .iter()
        .filter_map(|b| session.business_state(&b.id))
        .filter(|s| s.has_manager)
        .count();
    println!(
        "Session OK | businesses owned: {} | managed: {} | upgrades: {}",
        owned,
        managed,
        session.owned_upgrades().len()
    );
    println!(
        "KPI | seconds: {} | cash: ${:.2} | lifetime: ${:.2} | income: ${:.2}/s | multiplier: x{:.2} | prestige: {}",
        session.seconds_played(),
        session.cash(),
        session.total_earnings(),
        session.income_per_second(),
        session.global_multiplier(),
        session.prestige().level
    );

    Ok(())
}
