use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{Catalog, ManualClock, NullNotices, ScriptedRandom, SimConfig};
use sim_runtime::{OfflineReport, Scheduler, Session};
use std::rc::Rc;

fn bench_ticks(c: &mut Criterion) {
    let clock = Rc::new(ManualClock::new(0));
    let mut session = Session::new(
        Catalog::standard(),
        SimConfig::default(),
        Box::new(clock.clone()),
        Box::new(ScriptedRandom::new([])),
        Box::new(NullNotices),
    )
    .unwrap();

    // Bankroll through the public surface, then set up a busy mid-game
    // ledger with managed businesses.
    session
        .collect_offline(&OfflineReport {
            total_earned: 1e9,
            per_business: vec![],
            time_away_ms: 0,
        })
        .unwrap();
    session.buy_business(&sim_core::BusinessId::new("coffee_cart"), 50).unwrap();
    session.buy_business(&sim_core::BusinessId::new("coffee_shop"), 25).unwrap();
    session.buy_business(&sim_core::BusinessId::new("roastery"), 10).unwrap();
    session.hire_manager("coffee_cart_manager").unwrap();
    session.hire_manager("coffee_shop_manager").unwrap();
    session.hire_manager("roastery_manager").unwrap();

    let mut scheduler = Scheduler::new(&session, 0);
    let mut now_ms = 0i64;
    c.bench_function("sim_second", |b| {
        b.iter(|| {
            now_ms += 1_000;
            scheduler.pump(&mut session, now_ms)
        })
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
