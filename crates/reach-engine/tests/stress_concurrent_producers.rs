//! Concurrent producers, readers and a host tick against the threaded
//! worker.
//!
//! Producers hammer full and partial queries from their own threads while
//! readers check that no counter is ever observed negative. Once the
//! producers stop, the index must converge to exactly the final submitted
//! sets, and then to the survivors' sets after half the probers leave.
//!
//! The long-running variant is marked `#[ignore]`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use reach_core::CellId;
use reach_engine::{EngineConfig, ReachHandle, ReachabilityEngine};
use reach_test_utils::{fixtures, RecordingNotifier};

const COLS: u32 = 64;
const ROWS: u32 = 64;
const CELL_COUNT: u32 = COLS * ROWS;

fn threaded_engine() -> (ReachabilityEngine<u64>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let mut config = EngineConfig::new(fixtures::grid(COLS, ROWS));
    config.worker.wait_timeout_ms = 5;
    (
        ReachabilityEngine::new(config, notifier.clone()).unwrap(),
        notifier,
    )
}

/// Block until the worker has completed `n` passes beyond the current one.
fn wait_for_passes(handle: &ReachHandle<u64>, n: u64) {
    let target = handle.metrics().passes + n;
    let deadline = Instant::now() + Duration::from_secs(10);
    while handle.metrics().passes < target {
        assert!(Instant::now() < deadline, "worker stalled");
        thread::sleep(Duration::from_millis(1));
    }
}

fn expected_counts(sets: &HashMap<u64, Vec<CellId>>) -> Vec<i32> {
    let mut counts = vec![0; CELL_COUNT as usize];
    for set in sets.values() {
        for c in set {
            counts[c.index()] += 1;
        }
    }
    counts
}

/// Poll until the index equals `expected`, ticking the host as we go.
fn converge(engine: &mut ReachabilityEngine<u64>, expected: &[i32]) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        engine.update();
        let matches = (0..CELL_COUNT)
            .all(|c| engine.reference_count(CellId(c)) == Some(expected[c as usize]));
        if matches {
            return;
        }
        assert!(Instant::now() < deadline, "index never converged");
        thread::sleep(Duration::from_millis(2));
    }
}

fn run(producers: u64, rounds: u64) {
    let (mut engine, notifier) = threaded_engine();
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let handle = engine.handle();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    for c in 0..CELL_COUNT {
                        let count = handle.reference_count(CellId(c)).unwrap();
                        assert!(count >= 0, "negative count at cell {c}");
                        reads += 1;
                    }
                }
                reads
            })
        })
        .collect();

    let workers: Vec<_> = (0..producers)
        .map(|p| {
            let handle = engine.handle();
            thread::spawn(move || {
                handle.allocate(p).unwrap();
                for round in 0..rounds {
                    let seed = p * 10_000 + round;
                    let set = fixtures::scatter(seed, 48, CELL_COUNT);
                    // The last round is always full, so nothing partial lingers.
                    let full = round % 3 != 1 || round + 1 == rounds;
                    handle.occupy(&p, &set, full).unwrap();
                    if round % 17 == 0 {
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    // The host keeps ticking while producers run.
    while !workers.iter().all(|w| w.is_finished()) {
        engine.update();
        thread::sleep(Duration::from_millis(1));
    }
    for w in workers {
        w.join().unwrap();
    }

    // Let every submission land before issuing clean final queries.
    let handle = engine.handle();
    wait_for_passes(&handle, 2);
    let finals: HashMap<u64, Vec<CellId>> = (0..producers)
        .map(|p| (p, fixtures::scatter(p * 10_000 + rounds + 1, 64, CELL_COUNT)))
        .collect();
    for (p, set) in &finals {
        handle.occupy(p, set, true).unwrap();
    }
    converge(&mut engine, &expected_counts(&finals));

    // Half the probers leave.
    let survivors: HashMap<u64, Vec<CellId>> = finals
        .into_iter()
        .filter(|(p, _)| {
            if p % 2 == 0 {
                handle.remove(p).unwrap();
                false
            } else {
                true
            }
        })
        .collect();
    converge(&mut engine, &expected_counts(&survivors));
    assert_eq!(engine.prober_count(), survivors.len());

    stop.store(true, Ordering::Relaxed);
    for r in readers {
        assert!(r.join().unwrap() > 0);
    }

    let metrics = engine.metrics();
    assert!(metrics.passes > 0);
    assert!(metrics.full_queries_applied > 0);
    assert!(notifier.batch_count() > 0);

    let report = engine.shutdown();
    assert!(report.worker_joined);
    assert_eq!(report.records_cleared, survivors.len());
    assert!(!handle.is_reachable(CellId(0)));
}

#[test]
fn producers_converge_to_final_sets() {
    run(4, 50);
}

#[test]
#[ignore]
fn many_producers_converge_under_load() {
    run(16, 2_000);
}
