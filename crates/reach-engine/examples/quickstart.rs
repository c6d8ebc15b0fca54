//! Reach Quickstart: two probers on a walled grid.
//!
//! Demonstrates:
//!   1. Building a Grid2D space and an engine with a change notifier
//!   2. Computing reachable sets on a producer thread and submitting them
//!   3. Ticking the host: notifications and consumer re-evaluation
//!   4. Removing a prober and shutting down
//!
//! Run with:
//!   cargo run --example quickstart

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reach_core::{CellId, CellOffset, ReachabilityConsumer};
use reach_engine::{EngineConfig, ReachabilityEngine};
use reach_space::{offsets, EdgeBehavior, Grid2D};
use smallvec::SmallVec;

// ─── Grid parameters ────────────────────────────────────────────

const COLS: u32 = 12;
const ROWS: u32 = 6;

/// Column of the wall splitting the grid, with a gap at row 2.
const WALL_X: u32 = 6;
const GAP_Y: u32 = 2;

fn is_wall(grid: &Grid2D, cell: CellId, door_closed: bool) -> bool {
    let (x, y) = grid.xy(cell).unwrap_or((0, 0));
    x == WALL_X && (y != GAP_Y || door_closed)
}

/// Host-side flood fill. The engine only consumes the result.
fn flood(grid: &Grid2D, start: CellId, door_closed: bool) -> Vec<CellId> {
    let mut seen = vec![false; (COLS * ROWS) as usize];
    let mut queue = VecDeque::from([start]);
    let mut out = Vec::new();
    seen[start.index()] = true;
    while let Some(cell) = queue.pop_front() {
        out.push(cell);
        for &off in &offsets::ADJACENT4[1..] {
            if let Some(next) = reach_space::CellSpace::offset_cell(grid, cell, off) {
                if !seen[next.index()] && !is_wall(grid, next, door_closed) {
                    seen[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    out
}

// ─── A consumer: a chest that can be opened from any side ───────

struct Chest {
    name: &'static str,
    cell: CellId,
    approach: SmallVec<[CellOffset; 8]>,
    reachable: AtomicBool,
}

impl ReachabilityConsumer for Chest {
    fn cell(&self) -> Option<CellId> {
        Some(self.cell)
    }

    fn offsets(&self) -> &[CellOffset] {
        &self.approach
    }

    fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Relaxed);
        println!("  {} is {}", self.name, if reachable { "reachable" } else { "out of reach" });
    }
}

fn main() {
    let grid = Arc::new(Grid2D::new(COLS, ROWS, EdgeBehavior::Absorb).unwrap());

    let notifier = |cells: &[CellId]| println!("  {} cells changed reachability", cells.len());
    let mut engine: ReachabilityEngine<&'static str> =
        ReachabilityEngine::new(EngineConfig::new(grid.clone()), notifier).unwrap();

    let chest = Arc::new(Chest {
        name: "chest",
        cell: grid.cell_at(10, 4).unwrap(),
        approach: offsets::ADJACENT4.iter().copied().collect(),
        reachable: AtomicBool::new(false),
    });

    // ─── Producers: compute reachable sets off the tick thread ──

    let handle = engine.handle();
    let producer_grid = Arc::clone(&grid);
    let producer = thread::spawn(move || {
        let left = producer_grid.cell_at(1, 1).unwrap();
        let right = producer_grid.cell_at(9, 1).unwrap();
        handle.allocate("scout").unwrap();
        handle.allocate("guard").unwrap();
        handle
            .occupy(&"scout", &flood(&producer_grid, left, true), true)
            .unwrap();
        handle
            .occupy(&"guard", &flood(&producer_grid, right, true), true)
            .unwrap();
    });
    producer.join().unwrap();

    // ─── Host ticks ─────────────────────────────────────────────

    let step = |engine: &mut ReachabilityEngine<&'static str>, label: &str| {
        thread::sleep(Duration::from_millis(150));
        println!("tick: {label}");
        engine.enqueue(chest.clone());
        let report = engine.update();
        println!(
            "  reachable cells: {}, consumers evaluated: {}",
            engine.handle().reachable_count(),
            report.consumers_evaluated
        );
    };

    step(&mut engine, "both probers placed, door closed");

    engine.remove(&"guard").unwrap();
    step(&mut engine, "guard removed");

    let left = grid.cell_at(1, 1).unwrap();
    engine
        .occupy(&"scout", &flood(&grid, left, false), true)
        .unwrap();
    step(&mut engine, "door opened for the scout");

    println!("chest reachable at the end: {}", chest.reachable.load(Ordering::Relaxed));
    let report = engine.shutdown();
    println!(
        "shutdown in {}ms, worker joined: {}, records cleared: {}",
        report.total_ms, report.worker_joined, report.records_cleared
    );
}
