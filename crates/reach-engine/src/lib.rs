//! Concurrent, incrementally updated cell reachability index.
//!
//! Many *probers* (entities that can move through a grid) each report the
//! set of cells they can currently reach. The engine folds those sets into
//! one reference count per cell, so "can anyone reach this cell?" is a
//! single atomic load on any thread, every tick, with no graph search.
//!
//! # Architecture
//!
//! ```text
//!  producer threads              worker thread              host tick thread
//!  ────────────────              ─────────────              ────────────────
//!  occupy(prober, cells) ──┐
//!    merge under record    │     wait(trigger, timeout)
//!    lock, signal ─────────┼──▶  diff every record
//!  remove(prober) ─────────┘     update CellIndex ──────┐
//!                                push 0↔1 crossings ──┐ │
//!                                                     │ │   update():
//!                                     dirty queue ◀───┘ │     notifier(batch)
//!                                                       │     evaluate a slice
//!  is_reachable(cell) ◀──── atomic load ◀───────────────┘     of consumers
//! ```
//!
//! # Usage
//!
//! Build a [`ReachabilityEngine`] from an [`EngineConfig`] and a
//! [`ChangeNotifier`](reach_core::ChangeNotifier). Clone its
//! [`ReachHandle`] into producer threads, call
//! [`update()`](ReachabilityEngine::update) once per host tick, and drop
//! (or [`shutdown()`](ReachabilityEngine::shutdown)) the engine to stop.
//!
//! [`WorkerMode::Manual`] replaces the worker thread with explicit
//! [`run_pass()`](ReachabilityEngine::run_pass) calls, for deterministic
//! tests and hosts that schedule the work themselves.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod diff;
pub mod drain;
pub mod engine;
pub mod index;
pub mod metrics;
mod record;
mod registry;
mod trigger;
mod worker;

pub use config::{ConfigError, DrainConfig, EngineConfig, WorkerConfig, WorkerMode};
pub use drain::DrainReport;
pub use engine::{ReachHandle, ReachabilityEngine, ShutdownReport};
pub use index::CellIndex;
pub use metrics::{PassStats, ReachMetrics};
