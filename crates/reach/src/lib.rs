//! Reach: concurrent, incrementally updated cell reachability.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Reach sub-crates. For most users, adding `reach` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use reach::prelude::*;
//! use std::sync::Arc;
//!
//! let space = Arc::new(Line1D::new(16, EdgeBehavior::Absorb).unwrap());
//! let config = EngineConfig::new(space).manual();
//! let mut engine: ReachabilityEngine<u32> =
//!     ReachabilityEngine::new(config, |cells: &[CellId]| {
//!         println!("{} cells changed", cells.len());
//!     })
//!     .unwrap();
//!
//! engine.allocate(1).unwrap();
//! engine.occupy(&1, &[CellId(3), CellId(4)], true).unwrap();
//! engine.run_pass().unwrap();
//! engine.update();
//!
//! assert!(engine.is_reachable(CellId(4)));
//! assert!(!engine.is_reachable(CellId(5)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `reach-core` | Ids, host-facing traits, `ReachError` |
//! | [`space`] | `reach-space` | Cell spaces and offset tables |
//! | [`engine`] | `reach-engine` | The engine, its handle, config and metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core ids and traits (`reach-core`).
///
/// Contains [`types::CellId`], [`types::ProberId`], the host-facing
/// [`types::ChangeNotifier`] and [`types::ReachabilityConsumer`] traits,
/// and [`types::ReachError`].
pub use reach_core as types;

/// Cell spaces (`reach-space`).
///
/// Provides the [`space::CellSpace`] trait, the [`space::Line1D`] and
/// [`space::Grid2D`] backends, and the [`space::offsets`] tables.
pub use reach_space as space;

/// The reachability engine (`reach-engine`).
///
/// [`engine::ReachabilityEngine`] owns the worker and the per-tick drain;
/// [`engine::ReachHandle`] is the cloneable producer and reader handle.
pub use reach_engine as engine;

/// Common imports for typical Reach usage.
///
/// ```rust
/// use reach::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use reach_core::{
        CellId, CellOffset, ChangeNotifier, ProberId, ReachError, ReachabilityConsumer,
    };

    // Space
    pub use reach_space::{offsets, CellSpace, EdgeBehavior, Grid2D, Line1D};

    // Engine
    pub use reach_engine::{
        ConfigError, DrainReport, EngineConfig, ReachHandle, ReachMetrics, ReachabilityEngine,
        WorkerMode,
    };
}
