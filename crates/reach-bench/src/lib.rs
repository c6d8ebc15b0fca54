//! Benchmark profiles for the Reach reachability engine.
//!
//! - [`reference_profile`]: 128x128 grid (16K cells), manual worker
//! - [`stress_profile`]: 512x512 grid (~262K cells), manual worker
//! - [`prober_sets`]: deterministic reachable sets for `n` probers

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use reach_core::CellId;
use reach_engine::EngineConfig;
use reach_space::{EdgeBehavior, Grid2D};

/// Reference profile: 128x128 absorbing grid, manual passes.
pub fn reference_profile() -> EngineConfig {
    profile(128, 128)
}

/// Stress profile: 512x512 absorbing grid, manual passes.
pub fn stress_profile() -> EngineConfig {
    profile(512, 512)
}

fn profile(cols: u32, rows: u32) -> EngineConfig {
    let grid = Grid2D::new(cols, rows, EdgeBehavior::Absorb).unwrap();
    EngineConfig::new(Arc::new(grid)).manual()
}

/// Generate deterministic reachable sets for `n` probers.
///
/// Each prober reaches a contiguous run of `span` cells starting at a
/// seeded position, wrapping at `cell_count`, so neighbouring probers
/// overlap the way units sharing a room do. Sets are sorted.
pub fn prober_sets(cell_count: u32, n: usize, span: u32, seed: u64) -> Vec<Vec<CellId>> {
    (0..n as u64)
        .map(|i| {
            let start = (seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(i.wrapping_mul(1442695040888963407))
                >> 17)
                % u64::from(cell_count);
            let mut set: Vec<CellId> = (0..span.min(cell_count))
                .map(|k| CellId(((start + u64::from(k)) % u64::from(cell_count)) as u32))
                .collect();
            set.sort_unstable();
            set
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_validates() {
        reference_profile().validate().unwrap();
    }

    #[test]
    fn stress_profile_validates() {
        stress_profile().validate().unwrap();
    }

    #[test]
    fn prober_sets_deterministic_and_in_range() {
        let a = prober_sets(1000, 5, 64, 42);
        assert_eq!(a, prober_sets(1000, 5, 64, 42));
        for set in &a {
            assert_eq!(set.len(), 64);
            assert!(set.iter().all(|c| c.0 < 1000));
        }
    }
}
