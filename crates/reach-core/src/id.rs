//! Strongly-typed identifiers for cells, offsets, and probers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one cell of the host grid.
///
/// Cell ids are dense: a space with `n` cells uses ids `0..n`. The
/// universe of ids is fixed for the lifetime of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    /// The id as a slot index into per-cell arrays.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A relative offset from a base cell, in grid columns and rows.
///
/// Offsets are resolved against a concrete space, which decides whether
/// `base + offset` names a valid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellOffset {
    /// Column delta (positive = east).
    pub dx: i32,
    /// Row delta (positive = next row).
    pub dy: i32,
}

impl CellOffset {
    /// The zero offset: the base cell itself.
    pub const ORIGIN: CellOffset = CellOffset { dx: 0, dy: 0 };

    /// Create an offset from column and row deltas.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl fmt::Display for CellOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

impl From<(i32, i32)> for CellOffset {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy }
    }
}

/// Counter for unique [`ProberId`] allocation.
static PROBER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique prober identity.
///
/// For hosts that do not already have a hashable key for their entities.
/// Allocated from a monotonic atomic counter via [`ProberId::next`], so
/// two live probers never share an id, and a retired id is never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProberId(u64);

impl ProberId {
    /// Allocate a fresh, unique prober id. Thread-safe.
    pub fn next() -> Self {
        Self(PROBER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prober#{}", self.0)
    }
}
