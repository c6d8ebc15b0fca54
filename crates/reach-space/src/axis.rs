//! Per-axis offset resolution shared by the lattice backends.

use crate::edge::EdgeBehavior;

/// Resolve `val` on an axis of length `len` under the given edge behavior.
/// Returns `Some(in_range_value)` or `None` for Absorb out-of-bounds.
pub(crate) fn resolve_axis(val: i64, len: u32, edge: EdgeBehavior) -> Option<u32> {
    let n = i64::from(len);
    if (0..n).contains(&val) {
        return Some(val as u32);
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Clamp => Some(val.clamp(0, n - 1) as u32),
        EdgeBehavior::Wrap => Some(val.rem_euclid(n) as u32),
    }
}
