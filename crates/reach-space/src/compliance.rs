//! CellSpace trait compliance test helpers.
//!
//! These functions verify that a space satisfies the invariants the
//! engine relies on. Reused across the backend test modules.

use crate::offsets;
use crate::space::CellSpace;
use indexmap::IndexSet;
use reach_core::{CellId, CellOffset};

fn cells(space: &dyn CellSpace) -> impl Iterator<Item = CellId> {
    (0..space.cell_count() as u32).map(CellId)
}

/// Assert that the zero offset resolves every cell to itself.
pub fn assert_origin_is_identity(space: &dyn CellSpace) {
    for cell in cells(space) {
        assert_eq!(
            space.offset_cell(cell, CellOffset::ORIGIN),
            Some(cell),
            "origin offset of {cell} did not resolve to itself"
        );
    }
}

/// Assert that every resolved offset names a cell inside the space.
pub fn assert_offsets_in_range(space: &dyn CellSpace) {
    for cell in cells(space) {
        for offset in offsets::ADJACENT8 {
            if let Some(n) = space.offset_cell(cell, *offset) {
                assert!(
                    space.contains(n),
                    "offset {offset} of {cell} resolved to out-of-range {n}"
                );
            }
        }
    }
}

/// Assert that the cell one past the end is rejected as a base cell.
pub fn assert_rejects_out_of_range_base(space: &dyn CellSpace) {
    let past_end = CellId(space.cell_count() as u32);
    assert!(!space.contains(past_end));
    assert_eq!(space.offset_cell(past_end, CellOffset::ORIGIN), None);
}

/// Assert that resolving the same offset twice gives the same answer.
pub fn assert_resolution_deterministic(space: &dyn CellSpace) {
    for cell in cells(space) {
        for offset in offsets::ADJACENT8 {
            assert_eq!(
                space.offset_cell(cell, *offset),
                space.offset_cell(cell, *offset),
                "offset {offset} of {cell} resolved inconsistently"
            );
        }
    }
}

/// Assert that a resolved neighbourhood includes the base cell and
/// never holds more cells than the offset table.
pub fn assert_neighbourhood_contains_base(space: &dyn CellSpace) {
    for cell in cells(space) {
        let resolved: IndexSet<CellId> = offsets::ADJACENT4
            .iter()
            .filter_map(|o| space.offset_cell(cell, *o))
            .collect();
        assert!(resolved.contains(&cell));
        assert!(resolved.len() <= offsets::ADJACENT4.len());
    }
}

/// Run all compliance checks on a space.
pub fn run_full_compliance(space: &dyn CellSpace) {
    assert_origin_is_identity(space);
    assert_offsets_in_range(space);
    assert_rejects_out_of_range_base(space);
    assert_resolution_deterministic(space);
    assert_neighbourhood_contains_base(space);
}
