//! Cell-id spaces for the Reach reachability engine.
//!
//! The engine never looks at geometry. All it needs from the host is a
//! fixed, dense range of cell ids and an answer to "which cell, if any,
//! lies at this offset from that cell". This crate defines that contract
//! as the [`CellSpace`] trait, along with two lattice backends and the
//! offset tables commonly used to describe how an object is approached.
//!
//! # Backends
//!
//! - [`Line1D`]: 1D line with configurable [`EdgeBehavior`]
//! - [`Grid2D`]: row-major 2D grid with configurable [`EdgeBehavior`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod axis;
pub mod edge;
pub mod error;
pub mod grid2d;
pub mod line1d;
pub mod offsets;
pub mod space;

#[cfg(test)]
pub(crate) mod compliance;

pub use edge::EdgeBehavior;
pub use error::SpaceError;
pub use grid2d::Grid2D;
pub use line1d::Line1D;
pub use space::CellSpace;
