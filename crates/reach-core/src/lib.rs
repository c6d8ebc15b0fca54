//! Core types and traits for the Reach reachability engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the rest of the workspace:
//! cell and prober identifiers, the host-facing callback traits, and
//! the runtime error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::ReachError;
pub use id::{CellId, CellOffset, ProberId};
pub use traits::{ChangeNotifier, ProberKey, ReachabilityConsumer};
