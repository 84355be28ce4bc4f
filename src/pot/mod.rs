//! Pot registry subsystem.
//!
//! # Data Flow
//! ```text
//! PotConfig[] (start-up)
//!     → store.rs (PotStore, one lock per pot)
//!     → types.rs (Pot state machine: idle → brewing ⇄ pouring-milk)
//!     → additions.rs (Accept-Additions parsing, catalog checks)
//! ```
//!
//! # Design Decisions
//! - Store is built once and shared by `Arc`; pots are never added or removed
//! - Every mutation runs under the pot's own lock, so check-then-mutate is atomic
//! - Kind and status are closed enums; the wire strings come from serde

pub mod additions;
pub mod store;
pub mod types;

pub use additions::{Additions, AdditionError, ADDITION_CATALOG, DECAF_NOTICE};
pub use store::PotStore;
pub use types::{BrewError, BrewRecord, Pot, PotKind, PotStatus, PotSummary, WhenOutcome};
