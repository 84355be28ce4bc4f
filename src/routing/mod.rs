//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ParsedRequest (method, path, headers)
//!     → router.rs (wrong-universe check, route lookup)
//!     → matcher.rs (segment match, capture pot id)
//!     → Handler, or a 404/405 response
//! ```
//!
//! # Design Decisions
//! - Route table built at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathMatch, PathPattern};
pub use router::{Handler, Route, Router};
