//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (ids, live-connection tracking)
//!     → Hand off to the HTTP layer (one task per connection)
//! ```
//!
//! # Design Decisions
//! - Bounded accept: a semaphore permit is held for each connection's lifetime
//! - Each connection tracked so shutdown can drain them

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
