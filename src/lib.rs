//! HTCPCP/1.0 coffee-pot server library (RFC 2324, RFC 7168).

pub mod config;
pub mod handlers;
pub mod http;
pub mod net;
pub mod pot;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HtcpcpServer;
pub use lifecycle::Shutdown;
pub use pot::PotStore;
pub use routing::Router;
