//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (raw front end)
//!     → reader.rs (read until the blank line, then Content-Length bytes)
//!     → request.rs (parse method, path, headers, body)
//!     → [routing layer picks a handler]
//!     → response.rs (status line, headers, JSON body)
//!     → Write, then close
//!
//! Axum (framework front end)
//!     → framework.rs (tower-http middleware, convert to ParsedRequest)
//!     → [routing layer picks a handler]
//!     → framework.rs (convert back)
//! ```

pub mod framework;
pub mod method;
pub mod reader;
pub mod request;
pub mod response;
pub mod server;

pub use method::Method;
pub use reader::{ReadError, ReadLimits};
pub use request::{Headers, ParseError, ParsedRequest, RequestId};
pub use response::{EncodeError, Response};
pub use server::{HtcpcpServer, ServerError};
