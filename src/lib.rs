//! tcpinfo - Kernel TCP statistics for plain and TLS-wrapped connections
//!
//! Resolves a stream handle down to the TCP socket under it, peeling one TLS
//! layer if present, then reads the kernel's `TCP_INFO` record off that
//! socket in a single `getsockopt` call.
//!
//! # Usage
//!
//! ```ignore
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let stream = TcpStream::connect("192.0.2.10:443").await?;
//!
//!     let info = tcpinfo::get_tcp_info(&stream)?;
//!     println!("state {:?} rtt {:?}", info.state(), info.rtt());
//!     println!("{}", tcpinfo::TcpInfoSnapshot::from(&info));
//!     Ok(())
//! }
//! ```
//!
//! A `tokio_rustls` client or server stream works the same way; the query
//! lands on the TCP socket underneath the TLS session.
//!
//! # Modules
//!
//! - [`resolve`] - Getting from an opaque handle to its TCP stream
//! - [`query`] - The `getsockopt(TCP_INFO)` call itself
//! - [`info`] - The kernel record and TCP state codes
//! - [`snapshot`] - Serializable reporting view
//! - [`error`] - Error types

#[cfg(not(target_os = "linux"))]
compile_error!("tcpinfo reads the Linux TCP_INFO socket option and only builds on Linux targets");

pub mod error;
pub mod info;
pub mod query;
pub mod resolve;
pub mod snapshot;

pub use error::{Error, Result};
pub use info::{TcpInfo, TcpState};
pub use query::{query, query_fd};
pub use resolve::{Resolve, TcpStreamRef, resolve};
pub use snapshot::TcpInfoSnapshot;

/// Resolve `conn` down to its TCP stream and query it, in one call.
pub fn get_tcp_info<C: std::any::Any>(conn: &C) -> Result<TcpInfo> {
    query(&resolve(conn)?)
}
