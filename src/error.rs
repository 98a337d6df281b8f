//! Error types for connection resolution and kernel queries.

use std::{io, io::ErrorKind};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by [`resolve`](crate::resolve()) and [`query`](crate::query()).
///
/// Every variant is terminal: nothing in this crate retries, and a failed
/// query never yields a partially populated record.
#[derive(Error, Debug)]
pub enum Error {
    /// The handle is none of the recognized stream types. Carries the
    /// observed type name for diagnostics.
    #[error("unsupported connection type `{0}`")]
    UnsupportedConnectionType(&'static str),

    /// A TLS stream wraps something other than a plain TCP stream.
    #[error("TLS stream does not wrap a plain TCP stream (inner type `{0}`)")]
    UnsupportedInnerConnection(&'static str),

    /// The connection carries no usable socket descriptor.
    #[error("connection has no valid socket descriptor")]
    InvalidConnection,

    /// The descriptor could not be accessed: already closed, or not a socket.
    #[error("socket descriptor not accessible")]
    DescriptorAccessFailed(#[source] io::Error),

    /// The kernel accepted the query but delivered a short record. Seen on
    /// kernels older than the layout this crate is pinned to.
    #[error("kernel wrote {got} bytes of TCP_INFO, expected {expected}")]
    ControlFailed { expected: u32, got: u32 },

    /// `getsockopt` failed with an OS error other than a descriptor problem.
    #[error("TCP_INFO query failed")]
    SyscallFailed(#[source] io::Error),
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::DescriptorAccessFailed(e) | Error::SyscallFailed(e) => e,
            other => Self::new(ErrorKind::InvalidInput, other),
        }
    }
}
