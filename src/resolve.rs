//! Resolving opaque connection handles down to the TCP stream under them.
//!
//! A handle is either a plain TCP stream or a TLS stream wrapping one; at
//! most one wrapping layer is peeled. Everything else is rejected with the
//! offending type's name in the error.

use std::any::Any;
use std::net::TcpStream as StdTcpStream;
use std::os::unix::io::{AsRawFd, RawFd};

use tokio::net::TcpStream;

use crate::error::{Error, Result};

/// A resolved transport connection: a borrow of the plain TCP stream that
/// ultimately carries the bytes.
#[derive(Debug, Clone, Copy)]
pub enum TcpStreamRef<'a> {
    Tokio(&'a TcpStream),
    Std(&'a StdTcpStream),
}

impl AsRawFd for TcpStreamRef<'_> {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            TcpStreamRef::Tokio(stream) => stream.as_raw_fd(),
            TcpStreamRef::Std(stream) => stream.as_raw_fd(),
        }
    }
}

impl<'a> From<&'a TcpStream> for TcpStreamRef<'a> {
    fn from(stream: &'a TcpStream) -> Self {
        TcpStreamRef::Tokio(stream)
    }
}

impl<'a> From<&'a StdTcpStream> for TcpStreamRef<'a> {
    fn from(stream: &'a StdTcpStream) -> Self {
        TcpStreamRef::Std(stream)
    }
}

/// Connections that can hand out the TCP stream under them.
///
/// Implemented for plain TCP streams (trivially) and for the tokio-rustls
/// stream types, where the inner transport must itself be a plain TCP
/// stream.
pub trait Resolve {
    fn resolve(&self) -> Result<TcpStreamRef<'_>>;
}

impl Resolve for TcpStream {
    fn resolve(&self) -> Result<TcpStreamRef<'_>> {
        Ok(TcpStreamRef::Tokio(self))
    }
}

impl Resolve for StdTcpStream {
    fn resolve(&self) -> Result<TcpStreamRef<'_>> {
        Ok(TcpStreamRef::Std(self))
    }
}

#[cfg(feature = "tls")]
impl<IO: Any> Resolve for tokio_rustls::client::TlsStream<IO> {
    fn resolve(&self) -> Result<TcpStreamRef<'_>> {
        resolve_inner(self.get_ref().0)
    }
}

#[cfg(feature = "tls")]
impl<IO: Any> Resolve for tokio_rustls::server::TlsStream<IO> {
    fn resolve(&self) -> Result<TcpStreamRef<'_>> {
        resolve_inner(self.get_ref().0)
    }
}

#[cfg(feature = "tls")]
impl<IO: Any> Resolve for tokio_rustls::TlsStream<IO> {
    fn resolve(&self) -> Result<TcpStreamRef<'_>> {
        resolve_inner(self.get_ref().0)
    }
}

// One level of unwrapping only: the transport under a TLS session must be a
// plain TCP stream, not another wrapper.
#[cfg(feature = "tls")]
fn resolve_inner<IO: Any>(io: &IO) -> Result<TcpStreamRef<'_>> {
    let any: &dyn Any = io;
    any.downcast_ref::<TcpStream>()
        .map(TcpStreamRef::Tokio)
        .ok_or_else(|| Error::UnsupportedInnerConnection(std::any::type_name::<IO>()))
}

/// Resolve an opaque handle down to the TCP stream under it.
///
/// Recognizes tokio and std TCP streams plus the tokio-rustls stream shapes
/// over a tokio TCP stream. Any other handle fails with
/// [`Error::UnsupportedConnectionType`] naming the type it saw; callers with
/// a known stream type can use [`Resolve`] directly instead.
pub fn resolve<C: Any>(conn: &C) -> Result<TcpStreamRef<'_>> {
    let any: &dyn Any = conn;

    if let Some(stream) = any.downcast_ref::<TcpStream>() {
        return Ok(TcpStreamRef::Tokio(stream));
    }
    if let Some(stream) = any.downcast_ref::<StdTcpStream>() {
        return Ok(TcpStreamRef::Std(stream));
    }

    #[cfg(feature = "tls")]
    {
        if let Some(stream) = any.downcast_ref::<tokio_rustls::client::TlsStream<TcpStream>>() {
            return stream.resolve();
        }
        if let Some(stream) = any.downcast_ref::<tokio_rustls::server::TlsStream<TcpStream>>() {
            return stream.resolve();
        }
        if let Some(stream) = any.downcast_ref::<tokio_rustls::TlsStream<TcpStream>>() {
            return stream.resolve();
        }
    }

    Err(Error::UnsupportedConnectionType(std::any::type_name::<C>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_handle_names_type() {
        let err = resolve(&123u32).unwrap_err();
        match err {
            Error::UnsupportedConnectionType(name) => assert!(name.contains("u32")),
            other => panic!("expected UnsupportedConnectionType, got {:?}", other),
        }
    }

    #[test]
    fn test_stream_ref_exposes_descriptor() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = StdTcpStream::connect(addr).unwrap();

        let resolved = TcpStreamRef::from(&stream);
        assert_eq!(resolved.as_raw_fd(), stream.as_raw_fd());
    }
}
