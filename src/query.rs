//! One-shot `getsockopt(TCP_INFO)` against a resolved connection.
//!
//! Exactly one kernel call per query, no retries. A query either returns the
//! full record or an error, never a partial fill.

use std::io;
use std::mem;
use std::os::unix::io::{AsRawFd, BorrowedFd, RawFd};

use tracing::debug;

use crate::error::{Error, Result};
use crate::info::TcpInfo;

/// Read the kernel's TCP statistics record off `conn`'s socket descriptor.
///
/// `conn` is only borrowed; its state is not touched and the descriptor is
/// released before this returns.
pub fn query<S: AsRawFd>(conn: &S) -> Result<TcpInfo> {
    query_fd(conn.as_raw_fd())
}

/// Like [`query`], for callers already holding a raw descriptor.
pub fn query_fd(fd: RawFd) -> Result<TcpInfo> {
    if fd < 0 {
        return Err(Error::InvalidConnection);
    }

    // Borrowed for the one getsockopt below and never stored; the caller's
    // handle keeps the descriptor open across the call.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    read_tcp_info(borrowed)
}

fn read_tcp_info(fd: BorrowedFd<'_>) -> Result<TcpInfo> {
    let mut info = TcpInfo::default();
    let mut len = mem::size_of::<TcpInfo>() as libc::socklen_t;

    let ret = unsafe {
        libc::getsockopt(
            fd.as_raw_fd(),
            libc::IPPROTO_TCP,
            libc::TCP_INFO,
            &mut info as *mut _ as *mut libc::c_void,
            &mut len,
        )
    };

    if ret != 0 {
        let err = io::Error::last_os_error();
        debug!("TCP_INFO query on fd {} failed: {}", fd.as_raw_fd(), err);
        return Err(classify_errno(err));
    }

    if len as usize != mem::size_of::<TcpInfo>() {
        // Pre-4.19 kernel, which knows a shorter record than this layout.
        // The partially written buffer is discarded.
        debug!(
            "TCP_INFO on fd {} came back short: {} of {} bytes",
            fd.as_raw_fd(),
            len,
            mem::size_of::<TcpInfo>()
        );
        return Err(Error::ControlFailed {
            expected: mem::size_of::<TcpInfo>() as u32,
            got: len,
        });
    }

    Ok(info)
}

fn classify_errno(err: io::Error) -> Error {
    match err.raw_os_error() {
        Some(code) if code == libc::EBADF || code == libc::ENOTSOCK => {
            Error::DescriptorAccessFailed(err)
        }
        _ => Error::SyscallFailed(err),
    }
}
