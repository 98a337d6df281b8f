//! Kernel `TCP_INFO` record and TCP state codes.
//!
//! [`TcpInfo`] mirrors `struct tcp_info` from `<linux/tcp.h>` field for
//! field. The layout is pinned to the 4.19 record (224 bytes) and checked at
//! compile time; newer kernels truncate their larger record to this prefix.

use std::fmt;
use std::mem;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mirror of the kernel's `struct tcp_info`, filled by one `getsockopt` call.
///
/// Field names and units follow `<linux/tcp.h>`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpInfo {
    pub tcpi_state: u8,
    pub tcpi_ca_state: u8,
    pub tcpi_retransmits: u8,
    pub tcpi_probes: u8,
    pub tcpi_backoff: u8,
    pub tcpi_options: u8,
    pub tcpi_snd_wscale_rcv_wscale: u8,
    pub tcpi_delivery_rate_app_limited: u8,

    pub tcpi_rto: u32,
    pub tcpi_ato: u32,
    pub tcpi_snd_mss: u32,
    pub tcpi_rcv_mss: u32,

    pub tcpi_unacked: u32,
    pub tcpi_sacked: u32,
    pub tcpi_lost: u32,
    pub tcpi_retrans: u32,
    pub tcpi_fackets: u32,

    pub tcpi_last_data_sent: u32,
    pub tcpi_last_ack_sent: u32,
    pub tcpi_last_data_recv: u32,
    pub tcpi_last_ack_recv: u32,

    pub tcpi_pmtu: u32,
    pub tcpi_rcv_ssthresh: u32,
    pub tcpi_rtt: u32,
    pub tcpi_rttvar: u32,
    pub tcpi_snd_ssthresh: u32,
    pub tcpi_snd_cwnd: u32,
    pub tcpi_advmss: u32,
    pub tcpi_reordering: u32,

    pub tcpi_rcv_rtt: u32,
    pub tcpi_rcv_space: u32,

    pub tcpi_total_retrans: u32,

    // Extended block, added between kernels 4.1 and 4.19.
    pub tcpi_pacing_rate: u64,
    pub tcpi_max_pacing_rate: u64,
    pub tcpi_bytes_acked: u64,
    pub tcpi_bytes_received: u64,
    pub tcpi_segs_out: u32,
    pub tcpi_segs_in: u32,

    pub tcpi_notsent_bytes: u32,
    pub tcpi_min_rtt: u32,
    pub tcpi_data_segs_in: u32,
    pub tcpi_data_segs_out: u32,

    pub tcpi_delivery_rate: u64,

    pub tcpi_busy_time: u64,
    pub tcpi_rwnd_limited: u64,
    pub tcpi_sndbuf_limited: u64,

    pub tcpi_delivered: u32,
    pub tcpi_delivered_ce: u32,

    pub tcpi_bytes_sent: u64,
    pub tcpi_bytes_retrans: u64,
    pub tcpi_dsack_dups: u32,
    pub tcpi_reord_seen: u32,
}

// Any size drift here would let the kernel write past or short of the record.
const _: () = assert!(mem::size_of::<TcpInfo>() == 224);

impl TcpInfo {
    /// Connection state, or `None` for a value this crate does not know.
    pub fn state(&self) -> Option<TcpState> {
        TcpState::from_raw(self.tcpi_state)
    }

    /// Send window scale. First-declared kernel bitfield, low nibble.
    pub fn snd_wscale(&self) -> u8 {
        self.tcpi_snd_wscale_rcv_wscale & 0x0f
    }

    /// Receive window scale, high nibble.
    pub fn rcv_wscale(&self) -> u8 {
        self.tcpi_snd_wscale_rcv_wscale >> 4
    }

    /// Whether the delivery rate was limited by the application rather than
    /// the network path.
    pub fn delivery_rate_app_limited(&self) -> bool {
        self.tcpi_delivery_rate_app_limited & 0x01 != 0
    }

    /// Smoothed round-trip time.
    pub fn rtt(&self) -> Duration {
        Duration::from_micros(u64::from(self.tcpi_rtt))
    }

    /// Minimum round-trip time observed over the connection's lifetime.
    pub fn min_rtt(&self) -> Duration {
        Duration::from_micros(u64::from(self.tcpi_min_rtt))
    }
}

/// TCP connection states as numbered in `<net/tcp_states.h>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TcpState {
    Established = 1,
    SynSent = 2,
    SynRecv = 3,
    FinWait1 = 4,
    FinWait2 = 5,
    TimeWait = 6,
    Close = 7,
    CloseWait = 8,
    LastAck = 9,
    Listen = 10,
    Closing = 11,
    NewSynRecv = 12,
}

impl TcpState {
    /// Parse the kernel state byte. Returns `None` for 0 and for states
    /// newer than this enum.
    pub fn from_raw(value: u8) -> Option<TcpState> {
        Some(match value {
            1 => TcpState::Established,
            2 => TcpState::SynSent,
            3 => TcpState::SynRecv,
            4 => TcpState::FinWait1,
            5 => TcpState::FinWait2,
            6 => TcpState::TimeWait,
            7 => TcpState::Close,
            8 => TcpState::CloseWait,
            9 => TcpState::LastAck,
            10 => TcpState::Listen,
            11 => TcpState::Closing,
            12 => TcpState::NewSynRecv,
            _ => return None,
        })
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcpState::Established => write!(f, "ESTABLISHED"),
            TcpState::SynSent => write!(f, "SYN_SENT"),
            TcpState::SynRecv => write!(f, "SYN_RECV"),
            TcpState::FinWait1 => write!(f, "FIN_WAIT_1"),
            TcpState::FinWait2 => write!(f, "FIN_WAIT_2"),
            TcpState::TimeWait => write!(f, "TIME_WAIT"),
            TcpState::Close => write!(f, "CLOSE"),
            TcpState::CloseWait => write!(f, "CLOSE_WAIT"),
            TcpState::LastAck => write!(f, "LAST_ACK"),
            TcpState::Listen => write!(f, "LISTEN"),
            TcpState::Closing => write!(f, "CLOSING"),
            TcpState::NewSynRecv => write!(f, "NEW_SYN_RECV"),
        }
    }
}
