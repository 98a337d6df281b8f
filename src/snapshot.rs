//! Compact, serializable view over the raw kernel record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::info::{TcpInfo, TcpState};

/// The fields most reports care about, lifted out of [`TcpInfo`].
///
/// Times are microseconds, rates bytes per second, as in the raw record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpInfoSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TcpState>,
    pub rtt_us: u32,
    pub rtt_var_us: u32,
    pub min_rtt_us: u32,
    pub snd_cwnd: u32,
    pub snd_mss: u32,
    pub pmtu: u32,
    pub total_retransmits: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub bytes_retrans: u64,
    pub segs_out: u32,
    pub segs_in: u32,
    pub delivery_rate: u64,
    pub app_limited: bool,
}

impl From<&TcpInfo> for TcpInfoSnapshot {
    fn from(info: &TcpInfo) -> Self {
        TcpInfoSnapshot {
            state: info.state(),
            rtt_us: info.tcpi_rtt,
            rtt_var_us: info.tcpi_rttvar,
            min_rtt_us: info.tcpi_min_rtt,
            snd_cwnd: info.tcpi_snd_cwnd,
            snd_mss: info.tcpi_snd_mss,
            pmtu: info.tcpi_pmtu,
            total_retransmits: u64::from(info.tcpi_total_retrans),
            bytes_sent: info.tcpi_bytes_sent,
            bytes_received: info.tcpi_bytes_received,
            bytes_retrans: info.tcpi_bytes_retrans,
            segs_out: info.tcpi_segs_out,
            segs_in: info.tcpi_segs_in,
            delivery_rate: info.tcpi_delivery_rate,
            app_limited: info.delivery_rate_app_limited(),
        }
    }
}

impl fmt::Display for TcpInfoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            Some(state) => write!(f, "{}", state)?,
            None => f.write_str("UNKNOWN")?,
        }
        write!(
            f,
            " rtt {}/{} cwnd {} sent {} recv {} retrans {}",
            us_to_human(self.rtt_us),
            us_to_human(self.rtt_var_us),
            self.snd_cwnd,
            bytes_to_human(self.bytes_sent),
            bytes_to_human(self.bytes_received),
            self.total_retransmits
        )
    }
}

pub fn bytes_to_human(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn us_to_human(us: u32) -> String {
    if us >= 1_000_000 {
        format!("{:.2} s", us as f64 / 1_000_000.0)
    } else if us >= 1000 {
        format!("{:.1} ms", us as f64 / 1000.0)
    } else {
        format!("{} us", us)
    }
}
