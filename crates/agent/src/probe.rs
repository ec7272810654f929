//! Network latency probe.
//!
//! Sends a single ICMP echo to the target using the system `ping` utility
//! and parses the round-trip time from its output. Raw ICMP sockets need
//! elevated privileges; the setuid/capability-enabled `ping` binary does not.
//!
//! Every failure (bad host, spawn error, timeout, no reply) collapses to
//! [`UNREACHABLE_LATENCY_MS`] in [`LatencyProbe::measure`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use hostwatch_core::sample::UNREACHABLE_LATENCY_MS;

/// How long to wait for an echo reply.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(4);

/// Extra time granted to the `ping` process itself beyond the reply timeout.
const PROCESS_GRACE: Duration = Duration::from_secs(1);

/// Reason a single probe did not yield a latency.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid target host: {0:?}")]
    InvalidHost(String),

    #[error("Failed to execute ping: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Ping timed out after {0:?}")]
    Timeout(Duration),

    #[error("No echo reply from {host}")]
    NoReply { host: String },

    #[error("Could not parse round-trip time from ping output")]
    Unparseable,
}

impl ProbeError {
    /// `true` when the failure lies with this host (bad target, missing or
    /// unusable `ping` binary) rather than with the network path.
    pub fn is_local_fault(&self) -> bool {
        matches!(self, Self::InvalidHost(_) | Self::Spawn(_) | Self::Unparseable)
    }
}

/// Source of round-trip latency to a host.
#[async_trait]
pub trait LatencyProbe: Send + Sync {
    /// Round-trip time to `host` in milliseconds, or
    /// [`UNREACHABLE_LATENCY_MS`] if it did not answer.
    async fn measure(&self, host: &str) -> f64;
}

/// Probes latency with one `ping` packet.
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
    timeout: Duration,
}

impl Default for PingProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PING_TIMEOUT)
    }
}

impl PingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "ping".to_string(),
            timeout,
        }
    }

    /// Use a different `ping` executable (name on `PATH` or absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Send one echo request and return the round-trip time in milliseconds.
    pub async fn ping_once(&self, host: &str) -> Result<f64, ProbeError> {
        if !is_safe_host(host) {
            return Err(ProbeError::InvalidHost(host.to_string()));
        }

        let output = tokio::time::timeout(
            self.timeout + PROCESS_GRACE,
            Command::new(&self.program)
                .args(ping_args(host, self.timeout))
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ProbeError::NoReply {
                host: host.to_string(),
            });
        }

        parse_rtt_ms(&String::from_utf8_lossy(&output.stdout)).ok_or(ProbeError::Unparseable)
    }
}

#[async_trait]
impl LatencyProbe for PingProbe {
    async fn measure(&self, host: &str) -> f64 {
        match self.ping_once(host).await {
            Ok(rtt_ms) => rtt_ms,
            Err(e) if e.is_local_fault() => {
                tracing::warn!(host, program = %self.program, error = %e, "Ping could not run");
                UNREACHABLE_LATENCY_MS
            }
            Err(e) => {
                tracing::debug!(host, error = %e, "Ping failed");
                UNREACHABLE_LATENCY_MS
            }
        }
    }
}

/// Arguments for a single echo with a reply deadline.
///
/// BSD `ping` takes the wait time in milliseconds, iputils in seconds.
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    let wait = if cfg!(target_os = "macos") {
        timeout.as_millis().to_string()
    } else {
        timeout.as_secs().max(1).to_string()
    };
    vec![
        "-n".to_string(),
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        wait,
        host.to_string(),
    ]
}

/// Hostnames and IP literals only: alphanumeric, `.`, `-`, `:`.
/// Rejects anything `ping` would read as an option.
fn is_safe_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && !host.starts_with('-')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':')
}

/// Extract the round-trip time from `ping` output.
///
/// Accepts `time=0.045 ms`, `time=12 ms` and `time<1 ms` (Windows-style
/// sub-millisecond replies).
pub fn parse_rtt_ms(output: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        let idx = line.find("time=").or_else(|| line.find("time<"))?;
        let value: String = line[idx + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        value.parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_iputils_reply() {
        let out = "PING 127.0.0.1 (127.0.0.1) 56(84) bytes of data.\n\
                   64 bytes from 127.0.0.1: icmp_seq=1 ttl=64 time=0.045 ms\n\
                   \n\
                   --- 127.0.0.1 ping statistics ---\n\
                   1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
                   rtt min/avg/max/mdev = 0.045/0.045/0.045/0.000 ms\n";
        assert_eq!(parse_rtt_ms(out), Some(0.045));
    }

    #[test]
    fn parses_integer_and_sub_millisecond_replies() {
        assert_eq!(
            parse_rtt_ms("64 bytes from 10.0.0.1: icmp_seq=0 ttl=57 time=12 ms"),
            Some(12.0)
        );
        assert_eq!(
            parse_rtt_ms("Reply from 10.0.0.1: bytes=32 time<1ms TTL=128"),
            Some(1.0)
        );
    }

    #[test]
    fn output_without_reply_yields_none() {
        let out = "PING 10.255.255.1 (10.255.255.1) 56(84) bytes of data.\n\
                   \n\
                   --- 10.255.255.1 ping statistics ---\n\
                   1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";
        assert_eq!(parse_rtt_ms(out), None);
    }

    #[test]
    fn safe_hosts() {
        assert!(is_safe_host("127.0.0.1"));
        assert!(is_safe_host("example.com"));
        assert!(is_safe_host("my-host.internal"));
        assert!(is_safe_host("::1"));
    }

    #[test]
    fn unsafe_hosts() {
        assert!(!is_safe_host(""));
        assert!(!is_safe_host("-f"));
        assert!(!is_safe_host("host; rm -rf /"));
        assert!(!is_safe_host("http://127.0.0.1:8010"));
        assert!(!is_safe_host(&"a".repeat(300)));
    }

    #[test]
    fn args_request_a_single_packet() {
        let args = ping_args("127.0.0.1", Duration::from_secs(4));
        assert_eq!(args[..3], ["-n", "-c", "1"]);
        assert_eq!(args.last().map(String::as_str), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn invalid_host_is_rejected_without_spawning() {
        let probe = PingProbe::default();
        assert_matches!(
            probe.ping_once("--help").await,
            Err(ProbeError::InvalidHost(_))
        );
    }

    #[test]
    fn local_faults_are_distinguished_from_network_loss() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(ProbeError::Spawn(missing).is_local_fault());
        assert!(ProbeError::InvalidHost("-f".to_string()).is_local_fault());
        assert!(ProbeError::Unparseable.is_local_fault());
        assert!(!ProbeError::Timeout(DEFAULT_PING_TIMEOUT).is_local_fault());
        assert!(!ProbeError::NoReply {
            host: "10.0.0.1".to_string()
        }
        .is_local_fault());
    }

    #[tokio::test]
    async fn missing_ping_binary_is_a_spawn_error() {
        let probe = PingProbe::default().with_program("/nonexistent/hostwatch-ping");
        let err = probe.ping_once("127.0.0.1").await.unwrap_err();
        assert_matches!(err, ProbeError::Spawn(_));
        assert!(err.is_local_fault());
        assert!(probe.measure("127.0.0.1").await.is_infinite());
    }

    #[tokio::test]
    async fn invalid_host_measures_as_unreachable() {
        let probe = PingProbe::default();
        let latency = probe.measure("not a host").await;
        assert!(latency.is_infinite());
        assert!(latency > 200.0);
    }
}
