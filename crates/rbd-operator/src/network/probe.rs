//! Single TCP connect probes used to find out whether a port on a remote host
//! is already taken.

use std::{fmt::Display, io::ErrorKind, time::Duration};

use async_trait::async_trait;
use tokio::net::TcpStream;

/// The outcome of probing a single `address:port` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeResult {
    /// The host actively refused the connection, nothing listens on the port.
    Free,

    /// A connection was established, something listens on the port.
    Occupied,

    /// No answer could be obtained: the connect timed out, the host or
    /// network is unreachable, or the address could not be resolved.
    Unreachable,
}

impl Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => f.write_str("free"),
            Self::Occupied => f.write_str("occupied"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Checks whether a port is in use on a host.
///
/// The production implementation is [`TcpPortProbe`]. Implementing this trait
/// allows swapping in scripted probes, e.g. in tests.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Probes `port` on `address`. The address is a host (IP address or
    /// hostname) without a port. Never fails, every failure is folded into
    /// [`ProbeResult::Unreachable`].
    async fn probe(&self, address: &str, port: u16) -> ProbeResult;
}

/// Probes ports by opening a TCP connection and closing it again right away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpPortProbe {
    connect_timeout: Duration,
}

impl TcpPortProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn probe(&self, address: &str, port: u16) -> ProbeResult {
        if address.is_empty() {
            tracing::trace!(port, "skipping probe of empty address");
            return ProbeResult::Unreachable;
        }

        // The connection is dropped (and thereby closed) on every path out of
        // this match, including the timeout which drops the pending connect.
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect((address, port))).await
        {
            Ok(Ok(_stream)) => ProbeResult::Occupied,
            Ok(Err(error)) if error.kind() == ErrorKind::ConnectionRefused => ProbeResult::Free,
            Ok(Err(error)) => {
                tracing::trace!(address, port, %error, "failed to connect");
                ProbeResult::Unreachable
            }
            Err(_) => {
                tracing::trace!(
                    address,
                    port,
                    timeout = %humantime::format_duration(self.connect_timeout),
                    "connect timed out"
                );
                ProbeResult::Unreachable
            }
        }
    }
}
