use std::{fmt::Debug, net::SocketAddrV4, time::Duration};

use crate::error::ScanError;

pub use self::socket::{Connect, Sockets, SystemSockets};

mod socket;

/// Result of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected,
    /// The handshake failed, e.g. the host answered with a reset.
    Refused,
    /// Nothing happened within the wait budget.
    TimedOut,
}

/// Checks whether an address accepts TCP connections on a port.
///
/// Per-attempt failures are outcomes. An `Err` means the system itself
/// misbehaved and the scan can't go on.
pub trait Probe: Debug + Sync {
    fn check(&self, addr: SocketAddrV4) -> Result<ProbeOutcome, ScanError>;
}

impl<P: Probe + ?Sized> Probe for &P {
    fn check(&self, addr: SocketAddrV4) -> Result<ProbeOutcome, ScanError> {
        (**self).check(addr)
    }
}

/// Full TCP handshake over a non-blocking socket with a bounded wait.
#[derive(Debug)]
pub struct ConnectProbe<S = SystemSockets> {
    sockets: S,
    timeout: Duration,
}

impl ConnectProbe {
    pub fn new(timeout: Duration) -> Self {
        Self::with_sockets(SystemSockets, timeout)
    }
}

impl<S: Sockets> ConnectProbe<S> {
    pub fn with_sockets(sockets: S, timeout: Duration) -> Self {
        Self { sockets, timeout }
    }

    fn handshake(&self, socket: &S::Socket, addr: SocketAddrV4) -> Result<ProbeOutcome, ScanError> {
        self.sockets
            .set_nonblocking(socket)
            .map_err(|e| ScanError::system("fcntl O_NONBLOCK", e))?;

        match self.sockets.connect(socket, addr) {
            Connect::Done => return Ok(ProbeOutcome::Connected),
            Connect::InProgress => {}
            Connect::Failed(e) => {
                log::debug!("Connection to {} failed: {}", addr, e);
                return Ok(ProbeOutcome::Refused);
            }
        }

        let ready = !self.timeout.is_zero()
            && self
                .sockets
                .wait_ready(socket, self.timeout)
                .map_err(|e| ScanError::system("poll", e))?;

        if !ready {
            log::debug!("Connection to {} timed out", addr);
            return Ok(ProbeOutcome::TimedOut);
        }

        match self.sockets.take_error(socket) {
            Ok(None) => Ok(ProbeOutcome::Connected),
            Ok(Some(e)) => {
                log::debug!("Connection to {} failed with socket error: {}", addr, e);
                Ok(ProbeOutcome::Refused)
            }
            Err(e) => {
                log::debug!("Couldn't read socket error of {}: {}", addr, e);
                Ok(ProbeOutcome::Refused)
            }
        }
    }
}

impl<S: Sockets + Debug> Probe for ConnectProbe<S> {
    fn check(&self, addr: SocketAddrV4) -> Result<ProbeOutcome, ScanError> {
        let socket = self
            .sockets
            .open()
            .map_err(|e| ScanError::system("socket", e))?;

        let outcome = self.handshake(&socket, addr);

        // The descriptor is released before any error leaves this function.
        let shutdown = match outcome {
            Ok(ProbeOutcome::Connected) => self
                .sockets
                .shutdown(&socket)
                .map_err(|e| ScanError::system("shutdown", e)),
            _ => Ok(()),
        };
        let close = self
            .sockets
            .close(socket)
            .map_err(|e| ScanError::system("close", e));

        let outcome = outcome?;
        shutdown?;
        close?;

        Ok(outcome)
    }
}
