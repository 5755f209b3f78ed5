use std::{
    io,
    net::{Shutdown, SocketAddrV4},
    os::fd::{AsRawFd, IntoRawFd},
    time::{Duration, Instant},
};

use socket2::{Domain, SockAddr, Socket, Type};

/// How a non-blocking connect call returned.
#[derive(Debug)]
pub enum Connect {
    /// Handshake finished right away (usually loopback).
    Done,
    /// Handshake started, completion must be waited for.
    InProgress,
    Failed(io::Error),
}

/// The socket operations a probe is made of.
///
/// Tests swap in a scripted implementation to drive every branch.
pub trait Sockets: Sync {
    type Socket;

    fn open(&self) -> io::Result<Self::Socket>;
    fn set_nonblocking(&self, socket: &Self::Socket) -> io::Result<()>;
    fn connect(&self, socket: &Self::Socket, addr: SocketAddrV4) -> Connect;
    /// Waits up to `budget` for the socket to become writable, readable or
    /// erroneous. Returns `false` when nothing happened in time.
    fn wait_ready(&self, socket: &Self::Socket, budget: Duration) -> io::Result<bool>;
    /// Pending error of the socket (`SO_ERROR`), cleared by reading it.
    fn take_error(&self, socket: &Self::Socket) -> io::Result<Option<io::Error>>;
    fn shutdown(&self, socket: &Self::Socket) -> io::Result<()>;
    /// Releases the descriptor, reporting a failing `close(2)`.
    fn close(&self, socket: Self::Socket) -> io::Result<()>;
}

/// IPv4 stream sockets of the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSockets;

impl Sockets for SystemSockets {
    type Socket = Socket;

    fn open(&self) -> io::Result<Socket> {
        Socket::new(Domain::IPV4, Type::STREAM, None)
    }

    fn set_nonblocking(&self, socket: &Socket) -> io::Result<()> {
        socket.set_nonblocking(true)
    }

    fn connect(&self, socket: &Socket, addr: SocketAddrV4) -> Connect {
        match socket.connect(&SockAddr::from(addr)) {
            Ok(()) => Connect::Done,
            Err(e) => match e.raw_os_error() {
                // An interrupted non-blocking connect keeps going asynchronously.
                Some(libc::EINPROGRESS) | Some(libc::EINTR) => Connect::InProgress,
                _ => Connect::Failed(e),
            },
        }
    }

    fn wait_ready(&self, socket: &Socket, budget: Duration) -> io::Result<bool> {
        if budget.is_zero() {
            return Ok(false);
        }

        let deadline = Instant::now() + budget;
        let mut pfd = libc::pollfd {
            fd: socket.as_raw_fd(),
            events: libc::POLLIN | libc::POLLOUT,
            revents: 0,
        };

        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            // Round up so a sub-millisecond remainder still polls once more.
            let millis = left.as_micros().div_ceil(1000).min(libc::c_int::MAX as u128) as libc::c_int;

            // SAFETY: `pfd` is a single valid pollfd for the duration of the call.
            match unsafe { libc::poll(&mut pfd, 1, millis) } {
                -1 => {
                    let e = io::Error::last_os_error();
                    match e.kind() {
                        io::ErrorKind::Interrupted if !left.is_zero() => continue,
                        io::ErrorKind::Interrupted => return Ok(false),
                        _ => return Err(e),
                    }
                }
                0 => return Ok(false),
                _ => return Ok(pfd.revents != 0),
            }
        }
    }

    fn take_error(&self, socket: &Socket) -> io::Result<Option<io::Error>> {
        socket.take_error()
    }

    fn shutdown(&self, socket: &Socket) -> io::Result<()> {
        socket.shutdown(Shutdown::Both)
    }

    fn close(&self, socket: Socket) -> io::Result<()> {
        // Dropping a socket swallows close errors, they are fatal here.
        let fd = socket.into_raw_fd();
        // SAFETY: `fd` was just released by its owner and is closed exactly once.
        match unsafe { libc::close(fd) } {
            -1 => Err(io::Error::last_os_error()),
            _ => Ok(()),
        }
    }
}
