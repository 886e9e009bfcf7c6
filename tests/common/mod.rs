//! Shared mocks for the decorator tests.
//!
//! Every mock operation and every hook installed by the tests appends its
//! name to a shared [`CallLog`], so tests can assert on exact call order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use connxray::net::{Addr, Connection, Listener, PacketConnection};

pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn push(log: &CallLog, name: &'static str) {
    log.lock().unwrap().push(name);
}

pub fn calls(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

pub fn error(kind: io::ErrorKind, msg: &'static str) -> io::Error {
    io::Error::new(kind, msg)
}

/// Assert that `err` is the error built by `error(kind, msg)`.
pub fn assert_same_error(err: &io::Error, kind: io::ErrorKind, msg: &str) {
    assert_eq!(err.kind(), kind);
    assert_eq!(err.to_string(), msg);
}

pub fn local_addr() -> Addr {
    Addr::Inet("127.0.0.1:1983".parse().unwrap())
}

pub fn remote_addr() -> Addr {
    Addr::Inet("10.1.2.3:40000".parse().unwrap())
}

pub fn peer_addr() -> Addr {
    Addr::Unix(PathBuf::from("/run/peer.sock"))
}

/// Scripted connection. Reads return the queued sizes, then 0 (EOF).
#[derive(Debug)]
pub struct MockConnection {
    pub log: CallLog,
    pub packet: bool,
    pub packet_queries: usize,
    pub fail: Option<(io::ErrorKind, &'static str)>,
    pub reads: VecDeque<usize>,
    pub local: Option<Addr>,
    pub remote: Option<Addr>,
}

impl MockConnection {
    pub fn stream(log: &CallLog) -> Self {
        Self {
            log: Arc::clone(log),
            packet: false,
            packet_queries: 0,
            fail: None,
            reads: VecDeque::new(),
            local: Some(local_addr()),
            remote: Some(remote_addr()),
        }
    }

    pub fn packet(log: &CallLog) -> Self {
        Self {
            packet: true,
            ..Self::stream(log)
        }
    }

    pub fn with_reads(mut self, sizes: &[usize]) -> Self {
        self.reads = sizes.iter().copied().collect();
        self
    }

    /// Make every operation fail with the given error.
    pub fn failing(mut self, kind: io::ErrorKind, msg: &'static str) -> Self {
        self.fail = Some((kind, msg));
        self
    }

    fn check(&self) -> io::Result<()> {
        match self.fail {
            Some((kind, msg)) => Err(error(kind, msg)),
            None => Ok(()),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = self.reads.pop_front().unwrap_or(0).min(buf.len());
        buf[..n].fill(b'x');
        n
    }
}

impl Connection for MockConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        push(&self.log, "read");
        self.check()?;
        Ok(self.fill(buf))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        push(&self.log, "write");
        self.check()?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        push(&self.log, "close");
        self.check()
    }

    fn local_addr(&self) -> Option<Addr> {
        push(&self.log, "local_addr");
        self.local.clone()
    }

    fn remote_addr(&self) -> Option<Addr> {
        push(&self.log, "remote_addr");
        self.remote.clone()
    }

    fn set_deadline(&mut self, _deadline: Option<Instant>) -> io::Result<()> {
        push(&self.log, "set_deadline");
        self.check()
    }

    fn set_read_deadline(&mut self, _deadline: Option<Instant>) -> io::Result<()> {
        push(&self.log, "set_read_deadline");
        self.check()
    }

    fn set_write_deadline(&mut self, _deadline: Option<Instant>) -> io::Result<()> {
        push(&self.log, "set_write_deadline");
        self.check()
    }

    fn as_packet(&mut self) -> Option<&mut dyn PacketConnection> {
        self.packet_queries += 1;
        if self.packet {
            Some(self as &mut dyn PacketConnection)
        } else {
            None
        }
    }
}

impl PacketConnection for MockConnection {
    fn read_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, Addr)> {
        push(&self.log, "read_from");
        self.check()?;
        Ok((self.fill(buf), peer_addr()))
    }

    fn write_to(&mut self, buf: &[u8], _addr: &Addr) -> io::Result<usize> {
        push(&self.log, "write_to");
        self.check()?;
        Ok(buf.len())
    }
}

/// Scripted listener producing stream-only [`MockConnection`]s.
#[derive(Debug)]
pub struct MockListener {
    pub log: CallLog,
    pub accept_error: Option<(io::ErrorKind, &'static str)>,
    pub close_error: Option<(io::ErrorKind, &'static str)>,
    pub addr: Option<Addr>,
    pub reads: Vec<usize>,
}

impl MockListener {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Arc::clone(log),
            accept_error: None,
            close_error: None,
            addr: Some(local_addr()),
            reads: Vec::new(),
        }
    }

    /// Queue reads for every connection this listener produces.
    pub fn with_reads(mut self, sizes: &[usize]) -> Self {
        self.reads = sizes.to_vec();
        self
    }
}

impl Listener for MockListener {
    type Conn = MockConnection;

    fn accept(&mut self) -> io::Result<MockConnection> {
        push(&self.log, "accept");
        if let Some((kind, msg)) = self.accept_error {
            return Err(error(kind, msg));
        }
        Ok(MockConnection::stream(&self.log).with_reads(&self.reads))
    }

    fn close(&mut self) -> io::Result<()> {
        push(&self.log, "close");
        match self.close_error {
            Some((kind, msg)) => Err(error(kind, msg)),
            None => Ok(()),
        }
    }

    fn addr(&self) -> Option<Addr> {
        push(&self.log, "addr");
        self.addr.clone()
    }
}
