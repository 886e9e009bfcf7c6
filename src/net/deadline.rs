//! Absolute deadlines on top of per-operation socket timeouts.
//!
//! Std sockets only know relative timeouts, so a deadline is stored and
//! converted into the remaining time right before each operation.

use std::io;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn set(&mut self, at: Option<Instant>) {
        self.0 = at;
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Time left until the deadline, or a timeout error once it has passed.
    pub(crate) fn remaining(&self) -> io::Result<Option<Duration>> {
        match self.0 {
            None => Ok(None),
            Some(at) => {
                let left = at.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    Err(deadline_exceeded())
                } else {
                    Ok(Some(left))
                }
            }
        }
    }
}

pub(crate) fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "i/o deadline exceeded")
}

/// Socket timeouts surface as `WouldBlock` on Unix; report them as timeouts.
pub(crate) fn map_timeout(err: io::Error, deadline: &Deadline) -> io::Error {
    if deadline.is_set() && err.kind() == io::ErrorKind::WouldBlock {
        deadline_exceeded()
    } else {
        err
    }
}
