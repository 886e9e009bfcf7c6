//! Request head parsing.

use std::io::{self, BufRead, BufReader, Read};

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// The parts of a request line the server cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub header_count: usize,
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// Read a request line and headers, up to the blank line.
///
/// Any body is left unread.
pub fn read_request_head<R: Read>(reader: R) -> io::Result<RequestHead> {
    let mut reader = BufReader::new(reader);
    let mut consumed = 0;
    let mut line = String::new();

    let mut next_line = |line: &mut String| -> io::Result<()> {
        line.clear();
        if consumed >= MAX_HEAD_BYTES {
            return Err(invalid("request head too large"));
        }
        let limit = (MAX_HEAD_BYTES - consumed) as u64;
        let n = (&mut reader).take(limit).read_line(line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before end of request head",
            ));
        }
        consumed += n;
        if !line.ends_with('\n') {
            return Err(invalid("request head too large"));
        }
        Ok(())
    };

    next_line(&mut line)?;
    let mut parts = line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) if v.starts_with("HTTP/") => {
            (m.to_string(), t.to_string(), v.to_string())
        }
        _ => return Err(invalid("malformed request line")),
    };

    let mut header_count = 0;
    loop {
        next_line(&mut line)?;
        if line.trim_end_matches(['\r', '\n']).is_empty() {
            break;
        }
        header_count += 1;
    }

    Ok(RequestHead {
        method,
        target,
        version,
        header_count,
    })
}
