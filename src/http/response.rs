//! Response rendering.

use std::io::{self, Write};

/// Render a `200 OK` plain-text response that closes the connection.
pub fn render_ok(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

pub fn write_ok<W: Write>(mut writer: W, body: &str) -> io::Result<()> {
    writer.write_all(render_ok(body).as_bytes())?;
    writer.flush()
}
