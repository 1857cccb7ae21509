//! JSON-RPC message framing for the LSP stdio transport.
//!
//! Every message is `Content-Length: N\r\n\r\n<N bytes of UTF-8 JSON>`, with
//! optional extra headers such as `Content-Type` before the blank line.
//!
//! [`MessageReader`] also accepts a bare JSON object on a single line, which is
//! convenient when driving the server by hand from a terminal.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Upper bound on a single message body.
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

/// Reads framed JSON-RPC messages from an async reader.
pub struct MessageReader<R> {
    reader: BufReader<R>,
    buf: String,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: String::new(),
        }
    }

    /// Read the next message body, returning `None` on EOF between messages.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` for a header block without a usable
    /// `Content-Length` or a body that is not UTF-8, and `UnexpectedEof` if the
    /// stream ends inside a message.
    pub async fn next_message(&mut self) -> io::Result<Option<String>> {
        let mut content_length: Option<usize> = None;
        let mut in_headers = false;

        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).await?;
            if n == 0 {
                if in_headers {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "EOF in message headers",
                    ));
                }
                return Ok(None);
            }

            let line = self.buf.trim();

            if line.is_empty() {
                if !in_headers {
                    continue;
                }
                break;
            }

            if !in_headers && line.starts_with('{') {
                return Ok(Some(line.to_string()));
            }

            in_headers = true;
            let Some((name, value)) = line.split_once(':') else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed header line: {line}"),
                ));
            };

            if name.trim().eq_ignore_ascii_case("Content-Length") {
                let len: usize = value
                    .trim()
                    .parse()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                content_length = Some(len);
            }
            // Other headers (Content-Type) are ignored.
        }

        let len = content_length.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "missing Content-Length header")
        })?;
        if len > MAX_CONTENT_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Content-Length {len} exceeds limit"),
            ));
        }

        let mut body = vec![0u8; len];
        self.reader.read_exact(&mut body).await?;
        String::from_utf8(body)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Encode a JSON message with a `Content-Length` header.
///
/// The length counts bytes, not characters.
pub fn encode_content_length(json: &str) -> Vec<u8> {
    let header = format!("Content-Length: {}\r\n\r\n", json.len());
    let mut buf = Vec::with_capacity(header.len() + json.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(json.as_bytes());
    buf
}

/// Write one framed message and flush.
///
/// # Errors
///
/// Returns an I/O error if writing or flushing fails.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> io::Result<()> {
    writer.write_all(&encode_content_length(json)).await?;
    writer.flush().await
}
