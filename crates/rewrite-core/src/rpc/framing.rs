//! Content-Length framing for JSON-RPC messages.
//!
//! Each message is `Content-Length: N\r\n\r\n` followed by `N` bytes of UTF-8
//! JSON. Other headers are accepted and ignored.

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::error::{RpcError, RpcResult};

const CONTENT_LENGTH: &str = "content-length";

/// Reads one framed message. Returns `Ok(None)` on a clean end of stream
/// (no bytes read before the header block).
pub fn read_message<R: BufRead + ?Sized>(reader: &mut R) -> RpcResult<Option<Value>> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            if saw_header {
                return Err(RpcError::UnexpectedEof);
            }
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            if !saw_header {
                // Tolerate stray blank lines between messages.
                continue;
            }
            break;
        }
        saw_header = true;
        let (name, value) = trimmed
            .split_once(':')
            .ok_or_else(|| RpcError::InvalidHeader {
                line: trimmed.to_string(),
            })?;
        if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
            let length = value
                .trim()
                .parse::<usize>()
                .map_err(|_| RpcError::InvalidHeader {
                    line: trimmed.to_string(),
                })?;
            content_length = Some(length);
        }
    }

    let length = content_length.ok_or(RpcError::MissingContentLength)?;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            RpcError::UnexpectedEof
        } else {
            RpcError::Io(e)
        }
    })?;
    Ok(Some(serde_json::from_slice(&body)?))
}

/// Writes one framed message and flushes.
pub fn write_message<W: Write + ?Sized>(writer: &mut W, message: &Value) -> RpcResult<()> {
    let body = serde_json::to_vec(message)?;
    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn write_then_read() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &json!({"jsonrpc": "2.0", "id": 1, "method": "Reset"})).unwrap();
        write_message(&mut buffer, &json!({"text": "héllo"})).unwrap();

        let mut reader = Cursor::new(buffer);
        let first = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(first["method"], "Reset");
        let second = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(second["text"], "héllo");
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn length_counts_bytes_not_chars() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &json!("é")).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        // "é" is two bytes plus two quotes
        assert!(text.starts_with("Content-Length: 4\r\n\r\n"));
    }

    #[test]
    fn extra_headers_are_ignored() {
        let raw = b"Content-Type: application/json\r\ncontent-length: 2\r\n\r\n{}";
        let mut reader = Cursor::new(raw.to_vec());
        assert_eq!(read_message(&mut reader).unwrap().unwrap(), json!({}));
    }

    #[test]
    fn missing_length_is_an_error() {
        let raw = b"Content-Type: application/json\r\n\r\n{}";
        let mut reader = Cursor::new(raw.to_vec());
        assert!(matches!(
            read_message(&mut reader),
            Err(RpcError::MissingContentLength)
        ));
    }

    #[test]
    fn truncated_body_is_unexpected_eof() {
        let raw = b"Content-Length: 10\r\n\r\n{}";
        let mut reader = Cursor::new(raw.to_vec());
        assert!(matches!(read_message(&mut reader), Err(RpcError::UnexpectedEof)));
    }

    #[test]
    fn malformed_header_is_rejected() {
        let raw = b"garbage\r\n\r\n";
        let mut reader = Cursor::new(raw.to_vec());
        assert!(matches!(
            read_message(&mut reader),
            Err(RpcError::InvalidHeader { .. })
        ));
    }
}
