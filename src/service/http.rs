//! Just enough HTTP/1.1 to serve JSON: one request per connection, bodies framed by
//! `Content-Length`, every response sent with `Connection: close`.
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::service::error::ServiceError;

/// Upper bound on the request line plus headers.
const MAX_HEAD_BYTES: usize = 16 * 1024;

const READ_CHUNK: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Request target without the query string.
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                Self {
                    status: 500,
                    body: br#"{"success":false,"error":{"kind":"EncodeError","message":"response serialization failed"}}"#.to_vec(),
                }
            }
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        504 => "Gateway Timeout",
        _ => "Internal Server Error",
    }
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse the request line and headers; returns (method, path, content length).
fn parse_head(head: &[u8]) -> Result<(String, String, usize), ServiceError> {
    let text = std::str::from_utf8(head)
        .map_err(|_| ServiceError::BadRequest("request head is not UTF-8".into()))?;
    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ServiceError::BadRequest(format!(
            "bad request line {request_line:?}"
        )));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ServiceError::BadRequest(format!(
            "unsupported protocol {version}"
        )));
    }

    let mut content_length = 0;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().map_err(|_| {
                ServiceError::BadRequest(format!("bad Content-Length {:?}", value.trim()))
            })?;
        }
    }

    let path = target.split('?').next().unwrap_or(target);
    Ok((method.to_string(), path.to_string(), content_length))
}

/// Read one request. `Ok(None)` means the peer closed without sending anything.
///
/// A `Content-Length` above `max_body` is rejected before the body is read.
pub async fn read_request<S: AsyncRead + Unpin>(
    stream: &mut S,
    max_body: usize,
) -> Result<Option<Request>, ServiceError> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let head_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ServiceError::BadRequest("request head too large".into()));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(ServiceError::BadRequest(
                "connection closed inside the request head".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let (method, path, content_length) = parse_head(&buf[..head_end])?;
    if content_length > max_body {
        return Err(ServiceError::PayloadTooLarge { limit: max_body });
    }

    let mut body = buf.split_off(head_end + 4);
    body.truncate(content_length);
    if body.len() < content_length {
        let start = body.len();
        body.resize(content_length, 0);
        stream
            .read_exact(&mut body[start..])
            .await
            .map_err(|e| ServiceError::BadRequest(format!("truncated body: {e}")))?;
    }

    Ok(Some(Request { method, path, body }))
}

pub async fn write_response<S: AsyncWrite + Unpin>(
    stream: &mut S,
    response: &Response,
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&response.body).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_a_framed_post() {
        let mut input: &[u8] =
            b"POST /extend-canvas?trace=1 HTTP/1.1\r\nHost: x\r\ncontent-length: 7\r\n\r\n{\"a\":1}trailing";
        let req = read_request(&mut input, 1024).await.unwrap().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/extend-canvas");
        assert_eq!(req.body, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn get_without_body() {
        let mut input: &[u8] = b"GET /health HTTP/1.1\r\n\r\n";
        let req = read_request(&mut input, 1024).await.unwrap().unwrap();
        assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/health"));
        assert!(req.body.is_empty());
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused_up_front() {
        let mut input: &[u8] = b"POST /extend-canvas HTTP/1.1\r\nContent-Length: 4096\r\n\r\n";
        let err = read_request(&mut input, 1024).await.unwrap_err();
        assert!(matches!(err, ServiceError::PayloadTooLarge { limit: 1024 }));
    }

    #[tokio::test]
    async fn malformed_heads_are_bad_requests() {
        let mut input: &[u8] = b"HELLO\r\n\r\n";
        assert!(matches!(
            read_request(&mut input, 1024).await,
            Err(ServiceError::BadRequest(_))
        ));
        let mut input: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n";
        assert!(matches!(
            read_request(&mut input, 1024).await,
            Err(ServiceError::BadRequest(_))
        ));
        let mut input: &[u8] = b"";
        assert!(read_request(&mut input, 1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_body_is_rejected() {
        let mut input: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert!(matches!(
            read_request(&mut input, 1024).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn writes_status_line_and_length() {
        let mut out = Vec::new();
        let response = Response::json(422, &serde_json::json!({ "success": false }));
        write_response(&mut out, &response).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 422 Unprocessable Entity\r\n"));
        assert!(text.contains("Content-Length: 17\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"success\":false}"));
    }

    #[test]
    fn find_subsequence_crlf() {
        assert_eq!(find_subsequence(b"ab\r\n\r\ncd", b"\r\n\r\n"), Some(2));
        assert_eq!(find_subsequence(b"ab\r\ncd", b"\r\n\r\n"), None);
    }
}
