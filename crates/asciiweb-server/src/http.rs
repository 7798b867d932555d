//! Minimal HTTP/1.1 request reading and response writing
//!
//! One request per connection: every response carries `Connection: close`.

use crate::error::{Result, ServerError};
use crate::form::percent_decode;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Request methods the router distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Other(String),
}

impl Method {
    fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    /// GET or HEAD
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Head => f.write_str("HEAD"),
            Method::Post => f.write_str("POST"),
            Method::Other(method) => f.write_str(method),
        }
    }
}

/// A parsed request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Percent-decoded path
    pub path: String,
    /// Raw query string, without `?`
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// Get a header value by name (case-insensitive). Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn content_length(&self) -> Result<usize> {
        match self.header("content-length") {
            Some(value) => value
                .parse()
                .map_err(|_| ServerError::MalformedRequest(format!("bad Content-Length {value:?}"))),
            None => Ok(0),
        }
    }

    /// Whether the body is urlencoded form data
    pub fn has_form_body(&self) -> bool {
        self.header("content-type").is_some_and(|value| {
            value
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
    }
}

/// Parse the request line and headers (everything before `\r\n\r\n`)
pub fn parse_head(head: &str) -> Result<Request> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ServerError::MalformedRequest(format!(
            "bad request line {request_line:?}"
        )));
    };

    if !version.starts_with("HTTP/1.") {
        return Err(ServerError::MalformedRequest(format!("unsupported version {version}")));
    }
    if !target.starts_with('/') {
        return Err(ServerError::MalformedRequest(format!("bad target {target:?}")));
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let mut headers = Vec::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ServerError::MalformedRequest(format!("bad header {line:?}")))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(Request {
        method: Method::parse(method),
        path: percent_decode(path),
        query: query.to_string(),
        headers,
        body: Vec::new(),
    })
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Read one request, head and `Content-Length` body, from a stream
pub async fn read_request<R>(reader: &mut R, max_bytes: usize) -> Result<Request>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        if buf.len() > max_bytes {
            return Err(ServerError::RequestTooLarge(max_bytes));
        }

        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(if buf.is_empty() {
                ServerError::ConnectionClosed
            } else {
                ServerError::MalformedRequest("connection closed inside head".to_string())
            });
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| ServerError::MalformedRequest("head is not UTF-8".to_string()))?;
    let mut request = parse_head(head)?;

    let body_start = head_end + 4;
    let content_length = request.content_length()?;
    if body_start.saturating_add(content_length) > max_bytes {
        return Err(ServerError::RequestTooLarge(max_bytes));
    }

    let mut body = buf.split_off(body_start);
    while body.len() < content_length {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(ServerError::MalformedRequest(
                "body shorter than Content-Length".to_string(),
            ));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);
    request.body = body;

    Ok(request)
}

/// Reason phrase for the statuses the server sends
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A response ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// 200 with an HTML page
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    /// Plain text error such as `404 Not Found`
    pub fn error(status: u16) -> Self {
        let body = format!("{} {}\n", status, reason_phrase(status));
        Self::new(status, "text/plain; charset=utf-8", body)
    }

    /// Serialize; `include_body` is false for HEAD requests
    pub fn to_bytes(&self, include_body: bool) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Server: asciiweb/{}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n",
            self.status,
            reason_phrase(self.status),
            env!("CARGO_PKG_VERSION"),
            self.content_type,
            self.body.len()
        );

        let mut out = head.into_bytes();
        if include_body {
            out.extend_from_slice(&self.body);
        }
        out
    }
}
