//! HTTP/1.1-style message text for requests and responses.
//!
//! The rendering is start line, `Name: value` headers, a blank line, then the
//! raw body. `Content-Length` is added on render when absent and honoured on
//! parse, so trailing bytes after the body are ignored.

use crate::envelope::{Headers, HttpRequest, HttpResponse};
use crate::errors::CodecError;

const VERSION: &str = "HTTP/1.1";

impl HttpRequest {
    /// Renders the request as message text.
    pub fn to_wire(&self) -> Vec<u8> {
        render(
            format!("{} {} {VERSION}", self.method, self.uri),
            &self.headers,
            &self.body,
        )
    }

    /// Parses message text produced by [`HttpRequest::to_wire`] or by hand.
    pub fn parse_wire(bytes: &[u8]) -> Result<Self, CodecError> {
        let (start, headers, body) = split(bytes)?;
        let mut parts = start.split_whitespace();
        let (Some(method), Some(uri), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed(format!("bad request line '{start}'")));
        };
        if !version.starts_with("HTTP/") {
            return Err(malformed(format!("bad protocol version '{version}'")));
        }
        Ok(Self {
            method: method.to_string(),
            uri: uri.to_string(),
            headers,
            body,
        })
    }
}

impl HttpResponse {
    /// Renders the response as message text.
    pub fn to_wire(&self) -> Vec<u8> {
        let start = match reason_phrase(self.status) {
            "" => format!("{VERSION} {}", self.status),
            reason => format!("{VERSION} {} {reason}", self.status),
        };
        render(start, &self.headers, &self.body)
    }

    /// Parses message text produced by [`HttpResponse::to_wire`] or by hand.
    pub fn parse_wire(bytes: &[u8]) -> Result<Self, CodecError> {
        let (start, headers, body) = split(bytes)?;
        let mut parts = start.splitn(3, ' ');
        let version = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(malformed(format!("bad status line '{start}'")));
        }
        let status = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .filter(|code| (100..1000).contains(code))
            .ok_or_else(|| malformed(format!("bad status line '{start}'")))?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        _ => "",
    }
}

fn render(start: String, headers: &Headers, body: &[u8]) -> Vec<u8> {
    let mut out = start.into_bytes();
    out.extend_from_slice(b"\r\n");
    for (name, value) in headers.iter() {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    if headers.get("Content-Length").is_none() {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

fn split(bytes: &[u8]) -> Result<(String, Headers, Vec<u8>), CodecError> {
    let (head_end, body_start) = find_blank_line(bytes)
        .ok_or_else(|| malformed("missing blank line after headers"))?;
    let head = std::str::from_utf8(&bytes[..head_end])
        .map_err(|e| malformed(format!("header section is not UTF-8: {e}")))?;

    let mut lines = head.lines();
    let start = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| malformed("empty start line"))?
        .to_string();

    let mut headers = Headers::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| malformed(format!("bad header line '{line}'")))?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(malformed(format!("bad header name '{name}'")));
        }
        headers.set(name, value.trim());
    }

    let mut body = bytes[body_start..].to_vec();
    if let Some(length) = headers.get("Content-Length") {
        let length: usize = length
            .parse()
            .map_err(|_| malformed(format!("bad Content-Length '{length}'")))?;
        if body.len() < length {
            return Err(malformed(format!(
                "body has {} bytes, Content-Length is {length}",
                body.len()
            )));
        }
        body.truncate(length);
    }
    Ok((start, headers, body))
}

/// Returns the end of the header section and the start of the body.
fn find_blank_line(bytes: &[u8]) -> Option<(usize, usize)> {
    let crlf = bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = bytes.windows(2).position(|w| w == b"\n\n").map(|i| (i, i + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::MalformedMessage(reason.into())
}
