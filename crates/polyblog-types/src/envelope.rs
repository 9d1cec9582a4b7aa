//! The request and response shapes exchanged with the broker.
//!
//! A response travels as exactly four ordered string frames:
//!
//! ```text
//! [route, status, header-block JSON, body]
//! ```
//!
//! The broker reads the first frame to route the reply back to the original
//! caller, so the worker keeps no per-request correlation state.

use std::collections::BTreeMap;
use std::io;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::ids::RouteId;

/// Number of frames in an encoded response.
pub const RESPONSE_FRAME_COUNT: usize = 4;

/// HTTP-style status code carried in the second response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(u16);

impl StatusCode {
    /// `200`, a rendered page.
    pub const OK: Self = Self(200);
    /// `500`, rendering failed.
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
}

impl core::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response headers, encoded as a flat JSON object in the third frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderBlock(BTreeMap<String, String>);

impl HeaderBlock {
    /// An empty header block.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Header block with a single `Content-Type`.
    pub fn content_type(mime: &str) -> Self {
        Self::new().with("Content-Type", mime)
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Encode as the JSON object sent on the wire, e.g.
    /// `{"Content-Type": "text/html"}`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, HeaderFormatter);
        self.0.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(serde_json::Error::custom)
    }
}

/// Compact JSON with a space after `:` and `,`, the layout brokers and
/// clients compare header frames against.
struct HeaderFormatter;

impl Formatter for HeaderFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// An inbound request. The payload is never inspected to pick a behaviour;
/// the route itself is the dispatch key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    payload: String,
}

impl Request {
    /// Wrap a received payload.
    pub const fn new(payload: String) -> Self {
        Self { payload }
    }

    /// Payload size in bytes.
    pub const fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub const fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A response envelope: route, status, headers, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Route this response answers; always the route the worker registered.
    pub route: RouteId,
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderBlock,
    /// Response body.
    pub body: String,
}

impl Envelope {
    /// A `200` response carrying an HTML document.
    pub fn html(route: RouteId, body: String) -> Self {
        Self {
            route,
            status: StatusCode::OK,
            headers: HeaderBlock::content_type("text/html"),
            body,
        }
    }

    /// A `500` response with a plain-text body.
    pub fn internal_error(route: RouteId) -> Self {
        Self {
            route,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderBlock::content_type("text/plain"),
            body: "Internal Server Error".to_owned(),
        }
    }

    /// Encode into the four ordered wire frames.
    pub fn into_frames(self) -> Result<[String; RESPONSE_FRAME_COUNT], serde_json::Error> {
        let headers = self.headers.to_json()?;
        Ok([
            self.route.into(),
            self.status.to_string(),
            headers,
            self.body,
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn html_envelope_frames() -> Result<(), Box<dyn Error>> {
        let route = RouteId::new("GET/_/post/new")?;
        let [route_frame, status, headers, body] =
            Envelope::html(route, "<p>hi</p>".to_owned()).into_frames()?;
        assert_eq!(route_frame, "GET/_/post/new");
        assert_eq!(status, "200");
        assert_eq!(headers, r#"{"Content-Type": "text/html"}"#);
        assert_eq!(body, "<p>hi</p>");
        Ok(())
    }

    #[test]
    fn internal_error_envelope() -> Result<(), Box<dyn Error>> {
        let route = RouteId::new("GET/_/post/new")?;
        let [route_frame, status, headers, body] = Envelope::internal_error(route).into_frames()?;
        assert_eq!(route_frame, "GET/_/post/new");
        assert_eq!(status, "500");
        assert_eq!(headers, r#"{"Content-Type": "text/plain"}"#);
        assert_eq!(body, "Internal Server Error");
        Ok(())
    }

    #[test]
    fn header_block_separates_entries() -> Result<(), serde_json::Error> {
        let headers = HeaderBlock::content_type("text/html").with("Cache-Control", "no-store");
        let json = headers.to_json()?;
        assert_eq!(json, r#"{"Cache-Control": "no-store", "Content-Type": "text/html"}"#);
        let back: HeaderBlock = serde_json::from_str(&json)?;
        assert_eq!(back, headers);
        assert_eq!(HeaderBlock::new().to_json()?, "{}");
        Ok(())
    }

    #[test]
    fn header_block_replaces_duplicates() -> Result<(), serde_json::Error> {
        let headers = HeaderBlock::content_type("text/html").with("Content-Type", "text/plain");
        assert_eq!(headers.to_json()?, r#"{"Content-Type": "text/plain"}"#);
        Ok(())
    }

    #[test]
    fn status_code_renders_as_digits() {
        assert_eq!(StatusCode::OK.to_string(), "200");
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.to_string(), "500");
    }

    #[test]
    fn request_reports_size() {
        assert_eq!(Request::new("x".to_owned()).len(), 1);
        assert!(Request::new(String::new()).is_empty());
    }
}
