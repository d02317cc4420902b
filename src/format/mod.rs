//! Response formatting.
//!
//! Raw XML is re-indented; JSON is printed with sorted keys and four-space
//! indentation so that output from different runs diffs cleanly.

pub mod xml;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::io::{self, Write};

use crate::transport::Response;

pub use xml::{parse_document, pretty_xml, Element};

/// Transport metadata attached to structured responses; never displayed.
pub const METADATA_KEY: &str = "ResponseMetadata";

/// Response bytes that could not be read in the expected format.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("response is not valid UTF-8: {0}")]
    Utf8(String),

    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// Render a decoded response for display.
pub fn render(response: &Response) -> Result<String, DecodeError> {
    match response {
        Response::Xml(bytes) => {
            let text =
                std::str::from_utf8(bytes).map_err(|e| DecodeError::Utf8(e.to_string()))?;
            pretty_xml(text)
        }
        Response::Json(value) => pretty_json(value),
        Response::Mapping(map) => pretty_json(&Value::Object(strip_metadata(map.clone()))),
    }
}

/// Remove the transport metadata member from a structured response.
pub fn strip_metadata(mut map: Map<String, Value>) -> Map<String, Value> {
    map.remove(METADATA_KEY);
    map
}

/// `json.dumps(value, indent=4, sort_keys=True)` equivalent. Keys come out
/// sorted because `serde_json::Map` is a `BTreeMap` without `preserve_order`.
pub fn pretty_json(value: &Value) -> Result<String, DecodeError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter::new());
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| DecodeError::Utf8(e.to_string()))
}

/// Four-space pretty printer that writes non-ASCII characters as `\uXXXX`
/// escapes (UTF-16 surrogate pairs above the BMP).
struct AsciiFormatter {
    pretty: PrettyFormatter<'static>,
}

impl AsciiFormatter {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut rest = fragment;
        while let Some(pos) = rest.find(|c: char| !c.is_ascii()) {
            writer.write_all(rest[..pos].as_bytes())?;
            let c = rest[pos..].chars().next().unwrap_or_default();
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            rest = &rest[pos + c.len_utf8()..];
        }
        writer.write_all(rest.as_bytes())
    }
}

/// String form of a timestamp: `2019-06-01 12:30:00+00:00`, with
/// microseconds only when non-zero.
pub fn timestamp_string(ts: DateTime<Utc>) -> String {
    let micros = ts.nanosecond() / 1_000;
    if micros == 0 {
        format!("{}+00:00", ts.format("%Y-%m-%d %H:%M:%S"))
    } else {
        format!("{}.{:06}+00:00", ts.format("%Y-%m-%d %H:%M:%S"), micros)
    }
}

/// Interpret a wire timestamp: epoch seconds or an RFC 3339 string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            let mut whole = secs.floor() as i64;
            let mut nanos = ((secs - secs.floor()) * 1e9).round() as u32;
            if nanos >= 1_000_000_000 {
                whole += 1;
                nanos -= 1_000_000_000;
            }
            DateTime::<Utc>::from_timestamp(whole, nanos)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Replace timestamp members (at any depth) with their string form.
/// Values that do not parse as timestamps are left untouched.
pub fn stringify_timestamps(value: &mut Value, members: &[&str]) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if members.contains(&key.as_str()) {
                    if let Some(ts) = parse_timestamp(child) {
                        *child = Value::String(timestamp_string(ts));
                        continue;
                    }
                }
                stringify_timestamps(child, members);
            }
        }
        Value::Array(items) => {
            for item in items {
                stringify_timestamps(item, members);
            }
        }
        _ => {}
    }
}
