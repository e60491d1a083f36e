//! Indented JSON rendering
//!
//! Nested objects are rendered on their own with the prefix of the line they
//! will be spliced into, then stitched together after their trailing newline
//! has been trimmed. Every fragment follows the same layout: the first line
//! carries no prefix, every following line starts with `prefix`, and the
//! fragment ends with a newline after its closing brace.

use crate::Result;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter, Serializer};
use std::io;

/// Types that render themselves as indented JSON fragments
pub trait IndentedJson {
    /// Render as indented JSON.
    ///
    /// `prefix` is written at the start of every line but the first, and
    /// `indent` is the unit added per nesting level.
    fn to_json_indent(&self, prefix: &str, indent: &str) -> Result<Vec<u8>>;

    /// Render as an indented JSON string.
    fn to_json_indent_string(&self, prefix: &str, indent: &str) -> Result<String> {
        let bytes = self.to_json_indent(prefix, indent)?;
        // Fragments are built from UTF-8 strings and serde_json output only.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Strip trailing carriage returns, newlines and spaces.
///
/// A slice made only of those bytes is returned unchanged.
pub fn trim_last_blank_line(bytes: &[u8]) -> &[u8] {
    match bytes
        .iter()
        .rposition(|b| !matches!(b, b'\r' | b'\n' | b' '))
    {
        Some(last) => &bytes[..=last],
        None => bytes,
    }
}

/// Formatter escaping `<`, `>`, `&`, U+2028 and U+2029 inside strings, so
/// output matches encoders that make JSON safe to embed in HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlSafeFormatter<F> {
    inner: F,
}

impl<F: Formatter> HtmlSafeFormatter<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: Formatter> Formatter for HtmlSafeFormatter<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            self.inner.write_string_fragment(writer, &fragment[start..i])?;
            writer.write_all(escaped.as_bytes())?;
            start = i + ch.len_utf8();
        }
        self.inner.write_string_fragment(writer, &fragment[start..])
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_value(writer)
    }
}

/// Serialize `value` as compact JSON with HTML-safe strings
pub fn to_compact_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    let formatter = HtmlSafeFormatter::new(CompactFormatter);
    value.serialize(&mut Serializer::with_formatter(&mut out, formatter))?;
    Ok(out)
}

/// Serialize `value` as pretty JSON where each line after the first starts
/// with `prefix`, followed by a trailing newline.
pub fn to_prefixed_json<T: Serialize + ?Sized>(
    value: &T,
    prefix: &str,
    indent: &str,
) -> Result<Vec<u8>> {
    let mut pretty = Vec::with_capacity(128);
    let formatter = HtmlSafeFormatter::new(PrettyFormatter::with_indent(indent.as_bytes()));
    let mut serializer = Serializer::with_formatter(&mut pretty, formatter);
    value.serialize(&mut serializer)?;

    // String contents are escaped by serde_json, so every raw newline is a
    // line break introduced by the formatter.
    let mut out = Vec::with_capacity(pretty.len() + prefix.len() * 4 + 1);
    for &byte in &pretty {
        out.push(byte);
        if byte == b'\n' {
            out.extend_from_slice(prefix.as_bytes());
        }
    }
    out.push(b'\n');
    Ok(out)
}

/// Write `name` as a JSON string key followed by `": "`.
pub(crate) fn write_key(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    buf.extend_from_slice(&to_compact_json(name)?);
    buf.extend_from_slice(b": ");
    Ok(())
}
