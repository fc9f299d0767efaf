//! Declarative bundle-list documents
//!
//! Reads the XML documents that declare which bundles go into the runtime
//! directory, grouped by start level:
//!
//! ```xml
//! <?xml version='1.0' encoding='utf-8'?>
//! <bundles>
//!   <level level="1">
//!     <bundle>commons-io/commons-io/-dependency-</bundle>
//!     <bundle noStart="true">com.example/support/1.4.0</bundle>
//!   </level>
//! </bundles>
//! ```
//!
//! Two start-attribute schemas exist in the wild and are selected
//! explicitly per document via [`ListFormat`] — never sniffed from content,
//! and never mixed within one document:
//!
//! - [`ListFormat::Current`]: `noStart="true"` suppresses starting; absent
//!   means the bundle starts.
//! - [`ListFormat::Legacy`]: `start="true"` requests starting; absent means
//!   the bundle does not start.
//!
//! Levels are kept in declaration order here; the aggregation index is what
//! establishes ascending output order.

pub mod writer;

use crate::core::BundlepackError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

/// Which start-attribute schema a bundle-list document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ListFormat {
    /// `noStart="true"` suppresses starting; bundles start by default
    #[default]
    Current,
    /// `start="true"` requests starting; bundles do not start by default
    Legacy,
}

impl ListFormat {
    /// The attribute this schema reads
    const fn attribute(self) -> &'static [u8] {
        match self {
            Self::Current => b"noStart",
            Self::Legacy => b"start",
        }
    }

    /// Interpret the (possibly absent) attribute value as start intent
    fn start_intent(self, value: Option<&str>) -> bool {
        let flag = value.is_some_and(|v| v.eq_ignore_ascii_case("true"));
        match self {
            Self::Current => !flag,
            Self::Legacy => flag,
        }
    }
}

/// One declared bundle: start intent plus the raw locator text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Declared start intent, before fragment classification
    pub start: bool,
    /// Raw, possibly interpolatable locator
    pub locator: String,
}

/// All bundles declared at one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBundles {
    /// The declared start level
    pub level: u32,
    /// Bundles in declaration order
    pub bundles: Vec<BundleEntry>,
}

/// The parsed content of one bundle-list document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlesDocument {
    /// Level groups in declaration order, not necessarily sorted
    pub levels: Vec<LevelBundles>,
}

impl BundlesDocument {
    /// Read and validate one bundle-list document
    pub fn read(path: &Path, format: ListFormat) -> Result<Self, BundlepackError> {
        let mut reader = Reader::from_file(path).map_err(|e| BundlepackError::MalformedDocument {
            file: path.display().to_string(),
            position: 0,
            reason: e.to_string(),
        })?;
        reader.config_mut().trim_text(true);

        let mut parser = DocumentParser {
            reader,
            file: path.display().to_string(),
            format,
            buf: Vec::new(),
        };
        parser.parse()
    }
}

/// Streaming parser state for one document
struct DocumentParser<R: std::io::BufRead> {
    reader: Reader<R>,
    file: String,
    format: ListFormat,
    buf: Vec<u8>,
}

impl<R: std::io::BufRead> DocumentParser<R> {
    fn malformed(&self, reason: impl Into<String>) -> BundlepackError {
        BundlepackError::MalformedDocument {
            file: self.file.clone(),
            position: self.reader.buffer_position() as u64,
            reason: reason.into(),
        }
    }

    /// Pull the next structurally relevant event, skipping prolog noise
    fn next_event(&mut self) -> Result<Event<'static>, BundlepackError> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| BundlepackError::MalformedDocument {
                    file: self.file.clone(),
                    position: self.reader.buffer_position() as u64,
                    reason: e.to_string(),
                })?
                .into_owned();
            match event {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                other => return Ok(other),
            }
        }
    }

    fn parse(&mut self) -> Result<BundlesDocument, BundlepackError> {
        match self.next_event()? {
            Event::Start(e) if e.name().as_ref() == b"bundles" => {}
            Event::Empty(e) if e.name().as_ref() == b"bundles" => {
                return Ok(BundlesDocument { levels: Vec::new() });
            }
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Err(self.malformed(format!("expected <bundles> root element, found <{name}>")));
            }
            _ => return Err(self.malformed("expected <bundles> root element")),
        }

        let mut levels = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"level" => {
                    let level = self.level_attribute(&e)?;
                    let bundles = self.parse_level_bundles()?;
                    levels.push(LevelBundles { level, bundles });
                }
                Event::Empty(e) if e.name().as_ref() == b"level" => {
                    let level = self.level_attribute(&e)?;
                    levels.push(LevelBundles {
                        level,
                        bundles: Vec::new(),
                    });
                }
                Event::End(e) if e.name().as_ref() == b"bundles" => break,
                Event::Eof => return Err(self.malformed("unexpected end of document")),
                _ => return Err(self.malformed("expected <level> element")),
            }
        }

        Ok(BundlesDocument { levels })
    }

    /// Extract and parse the integer `level` attribute
    fn level_attribute(&mut self, element: &BytesStart<'_>) -> Result<u32, BundlepackError> {
        let mut raw: Option<String> = None;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| {
                BundlepackError::MalformedDocument {
                    file: self.file.clone(),
                    position: self.reader.buffer_position() as u64,
                    reason: e.to_string(),
                }
            })?;
            if attr.key.as_ref() == b"level" {
                raw = Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }

        let raw = raw.ok_or_else(|| self.malformed("<level> element lacks a 'level' attribute"))?;
        raw.parse::<u32>()
            .map_err(|_| self.malformed(format!("'level' attribute is not an integer: '{raw}'")))
    }

    /// Parse `<bundle>` children until the closing `</level>`
    fn parse_level_bundles(&mut self) -> Result<Vec<BundleEntry>, BundlepackError> {
        let mut bundles = Vec::new();
        loop {
            match self.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"bundle" => {
                    let start = self.start_intent(&e)?;
                    let locator = self.bundle_text()?;
                    bundles.push(BundleEntry { start, locator });
                }
                Event::Empty(e) if e.name().as_ref() == b"bundle" => {
                    return Err(self.malformed("<bundle> element has no text content"));
                }
                Event::End(e) if e.name().as_ref() == b"level" => break,
                Event::Eof => return Err(self.malformed("unexpected end of document")),
                _ => return Err(self.malformed("expected <bundle> element")),
            }
        }
        Ok(bundles)
    }

    /// Read the schema's start attribute off a `<bundle>` element
    fn start_intent(&mut self, element: &BytesStart<'_>) -> Result<bool, BundlepackError> {
        let mut value: Option<String> = None;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| {
                BundlepackError::MalformedDocument {
                    file: self.file.clone(),
                    position: self.reader.buffer_position() as u64,
                    reason: e.to_string(),
                }
            })?;
            if attr.key.as_ref() == self.format.attribute() {
                value = Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }
        Ok(self.format.start_intent(value.as_deref()))
    }

    /// Read the locator text and the closing `</bundle>` tag
    fn bundle_text(&mut self) -> Result<String, BundlepackError> {
        let text = match self.next_event()? {
            Event::Text(t) => t
                .unescape()
                .map_err(|e| BundlepackError::MalformedDocument {
                    file: self.file.clone(),
                    position: self.reader.buffer_position() as u64,
                    reason: e.to_string(),
                })?
                .trim()
                .to_string(),
            Event::End(e) if e.name().as_ref() == b"bundle" => {
                return Err(self.malformed("<bundle> element has no text content"));
            }
            _ => return Err(self.malformed("expected bundle locator text")),
        };

        if text.is_empty() {
            return Err(self.malformed("<bundle> element has no text content"));
        }

        match self.next_event()? {
            Event::End(e) if e.name().as_ref() == b"bundle" => Ok(text),
            _ => Err(self.malformed("expected </bundle>")),
        }
    }
}
