//! Owned XML element tree with path lookups.
//!
//! Metadata exports are small, so the whole document is read into an
//! [`XmlElement`] tree with `quick-xml` and queried afterwards with
//! slash-separated paths relative to the root element:
//!
//! - `DISS_description/DISS_title` — child steps by element name
//! - `DISS_authorship/DISS_author[@type='primary']/DISS_name` — a step may
//!   require an attribute to have an exact value
//!
//! An element's [`text`](XmlElement::text) is the character data that appears
//! before its first child element. Text after a child is not kept.
//!
//! # Examples
//!
//! ```ignore
//! use etdsaf::xml::{parse_document, XmlPath};
//!
//! let root = parse_document("<a><b type='x'><c>hi</c></b></a>")?;
//! let path = XmlPath::parse("b[@type='x']/c")?;
//! assert_eq!(root.find(&path).map(|c| c.text()), Some("hi"));
//! # Ok::<(), etdsaf::SafError>(())
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::{Result, SafError};

lazy_static! {
    static ref STEP_RE: Regex =
        Regex::new(r"^([A-Za-z_][\w.\-:]*)(?:\[@([A-Za-z_][\w.\-:]*)='([^']*)'\])?$")
            .expect("step pattern is valid");
}

/// An element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name as written, including any prefix
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Character data before the first child element, if any
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element with no attributes, text, or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get the first direct child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Element text, or the empty string when the element has none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// First element matching `path`, in document order.
    #[must_use]
    pub fn find(&self, path: &XmlPath) -> Option<&XmlElement> {
        self.find_all(path).into_iter().next()
    }

    /// All elements matching `path`, in document order.
    #[must_use]
    pub fn find_all(&self, path: &XmlPath) -> Vec<&XmlElement> {
        let mut current: Vec<&XmlElement> = vec![self];
        for step in &path.steps {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter().filter(|c| step.matches(c)))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathStep {
    name: String,
    predicate: Option<(String, String)>,
}

impl PathStep {
    fn matches(&self, element: &XmlElement) -> bool {
        if element.name != self.name {
            return false;
        }
        match &self.predicate {
            Some((attr, value)) => element.attribute(attr) == Some(value.as_str()),
            None => true,
        }
    }
}

/// A compiled lookup path relative to some element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPath {
    source: String,
    steps: Vec<PathStep>,
}

impl XmlPath {
    /// Compile a slash-separated path.
    ///
    /// # Errors
    ///
    /// Returns [`SafError::Xml`] if the path is empty or a step is not of the
    /// form `name` or `name[@attr='value']`.
    pub fn parse(path: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for raw in path.split('/') {
            let caps = STEP_RE
                .captures(raw)
                .ok_or_else(|| SafError::Xml(format!("invalid path step '{raw}' in '{path}'")))?;
            let predicate = match (caps.get(2), caps.get(3)) {
                (Some(attr), Some(value)) => {
                    Some((attr.as_str().to_string(), value.as_str().to_string()))
                },
                _ => None,
            };
            steps.push(PathStep {
                name: caps[1].to_string(),
                predicate,
            });
        }
        Ok(XmlPath {
            source: path.to_string(),
            steps,
        })
    }

    /// The path as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for XmlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse an XML document and return its root element.
///
/// # Errors
///
/// Returns [`SafError::Xml`] if the document is malformed, has no root
/// element, or has more than one top-level element.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SafError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(text) => {
                let value = text.unescape()?;
                push_text(&mut stack, &value);
            },
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&bytes));
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !stack.is_empty() {
        return Err(SafError::Xml(format!(
            "unclosed element <{}>",
            stack.last().map_or("", |e| e.name.as_str())
        )));
    }
    root.ok_or_else(|| SafError::Xml("document has no root element".to_string()))
}

/// Read and parse an XML file.
///
/// # Errors
///
/// Returns [`SafError::Io`] if the file cannot be read, or [`SafError::Xml`]
/// if it is not UTF-8 or is malformed.
pub fn parse_file(path: &Path) -> Result<XmlElement> {
    let bytes = fs::read(path).map_err(|e| SafError::io(path, e))?;
    let xml = String::from_utf8(bytes)
        .map_err(|e| SafError::Xml(format!("non-UTF-8 export {}: {e}", path.display())))?;
    parse_document(&xml)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| SafError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(SafError::Xml(format!(
            "junk after document element: <{}>",
            element.name
        )));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], value: &str) {
    if let Some(current) = stack.last_mut() {
        // Only leading text counts; tail text after a child is dropped.
        if current.children.is_empty() {
            current
                .text
                .get_or_insert_with(String::new)
                .push_str(value);
        }
    }
}
