//! Owned element tree built from markup with `quick-xml`.
//!
//! The builder is strict: anything an XML parser would reject fails the
//! whole parse, which is what lets the caller fall back to the regex tier.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidemark_core::{Error, Result};
use std::ops::Range;

/// A parsed element with its attributes, children, and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    span: Range<usize>,
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    /// Parse a complete document and return its document element.
    pub fn parse_document(markup: &str) -> Result<Element> {
        let mut reader = Reader::from_str(markup);
        reader.trim_text(false);
        reader.check_end_names(true);
        reader.expand_empty_elements(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::XmlError(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(ref e) => {
                    let element = open_element(e, markup, reader.buffer_position())?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = open_element(e, markup, reader.buffer_position())?;
                    attach(element, &mut stack, &mut root)?;
                }
                Event::End(ref e) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        Error::XmlError(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    element.span.end = reader.buffer_position();
                    attach(element, &mut stack, &mut root)?;
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("bad text content: {}", err)))?;
                    push_text(&text, &mut stack)?;
                }
                Event::CData(ref e) => {
                    push_text(&String::from_utf8_lossy(e), &mut stack)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlError(format!("unclosed tag <{}>", open.name)));
        }

        root.ok_or(Error::NoDocumentElement)
    }

    /// Tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given tag name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct children with the given tag name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// All descendant elements (excluding `self`) in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.elements() {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    /// First descendant with the given tag name.
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        self.elements()
            .find_map(|child| (child.name == name).then_some(child).or_else(|| child.find_descendant(name)))
    }

    /// All text inside this element, concatenated.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Byte range of this element in the parsed markup.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The exact markup of this element, sliced from the text it was parsed from.
    pub fn source<'a>(&self, markup: &'a str) -> &'a str {
        markup.get(self.span.clone()).unwrap_or_default()
    }
}

/// Build an element from a start tag whose `>` ends at `end`.
fn open_element(tag: &BytesStart<'_>, markup: &str, end: usize) -> Result<Element> {
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in tag.attributes() {
        let attr = attr
            .map_err(|e| Error::XmlError(format!("bad attribute in <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlError(format!("bad attribute value in <{}>: {}", name, e)))?
            .into_owned();
        attributes.push((key, value));
    }

    let start = markup
        .get(..end)
        .and_then(|head| head.rfind('<'))
        .unwrap_or(0);

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        span: start..end,
    })
}

/// Attach a finished element to its parent, or make it the document element.
fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }

    if root.is_some() {
        return Err(Error::XmlError(format!(
            "junk after document element: <{}>",
            element.name
        )));
    }

    *root = Some(element);
    Ok(())
}

fn push_text(text: &str, stack: &mut [Element]) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text.to_string()));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::XmlError(format!(
            "text outside the document element: {:?}",
            text.trim()
        ))),
    }
}
