//! Element tree for OpenDocument XML parts
//!
//! The renderer works on a plain tree of [`XmlElement`]s so it never touches
//! the XML engine directly. quick-xml is only used at the edges, to parse a
//! part into a tree and to serialize the tree back.
//!
//! Names are kept fully qualified (`table:table-cell`); namespace prefixes are
//! taken as written in the source document.

use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{OdsError, OdsResult};

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Character data (unescaped)
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Qualified name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`XmlElement::set_attr`]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`XmlElement::push`]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`XmlElement::push_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Get an attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert a child element at an index of `children`
    pub fn insert(&mut self, index: usize, child: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(child));
    }

    /// Append character data
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Iterate over child elements mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    /// First child element with the given name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.name == name)
    }

    /// Child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    /// Follow a path of child names
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Follow a path of child names, mutably
    pub fn find_path_mut(&mut self, path: &[&str]) -> Option<&mut XmlElement> {
        path.iter().try_fold(self, |el, name| el.child_mut(name))
    }

    /// Index (in `children`) of the first element matching `pred`
    pub fn position<P>(&self, mut pred: P) -> Option<usize>
    where
        P: FnMut(&XmlElement) -> bool,
    {
        self.children.iter().position(|node| match node {
            XmlNode::Element(el) => pred(el),
            XmlNode::Text(_) => false,
        })
    }

    /// Remove child elements matching `pred`, returning how many were removed
    pub fn remove_elements<P>(&mut self, mut pred: P) -> usize
    where
        P: FnMut(&XmlElement) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|node| match node {
            XmlNode::Element(el) => !pred(el),
            XmlNode::Text(_) => true,
        });
        before - self.children.len()
    }

    /// Concatenated character data of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// A parsed XML part
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Document element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Wrap a root element
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse a document from a string
    pub fn parse(xml: &str) -> OdsResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::element_from(&e)?),
                Event::Empty(e) => {
                    let el = Self::element_from(&e)?;
                    Self::attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        OdsError::MalformedTemplate("unbalanced end tag".into())
                    })?;
                    Self::attach(&mut stack, &mut root, el)?;
                }
                Event::Text(t) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(t.unescape()?.into_owned());
                    }
                }
                Event::CData(c) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(String::from_utf8_lossy(&c.into_inner()).into_owned());
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes
                // are not carried over.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(OdsError::MalformedTemplate(format!(
                "unclosed element <{}>",
                stack.last().map(|el| el.name.as_str()).unwrap_or_default()
            )));
        }

        root.map(Self::new)
            .ok_or_else(|| OdsError::MalformedTemplate("document has no root element".into()))
    }

    /// Parse a document from a file
    pub fn read_file<P: AsRef<Path>>(path: P) -> OdsResult<Self> {
        let xml = fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Serialize with a UTF-8 XML declaration
    pub fn to_xml(&self) -> OdsResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;
        Self::write_element(&mut writer, &self.root)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes)
            .map_err(|e| OdsError::Render(format!("serialized XML is not UTF-8: {}", e)))
    }

    /// Serialize to a file
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> OdsResult<()> {
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    fn element_from(start: &BytesStart<'_>) -> OdsResult<XmlElement> {
        let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value: Cow<'_, str> = attr.unescape_value()?;
            el.attributes.push((key, value.into_owned()));
        }
        Ok(el)
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        el: XmlElement,
    ) -> OdsResult<()> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(XmlNode::Element(el));
                Ok(())
            }
            None if root.is_none() => {
                *root = Some(el);
                Ok(())
            }
            None => Err(OdsError::MalformedTemplate(format!(
                "second root element <{}>",
                el.name
            ))),
        }
    }

    fn write_element<W: std::io::Write>(writer: &mut Writer<W>, el: &XmlElement) -> OdsResult<()> {
        let mut start = BytesStart::new(el.name.as_str());
        for (key, value) in &el.attributes {
            start.push_attribute((key.as_str(), &*xml_chars(value)));
        }

        if el.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &el.children {
            match child {
                XmlNode::Element(child) => Self::write_element(writer, child)?,
                XmlNode::Text(text) => {
                    writer.write_event(Event::Text(BytesText::new(&xml_chars(text))))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
        Ok(())
    }
}

/// Whether `c` matches the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Drops characters that cannot appear in an XML 1.0 document, even escaped
fn xml_chars(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| is_xml_char(c)).collect())
    }
}
