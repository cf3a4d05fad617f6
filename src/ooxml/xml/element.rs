//! Mutable XML element tree for slide parts.
//!
//! Slides are edited in place: runs are cleared and re-added, paragraphs are
//! cloned, and shapes are appended or removed. A streaming reader cannot do
//! that, so each slide part is loaded into this small tree, edited, and
//! written back.
//!
//! Names are kept exactly as they appear in the source (`a:p`, `p:sp`), and
//! lookups by child name compare the local part only. Namespace
//! declarations are ordinary attributes and survive a round trip untouched.

use crate::common::xml::{escape_text, escape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data with entities already resolved
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl XmlNode {
    #[inline]
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// An element with its attributes (in source order) and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

/// Local part of a qualified name.
#[inline]
fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl XmlElement {
    /// Create an empty element with a qualified name such as `a:r`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Qualified name as written in the source.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether the local name equals `local`.
    #[inline]
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by exact (qualified) name, e.g. `sz` or `r:embed`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(idx).1)
    }

    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, skipping text, comments and the like.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Follow a path of local names down the first matching children.
    pub fn descendant(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    pub fn descendant_mut(&mut self, path: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// Node index of the first child element with the given local name.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.is(local)))
    }

    /// Child element at node index `idx`, if that node is an element.
    pub fn element_at(&self, idx: usize) -> Option<&XmlElement> {
        self.children.get(idx).and_then(XmlNode::as_element)
    }

    pub fn element_at_mut(&mut self, idx: usize) -> Option<&mut XmlElement> {
        self.children.get_mut(idx).and_then(XmlNode::as_element_mut)
    }

    /// Existing child with the local name of `name`, or a new empty one
    /// appended at the end.
    pub fn get_or_add_child(&mut self, name: &str) -> &mut XmlElement {
        let idx = match self.position(local_part(name)) {
            Some(idx) => idx,
            None => {
                self.children.push(XmlNode::Element(XmlElement::new(name)));
                self.children.len() - 1
            },
        };
        match &mut self.children[idx] {
            XmlNode::Element(e) => e,
            _ => unreachable!("position() only returns element nodes"),
        }
    }

    /// Existing child with the local name of `name`, or a new empty one
    /// inserted as the first child.
    pub fn get_or_insert_first(&mut self, name: &str) -> &mut XmlElement {
        let idx = match self.position(local_part(name)) {
            Some(idx) => idx,
            None => {
                self.children.insert(0, XmlNode::Element(XmlElement::new(name)));
                0
            },
        };
        match &mut self.children[idx] {
            XmlNode::Element(e) => e,
            _ => unreachable!("position() only returns element nodes"),
        }
    }

    #[inline]
    pub fn push(&mut self, node: impl Into<XmlNode>) {
        self.children.push(node.into());
    }

    /// Insert at node index `idx` (clamped to the end).
    pub fn insert(&mut self, idx: usize, node: impl Into<XmlNode>) {
        let idx = idx.min(self.children.len());
        self.children.insert(idx, node.into());
    }

    /// Remove the node at `idx`, returning it.
    pub fn remove(&mut self, idx: usize) -> Option<XmlNode> {
        (idx < self.children.len()).then(|| self.children.remove(idx))
    }

    /// Drop every child element the predicate selects.
    pub fn remove_elements_where(&mut self, mut pred: impl FnMut(&XmlElement) -> bool) {
        self.children
            .retain(|n| !n.as_element().is_some_and(&mut pred));
    }

    /// Drop all children.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Concatenated direct text and CDATA content.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => text.push_str(t),
                _ => {},
            }
        }
        text
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// Parse a standalone element, e.g. markup generated for a new shape.
    pub fn parse_fragment(xml: &str) -> Result<Self> {
        XmlDocument::parse(xml.as_bytes()).map(|doc| doc.root)
    }

    /// Serialize this element and its subtree.
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::with_capacity(256);
        self.write_xml(&mut xml);
        xml
    }

    fn write_xml(&self, output: &mut String) {
        output.push('<');
        output.push_str(&self.name);

        for (key, value) in &self.attributes {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            output.push_str(&escape_xml(value));
            output.push('"');
        }

        if self.children.is_empty() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_xml(output),
                XmlNode::Text(t) => output.push_str(&escape_text(t)),
                XmlNode::CData(t) => {
                    output.push_str("<![CDATA[");
                    output.push_str(t);
                    output.push_str("]]>");
                },
                XmlNode::Comment(t) => {
                    output.push_str("<!--");
                    output.push_str(t);
                    output.push_str("-->");
                },
                XmlNode::ProcessingInstruction(t) => {
                    output.push_str("<?");
                    output.push_str(t);
                    output.push_str("?>");
                },
            }
        }
        output.push_str("</");
        output.push_str(&self.name);
        output.push('>');
    }
}

/// A parsed XML part: its root element and whether it carried a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    has_declaration: bool,
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            has_declaration: true,
            root,
        }
    }

    /// Parse a complete XML part.
    ///
    /// Text is kept verbatim, whitespace included; `a:t` content is
    /// significant. Anything outside the root element other than the
    /// declaration is dropped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut has_declaration = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(_)) => has_declaration = true,
                Ok(Event::Start(ref e)) => stack.push(Self::element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::element_from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(element),
                        None => {
                            return Ok(Self {
                                has_declaration,
                                root: element,
                            });
                        },
                    }
                },
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::Xml("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(element),
                        None => {
                            return Ok(Self {
                                has_declaration,
                                root: element,
                            });
                        },
                    }
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(t.as_ref())
                            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                        Self::push_text(current, text);
                    }
                },
                Ok(Event::GeneralRef(ref r)) => {
                    if let Some(current) = stack.last_mut() {
                        let name = std::str::from_utf8(r)
                            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                        let resolved = resolve_entity(name)?;
                        Self::push_text(current, &resolved);
                    }
                },
                Ok(Event::CData(ref c)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(c)
                            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                        current.push(XmlNode::CData(text.to_string()));
                    }
                },
                Ok(Event::Comment(ref c)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(c)
                            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                        current.push(XmlNode::Comment(text.to_string()));
                    }
                },
                Ok(Event::PI(ref p)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(p)
                            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                        current.push(XmlNode::ProcessingInstruction(text.to_string()));
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(format!("XML parsing error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Err(OoxmlError::Xml("No root element found".to_string()))
    }

    fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(|_| OoxmlError::Xml("Invalid UTF-8 in tag name".to_string()))?
            .to_string();

        let mut element = XmlElement::new(name);
        for attr in e.attributes() {
            let attr = attr.map_err(|e| OoxmlError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|_| OoxmlError::Xml("Invalid UTF-8 in attribute key".to_string()))?
                .to_string();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Append text, merging with a preceding text node so entity references
    /// do not split a string.
    fn push_text(current: &mut XmlElement, text: &str) {
        if let Some(XmlNode::Text(last)) = current.children.last_mut() {
            last.push_str(text);
        } else {
            current.children.push(XmlNode::Text(text.to_string()));
        }
    }

    #[inline]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    pub fn to_xml_string(&self) -> String {
        let mut xml = String::with_capacity(4096);
        if self.has_declaration {
            xml.push_str(XML_DECLARATION);
            xml.push('\n');
        }
        self.root.write_xml(&mut xml);
        xml
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }
}

/// Resolve the body of an entity reference (`amp`, `#169`, `#x2022`).
fn resolve_entity(name: &str) -> Result<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => num.parse::<u32>(),
        }
        .map_err(|_| OoxmlError::Xml(format!("invalid character reference &{};", name)))?;

        return char::from_u32(code)
            .map(String::from)
            .ok_or_else(|| OoxmlError::Xml(format!("invalid character reference &{};", name)));
    }

    quick_xml::escape::resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| OoxmlError::Xml(format!("unknown entity &{};", name)))
}
