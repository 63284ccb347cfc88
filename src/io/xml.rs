//! A small XML document model, sufficient for the mission format: plain
//! elements, attributes, text and comments; no namespaces, CDATA or
//! doctypes.

use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("unexpected end of document")]
    UnexpectedEnd,
    #[error("malformed markup at byte {0}")]
    Malformed(usize),
    #[error("mismatched closing tag '{found}' for '{expected}'")]
    MismatchedTag { expected: String, found: String },
    #[error("trailing content after the document element")]
    TrailingContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> XmlElement {
        XmlElement {
            name: name.into(),
            ..XmlElement::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> XmlElement {
        let mut element = XmlElement::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// All child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// All child elements with the given name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    /// The concatenated, trimmed text content of this element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            if let XmlNode::Text(chunk) = node {
                text.push_str(chunk);
            }
        }
        text.trim().to_string()
    }
}

/// Parses a document into its root element.
pub fn parse(input: &str) -> Result<XmlElement, XmlError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        position: 0,
    };
    parser.skip_prolog()?;
    let root = parser.parse_element()?;
    parser.skip_misc();
    if parser.position < parser.bytes.len() {
        return Err(XmlError::TrailingContent);
    }
    Ok(root)
}

/// Serializes an element as an indented document.
pub fn write(root: &XmlElement) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    let indent = "    ".repeat(depth);
    let _ = write!(out, "{indent}<{}", element.name);
    for (name, value) in &element.attributes {
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }

    let has_elements = element.elements().next().is_some();
    let text = element.text();
    if !has_elements && text.is_empty() {
        out.push_str("/>\n");
        return;
    }

    if has_elements {
        out.push_str(">\n");
        for node in &element.children {
            match node {
                XmlNode::Element(child) => write_element(out, child, depth + 1),
                XmlNode::Text(chunk) if !chunk.trim().is_empty() => {
                    let _ = writeln!(out, "{indent}    {}", escape(chunk.trim()));
                }
                XmlNode::Text(_) => {}
            }
        }
        let _ = writeln!(out, "{indent}</{}>", element.name);
    } else {
        let _ = writeln!(out, ">{}</{}>", escape(&text), element.name);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

struct Parser<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.position..].starts_with(prefix.as_bytes())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), XmlError> {
        while self.position < self.bytes.len() {
            if self.starts_with(terminator) {
                self.position += terminator.len();
                return Ok(());
            }
            self.position += 1;
        }
        Err(XmlError::UnexpectedEnd)
    }

    /// Declaration, comments and whitespace before the root element.
    fn skip_prolog(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_until("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    /// Comments and whitespace after the root element.
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                if self.skip_until("-->").is_err() {
                    return;
                }
            } else {
                return;
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, XmlError> {
        let start = self.position;
        while matches!(
            self.peek(),
            Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' || b == b':'
        ) {
            self.position += 1;
        }
        if start == self.position {
            return Err(XmlError::Malformed(self.position));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.position]).into_owned())
    }

    fn parse_attribute_value(&mut self) -> Result<String, XmlError> {
        let quote = self.peek().ok_or(XmlError::UnexpectedEnd)?;
        if quote != b'"' && quote != b'\'' {
            return Err(XmlError::Malformed(self.position));
        }
        self.position += 1;
        let start = self.position;
        while matches!(self.peek(), Some(b) if b != quote) {
            self.position += 1;
        }
        if self.peek().is_none() {
            return Err(XmlError::UnexpectedEnd);
        }
        let value = String::from_utf8_lossy(&self.bytes[start..self.position]).into_owned();
        self.position += 1;
        Ok(unescape(&value))
    }

    fn parse_element(&mut self) -> Result<XmlElement, XmlError> {
        if self.peek() != Some(b'<') {
            return Err(XmlError::Malformed(self.position));
        }
        self.position += 1;
        let mut element = XmlElement::new(self.parse_name()?);

        loop {
            self.skip_whitespace();
            match self.peek().ok_or(XmlError::UnexpectedEnd)? {
                b'/' => {
                    self.position += 1;
                    if self.peek() != Some(b'>') {
                        return Err(XmlError::Malformed(self.position));
                    }
                    self.position += 1;
                    return Ok(element);
                }
                b'>' => {
                    self.position += 1;
                    break;
                }
                _ => {
                    let name = self.parse_name()?;
                    self.skip_whitespace();
                    if self.peek() != Some(b'=') {
                        return Err(XmlError::Malformed(self.position));
                    }
                    self.position += 1;
                    self.skip_whitespace();
                    let value = self.parse_attribute_value()?;
                    element.attributes.push((name, value));
                }
            }
        }

        // Content until the matching closing tag.
        loop {
            if self.starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if self.starts_with("</") {
                self.position += 2;
                let closing = self.parse_name()?;
                if closing != element.name {
                    return Err(XmlError::MismatchedTag {
                        expected: element.name,
                        found: closing,
                    });
                }
                self.skip_whitespace();
                if self.peek() != Some(b'>') {
                    return Err(XmlError::Malformed(self.position));
                }
                self.position += 1;
                return Ok(element);
            }
            match self.peek() {
                Some(b'<') => {
                    let child = self.parse_element()?;
                    element.children.push(XmlNode::Element(child));
                }
                Some(_) => {
                    let start = self.position;
                    while matches!(self.peek(), Some(b) if b != b'<') {
                        self.position += 1;
                    }
                    let text = String::from_utf8_lossy(&self.bytes[start..self.position]);
                    if !text.trim().is_empty() {
                        element.children.push(XmlNode::Text(unescape(text.trim())));
                    }
                }
                None => return Err(XmlError::UnexpectedEnd),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_attributes_and_text() {
        let doc = r#"<?xml version="1.0"?>
            <!-- a mission -->
            <mission>
                <name>demo</name>
                <constants>
                    <location id="l0" x="0" y="1" z="2"/>
                </constants>
            </mission>"#;
        let root = parse(doc).unwrap();
        assert_eq!(root.name, "mission");
        assert_eq!(root.child("name").unwrap().text(), "demo");

        let location = root.child("constants").unwrap().child("location").unwrap();
        assert_eq!(location.attribute("id"), Some("l0"));
        assert_eq!(location.attribute("y"), Some("1"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(matches!(
            parse("<a><b></a></b>"),
            Err(XmlError::MismatchedTag { .. })
        ));
    }

    #[test]
    fn entities_round_trip() {
        let mut element = XmlElement::with_text("note", "a < b & c");
        element.set_attribute("kind", "\"quoted\"");
        let document = write(&element);

        let parsed = parse(&document).unwrap();
        assert_eq!(parsed.text(), "a < b & c");
        assert_eq!(parsed.attribute("kind"), Some("\"quoted\""));
    }

    #[test]
    fn write_then_parse_is_identity() {
        let mut root = XmlElement::new("mission");
        root.push(XmlElement::with_text("name", "roundtrip"));
        let mut constraints = XmlElement::new("temporal-constraints");
        let mut constraint = XmlElement::new("greaterThan");
        constraint.set_attribute("lval", "t1");
        constraint.set_attribute("rval", "t0");
        constraints.push(constraint);
        root.push(constraints);

        let parsed = parse(&write(&root)).unwrap();
        assert_eq!(parsed, root);
    }
}
